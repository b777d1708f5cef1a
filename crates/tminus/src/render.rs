//! Writes countdown events to the terminal.

use std::io::Write;

use tminus_core::CountdownEvent;

use crate::CliError;

/// Erase from the cursor to the end of the line
const CLEAR_TO_EOL: &str = "\x1b[K";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Redraw a single line in place; for interactive terminals.
    Overwrite,
    /// One line per tick.
    Lines,
    /// One JSON document per line.
    Json,
}

pub struct Renderer {
    mode: OutputMode,
    message: Option<String>,
    completed: bool,
    line_open: bool,
}

impl Renderer {
    pub fn new(mode: OutputMode, message: Option<String>) -> Self {
        Self {
            mode,
            message,
            completed: false,
            line_open: false,
        }
    }

    pub fn render(&mut self, event: &CountdownEvent, out: &mut impl Write) -> Result<(), CliError> {
        if *event == CountdownEvent::Complete {
            self.completed = true;
        }

        match (self.mode, event) {
            (OutputMode::Json, _) => {
                serde_json::to_writer(&mut *out, event)?;
                writeln!(out)?;
            }
            (OutputMode::Overwrite, CountdownEvent::Tick(remaining)) => {
                write!(out, "\r{remaining}{CLEAR_TO_EOL}")?;
                self.line_open = true;
            }
            (OutputMode::Lines, CountdownEvent::Tick(remaining)) => {
                writeln!(out, "{remaining}")?;
            }
            (_, CountdownEvent::Complete) => {
                self.close_line(out)?;
                if let Some(message) = &self.message {
                    writeln!(out, "{message}")?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Leave the cursor on a fresh line, e.g. after a cancelled countdown.
    pub fn finish(&mut self, out: &mut impl Write) -> Result<(), CliError> {
        self.close_line(out)?;
        out.flush()?;
        Ok(())
    }

    /// True once a [`CountdownEvent::Complete`] was rendered.
    pub fn completed(&self) -> bool {
        self.completed
    }

    fn close_line(&mut self, out: &mut impl Write) -> Result<(), CliError> {
        if self.line_open {
            write!(out, "\r{CLEAR_TO_EOL}")?;
            self.line_open = false;
        }
        Ok(())
    }
}
