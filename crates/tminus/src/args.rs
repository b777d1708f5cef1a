#![doc(hidden)]

use std::fmt::{Display, Formatter};

use clap::{Parser, ValueEnum};
use jiff::{SignedDuration, Timestamp};
use tminus_core::{Template, TickUnit};

use crate::render::OutputMode;

/// Arguments for the countdown CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about = "Countdown timer for the terminal")]
pub struct Args {
    #[clap(
        required_unless_present = "until",
        conflicts_with = "until",
        help = "How long to count down, e.g. '90s', '1h 30m' or 'PT5M'"
    )]
    pub duration: Option<SignedDuration>,

    #[clap(
        long,
        value_name = "TIMESTAMP",
        help = "Count down to this instant instead, e.g. 2026-12-31T23:59:59Z"
    )]
    pub until: Option<Timestamp>,

    #[clap(
        short = 'f',
        long,
        value_name = "FORMAT",
        env = "TMINUS_FORMAT",
        help = "Template using dd, hh, mm, ss and ms, any case [default: parts joined by ':']"
    )]
    pub format: Option<String>,

    #[clap(
        value_enum,
        short = 'u',
        long,
        value_name = "UNIT",
        env = "TMINUS_TICK_UNIT",
        default_value_t = TickUnitArg::Seconds
    )]
    pub unit: TickUnitArg,

    #[clap(
        long,
        env = "TMINUS_NO_DAYS",
        help = "Keep counting hours past 23 instead of showing days",
        default_value_t = false
    )]
    pub no_days: bool,

    #[clap(
        short = 'm',
        long,
        value_name = "TEXT",
        env = "TMINUS_MESSAGE",
        help = "Printed when the countdown completes"
    )]
    pub message: Option<String>,

    #[clap(
        long,
        help = "Print each event as a line of JSON",
        default_value_t = false
    )]
    pub json: bool,

    #[clap(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Don't log anything except errors",
        default_value_t = false
    )]
    pub quiet: bool,

    #[clap(
        short = 'v',
        long,
        conflicts_with = "quiet",
        action = clap::ArgAction::Count,
        help = "Log details about the countdown; specify twice to log every tick"
    )]
    pub verbose: u8,
}

impl Args {
    /// Milliseconds to count down from, relative to `now` when counting to a timestamp.
    /// Instants in the past give a negative value.
    pub fn total_millis(&self, now: Timestamp) -> i64 {
        let remaining = match (self.duration, self.until) {
            (Some(duration), _) => duration,
            (None, Some(until)) => now.duration_until(until),
            (None, None) => SignedDuration::ZERO,
        };

        let millis = remaining.as_millis();
        i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX })
    }

    pub fn template(&self) -> Option<Template> {
        self.format.as_deref().map(Template::parse)
    }

    pub fn tick_unit(&self) -> TickUnit {
        self.unit.into()
    }

    pub fn output_mode(&self, is_terminal: bool) -> OutputMode {
        match (self.json, is_terminal) {
            (true, _) => OutputMode::Json,
            (false, true) => OutputMode::Overwrite,
            (false, false) => OutputMode::Lines,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickUnitArg {
    /// Update once a second
    #[default]
    #[value(name = "seconds", alias = "s")]
    Seconds,

    /// Update ten times a second and report tenths
    #[value(name = "centiseconds", alias = "cs")]
    Centiseconds,
}

impl From<TickUnitArg> for TickUnit {
    fn from(arg: TickUnitArg) -> Self {
        match arg {
            TickUnitArg::Seconds => TickUnit::Seconds,
            TickUnitArg::Centiseconds => TickUnit::Centiseconds,
        }
    }
}

impl Display for TickUnitArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&TickUnit::from(*self), f)
    }
}
