//! Command-line front end for `tminus-core`: argument handling and terminal rendering.

#![forbid(unsafe_code)]

pub mod args;
pub mod render;

/// Things that can go wrong while running the CLI
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Countdown(#[from] tminus_core::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("could not install Ctrl-C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
