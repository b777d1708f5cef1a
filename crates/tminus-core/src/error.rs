use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("repeating interval must be non-zero")]
    ZeroInterval,

    #[error("could not start scheduler thread: {0}")]
    Spawn(#[from] std::io::Error),
}
