//! Countdown timer that reports the remaining duration, formatted through a small token
//! template, on every tick until the duration is exhausted.
//!
//! ```
//! use std::time::Duration;
//! use tminus_core::countdown::{self, CountdownConfig};
//! use tminus_core::scheduler::ManualScheduler;
//!
//! let scheduler = ManualScheduler::new();
//! let (config, events) = CountdownConfig::builder(3_000).format("mm:ss").into_events();
//!
//! let handle = countdown::start(config, &scheduler).unwrap();
//! scheduler.advance(Duration::from_secs(5));
//!
//! assert!(handle.is_finished());
//! assert_eq!(events.iter().count(), 3); // "00:02", "00:01", then Complete
//! ```

#![forbid(unsafe_code)]

pub mod countdown;
pub mod error;
pub mod format;
pub mod scheduler;

pub use countdown::{CountdownBuilder, CountdownConfig, CountdownEvent, CountdownHandle};
pub use error::Error;
pub use format::{FormattedTime, Template, TickUnit, TimeParts};
