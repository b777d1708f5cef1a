//! Abstraction over "fire this every N ms" and "stop firing".
//!
//! [`ThreadScheduler`] runs each task on its own thread against the wall clock.
//! [`ManualScheduler`] keeps virtual time that only moves when told to, for tests and
//! simulations.

use std::ops::ControlFlow;
use std::time::Duration;

use crate::Error;

mod manual;
mod thread;

pub use manual::ManualScheduler;
pub use thread::ThreadScheduler;

/// Work run on every interval. Returning [`ControlFlow::Break`] ends the repetition.
pub type RepeatingTask = Box<dyn FnMut() -> ControlFlow<()> + Send + 'static>;

/// Identifies a scheduled task for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

pub trait Scheduler {
    /// Runs `task` every `interval`, first firing one interval from now. Runs of the same task
    /// never overlap.
    fn schedule_repeating(
        &self,
        interval: Duration,
        task: RepeatingTask,
    ) -> Result<TaskHandle, Error>;

    /// Stops `handle` from firing again. Unknown or already finished handles are ignored.
    fn cancel(&self, handle: TaskHandle);
}
