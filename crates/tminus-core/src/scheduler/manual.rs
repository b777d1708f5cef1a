use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::trace;

use crate::Error;
use crate::scheduler::{RepeatingTask, Scheduler, TaskHandle};

/// A scheduler with virtual time. Nothing fires until [`advance`](ManualScheduler::advance)
/// is called.
///
/// Clones share the same clock and task table.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    now: Duration,
    next_id: u64,
    entries: BTreeMap<u64, Entry>,
}

struct Entry {
    interval: Duration,
    next_due: Duration,
    /// `None` while the task is running
    task: Option<RepeatingTask>,
}

impl State {
    /// Earliest entry due at or before `limit`; ties go to the task scheduled first.
    fn next_due(&self, limit: Duration) -> Option<(u64, Duration)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.task.is_some() && entry.next_due <= limit)
            .min_by_key(|(id, entry)| (entry.next_due, **id))
            .map(|(id, entry)| (*id, entry.next_due))
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since this scheduler was created.
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of tasks still scheduled.
    pub fn pending(&self) -> usize {
        self.lock().entries.len()
    }

    /// Moves virtual time forward by `delta`, running every task that comes due on the way in
    /// due-time order. Tasks run without the scheduler locked, so they may schedule or cancel.
    pub fn advance(&self, delta: Duration) {
        let target = self.lock().now + delta;

        loop {
            let (id, mut task) = {
                let mut state = self.lock();
                let Some((id, due)) = state.next_due(target) else {
                    break;
                };
                state.now = due;

                let Some(task) = state.entries.get_mut(&id).and_then(|e| e.task.take()) else {
                    break;
                };
                (id, task)
            };

            trace!("running task {id}");
            let flow = task();

            let mut state = self.lock();
            if flow.is_break() {
                state.entries.remove(&id);
            } else if let Some(entry) = state.entries.get_mut(&id) {
                entry.next_due += entry.interval;
                entry.task = Some(task);
            }
            // otherwise it was cancelled while running and the entry is already gone
        }

        self.lock().now = target;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(
        &self,
        interval: Duration,
        task: RepeatingTask,
    ) -> Result<TaskHandle, Error> {
        if interval.is_zero() {
            return Err(Error::ZeroInterval);
        }

        let mut state = self.lock();
        let id = state.next_id;
        state.next_id += 1;

        let next_due = state.now + interval;
        state.entries.insert(
            id,
            Entry {
                interval,
                next_due,
                task: Some(task),
            },
        );

        Ok(TaskHandle(id))
    }

    fn cancel(&self, handle: TaskHandle) {
        self.lock().entries.remove(&handle.id());
    }
}
