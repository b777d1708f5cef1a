use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering::Relaxed;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Sender, bounded, select, tick};
use tracing::{debug, trace};

use crate::Error;
use crate::scheduler::{RepeatingTask, Scheduler, TaskHandle};

/// Runs every task on a dedicated, named thread driven by the wall clock.
///
/// Clones share the same task table, so a task scheduled through one clone can be cancelled
/// through another.
#[derive(Debug, Clone, Default)]
pub struct ThreadScheduler {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: AtomicU64,
    /// Cancellation senders of live tasks, indexed on task id
    cancellers: Mutex<HashMap<u64, Sender<()>>>,
}

impl Inner {
    fn remove(&self, id: u64) -> Option<Sender<()>> {
        self.cancellers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
    }
}

/// Drops a task's entry when its thread exits, including by unwinding out of the task.
struct Deregister {
    inner: Arc<Inner>,
    id: u64,
}

impl Drop for Deregister {
    fn drop(&mut self) {
        self.inner.remove(self.id);
    }
}

impl ThreadScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks whose threads are still running.
    pub fn pending(&self) -> usize {
        self.inner
            .cancellers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule_repeating(
        &self,
        interval: Duration,
        mut task: RepeatingTask,
    ) -> Result<TaskHandle, Error> {
        if interval.is_zero() {
            return Err(Error::ZeroInterval);
        }

        let id = self.inner.next_id.fetch_add(1, Relaxed);
        let (cancel_tx, cancel_rx) = bounded::<()>(1);

        // Registered before the thread starts so a task that finishes on its first run
        // still finds (and removes) its own entry.
        self.inner
            .cancellers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, cancel_tx);

        let inner = Arc::clone(&self.inner);
        let spawned = thread::Builder::new()
            .name(format!("countdown-{id}"))
            .spawn(move || {
                let _deregister = Deregister { inner, id };
                let ticker = tick(interval);

                loop {
                    select! {
                        recv(cancel_rx) -> _ => {
                            trace!("task {id} cancelled");
                            break;
                        }
                        recv(ticker) -> _ => {
                            if task().is_break() {
                                trace!("task {id} finished");
                                break;
                            }
                        }
                    }
                }
            });

        if let Err(e) = spawned {
            self.inner.remove(id);
            return Err(Error::Spawn(e));
        }

        debug!("scheduled task {id} every {:?}", interval);
        Ok(TaskHandle(id))
    }

    fn cancel(&self, handle: TaskHandle) {
        if let Some(cancel_tx) = self.inner.remove(handle.id()) {
            // Full or disconnected both mean the thread is already on its way out
            let _ = cancel_tx.try_send(());
        }
    }
}
