//! The countdown itself.
//!
//! [`start`] reports the remaining time once, immediately, and then once per tick through a
//! [`Scheduler`] until the remaining time reaches zero. The completion callback then runs
//! exactly once and no tick is reported after it.
//!
//! # Callbacks
//!
//! ```
//! use std::time::Duration;
//! use tminus_core::countdown::{self, CountdownConfig};
//! use tminus_core::scheduler::ManualScheduler;
//!
//! let scheduler = ManualScheduler::new();
//! let config = CountdownConfig::builder(5_000)
//!     .format("ss")
//!     .on_tick(|remaining| println!("{remaining}"))
//!     .on_complete(|| println!("liftoff"))
//!     .build();
//!
//! // prints "04" straight away, then "03", "02", "01" and "liftoff"
//! let handle = countdown::start(config, &scheduler).unwrap();
//! scheduler.advance(Duration::from_secs(4));
//! assert!(handle.is_finished());
//! ```
//!
//! # Events
//!
//! [`CountdownBuilder::into_events`] swaps the callbacks for a channel of [`CountdownEvent`]s,
//! a finite sequence that ends with [`CountdownEvent::Complete`].

use std::fmt::{Debug, Formatter};
use std::ops::ControlFlow;
use std::sync::atomic::Ordering::{AcqRel, Acquire, Release};
use std::sync::atomic::{AtomicBool, AtomicI64};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{Receiver, unbounded};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Error;
use crate::format::{FormattedTime, Template, TickUnit, format_remaining};
use crate::scheduler::{Scheduler, TaskHandle};

type TickCallback = Box<dyn FnMut(FormattedTime) + Send + 'static>;
type CompleteCallback = Box<dyn FnOnce() + Send + 'static>;

/// What a countdown reports, in channel form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownEvent {
    Tick(FormattedTime),
    Complete,
}

/// Everything a countdown needs. Built with [`CountdownConfig::builder`].
pub struct CountdownConfig {
    total_millis: i64,
    template: Option<Template>,
    tick_unit: TickUnit,
    show_days: bool,
    on_tick: TickCallback,
    on_complete: CompleteCallback,
}

impl CountdownConfig {
    /// Start building a countdown of `total_millis`. Zero or negative means already complete.
    pub fn builder(total_millis: i64) -> CountdownBuilder {
        CountdownBuilder::new(total_millis)
    }

    pub fn total_millis(&self) -> i64 {
        self.total_millis
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    pub fn tick_unit(&self) -> TickUnit {
        self.tick_unit
    }

    pub fn show_days(&self) -> bool {
        self.show_days
    }
}

impl Debug for CountdownConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownConfig")
            .field("total_millis", &self.total_millis)
            .field("template", &self.template)
            .field("tick_unit", &self.tick_unit)
            .field("show_days", &self.show_days)
            .finish_non_exhaustive()
    }
}

pub struct CountdownBuilder {
    total_millis: i64,
    template: Option<Template>,
    tick_unit: TickUnit,
    show_days: bool,
    on_tick: Option<TickCallback>,
    on_complete: Option<CompleteCallback>,
}

impl CountdownBuilder {
    pub fn new(total_millis: i64) -> Self {
        Self {
            total_millis,
            template: None,
            tick_unit: TickUnit::default(),
            show_days: true,
            on_tick: None,
            on_complete: None,
        }
    }

    /// Report text rendered from `template` instead of the component list.
    pub fn format(self, template: &str) -> Self {
        self.template(Template::parse(template))
    }

    pub fn template(mut self, template: Template) -> Self {
        self.template = Some(template);
        self
    }

    pub fn tick_unit(mut self, tick_unit: TickUnit) -> Self {
        self.tick_unit = tick_unit;
        self
    }

    /// When false, hours accumulate past 23 and no day component is reported.
    pub fn show_days(mut self, show_days: bool) -> Self {
        self.show_days = show_days;
        self
    }

    pub fn on_tick(mut self, on_tick: impl FnMut(FormattedTime) + Send + 'static) -> Self {
        self.on_tick = Some(Box::new(on_tick));
        self
    }

    pub fn on_complete(mut self, on_complete: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    pub fn build(self) -> CountdownConfig {
        CountdownConfig {
            total_millis: self.total_millis,
            template: self.template,
            tick_unit: self.tick_unit,
            show_days: self.show_days,
            on_tick: self.on_tick.unwrap_or_else(|| Box::new(|_| {})),
            on_complete: self.on_complete.unwrap_or_else(|| Box::new(|| {})),
        }
    }

    /// Build a config whose ticks and completion are sent to the returned receiver, replacing
    /// any callbacks already set. The channel disconnects once the countdown is finished and its
    /// scheduler has let go of it.
    pub fn into_events(self) -> (CountdownConfig, Receiver<CountdownEvent>) {
        let (tx, rx) = unbounded();
        let complete_tx = tx.clone();

        let config = self
            .on_tick(move |remaining| {
                let _ = tx.send(CountdownEvent::Tick(remaining));
            })
            .on_complete(move || {
                let _ = complete_tx.send(CountdownEvent::Complete);
            })
            .build();

        (config, rx)
    }
}

/// State visible to both the running countdown and its handles.
#[derive(Debug)]
struct Shared {
    remaining: AtomicI64,
    finished: AtomicBool,
}

/// The per-tick state machine, shared by [`start`] and the scheduled task.
struct Ticker {
    shared: Arc<Shared>,
    remaining: i64,
    interval: i64,
    template: Option<Template>,
    tick_unit: TickUnit,
    show_days: bool,
    on_tick: TickCallback,
    on_complete: Option<CompleteCallback>,
}

impl Ticker {
    fn new(config: CountdownConfig, shared: Arc<Shared>) -> Self {
        Self {
            shared,
            remaining: config.total_millis,
            interval: config.tick_unit.interval_millis(),
            template: config.template,
            tick_unit: config.tick_unit,
            show_days: config.show_days,
            on_tick: config.on_tick,
            on_complete: Some(config.on_complete),
        }
    }

    fn tick(&mut self) -> ControlFlow<()> {
        if self.shared.finished.load(Acquire) {
            return ControlFlow::Break(());
        }

        self.remaining = self.remaining.saturating_sub(self.interval);
        self.shared.remaining.store(self.remaining.max(0), Release);

        if self.remaining <= 0 {
            self.complete();
            return ControlFlow::Break(());
        }

        let formatted = format_remaining(
            self.remaining,
            self.template.as_ref(),
            self.tick_unit,
            self.show_days,
        );
        trace!("{}ms remaining: {}", self.remaining, formatted);

        (self.on_tick)(formatted);
        ControlFlow::Continue(())
    }

    fn complete(&mut self) {
        // A concurrent cancel may already have claimed the finish
        if self.shared.finished.swap(true, AcqRel) {
            return;
        }

        if let Some(on_complete) = self.on_complete.take() {
            debug!("countdown complete");
            on_complete();
        }
    }
}

#[derive(Clone)]
struct ScheduledTask {
    task: TaskHandle,
    scheduler: Arc<dyn Scheduler + Send + Sync>,
}

/// Handle to a started countdown. Clones refer to the same countdown; dropping a handle does
/// not stop it.
#[derive(Clone)]
pub struct CountdownHandle {
    shared: Arc<Shared>,
    scheduled: Option<ScheduledTask>,
}

impl CountdownHandle {
    /// Stops the countdown without running its completion callback. Calling this more than once,
    /// or after the countdown completed, does nothing.
    pub fn cancel(&self) {
        if self.shared.finished.swap(true, AcqRel) {
            return;
        }

        debug!(
            "countdown cancelled with {}ms remaining",
            self.remaining_millis()
        );

        if let Some(scheduled) = &self.scheduled {
            scheduled.scheduler.cancel(scheduled.task);
        }
    }

    /// True once the countdown completed or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.shared.finished.load(Acquire)
    }

    /// Remaining time as of the most recent tick, never negative.
    pub fn remaining_millis(&self) -> i64 {
        self.shared.remaining.load(Acquire)
    }

    /// The scheduler task driving this countdown, if one was needed.
    pub fn task(&self) -> Option<TaskHandle> {
        self.scheduled.as_ref().map(|s| s.task)
    }
}

impl Debug for CountdownHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownHandle")
            .field("remaining_millis", &self.remaining_millis())
            .field("finished", &self.is_finished())
            .field("task", &self.task())
            .finish()
    }
}

/// Start a countdown on `scheduler`.
///
/// A non-positive duration completes before this returns, without any tick. Otherwise the
/// first tick is reported before this returns and the rest are left to the scheduler.
pub fn start<S>(config: CountdownConfig, scheduler: &S) -> Result<CountdownHandle, Error>
where
    S: Scheduler + Clone + Send + Sync + 'static,
{
    let shared = Arc::new(Shared {
        remaining: AtomicI64::new(config.total_millis.max(0)),
        finished: AtomicBool::new(false),
    });

    debug!("starting countdown: {:?}", config);

    if config.total_millis <= 0 {
        shared.finished.store(true, Release);
        (config.on_complete)();

        return Ok(CountdownHandle {
            shared,
            scheduled: None,
        });
    }

    let interval = config.tick_unit.interval();
    let ticker = Arc::new(Mutex::new(Ticker::new(config, Arc::clone(&shared))));

    // The task is registered before the first tick so a scheduler that refuses it leaves
    // nothing reported.
    let scheduled_ticker = Arc::clone(&ticker);
    let scheduled = scheduler.schedule_repeating(
        interval,
        Box::new(move || lock_ticker(&scheduled_ticker).tick()),
    );

    let task = match scheduled {
        Ok(task) => task,
        Err(e) => {
            shared.finished.store(true, Release);
            return Err(e);
        }
    };

    if lock_ticker(&ticker).tick().is_break() {
        scheduler.cancel(task);

        return Ok(CountdownHandle {
            shared,
            scheduled: None,
        });
    }

    Ok(CountdownHandle {
        shared,
        scheduled: Some(ScheduledTask {
            task,
            scheduler: Arc::new(scheduler.clone()),
        }),
    })
}

fn lock_ticker(ticker: &Mutex<Ticker>) -> MutexGuard<'_, Ticker> {
    ticker.lock().unwrap_or_else(PoisonError::into_inner)
}
