//! Single-threaded frame clock and delayed continuations.
//!
//! Nothing here runs on another thread. Time moves only when the host calls
//! [`Scheduler::advance`] once per frame; due continuations run inside that call.

use std::cell::Cell;
use std::rc::Rc;

use crate::error::{CoreError, Result};

/// Shared unscaled-time counter in seconds. Clones observe the same time.
#[derive(Clone, Debug, Default)]
pub struct FrameClock(Rc<Cell<f64>>);

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(seconds: f64) -> Self {
        Self(Rc::new(Cell::new(seconds)))
    }

    pub fn now(&self) -> f64 {
        self.0.get()
    }

    /// Move time forward. Negative steps are ignored; the clock never runs backwards.
    pub fn advance(&self, dt: f64) {
        if dt > 0.0 {
            self.0.set(self.0.get() + dt);
        }
    }
}

type Continuation = Box<dyn FnOnce() -> Result<()>>;

struct Timer {
    label: &'static str,
    due: f64,
    seq: u64,
    alive: Rc<Cell<bool>>,
    run: Continuation,
}

/// Liveness flag of one scheduled continuation.
#[derive(Clone, Debug)]
pub struct TimerHandle {
    alive: Rc<Cell<bool>>,
}

impl TimerHandle {
    /// Drop the continuation without running it. No-op once it has run.
    pub fn cancel(&self) {
        self.alive.set(false);
    }

    pub fn is_pending(&self) -> bool {
        self.alive.get()
    }

    /// A view that can observe the continuation but not cancel it.
    pub fn status(&self) -> TimerStatus {
        TimerStatus {
            alive: Rc::clone(&self.alive),
        }
    }
}

/// Read-only liveness of one scheduled continuation.
#[derive(Clone, Debug)]
pub struct TimerStatus {
    alive: Rc<Cell<bool>>,
}

impl TimerStatus {
    pub fn is_pending(&self) -> bool {
        self.alive.get()
    }
}

pub struct Scheduler {
    clock: FrameClock,
    timers: Vec<Timer>,
    next_seq: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_clock(FrameClock::new())
    }

    pub fn with_clock(clock: FrameClock) -> Self {
        Self {
            clock,
            timers: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn clock(&self) -> FrameClock {
        self.clock.clone()
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    /// Number of continuations still waiting (cancelled ones excluded).
    pub fn pending(&self) -> usize {
        self.timers.iter().filter(|t| t.alive.get()).count()
    }

    /// Run `f` once `delay` seconds of frame time have elapsed.
    pub fn after(
        &mut self,
        label: &'static str,
        delay: f64,
        f: impl FnOnce() -> Result<()> + 'static,
    ) -> TimerHandle {
        let alive = Rc::new(Cell::new(true));
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.push(Timer {
            label,
            due: self.clock.now() + delay.max(0.0),
            seq,
            alive: Rc::clone(&alive),
            run: Box::new(f),
        });
        tracing::trace!(timer = label, delay, "scheduled");
        TimerHandle { alive }
    }

    /// Advance the clock and run every due continuation in due order.
    /// Failures are logged once and returned.
    pub fn advance(&mut self, dt: f64) -> Vec<CoreError> {
        self.clock.advance(dt);
        let now = self.clock.now();

        let (mut due, waiting): (Vec<Timer>, Vec<Timer>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.due <= now);
        self.timers = waiting;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));

        let mut errors = Vec::new();
        for timer in due {
            if !timer.alive.get() {
                tracing::trace!(timer = timer.label, "cancelled before due");
                continue;
            }
            timer.alive.set(false);
            if let Err(e) = (timer.run)() {
                tracing::error!(timer = timer.label, "delayed step failed: {e}");
                errors.push(e);
            }
        }
        self.timers.retain(|t| t.alive.get());
        errors
    }
}
