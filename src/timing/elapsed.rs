use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::timing::clock::{SystemClock, TimeSource};

enum TimeBase {
    Clock(Rc<dyn TimeSource>),
    Parent(ElapsedTime),
}

struct Inner {
    base: TimeBase,
    last_queried: f64,
    start_time: f64,
    frozen_time: f64,
    paused: bool,
    held: bool,
}

/// Stopwatch measuring seconds since the last `reset`.
///
/// Clones share state. A timer created with [`ElapsedTime::child_of`] measures against its
/// parent's elapsed time, so holding, pausing or adjusting the parent propagates to every child.
#[derive(Clone)]
pub struct ElapsedTime {
    inner: Rc<RefCell<Inner>>,
}

impl ElapsedTime {
    pub fn new(clock: Rc<dyn TimeSource>) -> Self {
        Self::with_base(TimeBase::Clock(clock))
    }

    pub fn system() -> Self {
        Self::new(Rc::new(SystemClock::new()))
    }

    pub fn child_of(parent: &ElapsedTime) -> Self {
        Self::with_base(TimeBase::Parent(parent.clone()))
    }

    fn with_base(base: TimeBase) -> Self {
        let start_time = base_time(&base);
        Self {
            inner: Rc::new(RefCell::new(Inner {
                base,
                last_queried: 0.0,
                start_time,
                frozen_time: 0.0,
                paused: false,
                held: false,
            })),
        }
    }

    pub fn reset(&self) {
        let now = self.current_time();
        let mut inner = self.inner.borrow_mut();
        inner.last_queried = 0.0;
        inner.start_time = now;
        inner.frozen_time = 0.0;
        inner.paused = false;
        inner.held = false;
    }

    /// Elapsed seconds; also records the value as the last queried time.
    pub fn elapsed(&self) -> f64 {
        let value = self.elapsed_impl();
        self.inner.borrow_mut().last_queried = value;
        value
    }

    pub fn last_queried(&self) -> f64 {
        self.inner.borrow().last_queried
    }

    pub fn pause(&self) {
        let frozen = self.elapsed_impl();
        let mut inner = self.inner.borrow_mut();
        inner.frozen_time = frozen;
        inner.paused = true;
    }

    pub fn resume(&self) {
        self.inner.borrow_mut().paused = false;
        let paused_for = self.elapsed_impl() - self.inner.borrow().frozen_time;
        self.inner.borrow_mut().start_time += paused_for;
    }

    /// Freeze the reported time until [`release`](Self::release). A nested hold keeps the
    /// time frozen by the first one.
    pub fn hold(&self) {
        let frozen = self.elapsed_impl();
        let mut inner = self.inner.borrow_mut();
        inner.frozen_time = frozen;
        inner.held = true;
    }

    pub fn release(&self) {
        self.inner.borrow_mut().held = false;
    }

    pub fn is_held(&self) -> bool {
        self.inner.borrow().held
    }

    /// Make the elapsed time larger by `offset` (smaller for negative offsets).
    pub fn adjust(&self, offset: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.start_time -= offset;
        if inner.held || inner.paused {
            inner.frozen_time += offset;
        }
    }

    fn current_time(&self) -> f64 {
        base_time(&self.inner.borrow().base)
    }

    fn elapsed_impl(&self) -> f64 {
        let start = {
            let inner = self.inner.borrow();
            if inner.held || inner.paused {
                return inner.frozen_time;
            }
            inner.start_time
        };
        self.current_time() - start
    }
}

fn base_time(base: &TimeBase) -> f64 {
    match base {
        TimeBase::Clock(clock) => clock.now(),
        TimeBase::Parent(parent) => parent.elapsed_impl(),
    }
}

impl fmt::Debug for ElapsedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ElapsedTime")
            .field("start_time", &inner.start_time)
            .field("frozen_time", &inner.frozen_time)
            .field("paused", &inner.paused)
            .field("held", &inner.held)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timing/elapsed.rs"]
mod tests;
