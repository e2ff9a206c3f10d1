//! Game time and time-based suspension points
//!
//! Game time only moves when the scheduler is stepped, so a paused or
//! test-driven game sees exactly the delays it asked for.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Slack for deadlines reached by summing many frame deltas
const DEADLINE_EPSILON: f64 = 1e-9;

/// Shared game clock (seconds since start).
#[derive(Debug, Clone, Default)]
pub struct Clock {
    now: Rc<Cell<f64>>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now.get()
    }

    /// Advance by one tick of `dt` seconds. Negative deltas are ignored.
    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt.max(0.0));
    }

    /// Suspend for `secs` of game time.
    pub fn sleep(&self, secs: f64) -> Sleep {
        Sleep {
            clock: self.clone(),
            deadline: self.now() + secs.max(0.0),
        }
    }

    /// Like `sleep`, but gives up as soon as `keep_waiting` returns false.
    /// Resolves to true if the full delay elapsed.
    pub fn sleep_while<F: FnMut() -> bool>(&self, secs: f64, keep_waiting: F) -> SleepWhile<F> {
        SleepWhile {
            sleep: self.sleep(secs),
            keep_waiting,
        }
    }
}

/// Future returned by [`Clock::sleep`]
#[derive(Debug)]
pub struct Sleep {
    clock: Clock,
    deadline: f64,
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.clock.now() + DEADLINE_EPSILON >= self.deadline {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

/// Future returned by [`Clock::sleep_while`]
pub struct SleepWhile<F> {
    sleep: Sleep,
    keep_waiting: F,
}

impl<F> Unpin for SleepWhile<F> {}

impl<F: FnMut() -> bool> Future for SleepWhile<F> {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        if Pin::new(&mut self.sleep).poll(cx).is_ready() {
            return Poll::Ready(true);
        }
        if !(self.keep_waiting)() {
            return Poll::Ready(false);
        }
        Poll::Pending
    }
}

/// Suspend until `condition` holds. Checked once per poll.
pub fn wait_until<F: FnMut() -> bool>(condition: F) -> WaitUntil<F> {
    WaitUntil { condition }
}

pub struct WaitUntil<F> {
    condition: F,
}

// The closure is never pinned structurally
impl<F> Unpin for WaitUntil<F> {}

impl<F: FnMut() -> bool> Future for WaitUntil<F> {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if (self.condition)() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}
