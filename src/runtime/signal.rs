//! One-shot signals
//!
//! A `Signal` is a latch: once fired it stays fired, and every waiter (past
//! or future) completes. Cloning shares the latch.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

#[derive(Debug, Clone, Default)]
pub struct Signal {
    fired: Rc<Cell<bool>>,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        self.fired.set(true);
    }

    pub fn is_fired(&self) -> bool {
        self.fired.get()
    }

    /// Suspend until the signal fires.
    pub fn wait(&self) -> SignalWait {
        SignalWait { signal: self.clone() }
    }
}

#[derive(Debug)]
pub struct SignalWait {
    signal: Signal,
}

impl Future for SignalWait {
    type Output = ();

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
        if self.signal.is_fired() {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}
