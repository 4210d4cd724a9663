#![cfg_attr(not(test), no_std)]

//! A one-bit "something is ready" flag with a single consumer.
//!
//! The producer calls [`AsyncFlag::set`] (usually from a timer callback or an
//! interrupt), the consumer either polls it with [`AsyncFlag::take`] or awaits
//! [`AsyncFlag::wait`]. Both consumer paths clear the flag, so every `set` is
//! observed at most once.

use core::future::Future;
use core::sync::atomic::AtomicBool;
use core::sync::atomic::Ordering;
use core::task::Poll;
use embassy_sync::waitqueue::AtomicWaker;

pub struct Wait<'a> {
    flag: &'a AtomicBool,
    waker: &'a AtomicWaker,
}

impl<'a> Future for Wait<'a> {
    type Output = ();

    fn poll(
        self: core::pin::Pin<&mut Self>,
        cx: &mut core::task::Context<'_>,
    ) -> Poll<Self::Output> {
        self.waker.register(cx.waker());

        // Acquire pairs with the Release in `set`, anything written before
        // `set` is visible once we return Ready.
        if self.flag.swap(false, Ordering::AcqRel) {
            Poll::Ready(())
        } else {
            Poll::Pending
        }
    }
}

pub struct AsyncFlag {
    flag: AtomicBool,
    waker: AtomicWaker,
}

impl Default for AsyncFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncFlag {
    pub const fn new() -> Self {
        AsyncFlag {
            flag: AtomicBool::new(false),
            waker: AtomicWaker::new(),
        }
    }

    /// Raises the flag and wakes the waiting consumer, if any.
    ///
    /// Returns `true` if the flag was already raised, meaning the previous
    /// event was never consumed.
    pub fn set(&self) -> bool {
        let was_set = self.flag.swap(true, Ordering::AcqRel);
        self.waker.wake();
        was_set
    }

    /// Test-and-clear.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Drops a pending event without consuming it.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }

    /// Resolves once the flag is raised, clearing it.
    pub fn wait(&self) -> Wait<'_> {
        Wait {
            flag: &self.flag,
            waker: &self.waker,
        }
    }
}
