use futures::task::{ArcWake, waker};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::Waker;

struct FlagWaker {
    woken: AtomicBool,
}

impl ArcWake for FlagWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.woken.store(true, Ordering::Release);
    }
}

/// Wake signal for a coroutine frame.
///
/// The scheduler is single-threaded, but a `Waker` must be `Send + Sync`, and
/// futures the coroutine awaits may hand it to another thread. Waking only
/// raises a flag; the frame is polled on the next scheduler tick.
#[derive(Clone)]
pub(crate) struct WakeFlag {
    inner: Arc<FlagWaker>,
}

impl WakeFlag {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(FlagWaker {
                woken: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn waker(&self) -> Waker {
        waker(self.inner.clone())
    }

    pub(crate) fn raise(&self) {
        self.inner.woken.store(true, Ordering::Release);
    }

    /// Reads and clears the flag.
    pub(crate) fn take(&self) -> bool {
        self.inner.woken.swap(false, Ordering::AcqRel)
    }
}
