use crate::task::WakeFlag;
use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::Context;
use tracing::trace;

type Frame = Pin<Box<dyn Future<Output = ()>>>;

/// State shared between a coroutine's adapter action and its awaiters.
///
/// `finished` is raised on every exit path: when the frame returns, and when
/// the adapter is dropped early. The frame itself is released only once the
/// adapter is gone or done and no awaiter action still points at it.
pub struct CoroutinePromise {
    frame: RefCell<Option<Frame>>,
    finished: Cell<bool>,
    outstanding: Cell<usize>,
    wake: WakeFlag,
}

impl CoroutinePromise {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            frame: RefCell::new(None),
            finished: Cell::new(false),
            outstanding: Cell::new(0),
            wake: WakeFlag::new(),
        })
    }

    pub(crate) fn install(&self, frame: Frame) {
        *self.frame.borrow_mut() = Some(frame);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }

    #[cfg(test)]
    pub(crate) fn has_frame(&self) -> bool {
        self.frame.try_borrow().map_or(true, |frame| frame.is_some())
    }

    #[cfg(test)]
    pub(crate) fn outstanding(&self) -> usize {
        self.outstanding.get()
    }

    /// Polls the frame once. When the frame is already being polled further
    /// up the stack, the resume is turned into a wake-up for the next tick.
    pub(crate) fn resume(&self) {
        if self.finished.get() {
            return;
        }
        let Ok(mut slot) = self.frame.try_borrow_mut() else {
            self.wake.raise();
            return;
        };
        let Some(frame) = slot.as_mut() else {
            return;
        };

        let waker = self.wake.waker();
        let mut cx = Context::from_waker(&waker);
        if frame.as_mut().poll(&mut cx).is_ready() {
            trace!("coroutine returned");
            self.finished.set(true);
        }

        let done = if self.finished.get() && self.outstanding.get() == 0 {
            slot.take()
        } else {
            None
        };
        drop(slot);
        drop(done);
    }

    pub(crate) fn take_wake(&self) -> bool {
        self.wake.take()
    }

    /// The adapter is going away.
    pub(crate) fn abandon(&self) {
        self.finished.set(true);
        if self.outstanding.get() == 0 {
            self.release_frame();
        } else {
            trace!(outstanding = self.outstanding.get(), "coroutine frame parked");
        }
    }

    fn release_frame(&self) {
        // a frame that is mid-poll is released by `resume` once it yields
        let frame = match self.frame.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        drop(frame);
    }
}

/// An awaiter action's hold on its coroutine.
///
/// Counts as an outstanding request for as long as it lives.
pub struct AwaiterLink {
    promise: Rc<CoroutinePromise>,
    result: Rc<Cell<Option<super::AwaitResult>>>,
}

impl AwaiterLink {
    pub(crate) fn new(
        promise: Rc<CoroutinePromise>,
        result: Rc<Cell<Option<super::AwaitResult>>>,
    ) -> Self {
        promise.outstanding.set(promise.outstanding.get() + 1);
        Self { promise, result }
    }

    pub(crate) fn resolve(&self, result: super::AwaitResult) {
        self.result.set(Some(result));
        self.promise.resume();
    }
}

impl Drop for AwaiterLink {
    fn drop(&mut self) {
        let left = self.promise.outstanding.get().saturating_sub(1);
        self.promise.outstanding.set(left);
        if left == 0 && self.promise.finished.get() {
            self.promise.release_frame();
        }
    }
}
