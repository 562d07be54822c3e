//! Coroutines on top of the action scheduler.
//!
//! A coroutine is any `Future<Output = ()>`; [`FlowScheduler::add_coroutine`]
//! wraps it in a [`Coroutine`] action. Inside, the [`CoroutineContext`]
//! hands out awaiters that register their own actions and resume the
//! coroutine synchronously when those complete:
//!
//! ```
//! # use codeflow_scheduler::{ActionSettings, FlowScheduler, Owners};
//! # use std::rc::Rc;
//! let owners = Rc::new(Owners::new());
//! let flow = FlowScheduler::new(owners.clone());
//! let door = owners.spawn();
//! flow.add_coroutine(door, |ctx| async move {
//!     ctx.wait_seconds(1.5).await;
//!     let res = ctx.wait_until(|_| true, 5.0).await;
//!     assert!(!res.timed_out);
//! }, ActionSettings::default());
//! ```

mod adapter;
mod awaiters;
mod promise;

pub use adapter::Coroutine;
pub use awaiters::{WaitSeconds, WaitTicks, WaitUntil};
pub use promise::{AwaiterLink, CoroutinePromise};

use crate::action::ActionSetup;
use crate::error::SetupError;
use crate::handle::ActionHandle;
use crate::owner::OwnerId;
use crate::scheduler::{FlowScheduler, WeakFlowScheduler};
use crate::settings::ActionSettings;
use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};
use tracing::debug;

/// What an awaiter resolved with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AwaitResult {
    pub timed_out: bool,
    /// The awaiter was stopped with completion, or could not be registered.
    pub stopped: bool,
}

impl AwaitResult {
    const REJECTED: AwaitResult = AwaitResult {
        timed_out: false,
        stopped: true,
    };
}

type ResultCell = Rc<Cell<Option<AwaitResult>>>;
type Register = Box<dyn FnOnce(ResultCell) -> Result<ActionHandle, SetupError>>;

/// Future returned by the [`CoroutineContext`] wait methods.
///
/// The backing action is registered on first poll. Dropping the future
/// before it resolves stops that action silently.
#[must_use = "awaiters do nothing unless awaited"]
pub struct Await {
    register: Option<Register>,
    result: ResultCell,
    scheduler: WeakFlowScheduler,
    handle: ActionHandle,
}

impl Await {
    pub fn handle(&self) -> ActionHandle {
        self.handle
    }
}

impl Future for Await {
    type Output = AwaitResult;

    fn poll(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<AwaitResult> {
        let this = &mut *self;
        if let Some(register) = this.register.take() {
            match register(this.result.clone()) {
                Ok(handle) => this.handle = handle,
                Err(err) => {
                    debug!(%err, "awaiter rejected");
                    return Poll::Ready(AwaitResult::REJECTED);
                }
            }
        }
        match this.result.take() {
            Some(result) => {
                this.handle.invalidate();
                Poll::Ready(result)
            }
            None => Poll::Pending,
        }
    }
}

impl Drop for Await {
    fn drop(&mut self) {
        if !self.handle.is_valid() {
            return;
        }
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.stop(self.handle, false);
        }
    }
}

/// Handed to a coroutine factory. Cheap to clone.
#[derive(Clone)]
pub struct CoroutineContext {
    scheduler: WeakFlowScheduler,
    owner: OwnerId,
    promise: Weak<CoroutinePromise>,
    settings: ActionSettings,
}

impl CoroutineContext {
    pub(crate) fn new(
        scheduler: WeakFlowScheduler,
        owner: OwnerId,
        promise: Weak<CoroutinePromise>,
        settings: ActionSettings,
    ) -> Self {
        Self {
            scheduler,
            owner,
            promise,
            settings,
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Settings applied to awaiters created from this context. Their
    /// `start_paused` and `first_delay` are ignored.
    pub fn settings(&self) -> ActionSettings {
        self.settings
    }

    pub fn with_settings(&self, settings: ActionSettings) -> Self {
        Self {
            settings,
            ..self.clone()
        }
    }

    pub fn scheduler(&self) -> Option<FlowScheduler> {
        self.scheduler.upgrade()
    }

    pub fn wait_seconds(&self, seconds: f32) -> Await {
        self.awaiter::<WaitSeconds>(move |link| (seconds, link))
    }

    pub fn wait_ticks(&self, ticks: u32) -> Await {
        self.awaiter::<WaitTicks>(move |link| (ticks, link))
    }

    /// Resolves once `predicate(dt)` holds, or with `timed_out` after
    /// `timeout` seconds when `timeout > 0`.
    pub fn wait_until(&self, predicate: impl FnMut(f32) -> bool + 'static, timeout: f32) -> Await {
        let predicate: Box<dyn FnMut(f32) -> bool> = Box::new(predicate);
        self.awaiter::<WaitUntil>(move |link| (timeout, predicate, link))
    }

    /// Awaiters start on the tick after they are awaited, unpaused, whatever
    /// delay or start pause the coroutine itself was added with.
    fn awaiter_settings(&self) -> ActionSettings {
        ActionSettings {
            start_paused: false,
            first_delay: 0.0,
            ..self.settings
        }
    }

    fn awaiter<T: ActionSetup>(
        &self,
        payload: impl FnOnce(AwaiterLink) -> T::Payload + 'static,
    ) -> Await {
        let ctx = self.clone();
        let register: Register = Box::new(move |result| {
            let scheduler = ctx.scheduler.upgrade().ok_or(SetupError::Detached)?;
            let promise = ctx.promise.upgrade().ok_or(SetupError::Detached)?;
            let link = AwaiterLink::new(promise, result);
            scheduler.try_add::<T>(ctx.owner, payload(link), ctx.awaiter_settings(), None)
        });

        Await {
            register: Some(register),
            result: Rc::new(Cell::new(None)),
            scheduler: self.scheduler.clone(),
            handle: ActionHandle::INVALID,
        }
    }
}
