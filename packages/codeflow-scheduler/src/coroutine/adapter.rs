use super::promise::CoroutinePromise;
use crate::action::{Action, ActionContext, ActionSetup};
use crate::error::SetupError;
use crate::instance::InstanceId;
use crate::settings::ActionSettings;
use std::rc::Rc;

/// Drives a coroutine frame. Suspended coroutines cost nothing per tick
/// beyond a flag check.
pub struct Coroutine {
    promise: Rc<CoroutinePromise>,
}

impl Coroutine {
    fn settle(&self, ctx: &mut ActionContext<'_>) {
        if self.promise.is_finished() {
            ctx.finish();
        }
    }
}

impl Action for Coroutine {
    fn init(&mut self, ctx: &mut ActionContext<'_>) {
        self.promise.resume();
        self.settle(ctx);
    }

    fn tick(&mut self, ctx: &mut ActionContext<'_>, _dt: f32) {
        if self.promise.take_wake() {
            self.promise.resume();
        }
        self.settle(ctx);
    }
}

impl Drop for Coroutine {
    fn drop(&mut self) {
        self.promise.abandon();
    }
}

impl ActionSetup for Coroutine {
    type Payload = Rc<CoroutinePromise>;

    fn setup(
        promise: Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        Ok(Self { promise })
    }
}
