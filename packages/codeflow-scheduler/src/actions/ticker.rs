use super::{CompleteFn, TickFn};
use crate::action::{Action, ActionContext, ActionSetup};
use crate::error::SetupError;
use crate::instance::InstanceId;
use crate::settings::ActionSettings;

/// Calls `on_tick(dt)` every dispatched tick. A negative duration ticks until
/// the action is stopped or its owner goes away.
pub struct Ticker {
    duration: f32,
    on_tick: TickFn,
    on_complete: Option<CompleteFn>,
}

impl Action for Ticker {
    fn tick(&mut self, _ctx: &mut ActionContext<'_>, dt: f32) {
        (self.on_tick)(dt);
    }

    fn complete(&mut self, stopped: bool) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(stopped);
        }
    }

    fn max_action_time(&self) -> Option<f32> {
        (self.duration >= 0.0).then_some(self.duration)
    }
}

impl ActionSetup for Ticker {
    type Payload = (f32, TickFn, CompleteFn);

    fn setup(
        (duration, on_tick, on_complete): Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        if duration.is_nan() {
            return Err(SetupError::NegativeDuration(duration));
        }
        Ok(Self {
            duration,
            on_tick,
            on_complete: Some(on_complete),
        })
    }
}
