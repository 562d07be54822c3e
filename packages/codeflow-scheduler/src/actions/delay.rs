use super::{CompleteFn, check_duration};
use crate::action::{Action, ActionContext, ActionSetup};
use crate::error::SetupError;
use crate::instance::InstanceId;
use crate::settings::ActionSettings;

/// Calls `on_complete` once `seconds` of effective time have passed.
pub struct Delay {
    seconds: f32,
    elapsed: f32,
    on_complete: Option<CompleteFn>,
}

impl Action for Delay {
    fn tick(&mut self, ctx: &mut ActionContext<'_>, dt: f32) {
        self.elapsed += dt;
        if self.elapsed >= self.seconds {
            ctx.complete();
        }
    }

    fn complete(&mut self, stopped: bool) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(stopped);
        }
    }
}

impl ActionSetup for Delay {
    type Payload = (f32, CompleteFn);

    fn setup(
        (seconds, on_complete): Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        check_duration(seconds)?;
        Ok(Self {
            seconds,
            elapsed: 0.0,
            on_complete: Some(on_complete),
        })
    }
}

/// Like [`Delay`] but counts dispatched ticks. Both `0` and `1` fire on the
/// first tick.
pub struct DelayTicks {
    ticks: u32,
    counted: u32,
    on_complete: Option<CompleteFn>,
}

impl Action for DelayTicks {
    fn tick(&mut self, ctx: &mut ActionContext<'_>, _dt: f32) {
        self.counted = self.counted.saturating_add(1);
        if self.counted >= self.ticks {
            ctx.complete();
        }
    }

    fn complete(&mut self, stopped: bool) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(stopped);
        }
    }
}

impl ActionSetup for DelayTicks {
    type Payload = (u32, CompleteFn);

    fn setup(
        (ticks, on_complete): Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        Ok(Self {
            ticks,
            counted: 0,
            on_complete: Some(on_complete),
        })
    }
}
