use super::AwaitResult;
use super::promise::AwaiterLink;
use crate::action::{Action, ActionContext, ActionSetup};
use crate::actions::check_duration;
use crate::error::SetupError;
use crate::instance::InstanceId;
use crate::settings::ActionSettings;

/// Resumes its coroutine after `seconds` of effective time.
pub struct WaitSeconds {
    seconds: f32,
    elapsed: f32,
    link: AwaiterLink,
}

impl Action for WaitSeconds {
    fn tick(&mut self, ctx: &mut ActionContext<'_>, dt: f32) {
        self.elapsed += dt;
        if self.elapsed >= self.seconds {
            ctx.complete();
        }
    }

    fn complete(&mut self, stopped: bool) {
        self.link.resolve(AwaitResult {
            timed_out: false,
            stopped,
        });
    }
}

impl ActionSetup for WaitSeconds {
    type Payload = (f32, AwaiterLink);

    fn setup(
        (seconds, link): Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        check_duration(seconds)?;
        Ok(Self {
            seconds,
            elapsed: 0.0,
            link,
        })
    }
}

/// Resumes its coroutine after `ticks` dispatched ticks.
pub struct WaitTicks {
    ticks: u32,
    counted: u32,
    link: AwaiterLink,
}

impl Action for WaitTicks {
    fn tick(&mut self, ctx: &mut ActionContext<'_>, _dt: f32) {
        self.counted = self.counted.saturating_add(1);
        if self.counted >= self.ticks {
            ctx.complete();
        }
    }

    fn complete(&mut self, stopped: bool) {
        self.link.resolve(AwaitResult {
            timed_out: false,
            stopped,
        });
    }
}

impl ActionSetup for WaitTicks {
    type Payload = (u32, AwaiterLink);

    fn setup(
        (ticks, link): Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        Ok(Self {
            ticks,
            counted: 0,
            link,
        })
    }
}

/// Resumes its coroutine once `predicate(dt)` holds or `timeout` runs out.
pub struct WaitUntil {
    timeout: f32,
    elapsed: f32,
    timed_out: bool,
    predicate: Box<dyn FnMut(f32) -> bool>,
    link: AwaiterLink,
}

impl Action for WaitUntil {
    fn tick(&mut self, ctx: &mut ActionContext<'_>, dt: f32) {
        if (self.predicate)(dt) {
            ctx.complete();
            return;
        }
        self.elapsed += dt;
        if self.timeout > 0.0 && self.elapsed >= self.timeout {
            self.timed_out = true;
            ctx.complete();
        }
    }

    fn complete(&mut self, stopped: bool) {
        self.link.resolve(AwaitResult {
            timed_out: self.timed_out && !stopped,
            stopped,
        });
    }
}

impl ActionSetup for WaitUntil {
    type Payload = (f32, Box<dyn FnMut(f32) -> bool>, AwaiterLink);

    fn setup(
        (timeout, predicate, link): Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        if timeout.is_nan() {
            return Err(SetupError::InvalidSettings("timeout must not be NaN"));
        }
        Ok(Self {
            timeout,
            elapsed: 0.0,
            timed_out: false,
            predicate,
            link,
        })
    }
}
