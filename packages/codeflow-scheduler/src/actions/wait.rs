use super::{ExecuteFn, PredicateFn, TickFn};
use crate::action::{Action, ActionContext, ActionSetup};
use crate::error::SetupError;
use crate::instance::InstanceId;
use crate::settings::ActionSettings;

fn check_timeout(timeout: f32) -> Result<(), SetupError> {
    if timeout.is_nan() {
        return Err(SetupError::InvalidSettings("timeout must not be NaN"));
    }
    Ok(())
}

pub struct WaitAndExecutePayload {
    /// Seconds before giving up; `<= 0` waits forever.
    pub timeout: f32,
    pub predicate: PredicateFn,
    pub on_execute: ExecuteFn,
    pub on_wait: TickFn,
}

/// Polls a predicate every tick and calls `on_execute(timed_out, stopped)`
/// once it holds or the timeout runs out.
pub struct WaitAndExecute {
    timeout: f32,
    elapsed: f32,
    timed_out: bool,
    predicate: PredicateFn,
    on_execute: Option<ExecuteFn>,
    on_wait: TickFn,
}

impl Action for WaitAndExecute {
    fn tick(&mut self, ctx: &mut ActionContext<'_>, dt: f32) {
        (self.on_wait)(dt);
        if (self.predicate)() {
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
        if let Some(on_execute) = self.on_execute.take() {
            on_execute(self.timed_out && !stopped, stopped);
        }
    }
}

impl ActionSetup for WaitAndExecute {
    type Payload = WaitAndExecutePayload;

    fn setup(
        payload: Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        check_timeout(payload.timeout)?;
        Ok(Self {
            timeout: payload.timeout,
            elapsed: 0.0,
            timed_out: false,
            predicate: payload.predicate,
            on_execute: Some(payload.on_execute),
            on_wait: payload.on_wait,
        })
    }
}

pub struct WhileTrueExecutePayload {
    /// Seconds before giving up; `<= 0` runs for as long as the predicate holds.
    pub timeout: f32,
    pub predicate: PredicateFn,
    pub on_execute: TickFn,
    /// `on_complete(timed_out, stopped)`
    pub on_complete: ExecuteFn,
}

/// Calls `on_execute(dt)` every tick while the predicate holds.
pub struct WhileTrueExecute {
    timeout: f32,
    elapsed: f32,
    timed_out: bool,
    predicate: PredicateFn,
    on_execute: TickFn,
    on_complete: Option<ExecuteFn>,
}

impl Action for WhileTrueExecute {
    fn tick(&mut self, ctx: &mut ActionContext<'_>, dt: f32) {
        if !(self.predicate)() {
            ctx.complete();
            return;
        }
        (self.on_execute)(dt);

        self.elapsed += dt;
        if self.timeout > 0.0 && self.elapsed >= self.timeout {
            self.timed_out = true;
            ctx.complete();
        }
    }

    fn complete(&mut self, stopped: bool) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(self.timed_out && !stopped, stopped);
        }
    }
}

impl ActionSetup for WhileTrueExecute {
    type Payload = WhileTrueExecutePayload;

    fn setup(
        payload: Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        check_timeout(payload.timeout)?;
        Ok(Self {
            timeout: payload.timeout,
            elapsed: 0.0,
            timed_out: false,
            predicate: payload.predicate,
            on_execute: payload.on_execute,
            on_complete: Some(payload.on_complete),
        })
    }
}

