//! Execution gates keyed by instance id. All of them use the reuse policy:
//! adding again under a live instance id retriggers the running gate instead
//! of starting a new one.

use super::check_positive;
use crate::action::{Action, ActionContext, ActionSetup, InstancePolicy};
use crate::error::SetupError;
use crate::instance::InstanceId;
use crate::settings::ActionSettings;

/// Runs `f` on its first tick.
///
/// With an instance id the gate stays live afterwards and swallows every
/// later add under that id until it is stopped. Without one it finishes
/// right away.
pub struct DoOnce {
    f: Option<Box<dyn FnOnce()>>,
}

impl Action for DoOnce {
    fn init(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some(f) = self.f.take() {
            f();
        }
        if ctx.instance().is_none() {
            ctx.finish();
        }
    }

    fn tick(&mut self, _ctx: &mut ActionContext<'_>, _dt: f32) {}
}

impl ActionSetup for DoOnce {
    type Payload = Box<dyn FnOnce()>;
    const INSTANCE_POLICY: InstancePolicy = InstancePolicy::Reuse;

    fn setup(
        f: Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        Ok(Self { f: Some(f) })
    }
}

/// Runs `f(count)` on its first tick and on every retrigger until it ran
/// `times` times. `count` starts at 1.
pub struct DoNTimes {
    times: u32,
    count: u32,
    f: Box<dyn FnMut(u32)>,
}

impl DoNTimes {
    fn run(&mut self) {
        if self.count < self.times {
            self.count += 1;
            (self.f)(self.count);
        }
    }
}

impl Action for DoNTimes {
    fn init(&mut self, ctx: &mut ActionContext<'_>) {
        self.run();
        if ctx.instance().is_none() {
            ctx.finish();
        }
    }

    fn tick(&mut self, _ctx: &mut ActionContext<'_>, _dt: f32) {}

    fn retrigger(&mut self, _ctx: &mut ActionContext<'_>) {
        self.run();
    }
}

impl ActionSetup for DoNTimes {
    type Payload = (u32, Box<dyn FnMut(u32)>);
    const INSTANCE_POLICY: InstancePolicy = InstancePolicy::Reuse;

    fn setup(
        (times, f): Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        if times == 0 {
            return Err(SetupError::ZeroCount("times"));
        }
        Ok(Self { times, count: 0, f })
    }
}

/// Runs `f` on its first tick, then keeps the instance id locked for
/// `lock_time` seconds.
pub struct TimeLock {
    lock_time: f32,
    elapsed: f32,
    f: Option<Box<dyn FnOnce()>>,
}

impl Action for TimeLock {
    fn init(&mut self, _ctx: &mut ActionContext<'_>) {
        if let Some(f) = self.f.take() {
            f();
        }
    }

    fn tick(&mut self, ctx: &mut ActionContext<'_>, dt: f32) {
        self.elapsed += dt;
        if self.elapsed >= self.lock_time {
            ctx.finish();
        }
    }
}

impl ActionSetup for TimeLock {
    type Payload = (f32, Box<dyn FnOnce()>);
    const INSTANCE_POLICY: InstancePolicy = InstancePolicy::Reuse;

    fn setup(
        (lock_time, f): Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        check_positive("lock time", lock_time)?;
        Ok(Self {
            lock_time,
            elapsed: 0.0,
            f: Some(f),
        })
    }
}

/// Runs `f` at most once per `time` seconds.
///
/// The first run happens on the first tick. Retriggers that arrive inside
/// the window are queued, up to `max_enqueued`, and released one per window.
/// The gate finishes once a window passes with nothing queued.
pub struct DoNoMoreThanXTime {
    time: f32,
    max_enqueued: u32,
    enqueued: u32,
    since_last: f32,
    f: Box<dyn FnMut()>,
}

impl Action for DoNoMoreThanXTime {
    fn init(&mut self, _ctx: &mut ActionContext<'_>) {
        (self.f)();
        self.since_last = 0.0;
    }

    fn tick(&mut self, ctx: &mut ActionContext<'_>, dt: f32) {
        self.since_last += dt;
        if self.since_last < self.time {
            return;
        }
        if self.enqueued > 0 {
            self.enqueued -= 1;
            self.since_last = 0.0;
            (self.f)();
        } else {
            ctx.finish();
        }
    }

    fn retrigger(&mut self, _ctx: &mut ActionContext<'_>) {
        if self.enqueued < self.max_enqueued {
            self.enqueued += 1;
        }
    }
}

impl ActionSetup for DoNoMoreThanXTime {
    type Payload = (f32, u32, Box<dyn FnMut()>);
    const INSTANCE_POLICY: InstancePolicy = InstancePolicy::Reuse;

    fn setup(
        (time, max_enqueued, f): Self::Payload,
        _settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        check_positive("window time", time)?;
        if max_enqueued == 0 {
            return Err(SetupError::ZeroCount("max_enqueued"));
        }
        Ok(Self {
            time,
            max_enqueued,
            enqueued: 0,
            since_last: 0.0,
            f,
        })
    }
}
