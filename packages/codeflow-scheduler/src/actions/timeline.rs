use super::{ValueCompleteFn, ValueTickFn, check_positive};
use crate::action::{Action, ActionContext, ActionSetup};
use crate::error::SetupError;
use crate::instance::InstanceId;
use crate::settings::ActionSettings;
use codeflow_curves::{BlendFunc, Lerp, blend};

const MIN_PLAY_RATE: f32 = 1e-4;

pub(crate) fn effective_play_rate(rate: f32) -> f32 {
    if rate.abs() > MIN_PLAY_RATE {
        rate.abs()
    } else {
        1.0
    }
}

/// Shape of a start-to-stop timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineParams<V> {
    pub start: V,
    pub stop: V,
    /// Seconds from `start` to `stop` at play rate 1.
    pub time: f32,
    pub blend: BlendFunc,
    pub blend_exp: f32,
    pub play_rate: f32,
}

impl<V> TimelineParams<V> {
    pub fn new(start: V, stop: V, time: f32) -> Self {
        Self {
            start,
            stop,
            time,
            blend: BlendFunc::Linear,
            blend_exp: 1.0,
            play_rate: 1.0,
        }
    }

    pub fn with_blend(mut self, blend: BlendFunc, exp: f32) -> Self {
        self.blend = blend;
        self.blend_exp = exp;
        self
    }

    pub fn with_play_rate(mut self, rate: f32) -> Self {
        self.play_rate = rate;
        self
    }
}

pub struct TimelinePayload<V> {
    pub params: TimelineParams<V>,
    pub on_tick: ValueTickFn<V>,
    pub on_complete: ValueCompleteFn<V>,
}

/// Blends from `start` to `stop` over `time` seconds.
///
/// Emits the start value on its first tick, then one `on_tick(value, time)`
/// per dispatched tick, and the exact stop value last.
pub struct Timeline<V: Lerp> {
    params: TimelineParams<V>,
    rate: f32,
    looping: bool,
    current: f32,
    value: V,
    reached_end: bool,
    on_tick: ValueTickFn<V>,
    on_complete: Option<ValueCompleteFn<V>>,
}

impl<V: Lerp> Timeline<V> {
    fn emit(&mut self, value: V, time: f32) {
        self.value = value;
        self.current = time;
        (self.on_tick)(value, time);
    }

    fn emit_end(&mut self) {
        if !self.reached_end {
            self.reached_end = true;
            self.emit(self.params.stop, self.params.time);
        }
    }
}

impl<V: Lerp> Action for Timeline<V> {
    fn primes_first_tick(&self) -> bool {
        true
    }

    fn prime(&mut self, _ctx: &mut ActionContext<'_>) {
        self.emit(self.params.start, 0.0);
    }

    fn tick(&mut self, ctx: &mut ActionContext<'_>, dt: f32) {
        let time = self.params.time;
        let mut position = self.current + dt * self.rate;

        if position >= time {
            if !self.looping {
                self.emit_end();
                ctx.complete();
                return;
            }
            position %= time;
        }

        let p = &self.params;
        let value = blend(p.start, p.stop, position / time, p.blend, p.blend_exp);
        self.emit(value, position);
    }

    fn deadline_reached(&mut self, _ctx: &mut ActionContext<'_>) {
        self.emit_end();
    }

    fn complete(&mut self, stopped: bool) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(self.value, self.current, stopped);
        }
    }

    fn max_action_time(&self) -> Option<f32> {
        (!self.looping).then(|| self.params.time / self.rate)
    }
}

impl<V: Lerp> ActionSetup for Timeline<V> {
    type Payload = TimelinePayload<V>;

    fn setup(
        payload: Self::Payload,
        settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        let params = payload.params;
        check_positive("timeline time", params.time)?;
        if params.blend_exp == 0.0 || params.blend_exp.is_nan() {
            return Err(SetupError::ZeroBlendExponent);
        }
        if params.start == params.stop {
            return Err(SetupError::IdenticalEndpoints);
        }

        Ok(Self {
            rate: effective_play_rate(params.play_rate),
            looping: settings.looping,
            current: 0.0,
            value: params.start,
            reached_end: false,
            params,
            on_tick: payload.on_tick,
            on_complete: Some(payload.on_complete),
        })
    }
}
