use super::timeline::effective_play_rate;
use super::{ValueCompleteFn, ValueTickFn};
use crate::action::{Action, ActionContext, ActionSetup};
use crate::error::SetupError;
use crate::instance::InstanceId;
use crate::settings::ActionSettings;
use codeflow_curves::CurveEvaluator;
use std::rc::Rc;

type Value<C> = <C as CurveEvaluator>::Value;

pub struct CustomTimelinePayload<C: CurveEvaluator> {
    pub curve: Option<Rc<C>>,
    pub play_rate: f32,
    pub on_tick: ValueTickFn<Value<C>>,
    pub on_complete: ValueCompleteFn<Value<C>>,
}

/// Plays a curve from its first to its last key.
///
/// The first dispatched tick emits `(sample(t_min), t_min)` without moving
/// the playhead. A non-looping timeline ends with exactly
/// `(sample(t_max), t_max)`.
pub struct CustomTimeline<C: CurveEvaluator> {
    curve: Rc<C>,
    t_min: f32,
    t_max: f32,
    rate: f32,
    looping: bool,
    current: f32,
    value: Value<C>,
    reached_end: bool,
    on_tick: ValueTickFn<Value<C>>,
    on_complete: Option<ValueCompleteFn<Value<C>>>,
}

impl<C: CurveEvaluator> CustomTimeline<C> {
    fn emit_at(&mut self, time: f32) {
        self.current = time;
        self.value = self.curve.sample(time);
        (self.on_tick)(self.value, time);
    }

    fn emit_end(&mut self) {
        if !self.reached_end {
            self.reached_end = true;
            self.emit_at(self.t_max);
        }
    }

    fn length(&self) -> f32 {
        (self.t_max - self.t_min) / self.rate
    }
}

impl<C: CurveEvaluator + 'static> Action for CustomTimeline<C> {
    fn primes_first_tick(&self) -> bool {
        true
    }

    fn prime(&mut self, _ctx: &mut ActionContext<'_>) {
        self.emit_at(self.t_min);
    }

    fn tick(&mut self, ctx: &mut ActionContext<'_>, dt: f32) {
        let mut position = self.current + dt * self.rate;

        if position >= self.t_max {
            if !self.looping {
                self.emit_end();
                ctx.complete();
                return;
            }
            let span = self.t_max - self.t_min;
            position = if span > 0.0 {
                self.t_min + (position - self.t_min) % span
            } else {
                self.t_min
            };
        }

        self.emit_at(position);
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
        (!self.looping).then(|| self.length())
    }
}

impl<C: CurveEvaluator + 'static> ActionSetup for CustomTimeline<C> {
    type Payload = CustomTimelinePayload<C>;

    fn setup(
        payload: Self::Payload,
        settings: &ActionSettings,
        _instance: Option<InstanceId>,
    ) -> Result<Self, SetupError> {
        let curve = payload.curve.ok_or(SetupError::MissingCurve)?;
        let (t_min, t_max) = curve.time_range();
        if !t_min.is_finite() || !t_max.is_finite() || t_min > t_max {
            return Err(SetupError::InvertedCurveRange {
                min: t_min,
                max: t_max,
            });
        }

        let value = curve.sample(t_min);
        Ok(Self {
            curve,
            t_min,
            t_max,
            rate: effective_play_rate(payload.play_rate),
            looping: settings.looping,
            current: t_min,
            value,
            reached_end: false,
            on_tick: payload.on_tick,
            on_complete: Some(payload.on_complete),
        })
    }
}
