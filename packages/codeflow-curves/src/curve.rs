use crate::error::CurveError;
use crate::value::{Lerp, LinearColor};
use glam::Vec3;
use smallvec::SmallVec;

/// Anything a timeline can play back.
///
/// Hosts usually implement this on top of their own curve assets.
pub trait CurveEvaluator {
    type Value: Lerp;

    /// Returns `(t_min, t_max)`.
    fn time_range(&self) -> (f32, f32);

    fn sample(&self, time: f32) -> Self::Value;

    fn length(&self) -> f32 {
        let (min, max) = self.time_range();
        max - min
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveKey<V> {
    pub time: f32,
    pub value: V,
}

impl<V> CurveKey<V> {
    pub fn new(time: f32, value: V) -> Self {
        Self { time, value }
    }
}

/// Piecewise-linear curve over strictly increasing keys.
///
/// Sampling before the first key or after the last one holds the end value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyedCurve<V> {
    keys: SmallVec<[CurveKey<V>; 8]>,
}

pub type ScalarCurve = KeyedCurve<f32>;
pub type VectorCurve = KeyedCurve<Vec3>;
pub type ColorCurve = KeyedCurve<LinearColor>;

impl<V: Lerp> KeyedCurve<V> {
    pub fn new(keys: impl IntoIterator<Item = CurveKey<V>>) -> Result<Self, CurveError> {
        let keys: SmallVec<[CurveKey<V>; 8]> = keys.into_iter().collect();
        if keys.is_empty() {
            return Err(CurveError::Empty);
        }

        for (index, key) in keys.iter().enumerate() {
            if !key.time.is_finite() {
                return Err(CurveError::NonFiniteTime { index });
            }
            if index > 0 && key.time <= keys[index - 1].time {
                return Err(CurveError::KeysOutOfOrder {
                    index,
                    time: key.time,
                });
            }
        }

        Ok(Self { keys })
    }

    /// Two-key curve, the most common shape for quick fades and moves.
    pub fn linear(from: (f32, V), to: (f32, V)) -> Result<Self, CurveError> {
        Self::new([CurveKey::new(from.0, from.1), CurveKey::new(to.0, to.1)])
    }

    /// Single-key curve. Its range is empty, so a timeline playing it
    /// finishes right after priming.
    pub fn constant(time: f32, value: V) -> Result<Self, CurveError> {
        Self::new([CurveKey::new(time, value)])
    }

    pub fn keys(&self) -> &[CurveKey<V>] {
        &self.keys
    }
}

impl<V: Lerp> CurveEvaluator for KeyedCurve<V> {
    type Value = V;

    fn time_range(&self) -> (f32, f32) {
        // keys is never empty once constructed
        let first = self.keys[0].time;
        let last = self.keys[self.keys.len() - 1].time;
        (first, last)
    }

    fn sample(&self, time: f32) -> V {
        let first = &self.keys[0];
        let last = &self.keys[self.keys.len() - 1];
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // first index whose time is strictly greater than `time`
        let upper = self.keys.partition_point(|key| key.time <= time);
        let lo = &self.keys[upper - 1];
        let hi = &self.keys[upper];
        let alpha = (time - lo.time) / (hi.time - lo.time);
        V::lerp(lo.value, hi.value, alpha)
    }
}
