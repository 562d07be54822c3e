use crate::value::Lerp;

/// Shape of the interpolation a timeline applies between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendFunc {
    #[default]
    Linear,
    /// Hermite curve with zero tangents at both ends.
    Cubic,
    EaseIn,
    EaseOut,
    EaseInOut,
}

/// Blends `start` towards `stop` at `alpha` (clamped to `[0, 1]`).
///
/// `exp` shapes the ease variants and is ignored by `Linear` and `Cubic`.
pub fn blend<V: Lerp>(start: V, stop: V, alpha: f32, func: BlendFunc, exp: f32) -> V {
    let alpha = alpha.clamp(0.0, 1.0);
    let shaped = match func {
        BlendFunc::Linear => alpha,
        BlendFunc::Cubic => alpha * alpha * (3.0 - 2.0 * alpha),
        BlendFunc::EaseIn => alpha.powf(exp),
        BlendFunc::EaseOut => alpha.powf(1.0 / exp),
        BlendFunc::EaseInOut => {
            if alpha < 0.5 {
                0.5 * (2.0 * alpha).powf(exp)
            } else {
                1.0 - 0.5 * (2.0 * (1.0 - alpha)).powf(exp)
            }
        }
    };
    V::lerp(start, stop, shaped)
}
