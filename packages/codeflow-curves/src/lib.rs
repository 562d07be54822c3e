//! Curves and interpolable values consumed by codeflow timelines.
//!
//! The scheduler never evaluates curves itself. It talks to a
//! [`CurveEvaluator`], which reports a time range and produces a value at a
//! given time. [`KeyedCurve`] is a small piecewise-linear implementation that
//! hosts can use when they have no curve assets of their own.

pub mod blend;
pub mod curve;
pub mod error;
pub mod value;

pub use blend::{BlendFunc, blend};
pub use curve::{ColorCurve, CurveEvaluator, CurveKey, KeyedCurve, ScalarCurve, VectorCurve};
pub use error::CurveError;
pub use glam::Vec3;
pub use value::{Lerp, LinearColor};
