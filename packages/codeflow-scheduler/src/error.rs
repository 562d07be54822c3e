use crate::owner::OwnerState;
use thiserror::Error;

/// Why an `add_*` call was rejected. No action is retained and no callback
/// fires when setup fails.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("scheduler has been shut down")]
    ShutDown,

    #[error("world of kind {0:?} does not tick actions")]
    WorldCannotTick(crate::config::WorldKind),

    #[error("owner is not alive ({0:?})")]
    OwnerNotAlive(OwnerState),

    #[error("invalid settings: {0}")]
    InvalidSettings(&'static str),

    #[error("negative duration: {0}")]
    NegativeDuration(f32),

    #[error("{what} must be greater than zero, got {value}")]
    NonPositive { what: &'static str, value: f32 },

    #[error("{0} must be at least one")]
    ZeroCount(&'static str),

    #[error("timeline has no curve")]
    MissingCurve,

    #[error("curve range is inverted: [{min}, {max}]")]
    InvertedCurveRange { min: f32, max: f32 },

    #[error("blend exponent must not be zero")]
    ZeroBlendExponent,

    #[error("timeline start and stop values are identical")]
    IdenticalEndpoints,

    #[error("coroutine is not attached to a live scheduler")]
    Detached,
}

/// Misuse of the scheduler surfaced by [`FlowScheduler::tick`](crate::FlowScheduler::tick).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    #[error("tick called from inside an action callback")]
    ReentrantTick,

    #[error("tick called after shutdown")]
    ShutDown,

    #[error("delta time must be finite and non-negative, got {0}")]
    InvalidDelta(f32),
}
