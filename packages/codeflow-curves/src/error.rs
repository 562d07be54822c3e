use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("curve has no keys")]
    Empty,

    #[error("curve key {index} at time {time} is not after the previous key")]
    KeysOutOfOrder { index: usize, time: f32 },

    #[error("curve key {index} has a non-finite time")]
    NonFiniteTime { index: usize },
}
