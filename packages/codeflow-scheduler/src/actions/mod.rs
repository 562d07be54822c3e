//! Built-in actions.
//!
//! | Action | Instance policy |
//! |---|---|
//! | [`Delay`], [`DelayTicks`], [`Ticker`] | replace |
//! | [`WaitAndExecute`], [`WhileTrueExecute`] | replace |
//! | [`Timeline`], [`CustomTimeline`] | replace |
//! | [`DoOnce`], [`DoNTimes`], [`TimeLock`], [`DoNoMoreThanXTime`] | reuse |

mod custom_timeline;
mod delay;
mod gates;
mod ticker;
mod timeline;
mod wait;

pub use custom_timeline::{CustomTimeline, CustomTimelinePayload};
pub use delay::{Delay, DelayTicks};
pub use gates::{DoNTimes, DoNoMoreThanXTime, DoOnce, TimeLock};
pub use ticker::Ticker;
pub use timeline::{Timeline, TimelineParams, TimelinePayload};
pub use wait::{WaitAndExecute, WaitAndExecutePayload, WhileTrueExecute, WhileTrueExecutePayload};

/// `on_complete(stopped)`
pub type CompleteFn = Box<dyn FnOnce(bool)>;
/// `on_tick(dt)`
pub type TickFn = Box<dyn FnMut(f32)>;
pub type PredicateFn = Box<dyn FnMut() -> bool>;
/// `on_execute(timed_out, stopped)`
pub type ExecuteFn = Box<dyn FnOnce(bool, bool)>;
/// `on_tick(value, time)`
pub type ValueTickFn<V> = Box<dyn FnMut(V, f32)>;
/// `on_complete(value, time, stopped)`
pub type ValueCompleteFn<V> = Box<dyn FnOnce(V, f32, bool)>;

pub(crate) fn check_duration(value: f32) -> Result<(), crate::SetupError> {
    if value.is_nan() || value < 0.0 {
        return Err(crate::SetupError::NegativeDuration(value));
    }
    Ok(())
}

pub(crate) fn check_positive(what: &'static str, value: f32) -> Result<(), crate::SetupError> {
    if value.is_nan() || value <= 0.0 {
        return Err(crate::SetupError::NonPositive { what, value });
    }
    Ok(())
}
