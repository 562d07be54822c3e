use crate::error::SetupError;

/// Per-action configuration, copied into the action when it is added.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ActionSettings {
    /// Minimum seconds between dispatched ticks. `0` dispatches every tick.
    pub tick_interval: f32,
    /// Seconds to wait before the first dispatched tick.
    pub first_delay: f32,
    /// Keep ticking while the host world is paused.
    pub ignore_pause: bool,
    /// Receive undilated delta time.
    pub ignore_time_dilation: bool,
    /// Enter the live list paused; the action does nothing until resumed.
    pub start_paused: bool,
    /// Only meaningful for bounded actions such as timelines.
    pub looping: bool,
}

impl ActionSettings {
    pub const DEFAULT: ActionSettings = ActionSettings {
        tick_interval: 0.0,
        first_delay: 0.0,
        ignore_pause: false,
        ignore_time_dilation: false,
        start_paused: false,
        looping: false,
    };

    pub fn tick_every(interval: f32) -> Self {
        Self::DEFAULT.with_tick_interval(interval)
    }

    pub fn delayed(first_delay: f32) -> Self {
        Self::DEFAULT.with_first_delay(first_delay)
    }

    pub fn ignoring_pause() -> Self {
        Self::DEFAULT.with_ignore_pause(true)
    }

    pub fn ignoring_time_dilation() -> Self {
        Self::DEFAULT.with_ignore_time_dilation(true)
    }

    pub fn ignoring_pause_and_dilation() -> Self {
        Self::DEFAULT
            .with_ignore_pause(true)
            .with_ignore_time_dilation(true)
    }

    pub fn paused() -> Self {
        Self::DEFAULT.with_start_paused(true)
    }

    pub fn looped() -> Self {
        Self::DEFAULT.with_looping(true)
    }

    pub fn with_tick_interval(mut self, interval: f32) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_first_delay(mut self, first_delay: f32) -> Self {
        self.first_delay = first_delay;
        self
    }

    pub fn with_ignore_pause(mut self, ignore: bool) -> Self {
        self.ignore_pause = ignore;
        self
    }

    pub fn with_ignore_time_dilation(mut self, ignore: bool) -> Self {
        self.ignore_time_dilation = ignore;
        self
    }

    pub fn with_start_paused(mut self, paused: bool) -> Self {
        self.start_paused = paused;
        self
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        if !self.tick_interval.is_finite() || self.tick_interval < 0.0 {
            return Err(SetupError::InvalidSettings(
                "tick_interval must be finite and >= 0",
            ));
        }
        if !self.first_delay.is_finite() || self.first_delay < 0.0 {
            return Err(SetupError::InvalidSettings(
                "first_delay must be finite and >= 0",
            ));
        }
        Ok(())
    }
}
