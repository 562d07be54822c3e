/// Kind of host world a scheduler lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WorldKind {
    #[default]
    Game,
    GamePreview,
    GameRpc,
    /// Play-in-editor session.
    Pie,
    Editor,
    Inactive,
}

impl WorldKind {
    pub fn can_tick(self) -> bool {
        matches!(
            self,
            WorldKind::Game | WorldKind::GamePreview | WorldKind::GameRpc | WorldKind::Pie
        )
    }
}

/// Scheduler-wide configuration. The host clock fields can be changed later
/// through [`FlowScheduler::set_world_paused`](crate::FlowScheduler::set_world_paused)
/// and [`FlowScheduler::set_time_dilation`](crate::FlowScheduler::set_time_dilation).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct FlowConfig {
    pub world: WorldKind,
    pub time_dilation: f32,
    pub world_paused: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            world: WorldKind::Game,
            time_dilation: 1.0,
            world_paused: false,
        }
    }
}

impl FlowConfig {
    pub fn for_world(world: WorldKind) -> Self {
        Self {
            world,
            ..Self::default()
        }
    }

    pub fn with_time_dilation(mut self, dilation: f32) -> Self {
        self.time_dilation = dilation;
        self
    }

    pub fn with_world_paused(mut self, paused: bool) -> Self {
        self.world_paused = paused;
        self
    }
}
