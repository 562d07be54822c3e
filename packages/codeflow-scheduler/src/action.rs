use crate::error::SetupError;
use crate::handle::ActionHandle;
use crate::instance::InstanceId;
use crate::owner::OwnerId;
use crate::settings::ActionSettings;
use std::any::TypeId;
use std::fmt;

/// How a concrete action reacts to an `add` whose instance id is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstancePolicy {
    /// Keep the running action and hand back its handle.
    Reuse,
    /// Finish the running action without completion and insert the new one.
    Replace,
}

/// Externally observable state of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionState {
    Pending,
    Running,
    Paused,
    Finished,
}

/// Class token identifying a concrete action type.
#[derive(Clone, Copy)]
pub struct ActionClass {
    id: TypeId,
    name: &'static str,
}

impl ActionClass {
    pub fn of<T: Action>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ActionClass {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ActionClass {}

impl std::hash::Hash for ActionClass {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ActionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ActionClass").field(&self.name).finish()
    }
}

/// Snapshot returned by `find` and `find_instance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionInfo {
    pub handle: ActionHandle,
    pub owner: OwnerId,
    pub instance: Option<InstanceId>,
    pub class: ActionClass,
    pub state: ActionState,
    pub settings: ActionSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Continue,
    Complete,
    Finish,
}

/// Passed to every hook while the action is being dispatched.
///
/// An action ends itself by calling [`complete`](Self::complete) (natural end,
/// the completion hook fires) or [`finish`](Self::finish) (silent end). If both
/// are requested in the same dispatch, completion wins.
pub struct ActionContext<'a> {
    handle: ActionHandle,
    owner: OwnerId,
    instance: Option<InstanceId>,
    settings: &'a ActionSettings,
    outcome: Outcome,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        handle: ActionHandle,
        owner: OwnerId,
        instance: Option<InstanceId>,
        settings: &'a ActionSettings,
    ) -> Self {
        Self {
            handle,
            owner,
            instance,
            settings,
            outcome: Outcome::Continue,
        }
    }

    pub fn handle(&self) -> ActionHandle {
        self.handle
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn instance(&self) -> Option<InstanceId> {
        self.instance
    }

    pub fn settings(&self) -> &ActionSettings {
        self.settings
    }

    pub fn complete(&mut self) {
        self.outcome = Outcome::Complete;
    }

    pub fn finish(&mut self) {
        if self.outcome == Outcome::Continue {
            self.outcome = Outcome::Finish;
        }
    }

    pub fn is_ending(&self) -> bool {
        self.outcome != Outcome::Continue
    }

    pub(crate) fn outcome(&self) -> Outcome {
        self.outcome
    }
}

/// One scheduled unit of work.
///
/// The scheduler calls [`init`](Self::init) once on the first effective tick,
/// then [`tick`](Self::tick) (or [`prime`](Self::prime) for actions that emit
/// a starting sample) on every dispatched tick until the action ends.
/// [`complete`](Self::complete) runs at most once, and only when the action
/// ended naturally or was stopped with completion while its owner is alive.
pub trait Action: 'static {
    fn init(&mut self, _ctx: &mut ActionContext<'_>) {}

    fn tick(&mut self, ctx: &mut ActionContext<'_>, dt: f32);

    /// Return `true` to have the first dispatched tick routed to
    /// [`prime`](Self::prime) instead of [`tick`](Self::tick).
    fn primes_first_tick(&self) -> bool {
        false
    }

    fn prime(&mut self, _ctx: &mut ActionContext<'_>) {}

    /// Another `add` with the same class and instance id hit a reuse-policy
    /// action.
    fn retrigger(&mut self, _ctx: &mut ActionContext<'_>) {}

    /// The `max_action_time` deadline elapsed. The action completes right
    /// after this returns.
    fn deadline_reached(&mut self, _ctx: &mut ActionContext<'_>) {}

    fn complete(&mut self, _stopped: bool) {}

    /// `false` marks an unrecoverable internal failure; the action is dropped
    /// silently.
    fn is_valid(&self) -> bool {
        true
    }

    fn max_action_time(&self) -> Option<f32> {
        None
    }
}

/// An action that can be built from a payload by [`FlowScheduler::try_add`](crate::FlowScheduler::try_add).
pub trait ActionSetup: Action + Sized {
    type Payload;

    const INSTANCE_POLICY: InstancePolicy = InstancePolicy::Replace;

    fn setup(
        payload: Self::Payload,
        settings: &ActionSettings,
        instance: Option<InstanceId>,
    ) -> Result<Self, SetupError>;
}
