//! Cooperative action scheduler.
//!
//! Game code registers time-based, tick-driven and predicate-driven actions
//! (delays, tickers, conditional waits, timelines, execution gates and
//! coroutines) on a [`FlowScheduler`]. A single host tick source calls
//! [`FlowScheduler::tick`] once per frame; everything else happens inside
//! that call, on one thread.
//!
//! Every action is bound to an [`OwnerId`]. The scheduler asks an
//! [`OwnerRegistry`] whether the owner is still alive and drops the action
//! silently once it is not.

pub mod action;
pub mod actions;
pub mod config;
pub mod coroutine;
pub mod error;
pub mod handle;
pub mod instance;
pub mod owner;
pub mod settings;

mod queue;
mod scheduler;
mod slot;
mod task;

pub use action::{
    Action, ActionClass, ActionContext, ActionInfo, ActionSetup, ActionState, InstancePolicy,
};
pub use actions::TimelineParams;
pub use config::{FlowConfig, WorldKind};
pub use coroutine::{AwaitResult, CoroutineContext};
pub use error::{FlowError, SetupError};
pub use handle::ActionHandle;
pub use instance::InstanceId;
pub use owner::{OwnerId, OwnerRegistry, OwnerState, Owners};
pub use scheduler::{FlowScheduler, WeakFlowScheduler};
pub use settings::ActionSettings;

pub use codeflow_curves as curves;
