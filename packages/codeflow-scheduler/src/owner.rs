use slotmap::{SlotMap, new_key_type};
use std::cell::RefCell;

new_key_type! {
    /// Host object an action is bound to. The scheduler never owns it.
    pub struct OwnerId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OwnerState {
    Alive,
    BeingDestroyed,
    Destroyed,
}

/// The host object model, as far as the scheduler cares about it.
pub trait OwnerRegistry {
    fn owner_state(&self, owner: OwnerId) -> OwnerState;

    fn is_owner_alive(&self, owner: OwnerId) -> bool {
        self.owner_state(owner) == OwnerState::Alive
    }
}

/// Simple owner registry backed by a slot map.
///
/// Removed keys read as [`OwnerState::Destroyed`], and slot map versioning
/// keeps a recycled slot from resurrecting a stale `OwnerId`.
#[derive(Debug, Default)]
pub struct Owners {
    slots: RefCell<SlotMap<OwnerId, OwnerState>>,
}

impl Owners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&self) -> OwnerId {
        self.slots.borrow_mut().insert(OwnerState::Alive)
    }

    /// Marks the owner as being torn down. Its actions stop ticking right away.
    pub fn begin_destroy(&self, owner: OwnerId) {
        if let Some(state) = self.slots.borrow_mut().get_mut(owner) {
            *state = OwnerState::BeingDestroyed;
        }
    }

    pub fn destroy(&self, owner: OwnerId) {
        self.slots.borrow_mut().remove(owner);
    }

    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

impl OwnerRegistry for Owners {
    fn owner_state(&self, owner: OwnerId) -> OwnerState {
        self.slots
            .borrow()
            .get(owner)
            .copied()
            .unwrap_or(OwnerState::Destroyed)
    }
}
