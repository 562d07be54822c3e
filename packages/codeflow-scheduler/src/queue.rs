use crate::owner::OwnerRegistry;
use crate::slot::ActionSlot;
use smallvec::SmallVec;
use std::cell::RefCell;
use std::rc::Rc;

/// Slots removed by one prune pass; usually only a handful.
pub(crate) type Pruned = SmallVec<[Rc<ActionSlot>; 8]>;

/// Insertion-ordered list of action slots.
/// The scheduler is single-threaded, so a `RefCell<Vec>` is enough. Borrows
/// never outlive a method call; callers iterate over [`snapshot`](Self::snapshot)
/// whenever action code may run.
#[derive(Default)]
pub(crate) struct ActionQueue {
    slots: RefCell<Vec<Rc<ActionSlot>>>,
}

impl ActionQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, slot: Rc<ActionSlot>) {
        self.slots.borrow_mut().push(slot);
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub(crate) fn snapshot(&self) -> Vec<Rc<ActionSlot>> {
        self.slots.borrow().clone()
    }

    /// Drops every invalid slot, keeping the order of the rest. The removed
    /// slots are handed back so the caller can release them after the borrow
    /// ends; dropping an action may run arbitrary code.
    pub(crate) fn prune(&self, owners: &dyn OwnerRegistry) -> Pruned {
        let slots = std::mem::take(&mut *self.slots.borrow_mut());
        let mut removed = Pruned::new();
        let mut kept = Vec::with_capacity(slots.len());
        for slot in slots {
            if slot.is_valid(owners) {
                kept.push(slot);
            } else {
                removed.push(slot);
            }
        }
        self.slots.borrow_mut().extend(kept);
        removed
    }

    /// Empties the queue, handing back its slots in insertion order.
    pub(crate) fn take_all(&self) -> Vec<Rc<ActionSlot>> {
        std::mem::take(&mut *self.slots.borrow_mut())
    }

    pub(crate) fn append(&self, slots: Vec<Rc<ActionSlot>>) {
        self.slots.borrow_mut().extend(slots);
    }

    pub(crate) fn find(&self, pred: impl Fn(&ActionSlot) -> bool) -> Option<Rc<ActionSlot>> {
        self.slots.borrow().iter().find(|slot| pred(slot)).cloned()
    }

    pub(crate) fn count(&self, pred: impl Fn(&ActionSlot) -> bool) -> usize {
        self.slots.borrow().iter().filter(|slot| pred(slot)).count()
    }
}
