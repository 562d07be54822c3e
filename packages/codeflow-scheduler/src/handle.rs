use std::cell::Cell;
use std::fmt;

/// Refers to one action issued by a [`FlowScheduler`](crate::FlowScheduler).
///
/// Handles are plain values. Two handles are equal iff they were issued for the
/// same action; ids are never reused during a scheduler's lifetime. The id `0`
/// is reserved for the invalid handle returned by rejected `add_*` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionHandle {
    id: u64,
}

impl ActionHandle {
    pub const INVALID: ActionHandle = ActionHandle { id: 0 };

    pub fn is_valid(&self) -> bool {
        self.id != 0
    }

    /// Forgets which action this handle pointed at. The action itself keeps
    /// running; use [`FlowScheduler::stop`](crate::FlowScheduler::stop) for that.
    pub fn invalidate(&mut self) {
        self.id = 0;
    }

    pub fn raw(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}", self.id)
        } else {
            f.write_str("#invalid")
        }
    }
}

/// Monotonic handle source owned by the scheduler.
#[derive(Debug, Default)]
pub(crate) struct HandleCounter {
    last: Cell<u64>,
}

impl HandleCounter {
    pub(crate) fn next(&self) -> ActionHandle {
        // 2^64 issues never happen in practice; skip 0 anyway so the invalid
        // handle stays unique.
        let mut id = self.last.get().wrapping_add(1);
        if id == 0 {
            id = 1;
        }
        self.last.set(id);
        ActionHandle { id }
    }

    pub(crate) fn issued(&self) -> u64 {
        self.last.get()
    }
}
