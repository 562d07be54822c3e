use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

const UNIQUE_BIT: u64 = 1 << 63;

static NEXT_UNIQUE: AtomicU64 = AtomicU64::new(1);

/// Deduplication key: at most one live action carries a given id.
///
/// Ids come either from [`InstanceId::unique`] or from hashing a stable key
/// with [`InstanceId::from_key`]. The two ranges never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceId(NonZeroU64);

impl InstanceId {
    pub fn unique() -> Self {
        let n = NEXT_UNIQUE.fetch_add(1, Ordering::Relaxed);
        Self::from_bits(n | UNIQUE_BIT)
    }

    pub fn from_key<K: Hash + ?Sized>(key: &K) -> Self {
        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        let bits = hasher.finish() & !UNIQUE_BIT;
        Self::from_bits(bits.max(1))
    }

    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn raw(self) -> u64 {
        self.0.get()
    }

    fn from_bits(bits: u64) -> Self {
        match NonZeroU64::new(bits) {
            Some(id) => Self(id),
            None => Self(NonZeroU64::MIN),
        }
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instance:{:016x}", self.0)
    }
}
