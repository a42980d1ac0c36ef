use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use tracing::warn;

use crate::stats::Stats;
use crate::Key;

mod fifo_policy;
mod lfu_policy;
mod lru_policy;
pub use fifo_policy::FifoPolicy;
pub use lfu_policy::LfuPolicy;
pub use lru_policy::LruPolicy;

/// Whether the key was resident immediately before the access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Hit,
    Miss,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Hit => "HIT",
            Outcome::Miss => "MISS",
        })
    }
}

/// A key removed to make room for a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evicted {
    pub key: Key,
    /// Access count of the victim when it was evicted. Only LFU tracks this.
    pub frequency: Option<u64>,
}

/// Result of a single [`EvictPolicy::access`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Access {
    pub outcome: Outcome,
    pub evicted: Option<Evicted>,
}

impl Access {
    pub(crate) fn hit() -> Self {
        Self {
            outcome: Outcome::Hit,
            evicted: None,
        }
    }

    pub(crate) fn miss(evicted: Option<Evicted>) -> Self {
        Self {
            outcome: Outcome::Miss,
            evicted,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.outcome == Outcome::Hit
    }
}

/// Common contract of the replacement policies.
///
/// `access` is the only mutating operation and is total: any key, any state.
/// Everything else is a read-only view used for reporting.
pub trait EvictPolicy {
    /// Short uppercase name, e.g. `"LRU"`.
    fn name(&self) -> &'static str;

    /// Maximum number of resident keys.
    fn capacity(&self) -> usize;

    /// Number of resident keys.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, key: &str) -> bool;

    /// Touches `key`, inserting it (and evicting if full) on a miss.
    fn access(&mut self, key: &str) -> Access;

    fn stats(&self) -> Stats;

    /// Resident keys in the policy's own order, see [`EvictPolicy::layout`].
    fn snapshot(&self) -> Vec<Key>;

    /// How `snapshot` is ordered, for display.
    fn layout(&self) -> &'static str;

    /// Current access count of a resident key, for policies that count.
    fn frequency(&self, _key: &str) -> Option<u64> {
        None
    }
}

/// Raises a zero capacity to one.
pub(crate) fn effective_capacity(capacity: usize) -> NonZeroUsize {
    NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown eviction policy '{0}'")]
pub struct UnknownPolicy(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Lru,
    Fifo,
    Lfu,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Lru, PolicyKind::Fifo, PolicyKind::Lfu];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Lru => "LRU",
            PolicyKind::Fifo => "FIFO",
            PolicyKind::Lfu => "LFU",
        }
    }

    /// Parses `name`, falling back to LRU with a warning when it is unknown.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|err: UnknownPolicy| {
            warn!("{err}, defaulting to LRU");
            PolicyKind::Lru
        })
    }
}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the three policies, chosen at construction.
#[derive(Debug)]
pub enum Policy {
    Lru(LruPolicy),
    Fifo(FifoPolicy),
    Lfu(LfuPolicy),
}

/// Builds an empty policy of the given kind.
pub fn new_policy(capacity: usize, kind: PolicyKind) -> Policy {
    match kind {
        PolicyKind::Lru => Policy::Lru(LruPolicy::new(capacity)),
        PolicyKind::Fifo => Policy::Fifo(FifoPolicy::new(capacity)),
        PolicyKind::Lfu => Policy::Lfu(LfuPolicy::new(capacity)),
    }
}

impl Policy {
    pub fn new(capacity: usize, kind: PolicyKind) -> Self {
        new_policy(capacity, kind)
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Lru(_) => PolicyKind::Lru,
            Policy::Fifo(_) => PolicyKind::Fifo,
            Policy::Lfu(_) => PolicyKind::Lfu,
        }
    }

    fn inner(&self) -> &dyn EvictPolicy {
        match self {
            Policy::Lru(p) => p,
            Policy::Fifo(p) => p,
            Policy::Lfu(p) => p,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn EvictPolicy {
        match self {
            Policy::Lru(p) => p,
            Policy::Fifo(p) => p,
            Policy::Lfu(p) => p,
        }
    }
}

impl EvictPolicy for Policy {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn capacity(&self) -> usize {
        self.inner().capacity()
    }

    fn len(&self) -> usize {
        self.inner().len()
    }

    fn contains(&self, key: &str) -> bool {
        self.inner().contains(key)
    }

    fn access(&mut self, key: &str) -> Access {
        self.inner_mut().access(key)
    }

    fn stats(&self) -> Stats {
        self.inner().stats()
    }

    fn snapshot(&self) -> Vec<Key> {
        self.inner().snapshot()
    }

    fn layout(&self) -> &'static str {
        self.inner().layout()
    }

    fn frequency(&self, key: &str) -> Option<u64> {
        self.inner().frequency(key)
    }
}
