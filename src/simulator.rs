//! Replays a key sequence through one policy.

use std::fmt;

use tracing::info;

use crate::evict_policy::{new_policy, EvictPolicy, Policy, PolicyKind};
use crate::observer::{AccessEvent, AccessObserver, NoopObserver};
use crate::stats::Stats;

/// Feeds every key through `policy.access` in order and returns the final
/// stats.
pub fn run<P, I>(policy: &mut P, keys: I) -> Stats
where
    P: EvictPolicy,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    run_observed(policy, keys, &mut NoopObserver)
}

/// Like [`run`], reporting each access to `observer` once the policy has been
/// updated.
pub fn run_observed<P, I, O>(policy: &mut P, keys: I, observer: &mut O) -> Stats
where
    P: EvictPolicy,
    I: IntoIterator,
    I::Item: AsRef<str>,
    O: AccessObserver + ?Sized,
{
    for (idx, key) in keys.into_iter().enumerate() {
        let key = key.as_ref();
        let access = policy.access(key);
        observer.on_access(&AccessEvent {
            step: idx + 1,
            key,
            access: &access,
            policy: &*policy,
        });
    }
    policy.stats()
}

/// Owns one policy instance for the length of a simulation.
#[derive(Debug)]
pub struct Simulator<P = Policy> {
    policy: P,
}

impl Simulator<Policy> {
    pub fn new(capacity: usize, kind: PolicyKind) -> Self {
        info!("initializing {kind} simulator with capacity {capacity}");
        Self {
            policy: new_policy(capacity, kind),
        }
    }

    /// Unknown names fall back to LRU with a warning.
    pub fn from_name(capacity: usize, name: &str) -> Self {
        Self::new(capacity, PolicyKind::from_name_or_default(name))
    }

    pub fn kind(&self) -> PolicyKind {
        self.policy.kind()
    }
}

impl<P: EvictPolicy> Simulator<P> {
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn into_policy(self) -> P {
        self.policy
    }

    pub fn run<I>(&mut self, keys: I) -> Stats
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.run_observed(keys, &mut NoopObserver)
    }

    pub fn run_observed<I, O>(&mut self, keys: I, observer: &mut O) -> Stats
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        O: AccessObserver + ?Sized,
    {
        let stats = run_observed(&mut self.policy, keys, observer);
        info!(policy = self.policy.name(), %stats, "simulation complete");
        stats
    }

    pub fn report(&self) -> Report {
        Report {
            policy: self.policy.name(),
            capacity: self.policy.capacity(),
            stats: self.policy.stats(),
        }
    }
}

/// End-of-run summary for one policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub policy: &'static str,
    pub capacity: usize,
    pub stats: Stats,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- [{}] Simulation Complete ---", self.policy)?;
        writeln!(f, "Capacity:       {}", self.capacity)?;
        writeln!(f, "Total Accesses: {}", self.stats.total())?;
        writeln!(f, "Cache Hits:     {}", self.stats.hits)?;
        writeln!(f, "Cache Misses:   {}", self.stats.misses)?;
        writeln!(f, "Evictions:      {}", self.stats.evictions)?;
        write!(f, "Hit Rate:       {:.2}%", self.stats.hit_rate_percent())
    }
}
