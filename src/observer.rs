//! Per-access event sink.
//!
//! Policies never print. The simulator hands every access to an
//! [`AccessObserver`] after the policy has been updated; observers only get a
//! shared view of the policy and cannot change its state.

use tracing::{debug, Level};

use crate::evict_policy::{Access, EvictPolicy, Outcome};
use crate::Key;

pub struct AccessEvent<'a> {
    /// 1-based position of the access in the run.
    pub step: usize,
    pub key: &'a str,
    pub access: &'a Access,
    pub policy: &'a dyn EvictPolicy,
}

impl AccessEvent<'_> {
    pub fn outcome(&self) -> Outcome {
        self.access.outcome
    }

    /// Resident keys after this access.
    pub fn snapshot(&self) -> Vec<Key> {
        self.policy.snapshot()
    }
}

pub trait AccessObserver {
    fn on_access(&mut self, event: &AccessEvent<'_>);
}

impl<F> AccessObserver for F
where
    F: FnMut(&AccessEvent<'_>),
{
    fn on_access(&mut self, event: &AccessEvent<'_>) {
        self(event)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl AccessObserver for NoopObserver {
    fn on_access(&mut self, _event: &AccessEvent<'_>) {}
}

/// Emits the step-by-step trace as `tracing` events at DEBUG level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl AccessObserver for TracingObserver {
    fn on_access(&mut self, event: &AccessEvent<'_>) {
        let policy = event.policy.name();
        debug!(
            policy,
            step = event.step,
            key = event.key,
            outcome = %event.outcome(),
            "access"
        );
        if let Some(evicted) = &event.access.evicted {
            match evicted.frequency {
                Some(freq) => debug!(policy, key = %evicted.key, freq, "cache full, evicting"),
                None => debug!(policy, key = %evicted.key, "cache full, evicting"),
            }
        }
        if tracing::enabled!(Level::DEBUG) {
            debug!(
                policy,
                "cache ({}): [{}]",
                event.policy.layout(),
                render_state(event.policy)
            );
        }
    }
}

/// Space-separated snapshot; counting policies append `:freq` to each key.
pub fn render_state(policy: &dyn EvictPolicy) -> String {
    policy
        .snapshot()
        .iter()
        .map(|key| match policy.frequency(key) {
            Some(freq) => format!("{key}:{freq}"),
            None => key.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
