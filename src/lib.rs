//! Cache replacement policy simulator.
//!
//! Replays a sequence of keys through LRU, FIFO or LFU and reports how many
//! accesses hit. The policies only track key residency, recency and
//! frequency; they store no values.

pub mod config;
pub mod curve;
pub mod draw;
pub mod ds;
pub mod error;
pub mod evict_policy;
pub mod observer;
pub mod simulator;
pub mod stats;
pub mod trace;

pub use error::{Error, Result};
pub use evict_policy::{
    new_policy, Access, EvictPolicy, Evicted, FifoPolicy, LfuPolicy, LruPolicy, Outcome, Policy,
    PolicyKind,
};
pub use observer::{AccessEvent, AccessObserver, NoopObserver, TracingObserver};
pub use simulator::{run, run_observed, Report, Simulator};
pub use stats::Stats;

/// Opaque cache key.
pub type Key = String;
