//! Constant-time LFU with LRU tie-break.
//!
//! Three structures are kept in lockstep:
//!
//! * `directory`: key -> (frequency, node handle)
//! * `buckets`: frequency -> list of nodes at that frequency, most recently
//!   touched first. Every bucket links nodes of the same `nodes` arena, so a
//!   promotion only relinks a node, it never moves it.
//! * `min_freq`: smallest frequency with a non-empty bucket.
//!
//! `min_freq` changes on exactly two paths: a hit that empties the minimum
//! bucket (the promoted key now sits at `min_freq + 1`, which is the new
//! minimum) and an insertion (a new key has frequency 1).

use std::num::NonZeroUsize;

use hashbrown::HashMap;

use crate::ds::{Links, Node, SlotArena, SlotId};
use crate::stats::Stats;
use crate::Key;

use super::{effective_capacity, Access, EvictPolicy, Evicted};

#[derive(Debug, Clone, Copy)]
struct Entry {
    freq: u64,
    id: SlotId,
}

#[derive(Debug)]
pub struct LfuPolicy {
    capacity: NonZeroUsize,
    nodes: SlotArena<Node<Key>>,
    directory: HashMap<Key, Entry>,
    buckets: HashMap<u64, Links>,
    min_freq: u64,
    stats: Stats,
}

impl LfuPolicy {
    pub fn new(capacity: usize) -> Self {
        let capacity = effective_capacity(capacity);
        Self {
            capacity,
            nodes: SlotArena::with_capacity(capacity.get()),
            directory: HashMap::with_capacity(capacity.get()),
            buckets: HashMap::new(),
            min_freq: 0,
            stats: Stats::new(),
        }
    }

    /// Smallest frequency currently resident, `None` when empty.
    pub fn min_frequency(&self) -> Option<u64> {
        (!self.directory.is_empty()).then_some(self.min_freq)
    }

    /// Resident keys grouped by ascending frequency, most recently touched
    /// first within each group.
    pub fn frequency_groups(&self) -> Vec<(u64, Vec<Key>)> {
        let mut freqs: Vec<u64> = self.buckets.keys().copied().collect();
        freqs.sort_unstable();
        freqs
            .into_iter()
            .filter_map(|freq| {
                let bucket = self.buckets.get(&freq)?;
                Some((freq, bucket.iter(&self.nodes).cloned().collect()))
            })
            .collect()
    }

    fn promote(&mut self, key: &str) {
        let Some(entry) = self.directory.get_mut(key) else {
            return;
        };
        let old_freq = entry.freq;
        let new_freq = old_freq + 1;

        if let Some(bucket) = self.buckets.get_mut(&old_freq) {
            bucket.detach(&mut self.nodes, entry.id);
            if bucket.is_empty() {
                self.buckets.remove(&old_freq);
                if old_freq == self.min_freq {
                    self.min_freq = new_freq;
                }
            }
        }
        self.buckets
            .entry(new_freq)
            .or_default()
            .push_front(&mut self.nodes, entry.id);
        entry.freq = new_freq;
    }

    fn is_front_of_own_bucket(&self, key: &str) -> bool {
        self.directory.get(key).is_some_and(|entry| {
            self.buckets.get(&entry.freq).and_then(Links::front) == Some(entry.id)
        })
    }

    fn evict(&mut self) -> Option<Evicted> {
        let freq = self.min_freq;
        let bucket = self.buckets.get_mut(&freq)?;
        let id = bucket.pop_back(&mut self.nodes)?;
        if bucket.is_empty() {
            self.buckets.remove(&freq);
        }
        let node = self.nodes.remove(id)?;
        self.directory.remove(&node.value);
        Some(Evicted {
            key: node.value,
            frequency: Some(freq),
        })
    }

    fn insert(&mut self, key: &str) {
        let id = self.nodes.insert(Node::new(key.to_string()));
        self.buckets
            .entry(1)
            .or_default()
            .push_front(&mut self.nodes, id);
        self.directory.insert(key.to_string(), Entry { freq: 1, id });
        self.min_freq = 1;
    }

    /// Walks every bucket and checks them against the directory. O(n), for
    /// tests only.
    #[doc(hidden)]
    pub fn debug_validate(&self) {
        let mut resident = 0;
        for (freq, bucket) in &self.buckets {
            assert!(!bucket.is_empty(), "empty bucket {freq} kept");
            bucket.debug_validate(&self.nodes);
            for key in bucket.iter(&self.nodes) {
                let entry = self.directory.get(key.as_str());
                assert_eq!(entry.map(|e| e.freq), Some(*freq), "{key} in wrong bucket");
            }
            resident += bucket.len();
        }
        assert_eq!(resident, self.directory.len());
        assert_eq!(resident, self.nodes.len());
        if !self.directory.is_empty() {
            assert!(self.buckets.contains_key(&self.min_freq));
            assert!(self.buckets.keys().all(|f| *f >= self.min_freq));
        }
    }
}

impl EvictPolicy for LfuPolicy {
    fn name(&self) -> &'static str {
        "LFU"
    }

    fn capacity(&self) -> usize {
        self.capacity.get()
    }

    fn len(&self) -> usize {
        self.directory.len()
    }

    fn contains(&self, key: &str) -> bool {
        self.directory.contains_key(key)
    }

    fn access(&mut self, key: &str) -> Access {
        let access = if self.directory.contains_key(key) {
            self.stats.record_hit();
            self.promote(key);
            debug_assert!(self.is_front_of_own_bucket(key), "promoted key not at bucket front");
            Access::hit()
        } else {
            self.stats.record_miss();
            let evicted = if self.directory.len() >= self.capacity.get() {
                let evicted = self.evict();
                debug_assert!(evicted.is_some(), "min_freq bucket empty on a full cache");
                if evicted.is_some() {
                    self.stats.record_eviction();
                }
                evicted
            } else {
                None
            };
            self.insert(key);
            debug_assert!(self.is_front_of_own_bucket(key), "inserted key not at bucket front");
            Access::miss(evicted)
        };

        debug_assert!(
            self.buckets
                .get(&self.min_freq)
                .is_some_and(|bucket| !bucket.is_empty()),
            "min_freq names an empty bucket"
        );
        access
    }

    fn stats(&self) -> Stats {
        self.stats
    }

    fn snapshot(&self) -> Vec<Key> {
        self.frequency_groups()
            .into_iter()
            .flat_map(|(_, keys)| keys)
            .collect()
    }

    fn layout(&self) -> &'static str {
        "ascending frequency, MRU -> LRU within each"
    }

    fn frequency(&self, key: &str) -> Option<u64> {
        self.directory.get(key).map(|entry| entry.freq)
    }
}
