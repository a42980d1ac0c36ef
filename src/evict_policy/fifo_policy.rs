use std::collections::VecDeque;
use std::num::NonZeroUsize;

use hashbrown::HashSet;

use crate::stats::Stats;
use crate::Key;

use super::{effective_capacity, Access, EvictPolicy, Evicted};

// FIFO (First In First Out) Policy implementation
#[derive(Debug)]
pub struct FifoPolicy {
    capacity: NonZeroUsize,
    cache: HashSet<Key>,
    // front = oldest insertion
    queue: VecDeque<Key>,
    stats: Stats,
}

impl FifoPolicy {
    pub fn new(capacity: usize) -> Self {
        let capacity = effective_capacity(capacity);
        Self {
            capacity,
            cache: HashSet::with_capacity(capacity.get()),
            queue: VecDeque::with_capacity(capacity.get()),
            stats: Stats::new(),
        }
    }
}

impl EvictPolicy for FifoPolicy {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn capacity(&self) -> usize {
        self.capacity.get()
    }

    fn len(&self) -> usize {
        self.cache.len()
    }

    fn contains(&self, key: &str) -> bool {
        self.cache.contains(key)
    }

    fn access(&mut self, key: &str) -> Access {
        // a hit never reorders the queue
        if self.cache.contains(key) {
            self.stats.record_hit();
            return Access::hit();
        }

        self.stats.record_miss();
        let mut evicted = None;
        if self.queue.len() >= self.capacity.get() {
            if let Some(old_key) = self.queue.pop_front() {
                self.cache.remove(&old_key);
                self.stats.record_eviction();
                evicted = Some(Evicted {
                    key: old_key,
                    frequency: None,
                });
            }
        }

        self.queue.push_back(key.to_string());
        self.cache.insert(key.to_string());
        debug_assert_eq!(self.queue.len(), self.cache.len());
        debug_assert!(self.queue.len() <= self.capacity.get());
        Access::miss(evicted)
    }

    fn stats(&self) -> Stats {
        self.stats
    }

    fn snapshot(&self) -> Vec<Key> {
        self.queue.iter().cloned().collect()
    }

    fn layout(&self) -> &'static str {
        "oldest -> newest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evictions(policy: &mut FifoPolicy, keys: &str) -> Vec<Key> {
        keys.split_whitespace()
            .filter_map(|k| policy.access(k).evicted)
            .map(|e| e.key)
            .collect()
    }

    #[test]
    fn misses_evict_in_insertion_order() {
        let mut fifo = FifoPolicy::new(2);
        assert_eq!(evictions(&mut fifo, "a b c d e"), vec!["a", "b", "c"]);
        assert_eq!(fifo.snapshot(), vec!["d", "e"]);
    }

    #[test]
    fn hit_does_not_reorder() {
        let mut fifo = FifoPolicy::new(3);
        evictions(&mut fifo, "a b c");
        assert!(fifo.access("a").is_hit());
        assert_eq!(fifo.snapshot(), vec!["a", "b", "c"]);
        let access = fifo.access("d");
        assert_eq!(access.evicted.map(|e| e.key), Some("a".to_string()));
        assert_eq!(fifo.snapshot(), vec!["b", "c", "d"]);
    }

    #[test]
    fn reinserted_key_goes_to_tail() {
        let mut fifo = FifoPolicy::new(2);
        evictions(&mut fifo, "a b c a");
        assert_eq!(fifo.snapshot(), vec!["c", "a"]);
        let stats = fifo.stats();
        assert_eq!(stats.misses, 4);
        assert_eq!(stats.evictions, 2);
    }
}
