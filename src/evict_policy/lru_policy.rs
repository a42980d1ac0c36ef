use std::num::NonZeroUsize;

use hashbrown::HashMap;

use crate::ds::{Links, Node, SlotArena, SlotId};
use crate::stats::Stats;
use crate::Key;

use super::{effective_capacity, Access, EvictPolicy, Evicted};

// LRU (Least Recently Used) Policy implementation
#[derive(Debug)]
pub struct LruPolicy {
    capacity: NonZeroUsize,
    nodes: SlotArena<Node<Key>>,
    // front = most recently used
    order: Links,
    index: HashMap<Key, SlotId>,
    stats: Stats,
}

impl LruPolicy {
    pub fn new(capacity: usize) -> Self {
        let capacity = effective_capacity(capacity);
        Self {
            capacity,
            nodes: SlotArena::with_capacity(capacity.get()),
            order: Links::new(),
            index: HashMap::with_capacity(capacity.get()),
            stats: Stats::new(),
        }
    }

    fn evict_lru(&mut self) -> Option<Evicted> {
        let id = self.order.pop_back(&mut self.nodes)?;
        let node = self.nodes.remove(id)?;
        self.index.remove(&node.value);
        Some(Evicted {
            key: node.value,
            frequency: None,
        })
    }
}

impl EvictPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "LRU"
    }

    fn capacity(&self) -> usize {
        self.capacity.get()
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn access(&mut self, key: &str) -> Access {
        if let Some(&id) = self.index.get(key) {
            self.stats.record_hit();
            self.order.move_to_front(&mut self.nodes, id);
            return Access::hit();
        }

        self.stats.record_miss();
        let evicted = if self.index.len() >= self.capacity.get() {
            let evicted = self.evict_lru();
            debug_assert!(evicted.is_some(), "full LRU cache had no tail");
            if evicted.is_some() {
                self.stats.record_eviction();
            }
            evicted
        } else {
            None
        };

        let id = self.nodes.insert(Node::new(key.to_string()));
        self.order.push_front(&mut self.nodes, id);
        self.index.insert(key.to_string(), id);
        debug_assert!(self.index.len() <= self.capacity.get());
        Access::miss(evicted)
    }

    fn stats(&self) -> Stats {
        self.stats
    }

    fn snapshot(&self) -> Vec<Key> {
        self.order.iter(&self.nodes).cloned().collect()
    }

    fn layout(&self) -> &'static str {
        "MRU -> LRU"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evict_policy::Outcome;

    fn run(policy: &mut LruPolicy, keys: &str) -> Vec<Outcome> {
        keys.split_whitespace()
            .map(|k| policy.access(k).outcome)
            .collect()
    }

    #[test]
    fn hit_moves_key_to_front() {
        let mut lru = LruPolicy::new(3);
        run(&mut lru, "a b c");
        assert_eq!(lru.snapshot(), vec!["c", "b", "a"]);
        assert!(lru.access("a").is_hit());
        assert_eq!(lru.snapshot(), vec!["a", "c", "b"]);
    }

    #[test]
    fn miss_at_capacity_evicts_least_recent() {
        let mut lru = LruPolicy::new(3);
        run(&mut lru, "a b c a");
        let access = lru.access("d");
        assert_eq!(access.outcome, Outcome::Miss);
        assert_eq!(
            access.evicted,
            Some(Evicted {
                key: "b".to_string(),
                frequency: None
            })
        );
        assert!(!lru.contains("b"));
        assert_eq!(lru.snapshot(), vec!["d", "a", "c"]);
        assert_eq!(lru.stats().evictions, 1);
    }

    #[test]
    fn capacity_one_keeps_only_last_key() {
        let mut lru = LruPolicy::new(0);
        assert_eq!(
            run(&mut lru, "a a b a"),
            vec![Outcome::Miss, Outcome::Hit, Outcome::Miss, Outcome::Miss]
        );
        assert_eq!(lru.snapshot(), vec!["a"]);
        assert_eq!(lru.len(), 1);
    }

    #[test]
    fn counters_add_up() {
        let mut lru = LruPolicy::new(2);
        run(&mut lru, "a b a c b a");
        let stats = lru.stats();
        assert_eq!(stats.total(), 6);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 5);
        lru.order.debug_validate(&lru.nodes);
    }
}
