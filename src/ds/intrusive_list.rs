//! Doubly linked lists whose nodes live in a shared [`SlotArena`].
//!
//! A [`Links`] value only records the head, tail and length of one list; the
//! nodes themselves (`Node { value, prev, next }`) sit in an arena that can be
//! shared by any number of lists. That is what lets LFU keep one bucket list
//! per frequency while moving a node between buckets without reallocating it.
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬─────────────────────────────────────────────┐
//!   │ SlotId │ Node { value, prev, next }                  │
//!   ├────────┼─────────────────────────────────────────────┤
//!   │ id_1   │ { value: A, prev: None, next: Some(id_2) }  │
//!   │ id_2   │ { value: B, prev: Some(id_1), next: None }  │
//!   │ id_3   │ { value: C, prev: None, next: None }        │ (other list)
//!   └────────┴─────────────────────────────────────────────┘
//!
//!   Links { head: id_1, tail: id_2, len: 2 }
//!   Links { head: id_3, tail: id_3, len: 1 }
//! ```
//!
//! All operations are O(1) except `iter`.

use crate::ds::slot_arena::{SlotArena, SlotId};

#[derive(Debug)]
pub struct Node<T> {
    pub value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

impl<T> Node<T> {
    /// Creates an unlinked node.
    pub fn new(value: T) -> Self {
        Self {
            value,
            prev: None,
            next: None,
        }
    }
}

/// Head/tail bookkeeping for one list over a shared arena.
///
/// Callers must only pass ids that belong to this list (for `detach` and
/// `move_to_front`) or that are currently unlinked (for `push_front`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Links {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Id at the front (most recently touched).
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Id at the back (least recently touched).
    pub fn back(&self) -> Option<SlotId> {
        self.tail
    }

    /// Links an unlinked node in front of the current head.
    pub fn push_front<T>(&mut self, arena: &mut SlotArena<Node<T>>, id: SlotId) {
        let old_head = self.head;
        if let Some(node) = arena.get_mut(id) {
            node.prev = None;
            node.next = old_head;
        } else {
            return;
        }
        match old_head.and_then(|head| arena.get_mut(head)) {
            Some(head) => head.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
    }

    /// Unlinks `id` from this list, leaving the node in the arena.
    ///
    /// Returns `false` if `id` is not in the arena.
    pub fn detach<T>(&mut self, arena: &mut SlotArena<Node<T>>, id: SlotId) -> bool {
        let (prev, next) = match arena.get_mut(id) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return false,
        };
        match prev.and_then(|p| arena.get_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| arena.get_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
        true
    }

    /// Relinks `id` at the front of this list.
    pub fn move_to_front<T>(&mut self, arena: &mut SlotArena<Node<T>>, id: SlotId) -> bool {
        if self.head == Some(id) {
            return arena.contains(id);
        }
        if !self.detach(arena, id) {
            return false;
        }
        self.push_front(arena, id);
        true
    }

    /// Unlinks the back node and returns its id. The node stays in the arena.
    pub fn pop_back<T>(&mut self, arena: &mut SlotArena<Node<T>>) -> Option<SlotId> {
        let id = self.tail?;
        self.detach(arena, id);
        Some(id)
    }

    /// Iterates values front to back.
    pub fn iter<'a, T>(&self, arena: &'a SlotArena<Node<T>>) -> Iter<'a, T> {
        Iter {
            arena,
            current: self.head,
        }
    }

    #[doc(hidden)]
    pub fn debug_validate<T>(&self, arena: &SlotArena<Node<T>>) {
        let mut count = 0;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let Some(node) = arena.get(id) else {
                panic!("list links a freed slot");
            };
            assert_eq!(node.prev, prev, "broken back-link");
            prev = Some(id);
            current = node.next;
            count += 1;
        }
        assert_eq!(self.tail, prev, "tail does not match last node");
        assert_eq!(self.len, count, "length out of sync");
    }
}

pub struct Iter<'a, T> {
    arena: &'a SlotArena<Node<T>>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.arena.get(self.current?)?;
        self.current = node.next;
        Some(&node.value)
    }
}
