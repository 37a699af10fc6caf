//! §4.2 — the skip-list node: an immutable priority (and, for `KVQueue`, an
//! immutable value), a height-sized tower of forward links, and the
//! publication flag `TryPop` consults to skip nodes still being linked.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_utils::CachePadded;

use crate::internal::{Mrc, Rc};

enum Payload<K, V> {
    Head,
    Data { priority: K, value: V },
}

pub(crate) struct Node<K, V> {
    payload: Payload<K, V>,
    height: u32,
    // Level 0 is every traversal's busiest link (it is both the visibility
    // point for `Push` and the commit point for `TryPop`), so it gets its
    // own cache line, matching the teacher's `CachePadded<AtomicRc<_>>`
    // fields on its own hottest links.
    next0: CachePadded<Mrc<Node<K, V>>>,
    next_rest: Box<[Mrc<Node<K, V>>]>,
    inserting: AtomicBool,
}

impl<K, V> Node<K, V> {
    /// The head sentinel. Its priority is never read: every comparison in
    /// `Queue::find_*` is performed against a real node, never against head
    /// itself (I1/I2).
    pub(crate) fn head(height: u32) -> Self {
        Self {
            payload: Payload::Head,
            height,
            next0: CachePadded::new(Mrc::null()),
            next_rest: (1..height).map(|_| Mrc::null()).collect(),
            inserting: AtomicBool::new(false),
        }
    }

    pub(crate) fn new_data(priority: K, value: V, height: u32) -> Self {
        Self {
            payload: Payload::Data { priority, value },
            height,
            next0: CachePadded::new(Mrc::null()),
            next_rest: (1..height).map(|_| Mrc::null()).collect(),
            inserting: AtomicBool::new(true),
        }
    }

    #[inline]
    fn link(&self, level: u32) -> &Mrc<Node<K, V>> {
        if level == 0 {
            &self.next0
        } else {
            &self.next_rest[level as usize - 1]
        }
    }

    // (kept separate from the branch above: `CachePadded<T>: Deref<Target = T>`
    // makes `&self.next0` coerce to `&Mrc<Node<K, V>>` directly.)

    pub(crate) fn priority(&self) -> &K {
        match &self.payload {
            Payload::Data { priority, .. } => priority,
            Payload::Head => unreachable!("head sentinel has no priority"),
        }
    }

    pub(crate) fn value(&self) -> &V {
        match &self.payload {
            Payload::Data { value, .. } => value,
            Payload::Head => unreachable!("head sentinel has no value"),
        }
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    pub(crate) fn get_next(&self, level: u32) -> (Option<Rc<Node<K, V>>>, bool) {
        self.link(level).load()
    }

    pub(crate) fn is_next_marked(&self, level: u32) -> bool {
        self.link(level).is_marked()
    }

    pub(crate) fn set_next_mark(&self, level: u32) {
        self.link(level).set_mark();
    }

    pub(crate) fn test_and_set_mark(&self, level: u32, expected: Option<&Rc<Node<K, V>>>) -> bool {
        self.link(level).test_and_set_mark(expected)
    }

    pub(crate) fn compare_exchange(
        &self,
        level: u32,
        expected: Option<&Rc<Node<K, V>>>,
        new: Option<Rc<Node<K, V>>>,
    ) -> Result<(), Option<Rc<Node<K, V>>>> {
        self.link(level).compare_exchange(expected, new)
    }

    /// Plain store; only valid before the node is linked in at level 0.
    pub(crate) fn init_next(&self, level: u32, value: Option<Rc<Node<K, V>>>) {
        self.link(level).init(value);
    }

    pub(crate) fn is_inserting(&self) -> bool {
        self.inserting.load(Ordering::Acquire)
    }

    pub(crate) fn set_done_inserting(&self) {
        self.inserting.store(false, Ordering::Release);
    }
}
