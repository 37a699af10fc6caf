//! §4.3 — the skip-list itself: top-down search with helping
//! ([`RawQueue::find_last_of_priority`], [`RawQueue::find_first`]), and the
//! lock-free [`RawQueue::push`] / [`RawQueue::try_pop`] built on them.
//!
//! `RawQueue<K, V>` carries the whole algorithm; [`Queue`] and [`KVQueue`]
//! are thin key-only / key-value public facades over it, matching §6's
//! "two variants SHOULD be offered."

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Error;
use crate::internal::Rc;
use crate::level::random_level;
use crate::node::Node;

struct RawQueue<K, V> {
    head: Rc<Node<K, V>>,
    max_level: u32,
    max_size: usize,
    count: AtomicUsize,
}

impl<K, V> RawQueue<K, V> {
    fn try_new(max_level: u32, max_size: usize) -> Result<Self, Error> {
        if max_level == 0 {
            return Err(Error::InvalidMaxLevel(max_level));
        }
        Ok(Self {
            head: Rc::new(Node::head(max_level + 1)),
            max_level,
            max_size,
            count: AtomicUsize::new(0),
        })
    }

    #[inline]
    fn levels(&self) -> usize {
        self.max_level as usize + 1
    }

    /// §5 `Wait()`. Soft backpressure only — documented, not a correctness
    /// primitive (§5 "the `count` atomic is advisory").
    fn wait_for_capacity(&self) {
        if self.max_size == 0 {
            return;
        }
        while self.count.load(Ordering::Acquire) >= self.max_size {
            log::trace!("push blocked on soft capacity {}", self.max_size);
            std::thread::yield_now();
        }
    }

    fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// §4.3.2. Top-down search that helps unlink every marked node it
    /// crosses; a failed help-CAS restarts the whole search from `head`.
    fn find_last_of_priority(
        &self,
        priority: &K,
    ) -> (Vec<Rc<Node<K, V>>>, Vec<Option<Rc<Node<K, V>>>>)
    where
        K: Ord,
    {
        let levels = self.levels();
        loop {
            let mut predecessors: Vec<Rc<Node<K, V>>> = Vec::with_capacity(levels);
            predecessors.resize_with(levels, || self.head.clone());
            let mut successors: Vec<Option<Rc<Node<K, V>>>> = vec![None; levels];

            let mut predecessor = self.head.clone();
            let mut restart = false;

            for level in (0..levels).rev() {
                loop {
                    let (current, _) = predecessor.get_next(level as u32);
                    let Some(current) = current else { break };
                    let (successor, marked) = current.get_next(level as u32);
                    if marked {
                        match predecessor.compare_exchange(level as u32, Some(&current), successor)
                        {
                            Ok(()) => continue,
                            Err(_) => {
                                log::trace!("find_last_of_priority restart: help-CAS lost");
                                restart = true;
                                break;
                            }
                        }
                    } else if *current.priority() < *priority {
                        predecessor = current;
                    } else {
                        successors[level] = Some(current);
                        break;
                    }
                }
                if restart {
                    break;
                }
                predecessors[level] = predecessor.clone();
            }

            if restart {
                continue;
            }
            return (predecessors, successors);
        }
    }

    /// §4.3.3. Unlike `find_last_of_priority`, the predecessor at every
    /// level is `head` itself — this only helps unlink head's immediate
    /// marked successors and reports head's live level-0 successor.
    fn find_first(&self) -> Option<Rc<Node<K, V>>> {
        let levels = self.levels();
        loop {
            let predecessor = &self.head;
            let mut restart = false;
            let mut result = None;

            for level in (0..levels).rev() {
                loop {
                    let (current, _) = predecessor.get_next(level as u32);
                    let Some(current) = current else { break };
                    let (successor, marked) = current.get_next(level as u32);
                    if marked {
                        match predecessor.compare_exchange(level as u32, Some(&current), successor)
                        {
                            Ok(()) => continue,
                            Err(_) => {
                                log::trace!("find_first restart: help-CAS lost");
                                restart = true;
                                break;
                            }
                        }
                    } else {
                        if level == 0 {
                            result = Some(current);
                        }
                        break;
                    }
                }
                if restart {
                    break;
                }
            }

            if restart {
                continue;
            }
            return result;
        }
    }

    /// §4.3.4.
    fn push(&self, priority: K, value: V)
    where
        K: Ord,
    {
        self.wait_for_capacity();
        let height = random_level(self.max_level);
        let node = Rc::new(Node::new_data(priority, value, height));

        let (mut predecessors, mut successors) = loop {
            let (predecessors, successors) = self.find_last_of_priority(node.priority());
            for level in 0..height {
                node.init_next(level, successors[level as usize].clone());
            }
            match predecessors[0].compare_exchange(0, successors[0].as_ref(), Some(node.clone())) {
                Ok(()) => {
                    log::trace!("push: level-0 splice committed");
                    break (predecessors, successors);
                }
                Err(_) => continue,
            }
        };

        for level in 1..height {
            loop {
                let expected = successors[level as usize].as_ref();
                match predecessors[level as usize].compare_exchange(level, expected, Some(node.clone()))
                {
                    Ok(()) => break,
                    Err(_) => {
                        let (p, s) = self.find_last_of_priority(node.priority());
                        predecessors = p;
                        successors = s;
                    }
                }
            }
        }

        node.set_done_inserting();
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// §4.3.5.
    fn try_pop(&self) -> Option<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        let first = self.find_first()?;
        if first.is_inserting() {
            // I6: observable non-emptiness without a successful pop.
            return None;
        }

        for level in (1..first.height()).rev() {
            first.set_next_mark(level);
        }

        let (successor, _) = first.get_next(0);
        let priority = first.priority().clone();
        let value = first.value().clone();
        // Linearization point: commits the logical deletion.
        let popped = first.test_and_set_mark(0, successor.as_ref());
        if popped {
            log::trace!("try_pop: level-0 mark committed");
            self.count.fetch_sub(1, Ordering::Relaxed);
            Some((priority, value))
        } else {
            None
        }
    }

    fn debug_dump(&self, all_levels: bool) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        use std::fmt::Write;

        let mut out = String::new();
        let max = if all_levels { self.max_level } else { 0 };
        for level in 0..=max {
            if all_levels {
                let _ = writeln!(out, "level {level}:");
            } else {
                let _ = writeln!(out, "queue:");
            }
            let (mut node, _) = self.head.get_next(level);
            while let Some(n) = node {
                let (next, marked) = n.get_next(level);
                if marked {
                    let _ = writeln!(out, "\t{} = {} (marked)", n.priority(), n.value());
                } else {
                    let _ = writeln!(out, "\t{} = {}", n.priority(), n.value());
                }
                node = next;
            }
        }
        out
    }
}

/// A lock-free priority queue ordered by `K` (see the crate root for the
/// algorithm overview).
///
/// `K` need not implement `Clone` for `push`; `try_pop` requires `K: Clone`
/// because the popped node may still be reachable from a predecessor's
/// forward link at the moment its payload is read out (§4.3.5).
pub struct Queue<K> {
    inner: RawQueue<K, ()>,
}

impl<K> Queue<K> {
    /// Constructs a queue with `max_level` levels above level 0 and no
    /// soft capacity. Panics if `max_level == 0` — see [`Queue::try_new`]
    /// for a non-panicking constructor.
    pub fn new(max_level: u32) -> Self {
        Self::try_new(max_level, 0).expect("max_level must be at least 1")
    }

    /// Fallible constructor (§7 "Programmer error").
    pub fn try_new(max_level: u32, max_size: usize) -> Result<Self, Error> {
        Ok(Self {
            inner: RawQueue::try_new(max_level, max_size)?,
        })
    }

    /// Inserts `priority`. Busy-waits if a soft capacity is configured and
    /// currently reached (§4.3.4).
    pub fn push(&self, priority: K)
    where
        K: Ord,
    {
        self.inner.push(priority, ());
    }

    /// Removes and returns the minimum key, or `None` if the queue is
    /// empty or a concurrent pop won the race for the same node
    /// (§4.3.5 — never blocks, never "fails").
    pub fn try_pop(&self) -> Option<K>
    where
        K: Clone,
    {
        self.inner.try_pop().map(|(k, ())| k)
    }

    /// Approximate, monotonic-within-a-thread count (§5, §6). Never use
    /// this for a correctness decision.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Debug-only stringification, gated the way §6 marks it "(optional,
    /// debug)": behind `K: Display` and the `fmt` feature.
    #[cfg(feature = "fmt")]
    pub fn debug_dump(&self, all_levels: bool) -> String
    where
        K: fmt::Display,
    {
        self.inner.debug_dump(all_levels)
    }
}

/// A lock-free priority queue ordered by `K`, carrying an associated
/// payload `V` per entry.
pub struct KVQueue<K, V> {
    inner: RawQueue<K, V>,
}

impl<K, V> KVQueue<K, V> {
    /// See [`Queue::new`].
    pub fn new(max_level: u32) -> Self {
        Self::try_new(max_level, 0).expect("max_level must be at least 1")
    }

    /// See [`Queue::try_new`].
    pub fn try_new(max_level: u32, max_size: usize) -> Result<Self, Error> {
        Ok(Self {
            inner: RawQueue::try_new(max_level, max_size)?,
        })
    }

    /// Inserts `(priority, value)`. Busy-waits if a soft capacity is
    /// configured and currently reached (§4.3.4).
    pub fn push(&self, priority: K, value: V)
    where
        K: Ord,
    {
        self.inner.push(priority, value);
    }

    /// Removes and returns the minimum `(key, value)` pair, or `None` on
    /// empty-or-contention (§4.3.5).
    pub fn try_pop(&self) -> Option<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.inner.try_pop()
    }

    /// See [`Queue::len`].
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(feature = "fmt")]
    pub fn debug_dump(&self, all_levels: bool) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        self.inner.debug_dump(all_levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_max_level_rejected() {
        assert!(matches!(
            Queue::<u32>::try_new(0, 0),
            Err(Error::InvalidMaxLevel(0))
        ));
    }

    #[test]
    fn empty_pop_then_push_then_pop() {
        let q: KVQueue<u32, u32> = KVQueue::new(8);
        assert_eq!(q.try_pop(), None);
        q.push(112, 5);
        assert_eq!(q.try_pop(), Some((112, 5)));
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn len_tracks_pushes_and_pops() {
        let q: Queue<u32> = Queue::new(4);
        assert_eq!(q.len(), 0);
        q.push(1);
        q.push(2);
        assert_eq!(q.len(), 2);
        q.try_pop();
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn drains_in_non_decreasing_order() {
        let q: Queue<i32> = Queue::new(4);
        for k in [5, 3, 8, 1, 9, 2] {
            q.push(k);
        }
        let mut out = Vec::new();
        while let Some(k) = q.try_pop() {
            out.push(k);
        }
        let mut sorted = out.clone();
        sorted.sort_unstable();
        assert_eq!(out, sorted);
        assert_eq!(out, vec![1, 2, 3, 5, 8, 9]);
    }
}
