//! A lock-free, linearizable concurrent skip-list priority queue.
//!
//! Items are ordered by a totally-ordered priority key; the smallest
//! priority is extracted first. Duplicate priorities are permitted and
//! every pushed item eventually becomes poppable exactly once, but FIFO
//! order among equal priorities is **not** guaranteed (see
//! [`Queue::push`]/[`KVQueue::push`]).
//!
//! The crate publishes two types:
//!
//! - [`Queue<K>`] — key only.
//! - [`KVQueue<K, V>`] — key plus an associated payload.
//!
//! Both share the same lock-free skip-list core described in the module
//! docs of `queue` and built on the markable reference-counted pointer in
//! `internal::mrc`. No locks are taken anywhere in `push`/`try_pop`; a
//! stalled thread can only slow other threads down, never block them —
//! concurrent traversals help finish a stalled thread's pending unlink.
//!
//! ```
//! use cslpq::Queue;
//!
//! let q: Queue<u32> = Queue::new(4);
//! q.push(3);
//! q.push(1);
//! q.push(2);
//! assert_eq!(q.try_pop(), Some(1));
//! assert_eq!(q.try_pop(), Some(2));
//! assert_eq!(q.try_pop(), Some(3));
//! assert_eq!(q.try_pop(), None);
//! ```

mod error;
mod internal;
mod level;
mod node;
mod queue;

pub use error::Error;
pub use queue::{KVQueue, Queue};
