//! The Markable Reference-Counted pointer (§4.1): one atomic word per
//! forward link, combining a strong reference to the successor with a
//! monotonic deletion mark, updated together by a single compare-exchange.
//!
//! `load` implements the reserve → promote → release protocol described in
//! the spec's split-reference-counting rationale: it reserves a slot in the
//! word's inline local count, unconditionally promotes that reservation into
//! a real strong reference on the target (`RcInner::increment_strong`), then
//! tries to release the reservation in place. If a concurrent
//! `compare_exchange`/`test_and_set_mark` swept the word away first, that
//! swap already folded every outstanding reservation — including this one —
//! into the target's strong count (see `retire`), so the reservation holder
//! must cancel its own redundant promotion instead of releasing it.

use atomic::{Atomic, Ordering};

use super::packed::{PackedPtr, LOCAL_UNIT, MARK_BIT};
use super::rc::Rc;
use super::utils::RcInner;

pub(crate) struct Mrc<T> {
    inner: Atomic<PackedPtr<T>>,
}

unsafe impl<T: Send + Sync> Send for Mrc<T> {}
unsafe impl<T: Send + Sync> Sync for Mrc<T> {}

impl<T> Mrc<T> {
    pub(crate) fn null() -> Self {
        Self {
            inner: Atomic::new(PackedPtr::null()),
        }
    }

    /// Plain, non-atomic publication of the initial value. Sound only while
    /// the owning node is still private to its constructor (§4.2 `SetNext`).
    ///
    /// `Queue::push` may call this more than once on the same link across
    /// `find_last_of_priority` retries, so any target already installed here
    /// is released through `retire` first, same as a successful
    /// `compare_exchange` retires the link it supersedes.
    pub(crate) fn init(&self, rc: Option<Rc<T>>) {
        let ptr = rc.as_ref().map_or(std::ptr::null_mut(), Rc::as_ptr);
        std::mem::forget(rc);
        let previous = self.inner.load(Ordering::Relaxed);
        self.inner.store(PackedPtr { ptr, meta: 0 }, Ordering::Relaxed);
        self.retire(previous);
    }

    /// §4.1 `Load` — returns a fresh strong reference to the current
    /// successor (or `None` at the tail) together with the link's mark bit.
    pub(crate) fn load(&self) -> (Option<Rc<T>>, bool) {
        loop {
            let cur = self.inner.load(Ordering::Acquire);
            let reserved = PackedPtr {
                ptr: cur.ptr,
                meta: cur.meta.wrapping_add(LOCAL_UNIT),
            };
            if self
                .inner
                .compare_exchange_weak(cur, reserved, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                let mark = cur.mark();
                if cur.ptr.is_null() {
                    self.release_reservation(cur.ptr);
                    return (None, mark);
                }
                unsafe { RcInner::increment_strong(cur.ptr) };
                if !self.release_reservation(cur.ptr) {
                    // A concurrent swap already credited this reservation to
                    // `cur.ptr`'s strong count on our behalf; undo our own
                    // promotion so the node isn't credited twice.
                    unsafe { RcInner::decrement_strong(cur.ptr) };
                }
                return (Some(unsafe { Rc::from_raw(cur.ptr) }), mark);
            }
        }
    }

    /// Tries to undo the reservation `load` made, in place. Returns `false`
    /// if the link had already moved on to a different target by the time
    /// we tried — meaning a swap already absorbed our reservation.
    fn release_reservation(&self, ptr: *mut RcInner<T>) -> bool {
        loop {
            let now = self.inner.load(Ordering::Acquire);
            if now.ptr != ptr {
                return false;
            }
            let released = PackedPtr {
                ptr: now.ptr,
                meta: now.meta.wrapping_sub(LOCAL_UNIT),
            };
            if self
                .inner
                .compare_exchange_weak(now, released, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return true;
            }
        }
    }

    pub(crate) fn is_marked(&self) -> bool {
        self.inner.load(Ordering::Acquire).mark()
    }

    /// §4.1 `CompareExchange` — succeeds iff the link currently points at
    /// `expected` and is unmarked; ownership of `new` moves into the link on
    /// success, and is handed back to the caller on failure.
    pub(crate) fn compare_exchange(
        &self,
        expected: Option<&Rc<T>>,
        new: Option<Rc<T>>,
    ) -> Result<(), Option<Rc<T>>> {
        let expected_ptr = expected.map_or(std::ptr::null_mut(), Rc::as_ptr);
        loop {
            let cur = self.inner.load(Ordering::Acquire);
            if cur.ptr != expected_ptr || cur.mark() {
                return Err(new);
            }
            let new_ptr = new.as_ref().map_or(std::ptr::null_mut(), Rc::as_ptr);
            let desired = PackedPtr {
                ptr: new_ptr,
                meta: 0,
            };
            match self
                .inner
                .compare_exchange_weak(cur, desired, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => {
                    std::mem::forget(new);
                    self.retire(cur);
                    return Ok(());
                }
                Err(_) => continue,
            }
        }
    }

    /// §4.1 `TestAndSetMark` — succeeds iff the link currently points at
    /// `expected` and is unmarked; sets the mark atomically on success. This
    /// is the level-0 logical-deletion linearization point.
    pub(crate) fn test_and_set_mark(&self, expected: Option<&Rc<T>>) -> bool {
        let expected_ptr = expected.map_or(std::ptr::null_mut(), Rc::as_ptr);
        loop {
            let cur = self.inner.load(Ordering::Acquire);
            if cur.ptr != expected_ptr || cur.mark() {
                return false;
            }
            let desired = PackedPtr {
                ptr: cur.ptr,
                meta: cur.meta | MARK_BIT,
            };
            match self
                .inner
                .compare_exchange_weak(cur, desired, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return true,
                Err(_) => continue,
            }
        }
    }

    /// §4.1 `SetMark` — unconditional, monotonic: a no-op if already marked.
    /// Used for the best-effort upper-level helper marks in `TryPop`.
    pub(crate) fn set_mark(&self) {
        loop {
            let cur = self.inner.load(Ordering::Acquire);
            if cur.mark() {
                return;
            }
            let desired = PackedPtr {
                ptr: cur.ptr,
                meta: cur.meta | MARK_BIT,
            };
            if self
                .inner
                .compare_exchange_weak(cur, desired, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return;
            }
        }
    }

    /// Folds any local-load reservations accumulated on a just-superseded
    /// word into its old target's strong count, then releases the link's
    /// own strong reference to that target.
    fn retire(&self, old: PackedPtr<T>) {
        if old.ptr.is_null() {
            return;
        }
        unsafe {
            RcInner::add_strong(old.ptr, old.local_count());
            RcInner::decrement_strong(old.ptr);
        }
    }
}

impl<T> Drop for Mrc<T> {
    fn drop(&mut self) {
        let cur = self.inner.load(Ordering::Acquire);
        if !cur.ptr.is_null() {
            unsafe { RcInner::decrement_strong(cur.ptr) };
        }
    }
}
