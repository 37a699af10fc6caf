//! Allocation header shared by every heap-allocated `Node`: a value plus an
//! atomic strong count. `Rc<T>` and `Mrc<T>` (see `rc.rs` / `mrc.rs`) are the
//! only code that ever touches this directly.

use std::sync::atomic::{fence, AtomicUsize, Ordering};

pub(crate) struct RcInner<T> {
    data: T,
    strong: AtomicUsize,
}

impl<T> RcInner<T> {
    pub(crate) fn new(data: T) -> Self {
        Self {
            data,
            strong: AtomicUsize::new(1),
        }
    }

    pub(crate) fn data(&self) -> &T {
        &self.data
    }

    /// # Safety
    /// `ptr` must point at a live `RcInner<T>`.
    pub(crate) unsafe fn increment_strong(ptr: *mut RcInner<T>) {
        (*ptr).strong.fetch_add(1, Ordering::Relaxed);
    }

    /// # Safety
    /// `ptr` must point at a live `RcInner<T>`.
    pub(crate) unsafe fn add_strong(ptr: *mut RcInner<T>, n: usize) {
        if n > 0 {
            (*ptr).strong.fetch_add(n, Ordering::Relaxed);
        }
    }

    /// Releases one strong reference, deallocating the node once the count
    /// reaches zero.
    ///
    /// # Safety
    /// `ptr` must point at a live `RcInner<T>` that the caller holds exactly
    /// one strong reference to.
    pub(crate) unsafe fn decrement_strong(ptr: *mut RcInner<T>) {
        if (*ptr).strong.fetch_sub(1, Ordering::Release) == 1 {
            fence(Ordering::Acquire);
            drop(Box::from_raw(ptr));
        }
    }
}
