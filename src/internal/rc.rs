//! A strong, owning reference to a heap-allocated `T`, reclaimed the moment
//! the last reference drops. This is the plain, non-atomic counterpart to
//! `Mrc<T>` — the type `Mrc::load` hands back and `Mrc::compare_exchange`
//! consumes.

use std::ops::Deref;
use std::ptr::NonNull;

use super::utils::RcInner;

pub(crate) struct Rc<T> {
    ptr: NonNull<RcInner<T>>,
}

unsafe impl<T: Send + Sync> Send for Rc<T> {}
unsafe impl<T: Send + Sync> Sync for Rc<T> {}

impl<T> Rc<T> {
    pub(crate) fn new(value: T) -> Self {
        let boxed = Box::new(RcInner::new(value));
        Self {
            ptr: NonNull::from(Box::leak(boxed)),
        }
    }

    pub(crate) fn as_ptr(&self) -> *mut RcInner<T> {
        self.ptr.as_ptr()
    }

    /// # Safety
    /// `ptr` must point at a live `RcInner<T>` and the caller must be
    /// transferring exactly one strong reference's worth of ownership.
    pub(crate) unsafe fn from_raw(ptr: *mut RcInner<T>) -> Self {
        Self {
            ptr: NonNull::new_unchecked(ptr),
        }
    }

    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
    }
}

impl<T> Deref for Rc<T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { self.ptr.as_ref().data() }
    }
}

impl<T> Clone for Rc<T> {
    fn clone(&self) -> Self {
        unsafe { RcInner::increment_strong(self.ptr.as_ptr()) };
        Self { ptr: self.ptr }
    }
}

impl<T> Drop for Rc<T> {
    fn drop(&mut self) {
        unsafe { RcInner::decrement_strong(self.ptr.as_ptr()) };
    }
}

impl<T> PartialEq for Rc<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}
