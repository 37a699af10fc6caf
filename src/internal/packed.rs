//! The 16-byte `(ptr, meta)` word an `Mrc<T>` wraps in a single
//! `atomic::Atomic` for one-CAS mark-and-swap semantics (§4.1).
//!
//! `meta`'s bit 0 is the mark; the remaining bits are the in-flight
//! split-reference-counting "local count" (see `mrc.rs`).

use std::ptr::null_mut;

use super::utils::RcInner;

pub(crate) const MARK_BIT: usize = 1;
pub(crate) const LOCAL_UNIT: usize = 2;

#[repr(C)]
pub(crate) struct PackedPtr<T> {
    pub(crate) ptr: *mut RcInner<T>,
    pub(crate) meta: usize,
}

impl<T> PackedPtr<T> {
    pub(crate) fn null() -> Self {
        Self {
            ptr: null_mut(),
            meta: 0,
        }
    }

    pub(crate) fn mark(&self) -> bool {
        self.meta & MARK_BIT != 0
    }

    pub(crate) fn local_count(&self) -> usize {
        self.meta >> 1
    }
}

impl<T> Clone for PackedPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PackedPtr<T> {}

impl<T> PartialEq for PackedPtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr && self.meta == other.meta
    }
}

unsafe impl<T> Send for PackedPtr<T> {}
unsafe impl<T> Sync for PackedPtr<T> {}

// `atomic::Atomic<T>` requires `T` to be a bytemuck plain-old-data type: the
// word has no padding (`ptr` and `meta` are both pointer-width) and every
// bit pattern of a raw pointer plus a `usize` is a valid `PackedPtr<T>`, so
// both directions of the bytemuck contract hold regardless of `T`.
unsafe impl<T> bytemuck::NoUninit for PackedPtr<T> {}
unsafe impl<T> bytemuck::AnyBitPattern for PackedPtr<T> {}

static_assertions::const_assert!(std::mem::size_of::<PackedPtr<()>>() <= 16);
