//! Primitives moving, copying and destroying runs of elements in raw storage.
//!
//! Moving a value in rust is a plain memory copy that can't fail, so relocating never needs to roll back.
//! Cloning can panic, in which case everything constructed up to that point is destroyed again before the panic continues.

use core::ptr::{self, NonNull};

use crate::alloc::Allocator;
use super::in_place_drop::InPlaceDrop;

/// Relocate `len` values from `src` into the uninitialized slots starting at `dst`.
///
/// Afterwards the source slots are logically uninitialized. Returns a pointer past the last written slot.
///
/// # Safety
///
/// - `src` needs to point to `len` initialized values.
/// - `dst` needs to be valid for `len` writes, and can't overlap the source.
#[inline]
pub(crate) unsafe fn uninit_relocate<T>(src: *const T, len: usize, dst: *mut T) -> *mut T {
    ptr::copy_nonoverlapping(src, dst, len);
    dst.add(len)
}

/// Relocate `len` values from `src` into the slots starting at `dst`, leaving a single slot gap before each source value for which `gap` returns `true`.
///
/// `gap` gets passed the index of the source value. Returns a pointer past the last written slot.
///
/// # Safety
///
/// Same as [`uninit_relocate`], `dst` needs to be valid for `len` writes plus one for each gap.
pub(crate) unsafe fn uninit_relocate_if<T, F>(src: *const T, len: usize, dst: *mut T, mut gap: F) -> *mut T where
    F: FnMut(usize) -> bool
{
    let mut cur = dst;
    for idx in 0..len {
        if gap(idx) {
            cur = cur.add(1);
        }
        ptr::copy_nonoverlapping(src.add(idx), cur, 1);
        cur = cur.add(1);
    }
    cur
}

/// Clone all values in `src` into the uninitialized slots starting at `dst`, using `alloc` to construct them.
///
/// If a clone panics, all values that were already cloned are destroyed before the panic continues.
///
/// # Safety
///
/// `dst` needs to be valid for `src.len()` writes, and can't overlap `src`.
pub(crate) unsafe fn uninit_clone<T: Clone, A: Allocator>(alloc: &mut A, src: &[T], dst: *mut T) -> *mut T {
    let mut guard = InPlaceDrop::new(alloc, dst);
    for value in src {
        guard.push(value.clone());
    }
    guard.finish()
}

/// Fill `count` uninitialized slots starting at `dst` with clones of `value`, using `alloc` to construct them.
///
/// If a clone panics, all values that were already cloned are destroyed before the panic continues.
///
/// # Safety
///
/// `dst` needs to be valid for `count` writes.
pub(crate) unsafe fn uninit_fill<T: Clone, A: Allocator>(alloc: &mut A, value: &T, count: usize, dst: *mut T) -> *mut T {
    let mut guard = InPlaceDrop::new(alloc, dst);
    for _ in 0..count {
        guard.push(value.clone());
    }
    guard.finish()
}

/// Destroy `len` values starting at `first`, using `alloc`.
///
/// When a destructor panics, the remaining values are still destroyed.
///
/// # Safety
///
/// `first` needs to point to `len` initialized values that were constructed with `alloc`.
pub(crate) unsafe fn destroy_range<T, A: Allocator>(alloc: &mut A, first: *mut T, len: usize) {
    let mut state = scopeguard::guard_on_unwind((alloc, 0usize), |(alloc, next)| {
        for idx in next..len {
            unsafe { alloc.destroy(NonNull::new_unchecked(first.add(idx))) };
        }
    });

    while state.1 < len {
        let idx = state.1;
        state.1 += 1;
        state.0.destroy(NonNull::new_unchecked(first.add(idx)));
    }
}
