use core::{mem::ManuallyDrop, ptr::NonNull};

use crate::alloc::Allocator;
use super::uninit::destroy_range;

// A helper struct for constructing values into a run of uninitialized slots.
// If it's dropped before being finished (i.e. a constructor panicked), the values constructed so far are destroyed again.
pub(super) struct InPlaceDrop<'a, T, A: Allocator> {
    alloc: &'a mut A,
    inner: *mut T,
    len:   usize,
}

impl<'a, T, A: Allocator> InPlaceDrop<'a, T, A> {
    pub(super) fn new(alloc: &'a mut A, inner: *mut T) -> Self {
        Self { alloc, inner, len: 0 }
    }

    /// Construct `value` in the next slot.
    ///
    /// # Safety
    ///
    /// The next slot needs to be valid for writes and uninitialized.
    #[inline]
    pub(super) unsafe fn push(&mut self, value: T) {
        self.alloc.construct(NonNull::new_unchecked(self.inner.add(self.len)), value);
        self.len += 1;
    }

    /// Keep all constructed values alive, and return a pointer past the last constructed value.
    pub(super) fn finish(self) -> *mut T {
        let this = ManuallyDrop::new(self);
        unsafe { this.inner.add(this.len) }
    }
}

impl<'a, T, A: Allocator> Drop for InPlaceDrop<'a, T, A> {
    #[inline]
    fn drop(&mut self) {
        unsafe { destroy_range(self.alloc, self.inner, self.len) };
    }
}
