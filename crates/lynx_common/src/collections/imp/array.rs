use std::{
    alloc::{self, Layout},
    marker::PhantomData,
    mem::{self, align_of, size_of, ManuallyDrop},
    ptr::NonNull,
};

use lynx_logging::log_severe;

use crate::{
    alloc::Allocator,
    collections::{dynarr::uninit_relocate, ReserveStrategy, TryReserveError, LOG_CAT},
};

/// Low level utility for more ergonomically allocating, reallocating, and deallocating
/// a buffer of memory in an allocator without having to worry about all the corner cases involved.
/// In particular:
///
/// - Produces a dangling pointer on zero-sized types and zero-length allocations.
/// - Avoids freeing the dangling pointer.
/// - Catches all overflows in capacity computations (promotes them to "capacity overflow" errors).
/// - Never allocates for zero-sized types, but still keeps track of a logical capacity.
///
/// This type does not in anyway inspect the memory it manages. When dropped it *will* free its memory, but it *won't* try to drop its contents.
/// It is up to the user of `RawArray` to handle the actual things *stored* inside of `RawArray`.
pub(crate) struct RawArray<T, A: Allocator, R: ReserveStrategy> {
    ptr:      NonNull<T>,
    cap:      usize,
    alloc:    A,
    _phantom: PhantomData<(T, fn() -> R)>,
}

unsafe impl<T: Send, A: Allocator + Send, R: ReserveStrategy> Send for RawArray<T, A, R> {}
unsafe impl<T: Sync, A: Allocator + Sync, R: ReserveStrategy> Sync for RawArray<T, A, R> {}

impl<T, A: Allocator, R: ReserveStrategy> RawArray<T, A, R> {
    /// Creates a `RawArray` with a capacity of `0`, without allocating.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self { ptr: NonNull::dangling(), cap: 0, alloc, _phantom: PhantomData }
    }

    /// Creates a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    ///
    /// Non-fallible version of `try_with_capacity_in`.
    ///
    /// # Panics
    ///
    /// Panics if the requested capacity exceed `isize::MAX` bytes.
    ///
    /// # Aborts
    ///
    /// Aborts on OOM
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        match Self::try_with_capacity_in(capacity, alloc) {
            Ok(arr) => arr,
            Err(err) => handle_error(err),
        }
    }

    /// Tries to create a `RawArray` with exactly the capacity and alignment requirements for a `[T; capacity]`.
    pub fn try_with_capacity_in(capacity: usize, mut alloc: A) -> Result<Self, TryReserveError> {
        let ptr = allocate_buffer(&mut alloc, capacity)?;
        Ok(Self { ptr, cap: capacity, alloc, _phantom: PhantomData })
    }

    /// Get the capacity of the allocation.
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Get the allocator used for the allocation.
    pub const fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Get the allocator used for the allocation.
    pub fn allocator_mut(&mut self) -> &mut A {
        &mut self.alloc
    }

    /// Get a raw pointer to the start of the allocation.
    /// Note that this is a dangling pointer when either `capacity() == 0` or `T` is zero-sized.
    pub const fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Get the capacity to grow to, so that at least `min_capacity` elements fit.
    pub fn grown_capacity(&self, min_capacity: usize) -> Result<usize, TryReserveError> {
        R::calculate(self.cap, min_capacity).map_err(|_| TryReserveError::CapacityOverflow)
    }

    /// Allocate a buffer for `capacity` elements that will replace the current buffer once committed.
    ///
    /// The buffer is freed again if it's dropped without being committed.
    pub fn allocate_pending(&mut self, capacity: usize) -> Result<PendingBuffer<'_, T, A>, TryReserveError> {
        let ptr = allocate_buffer(&mut self.alloc, capacity)?;
        Ok(PendingBuffer { alloc: &mut self.alloc, ptr, cap: capacity })
    }

    /// Adopt a buffer returned by [`PendingBuffer::commit`] and free the current buffer.
    ///
    /// # Safety
    ///
    /// - `ptr` and `cap` must come from a pending buffer of this array.
    /// - All values in the current buffer must have been relocated or destroyed.
    pub unsafe fn replace_buffer(&mut self, ptr: NonNull<T>, cap: usize) {
        let old_ptr = mem::replace(&mut self.ptr, ptr);
        let old_cap = mem::replace(&mut self.cap, cap);
        deallocate_buffer(&mut self.alloc, old_ptr, old_cap);
    }

    /// Move the first `len` elements into a new buffer with a capacity of exactly `new_cap`.
    ///
    /// When an error is returned, the array is left untouched.
    ///
    /// # Safety
    ///
    /// The first `len` elements need to be initialized, and `len` can't exceed either capacity.
    pub unsafe fn try_reallocate(&mut self, len: usize, new_cap: usize) -> Result<(), TryReserveError> {
        debug_assert!(len <= self.cap && len <= new_cap);

        let src = self.ptr();
        let pending = self.allocate_pending(new_cap)?;
        uninit_relocate(src, len, pending.ptr());
        let (ptr, cap) = pending.commit();
        self.replace_buffer(ptr, cap);
        Ok(())
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Drop for RawArray<T, A, R> {
    fn drop(&mut self) {
        unsafe { deallocate_buffer(&mut self.alloc, self.ptr, self.cap) };
    }
}

//--------------------------------------------------------------

/// Buffer that is allocated for an array, but not yet owned by it.
pub(crate) struct PendingBuffer<'a, T, A: Allocator> {
    alloc: &'a mut A,
    ptr:   NonNull<T>,
    cap:   usize,
}

impl<'a, T, A: Allocator> PendingBuffer<'a, T, A> {
    /// Get a raw pointer to the start of the buffer.
    pub fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Get the allocator the buffer was allocated with.
    pub fn allocator_mut(&mut self) -> &mut A {
        self.alloc
    }

    /// Hand over ownership of the buffer, it won't be freed anymore when this is dropped.
    pub fn commit(self) -> (NonNull<T>, usize) {
        let this = ManuallyDrop::new(self);
        (this.ptr, this.cap)
    }
}

impl<'a, T, A: Allocator> Drop for PendingBuffer<'a, T, A> {
    fn drop(&mut self) {
        unsafe { deallocate_buffer(self.alloc, self.ptr, self.cap) };
    }
}

//--------------------------------------------------------------

fn allocate_buffer<T, A: Allocator>(alloc: &mut A, capacity: usize) -> Result<NonNull<T>, TryReserveError> {
    let layout = Layout::array::<T>(capacity).map_err(|_| TryReserveError::CapacityOverflow)?;
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }

    match unsafe { alloc.alloc(layout) } {
        Some(ptr) => Ok(ptr.cast()),
        None => Err(TryReserveError::AllocError(layout)),
    }
}

unsafe fn deallocate_buffer<T, A: Allocator>(alloc: &mut A, ptr: NonNull<T>, capacity: usize) {
    let size = size_of::<T>() * capacity;
    if size == 0 {
        return;
    }

    let layout = Layout::from_size_align_unchecked(size, align_of::<T>());
    alloc.dealloc(ptr.cast(), layout);
}

/// Central function for reserve error handling
#[cold]
#[track_caller]
pub(crate) fn handle_error(err: TryReserveError) -> ! {
    log_severe!(LOG_CAT, handle_error, "Failed to reserve memory: {}", err);
    match err {
        TryReserveError::CapacityOverflow => capacity_overflow(),
        TryReserveError::AllocError(layout) => alloc::handle_alloc_error(layout),
    }
}

#[track_caller]
fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

#[cfg(test)]
mod tests {
    use crate::{
        alloc::{composable::TrackingAllocator, Mallocator},
        collections::{DoubleOrMinReserveStrategy, TryReserveError},
    };
    use super::RawArray;

    type TrackedArray<T> = RawArray<T, TrackingAllocator, DoubleOrMinReserveStrategy>;

    #[test]
    fn new_does_not_allocate() {
        let alloc = TrackingAllocator::default();
        let stats = alloc.stats();
        let arr = TrackedArray::<u32>::new_in(alloc);
        assert_eq!(arr.capacity(), 0);
        drop(arr);
        assert_eq!(stats.total_allocs(), 0);
    }

    #[test]
    fn zero_sized_never_allocates() {
        let alloc = TrackingAllocator::default();
        let stats = alloc.stats();
        let arr = TrackedArray::<()>::with_capacity_in(100, alloc);
        assert_eq!(arr.capacity(), 100);
        assert_eq!(stats.total_allocs(), 0);
    }

    #[test]
    fn grown_capacity() {
        let mut arr = RawArray::<u8, Mallocator, DoubleOrMinReserveStrategy>::new_in(Mallocator);
        assert_eq!(arr.grown_capacity(1), Ok(2));
        assert_eq!(unsafe { arr.try_reallocate(0, 3) }, Ok(()));
        assert_eq!(arr.grown_capacity(4), Ok(6));
        assert_eq!(arr.grown_capacity(usize::MAX), Err(TryReserveError::CapacityOverflow));
    }

    #[test]
    fn dropped_pending_buffer_is_freed() {
        let alloc = TrackingAllocator::default();
        let stats = alloc.stats();
        let mut arr = TrackedArray::<u64>::with_capacity_in(4, alloc);
        {
            let _pending = arr.allocate_pending(8).unwrap();
            assert_eq!(stats.live_allocs(), 2);
        }
        assert_eq!(stats.live_allocs(), 1);
        assert_eq!(arr.capacity(), 4);
    }

    #[test]
    fn reallocate_moves_values() {
        let alloc = TrackingAllocator::default();
        let stats = alloc.stats();
        let mut arr = TrackedArray::<u64>::with_capacity_in(2, alloc);
        unsafe {
            arr.ptr().write(7);
            arr.ptr().add(1).write(11);
            assert_eq!(arr.try_reallocate(2, 16), Ok(()));
            assert_eq!(*arr.ptr(), 7);
            assert_eq!(*arr.ptr().add(1), 11);
        }
        assert_eq!(arr.capacity(), 16);
        assert_eq!(stats.live_allocs(), 1);
        assert_eq!(stats.live_bytes(), 16 * 8);
    }

    #[test]
    fn failed_reallocate_leaves_array_untouched() {
        let alloc = TrackingAllocator::with_budget(Mallocator, 64);
        let mut arr = TrackedArray::<u64>::with_capacity_in(4, alloc);
        let ptr = arr.ptr();

        let err = unsafe { arr.try_reallocate(0, 8) };
        assert!(matches!(err, Err(TryReserveError::AllocError(_))));
        assert_eq!(arr.capacity(), 4);
        assert_eq!(arr.ptr(), ptr);
    }
}
