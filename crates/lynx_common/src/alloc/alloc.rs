use core::{alloc::Layout, ptr::{self, NonNull}};

//------------------------------------------------------------------------------------------------------------------------------

/// Allocator/Arena that can provide access to heap memory for containers
///
/// Besides handing out raw memory, an allocator is responsible for bringing elements to life inside that memory and for ending their lifetime again.
/// Containers only ever construct and destroy their elements through [`Allocator::construct`] and [`Allocator::destroy`],
/// so an allocator is able to observe every element it holds.
pub trait Allocator {
    /// Allocate memory from an allocator/arena
    ///
    ///  # Return
    ///
    /// If no memory could be allocated, `None` should be returned.
    ///
    /// # Safety
    ///
    /// The layout must have a non-zero size.
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>>;

    /// Deallocate an allocation
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `alloc` on this allocator (or an allocator it was copied from) using the same `layout`.
    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout);

    /// Construct `value` in the slot at `slot`
    ///
    /// # Safety
    ///
    /// `slot` must be valid for writes, correctly aligned and not contain a live value.
    #[inline]
    unsafe fn construct<T>(&mut self, slot: NonNull<T>, value: T) {
        slot.as_ptr().write(value);
    }

    /// Destroy the value in the slot at `slot`, the slot does not contain a live value afterwards
    ///
    /// # Safety
    ///
    /// `slot` must contain a live value that was constructed using this allocator.
    #[inline]
    unsafe fn destroy<T>(&mut self, slot: NonNull<T>) {
        ptr::drop_in_place(slot.as_ptr());
    }

    /// Get the allocator that should be used by a copy of a container that uses this allocator
    ///
    /// Default implementation copies the allocator
    fn select_on_copy(&self) -> Self where
        Self: Clone
    {
        self.clone()
    }
}

/// An allocator that can be used to compose other allocators
pub trait ComposableAllocator<Args>: Allocator {
    /// Create a new allocator
    fn new_composable(args: Args) -> Self;
}
