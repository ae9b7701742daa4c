use std::{
    alloc::Layout,
    ptr::NonNull,
};

use crate::alloc::Allocator;

/// Allocator calling directly to the system allocator
///
/// Mallocator uses rust's global allocator to retrieve memory
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Mallocator;

impl Allocator for Mallocator {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        NonNull::new(std::alloc::alloc(layout))
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        std::alloc::dealloc(ptr.as_ptr(), layout);
    }
}

#[cfg(test)]
mod test {
    use std::{alloc::Layout, ptr::NonNull};

    use crate::alloc::*;
    use super::Mallocator;

    #[test]
    fn alloc_dealloc() {
        let mut alloc = Mallocator;
        let layout = Layout::new::<u64>();

        unsafe {
            let ptr = alloc.alloc(layout).unwrap();
            alloc.dealloc(ptr, layout);
        }
    }

    #[test]
    fn construct_destroy() {
        let mut alloc = Mallocator;
        let layout = Layout::new::<String>();

        unsafe {
            let ptr = alloc.alloc(layout).unwrap();
            let slot: NonNull<String> = ptr.cast();
            alloc.construct(slot, String::from("lynx"));
            assert_eq!(*slot.as_ptr(), "lynx");
            alloc.destroy(slot);
            alloc.dealloc(ptr, layout);
        }
    }

    #[test]
    fn copy_selects_same_allocator() {
        let alloc = Mallocator;
        assert_eq!(alloc.select_on_copy(), Mallocator);
    }
}
