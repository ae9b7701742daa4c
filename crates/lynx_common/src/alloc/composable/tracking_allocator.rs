use core::{
    alloc::Layout,
    ptr::NonNull,
    sync::atomic::{AtomicUsize, Ordering},
};
use std::sync::Arc;

use lynx_logging::{log_error, log_info, log_warning, LogCategory};

use crate::alloc::{Allocator, ComposableAllocator, Mallocator};

const LOG_CAT: LogCategory = LogCategory::new_with_sub("Memory", "Tracking");

/// Statistics gathered by a [`TrackingAllocator`]
///
/// The statistics are shared between a tracking allocator and every allocator copied from it.
/// Values that are moved out of a container (e.g. by `pop`) are not counted as destroyed.
#[derive(Default, Debug)]
pub struct AllocStats {
    live_allocs:   AtomicUsize,
    live_bytes:    AtomicUsize,
    total_allocs:  AtomicUsize,
    failed_allocs: AtomicUsize,
    constructed:   AtomicUsize,
    destroyed:     AtomicUsize,
}

impl AllocStats {
    /// Number of allocations that have not been deallocated yet
    pub fn live_allocs(&self) -> usize {
        self.live_allocs.load(Ordering::Relaxed)
    }

    /// Number of bytes that are currently allocated
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::Relaxed)
    }

    /// Number of successful allocations over the lifetime of the allocator
    pub fn total_allocs(&self) -> usize {
        self.total_allocs.load(Ordering::Relaxed)
    }

    /// Number of allocation requests that could not be fulfilled
    pub fn failed_allocs(&self) -> usize {
        self.failed_allocs.load(Ordering::Relaxed)
    }

    /// Number of values constructed through the allocator
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::Relaxed)
    }

    /// Number of values destroyed through the allocator
    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::Relaxed)
    }

    /// Number of values constructed, but not yet destroyed
    pub fn live_values(&self) -> usize {
        self.constructed().saturating_sub(self.destroyed())
    }
}

/// Allocator wrapping another allocator, keeping track of its allocations and of the values constructed in them
///
/// A tracking allocator can also be given a budget, in which case any allocation that would make the live bytes exceed the budget fails.
///
/// Copies of a tracking allocator share their statistics.
#[derive(Clone, Debug)]
pub struct TrackingAllocator<A: Allocator = Mallocator> {
    inner:  A,
    stats:  Arc<AllocStats>,
    budget: Option<usize>,
}

impl<A: Allocator> TrackingAllocator<A> {
    /// Create a new tracking allocator around `inner`
    pub fn new(inner: A) -> Self {
        Self { inner, stats: Arc::new(AllocStats::default()), budget: None }
    }

    /// Create a new tracking allocator around `inner`, that can have at most `budget` bytes allocated at the same time
    pub fn with_budget(inner: A, budget: usize) -> Self {
        Self { inner, stats: Arc::new(AllocStats::default()), budget: Some(budget) }
    }

    /// Get the statistics of the allocator
    pub fn stats(&self) -> Arc<AllocStats> {
        self.stats.clone()
    }

    /// Get the budget of the allocator
    pub fn budget(&self) -> Option<usize> {
        self.budget
    }

    /// Set the budget of the allocator, `None` removes the budget
    pub fn set_budget(&mut self, budget: Option<usize>) {
        self.budget = budget;
    }

    /// Get the wrapped allocator
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl Default for TrackingAllocator<Mallocator> {
    fn default() -> Self {
        Self::new(Mallocator)
    }
}

impl<A: Allocator> Allocator for TrackingAllocator<A> {
    unsafe fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        if let Some(budget) = self.budget {
            if self.stats.live_bytes().saturating_add(layout.size()) > budget {
                self.stats.failed_allocs.fetch_add(1, Ordering::Relaxed);
                log_info!(LOG_CAT, "Refused allocation of {} bytes, budget of {} bytes would be exceeded", layout.size(), budget);
                return None;
            }
        }

        match self.inner.alloc(layout) {
            Some(ptr) => {
                self.stats.live_allocs.fetch_add(1, Ordering::Relaxed);
                self.stats.live_bytes.fetch_add(layout.size(), Ordering::Relaxed);
                self.stats.total_allocs.fetch_add(1, Ordering::Relaxed);
                Some(ptr)
            },
            None => {
                self.stats.failed_allocs.fetch_add(1, Ordering::Relaxed);
                log_error!(LOG_CAT, Self::alloc, "Inner allocator failed to allocate {} bytes (align: {})", layout.size(), layout.align());
                None
            },
        }
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        self.inner.dealloc(ptr, layout);
        self.stats.live_allocs.fetch_sub(1, Ordering::Relaxed);
        self.stats.live_bytes.fetch_sub(layout.size(), Ordering::Relaxed);
    }

    unsafe fn construct<T>(&mut self, slot: NonNull<T>, value: T) {
        self.inner.construct(slot, value);
        self.stats.constructed.fetch_add(1, Ordering::Relaxed);
    }

    unsafe fn destroy<T>(&mut self, slot: NonNull<T>) {
        // The value's lifetime has ended, even when its destructor panics
        self.stats.destroyed.fetch_add(1, Ordering::Relaxed);
        self.inner.destroy(slot);
    }
}

impl<A: Allocator> ComposableAllocator<A> for TrackingAllocator<A> {
    fn new_composable(inner: A) -> Self {
        Self::new(inner)
    }
}

impl<A: Allocator> Drop for TrackingAllocator<A> {
    fn drop(&mut self) {
        // Only the last copy reports, earlier copies may still own allocations
        if Arc::strong_count(&self.stats) == 1 && self.stats.live_allocs() != 0 {
            log_warning!(LOG_CAT, "Tracking allocator dropped with {} live allocations ({} bytes)", self.stats.live_allocs(), self.stats.live_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use core::alloc::Layout;

    use crate::alloc::{Allocator, ComposableAllocator, Mallocator};
    use super::TrackingAllocator;

    #[test]
    fn counts_allocations() {
        let mut alloc = TrackingAllocator::new(Mallocator);
        let stats = alloc.stats();
        let layout = Layout::array::<u32>(4).unwrap();

        unsafe {
            let a = alloc.alloc(layout).unwrap();
            let b = alloc.alloc(layout).unwrap();
            assert_eq!(stats.live_allocs(), 2);
            assert_eq!(stats.live_bytes(), 32);

            alloc.dealloc(a, layout);
            assert_eq!(stats.live_allocs(), 1);
            assert_eq!(stats.live_bytes(), 16);

            alloc.dealloc(b, layout);
        }

        assert_eq!(stats.live_allocs(), 0);
        assert_eq!(stats.total_allocs(), 2);
        assert_eq!(stats.failed_allocs(), 0);
    }

    #[test]
    fn budget_refuses_allocations() {
        let mut alloc = TrackingAllocator::with_budget(Mallocator, 64);
        let stats = alloc.stats();

        unsafe {
            let layout = Layout::from_size_align(48, 8).unwrap();
            let ptr = alloc.alloc(layout).unwrap();
            assert!(alloc.alloc(layout).is_none());
            assert_eq!(stats.failed_allocs(), 1);

            alloc.set_budget(None);
            let other = alloc.alloc(layout).unwrap();

            alloc.dealloc(other, layout);
            alloc.dealloc(ptr, layout);
        }
        assert_eq!(stats.live_bytes(), 0);
    }

    #[test]
    fn counts_constructed_values() {
        let mut alloc = TrackingAllocator::<Mallocator>::new_composable(Mallocator);
        let stats = alloc.stats();
        let layout = Layout::new::<String>();

        unsafe {
            let ptr = alloc.alloc(layout).unwrap();
            alloc.construct(ptr.cast(), String::from("tracked"));
            assert_eq!(stats.live_values(), 1);

            alloc.destroy(ptr.cast::<String>());
            assert_eq!(stats.constructed(), 1);
            assert_eq!(stats.destroyed(), 1);
            assert_eq!(stats.live_values(), 0);

            alloc.dealloc(ptr, layout);
        }
    }

    #[test]
    fn copies_share_stats() {
        let alloc = TrackingAllocator::default();
        let mut copy = alloc.select_on_copy();
        let layout = Layout::new::<u64>();

        unsafe {
            let ptr = copy.alloc(layout).unwrap();
            assert_eq!(alloc.stats().live_allocs(), 1);
            copy.dealloc(ptr, layout);
        }
        assert_eq!(alloc.stats().live_allocs(), 0);
    }
}
