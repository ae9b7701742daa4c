mod tracking_allocator;

pub use tracking_allocator::*;
