mod alloc;

pub mod primitives;

cfg_if::cfg_if! {
    if #[cfg(feature = "memory_tracking")] {
        pub mod composable;
    }
}

pub use alloc::*;
pub use primitives::Mallocator;
