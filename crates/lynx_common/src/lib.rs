//! Common building blocks: allocators, and the containers built on top of them.

pub mod alloc;
pub mod collections;
pub mod fmt;

pub mod prelude;

pub use lynx_base::count_exprs;
