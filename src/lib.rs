//! Allocator-aware containers, see [`lynx_common`] for the containers themselves.

pub use lynx_base as base;
pub use lynx_common as common;
pub use lynx_logging as logging;

pub use lynx_common::{dynarr, prelude};
