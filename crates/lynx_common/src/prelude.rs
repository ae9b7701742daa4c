pub use core::prelude::*;

pub use lynx_base::{KiB, MiB};

pub use crate::alloc::{Allocator, Mallocator};
pub use crate::collections::{DynArr, Cursor, CursorMut};
pub use crate::dynarr;
