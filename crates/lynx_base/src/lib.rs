//! Library defining cross library utilities that can be implemented using `#![no_std]`
#![no_std]

mod helper_macros;

mod bytes;
pub use bytes::*;
