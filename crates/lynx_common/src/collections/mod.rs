//! Allocator-aware containers

pub(crate) mod imp;

mod dynarr;

use core::{alloc::Layout, cmp};

use lynx_logging::LogCategory;
use thiserror::Error;

pub use dynarr::*;

pub(crate) const LOG_CAT: LogCategory = LogCategory::new("Collections");

//--------------------------------------------------------------

macro_rules! impl_slice_partial_eq_generic {
    ([$($vars:tt)*] $lhs:ty, $rhs:ty $(where $ty:ty: $bound:ident)?) => {
        impl<T, U, $($vars)*> PartialEq<$rhs> for $lhs  where
            T : PartialEq<U>,
            $($ty: $bound)?
        {
            #[inline]
            fn eq(&self, other: &$rhs) -> bool { self[..] == other[..] }
            #[inline]
            fn ne(&self, other: &$rhs) -> bool { self[..] != other[..] }
        }
    };
}
use impl_slice_partial_eq_generic;

//--------------------------------------------------------------

/// Error returned when memory for a container could not be reserved
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum TryReserveError {
    /// The requested capacity can't be represented in memory
    #[error("capacity overflow")]
    CapacityOverflow,
    /// The allocator could not provide memory for the given layout
    #[error("memory allocation of {} bytes failed", .0.size())]
    AllocError(Layout),
}

/// Error returned when accessing an element at an index past the end of a container
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
#[error("index (is {index}) should be < len (is {len})")]
pub struct OutOfRange {
    /// Index that was accessed
    pub index: usize,
    /// Length of the container at the time of the access
    pub len:   usize,
}

/// Error returned when constructing an element in place did not succeed
///
/// In both cases the container is left exactly as it was before the call.
#[derive(Debug, Error)]
pub enum EmplaceError<E> {
    /// Memory for the new element could not be reserved
    #[error(transparent)]
    Reserve(#[from] TryReserveError),
    /// The constructor of the element returned an error
    #[error("failed to construct element: {0}")]
    Construct(E),
}

//--------------------------------------------------------------

/// A trait used to define a strategy to reserve additional memory for containers.
pub trait ReserveStrategy {
    /// Calculate the new capacity for a container.
    ///
    /// `cur_capacity` represents the current capacity of the container.
    ///
    /// `min_capacity` represents the minimum required capacity to be able to resize.
    ///
    /// Returns `Err(())` if the capacity were to overflow
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()>;
}

/// A reserve strategy that will try to either return double the current capacity, or the minimum required capacity, whichever is bigger.
///
/// An empty container grows to [`DoubleOrMinReserveStrategy::BASE_CAPACITY`].
#[derive(Clone, Copy, Default, Debug)]
pub struct DoubleOrMinReserveStrategy;

impl DoubleOrMinReserveStrategy {
    /// Capacity an empty container grows to
    pub const BASE_CAPACITY: usize = 2;
}

impl ReserveStrategy for DoubleOrMinReserveStrategy {
    fn calculate(cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        let double_cap = match cur_capacity {
            0 => Self::BASE_CAPACITY,
            cap => cap.checked_mul(2).ok_or(())?,
        };
        let new_cap = cmp::max(double_cap, min_capacity);
        if new_cap <= isize::MAX as usize {
            Ok(new_cap)
        } else {
            Err(())
        }
    }
}

/// A reserve strategy that will return a power of 2 capacity
#[derive(Clone, Copy, Default, Debug)]
pub struct Pow2ReserveStrategy;

impl ReserveStrategy for Pow2ReserveStrategy {
    fn calculate(_cur_capacity: usize, min_capacity: usize) -> Result<usize, ()> {
        match min_capacity.checked_next_power_of_two() {
            Some(new_cap) if new_cap <= isize::MAX as usize => Ok(new_cap),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use core::alloc::Layout;

    use super::*;

    #[test]
    fn double_or_min() {
        assert_eq!(DoubleOrMinReserveStrategy::calculate(0, 1), Ok(2));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(0, 5), Ok(5));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(2, 3), Ok(4));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(8, 9), Ok(16));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(8, 40), Ok(40));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(usize::MAX / 2 + 1, 1), Err(()));
        assert_eq!(DoubleOrMinReserveStrategy::calculate(0, isize::MAX as usize + 1), Err(()));
    }

    #[test]
    fn pow2() {
        assert_eq!(Pow2ReserveStrategy::calculate(0, 1), Ok(1));
        assert_eq!(Pow2ReserveStrategy::calculate(4, 5), Ok(8));
        assert_eq!(Pow2ReserveStrategy::calculate(4, usize::MAX), Err(()));
    }

    #[test]
    fn error_messages() {
        assert_eq!(OutOfRange { index: 4, len: 3 }.to_string(), "index (is 4) should be < len (is 3)");
        assert_eq!(TryReserveError::CapacityOverflow.to_string(), "capacity overflow");

        let layout = Layout::array::<u64>(4).unwrap();
        assert_eq!(TryReserveError::AllocError(layout).to_string(), "memory allocation of 32 bytes failed");

        let err: EmplaceError<&str> = EmplaceError::Construct("bad input");
        assert_eq!(err.to_string(), "failed to construct element: bad input");

        let err: EmplaceError<&str> = TryReserveError::CapacityOverflow.into();
        assert_eq!(err.to_string(), "capacity overflow");
    }
}
