use std::{
    fmt,
    iter::FusedIterator,
    ptr,
    slice,
};

use crate::{
    alloc::{Allocator, Mallocator},
    collections::{imp::array::RawArray, DoubleOrMinReserveStrategy, ReserveStrategy},
};
use super::uninit::destroy_range;

/// An iterator that moves out of a [`DynArr`](super::DynArr).
///
/// Elements that are not yielded are destroyed when the iterator is dropped.
pub struct IntoIter<T, A: Allocator = Mallocator, R: ReserveStrategy = DoubleOrMinReserveStrategy> {
    pub(super) arr:   RawArray<T, A, R>,
    /// Index of the next element returned by `next`
    pub(super) start: usize,
    /// Index past the element returned by `next_back`
    pub(super) end:   usize,
}

impl<T: fmt::Debug, A: Allocator, R: ReserveStrategy> fmt::Debug for IntoIter<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A: Allocator, R: ReserveStrategy> IntoIter<T, A, R> {
    /// Returns the remaining items of this iterator as a slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use lynx_common::dynarr;
    ///
    /// let arr = dynarr!['a', 'b', 'c'];
    /// let mut into_iter = arr.into_iter();
    /// assert_eq!(into_iter.as_slice(), &['a', 'b', 'c']);
    /// let _ = into_iter.next().unwrap();
    /// assert_eq!(into_iter.as_slice(), &['b', 'c']);
    /// ```
    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.arr.ptr().add(self.start), self.end - self.start) }
    }

    /// Returns the remaining items of this iterator as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.arr.ptr().add(self.start), self.end - self.start) }
    }

    /// Get the allocator of the underlying array
    pub fn allocator(&self) -> &A {
        self.arr.allocator()
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Iterator for IntoIter<T, A, R> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            None
        } else {
            let idx = self.start;
            self.start += 1;
            Some(unsafe { ptr::read(self.arr.ptr().add(idx)) })
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.start;
        (len, Some(len))
    }

    #[inline]
    fn count(self) -> usize {
        self.len()
    }
}

impl<T, A: Allocator, R: ReserveStrategy> DoubleEndedIterator for IntoIter<T, A, R> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            None
        } else {
            self.end -= 1;
            Some(unsafe { ptr::read(self.arr.ptr().add(self.end)) })
        }
    }
}

impl<T, A: Allocator, R: ReserveStrategy> ExactSizeIterator for IntoIter<T, A, R> {}

impl<T, A: Allocator, R: ReserveStrategy> FusedIterator for IntoIter<T, A, R> {}

impl<T, A: Allocator, R: ReserveStrategy> Drop for IntoIter<T, A, R> {
    fn drop(&mut self) {
        let remaining = self.end - self.start;
        let first = unsafe { self.arr.ptr().add(self.start) };
        self.start = self.end;

        // `RawArray` frees the buffer afterwards
        unsafe { destroy_range(self.arr.allocator_mut(), first, remaining) };
    }
}
