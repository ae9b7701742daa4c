use core::{
    borrow::{Borrow, BorrowMut},
    cmp::Ordering,
    convert::Infallible,
    fmt,
    hash::{Hash, Hasher},
    mem::{self, ManuallyDrop},
    ops::{self, Index, IndexMut},
    ptr::{self, NonNull},
    slice::{self, SliceIndex},
};

use crate::{
    alloc::{Allocator, Mallocator},
    fmt::Separated,
};
use super::{
    impl_slice_partial_eq_generic,
    imp::array::{handle_error, RawArray},
    DoubleOrMinReserveStrategy, EmplaceError, OutOfRange, ReserveStrategy, TryReserveError,
};

mod cursor;
mod in_place_drop;
mod into_iter;
mod uninit;


pub use cursor::*;
pub use into_iter::IntoIter;
pub(crate) use uninit::uninit_relocate;
use uninit::{destroy_range, uninit_clone, uninit_fill, uninit_relocate_if};

/// A contiguous growable array type, also known as a dynamic array, or DynArr.
///
/// Dynamic arrays have *O*(1) indexing, amortized *O*(1) push (to the end), and *O*(1) pop (from the back).
///
/// All memory used by a `DynArr` comes from its allocator, and every element is constructed and destroyed through it (see [`Allocator::construct`]).
///
/// # Examples
///
/// ```
/// use lynx_common::collections::DynArr;
///
/// let mut arr = DynArr::new();
/// arr.push(1);
/// arr.push(2);
///
/// assert_eq!(arr.len(), 2);
/// assert_eq!(arr[0], 1);
///
/// arr[0] = 7;
/// assert_eq!(arr[0], 7);
///
/// arr.extend([1, 2, 3]);
/// assert_eq!(arr, [7, 2, 1, 2, 3]);
/// ```
///
/// The [`dynarr!`](crate::dynarr) macro is provided for convenient initialization:
///
/// ```
/// use lynx_common::dynarr;
///
/// let mut arr1 = dynarr![1, 2, 3];
/// arr1.push(4);
/// let arr2 = dynarr![1, 2, 3, 4];
/// assert_eq!(arr1, arr2);
///
/// let zeros = dynarr![0; 5];
/// assert_eq!(zeros, [0, 0, 0, 0, 0]);
/// ```
///
/// # Capacity and reallocation
///
/// The capacity of a dynamic array is the amount of space allocated for any future elements that will be added onto the dynamic array.
/// This is not to be confused with the *length* of the dynamic array, which specifies the number of actual elements within the dynamic array.
/// If a dynamic array's length exceeds its capacity, its capacity will automatically be increased, but its elements will have to be reallocated.
///
/// With the default [`DoubleOrMinReserveStrategy`], a full dynamic array grows to double its capacity, and an empty one to a capacity of 2.
/// [`reserve`] and [`shrink_to_fit`] on the other hand set the capacity to exactly what was asked for.
/// [`push`] and [`insert`] will never reallocate if the reported capacity is sufficient, so the reported capacity can be relied on.
///
/// # Failure guarantees
///
/// When allocating or constructing an element fails (by panicking or by returning an error from a `try_` method),
/// the dynamic array is left exactly as it was before the call: same elements, same length, same capacity and same buffer.
/// No memory or element is leaked, and no element is dropped twice.
///
/// [`reserve`]: DynArr::reserve
/// [`shrink_to_fit`]: DynArr::shrink_to_fit
/// [`push`]: DynArr::push
/// [`insert`]: DynArr::insert
pub struct DynArr<T, A: Allocator = Mallocator, R: ReserveStrategy = DoubleOrMinReserveStrategy> {
    arr: RawArray<T, A, R>,
    len: usize,
}

impl<T> DynArr<T> {
    /// Constructs a new, empty `DynArr<T>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(Mallocator)
    }

    /// Constructs a new, empty `DynArr<T>` with exactly the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_in(capacity, Mallocator)
    }

    /// Tries to construct a new, empty `DynArr<T>` with exactly the specified capacity.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        Self::try_with_capacity_in(capacity, Mallocator)
    }

    /// Constructs a `DynArr<T>` containing `count` clones of `value`, with a capacity of exactly `count`.
    pub fn from_elem(value: T, count: usize) -> Self where
        T: Clone
    {
        Self::from_elem_in(value, count, Mallocator)
    }

    /// Constructs a `DynArr<T>` containing clones of all elements in `elements`, with a capacity of exactly `elements.len()`.
    pub fn from_slice(elements: &[T]) -> Self where
        T: Clone
    {
        Self::from_slice_in(elements, Mallocator)
    }

    /// Constructs a `DynArr<T>` containing clones of the elements in the range `[first, last)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lynx_common::{collections::DynArr, dynarr};
    ///
    /// let arr = dynarr![1, 2, 3, 4, 5];
    /// let sub = DynArr::from_cursors(arr.begin() + 1, arr.end() - 1);
    /// assert_eq!(sub, [2, 3, 4]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the cursors point into different arrays, or if `last` comes before `first`.
    #[track_caller]
    pub fn from_cursors<'a>(first: Cursor<'a, T>, last: Cursor<'a, T>) -> Self where
        T: Clone
    {
        Self::from_slice(first.slice_to(last))
    }
}

impl<T, A: Allocator, R: ReserveStrategy> DynArr<T, A, R> {
    /// Constructs a new, empty `DynArr<T, A, R>` using the provided allocator.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    #[inline]
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Self { arr: RawArray::new_in(alloc), len: 0 }
    }

    /// Constructs a new, empty `DynArr<T, A, R>` with exactly the specified capacity, using the provided allocator.
    ///
    /// If `capacity` is 0, or `T` is zero-sized, the dynamic array will not allocate.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Aborts
    ///
    /// Aborts if the allocator can't provide the memory.
    #[must_use]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        Self { arr: RawArray::with_capacity_in(capacity, alloc), len: 0 }
    }

    /// Tries to construct a new, empty `DynArr<T, A, R>` with exactly the specified capacity, using the provided allocator.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity exceeds `isize::MAX` _bytes_, or if the allocator reports an allocation failure.
    pub fn try_with_capacity_in(capacity: usize, alloc: A) -> Result<Self, TryReserveError> {
        Ok(Self { arr: RawArray::try_with_capacity_in(capacity, alloc)?, len: 0 })
    }

    /// Constructs a `DynArr<T, A, R>` containing `count` clones of `value`, with a capacity of exactly `count`.
    ///
    /// If a clone panics, all elements cloned so far are destroyed and the memory is returned to the allocator.
    pub fn from_elem_in(value: T, count: usize, alloc: A) -> Self where
        T: Clone
    {
        let mut arr = Self::with_capacity_in(count, alloc);
        unsafe {
            let dst = arr.as_mut_ptr();
            uninit_fill(arr.arr.allocator_mut(), &value, count, dst);
            arr.len = count;
        }
        arr
    }

    /// Constructs a `DynArr<T, A, R>` containing clones of all elements in `elements`, with a capacity of exactly `elements.len()`.
    ///
    /// If a clone panics, all elements cloned so far are destroyed and the memory is returned to the allocator.
    pub fn from_slice_in(elements: &[T], alloc: A) -> Self where
        T: Clone
    {
        let mut arr = Self::with_capacity_in(elements.len(), alloc);
        unsafe {
            let dst = arr.as_mut_ptr();
            uninit_clone(arr.arr.allocator_mut(), elements, dst);
            arr.len = elements.len();
        }
        arr
    }

    /// Constructs a `DynArr<T, A, R>` containing clones of the elements in the range `[first, last)`, using the provided allocator.
    ///
    /// # Panics
    ///
    /// Panics if the cursors point into different arrays, or if `last` comes before `first`.
    #[track_caller]
    pub fn from_cursors_in<'a>(first: Cursor<'a, T>, last: Cursor<'a, T>, alloc: A) -> Self where
        T: Clone
    {
        Self::from_slice_in(first.slice_to(last), alloc)
    }

    /// Returns the total number of elements the dynamic array can hold without reallocating.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.arr.capacity()
    }

    /// Returns the number of elements in the dynamic array.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the dynamic array contains no elements.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get a reference to the allocator used by the dynamic array.
    #[inline]
    pub const fn allocator(&self) -> &A {
        self.arr.allocator()
    }

    /// Extracts a slice containing the entire dynamic array.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self
    }

    /// Extracts a mutable slice containing the entire dynamic array.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }

    /// Get a pointer to the first element, the pointer is valid for [`len`](DynArr::len) reads.
    ///
    /// When the dynamic array has not allocated, the pointer is dangling, but still non-null and aligned.
    #[inline]
    pub const fn as_ptr(&self) -> *const T {
        self.arr.ptr()
    }

    /// Get a mutable pointer to the first element, the pointer is valid for [`len`](DynArr::len) reads and writes.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.arr.ptr()
    }

    /// Same as [`DynArr::as_slice`]
    #[inline]
    pub fn data(&self) -> &[T] {
        self
    }

    /// Same as [`DynArr::as_mut_slice`]
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        self
    }

    /// Forces the length of the dynamic array to `new_len`.
    ///
    /// # Safety
    ///
    /// - `new_len` must be less than or equal to [`capacity()`].
    /// - The elements at `old_len..new_len` must be initialized.
    ///
    /// [`capacity()`]: DynArr::capacity
    #[inline]
    pub unsafe fn set_len(&mut self, new_len: usize) {
        debug_assert!(new_len <= self.capacity());
        self.len = new_len;
    }

    //--------------------------------------------------------------
    // Element access

    fn slot(&self, index: usize) -> Result<NonNull<T>, OutOfRange> {
        if index < self.len {
            Ok(unsafe { NonNull::new_unchecked(self.arr.ptr().add(index)) })
        } else {
            Err(OutOfRange { index, len: self.len })
        }
    }

    /// Get a reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lynx_common::{collections::OutOfRange, dynarr};
    ///
    /// let arr = dynarr![10, 40, 30];
    /// assert_eq!(arr.at(1), Ok(&40));
    /// assert_eq!(arr.at(3), Err(OutOfRange { index: 3, len: 3 }));
    /// ```
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        self.slot(index).map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    /// Get a mutable reference to the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `index >= len`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        self.slot(index).map(|ptr| unsafe { &mut *ptr.as_ptr() })
    }

    /// Get a reference to the first element.
    ///
    /// # Panics
    ///
    /// Panics if the dynamic array is empty.
    #[track_caller]
    pub fn front(&self) -> &T {
        match self.slot(0) {
            Ok(ptr) => unsafe { &*ptr.as_ptr() },
            Err(_) => empty_access("front"),
        }
    }

    /// Get a mutable reference to the first element.
    ///
    /// # Panics
    ///
    /// Panics if the dynamic array is empty.
    #[track_caller]
    pub fn front_mut(&mut self) -> &mut T {
        match self.slot(0) {
            Ok(ptr) => unsafe { &mut *ptr.as_ptr() },
            Err(_) => empty_access("front_mut"),
        }
    }

    /// Get a reference to the last element.
    ///
    /// # Panics
    ///
    /// Panics if the dynamic array is empty.
    #[track_caller]
    pub fn back(&self) -> &T {
        match self.slot(self.len.wrapping_sub(1)) {
            Ok(ptr) => unsafe { &*ptr.as_ptr() },
            Err(_) => empty_access("back"),
        }
    }

    /// Get a mutable reference to the last element.
    ///
    /// # Panics
    ///
    /// Panics if the dynamic array is empty.
    #[track_caller]
    pub fn back_mut(&mut self) -> &mut T {
        match self.slot(self.len.wrapping_sub(1)) {
            Ok(ptr) => unsafe { &mut *ptr.as_ptr() },
            Err(_) => empty_access("back_mut"),
        }
    }

    //--------------------------------------------------------------
    // Cursors

    /// Get a cursor at the first element.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self, 0)
    }

    /// Get a cursor past the last element.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self, self.len)
    }

    /// Get a cursor at `index`, which may be equal to `len`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    #[track_caller]
    pub fn cursor(&self, index: usize) -> Cursor<'_, T> {
        Cursor::new(self, index)
    }

    /// Get a mutable cursor at the first element.
    pub fn begin_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut::new(self, 0)
    }

    /// Get a mutable cursor past the last element.
    pub fn end_mut(&mut self) -> CursorMut<'_, T> {
        let len = self.len;
        CursorMut::new(self, len)
    }

    /// Get a mutable cursor at `index`, which may be equal to `len`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`
    #[track_caller]
    pub fn cursor_mut(&mut self, index: usize) -> CursorMut<'_, T> {
        CursorMut::new(self, index)
    }

    //--------------------------------------------------------------
    // Capacity

    /// Ensures the capacity of the dynamic array is at least `capacity`.
    ///
    /// Unlike the amortized growth of [`push`], this reallocates to *exactly* `capacity` elements.
    /// Does nothing if the capacity is already sufficient.
    ///
    /// [`push`]: DynArr::push
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Examples
    ///
    /// ```
    /// use lynx_common::dynarr;
    ///
    /// let mut arr = dynarr![1];
    /// arr.reserve(10);
    /// assert_eq!(arr.capacity(), 10);
    /// arr.reserve(5);
    /// assert_eq!(arr.capacity(), 10);
    /// ```
    pub fn reserve(&mut self, capacity: usize) {
        if let Err(err) = self.try_reserve(capacity) {
            handle_error(err);
        }
    }

    /// Tries to ensure the capacity of the dynamic array is at least `capacity`.
    ///
    /// # Errors
    ///
    /// If the capacity overflows, or the allocator reports a failure, then an error is returned and the dynamic array is left untouched.
    pub fn try_reserve(&mut self, capacity: usize) -> Result<(), TryReserveError> {
        if capacity <= self.capacity() {
            return Ok(());
        }
        unsafe { self.arr.try_reallocate(self.len, capacity) }
    }

    /// Make room for `additional` more elements, growing the same way `push` does.
    fn reserve_amortized(&mut self, additional: usize) {
        let required = match self.len.checked_add(additional) {
            Some(required) => required,
            None => handle_error(TryReserveError::CapacityOverflow),
        };
        if required <= self.capacity() {
            return;
        }

        let res = self.arr.grown_capacity(required)
            .and_then(|new_cap| unsafe { self.arr.try_reallocate(self.len, new_cap) });
        if let Err(err) = res {
            handle_error(err);
        }
    }

    /// Shrinks the capacity of the dynamic array to exactly its length.
    ///
    /// An empty dynamic array releases its memory completely.
    ///
    /// # Aborts
    ///
    /// Aborts if the allocator can't provide the smaller buffer.
    pub fn shrink_to_fit(&mut self) {
        if let Err(err) = self.try_shrink_to_fit() {
            handle_error(err);
        }
    }

    /// Tries to shrink the capacity of the dynamic array to exactly its length.
    ///
    /// # Errors
    ///
    /// If the allocator reports a failure, an error is returned and the dynamic array is left untouched.
    pub fn try_shrink_to_fit(&mut self) -> Result<(), TryReserveError> {
        if self.capacity() > self.len {
            unsafe { self.arr.try_reallocate(self.len, self.len) }
        } else {
            Ok(())
        }
    }

    //--------------------------------------------------------------
    // Insertion

    /// Appends an element to the back of the dynamic array.
    ///
    /// # Panics
    ///
    /// Panics if the new capacity exceeds `isize::MAX` _bytes_.
    ///
    /// # Examples
    ///
    /// ```
    /// use lynx_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2];
    /// arr.push(3);
    /// assert_eq!(arr, [1, 2, 3]);
    /// ```
    ///
    /// # Time complexity
    ///
    /// Takes amortized *O*(1) time.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.emplace_back(|| value);
    }

    /// Constructs an element at the back of the dynamic array from the result of `f`, and returns a reference to it.
    ///
    /// When growing is needed, the new buffer is allocated before `f` is called, and `f` constructs directly into the new buffer.
    /// If `f` panics, the dynamic array is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use lynx_common::collections::DynArr;
    ///
    /// let mut arr = DynArr::new();
    /// let name = arr.emplace_back(|| String::from("lynx"));
    /// name.push('!');
    /// assert_eq!(arr[0], "lynx!");
    /// ```
    pub fn emplace_back<F>(&mut self, f: F) -> &mut T where
        F: FnOnce() -> T
    {
        let index = self.len;
        match self.emplace_impl(index, || Ok::<T, Infallible>(f())) {
            Ok(ptr) => unsafe { &mut *ptr.as_ptr() },
            Err(EmplaceError::Reserve(err)) => handle_error(err),
            Err(EmplaceError::Construct(never)) => match never {},
        }
    }

    /// Tries to construct an element at the back of the dynamic array from the result of `f`, and returns a reference to it.
    ///
    /// # Errors
    ///
    /// Returns an error if memory could not be reserved, or if `f` returns an error. The dynamic array is left untouched in both cases.
    pub fn try_emplace_back<E, F>(&mut self, f: F) -> Result<&mut T, EmplaceError<E>> where
        F: FnOnce() -> Result<T, E>
    {
        let index = self.len;
        self.emplace_impl(index, f).map(|ptr| unsafe { &mut *ptr.as_ptr() })
    }

    /// Inserts an element at position `index` within the dynamic array, shifting all elements after it to the right.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lynx_common::dynarr;
    ///
    /// let mut arr = dynarr![1, 2, 3];
    /// arr.insert(1, 4);
    /// assert_eq!(arr, [1, 4, 2, 3]);
    /// arr.insert(4, 5);
    /// assert_eq!(arr, [1, 4, 2, 3, 5]);
    /// ```
    ///
    /// # Time complexity
    ///
    /// Takes *O*(`len - index`) time.
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) -> CursorMut<'_, T> {
        self.emplace(index, || value)
    }

    /// Constructs an element at position `index` from the result of `f`, shifting all elements after it to the right.
    /// Returns a cursor at the new element.
    ///
    /// `f` is called before any element is moved, so if `f` panics, the dynamic array is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn emplace<F>(&mut self, index: usize, f: F) -> CursorMut<'_, T> where
        F: FnOnce() -> T
    {
        check_insert_index(index, self.len);
        match self.emplace_impl(index, || Ok::<T, Infallible>(f())) {
            Ok(_) => self.cursor_mut(index),
            Err(EmplaceError::Reserve(err)) => handle_error(err),
            Err(EmplaceError::Construct(never)) => match never {},
        }
    }

    /// Tries to construct an element at position `index` from the result of `f`, shifting all elements after it to the right.
    /// Returns a cursor at the new element.
    ///
    /// # Errors
    ///
    /// Returns an error if memory could not be reserved, or if `f` returns an error. The dynamic array is left untouched in both cases.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn try_emplace<E, F>(&mut self, index: usize, f: F) -> Result<CursorMut<'_, T>, EmplaceError<E>> where
        F: FnOnce() -> Result<T, E>
    {
        check_insert_index(index, self.len);
        self.emplace_impl(index, f)?;
        Ok(self.cursor_mut(index))
    }

    /// Core of all insertions: the element is only constructed once its final slot is known to be available,
    /// and nothing observable changes until it has been constructed.
    fn emplace_impl<E, F>(&mut self, index: usize, f: F) -> Result<NonNull<T>, EmplaceError<E>> where
        F: FnOnce() -> Result<T, E>
    {
        debug_assert!(index <= self.len);

        if self.len == self.capacity() {
            return self.emplace_grow(index, f);
        }

        let value = f().map_err(EmplaceError::Construct)?;
        unsafe {
            let slot = self.as_mut_ptr().add(index);
            if index < self.len {
                ptr::copy(slot, slot.add(1), self.len - index);
            }
            let slot = NonNull::new_unchecked(slot);
            self.arr.allocator_mut().construct(slot, value);
            self.len += 1;
            Ok(slot)
        }
    }

    #[cold]
    fn emplace_grow<E, F>(&mut self, index: usize, f: F) -> Result<NonNull<T>, EmplaceError<E>> where
        F: FnOnce() -> Result<T, E>
    {
        let len = self.len;
        let min_capacity = len.checked_add(1).ok_or(TryReserveError::CapacityOverflow)?;
        let new_cap = self.arr.grown_capacity(min_capacity)?;

        let src = self.arr.ptr();
        let mut pending = self.arr.allocate_pending(new_cap)?;
        // The pending buffer is released again if `f` fails
        let value = f().map_err(EmplaceError::Construct)?;

        unsafe {
            let dst = pending.ptr();
            let slot = NonNull::new_unchecked(dst.add(index));
            pending.allocator_mut().construct(slot, value);
            uninit_relocate_if(src, len, dst, |idx| idx == index);

            let (ptr, cap) = pending.commit();
            self.arr.replace_buffer(ptr, cap);
            self.len = len + 1;
            Ok(slot)
        }
    }

    //--------------------------------------------------------------
    // Removal

    /// Removes and returns the element at position `index`, shifting all elements after it to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    ///
    /// # Time complexity
    ///
    /// Takes *O*(`len - index`) time.
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        #[cold]
        #[track_caller]
        fn assert_failed(index: usize, len: usize) -> ! {
            panic!("removal index (is {index}) should be < len (is {len})");
        }

        let len = self.len;
        if index >= len {
            assert_failed(index, len);
        }
        unsafe {
            let slot = self.as_mut_ptr().add(index);
            let value = ptr::read(slot);
            ptr::copy(slot.add(1), slot, len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Destroys the element at position `index`, shifting all elements after it to the left.
    /// Returns a cursor at the element that followed the erased element, which is the end cursor when the last element was erased.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use lynx_common::dynarr;
    ///
    /// let mut arr = dynarr!['a', 'b', 'c'];
    /// let next = arr.erase(0);
    /// assert_eq!(*next, 'b');
    /// assert_eq!(arr, ['b', 'c']);
    /// ```
    #[track_caller]
    pub fn erase(&mut self, index: usize) -> CursorMut<'_, T> {
        let mut removed = ManuallyDrop::new(self.remove(index));
        unsafe { self.arr.allocator_mut().destroy(NonNull::from(&mut *removed)) };
        self.cursor_mut(index)
    }

    /// Removes the last element from a dynamic array and returns it, or [`None`] if it is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            unsafe {
                self.len -= 1;
                Some(ptr::read(self.as_ptr().add(self.len)))
            }
        }
    }

    /// Destroys the last element of the dynamic array.
    ///
    /// # Panics
    ///
    /// Panics if the dynamic array is empty.
    #[track_caller]
    pub fn pop_back(&mut self) {
        if self.len == 0 {
            empty_access("pop_back");
        }
        self.len -= 1;
        unsafe {
            let slot = NonNull::new_unchecked(self.as_mut_ptr().add(self.len));
            self.arr.allocator_mut().destroy(slot);
        }
    }

    /// Shortens the dynamic array, keeping the first `len` elements and destroying the rest.
    ///
    /// If `len` is greater or equal to the dynamic array's current length, this has no effect.
    /// This has no effect on the capacity.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }

        let remaining = self.len - len;
        // Any panicking destructor leaves the array in a valid state
        self.len = len;
        unsafe {
            let first = self.as_mut_ptr().add(len);
            destroy_range(self.arr.allocator_mut(), first, remaining);
        }
    }

    /// Destroys all elements, the capacity is unchanged.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0)
    }

    /// Resizes the dynamic array in-place so that `len` is equal to `count`.
    ///
    /// When growing, the new slots are filled with elements returned by `f`, called in order.
    /// If more capacity is needed, exactly `count` elements are reserved.
    pub fn resize_with<F>(&mut self, count: usize, mut f: F) where
        F: FnMut() -> T
    {
        if count > self.capacity() {
            self.reserve(count);
        }
        while self.len > count {
            self.pop_back();
        }
        while self.len < count {
            self.push(f());
        }
    }

    //--------------------------------------------------------------
    // Copy & move

    /// Swaps the contents, capacity and allocator with `other`.
    ///
    /// Never allocates or touches any element.
    #[inline]
    pub fn swap_with(&mut self, other: &mut Self) {
        mem::swap(&mut self.arr, &mut other.arr);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Moves the contents out of the dynamic array, leaving it empty (with a capacity of 0 and a default allocator).
    #[must_use]
    pub fn take(&mut self) -> Self where
        A: Default
    {
        let mut taken = Self::new_in(A::default());
        self.swap_with(&mut taken);
        taken
    }

    /// Replaces the contents of the dynamic array with those of `other`, the old contents are destroyed.
    ///
    /// Combined with `clone`, this is the copy-and-swap idiom:
    /// if cloning fails, the dynamic array is left untouched.
    ///
    /// ```
    /// use lynx_common::dynarr;
    ///
    /// let src = dynarr![1, 2, 3];
    /// let mut dst = dynarr![4];
    /// dst.assign(src.clone());
    /// assert_eq!(dst, src);
    /// ```
    pub fn assign(&mut self, mut other: Self) {
        self.swap_with(&mut other);
    }
}

impl<T: Clone, A: Allocator, R: ReserveStrategy> DynArr<T, A, R> {
    /// Resizes the dynamic array in-place so that `len` is equal to `count`.
    ///
    /// When growing, the new slots are filled with clones of `fill`.
    /// If more capacity is needed, exactly `count` elements are reserved.
    ///
    /// # Examples
    ///
    /// ```
    /// use lynx_common::dynarr;
    ///
    /// let mut arr = dynarr!["hello"];
    /// arr.resize(3, "world");
    /// assert_eq!(arr, ["hello", "world", "world"]);
    ///
    /// let mut arr = dynarr![1, 2, 3, 4];
    /// arr.resize(2, 0);
    /// assert_eq!(arr, [1, 2]);
    /// ```
    pub fn resize(&mut self, count: usize, fill: T) {
        self.resize_with(count, || fill.clone())
    }
}

/// Swaps the contents of 2 dynamic arrays, see [`DynArr::swap_with`].
#[inline]
pub fn swap<T, A: Allocator, R: ReserveStrategy>(lhs: &mut DynArr<T, A, R>, rhs: &mut DynArr<T, A, R>) {
    lhs.swap_with(rhs)
}

#[cold]
#[track_caller]
fn empty_access(op: &str) -> ! {
    panic!("`{op}` called on an empty dynamic array");
}

#[inline]
#[track_caller]
fn check_insert_index(index: usize, len: usize) {
    #[cold]
    #[track_caller]
    fn assert_failed(index: usize, len: usize) -> ! {
        panic!("insertion index (is {index}) should be <= len (is {len})");
    }

    if index > len {
        assert_failed(index, len);
    }
}

//--------------------------------------------------------------

impl<T, A: Allocator, R: ReserveStrategy> ops::Deref for DynArr<T, A, R> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len) }
    }
}

impl<T, A: Allocator, R: ReserveStrategy> ops::DerefMut for DynArr<T, A, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), self.len) }
    }
}

impl<T: Clone, A: Allocator + Clone, R: ReserveStrategy> Clone for DynArr<T, A, R> {
    /// Copies all elements into a new buffer with the same capacity, using the allocator chosen by [`Allocator::select_on_copy`].
    fn clone(&self) -> Self {
        let alloc = self.allocator().select_on_copy();
        let mut arr = RawArray::with_capacity_in(self.capacity(), alloc);
        unsafe {
            let dst = arr.ptr();
            uninit_clone(arr.allocator_mut(), self.as_slice(), dst);
        }
        Self { arr, len: self.len }
    }

    /// Overwrites the contents of `self` with a clone of the contents of `source`.
    ///
    /// The copy is made before anything in `self` is touched, so if it fails `self` is left untouched.
    fn clone_from(&mut self, source: &Self) {
        self.assign(source.clone());
    }
}

impl<T: Hash, A: Allocator, R: ReserveStrategy> Hash for DynArr<T, A, R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&**self, state)
    }
}

impl<T, I: SliceIndex<[T]>, A: Allocator, R: ReserveStrategy> Index<I> for DynArr<T, A, R> {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I: SliceIndex<[T]>, A: Allocator, R: ReserveStrategy> IndexMut<I> for DynArr<T, A, R> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

/// Collects an iterator into a DynArr, commonly called via [`Iterator::collect()`].
///
/// When the iterator reports an exact size, the memory for all elements is reserved up front.
impl<T, A: Allocator + Default, R: ReserveStrategy> FromIterator<T> for DynArr<T, A, R> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arr = Self::new_in(A::default());
        arr.extend(iter);
        arr
    }
}

impl<T, A: Allocator, R: ReserveStrategy> IntoIterator for DynArr<T, A, R> {
    type Item = T;
    type IntoIter = IntoIter<T, A, R>;

    /// Creates a consuming iterator, that is, one that moves each value out of the dynamic array (from start to end).
    /// The dynamic array cannot be used after calling this.
    fn into_iter(self) -> Self::IntoIter {
        let me = ManuallyDrop::new(self);
        let arr = unsafe { ptr::read(&me.arr) };
        IntoIter { arr, start: 0, end: me.len }
    }
}

impl<'a, T, A: Allocator, R: ReserveStrategy> IntoIterator for &'a DynArr<T, A, R> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator, R: ReserveStrategy> IntoIterator for &'a mut DynArr<T, A, R> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Extend<T> for DynArr<T, A, R> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        if let (lower, Some(upper)) = iter.size_hint() {
            if lower == upper {
                self.reserve_amortized(lower);
            }
        }
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, T: Copy + 'a, A: Allocator, R: ReserveStrategy> Extend<&'a T> for DynArr<T, A, R> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied())
    }
}

impl_slice_partial_eq_generic!([A0: Allocator, A1: Allocator, R0: ReserveStrategy, R1: ReserveStrategy] DynArr<T, A0, R0>, DynArr<U, A1, R1>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] DynArr<T, A, R>, &[U]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] DynArr<T, A, R>, &mut [U]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] &[T], DynArr<U, A, R>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] &mut [T], DynArr<U, A, R>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] DynArr<T, A, R>, [U]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy] [T], DynArr<U, A, R>);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy, const N: usize] DynArr<T, A, R>, [U; N]);
impl_slice_partial_eq_generic!([A: Allocator, R: ReserveStrategy, const N: usize] [T; N], DynArr<U, A, R>);

impl<T, A0, A1, R0, R1> PartialOrd<DynArr<T, A1, R1>> for DynArr<T, A0, R0> where
    T:  PartialOrd,
    A0: Allocator,
    A1: Allocator,
    R0: ReserveStrategy,
    R1: ReserveStrategy,
{
    #[inline]
    fn partial_cmp(&self, other: &DynArr<T, A1, R1>) -> Option<Ordering> {
        PartialOrd::partial_cmp(&**self, &**other)
    }
}

impl<T: Eq, A: Allocator, R: ReserveStrategy> Eq for DynArr<T, A, R> {}

impl<T: Ord, A: Allocator, R: ReserveStrategy> Ord for DynArr<T, A, R> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(&**self, &**other)
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Drop for DynArr<T, A, R> {
    fn drop(&mut self) {
        // `RawArray` handles the deallocation
        self.clear();
    }
}

impl<T, A: Allocator + Default, R: ReserveStrategy> Default for DynArr<T, A, R> {
    /// Creates an empty `DynArr<T, A, R>`.
    ///
    /// The dynamic array will not allocate until elements are pushed onto it.
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: fmt::Debug, A: Allocator, R: ReserveStrategy> fmt::Debug for DynArr<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// Writes the elements separated by a single space, without brackets.
///
/// ```
/// use lynx_common::dynarr;
///
/// assert_eq!(dynarr![1, 2, 3].to_string(), "1 2 3");
/// ```
impl<T: fmt::Display, A: Allocator, R: ReserveStrategy> fmt::Display for DynArr<T, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Separated::new(self, " "), f)
    }
}

impl<T, A: Allocator, R: ReserveStrategy> AsRef<[T]> for DynArr<T, A, R> {
    fn as_ref(&self) -> &[T] {
        self
    }
}

impl<T, A: Allocator, R: ReserveStrategy> AsMut<[T]> for DynArr<T, A, R> {
    fn as_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T, A: Allocator, R: ReserveStrategy> Borrow<[T]> for DynArr<T, A, R> {
    fn borrow(&self) -> &[T] {
        self
    }
}

impl<T, A: Allocator, R: ReserveStrategy> BorrowMut<[T]> for DynArr<T, A, R> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self
    }
}

impl<T: Clone, A: Allocator + Default, R: ReserveStrategy> From<&[T]> for DynArr<T, A, R> {
    /// Allocates a `DynArr<T, A, R>` and fills it by cloning `s`'s items.
    fn from(s: &[T]) -> Self {
        Self::from_slice_in(s, A::default())
    }
}

impl<T: Clone, A: Allocator + Default, R: ReserveStrategy, const N: usize> From<&[T; N]> for DynArr<T, A, R> {
    /// Allocates a `DynArr<T, A, R>` and fills it by cloning `s`'s items.
    fn from(s: &[T; N]) -> Self {
        Self::from_slice_in(s, A::default())
    }
}

impl<T, A: Allocator + Default, R: ReserveStrategy, const N: usize> From<[T; N]> for DynArr<T, A, R> {
    /// Allocates a `DynArr<T, A, R>` and moves `s`'s items into it.
    fn from(s: [T; N]) -> Self {
        let mut arr = Self::with_capacity_in(N, A::default());
        let s = ManuallyDrop::new(s);
        unsafe {
            uninit_relocate(s.as_ptr(), N, arr.as_mut_ptr());
            arr.len = N;
        }
        arr
    }
}

static_assertions::assert_impl_all!(DynArr<u32>: Send, Sync, Clone, Default);
static_assertions::assert_not_impl_any!(DynArr<std::rc::Rc<u32>>: Send, Sync);
static_assertions::const_assert_eq!(mem::size_of::<DynArr<u32>>(), 3 * mem::size_of::<usize>());

//--------------------------------------------------------------

/// Creates a [`DynArr`] containing the arguments.
///
/// `dynarr!` allows `DynArr`s to be defined with the same syntax as array expressions.
/// There are two forms of this macro:
///
/// - Create a [`DynArr`] containing a given list of elements, with a capacity of exactly the number of elements:
///
/// ```
/// use lynx_common::dynarr;
///
/// let arr = dynarr![1, 2, 3];
/// assert_eq!(arr[0], 1);
/// assert_eq!(arr.capacity(), 3);
/// ```
///
/// - Create a [`DynArr`] from a given element and size:
///
/// ```
/// use lynx_common::dynarr;
///
/// let arr = dynarr![1; 3];
/// assert_eq!(arr, [1, 1, 1]);
/// ```
///
/// The second form clones `elem`, so `elem` needs to implement [`Clone`].
#[macro_export]
macro_rules! dynarr {
    () => {
        $crate::collections::DynArr::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::collections::DynArr::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {{
        let mut arr = $crate::collections::DynArr::with_capacity($crate::count_exprs!($($x),+));
        $(arr.push($x);)+
        arr
    }};
}
