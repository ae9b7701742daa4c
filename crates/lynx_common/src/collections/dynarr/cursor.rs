use core::{
    cmp::Ordering,
    fmt,
    marker::PhantomData,
    ops::{Add, AddAssign, Deref, DerefMut, Sub, SubAssign},
    ptr::NonNull,
    slice,
};

mod sealed {
    pub trait Sealed {}
}

/// Marker deciding whether a [`RawCursor`] gives shared or unique access to the elements it points to
pub trait Constness: sealed::Sealed {
    /// Borrow of the array held by the cursor
    type Borrow<'a, T: 'a>;
}

/// Marker for cursors giving shared access
#[derive(Clone, Copy, Debug)]
pub enum Const {}

/// Marker for cursors giving unique access
#[derive(Clone, Copy, Debug)]
pub enum Mutable {}

impl sealed::Sealed for Const {}
impl sealed::Sealed for Mutable {}

impl Constness for Const {
    type Borrow<'a, T: 'a> = &'a T;
}

impl Constness for Mutable {
    type Borrow<'a, T: 'a> = &'a mut T;
}

/// Position in a contiguous array, which can be at any element or one past the last element.
///
/// A cursor borrows the array it points into, so the array can't be modified (and the cursor can't be invalidated) while the cursor is alive.
///
/// Moving a cursor outside of `[0, len]` panics, as does dereferencing a cursor that points past the last element.
///
/// Cursors are only ordered relative to cursors into the same array, cursors into different arrays compare as unordered.
pub struct RawCursor<'a, T: 'a, M: Constness> {
    base:     NonNull<T>,
    len:      usize,
    pos:      usize,
    _phantom: PhantomData<M::Borrow<'a, T>>,
}

/// Cursor giving shared access to the elements of an array
pub type Cursor<'a, T> = RawCursor<'a, T, Const>;
/// Cursor giving unique access to the elements of an array
pub type CursorMut<'a, T> = RawCursor<'a, T, Mutable>;

unsafe impl<'a, T, M: Constness> Send for RawCursor<'a, T, M> where
    M::Borrow<'a, T>: Send
{}
unsafe impl<'a, T, M: Constness> Sync for RawCursor<'a, T, M> where
    M::Borrow<'a, T>: Sync
{}

impl<'a, T> Cursor<'a, T> {
    /// Create a cursor at `pos` in `elements`
    ///
    /// # Panics
    ///
    /// Panics if `pos > elements.len()`
    #[track_caller]
    pub fn new(elements: &'a [T], pos: usize) -> Self {
        assert!(pos <= elements.len(), "cursor position (is {pos}) should be <= len (is {})", elements.len());
        Self { base: NonNull::from(elements).cast(), len: elements.len(), pos, _phantom: PhantomData }
    }

    /// Get the element at the cursor, borrowed for as long as the array is borrowed
    pub fn into_ref(self) -> Option<&'a T> {
        if self.pos < self.len {
            Some(unsafe { &*self.base.as_ptr().add(self.pos) })
        } else {
            None
        }
    }

    /// Move the cursor forward, and return the cursor as it was before moving
    pub fn post_inc(&mut self) -> Self {
        let old = *self;
        self.inc();
        old
    }

    /// Move the cursor backward, and return the cursor as it was before moving
    pub fn post_dec(&mut self) -> Self {
        let old = *self;
        self.dec();
        old
    }

    /// Get the elements in the range `[self, last)`
    ///
    /// # Panics
    ///
    /// Panics if the cursors point into different arrays, or if `last` comes before `self`.
    #[track_caller]
    pub fn slice_to(self, last: Self) -> &'a [T] {
        assert!(self.base == last.base && self.len == last.len, "cursors point into different arrays");
        assert!(self.pos <= last.pos, "cursor range is reversed ({} > {})", self.pos, last.pos);
        unsafe { slice::from_raw_parts(self.base.as_ptr().add(self.pos), last.pos - self.pos) }
    }
}

impl<'a, T> CursorMut<'a, T> {
    /// Create a cursor at `pos` in `elements`
    ///
    /// # Panics
    ///
    /// Panics if `pos > elements.len()`
    #[track_caller]
    pub fn new(elements: &'a mut [T], pos: usize) -> Self {
        assert!(pos <= elements.len(), "cursor position (is {pos}) should be <= len (is {})", elements.len());
        let len = elements.len();
        Self { base: NonNull::from(elements).cast(), len, pos, _phantom: PhantomData }
    }

    /// Get the element at the cursor
    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.pos < self.len {
            Some(unsafe { &mut *self.base.as_ptr().add(self.pos) })
        } else {
            None
        }
    }

    /// Get the element at the cursor, borrowed for as long as the array is borrowed
    pub fn into_mut(self) -> Option<&'a mut T> {
        if self.pos < self.len {
            Some(unsafe { &mut *self.base.as_ptr().add(self.pos) })
        } else {
            None
        }
    }

    /// Get a shared cursor at the same position, which borrows this cursor
    pub fn as_const(&self) -> Cursor<'_, T> {
        RawCursor { base: self.base, len: self.len, pos: self.pos, _phantom: PhantomData }
    }
}

impl<'a, T, M: Constness> RawCursor<'a, T, M> {
    /// Get the index of the element the cursor points to
    pub fn index(&self) -> usize {
        self.pos
    }

    /// Check if the cursor points past the last element
    pub fn is_end(&self) -> bool {
        self.pos == self.len
    }

    /// Get the element at the cursor, or `None` when the cursor points past the last element
    pub fn get(&self) -> Option<&T> {
        if self.pos < self.len {
            Some(unsafe { &*self.base.as_ptr().add(self.pos) })
        } else {
            None
        }
    }

    /// Move the cursor to the next element
    #[track_caller]
    pub fn inc(&mut self) -> &mut Self {
        self.advance(1)
    }

    /// Move the cursor to the previous element
    #[track_caller]
    pub fn dec(&mut self) -> &mut Self {
        self.advance(-1)
    }

    /// Move the cursor by `offset` elements
    ///
    /// # Panics
    ///
    /// Panics if the cursor would end up outside of `[0, len]`
    #[track_caller]
    pub fn advance(&mut self, offset: isize) -> &mut Self {
        self.pos = match self.pos.checked_add_signed(offset) {
            Some(pos) if pos <= self.len => pos,
            _ => out_of_bounds(self.pos, offset, self.len),
        };
        self
    }
}

#[cold]
#[track_caller]
fn out_of_bounds(pos: usize, offset: isize, len: usize) -> ! {
    panic!("moving cursor at {pos} by {offset} leaves the array (len is {len})");
}

#[cold]
#[track_caller]
fn past_the_end() -> ! {
    panic!("dereferenced a cursor that points past the last element");
}

impl<'a, T> Clone for Cursor<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Cursor<'a, T> {}

impl<'a, T> From<CursorMut<'a, T>> for Cursor<'a, T> {
    fn from(cursor: CursorMut<'a, T>) -> Self {
        RawCursor { base: cursor.base, len: cursor.len, pos: cursor.pos, _phantom: PhantomData }
    }
}

impl<'a, T, M: Constness> Deref for RawCursor<'a, T, M> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match self.get() {
            Some(elem) => elem,
            None => past_the_end(),
        }
    }
}

impl<'a, T> DerefMut for CursorMut<'a, T> {
    #[track_caller]
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Some(elem) => elem,
            None => past_the_end(),
        }
    }
}

impl<'a, T, M: Constness> Add<isize> for RawCursor<'a, T, M> {
    type Output = Self;

    #[track_caller]
    fn add(mut self, rhs: isize) -> Self {
        self.advance(rhs);
        self
    }
}

impl<'a, T, M: Constness> Sub<isize> for RawCursor<'a, T, M> {
    type Output = Self;

    #[track_caller]
    fn sub(mut self, rhs: isize) -> Self {
        self -= rhs;
        self
    }
}

impl<'a, T, M: Constness> AddAssign<isize> for RawCursor<'a, T, M> {
    #[track_caller]
    fn add_assign(&mut self, rhs: isize) {
        self.advance(rhs);
    }
}

impl<'a, T, M: Constness> SubAssign<isize> for RawCursor<'a, T, M> {
    #[track_caller]
    fn sub_assign(&mut self, rhs: isize) {
        match rhs.checked_neg() {
            Some(offset) => self.advance(offset),
            None => out_of_bounds(self.pos, rhs, self.len),
        };
    }
}

/// Signed distance between 2 cursors
impl<'a, 'b, T, M: Constness, M2: Constness> Sub<&RawCursor<'b, T, M2>> for &RawCursor<'a, T, M> {
    type Output = isize;

    fn sub(self, rhs: &RawCursor<'b, T, M2>) -> isize {
        debug_assert!(self.base == rhs.base, "cursors point into different arrays");
        self.pos as isize - rhs.pos as isize
    }
}

impl<'a, T> Sub for Cursor<'a, T> {
    type Output = isize;

    fn sub(self, rhs: Self) -> isize {
        &self - &rhs
    }
}

impl<'a, 'b, T, M: Constness, M2: Constness> PartialEq<RawCursor<'b, T, M2>> for RawCursor<'a, T, M> {
    fn eq(&self, other: &RawCursor<'b, T, M2>) -> bool {
        self.base == other.base && self.pos == other.pos
    }
}

impl<'a, T, M: Constness> Eq for RawCursor<'a, T, M> {}

impl<'a, 'b, T, M: Constness, M2: Constness> PartialOrd<RawCursor<'b, T, M2>> for RawCursor<'a, T, M> {
    fn partial_cmp(&self, other: &RawCursor<'b, T, M2>) -> Option<Ordering> {
        if self.base == other.base {
            Some(self.pos.cmp(&other.pos))
        } else {
            None
        }
    }
}

impl<'a, T, M: Constness> fmt::Debug for RawCursor<'a, T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.pos)
            .field("len", &self.len)
        .finish()
    }
}

static_assertions::assert_impl_all!(Cursor<'static, u32>: Copy, Send, Sync);
static_assertions::assert_impl_all!(CursorMut<'static, u32>: Send, Sync);
static_assertions::assert_not_impl_any!(CursorMut<'static, u32>: Clone);
static_assertions::assert_not_impl_any!(Cursor<'static, core::cell::Cell<u32>>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_forward_and_back() {
        let values = [1, 2, 3, 4];
        let begin = Cursor::new(&values, 0);
        let end = Cursor::new(&values, values.len());

        let mut seen = Vec::new();
        let mut cur = begin;
        while cur != end {
            seen.push(*cur.post_inc());
        }
        assert_eq!(seen, [1, 2, 3, 4]);

        let mut seen = Vec::new();
        while cur != begin {
            cur.dec();
            seen.push(*cur);
        }
        assert_eq!(seen, [4, 3, 2, 1]);
    }

    #[test]
    fn post_increment_returns_old_position() {
        let values = [5, 6];
        let mut cur = Cursor::new(&values, 0);
        let old = cur.post_inc();
        assert_eq!(old.index(), 0);
        assert_eq!(cur.index(), 1);

        let old = cur.post_dec();
        assert_eq!(old.index(), 1);
        assert_eq!(cur.index(), 0);
    }

    #[test]
    fn arithmetic() {
        let values = [10, 20, 30, 40, 50];
        let begin = Cursor::new(&values, 0);
        let end = Cursor::new(&values, 5);

        assert_eq!(end - begin, 5);
        assert_eq!(begin - end, -5);
        assert_eq!(*(begin + 3), 40);
        assert_eq!(*(end - 1), 50);

        let mut cur = begin;
        cur += 2;
        assert_eq!(*cur, 30);
        cur -= 1;
        assert_eq!(*cur, 20);
        assert!(begin < cur && cur < end);
        assert_eq!(cur.get(), Some(&20));
        assert_eq!(end.get(), None);
        assert!(end.is_end());
    }

    #[test]
    fn mutable_cursor() {
        let mut values = [1, 2, 3];
        {
            let mut cur = CursorMut::new(&mut values, 0);
            *cur = 10;
            cur.inc();
            *cur += 10;
            assert_eq!(cur.as_const().index(), 1);

            let shared: Cursor<'_, i32> = cur.into();
            assert_eq!(*shared, 12);
        }
        assert_eq!(values, [10, 12, 3]);
    }

    #[test]
    fn compare_across_constness() {
        let mut values = [1, 2, 3];
        let mut cur = CursorMut::new(&mut values, 1);
        let base = cur.base;
        let shared = RawCursor::<'_, i32, Const> { base, len: 3, pos: 1, _phantom: PhantomData };

        assert!(cur == shared);
        assert_eq!(&cur - &shared, 0);
        cur.inc();
        assert!(cur > shared);
    }

    #[test]
    fn mutable_cursor_spans_whole_slice() {
        let mut values = [1, 2, 3];
        let mut cur = CursorMut::new(&mut values, 3);
        assert!(cur.is_end());
        assert!(cur.get_mut().is_none());

        cur -= 3;
        assert_eq!(cur.index(), 0);
        assert_eq!(cur.into_mut(), Some(&mut 1));
    }

    #[test]
    fn cursors_into_different_arrays_are_unordered() {
        let first = [1, 2];
        let second = [1, 2];
        let a = Cursor::new(&first, 0);
        let b = Cursor::new(&second, 1);
        assert_eq!(a.partial_cmp(&b), None);
        assert!(a != b);
        assert!(!(a < b) && !(a > b));
        assert_eq!(a.partial_cmp(&(a + 1)), Some(Ordering::Less));
    }

    #[test]
    fn slice_between_cursors() {
        let values = [1, 2, 3, 4, 5];
        let first = Cursor::new(&values, 1);
        let last = Cursor::new(&values, 4);
        assert_eq!(first.slice_to(last), &[2, 3, 4]);
        assert_eq!(last.slice_to(last), &[] as &[i32]);
    }

    #[test]
    #[should_panic]
    fn deref_end_panics() {
        let values = [1, 2, 3];
        let end = Cursor::new(&values, 3);
        let _ = *end;
    }

    #[test]
    #[should_panic]
    fn move_past_end_panics() {
        let values = [1, 2, 3];
        let mut end = Cursor::new(&values, 3);
        end.inc();
    }

    #[test]
    #[should_panic]
    fn move_before_begin_panics() {
        let values = [1, 2, 3];
        let begin = Cursor::new(&values, 0);
        let _ = begin - 1;
    }
}
