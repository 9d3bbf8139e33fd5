//! Typed, offset-addressable views over raw memory.
//!
//! [`RawCell<T>`] is the one primitive the runtime uses to touch object
//! memory: instance headers, ivar storage and the class-object view of a
//! class record are all expressed as cells over computed addresses.
//!
//! A cell is just an address plus a type tag. It does not own the memory,
//! does not know how large the region behind it is and never checks that the
//! address is still live. Every read and write is therefore `unsafe`, and the
//! caller is responsible for:
//!
//! - the address (plus offset) pointing into a live allocation,
//! - never reading a type wider than what was written there,
//! - the bytes read forming a valid value of the requested type.
//!
//! Reads and writes are unaligned, because instance layouts are packed with
//! no padding between ivars.
//!
//! # Example
//!
//! ```
//! use objkit_mem::cell::RawCell;
//!
//! let mut storage = [0u8; 16];
//! let cell: RawCell<u64> = RawCell::from_slice(&mut storage);
//!
//! unsafe {
//!     cell.write(0xDEAD_u32, 4);
//!     assert_eq!(cell.read::<u32>(4), 0xDEAD);
//!     assert_eq!((cell + 1).addr() - cell.addr(), 8);
//! }
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::ptr::NonNull;

/// An address interpreted as pointing at a `T`.
///
/// Arithmetic through [`advance`](Self::advance), [`retreat`](Self::retreat)
/// and the `+`/`-` operators moves by whole elements of `T`; the `byte_*`
/// methods move by bytes.
#[repr(transparent)]
pub struct RawCell<T> {
    raw: NonNull<u8>,
    _marker: PhantomData<*mut T>,
}

impl<T> RawCell<T> {
    /// Wraps an address.
    #[must_use]
    pub const fn new(raw: NonNull<u8>) -> Self {
        RawCell {
            raw,
            _marker: PhantomData,
        }
    }

    /// Wraps a typed pointer, returning `None` for null.
    #[must_use]
    pub fn from_ptr(ptr: *mut T) -> Option<Self> {
        NonNull::new(ptr.cast::<u8>()).map(Self::new)
    }

    /// Points a cell at an existing value.
    #[must_use]
    pub fn from_mut(value: &mut T) -> Self {
        Self::new(NonNull::from(value).cast())
    }

    /// Points a cell at the start of a byte buffer.
    #[must_use]
    pub fn from_slice(bytes: &mut [u8]) -> Self {
        Self::new(NonNull::from(bytes).cast())
    }

    /// Returns the address as a byte pointer.
    #[must_use]
    pub const fn as_ptr(self) -> *mut u8 {
        self.raw.as_ptr()
    }

    /// Returns the address as a non-null byte pointer.
    #[must_use]
    pub const fn as_non_null(self) -> NonNull<u8> {
        self.raw
    }

    /// Returns the numeric address.
    #[must_use]
    pub fn addr(self) -> usize {
        self.raw.as_ptr().addr()
    }

    /// Reinterprets the cell as pointing at a `U`.
    #[must_use]
    pub const fn cast<U>(self) -> RawCell<U> {
        RawCell::new(self.raw)
    }

    /// Reads a `U` located `byte_offset` bytes past this address.
    ///
    /// The bytes are copied out bitwise; for types that own resources this
    /// produces a second owner, so prefer [`read_cloned`](Self::read_cloned)
    /// for those.
    ///
    /// # Safety
    ///
    /// `self + byte_offset .. + size_of::<U>()` must be inside a live
    /// allocation and hold a valid `U`.
    #[must_use]
    pub unsafe fn read<U>(self, byte_offset: usize) -> U {
        unsafe {
            self.raw
                .as_ptr()
                .add(byte_offset)
                .cast::<U>()
                .read_unaligned()
        }
    }

    /// Reads a `U` at `byte_offset` and returns a clone, leaving the stored
    /// value untouched.
    ///
    /// # Safety
    ///
    /// Same requirements as [`read`](Self::read).
    #[must_use]
    pub unsafe fn read_cloned<U: Clone>(self, byte_offset: usize) -> U {
        // The bitwise copy is never dropped, so ownership stays with the
        // stored value.
        let stored = ManuallyDrop::new(unsafe { self.read::<U>(byte_offset) });
        U::clone(&stored)
    }

    /// Writes `value` `byte_offset` bytes past this address.
    ///
    /// Whatever was stored there before is overwritten without being dropped.
    ///
    /// # Safety
    ///
    /// `self + byte_offset .. + size_of::<U>()` must be inside a live,
    /// writable allocation.
    pub unsafe fn write<U>(self, value: U, byte_offset: usize) {
        unsafe {
            self.raw
                .as_ptr()
                .add(byte_offset)
                .cast::<U>()
                .write_unaligned(value);
        }
    }

    /// Reads the `T` this cell points at.
    ///
    /// # Safety
    ///
    /// The cell must point at a valid `T` inside a live allocation.
    #[must_use]
    pub unsafe fn get(self) -> T
    where
        T: Copy,
    {
        unsafe { self.read::<T>(0) }
    }

    /// Overwrites the `T` this cell points at.
    ///
    /// # Safety
    ///
    /// The cell must point at `size_of::<T>()` writable bytes.
    pub unsafe fn set(self, value: T) {
        unsafe { self.write::<T>(value, 0) }
    }

    /// Moves forward by `count` elements of `T`.
    #[must_use]
    pub fn advance(self, count: isize) -> Self {
        self.byte_offset(count.wrapping_mul(mem::size_of::<T>() as isize))
    }

    /// Moves backward by `count` elements of `T`.
    #[must_use]
    pub fn retreat(self, count: isize) -> Self {
        self.advance(count.wrapping_neg())
    }

    /// Moves by a signed number of bytes.
    #[must_use]
    pub fn byte_offset(self, bytes: isize) -> Self {
        let moved = self.raw.as_ptr().wrapping_offset(bytes);
        // A handle is never shifted onto address zero by the runtime's own
        // arithmetic; fall back to the original address if a caller does.
        Self::new(NonNull::new(moved).unwrap_or(self.raw))
    }

    /// Moves forward by `bytes` bytes.
    #[must_use]
    pub fn byte_add(self, bytes: usize) -> Self {
        self.byte_offset(bytes as isize)
    }

    /// Moves backward by `bytes` bytes.
    #[must_use]
    pub fn byte_sub(self, bytes: usize) -> Self {
        self.byte_offset((bytes as isize).wrapping_neg())
    }

    /// Signed byte distance from `self` to `other`.
    #[must_use]
    pub fn distance(self, other: RawCell<T>) -> isize {
        other.addr().wrapping_sub(self.addr()) as isize
    }
}

impl<T> Clone for RawCell<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RawCell<T> {}

impl<T> PartialEq for RawCell<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for RawCell<T> {}

impl<T> Hash for RawCell<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for RawCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawCell<{}>({:p})", std::any::type_name::<T>(), self.raw)
    }
}

impl<T> fmt::Pointer for RawCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.raw, f)
    }
}

impl<T> Add<isize> for RawCell<T> {
    type Output = Self;

    fn add(self, count: isize) -> Self {
        self.advance(count)
    }
}

impl<T> Sub<isize> for RawCell<T> {
    type Output = Self;

    fn sub(self, count: isize) -> Self {
        self.retreat(count)
    }
}

impl<T> AddAssign<isize> for RawCell<T> {
    fn add_assign(&mut self, count: isize) {
        *self = self.advance(count);
    }
}

impl<T> SubAssign<isize> for RawCell<T> {
    fn sub_assign(&mut self, count: isize) {
        *self = self.retreat(count);
    }
}
