//! Zeroed, word-aligned memory blocks backing object instances.
//!
//! Unlike class metadata, instances have individual lifetimes: the runtime
//! allocates one block per instance and frees it when the instance's retain
//! count drops to zero. The block size is the class's instance size, so the
//! caller must pass the same size back to [`free`].

use crate::arena::AllocError;
use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// Alignment of every instance block (one machine word).
pub const BLOCK_ALIGNMENT: usize = std::mem::align_of::<usize>();

fn layout_for(size: usize) -> Result<Layout, AllocError> {
    if size == 0 {
        return Err(AllocError { requested: size });
    }
    Layout::from_size_align(size, BLOCK_ALIGNMENT).map_err(|_| AllocError { requested: size })
}

/// Allocates `size` zeroed bytes.
///
/// # Errors
///
/// Returns [`AllocError`] if `size` is zero or the system allocator fails.
///
/// # Example
///
/// ```
/// use objkit_mem::block;
///
/// let ptr = block::alloc_zeroed(24).unwrap();
/// unsafe {
///     assert_eq!(*ptr.as_ptr().add(23), 0);
///     block::free(ptr, 24);
/// }
/// ```
pub fn alloc_zeroed(size: usize) -> Result<NonNull<u8>, AllocError> {
    let layout = layout_for(size)?;

    // SAFETY: layout has a non-zero size
    let ptr = unsafe { alloc::alloc_zeroed(layout) };
    NonNull::new(ptr).ok_or(AllocError { requested: size })
}

/// Releases a block obtained from [`alloc_zeroed`].
///
/// # Safety
///
/// `ptr` must come from [`alloc_zeroed`] with exactly this `size`, and must
/// not be used or freed again afterwards.
pub unsafe fn free(ptr: NonNull<u8>, size: usize) {
    // SAFETY: the caller passes the size used at allocation, which produced
    // a valid layout there
    unsafe {
        let layout = Layout::from_size_align_unchecked(size, BLOCK_ALIGNMENT);
        alloc::dealloc(ptr.as_ptr(), layout);
    }
}
