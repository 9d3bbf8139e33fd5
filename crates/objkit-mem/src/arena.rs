//! Bump arena for runtime metadata that lives for the whole process.
//!
//! Class records are allocated here once and never freed, which is what lets
//! the runtime hand out plain pointers to them (and to the class-object view
//! inside them) without any lifetime bookkeeping.
//!
//! # Architecture
//!
//! - [`MetadataArena`]: a list of chunks with a bump cursor, guarded by a
//!   mutex so the process-wide instance can live in a `static`
//! - [`metadata_arena`]: the process-wide instance
//!
//! Values placed in the arena are never dropped. Anything they own on the
//! heap (vectors, maps, closures) is leaked together with them, which is the
//! intended lifetime for class metadata.
//!
//! # Example
//!
//! ```
//! use objkit_mem::arena::MetadataArena;
//!
//! let arena = MetadataArena::new(16 * 1024);
//! let value = arena.alloc(42u64);
//!
//! unsafe {
//!     assert_eq!(*value.as_ptr(), 42);
//! }
//! assert_eq!(arena.stats().chunk_count, 1);
//! ```

use std::alloc::{self, Layout};
use std::fmt;
use std::ptr::NonNull;
use std::sync::{Mutex, OnceLock};

/// Error type for raw allocation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocError {
    /// The number of bytes that could not be allocated.
    pub requested: usize,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "allocation of {} bytes failed", self.requested)
    }
}

impl std::error::Error for AllocError {}

/// Alignment of every chunk and the minimum alignment of every allocation.
const DEFAULT_ALIGNMENT: usize = 16;

/// Smallest chunk the arena will ever request from the system allocator.
const MIN_CHUNK_SIZE: usize = 4096;

/// Largest chunk size reached by doubling.
const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Chunk size of the process-wide arena returned by [`metadata_arena`].
pub const METADATA_CHUNK_SIZE: usize = 64 * 1024;

/// Arena allocation statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Bytes handed out to callers (before alignment padding).
    pub total_allocated: usize,
    /// Number of chunks owned by the arena.
    pub chunk_count: usize,
    /// Sum of all chunk capacities in bytes.
    pub total_capacity: usize,
}

/// A fixed-size region with a bump cursor.
struct Chunk {
    start: NonNull<u8>,
    /// Byte offset of the next free byte.
    cursor: usize,
    capacity: usize,
}

impl Chunk {
    fn new(capacity: usize) -> Result<Self, AllocError> {
        let layout = Layout::from_size_align(capacity, DEFAULT_ALIGNMENT)
            .map_err(|_| AllocError { requested: capacity })?;

        // SAFETY: layout has a non-zero size (capacity >= MIN_CHUNK_SIZE)
        let start = unsafe { alloc::alloc(layout) };
        let start = NonNull::new(start).ok_or(AllocError { requested: capacity })?;

        Ok(Chunk {
            start,
            cursor: 0,
            capacity,
        })
    }

    fn try_alloc(&mut self, size: usize, align: usize) -> Option<NonNull<u8>> {
        let base = self.start.as_ptr().addr();
        let aligned = (base + self.cursor + align - 1) & !(align - 1);
        let offset = aligned - base;
        let end = offset.checked_add(size)?;

        if end > self.capacity {
            return None;
        }

        self.cursor = end;

        // SAFETY: offset is within the chunk (checked above) and the result
        // keeps the provenance of `start`
        Some(unsafe { NonNull::new_unchecked(self.start.as_ptr().add(offset)) })
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: the same layout was used in Chunk::new
        unsafe {
            let layout = Layout::from_size_align_unchecked(self.capacity, DEFAULT_ALIGNMENT);
            alloc::dealloc(self.start.as_ptr(), layout);
        }
    }
}

struct ArenaState {
    chunks: Vec<Chunk>,
    next_chunk_size: usize,
    total_allocated: usize,
}

// SAFETY: chunk pointers are only touched while the mutex is held, and the
// memory they describe is owned exclusively by the arena
unsafe impl Send for ArenaState {}

/// Bump allocator for long-lived runtime metadata.
///
/// Allocation never moves previously returned values, so pointers into the
/// arena stay valid for as long as the arena itself. The process-wide
/// instance is never dropped.
pub struct MetadataArena {
    state: Mutex<ArenaState>,
}

impl MetadataArena {
    /// Creates an arena whose first chunk holds `chunk_size` bytes.
    ///
    /// The size is clamped to at least 4 KiB and rounded up to a power of two.
    ///
    /// # Panics
    ///
    /// Panics if the first chunk cannot be allocated.
    #[must_use]
    pub fn new(chunk_size: usize) -> Self {
        let size = chunk_size.max(MIN_CHUNK_SIZE).next_power_of_two();
        let first = match Chunk::new(size) {
            Ok(chunk) => chunk,
            Err(err) => panic!("metadata arena: {err}"),
        };

        MetadataArena {
            state: Mutex::new(ArenaState {
                chunks: vec![first],
                next_chunk_size: (size * 2).min(MAX_CHUNK_SIZE),
                total_allocated: 0,
            }),
        }
    }

    /// Moves `value` into the arena and returns a pointer to it.
    ///
    /// The value is never dropped.
    ///
    /// # Panics
    ///
    /// Panics if a new chunk is needed and the system allocator fails, or if
    /// the internal lock is poisoned.
    pub fn alloc<T>(&self, value: T) -> NonNull<T> {
        let size = std::mem::size_of::<T>().max(1);
        let align = std::mem::align_of::<T>().max(DEFAULT_ALIGNMENT);

        let mut state = self.state.lock().unwrap();
        let slot = match Self::bump(&mut state, size, align) {
            Ok(slot) => slot,
            Err(err) => panic!("metadata arena: {err}"),
        };
        state.total_allocated += size;
        drop(state);

        let ptr = slot.cast::<T>();
        // SAFETY: slot is a fresh, suitably aligned region of at least
        // size_of::<T>() bytes owned by the arena
        unsafe { ptr.as_ptr().write(value) };
        ptr
    }

    fn bump(state: &mut ArenaState, size: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
        if let Some(ptr) = state.chunks.last_mut().and_then(|c| c.try_alloc(size, align)) {
            return Ok(ptr);
        }

        let capacity = state.next_chunk_size.max((size + align).next_power_of_two());
        state.next_chunk_size = (state.next_chunk_size * 2).min(MAX_CHUNK_SIZE);
        state.chunks.push(Chunk::new(capacity)?);

        state
            .chunks
            .last_mut()
            .and_then(|c| c.try_alloc(size, align))
            .ok_or(AllocError { requested: size })
    }

    /// Returns allocation statistics for this arena.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        let state = self.state.lock().unwrap();
        ArenaStats {
            total_allocated: state.total_allocated,
            chunk_count: state.chunks.len(),
            total_capacity: state.chunks.iter().map(|c| c.capacity).sum(),
        }
    }
}

/// Returns the process-wide metadata arena.
///
/// Initialized on first use with [`METADATA_CHUNK_SIZE`] chunks and never
/// dropped.
#[must_use]
pub fn metadata_arena() -> &'static MetadataArena {
    static ARENA: OnceLock<MetadataArena> = OnceLock::new();
    ARENA.get_or_init(|| MetadataArena::new(METADATA_CHUNK_SIZE))
}
