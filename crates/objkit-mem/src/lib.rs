//! Memory infrastructure for the `objkit` runtime.
//!
//! - [`cell`]: typed, offset-addressable views over raw addresses
//! - [`block`]: zeroed instance storage with explicit free
//! - [`arena`]: process-lifetime arena for class metadata

pub mod arena;
pub mod block;
pub mod cell;

pub use arena::{AllocError, ArenaStats, MetadataArena, metadata_arena};
pub use cell::RawCell;
