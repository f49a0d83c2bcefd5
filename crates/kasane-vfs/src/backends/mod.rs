//! VFS backends.
//!
//! Backends implement [`Filesystem`](crate::Filesystem) over a concrete store.

mod memory;

pub use memory::MemoryBackend;
