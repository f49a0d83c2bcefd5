//! Virtual filesystem composition.
//!
//! One synchronous contract, [`Filesystem`], implemented by backends and by
//! compositions that are themselves filesystems:
//!
//! - [`MountTable`] - Routes paths to the filesystem mounted at the longest
//!   matching prefix, with an optional fallback
//! - [`Overlay`] - Read-through stack of members with one write target
//! - [`SubView`] - A directory of another filesystem presented as `/`
//! - [`Synchronized`] - Serializes calls to a backend that is not thread-safe
//! - [`ReadOnly`] - Refuses every mutation
//! - [`MemoryBackend`] - In-memory filesystem (for scratch space, testing)
//!
//! Mount tables can also be described in RON and built with
//! [`config::MountConfig`].
//!
//! ## Design Decisions
//!
//! - **Paths are strings**: `/`-separated, normalized on entry. `..` may not
//!   climb above a root; doing so fails with `PathInvalid`.
//! - **Small primitive set**: backends implement nine primitives; copying,
//!   moving, walking, sizing and whole-file I/O are derived from them and
//!   only overridden for speed.
//! - **Compositions nest**: a mount table can mount an overlay of sub-views,
//!   and errors always carry paths in the caller's coordinates.
//! - **Longest-prefix routing**: the most specific mount point wins.
//!   Ancestors of mount points that nothing backs are virtual directories.

pub mod backends;
pub mod config;
pub mod derived;
pub mod path;

mod error;
mod file;
mod mount;
mod ops;
mod overlay;
mod readonly;
mod subview;
mod sync;
mod types;
mod walk;

pub use backends::MemoryBackend;
pub use error::{Cause, ErrorKind, IoResultExt, VfsError, VfsResult, VfsResultExt};
pub use file::{NullFile, VfsFile};
pub use mount::{MountInfo, MountTable};
pub use ops::Filesystem;
pub use overlay::{Overlay, WriteTarget};
pub use readonly::ReadOnly;
pub use subview::{OpenDir, SubView};
pub use sync::Synchronized;
pub use types::{
    Capability, CopyOptions, DEFAULT_CHUNK_SIZE, EntryFilter, ListOptions, OpenMode,
    ParseModeError, ResourceInfo, ResourceKind, Wildcard,
};
pub use walk::{Walk, WalkIter, WalkOptions, WalkOrder, WalkStep};
