//! The filesystem contract.
//!
//! A backend implements the primitives; everything under "Derived operations"
//! has a default built from those primitives in [`crate::derived`]. Backends
//! override a default only to do the same thing faster.

use crate::derived;
use crate::error::VfsResult;
use crate::file::VfsFile;
use crate::types::{Capability, CopyOptions, ListOptions, OpenMode, ResourceInfo, Wildcard};
use crate::walk::{WalkIter, WalkOptions, WalkStep};

/// Core filesystem operations.
///
/// Paths are virtual `/`-separated strings. A leading `/` is insignificant:
/// `a/b` and `/a/b` name the same resource. Backends normalize on entry, so
/// `..` that would climb above the root fails with `PathInvalid`.
///
/// Every implementation must be `Send + Sync`. Whether concurrent calls are
/// actually safe is advertised through [`Capability::ThreadSafe`]; wrap a
/// backend that says no in [`Synchronized`](crate::Synchronized).
pub trait Filesystem: Send + Sync {
    // ========================================================================
    // Primitives
    // ========================================================================

    /// Open a file as a byte stream.
    ///
    /// Fails with `NotFound` for a missing file opened without `create`,
    /// `ParentNotFound` when creating inside a missing directory,
    /// `AlreadyExists` for an exclusive create over an existing file, and
    /// `ResourceInvalid` when the path is a directory.
    fn open(&self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn VfsFile>>;

    /// True if `path` exists and is a file. Never fails.
    fn is_file(&self, path: &str) -> bool;

    /// True if `path` exists and is a directory. Never fails.
    fn is_dir(&self, path: &str) -> bool;

    /// Names (not paths) of the entries directly inside a directory.
    fn list_dir(&self, path: &str) -> VfsResult<Vec<String>>;

    /// Create a directory.
    ///
    /// Without `recursive`, a missing parent fails with `ParentNotFound`.
    /// An existing directory fails with `AlreadyExists` unless
    /// `allow_existing`; an existing file always fails with `ResourceInvalid`.
    fn make_dir(&self, path: &str, recursive: bool, allow_existing: bool) -> VfsResult<()>;

    /// Remove a file. Directories fail with `ResourceInvalid`.
    fn remove(&self, path: &str) -> VfsResult<()>;

    /// Remove a directory, and with `recursive` everything beneath it.
    ///
    /// A non-empty directory without `recursive` fails with
    /// `DirectoryNotEmpty`. Removing the root fails with `ResourceInvalid`.
    fn remove_dir(&self, path: &str, recursive: bool) -> VfsResult<()>;

    /// Rename within this filesystem. An existing `dst` fails with `AlreadyExists`.
    fn rename(&self, src: &str, dst: &str) -> VfsResult<()>;

    /// Metadata for a file or directory.
    fn info(&self, path: &str) -> VfsResult<ResourceInfo>;

    // ========================================================================
    // Capabilities and lifecycle
    // ========================================================================

    /// Whether this filesystem has an optional behavior.
    fn supports(&self, capability: Capability) -> bool {
        derived::default_supports(capability)
    }

    /// Release resources. Idempotent; later operations may fail with `Unsupported`.
    fn close(&self) -> VfsResult<()> {
        Ok(())
    }

    fn is_closed(&self) -> bool {
        false
    }

    // ========================================================================
    // Derived operations (default implementations)
    // ========================================================================

    /// True if `path` is a file or a directory.
    fn exists(&self, path: &str) -> bool {
        derived::exists(self, path)
    }

    /// Copy one file by streaming it through `options.chunk_size` buffers.
    fn copy(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        derived::copy(self, src, dst, options)
    }

    /// Copy a directory tree.
    ///
    /// Best-effort: a failure part-way leaves what was already copied.
    fn copy_dir(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        derived::copy_dir(self, src, dst, options)
    }

    /// Move one file: copy, then remove the source.
    fn move_file(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        derived::move_file(self, src, dst, options)
    }

    /// Move a directory tree, deepest directories first.
    ///
    /// Best-effort like [`copy_dir`](Self::copy_dir).
    fn move_dir(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        derived::move_dir(self, src, dst, options)
    }

    /// Lazily walk the tree under `path`, one step per directory.
    fn walk<'a>(&'a self, path: &str, options: WalkOptions) -> WalkIter<'a, WalkStep> {
        derived::walk(self, path, options)
    }

    /// Paths of every file under `path`, optionally filtered by name.
    fn walk_files<'a>(&'a self, path: &str, wildcard: Option<Wildcard>) -> WalkIter<'a, String> {
        derived::walk_files(self, path, wildcard)
    }

    /// Paths of every directory under `path` (including `path`), optionally
    /// filtered by name.
    fn walk_dirs<'a>(&'a self, path: &str, wildcard: Option<Wildcard>) -> WalkIter<'a, String> {
        derived::walk_dirs(self, path, wildcard)
    }

    /// Size of a file, or the total size of every file under a directory.
    fn size(&self, path: &str) -> VfsResult<u64> {
        derived::size(self, path)
    }

    fn is_dir_empty(&self, path: &str) -> VfsResult<bool> {
        derived::is_dir_empty(self, path)
    }

    /// Like [`open`](Self::open), but any failure yields a [`NullFile`](crate::NullFile).
    fn safe_open(&self, path: &str, mode: OpenMode) -> Box<dyn VfsFile> {
        derived::safe_open(self, path, mode)
    }

    /// Read a whole file.
    fn read_all(&self, path: &str) -> VfsResult<Vec<u8>> {
        derived::read_all(self, path)
    }

    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &str) -> VfsResult<String> {
        derived::read_to_string(self, path)
    }

    /// Create or truncate a file and write `data` to it.
    fn write_all(&self, path: &str, data: &[u8]) -> VfsResult<()> {
        derived::write_all(self, path, data)
    }

    /// [`list_dir`](Self::list_dir) with name and kind filtering.
    fn list_dir_with(&self, path: &str, options: &ListOptions) -> VfsResult<Vec<String>> {
        derived::list_dir_with(self, path, options)
    }

    /// Entry names paired with their metadata.
    fn list_dir_info(&self, path: &str) -> VfsResult<Vec<(String, ResourceInfo)>> {
        derived::list_dir_info(self, path)
    }
}
