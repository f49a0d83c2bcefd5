//! Core VFS types.
//!
//! Path-based throughout: nothing here refers to handles or inodes, and the
//! metadata types serialize so a composition can report them as-is.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::error::{VfsError, VfsResult};

/// Default buffer size used by copy and move.
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Backend could not say.
    #[default]
    Unknown,
}

impl ResourceKind {
    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, ResourceKind::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, ResourceKind::Directory)
    }
}

/// Metadata about a file or directory.
///
/// Only `kind` is always meaningful. Backends fill in what they know and
/// leave the rest empty; `extra` carries backend-specific keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceInfo {
    pub kind: ResourceKind,
    /// Size in bytes. Zero for directories.
    pub size: u64,
    pub created: Option<SystemTime>,
    pub modified: Option<SystemTime>,
    pub accessed: Option<SystemTime>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ResourceInfo {
    /// Info for a file of the given size.
    pub fn file(size: u64) -> Self {
        Self {
            kind: ResourceKind::File,
            size,
            ..Default::default()
        }
    }

    /// Info for a directory.
    pub fn directory() -> Self {
        Self {
            kind: ResourceKind::Directory,
            ..Default::default()
        }
    }

    /// Set all three timestamps.
    pub fn with_times(
        mut self,
        created: SystemTime,
        modified: SystemTime,
        accessed: SystemTime,
    ) -> Self {
        self.created = Some(created);
        self.modified = Some(modified);
        self.accessed = Some(accessed);
        self
    }

    /// Returns true if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }
}

/// How a file should be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode {
    /// Read access requested.
    pub read: bool,
    /// Write access requested.
    pub write: bool,
    /// Every write goes to the end of the file.
    pub append: bool,
    /// Create if not exists.
    pub create: bool,
    /// Truncate on open.
    pub truncate: bool,
    /// Exclusive create (fail if exists).
    pub exclusive: bool,
}

impl Default for OpenMode {
    fn default() -> Self {
        Self {
            read: true,
            write: false,
            append: false,
            create: false,
            truncate: false,
            exclusive: false,
        }
    }
}

impl OpenMode {
    /// Read-only access to an existing file (`r`).
    pub fn read() -> Self {
        Self::default()
    }

    /// Create or truncate for writing (`w`).
    pub fn write() -> Self {
        Self {
            read: false,
            write: true,
            create: true,
            truncate: true,
            ..Default::default()
        }
    }

    /// Create if missing, writes go to the end (`a`).
    pub fn append() -> Self {
        Self {
            read: false,
            write: true,
            append: true,
            create: true,
            ..Default::default()
        }
    }

    /// Read and write an existing file (`r+`).
    pub fn read_write() -> Self {
        Self {
            write: true,
            ..Default::default()
        }
    }

    /// Create a new file, failing if it exists (`x`).
    pub fn create_new() -> Self {
        Self {
            read: false,
            write: true,
            create: true,
            exclusive: true,
            ..Default::default()
        }
    }

    /// Also request read access.
    pub fn with_read(mut self) -> Self {
        self.read = true;
        self
    }

    /// True if opening with this mode could change the filesystem.
    pub fn is_write(&self) -> bool {
        self.write || self.append || self.create || self.truncate
    }
}

/// A mode string that is not one of `r w a x`, optionally with `+` and `b`/`t`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid open mode: {0:?}")]
pub struct ParseModeError(String);

impl FromStr for OpenMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseModeError(s.to_string());
        let mut chars = s.chars().filter(|c| !matches!(c, 'b' | 't'));
        let base = match chars.next() {
            Some('r') => Self::read(),
            Some('w') => Self::write(),
            Some('a') => Self::append(),
            Some('x') => Self::create_new(),
            _ => return Err(err()),
        };
        match (chars.next(), chars.next()) {
            (None, None) => Ok(base),
            (Some('+'), None) => Ok(Self { write: true, ..base.with_read() }),
            _ => Err(err()),
        }
    }
}

/// Optional behaviors a filesystem may advertise through `supports`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Capability {
    /// Safe to call from several threads at once.
    ThreadSafe,
    /// Mutating operations are allowed.
    Write,
    /// `rename` is atomic.
    AtomicRename,
    /// Storage is not an OS directory tree.
    Virtual,
    /// `A` and `a` name the same entry.
    CaseInsensitivePaths,
}

/// A shell-style name pattern (`*`, `?`, `[...]`).
///
/// Matched against a single entry name, never a whole path.
#[derive(Clone, PartialEq, Eq)]
pub struct Wildcard(glob::Pattern);

impl Wildcard {
    /// Compile a pattern. Malformed patterns fail with `PathInvalid`.
    pub fn new(pattern: &str) -> VfsResult<Self> {
        glob::Pattern::new(pattern)
            .map(Self)
            .map_err(|e| VfsError::path_invalid(pattern).with_source(e))
    }

    pub fn matches(&self, name: &str) -> bool {
        self.0.matches(name)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Wildcard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Wildcard").field(&self.as_str()).finish()
    }
}

/// Which entry kinds a filtered listing keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryFilter {
    #[default]
    All,
    FilesOnly,
    DirsOnly,
}

/// Options for [`Filesystem::list_dir_with`](crate::Filesystem::list_dir_with).
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Keep only names matching this pattern.
    pub wildcard: Option<Wildcard>,
    pub filter: EntryFilter,
    /// Return paths joined onto the listed directory instead of bare names.
    pub full: bool,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wildcard(mut self, wildcard: Wildcard) -> Self {
        self.wildcard = Some(wildcard);
        self
    }

    pub fn filter(mut self, filter: EntryFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn full(mut self) -> Self {
        self.full = true;
        self
    }
}

/// Options for copy and move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOptions {
    /// Replace an existing destination instead of failing with `AlreadyExists`.
    pub overwrite: bool,
    /// Directory operations skip (and log) entries that fail instead of stopping.
    pub ignore_errors: bool,
    /// Buffer size for streaming file contents.
    pub chunk_size: usize,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            ignore_errors: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl CopyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }

    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}
