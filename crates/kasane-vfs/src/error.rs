//! VFS error types.
//!
//! Every backend and composition reports failures as a [`VfsError`]: one of a
//! closed set of [`ErrorKind`]s, the offending path, and optionally the native
//! failure that caused it.

use std::error::Error as StdError;
use std::io;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

/// Boxed native failure carried as the source of a [`VfsError`].
pub type Cause = Box<dyn StdError + Send + Sync + 'static>;

/// Category of a VFS failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ErrorKind {
    /// Resource does not exist.
    #[strum(to_string = "not found")]
    NotFound,
    /// Resource already exists.
    #[strum(to_string = "already exists")]
    AlreadyExists,
    /// The containing directory does not exist.
    #[strum(to_string = "parent directory not found")]
    ParentNotFound,
    /// Directory still has children.
    #[strum(to_string = "directory not empty")]
    DirectoryNotEmpty,
    /// Resource exists but is the wrong kind for the operation.
    #[strum(to_string = "invalid resource")]
    ResourceInvalid,
    /// Path is malformed or escapes its root.
    #[strum(to_string = "invalid path")]
    PathInvalid,
    /// Operation not permitted.
    #[strum(to_string = "permission denied")]
    PermissionDenied,
    /// Remote backend could not be reached.
    #[strum(to_string = "connection error")]
    ConnectionError,
    /// Filesystem does not support the operation.
    #[strum(to_string = "unsupported operation")]
    Unsupported,
    /// Anything else.
    #[strum(to_string = "unspecified error")]
    Unspecified,
}

impl From<io::ErrorKind> for ErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        use io::ErrorKind as Io;
        match kind {
            Io::NotFound => ErrorKind::NotFound,
            Io::AlreadyExists => ErrorKind::AlreadyExists,
            Io::DirectoryNotEmpty => ErrorKind::DirectoryNotEmpty,
            Io::NotADirectory | Io::IsADirectory => ErrorKind::ResourceInvalid,
            Io::InvalidInput => ErrorKind::PathInvalid,
            Io::PermissionDenied | Io::ReadOnlyFilesystem => ErrorKind::PermissionDenied,
            Io::ConnectionRefused
            | Io::ConnectionReset
            | Io::ConnectionAborted
            | Io::NotConnected
            | Io::BrokenPipe
            | Io::TimedOut => ErrorKind::ConnectionError,
            Io::Unsupported => ErrorKind::Unsupported,
            _ => ErrorKind::Unspecified,
        }
    }
}

impl From<ErrorKind> for io::ErrorKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound | ErrorKind::ParentNotFound => io::ErrorKind::NotFound,
            ErrorKind::AlreadyExists => io::ErrorKind::AlreadyExists,
            ErrorKind::DirectoryNotEmpty => io::ErrorKind::DirectoryNotEmpty,
            ErrorKind::ResourceInvalid | ErrorKind::PathInvalid => io::ErrorKind::InvalidInput,
            ErrorKind::PermissionDenied => io::ErrorKind::PermissionDenied,
            ErrorKind::ConnectionError => io::ErrorKind::NotConnected,
            ErrorKind::Unsupported => io::ErrorKind::Unsupported,
            ErrorKind::Unspecified => io::ErrorKind::Other,
        }
    }
}

/// VFS error: a kind, the path it concerns, and an optional cause.
#[derive(Debug, Error)]
#[error("{kind}: {path}")]
pub struct VfsError {
    kind: ErrorKind,
    path: String,
    #[source]
    source: Option<Cause>,
}

impl VfsError {
    /// Create an error of the given kind for `path`.
    pub fn new(kind: ErrorKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            source: None,
        }
    }

    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, path)
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists, path)
    }

    /// Create a ParentNotFound error.
    pub fn parent_not_found(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParentNotFound, path)
    }

    /// Create a DirectoryNotEmpty error.
    pub fn directory_not_empty(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::DirectoryNotEmpty, path)
    }

    /// Create a ResourceInvalid error.
    pub fn resource_invalid(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResourceInvalid, path)
    }

    /// Create a PathInvalid error.
    pub fn path_invalid(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::PathInvalid, path)
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::PermissionDenied, path)
    }

    /// Create a ConnectionError error.
    pub fn connection(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConnectionError, path)
    }

    /// Create an Unsupported error.
    pub fn unsupported(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unsupported, path)
    }

    /// Create an Unspecified error.
    pub fn unspecified(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unspecified, path)
    }

    /// Translate a native I/O failure, keeping it as the cause.
    ///
    /// An `io::Error` that was itself produced from a `VfsError` (see the
    /// `From` impl below) is unwrapped back to the original error.
    pub fn from_io(path: impl Into<String>, err: io::Error) -> Self {
        let kind = ErrorKind::from(err.kind());
        if err.get_ref().is_some_and(|inner| inner.is::<VfsError>()) {
            if let Some(Ok(inner)) = err.into_inner().map(|e| e.downcast::<VfsError>()) {
                return *inner;
            }
            return Self::new(kind, path);
        }
        Self::new(kind, path).with_source(err)
    }

    /// Attach a cause. Plain strings work too.
    pub fn with_source(mut self, source: impl Into<Cause>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Replace the path this error reports.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

/// Convert VfsError to std::io::Error so streams can surface it.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        io::Error::new(e.kind.into(), e)
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;

/// Adapters for attaching a path to failures from native I/O.
pub trait IoResultExt<T> {
    /// Translate an `io::Result` into a [`VfsResult`] reported against `path`.
    fn vfs(self, path: &str) -> VfsResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn vfs(self, path: &str) -> VfsResult<T> {
        self.map_err(|e| VfsError::from_io(path, e))
    }
}

/// Adapters for re-expressing the path of a VFS failure.
pub trait VfsResultExt<T> {
    /// Report any error against `path` instead of the path it carries.
    fn with_path(self, path: &str) -> VfsResult<T>;
}

impl<T> VfsResultExt<T> for VfsResult<T> {
    fn with_path(self, path: &str) -> VfsResult<T> {
        self.map_err(|e| e.with_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_display_includes_kind_and_path() {
        let err = VfsError::not_found("/a/b.txt");
        assert_eq!(err.to_string(), "not found: /a/b.txt");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.path(), "/a/b.txt");
    }

    #[test]
    fn test_string_cause_is_source() {
        let err = VfsError::unsupported("/x").with_source("filesystem is read-only");
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "filesystem is read-only");
    }

    #[test]
    fn test_from_io_maps_kind_and_keeps_cause() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        let err = VfsError::from_io("/secret", io_err);
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(err.path(), "/secret");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_io_round_trip_recovers_original() {
        let original = VfsError::directory_not_empty("/full").with_source("2 children");
        let io_err: io::Error = original.into();
        assert_eq!(io_err.kind(), io::ErrorKind::DirectoryNotEmpty);

        let back = VfsError::from_io("/elsewhere", io_err);
        assert_eq!(back.kind(), ErrorKind::DirectoryNotEmpty);
        assert_eq!(back.path(), "/full");
    }

    #[test]
    fn test_every_kind_has_a_message() {
        for kind in ErrorKind::iter() {
            let rendered = VfsError::new(kind, "/p").to_string();
            assert!(rendered.ends_with(": /p"), "{rendered}");
            assert!(rendered.len() > ": /p".len());
        }
    }

    #[test]
    fn test_kind_strings() {
        let name: &'static str = ErrorKind::DirectoryNotEmpty.into();
        assert_eq!(name, "directory not empty");
        assert_eq!("Not Found".parse::<ErrorKind>().unwrap(), ErrorKind::NotFound);
    }

    #[test]
    fn test_result_ext_rewrites_path() {
        let res: VfsResult<()> = Err(VfsError::not_found("inner/path"));
        let err = res.with_path("/outer/path").unwrap_err();
        assert_eq!(err.path(), "/outer/path");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
