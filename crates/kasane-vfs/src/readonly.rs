//! Write protection for any filesystem.

use std::sync::Arc;

use crate::error::{VfsError, VfsResult};
use crate::file::VfsFile;
use crate::ops::Filesystem;
use crate::types::{Capability, CopyOptions, OpenMode, ResourceInfo};

/// Passes reads through and refuses every mutation with `Unsupported`.
///
/// The inner filesystem is shared, so a writable handle to it may still be
/// held elsewhere; `ReadOnly::<dyn Filesystem>` wraps an already-erased one.
pub struct ReadOnly<F: ?Sized> {
    inner: Arc<F>,
}

impl<F: ?Sized> std::fmt::Debug for ReadOnly<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadOnly").finish_non_exhaustive()
    }
}

impl<F: Filesystem + ?Sized> ReadOnly<F> {
    pub fn new(inner: Arc<F>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<F> {
        &self.inner
    }

    fn refuse(path: &str) -> VfsError {
        VfsError::unsupported(path).with_source("filesystem is read-only")
    }
}

impl<F: Filesystem + ?Sized> Filesystem for ReadOnly<F> {
    fn open(&self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn VfsFile>> {
        if mode.is_write() {
            return Err(Self::refuse(path));
        }
        self.inner.open(path, mode)
    }

    fn is_file(&self, path: &str) -> bool {
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.inner.is_dir(path)
    }

    fn list_dir(&self, path: &str) -> VfsResult<Vec<String>> {
        self.inner.list_dir(path)
    }

    fn make_dir(&self, path: &str, _recursive: bool, _allow_existing: bool) -> VfsResult<()> {
        Err(Self::refuse(path))
    }

    fn remove(&self, path: &str) -> VfsResult<()> {
        Err(Self::refuse(path))
    }

    fn remove_dir(&self, path: &str, _recursive: bool) -> VfsResult<()> {
        Err(Self::refuse(path))
    }

    fn rename(&self, src: &str, _dst: &str) -> VfsResult<()> {
        Err(Self::refuse(src))
    }

    fn info(&self, path: &str) -> VfsResult<ResourceInfo> {
        self.inner.info(path)
    }

    fn supports(&self, capability: Capability) -> bool {
        capability != Capability::Write && self.inner.supports(capability)
    }

    fn copy(&self, _src: &str, dst: &str, _options: CopyOptions) -> VfsResult<()> {
        Err(Self::refuse(dst))
    }

    fn copy_dir(&self, _src: &str, dst: &str, _options: CopyOptions) -> VfsResult<()> {
        Err(Self::refuse(dst))
    }

    fn move_file(&self, src: &str, _dst: &str, _options: CopyOptions) -> VfsResult<()> {
        Err(Self::refuse(src))
    }

    fn move_dir(&self, src: &str, _dst: &str, _options: CopyOptions) -> VfsResult<()> {
        Err(Self::refuse(src))
    }

    fn write_all(&self, path: &str, _data: &[u8]) -> VfsResult<()> {
        Err(Self::refuse(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;
    use crate::error::ErrorKind;

    #[test]
    fn test_reads_pass_writes_refused() {
        let inner = MemoryBackend::new();
        inner.write_all("/f", b"data").unwrap();
        let fs = ReadOnly::new(Arc::new(inner));

        assert_eq!(fs.read_all("/f").unwrap(), b"data");
        assert_eq!(fs.list_dir("/").unwrap(), vec!["f"]);

        let refused = [
            fs.write_all("/g", b"").unwrap_err(),
            fs.open("/f", OpenMode::append()).map(|_| ()).unwrap_err(),
            fs.make_dir("/d", true, true).unwrap_err(),
            fs.remove("/f").unwrap_err(),
            fs.rename("/f", "/g").unwrap_err(),
            fs.copy("/f", "/g", CopyOptions::new()).unwrap_err(),
        ];
        for err in refused {
            assert_eq!(err.kind(), ErrorKind::Unsupported);
        }
        assert!(fs.is_file("/f"));
        assert!(!fs.supports(Capability::Write));
        assert!(fs.supports(Capability::ThreadSafe));
    }
}
