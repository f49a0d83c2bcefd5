//! Serialized access to a filesystem that is not safe to share.

use parking_lot::Mutex;

use crate::error::VfsResult;
use crate::file::VfsFile;
use crate::ops::Filesystem;
use crate::types::{Capability, CopyOptions, ListOptions, OpenMode, ResourceInfo};

/// Wraps a filesystem so that at most one call runs against it at a time.
///
/// Compound operations (copy, move, `read_all`, ...) take the lock once for
/// their whole run and execute against the inner filesystem. Walks are the
/// exception: they are lazy, so each directory listing locks separately and
/// other callers may interleave between steps.
///
/// Streams returned by `open` are not covered by the lock.
#[derive(Debug, Default)]
pub struct Synchronized<F> {
    inner: F,
    lock: Mutex<()>,
}

impl<F: Filesystem> Synchronized<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            lock: Mutex::new(()),
        }
    }

    pub fn get_ref(&self) -> &F {
        &self.inner
    }

    pub fn into_inner(self) -> F {
        self.inner
    }
}

impl<F: Filesystem> Filesystem for Synchronized<F> {
    fn open(&self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn VfsFile>> {
        let _guard = self.lock.lock();
        self.inner.open(path, mode)
    }

    fn is_file(&self, path: &str) -> bool {
        let _guard = self.lock.lock();
        self.inner.is_file(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        let _guard = self.lock.lock();
        self.inner.is_dir(path)
    }

    fn list_dir(&self, path: &str) -> VfsResult<Vec<String>> {
        let _guard = self.lock.lock();
        self.inner.list_dir(path)
    }

    fn make_dir(&self, path: &str, recursive: bool, allow_existing: bool) -> VfsResult<()> {
        let _guard = self.lock.lock();
        self.inner.make_dir(path, recursive, allow_existing)
    }

    fn remove(&self, path: &str) -> VfsResult<()> {
        let _guard = self.lock.lock();
        self.inner.remove(path)
    }

    fn remove_dir(&self, path: &str, recursive: bool) -> VfsResult<()> {
        let _guard = self.lock.lock();
        self.inner.remove_dir(path, recursive)
    }

    fn rename(&self, src: &str, dst: &str) -> VfsResult<()> {
        let _guard = self.lock.lock();
        self.inner.rename(src, dst)
    }

    fn info(&self, path: &str) -> VfsResult<ResourceInfo> {
        let _guard = self.lock.lock();
        self.inner.info(path)
    }

    fn supports(&self, capability: Capability) -> bool {
        capability == Capability::ThreadSafe || self.inner.supports(capability)
    }

    fn close(&self) -> VfsResult<()> {
        let _guard = self.lock.lock();
        self.inner.close()
    }

    fn is_closed(&self) -> bool {
        let _guard = self.lock.lock();
        self.inner.is_closed()
    }

    fn exists(&self, path: &str) -> bool {
        let _guard = self.lock.lock();
        self.inner.exists(path)
    }

    fn copy(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        let _guard = self.lock.lock();
        self.inner.copy(src, dst, options)
    }

    fn copy_dir(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        let _guard = self.lock.lock();
        self.inner.copy_dir(src, dst, options)
    }

    fn move_file(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        let _guard = self.lock.lock();
        self.inner.move_file(src, dst, options)
    }

    fn move_dir(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        let _guard = self.lock.lock();
        self.inner.move_dir(src, dst, options)
    }

    fn size(&self, path: &str) -> VfsResult<u64> {
        let _guard = self.lock.lock();
        self.inner.size(path)
    }

    fn is_dir_empty(&self, path: &str) -> VfsResult<bool> {
        let _guard = self.lock.lock();
        self.inner.is_dir_empty(path)
    }

    fn safe_open(&self, path: &str, mode: OpenMode) -> Box<dyn VfsFile> {
        let _guard = self.lock.lock();
        self.inner.safe_open(path, mode)
    }

    fn read_all(&self, path: &str) -> VfsResult<Vec<u8>> {
        let _guard = self.lock.lock();
        self.inner.read_all(path)
    }

    fn read_to_string(&self, path: &str) -> VfsResult<String> {
        let _guard = self.lock.lock();
        self.inner.read_to_string(path)
    }

    fn write_all(&self, path: &str, data: &[u8]) -> VfsResult<()> {
        let _guard = self.lock.lock();
        self.inner.write_all(path, data)
    }

    fn list_dir_with(&self, path: &str, options: &ListOptions) -> VfsResult<Vec<String>> {
        let _guard = self.lock.lock();
        self.inner.list_dir_with(path, options)
    }

    fn list_dir_info(&self, path: &str) -> VfsResult<Vec<(String, ResourceInfo)>> {
        let _guard = self.lock.lock();
        self.inner.list_dir_info(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryBackend;

    #[test]
    fn test_delegates_and_reports_thread_safe() {
        let fs = Synchronized::new(MemoryBackend::new());
        fs.write_all("/f", b"x").unwrap();
        assert_eq!(fs.read_all("/f").unwrap(), b"x");
        assert!(fs.supports(Capability::ThreadSafe));
        assert!(fs.get_ref().is_file("/f"));
    }

    #[test]
    fn test_walk_relocks_per_step() {
        let fs = Synchronized::new(MemoryBackend::new());
        fs.make_dir("/a/b", true, false).unwrap();
        fs.write_all("/a/b/c", b"").unwrap();
        // Would deadlock if the walk held the lock across steps.
        for step in fs.walk("/", Default::default()) {
            let step = step.unwrap();
            assert!(fs.is_dir(&step.dir));
        }
        let files: Vec<String> = fs.walk_files("/", None).map(Result::unwrap).collect();
        assert_eq!(files, vec!["/a/b/c"]);
    }
}
