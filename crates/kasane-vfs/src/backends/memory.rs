//! In-memory filesystem backend.
//!
//! Used for scratch space and testing. All data is ephemeral.

use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::derived;
use crate::error::{VfsError, VfsResult};
use crate::file::VfsFile;
use crate::ops::Filesystem;
use crate::path;
use crate::types::{Capability, CopyOptions, OpenMode, ResourceInfo};

/// Contents and times of one file, shared with every open handle.
#[derive(Debug)]
struct FileData {
    bytes: Vec<u8>,
    created: SystemTime,
    modified: SystemTime,
    accessed: SystemTime,
}

impl FileData {
    fn new() -> Self {
        let now = SystemTime::now();
        Self {
            bytes: Vec::new(),
            created: now,
            modified: now,
            accessed: now,
        }
    }
}

/// Entry in the memory filesystem.
#[derive(Debug, Clone)]
enum Entry {
    File(Arc<Mutex<FileData>>),
    Directory { created: SystemTime },
}

impl Entry {
    fn directory() -> Self {
        Entry::Directory {
            created: SystemTime::now(),
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self, Entry::Directory { .. })
    }
}

/// In-memory filesystem backend.
///
/// Entries are keyed by normalized relative path, with `""` as the root.
/// Thread-safe via an internal `RwLock`; writes through an open handle are
/// visible to every other handle on the same file immediately.
#[derive(Debug)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Entry>>,
    closed: AtomicBool,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create a new empty in-memory filesystem.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Root directory always exists
        entries.insert(String::new(), Entry::directory());
        Self {
            entries: RwLock::new(entries),
            closed: AtomicBool::new(false),
        }
    }

    /// Normalize a caller path into an entry key.
    fn key(&self, path: &str) -> VfsResult<String> {
        if self.is_closed() {
            return Err(VfsError::unsupported(path).with_source("filesystem is closed"));
        }
        path::normalize_relative(path)
    }

    /// Path used in error reports for a key.
    fn shown(key: &str) -> String {
        path::abspath(key)
    }

    fn invalid(key: &str, cause: &'static str) -> VfsError {
        VfsError::resource_invalid(Self::shown(key)).with_source(cause)
    }

    /// The directory that would contain `key` must exist.
    fn check_parent(entries: &HashMap<String, Entry>, key: &str) -> VfsResult<()> {
        let parent = path::dirname(key);
        match entries.get(parent) {
            Some(entry) if entry.is_dir() => Ok(()),
            Some(_) => Err(Self::invalid(parent, "parent is a file")),
            None => Err(VfsError::parent_not_found(Self::shown(key))),
        }
    }

    /// Move `src` (and everything beneath it) to `dst` under one lock.
    ///
    /// With `replace`, an existing destination file is overwritten.
    fn rename_entries(
        entries: &mut HashMap<String, Entry>,
        src: &str,
        dst: &str,
        replace: bool,
    ) -> VfsResult<()> {
        if src.is_empty() {
            return Err(VfsError::resource_invalid("/").with_source("cannot rename the root"));
        }
        let Some(entry) = entries.get(src).cloned() else {
            return Err(VfsError::not_found(Self::shown(src)));
        };
        if src == dst {
            return Ok(());
        }
        if path::is_parent(src, dst) {
            return Err(Self::invalid(dst, "cannot move a directory inside itself"));
        }
        match entries.get(dst) {
            None => {}
            Some(Entry::File(_)) if replace && !entry.is_dir() => {
                entries.remove(dst);
            }
            Some(Entry::Directory { .. }) if replace => {
                return Err(Self::invalid(dst, "destination is a directory"));
            }
            Some(_) => return Err(VfsError::already_exists(Self::shown(dst))),
        }
        Self::check_parent(entries, dst)?;

        entries.remove(src);
        entries.insert(dst.to_string(), entry.clone());

        if entry.is_dir() {
            let prefix = format!("{src}/");
            let children: Vec<String> =
                entries.keys().filter(|k| k.starts_with(&prefix)).cloned().collect();
            for old in children {
                if let Some(child) = entries.remove(&old) {
                    let new = format!("{dst}/{}", &old[prefix.len()..]);
                    entries.insert(new, child);
                }
            }
        }
        Ok(())
    }
}

impl Filesystem for MemoryBackend {
    fn open(&self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn VfsFile>> {
        let key = self.key(path)?;
        let mut entries = self.entries.write();

        let data = match entries.get(&key) {
            Some(Entry::Directory { .. }) => {
                return Err(Self::invalid(&key, "is a directory"));
            }
            Some(Entry::File(_)) if mode.exclusive => {
                return Err(VfsError::already_exists(Self::shown(&key)));
            }
            Some(Entry::File(data)) => {
                let data = Arc::clone(data);
                {
                    let mut file = data.lock();
                    let now = SystemTime::now();
                    if mode.truncate {
                        file.bytes.clear();
                        file.modified = now;
                    }
                    file.accessed = now;
                }
                data
            }
            None if !mode.create => return Err(VfsError::not_found(Self::shown(&key))),
            None => {
                Self::check_parent(&entries, &key)?;
                let data = Arc::new(Mutex::new(FileData::new()));
                entries.insert(key.clone(), Entry::File(Arc::clone(&data)));
                data
            }
        };

        Ok(Box::new(MemoryFile { data, pos: 0, mode }))
    }

    fn is_file(&self, path: &str) -> bool {
        let Ok(key) = self.key(path) else { return false };
        matches!(self.entries.read().get(&key), Some(Entry::File(_)))
    }

    fn is_dir(&self, path: &str) -> bool {
        let Ok(key) = self.key(path) else { return false };
        matches!(self.entries.read().get(&key), Some(Entry::Directory { .. }))
    }

    fn list_dir(&self, path: &str) -> VfsResult<Vec<String>> {
        let key = self.key(path)?;
        let entries = self.entries.read();

        match entries.get(&key) {
            Some(entry) if entry.is_dir() => {}
            Some(_) => return Err(Self::invalid(&key, "not a directory")),
            None => return Err(VfsError::not_found(Self::shown(&key))),
        }

        let mut names: Vec<String> = entries
            .keys()
            .filter(|k| !k.is_empty())
            .filter_map(|k| {
                let (parent, name) = path::split(k);
                (parent == key).then(|| name.to_string())
            })
            .collect();
        names.sort();
        Ok(names)
    }

    fn make_dir(&self, path: &str, recursive: bool, allow_existing: bool) -> VfsResult<()> {
        let key = self.key(path)?;
        let mut entries = self.entries.write();

        match entries.get(&key) {
            Some(entry) if entry.is_dir() => {
                return if allow_existing {
                    Ok(())
                } else {
                    Err(VfsError::already_exists(Self::shown(&key)))
                };
            }
            Some(_) => {
                return Err(Self::invalid(&key, "a file exists at this path"));
            }
            None => {}
        }

        if !recursive {
            Self::check_parent(&entries, &key)?;
            entries.insert(key, Entry::directory());
            return Ok(());
        }

        for prefix in path::prefixes(&key) {
            match entries.get(&prefix) {
                Some(entry) if entry.is_dir() => {}
                Some(_) => {
                    return Err(Self::invalid(&prefix, "a file exists at this path"));
                }
                None => {
                    entries.insert(prefix, Entry::directory());
                }
            }
        }
        Ok(())
    }

    fn remove(&self, path: &str) -> VfsResult<()> {
        let key = self.key(path)?;
        let mut entries = self.entries.write();

        match entries.get(&key) {
            Some(Entry::File(_)) => {
                entries.remove(&key);
                Ok(())
            }
            Some(Entry::Directory { .. }) => {
                Err(Self::invalid(&key, "is a directory"))
            }
            None => Err(VfsError::not_found(Self::shown(&key))),
        }
    }

    fn remove_dir(&self, path: &str, recursive: bool) -> VfsResult<()> {
        let key = self.key(path)?;
        if key.is_empty() {
            return Err(Self::invalid("", "cannot remove the root directory"));
        }
        let mut entries = self.entries.write();

        match entries.get(&key) {
            Some(entry) if entry.is_dir() => {}
            Some(_) => return Err(Self::invalid(&key, "not a directory")),
            None => return Err(VfsError::not_found(Self::shown(&key))),
        }

        let prefix = format!("{key}/");
        let descendants: Vec<String> =
            entries.keys().filter(|k| k.starts_with(&prefix)).cloned().collect();
        if !descendants.is_empty() && !recursive {
            return Err(VfsError::directory_not_empty(Self::shown(&key)));
        }
        for k in descendants {
            entries.remove(&k);
        }
        entries.remove(&key);
        Ok(())
    }

    fn rename(&self, src: &str, dst: &str) -> VfsResult<()> {
        let src = self.key(src)?;
        let dst = self.key(dst)?;
        let mut entries = self.entries.write();
        Self::rename_entries(&mut entries, &src, &dst, false)
    }

    fn info(&self, path: &str) -> VfsResult<ResourceInfo> {
        let key = self.key(path)?;
        let entries = self.entries.read();

        match entries.get(&key) {
            Some(Entry::File(data)) => {
                let file = data.lock();
                let info = ResourceInfo::file(file.bytes.len() as u64);
                Ok(info.with_times(file.created, file.modified, file.accessed))
            }
            Some(Entry::Directory { created }) => {
                Ok(ResourceInfo::directory().with_times(*created, *created, *created))
            }
            None => Err(VfsError::not_found(Self::shown(&key))),
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::ThreadSafe
            | Capability::Write
            | Capability::AtomicRename
            | Capability::Virtual => true,
            Capability::CaseInsensitivePaths => false,
        }
    }

    fn close(&self) -> VfsResult<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let mut entries = self.entries.write();
            debug!(entries = entries.len(), "closing memory filesystem");
            entries.clear();
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn move_file(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        let src_key = self.key(src)?;
        let dst_key = self.key(dst)?;
        let mut entries = self.entries.write();

        match entries.get(&src_key) {
            Some(Entry::File(_)) => {}
            Some(_) => return Err(Self::invalid(&src_key, "is a directory")),
            None => return Err(VfsError::not_found(Self::shown(&src_key))),
        }
        Self::rename_entries(&mut entries, &src_key, &dst_key, options.overwrite)
    }

    fn move_dir(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        let src_key = self.key(src)?;
        let dst_key = self.key(dst)?;
        {
            let mut entries = self.entries.write();
            let src_is_dir = entries.get(&src_key).is_some_and(Entry::is_dir);
            let fast = src_is_dir
                && !entries.contains_key(&dst_key)
                && !path::is_parent(&src_key, &dst_key);
            if fast {
                return Self::rename_entries(&mut entries, &src_key, &dst_key, false);
            }
        }
        derived::move_dir(self, src, dst, options)
    }
}

/// Open handle onto a memory file.
struct MemoryFile {
    data: Arc<Mutex<FileData>>,
    pos: u64,
    mode: OpenMode,
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.mode.read {
            let msg = "file not opened for reading";
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, msg));
        }
        let mut file = self.data.lock();
        file.accessed = SystemTime::now();

        let len = file.bytes.len();
        let start = usize::try_from(self.pos).map_or(len, |pos| pos.min(len));
        let n = buf.len().min(len - start);
        buf[..n].copy_from_slice(&file.bytes[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !(self.mode.write || self.mode.append) {
            let msg = "file not opened for writing";
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, msg));
        }
        let mut file = self.data.lock();
        if self.mode.append {
            self.pos = file.bytes.len() as u64;
        }

        let end = usize::try_from(self.pos)
            .ok()
            .and_then(|start| start.checked_add(buf.len()))
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "write offset out of range")
            })?;
        let start = end - buf.len();
        if end > file.bytes.len() {
            let additional = end - file.bytes.len();
            file.bytes
                .try_reserve(additional)
                .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
            file.bytes.resize(end, 0);
        }
        file.bytes[start..end].copy_from_slice(buf);
        file.modified = SystemTime::now();
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(off) => (self.data.lock().bytes.len() as u64).checked_add_signed(off),
            SeekFrom::Current(off) => self.pos.checked_add_signed(off),
        };
        match target {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(io::ErrorKind::InvalidInput, "seek before start of file")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_create_and_read() {
        let fs = MemoryBackend::new();

        fs.write_all("/test.txt", b"hello world").unwrap();
        assert_eq!(fs.read_all("/test.txt").unwrap(), b"hello world");
        assert_eq!(fs.read_to_string("test.txt").unwrap(), "hello world");

        let info = fs.info("/test.txt").unwrap();
        assert!(info.is_file());
        assert_eq!(info.size, 11);
        assert!(info.modified.is_some());
    }

    #[test]
    fn test_handles_share_contents() {
        let fs = MemoryBackend::new();
        let mut writer = fs.open("/live.txt", OpenMode::write()).unwrap();
        writer.write_all(b"abc").unwrap();

        let mut reader = fs.open("/live.txt", OpenMode::read()).unwrap();
        let mut buf = String::new();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "abc");

        writer.write_all(b"def").unwrap();
        reader.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "abcdef");
    }

    #[test]
    fn test_open_modes() {
        let fs = MemoryBackend::new();

        let err = fs.open("/missing", OpenMode::read()).map(|_| ()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        fs.write_all("/f", b"12345").unwrap();
        let err = fs.open("/f", OpenMode::create_new()).map(|_| ()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let mut append = fs.open("/f", OpenMode::append()).unwrap();
        append.write_all(b"67").unwrap();
        assert_eq!(fs.read_all("/f").unwrap(), b"1234567");

        let mut rw = fs.open("/f", "r+".parse().unwrap()).unwrap();
        rw.seek(SeekFrom::Start(1)).unwrap();
        rw.write_all(b"xx").unwrap();
        assert_eq!(fs.read_all("/f").unwrap(), b"1xx4567");

        fs.open("/f", OpenMode::write()).unwrap();
        assert!(fs.read_all("/f").unwrap().is_empty());
    }

    #[test]
    fn test_handle_direction_enforced() {
        let fs = MemoryBackend::new();
        fs.write_all("/f", b"data").unwrap();

        let mut reader = fs.open("/f", OpenMode::read()).unwrap();
        assert!(reader.write(b"nope").is_err());

        let mut writer = fs.open("/f", OpenMode::append()).unwrap();
        let mut buf = [0u8; 4];
        assert!(writer.read(&mut buf).is_err());
    }

    #[test]
    fn test_seek_past_end_then_write_zero_fills() {
        let fs = MemoryBackend::new();
        let mut f = fs.open("/sparse", OpenMode::write()).unwrap();
        f.seek(SeekFrom::Start(3)).unwrap();
        f.write_all(b"x").unwrap();
        assert_eq!(fs.read_all("/sparse").unwrap(), b"\0\0\0x");
        assert!(f.seek(SeekFrom::Current(-10)).is_err());
    }

    #[test]
    fn test_write_at_unreachable_offset_fails() {
        let fs = MemoryBackend::new();
        let mut f = fs.open("/far", OpenMode::write()).unwrap();
        f.seek(SeekFrom::Start(u64::MAX)).unwrap();
        let err = f.write(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        f.seek(SeekFrom::Start(u64::MAX / 2)).unwrap();
        assert!(f.write(b"x").is_err());
        assert!(fs.read_all("/far").unwrap().is_empty());

        // Reading from past the end is just EOF.
        let mut r = fs.open("/far", OpenMode::read()).unwrap();
        r.seek(SeekFrom::Start(u64::MAX)).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(r.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_open_errors() {
        let fs = MemoryBackend::new();
        fs.make_dir("/dir", false, false).unwrap();

        let err = fs.open("/dir", OpenMode::read()).map(|_| ()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceInvalid);

        let err = fs.open("/nope/file", OpenMode::write()).map(|_| ()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParentNotFound);

        let err = fs.open("/../escape", OpenMode::read()).map(|_| ()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathInvalid);
    }

    #[test]
    fn test_mkdir_and_readdir() {
        let fs = MemoryBackend::new();

        fs.make_dir("/dir", false, false).unwrap();
        fs.write_all("/dir/file1.txt", b"a").unwrap();
        fs.write_all("/dir/file2.txt", b"b").unwrap();
        fs.make_dir("/dir/subdir", false, false).unwrap();

        let entries = fs.list_dir("/dir").unwrap();
        assert_eq!(entries, vec!["file1.txt", "file2.txt", "subdir"]);
        assert_eq!(fs.list_dir("/").unwrap(), vec!["dir"]);
    }

    #[test]
    fn test_make_dir_rules() {
        let fs = MemoryBackend::new();

        let err = fs.make_dir("/a/b", false, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParentNotFound);

        fs.make_dir("/a/b/c", true, false).unwrap();
        assert!(fs.is_dir("/a"));
        assert!(fs.is_dir("/a/b"));

        let err = fs.make_dir("/a/b", false, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        fs.make_dir("/a/b", false, true).unwrap();

        fs.write_all("/a/file", b"").unwrap();
        let err = fs.make_dir("/a/file", false, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceInvalid);
        let err = fs.make_dir("/a/file/deeper", true, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceInvalid);

        fs.make_dir("/", false, true).unwrap();
        assert_eq!(fs.make_dir("/", false, false).unwrap_err().kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_list_dir_errors() {
        let fs = MemoryBackend::new();
        fs.write_all("/f", b"").unwrap();
        assert_eq!(fs.list_dir("/f").unwrap_err().kind(), ErrorKind::ResourceInvalid);
        assert_eq!(fs.list_dir("/none").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_remove() {
        let fs = MemoryBackend::new();
        fs.write_all("/f", b"x").unwrap();
        fs.make_dir("/d", false, false).unwrap();

        assert_eq!(fs.remove("/d").unwrap_err().kind(), ErrorKind::ResourceInvalid);
        fs.remove("/f").unwrap();
        assert!(!fs.exists("/f"));
        assert_eq!(fs.remove("/f").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_remove_dir() {
        let fs = MemoryBackend::new();
        fs.make_dir("/d/e", true, false).unwrap();
        fs.write_all("/d/e/f", b"x").unwrap();

        let err = fs.remove_dir("/d", false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DirectoryNotEmpty);
        assert_eq!(fs.remove_dir("/d/e/f", false).unwrap_err().kind(), ErrorKind::ResourceInvalid);

        fs.remove_dir("/d", true).unwrap();
        assert!(!fs.exists("/d"));
        assert!(!fs.exists("/d/e/f"));

        assert_eq!(fs.remove_dir("/", true).unwrap_err().kind(), ErrorKind::ResourceInvalid);
        assert!(fs.is_dir("/"));
    }

    #[test]
    fn test_remove_dir_keeps_siblings_with_shared_prefix() {
        let fs = MemoryBackend::new();
        fs.make_dir("/foo", false, false).unwrap();
        fs.write_all("/foobar", b"keep").unwrap();
        fs.remove_dir("/foo", false).unwrap();
        assert!(fs.is_file("/foobar"));
    }

    #[test]
    fn test_rename() {
        let fs = MemoryBackend::new();

        fs.write_all("/old.txt", b"content").unwrap();
        fs.rename("/old.txt", "/new.txt").unwrap();

        assert!(!fs.exists("/old.txt"));
        assert_eq!(fs.read_all("/new.txt").unwrap(), b"content");
    }

    #[test]
    fn test_rename_directory_moves_children() {
        let fs = MemoryBackend::new();
        fs.make_dir("/src/deep", true, false).unwrap();
        fs.write_all("/src/deep/f", b"1").unwrap();

        fs.rename("/src", "/dst").unwrap();
        assert_eq!(fs.read_all("/dst/deep/f").unwrap(), b"1");
        assert!(!fs.exists("/src/deep"));
    }

    #[test]
    fn test_rename_errors() {
        let fs = MemoryBackend::new();
        fs.write_all("/a", b"").unwrap();
        fs.write_all("/b", b"").unwrap();
        fs.make_dir("/d", false, false).unwrap();

        assert_eq!(fs.rename("/a", "/b").unwrap_err().kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs.rename("/zz", "/c").unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(fs.rename("/a", "/x/y").unwrap_err().kind(), ErrorKind::ParentNotFound);
        assert_eq!(fs.rename("/d", "/d/inner").unwrap_err().kind(), ErrorKind::ResourceInvalid);
        assert_eq!(fs.rename("/", "/r").unwrap_err().kind(), ErrorKind::ResourceInvalid);
    }

    #[test]
    fn test_move_file_overwrite() {
        let fs = MemoryBackend::new();
        fs.write_all("/a", b"new").unwrap();
        fs.write_all("/b", b"old").unwrap();

        let err = fs.move_file("/a", "/b", CopyOptions::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        fs.move_file("/a", "/b", CopyOptions::new().overwrite(true)).unwrap();
        assert_eq!(fs.read_all("/b").unwrap(), b"new");
        assert!(!fs.exists("/a"));
    }

    #[test]
    fn test_move_dir_fast_path_and_merge() {
        let fs = MemoryBackend::new();
        fs.make_dir("/one", false, false).unwrap();
        fs.write_all("/one/x", b"x").unwrap();
        fs.move_dir("/one", "/two", CopyOptions::new()).unwrap();
        assert!(fs.is_file("/two/x"));

        fs.make_dir("/three", false, false).unwrap();
        fs.write_all("/three/y", b"y").unwrap();
        fs.move_dir("/two", "/three", CopyOptions::new().overwrite(true)).unwrap();
        assert!(fs.is_file("/three/x"));
        assert!(fs.is_file("/three/y"));
        assert!(!fs.exists("/two"));
    }

    #[test]
    fn test_close() {
        let fs = MemoryBackend::new();
        fs.write_all("/f", b"x").unwrap();

        fs.close().unwrap();
        fs.close().unwrap();
        assert!(fs.is_closed());
        assert!(!fs.exists("/f"));

        let err = fs.list_dir("/").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_capabilities() {
        let fs = MemoryBackend::new();
        assert!(fs.supports(Capability::ThreadSafe));
        assert!(fs.supports(Capability::AtomicRename));
        assert!(!fs.supports(Capability::CaseInsensitivePaths));
    }
}
