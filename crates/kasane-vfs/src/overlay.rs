//! Layered filesystem.
//!
//! An [`Overlay`] stacks named member filesystems. Reads probe the members in
//! priority order and take the first answer that is not `NotFound`;
//! directory listings merge every member that has the directory. All
//! mutations go to a single write target.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::error::{VfsError, VfsResult};
use crate::file::VfsFile;
use crate::ops::Filesystem;
use crate::types::{Capability, OpenMode, ResourceInfo};

/// Which member receives writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WriteTarget {
    /// The member probed first.
    #[default]
    First,
    /// The member added under this name.
    Named(String),
    /// Writes fail with `Unsupported`.
    None,
}

struct Member {
    name: String,
    priority: i32,
    fs: Arc<dyn Filesystem>,
}

/// Read-through stack of filesystems with one write target.
///
/// Members with a higher priority are probed first; members of equal
/// priority are probed in the order they were added.
#[derive(Default)]
pub struct Overlay {
    members: RwLock<Vec<Member>>,
    write_target: RwLock<WriteTarget>,
}

impl std::fmt::Debug for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("members", &self.members())
            .field("write_target", &*self.write_target.read())
            .finish()
    }
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member at the default priority (0).
    pub fn add(&self, name: &str, fs: impl Filesystem + 'static) -> VfsResult<()> {
        self.add_with_priority(name, Arc::new(fs), 0)
    }

    /// Add a shared member at the default priority (0).
    pub fn add_arc(&self, name: &str, fs: Arc<dyn Filesystem>) -> VfsResult<()> {
        self.add_with_priority(name, fs, 0)
    }

    /// Add a member. Names must be unique within the overlay.
    pub fn add_with_priority(
        &self,
        name: &str,
        fs: Arc<dyn Filesystem>,
        priority: i32,
    ) -> VfsResult<()> {
        let mut members = self.members.write();
        if members.iter().any(|m| m.name == name) {
            return Err(VfsError::already_exists(name).with_source("overlay member name in use"));
        }
        let at = members.iter().position(|m| m.priority < priority).unwrap_or(members.len());
        members.insert(
            at,
            Member {
                name: name.to_string(),
                priority,
                fs,
            },
        );
        debug!(member = name, priority, position = at, "added overlay member");
        Ok(())
    }

    /// Remove a member by name. Returns `false` if there was none.
    pub fn remove_member(&self, name: &str) -> bool {
        let mut members = self.members.write();
        let before = members.len();
        members.retain(|m| m.name != name);
        let removed = members.len() != before;
        if removed && *self.write_target.read() == WriteTarget::Named(name.to_string()) {
            warn!(member = name, "removed the overlay's write target; writes will fail");
        }
        removed
    }

    /// Member names in probe order.
    pub fn members(&self) -> Vec<String> {
        self.members.read().iter().map(|m| m.name.clone()).collect()
    }

    pub fn member(&self, name: &str) -> Option<Arc<dyn Filesystem>> {
        self.members.read().iter().find(|m| m.name == name).map(|m| Arc::clone(&m.fs))
    }

    /// Choose where writes go. A named target must already be a member.
    pub fn set_write_target(&self, target: WriteTarget) -> VfsResult<()> {
        if let WriteTarget::Named(name) = &target {
            if self.member(name).is_none() {
                return Err(VfsError::not_found(name.as_str())
                    .with_source("no overlay member with this name"));
            }
        }
        debug!(?target, "overlay write target changed");
        *self.write_target.write() = target;
        Ok(())
    }

    pub fn write_target(&self) -> WriteTarget {
        self.write_target.read().clone()
    }

    /// Name of the member a read of `path` would be served by.
    pub fn which(&self, path: &str) -> Option<String> {
        self.members.read().iter().find(|m| m.fs.exists(path)).map(|m| m.name.clone())
    }

    /// Members in probe order, cloned out so no lock is held during I/O.
    fn snapshot(&self) -> Vec<Arc<dyn Filesystem>> {
        self.members.read().iter().map(|m| Arc::clone(&m.fs)).collect()
    }

    fn writer(&self, path: &str) -> VfsResult<Arc<dyn Filesystem>> {
        let target = self.write_target.read().clone();
        let members = self.members.read();
        let member = match &target {
            WriteTarget::None => None,
            WriteTarget::First => members.first(),
            WriteTarget::Named(name) => members.iter().find(|m| &m.name == name),
        };
        if let Some(m) = member {
            trace!(path, member = %m.name, "overlay write dispatch");
        }
        member
            .map(|m| Arc::clone(&m.fs))
            .ok_or_else(|| VfsError::unsupported(path).with_source("overlay has no write target"))
    }

    /// First member answer that is not `NotFound`.
    fn probe<T>(&self, path: &str, op: impl Fn(&dyn Filesystem) -> VfsResult<T>) -> VfsResult<T> {
        for fs in self.snapshot() {
            match op(fs.as_ref()) {
                Err(e) if e.is_not_found() => continue,
                other => return other,
            }
        }
        trace!(path, "no overlay member has this path");
        Err(VfsError::not_found(path))
    }

    fn first_containing(&self, path: &str) -> Option<Arc<dyn Filesystem>> {
        self.snapshot().into_iter().find(|fs| fs.exists(path))
    }
}

impl Filesystem for Overlay {
    fn open(&self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn VfsFile>> {
        if mode.is_write() {
            return self.writer(path)?.open(path, mode);
        }
        self.probe(path, |fs| fs.open(path, mode))
    }

    fn is_file(&self, path: &str) -> bool {
        self.first_containing(path).is_some_and(|fs| fs.is_file(path))
    }

    fn is_dir(&self, path: &str) -> bool {
        self.first_containing(path).is_some_and(|fs| fs.is_dir(path))
    }

    fn exists(&self, path: &str) -> bool {
        self.first_containing(path).is_some()
    }

    fn list_dir(&self, path: &str) -> VfsResult<Vec<String>> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut found = false;
        for fs in self.snapshot() {
            match fs.list_dir(path) {
                Ok(listed) => {
                    found = true;
                    for name in listed {
                        if seen.insert(name.clone()) {
                            names.push(name);
                        }
                    }
                }
                Err(e) if e.is_not_found() => {}
                // The first member with an answer decides.
                Err(e) if !found => return Err(e),
                Err(e) => trace!(path, error = %e, "ignoring listing error from overlay member"),
            }
        }
        if !found {
            return Err(VfsError::not_found(path));
        }
        Ok(names)
    }

    fn make_dir(&self, path: &str, recursive: bool, allow_existing: bool) -> VfsResult<()> {
        self.writer(path)?.make_dir(path, recursive, allow_existing)
    }

    fn remove(&self, path: &str) -> VfsResult<()> {
        self.writer(path)?.remove(path)
    }

    fn remove_dir(&self, path: &str, recursive: bool) -> VfsResult<()> {
        self.writer(path)?.remove_dir(path, recursive)
    }

    fn rename(&self, src: &str, dst: &str) -> VfsResult<()> {
        self.writer(src)?.rename(src, dst)
    }

    fn info(&self, path: &str) -> VfsResult<ResourceInfo> {
        self.probe(path, |fs| fs.info(path))
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::ThreadSafe => {
                self.snapshot().iter().all(|fs| fs.supports(Capability::ThreadSafe))
            }
            Capability::Write | Capability::AtomicRename => {
                self.writer("").is_ok_and(|fs| fs.supports(capability))
            }
            Capability::Virtual => true,
            Capability::CaseInsensitivePaths => false,
        }
    }
}
