//! VFS mount table with longest-prefix routing.
//!
//! Routes filesystem operations to the appropriate backend based on path.
//! Paths that lead to a mount point but are not themselves inside any mount
//! (`/`, or `/mnt` when only `/mnt/project` is mounted) are virtual
//! directories: they always exist, list the next component of every mount
//! beneath them, and cannot be removed or written to.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::derived;
use crate::error::{VfsError, VfsResult};
use crate::file::VfsFile;
use crate::ops::Filesystem;
use crate::path;
use crate::types::{Capability, CopyOptions, OpenMode, ResourceInfo};

/// Information about a mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// The mount path (e.g., "/mnt/project").
    pub path: String,
    /// Whether the mounted filesystem refuses writes.
    pub read_only: bool,
    /// Whether the mounted filesystem advertises thread safety.
    pub thread_safe: bool,
}

/// Where a path ends up after routing.
struct Route {
    fs: Arc<dyn Filesystem>,
    /// `None` when the fallback took the path unchanged.
    mount_point: Option<String>,
    /// Path handed to `fs`.
    inner: String,
}

impl Route {
    /// Re-express an error from the routed filesystem in table coordinates.
    fn reroot(&self, err: VfsError) -> VfsError {
        match &self.mount_point {
            Some(mount_point) => {
                let outer = path::child(mount_point, path::relpath(err.path()));
                err.with_path(outer)
            }
            None => err,
        }
    }

    fn same_target(&self, other: &Route) -> bool {
        Arc::ptr_eq(&self.fs, &other.fs) && self.mount_point == other.mount_point
    }
}

/// Routes filesystem operations to mounted backends.
///
/// Mount points are matched by longest prefix. For example, if `/mnt` and
/// `/mnt/project` are both mounted, a path like `/mnt/project/src/main.rs`
/// will be routed to the `/mnt/project` mount as `src/main.rs`.
///
/// A path no mount claims goes to the fallback filesystem unchanged, or
/// fails with `NotFound` when there is no fallback.
pub struct MountTable {
    /// Mount points, keyed by normalized absolute path.
    mounts: RwLock<BTreeMap<String, Arc<dyn Filesystem>>>,
    fallback: RwLock<Option<Arc<dyn Filesystem>>>,
}

impl std::fmt::Debug for MountTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mounts: Vec<String> = self.mounts.read().keys().cloned().collect();
        f.debug_struct("MountTable")
            .field("mounts", &mounts)
            .field("fallback", &self.fallback.read().is_some())
            .finish()
    }
}

impl Default for MountTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MountTable {
    /// Create a new empty mount table.
    pub fn new() -> Self {
        Self {
            mounts: RwLock::new(BTreeMap::new()),
            fallback: RwLock::new(None),
        }
    }

    /// Create a table whose unclaimed paths go to `fs`.
    pub fn with_fallback(fs: Arc<dyn Filesystem>) -> Self {
        let table = Self::new();
        table.set_fallback(Some(fs));
        table
    }

    /// Replace (or clear) the fallback filesystem.
    pub fn set_fallback(&self, fs: Option<Arc<dyn Filesystem>>) {
        debug!(present = fs.is_some(), "setting mount table fallback");
        *self.fallback.write() = fs;
    }

    /// Mount a filesystem at the given path.
    ///
    /// If a filesystem is already mounted at this path, it will be replaced.
    pub fn mount(&self, path: &str, fs: impl Filesystem + 'static) -> VfsResult<()> {
        self.mount_arc(path, Arc::new(fs))
    }

    /// Mount a filesystem (already wrapped in Arc) at the given path.
    pub fn mount_arc(&self, path: &str, fs: Arc<dyn Filesystem>) -> VfsResult<()> {
        let path = path::normalize_absolute(path)?;
        let replaced = self.mounts.write().insert(path.clone(), fs).is_some();
        debug!(mount_point = %path, replaced, "mounted filesystem");
        Ok(())
    }

    /// Unmount the filesystem at the given path.
    ///
    /// Returns `true` if a mount was removed, `false` if nothing was mounted there.
    pub fn unmount(&self, path: &str) -> bool {
        let Ok(path) = path::normalize_absolute(path) else {
            return false;
        };
        let removed = self.mounts.write().remove(&path).is_some();
        debug!(mount_point = %path, removed, "unmount");
        removed
    }

    /// List all current mounts, ordered by path.
    pub fn list_mounts(&self) -> Vec<MountInfo> {
        self.mounts
            .read()
            .iter()
            .map(|(path, fs)| MountInfo {
                path: path.clone(),
                read_only: !fs.supports(Capability::Write),
                thread_safe: fs.supports(Capability::ThreadSafe),
            })
            .collect()
    }

    /// Find the filesystem responsible for a normalized absolute path.
    ///
    /// Returns `None` when no mount claims it and there is no fallback.
    fn resolve(&self, abs: &str) -> Option<Route> {
        let best = {
            let mounts = self.mounts.read();
            mounts
                .iter()
                .filter_map(|(mount_point, fs)| {
                    path::relative_to(mount_point, abs)
                        .map(|rel| (mount_point.clone(), Arc::clone(fs), rel))
                })
                .max_by_key(|(mount_point, _, _)| mount_point.len())
        };

        match best {
            Some((mount_point, fs, inner)) => {
                trace!(path = abs, mount = %mount_point, inner = %inner, "resolved to mount");
                Some(Route {
                    fs,
                    mount_point: Some(mount_point),
                    inner,
                })
            }
            None => self.fallback.read().as_ref().map(|fs| Route {
                fs: Arc::clone(fs),
                mount_point: None,
                inner: abs.to_string(),
            }),
        }
    }

    /// Next path component of every mount strictly beneath `abs`.
    fn virtual_children(&self, abs: &str) -> BTreeSet<String> {
        self.mounts
            .read()
            .keys()
            .filter_map(|mount_point| path::relative_to(abs, mount_point))
            .filter_map(|rel| path::components(&rel).next().map(str::to_string))
            .collect()
    }

    /// The root, a mount point, or an ancestor of a mount point.
    fn is_virtual_dir(&self, abs: &str) -> bool {
        path::is_root(abs)
            || self
                .mounts
                .read()
                .keys()
                .any(|mount_point| path::is_parent(abs, mount_point))
    }

    fn route(&self, abs: &str) -> VfsResult<Route> {
        self.resolve(abs)
            .ok_or_else(|| VfsError::not_found(abs).with_source("no mount point for path"))
    }

    /// Both paths route to the same filesystem instance through the same mount.
    fn same_target(&self, src: &str, dst: &str) -> Option<(Route, Route)> {
        let src = path::normalize_absolute(src).ok()?;
        let dst = path::normalize_absolute(dst).ok()?;
        if self.is_virtual_dir(&src) || self.is_virtual_dir(&dst) {
            return None;
        }
        let (s, d) = (self.resolve(&src)?, self.resolve(&dst)?);
        s.same_target(&d).then_some((s, d))
    }

    fn refuse_virtual(abs: &str, what: &str) -> VfsError {
        VfsError::resource_invalid(abs)
            .with_source(format!("cannot {what} a mount point or virtual directory"))
    }
}

impl Filesystem for MountTable {
    fn open(&self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn VfsFile>> {
        let abs = path::normalize_absolute(path)?;
        if self.is_virtual_dir(&abs) {
            return Err(Self::refuse_virtual(&abs, "open"));
        }
        let route = self.route(&abs)?;
        route.fs.open(&route.inner, mode).map_err(|e| route.reroot(e))
    }

    fn is_file(&self, path: &str) -> bool {
        let Ok(abs) = path::normalize_absolute(path) else { return false };
        if self.is_virtual_dir(&abs) {
            return false;
        }
        self.resolve(&abs).is_some_and(|r| r.fs.is_file(&r.inner))
    }

    fn is_dir(&self, path: &str) -> bool {
        let Ok(abs) = path::normalize_absolute(path) else { return false };
        if self.is_virtual_dir(&abs) {
            return true;
        }
        self.resolve(&abs).is_some_and(|r| r.fs.is_dir(&r.inner))
    }

    fn list_dir(&self, path: &str) -> VfsResult<Vec<String>> {
        let abs = path::normalize_absolute(path)?;
        let virtual_dir = self.is_virtual_dir(&abs);
        let mut names = self.virtual_children(&abs);

        match self.resolve(&abs) {
            Some(route) => match route.fs.list_dir(&route.inner) {
                Ok(listed) => names.extend(listed),
                Err(e) if virtual_dir && e.is_not_found() => {}
                Err(e) => return Err(route.reroot(e)),
            },
            None if virtual_dir => {}
            None => return Err(VfsError::not_found(abs)),
        }
        Ok(names.into_iter().collect())
    }

    fn make_dir(&self, path: &str, recursive: bool, allow_existing: bool) -> VfsResult<()> {
        let abs = path::normalize_absolute(path)?;
        if self.is_virtual_dir(&abs) {
            return if allow_existing {
                Ok(())
            } else {
                Err(VfsError::already_exists(abs))
            };
        }
        let route = self.route(&abs)?;
        route
            .fs
            .make_dir(&route.inner, recursive, allow_existing)
            .map_err(|e| route.reroot(e))
    }

    fn remove(&self, path: &str) -> VfsResult<()> {
        let abs = path::normalize_absolute(path)?;
        if self.is_virtual_dir(&abs) {
            return Err(Self::refuse_virtual(&abs, "remove"));
        }
        let route = self.route(&abs)?;
        route.fs.remove(&route.inner).map_err(|e| route.reroot(e))
    }

    fn remove_dir(&self, path: &str, recursive: bool) -> VfsResult<()> {
        let abs = path::normalize_absolute(path)?;
        if self.is_virtual_dir(&abs) {
            return Err(Self::refuse_virtual(&abs, "remove"));
        }
        let route = self.route(&abs)?;
        route.fs.remove_dir(&route.inner, recursive).map_err(|e| route.reroot(e))
    }

    fn rename(&self, src: &str, dst: &str) -> VfsResult<()> {
        let src_abs = path::normalize_absolute(src)?;
        let dst_abs = path::normalize_absolute(dst)?;
        if self.is_virtual_dir(&src_abs) {
            return Err(Self::refuse_virtual(&src_abs, "rename"));
        }
        if self.is_virtual_dir(&dst_abs) {
            return Err(VfsError::already_exists(dst_abs));
        }

        let from = self.route(&src_abs)?;
        let to = self.route(&dst_abs)?;
        // Both paths must be in the same mount
        if !from.same_target(&to) {
            return Err(VfsError::unsupported(src_abs).with_source("cannot rename across mounts"));
        }
        from.fs.rename(&from.inner, &to.inner).map_err(|e| from.reroot(e))
    }

    fn info(&self, path: &str) -> VfsResult<ResourceInfo> {
        let abs = path::normalize_absolute(path)?;
        let virtual_dir = self.is_virtual_dir(&abs);

        match self.resolve(&abs) {
            Some(route) => match route.fs.info(&route.inner) {
                Ok(info) if !virtual_dir || info.is_dir() => Ok(info),
                Ok(_) => Ok(ResourceInfo::directory()),
                Err(_) if virtual_dir => Ok(ResourceInfo::directory()),
                Err(e) => Err(route.reroot(e)),
            },
            None if virtual_dir => Ok(ResourceInfo::directory()),
            None => Err(VfsError::not_found(abs)),
        }
    }

    fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::ThreadSafe => {
                self.mounts.read().values().all(|fs| fs.supports(Capability::ThreadSafe))
                    && self
                        .fallback
                        .read()
                        .as_ref()
                        .is_none_or(|fs| fs.supports(Capability::ThreadSafe))
            }
            Capability::Write | Capability::Virtual => true,
            Capability::AtomicRename | Capability::CaseInsensitivePaths => false,
        }
    }

    fn copy(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        match self.same_target(src, dst) {
            Some((from, to)) => from
                .fs
                .copy(&from.inner, &to.inner, options)
                .map_err(|e| from.reroot(e)),
            None => derived::copy(self, src, dst, options),
        }
    }

    fn copy_dir(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        match self.same_target(src, dst) {
            Some((from, to)) => from
                .fs
                .copy_dir(&from.inner, &to.inner, options)
                .map_err(|e| from.reroot(e)),
            None => derived::copy_dir(self, src, dst, options),
        }
    }

    fn move_file(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        match self.same_target(src, dst) {
            Some((from, to)) => from
                .fs
                .move_file(&from.inner, &to.inner, options)
                .map_err(|e| from.reroot(e)),
            None => derived::move_file(self, src, dst, options),
        }
    }

    fn move_dir(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        match self.same_target(src, dst) {
            Some((from, to)) => from
                .fs
                .move_dir(&from.inner, &to.inner, options)
                .map_err(|e| from.reroot(e)),
            None => derived::move_dir(self, src, dst, options),
        }
    }
}
