//! A directory of another filesystem presented as a root.

use std::sync::Arc;

use crate::error::{VfsError, VfsResult};
use crate::file::VfsFile;
use crate::ops::Filesystem;
use crate::path;
use crate::types::{Capability, CopyOptions, OpenMode, ResourceInfo};

/// Exposes one directory of a parent filesystem as `/`.
///
/// Every path is normalized before it is joined onto the bound directory, so
/// `..` can never reach outside it: such paths fail with `PathInvalid`.
/// Errors coming back from the parent are reported with view paths.
pub struct SubView {
    parent: Arc<dyn Filesystem>,
    /// Normalized absolute path of the bound directory in the parent.
    root: String,
}

impl std::fmt::Debug for SubView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubView").field("root", &self.root).finish()
    }
}

impl SubView {
    /// Bind `dir` of `parent`, which must be an existing directory.
    pub fn new(parent: Arc<dyn Filesystem>, dir: &str) -> VfsResult<Self> {
        let root = path::normalize_absolute(dir)?;
        if !parent.is_dir(&root) {
            return Err(if parent.is_file(&root) {
                VfsError::resource_invalid(root).with_source("cannot open a file as a directory")
            } else {
                VfsError::not_found(root)
            });
        }
        Ok(Self { parent, root })
    }

    /// Path of the bound directory in the parent.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn parent(&self) -> &Arc<dyn Filesystem> {
        &self.parent
    }

    /// The parent path for a view path.
    fn delegate(&self, path: &str) -> VfsResult<String> {
        let inner = path::normalize_relative(path).map_err(|e| e.with_path(path))?;
        Ok(path::child(&self.root, &inner))
    }

    /// Re-express a parent error in view coordinates, falling back to the
    /// caller's path when the parent reported something outside the view.
    fn reroot(&self, err: VfsError, fallback: &str) -> VfsError {
        let view_path = path::normalize_absolute(err.path())
            .ok()
            .and_then(|p| path::relative_to(&self.root, &p))
            .map(|rel| path::abspath(&rel));
        match view_path {
            Some(p) => err.with_path(p),
            None => err.with_path(fallback),
        }
    }

    fn is_view_root(&self, inner: &str) -> bool {
        inner == self.root
    }

    fn root_refused(cause: &'static str) -> VfsError {
        VfsError::resource_invalid("/").with_source(cause)
    }
}

/// Open a directory of a shared filesystem as a [`SubView`].
pub trait OpenDir {
    /// View an existing directory.
    fn open_dir(&self, dir: &str) -> VfsResult<SubView>;

    /// Create the directory (and with `recursive`, its ancestors) if missing,
    /// then view it.
    fn make_open_dir(&self, dir: &str, recursive: bool) -> VfsResult<SubView>;
}

impl OpenDir for Arc<dyn Filesystem> {
    fn open_dir(&self, dir: &str) -> VfsResult<SubView> {
        SubView::new(Arc::clone(self), dir)
    }

    fn make_open_dir(&self, dir: &str, recursive: bool) -> VfsResult<SubView> {
        self.make_dir(dir, recursive, true)?;
        SubView::new(Arc::clone(self), dir)
    }
}

/// Nested views bind straight to the parent, so lookups never stack.
impl OpenDir for SubView {
    fn open_dir(&self, dir: &str) -> VfsResult<SubView> {
        let inner = self.delegate(dir)?;
        SubView::new(Arc::clone(&self.parent), &inner).map_err(|e| self.reroot(e, dir))
    }

    fn make_open_dir(&self, dir: &str, recursive: bool) -> VfsResult<SubView> {
        self.make_dir(dir, recursive, true)?;
        self.open_dir(dir)
    }
}

impl Filesystem for SubView {
    fn open(&self, path: &str, mode: OpenMode) -> VfsResult<Box<dyn VfsFile>> {
        let inner = self.delegate(path)?;
        self.parent.open(&inner, mode).map_err(|e| self.reroot(e, path))
    }

    fn is_file(&self, path: &str) -> bool {
        self.delegate(path).is_ok_and(|inner| self.parent.is_file(&inner))
    }

    fn is_dir(&self, path: &str) -> bool {
        self.delegate(path).is_ok_and(|inner| self.parent.is_dir(&inner))
    }

    fn list_dir(&self, path: &str) -> VfsResult<Vec<String>> {
        let inner = self.delegate(path)?;
        self.parent.list_dir(&inner).map_err(|e| self.reroot(e, path))
    }

    fn make_dir(&self, path: &str, recursive: bool, allow_existing: bool) -> VfsResult<()> {
        let inner = self.delegate(path)?;
        self.parent
            .make_dir(&inner, recursive, allow_existing)
            .map_err(|e| self.reroot(e, path))
    }

    fn remove(&self, path: &str) -> VfsResult<()> {
        let inner = self.delegate(path)?;
        self.parent.remove(&inner).map_err(|e| self.reroot(e, path))
    }

    fn remove_dir(&self, path: &str, recursive: bool) -> VfsResult<()> {
        let inner = self.delegate(path)?;
        if self.is_view_root(&inner) {
            return Err(Self::root_refused("cannot remove the root of a sub-view"));
        }
        self.parent.remove_dir(&inner, recursive).map_err(|e| self.reroot(e, path))
    }

    fn rename(&self, src: &str, dst: &str) -> VfsResult<()> {
        let (from, to) = (self.delegate(src)?, self.delegate(dst)?);
        if self.is_view_root(&from) {
            return Err(Self::root_refused("cannot rename the root of a sub-view"));
        }
        self.parent.rename(&from, &to).map_err(|e| self.reroot(e, src))
    }

    fn info(&self, path: &str) -> VfsResult<ResourceInfo> {
        let inner = self.delegate(path)?;
        self.parent.info(&inner).map_err(|e| self.reroot(e, path))
    }

    fn supports(&self, capability: Capability) -> bool {
        self.parent.supports(capability)
    }

    fn copy(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        let (from, to) = (self.delegate(src)?, self.delegate(dst)?);
        self.parent.copy(&from, &to, options).map_err(|e| self.reroot(e, src))
    }

    fn copy_dir(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        let (from, to) = (self.delegate(src)?, self.delegate(dst)?);
        self.parent.copy_dir(&from, &to, options).map_err(|e| self.reroot(e, src))
    }

    fn move_file(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        let (from, to) = (self.delegate(src)?, self.delegate(dst)?);
        self.parent.move_file(&from, &to, options).map_err(|e| self.reroot(e, src))
    }

    fn move_dir(&self, src: &str, dst: &str, options: CopyOptions) -> VfsResult<()> {
        let (from, to) = (self.delegate(src)?, self.delegate(dst)?);
        if self.is_view_root(&from) {
            return Err(Self::root_refused("cannot move the root of a sub-view"));
        }
        self.parent.move_dir(&from, &to, options).map_err(|e| self.reroot(e, src))
    }
}
