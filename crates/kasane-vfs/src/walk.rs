//! Lazy directory tree traversal.
//!
//! [`Walk`] keeps an explicit stack instead of recursing, lists each
//! directory only when the iterator reaches it, and yields one [`WalkStep`]
//! per directory: the directory's path and the names of the files directly
//! inside it.

use tracing::warn;

use crate::error::VfsResult;
use crate::ops::Filesystem;
use crate::path;
use crate::types::Wildcard;

/// Boxed iterator returned by the walk family of trait methods.
pub type WalkIter<'a, T> = Box<dyn Iterator<Item = VfsResult<T>> + Send + 'a>;

/// When a directory is yielded relative to its subdirectories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WalkOrder {
    /// A directory before anything beneath it.
    #[default]
    PreOrder,
    /// A directory after everything beneath it.
    PostOrder,
}

#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Keep only files whose name matches.
    pub wildcard: Option<Wildcard>,
    /// Descend only into directories whose name matches.
    pub dir_wildcard: Option<Wildcard>,
    pub order: WalkOrder,
    /// Skip directories that cannot be listed instead of yielding the error.
    pub ignore_errors: bool,
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wildcard(mut self, wildcard: Wildcard) -> Self {
        self.wildcard = Some(wildcard);
        self
    }

    pub fn dir_wildcard(mut self, wildcard: Wildcard) -> Self {
        self.dir_wildcard = Some(wildcard);
        self
    }

    pub fn order(mut self, order: WalkOrder) -> Self {
        self.order = order;
        self
    }

    pub fn ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }
}

/// One directory visited by a walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkStep {
    /// Directory path, built by appending names to the walk root.
    pub dir: String,
    /// Names of the files directly inside `dir` that passed the wildcard.
    pub files: Vec<String>,
}

impl WalkStep {
    /// Full paths of this step's files.
    pub fn file_paths(&self) -> impl Iterator<Item = String> + '_ {
        self.files.iter().map(|name| path::child(&self.dir, name))
    }
}

enum Frame {
    Enter(String),
    Leave(WalkStep),
}

/// Depth-first walk over any [`Filesystem`].
///
/// A directory that cannot be listed yields its error (or is skipped with
/// `ignore_errors`); the walk then carries on with whatever is still queued.
pub struct Walk<'a, F: ?Sized> {
    fs: &'a F,
    options: WalkOptions,
    stack: Vec<Frame>,
}

impl<'a, F: Filesystem + ?Sized> Walk<'a, F> {
    pub fn new(fs: &'a F, root: &str, options: WalkOptions) -> Self {
        Self {
            fs,
            options,
            stack: vec![Frame::Enter(root.to_string())],
        }
    }

    /// List `dir`, splitting it into matching file names and subdirectory paths.
    fn expand(&self, dir: &str) -> VfsResult<(Vec<String>, Vec<String>)> {
        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for name in self.fs.list_dir(dir)? {
            let child = path::child(dir, &name);
            if self.fs.is_dir(&child) {
                if self.options.dir_wildcard.as_ref().is_none_or(|w| w.matches(&name)) {
                    subdirs.push(child);
                }
            } else if self.options.wildcard.as_ref().is_none_or(|w| w.matches(&name)) {
                files.push(name);
            }
        }
        Ok((files, subdirs))
    }
}

impl<F: Filesystem + ?Sized> Iterator for Walk<'_, F> {
    type Item = VfsResult<WalkStep>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            let dir = match frame {
                Frame::Leave(step) => return Some(Ok(step)),
                Frame::Enter(dir) => dir,
            };

            let (files, subdirs) = match self.expand(&dir) {
                Ok(listing) => listing,
                Err(e) if self.options.ignore_errors => {
                    warn!(dir = %dir, error = %e, "skipping unreadable directory");
                    continue;
                }
                Err(e) => return Some(Err(e)),
            };

            let step = WalkStep { dir, files };
            if self.options.order == WalkOrder::PostOrder {
                self.stack.push(Frame::Leave(step));
                self.stack.extend(subdirs.into_iter().rev().map(Frame::Enter));
                continue;
            }
            self.stack.extend(subdirs.into_iter().rev().map(Frame::Enter));
            return Some(Ok(step));
        }
        None
    }
}
