//! Default implementations of the derived operations.
//!
//! Each function here is written purely against the primitives of
//! [`Filesystem`], so it works on any backend or composition. The trait's
//! default methods call straight into this module; an implementation that
//! overrides a method can still fall back to the function here.
//!
//! Nothing here swallows a primitive's error unless the caller asked for it
//! through `ignore_errors`.

use std::io::{self, Read, Write};

use tracing::{debug, instrument, trace, warn};

use crate::error::{IoResultExt, VfsError, VfsResult};
use crate::file::{NullFile, VfsFile};
use crate::ops::Filesystem;
use crate::path;
use crate::types::{
    Capability, CopyOptions, EntryFilter, ListOptions, OpenMode, ResourceInfo, Wildcard,
};
use crate::walk::{Walk, WalkIter, WalkOptions, WalkOrder, WalkStep};

/// Capabilities assumed by a backend that does not say otherwise: thread-safe
/// and writable, nothing else.
pub fn default_supports(capability: Capability) -> bool {
    matches!(capability, Capability::ThreadSafe | Capability::Write)
}

pub fn exists<F: Filesystem + ?Sized>(fs: &F, path: &str) -> bool {
    fs.is_file(path) || fs.is_dir(path)
}

/// The error for a source that is not a file: `ResourceInvalid` if it is a
/// directory, otherwise `NotFound`.
fn not_a_file<F: Filesystem + ?Sized>(fs: &F, path: &str) -> VfsError {
    if fs.is_dir(path) {
        VfsError::resource_invalid(path).with_source("expected a file, found a directory")
    } else {
        VfsError::not_found(path)
    }
}

fn not_a_dir<F: Filesystem + ?Sized>(fs: &F, path: &str) -> VfsError {
    if fs.is_file(path) {
        VfsError::resource_invalid(path).with_source("expected a directory, found a file")
    } else {
        VfsError::not_found(path)
    }
}

/// Stream `reader` into `writer` through a buffer of `chunk_size` bytes.
fn pump(
    reader: &mut dyn VfsFile,
    writer: &mut dyn VfsFile,
    chunk_size: usize,
    src: &str,
    dst: &str,
) -> VfsResult<u64> {
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(VfsError::from_io(src, e)),
        };
        writer.write_all(&buf[..n]).vfs(dst)?;
        total += n as u64;
    }
    writer.flush().vfs(dst)?;
    Ok(total)
}

/// Whether `a` and `b` name the same resource once normalized.
fn same_path(a: &str, b: &str) -> bool {
    matches!(
        (path::normalize_absolute(a), path::normalize_absolute(b)),
        (Ok(a), Ok(b)) if a == b
    )
}

pub fn copy<F: Filesystem + ?Sized>(
    fs: &F,
    src: &str,
    dst: &str,
    options: CopyOptions,
) -> VfsResult<()> {
    if !fs.is_file(src) {
        return Err(not_a_file(fs, src));
    }
    // Opening the destination for writing would truncate the source.
    if same_path(src, dst) {
        trace!(src, "copy onto itself, nothing to do");
        return Ok(());
    }
    if !options.overwrite && fs.exists(dst) {
        return Err(VfsError::already_exists(dst));
    }
    let mut reader = fs.open(src, OpenMode::read())?;
    let mut writer = fs.open(dst, OpenMode::write())?;
    let bytes = pump(&mut *reader, &mut *writer, options.chunk_size, src, dst)?;
    trace!(src, dst, bytes, "copied file");
    Ok(())
}

pub fn move_file<F: Filesystem + ?Sized>(
    fs: &F,
    src: &str,
    dst: &str,
    options: CopyOptions,
) -> VfsResult<()> {
    if same_path(src, dst) {
        return if fs.is_file(src) { Ok(()) } else { Err(not_a_file(fs, src)) };
    }
    fs.copy(src, dst, options)?;
    fs.remove(src)
}

/// Check the preconditions shared by `copy_dir` and `move_dir`.
fn check_tree_transfer<F: Filesystem + ?Sized>(
    fs: &F,
    src: &str,
    dst: &str,
    options: CopyOptions,
) -> VfsResult<()> {
    if !fs.is_dir(src) {
        return Err(not_a_dir(fs, src));
    }
    if path::is_parent(src, dst) {
        return Err(
            VfsError::path_invalid(dst).with_source("destination is inside the source directory")
        );
    }
    if !options.overwrite && fs.exists(dst) {
        return Err(VfsError::already_exists(dst));
    }
    fs.make_dir(dst, false, options.overwrite)
}

/// Where a directory visited while walking `src` lands under `dst`.
fn rebase(src: &str, dst: &str, dir: &str) -> VfsResult<String> {
    let src = path::normalize(src)?;
    let dir = path::normalize(dir)?;
    let rel =
        path::relative_to(&src, &dir).ok_or_else(|| VfsError::path_invalid(dir.as_str()))?;
    Ok(path::child(dst, &rel))
}

/// Log and discard the error in `result` when `ignore_errors` is set.
fn tolerate(result: VfsResult<()>, ignore_errors: bool) -> VfsResult<()> {
    match result {
        Err(e) if ignore_errors => {
            let kind: &'static str = e.kind().into();
            warn!(path = e.path(), kind, error = %e, "ignoring failure during tree transfer");
            Ok(())
        }
        other => other,
    }
}

#[instrument(level = "debug", skip(fs, options), fields(overwrite = options.overwrite))]
pub fn copy_dir<F: Filesystem + ?Sized>(
    fs: &F,
    src: &str,
    dst: &str,
    options: CopyOptions,
) -> VfsResult<()> {
    check_tree_transfer(fs, src, dst, options)?;
    let walk_options = WalkOptions::new().ignore_errors(options.ignore_errors);
    for step in Walk::new(fs, src, walk_options) {
        let step = step?;
        let target_dir = rebase(src, dst, &step.dir)?;
        tolerate(fs.make_dir(&target_dir, true, true), options.ignore_errors)?;
        for name in &step.files {
            let from = path::child(&step.dir, name);
            let to = path::child(&target_dir, name);
            tolerate(fs.copy(&from, &to, options), options.ignore_errors)?;
        }
    }
    debug!("copied directory");
    Ok(())
}

#[instrument(level = "debug", skip(fs, options), fields(overwrite = options.overwrite))]
pub fn move_dir<F: Filesystem + ?Sized>(
    fs: &F,
    src: &str,
    dst: &str,
    options: CopyOptions,
) -> VfsResult<()> {
    check_tree_transfer(fs, src, dst, options)?;
    let walk_options = WalkOptions::new()
        .order(WalkOrder::PostOrder)
        .ignore_errors(options.ignore_errors);
    for step in Walk::new(fs, src, walk_options) {
        let step = step?;
        let target_dir = rebase(src, dst, &step.dir)?;
        tolerate(fs.make_dir(&target_dir, true, true), options.ignore_errors)?;
        for name in &step.files {
            let from = path::child(&step.dir, name);
            let to = path::child(&target_dir, name);
            tolerate(fs.move_file(&from, &to, options), options.ignore_errors)?;
        }
        tolerate(fs.remove_dir(&step.dir, false), options.ignore_errors)?;
    }
    debug!("moved directory");
    Ok(())
}

pub fn walk<'a, F: Filesystem + ?Sized>(
    fs: &'a F,
    path: &str,
    options: WalkOptions,
) -> WalkIter<'a, WalkStep> {
    Box::new(Walk::new(fs, path, options))
}

pub fn walk_files<'a, F: Filesystem + ?Sized>(
    fs: &'a F,
    path: &str,
    wildcard: Option<Wildcard>,
) -> WalkIter<'a, String> {
    let options = WalkOptions {
        wildcard,
        ..Default::default()
    };
    Box::new(Walk::new(fs, path, options).flat_map(|step| match step {
        Ok(step) => step.file_paths().map(Ok).collect::<Vec<_>>(),
        Err(e) => vec![Err(e)],
    }))
}

pub fn walk_dirs<'a, F: Filesystem + ?Sized>(
    fs: &'a F,
    path: &str,
    wildcard: Option<Wildcard>,
) -> WalkIter<'a, String> {
    Box::new(Walk::new(fs, path, WalkOptions::new()).filter_map(move |step| match step {
        Ok(step) => {
            let keep = wildcard.as_ref().is_none_or(|w| w.matches(path::basename(&step.dir)));
            keep.then_some(Ok(step.dir))
        }
        Err(e) => Some(Err(e)),
    }))
}

pub fn size<F: Filesystem + ?Sized>(fs: &F, path: &str) -> VfsResult<u64> {
    if !fs.is_dir(path) {
        return fs.info(path).map(|info| info.size);
    }
    let mut total = 0;
    for file in fs.walk_files(path, None) {
        total += fs.info(&file?)?.size;
    }
    Ok(total)
}

pub fn is_dir_empty<F: Filesystem + ?Sized>(fs: &F, path: &str) -> VfsResult<bool> {
    if !fs.is_dir(path) {
        return Err(not_a_dir(fs, path));
    }
    Ok(fs.list_dir(path)?.is_empty())
}

pub fn safe_open<F: Filesystem + ?Sized>(fs: &F, path: &str, mode: OpenMode) -> Box<dyn VfsFile> {
    fs.open(path, mode).unwrap_or_else(|e| {
        debug!(path, error = %e, "safe_open falling back to null file");
        Box::new(NullFile)
    })
}

pub fn read_all<F: Filesystem + ?Sized>(fs: &F, path: &str) -> VfsResult<Vec<u8>> {
    let mut file = fs.open(path, OpenMode::read())?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).vfs(path)?;
    Ok(buf)
}

pub fn read_to_string<F: Filesystem + ?Sized>(fs: &F, path: &str) -> VfsResult<String> {
    let bytes = fs.read_all(path)?;
    String::from_utf8(bytes).map_err(|e| VfsError::resource_invalid(path).with_source(e))
}

pub fn write_all<F: Filesystem + ?Sized>(fs: &F, path: &str, data: &[u8]) -> VfsResult<()> {
    let mut file = fs.open(path, OpenMode::write())?;
    file.write_all(data).vfs(path)?;
    file.flush().vfs(path)
}

pub fn list_dir_with<F: Filesystem + ?Sized>(
    fs: &F,
    path: &str,
    options: &ListOptions,
) -> VfsResult<Vec<String>> {
    let mut out = Vec::new();
    for name in fs.list_dir(path)? {
        if options.wildcard.as_ref().is_some_and(|w| !w.matches(&name)) {
            continue;
        }
        let full = path::child(path, &name);
        let keep = match options.filter {
            EntryFilter::All => true,
            EntryFilter::FilesOnly => fs.is_file(&full),
            EntryFilter::DirsOnly => fs.is_dir(&full),
        };
        if keep {
            out.push(if options.full { full } else { name });
        }
    }
    Ok(out)
}

pub fn list_dir_info<F: Filesystem + ?Sized>(
    fs: &F,
    path: &str,
) -> VfsResult<Vec<(String, ResourceInfo)>> {
    fs.list_dir(path)?
        .into_iter()
        .map(|name| {
            let info = fs.info(&path::child(path, &name))?;
            Ok((name, info))
        })
        .collect()
}
