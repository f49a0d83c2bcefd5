//! Virtual path helpers.
//!
//! Virtual paths use `/` as their only separator. A leading `/` marks an
//! absolute path; backends key their entries by the relative form, where the
//! empty string is the root. `\` is accepted on input and rewritten to `/`.
//!
//! Everything here is pure string manipulation: nothing touches a backend.

use crate::error::{VfsError, VfsResult};

/// The one path separator.
pub const SEPARATOR: char = '/';

/// Collapse `.`, `..`, repeated separators and trailing separators.
///
/// Absolute paths stay absolute (`/` is the absolute root, `""` the relative
/// one). Ascending above the root fails with `PathInvalid`.
///
/// ```
/// use kasane_vfs::path::normalize;
///
/// assert_eq!(normalize("a//b/../c").unwrap(), "a/c");
/// assert_eq!(normalize("/a/./b/").unwrap(), "/a/b");
/// assert!(normalize("../x").is_err());
/// ```
pub fn normalize(path: &str) -> VfsResult<String> {
    let absolute = path.starts_with(['/', '\\']);
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(VfsError::path_invalid(path).with_source("path ascends above root"));
                }
            }
            name => parts.push(name),
        }
    }
    let joined = parts.join("/");
    Ok(if absolute { format!("/{joined}") } else { joined })
}

/// Normalize, then force the absolute form.
pub fn normalize_absolute(path: &str) -> VfsResult<String> {
    normalize(path).map(|p| abspath(&p))
}

/// Normalize, then force the relative form used as a backend key.
pub fn normalize_relative(path: &str) -> VfsResult<String> {
    normalize(path).map(|p| relpath(&p).to_string())
}

/// Prefix a `/` if the path lacks one. Does not normalize.
pub fn abspath(path: &str) -> String {
    if path.starts_with(SEPARATOR) {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Strip leading separators. Does not normalize.
pub fn relpath(path: &str) -> &str {
    path.trim_start_matches(SEPARATOR)
}

/// Join `tail` onto `base` and normalize the result.
///
/// An absolute `tail` replaces `base` entirely.
pub fn join(base: &str, tail: &str) -> VfsResult<String> {
    if base.is_empty() || tail.starts_with(['/', '\\']) {
        return normalize(tail);
    }
    normalize(&format!("{base}/{tail}"))
}

/// Append a single name to a directory path without normalizing.
///
/// An empty name yields the directory itself.
pub fn child(dir: &str, name: &str) -> String {
    if name.is_empty() {
        dir.to_string()
    } else if dir.is_empty() {
        name.to_string()
    } else if dir.ends_with(SEPARATOR) {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Split into `(head, tail)` at the last separator.
///
/// Trailing separators are ignored. The head of a top-level absolute path is
/// `/`; a path without separators has an empty head.
pub fn split(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() {
        return (if path.is_empty() { "" } else { "/" }, "");
    }
    match trimmed.rsplit_once(SEPARATOR) {
        Some(("", tail)) => ("/", tail),
        Some((head, tail)) => (head, tail),
        None => ("", trimmed),
    }
}

/// Everything before the final component.
pub fn dirname(path: &str) -> &str {
    split(path).0
}

/// The final component.
pub fn basename(path: &str) -> &str {
    split(path).1
}

/// Non-empty components, in order. Leading and repeated separators vanish.
pub fn components(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|c| !c.is_empty())
}

/// True for a path with no components, such as `/` or `""`.
pub fn is_root(path: &str) -> bool {
    components(path).next().is_none()
}

/// True if `child` is `parent` or lies beneath it.
///
/// Both sides are normalized first, so a leading `/` is insignificant and
/// `/foo` is not a parent of `/foobar`.
pub fn is_parent(parent: &str, child: &str) -> bool {
    let (Ok(parent), Ok(child)) = (normalize(parent), normalize(child)) else {
        return false;
    };
    let mut child_parts = components(&child);
    components(&parent).all(|p| child_parts.next() == Some(p))
}

/// The relative remainder of `path` beneath `base`, or `None` if `path` is not
/// under `base`. Both must already be normalized.
pub fn relative_to(base: &str, path: &str) -> Option<String> {
    let mut rest = components(path);
    for part in components(base) {
        if rest.next() != Some(part) {
            return None;
        }
    }
    Some(rest.collect::<Vec<_>>().join("/"))
}

/// Every ancestor of a normalized path, outermost first, ending with the path
/// itself. The root is not included.
///
/// `"/a/b/c"` yields `["/a", "/a/b", "/a/b/c"]`.
pub fn prefixes(path: &str) -> Vec<String> {
    let absolute = path.starts_with(SEPARATOR);
    let mut current = String::new();
    let mut out = Vec::new();
    for part in components(path) {
        if absolute || !current.is_empty() {
            current.push(SEPARATOR);
        }
        current.push_str(part);
        out.push(current.clone());
    }
    out
}
