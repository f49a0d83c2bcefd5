//! Declarative mount tables.
//!
//! A [`MountConfig`] is read from RON and turned into a [`MountTable`] by
//! looking backend names up in a [`BackendRegistry`]:
//!
//! ```ron
//! (
//!     mounts: [
//!         (path: "/scratch", backend: "scratch"),
//!         (path: "/assets", backend: "assets", root: Some("public"), read_only: true),
//!     ],
//!     fallback: Some("root"),
//!     copy_chunk_size: Some(65536),
//! )
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::VfsError;
use crate::mount::MountTable;
use crate::ops::Filesystem;
use crate::readonly::ReadOnly;
use crate::subview::SubView;
use crate::types::CopyOptions;

/// Named backends a config may refer to.
pub type BackendRegistry = HashMap<String, Arc<dyn Filesystem>>;

/// Errors from loading or building a mount config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("unknown backend: {0}")]
    UnknownBackend(String),
    #[error("VFS error: {0}")]
    Vfs(#[from] VfsError),
}

/// One mount in a [`MountConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountEntry {
    /// Mount point in the table.
    pub path: String,
    /// Registry name of the backend.
    pub backend: String,
    /// Mount only this directory of the backend.
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub read_only: bool,
}

/// A mount table described as data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConfig {
    #[serde(default)]
    pub mounts: Vec<MountEntry>,
    /// Registry name of the backend that takes unmounted paths.
    #[serde(default)]
    pub fallback: Option<String>,
    /// Buffer size for copies made with options derived from this config.
    #[serde(default)]
    pub copy_chunk_size: Option<usize>,
}

impl MountConfig {
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    /// Build the described mount table.
    ///
    /// Fails on the first mount whose backend is missing from `registry` or
    /// whose `root` is not a directory of that backend.
    pub fn build(&self, registry: &BackendRegistry) -> Result<MountTable, ConfigError> {
        let table = MountTable::new();

        for entry in &self.mounts {
            let mut fs = lookup(registry, &entry.backend)?;
            if let Some(root) = &entry.root {
                fs = Arc::new(SubView::new(fs, root)?);
            }
            if entry.read_only {
                fs = Arc::new(ReadOnly::<dyn Filesystem>::new(fs));
            }
            table.mount_arc(&entry.path, fs)?;
            debug!(
                mount_point = %entry.path,
                backend = %entry.backend,
                root = ?entry.root,
                read_only = entry.read_only,
                "configured mount"
            );
        }

        if let Some(name) = &self.fallback {
            table.set_fallback(Some(lookup(registry, name)?));
        }
        Ok(table)
    }
}

fn lookup(registry: &BackendRegistry, name: &str) -> Result<Arc<dyn Filesystem>, ConfigError> {
    registry
        .get(name)
        .cloned()
        .ok_or_else(|| ConfigError::UnknownBackend(name.to_string()))
}

impl From<&MountConfig> for CopyOptions {
    fn from(config: &MountConfig) -> Self {
        match config.copy_chunk_size {
            Some(size) if size > 0 => CopyOptions::new().chunk_size(size),
            _ => CopyOptions::new(),
        }
    }
}
