//! Byte-stream sources for tree assets.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{RenderError, Result};

/// Fetches the raw bytes of an asset by path.
pub trait AssetSource: Send + Sync {
    fn load(&self, path: &str) -> Result<Vec<u8>>;
}

impl<S: AssetSource + ?Sized> AssetSource for Arc<S> {
    fn load(&self, path: &str) -> Result<Vec<u8>> {
        (**self).load(path)
    }
}

impl<S: AssetSource + ?Sized> AssetSource for Box<S> {
    fn load(&self, path: &str) -> Result<Vec<u8>> {
        (**self).load(path)
    }
}

/// Loads assets from files below a root directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsSource {
    fn load(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.root.join(path);
        log::debug!("reading {}", full.display());
        std::fs::read(&full).map_err(|err| match err.kind() {
            ErrorKind::NotFound => RenderError::NotFound(path.to_string()),
            _ => RenderError::Io(err),
        })
    }
}

/// Serves assets from memory and counts loads.
#[derive(Debug, Default)]
pub struct MemorySource {
    assets: HashMap<String, Vec<u8>>,
    loads: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an asset under `path`.
    pub fn with_asset(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.assets.insert(path.into(), bytes);
        self
    }

    /// Number of successful loads served so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl AssetSource for MemorySource {
    fn load(&self, path: &str) -> Result<Vec<u8>> {
        let bytes = self
            .assets
            .get(path)
            .cloned()
            .ok_or_else(|| RenderError::NotFound(path.to_string()))?;
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(bytes)
    }
}
