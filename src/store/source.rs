//! Data source abstraction for fetching category documents from a directory or memory.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;

/// Trait for abstracting document I/O (filesystem vs. in-memory).
pub trait CatalogSource {
    /// Fetch the document behind `locator` (which may carry a `?v=` cache-busting query).
    fn fetch(&mut self, locator: &str) -> Result<String>;
}

/// Drop the query string from a locator.
pub fn strip_query(locator: &str) -> &str {
    locator.split_once('?').map(|(path, _)| path).unwrap_or(locator)
}

/// Serves locators relative to a root directory, as a static web server would.
pub struct FsSource {
    root: Utf8PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Filesystem path for a locator such as `/data/spices.json?v=1`.
    pub fn resolve(&self, locator: &str) -> Utf8PathBuf {
        let rel = strip_query(locator)
            .trim_start_matches("./")
            .trim_start_matches('/');
        self.root.join(rel)
    }
}

impl CatalogSource for FsSource {
    fn fetch(&mut self, locator: &str) -> Result<String> {
        let path = self.resolve(locator);
        std::fs::read_to_string(path.as_std_path()).with_context(|| format!("Failed to read {}", path))
    }
}

/// Documents held in memory; records every request so callers can assert on
/// fetch counts.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    documents: HashMap<String, String>,
    requests: Vec<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `body` under `locator` (query string ignored).
    pub fn insert(&mut self, locator: &str, body: impl Into<String>) {
        self.documents
            .insert(strip_query(locator).to_string(), body.into());
    }

    /// Every locator requested so far, including the cache-busting suffix.
    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    /// How many times `locator` (without query) was requested.
    pub fn request_count(&self, locator: &str) -> usize {
        let wanted = strip_query(locator);
        self.requests
            .iter()
            .filter(|r| strip_query(r) == wanted)
            .count()
    }
}

impl CatalogSource for MemorySource {
    fn fetch(&mut self, locator: &str) -> Result<String> {
        self.requests.push(locator.to_string());
        self.documents
            .get(strip_query(locator))
            .cloned()
            .ok_or_else(|| anyhow!("Document {} not found", strip_query(locator)))
    }
}
