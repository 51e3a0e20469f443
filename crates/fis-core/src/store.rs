//! Shared branch/version store.
//!
//! The server only ever reads two set families from the store: the known
//! branch names, and the versions of each branch. [`BranchStore`] is that
//! read contract; the production [`FileStore`] reads a JSON document
//! maintained by an external sync job, [`MemoryStore`] backs tests.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading the branch/version store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be read, or its contents were malformed.
    #[error("branch store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to branch and version membership sets.
#[async_trait]
pub trait BranchStore: Send + Sync {
    /// All known branch names.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be read.
    async fn branches(&self) -> Result<BTreeSet<String>, StoreError>;

    /// All known versions of one branch. An unknown branch yields the
    /// empty set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the store cannot be read.
    async fn versions(&self, branch: &str) -> Result<BTreeSet<String>, StoreError>;
}

/// On-disk layout of the store document.
#[derive(Debug, Default, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    branches: BTreeSet<String>,
    #[serde(default)]
    versions: BTreeMap<String, BTreeSet<String>>,
}

/// Store backed by a JSON document on disk.
///
/// The file is re-read on every call so membership updates by the sync job
/// are observed without a restart.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<StoreDocument, StoreError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| StoreError::Unavailable(format!("{}: {err}", self.path.display())))?;
        serde_json::from_str(&content)
            .map_err(|err| StoreError::Unavailable(format!("{}: {err}", self.path.display())))
    }
}

#[async_trait]
impl BranchStore for FileStore {
    async fn branches(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.load().await?.branches)
    }

    async fn versions(&self, branch: &str) -> Result<BTreeSet<String>, StoreError> {
        Ok(self
            .load()
            .await?
            .versions
            .remove(branch)
            .unwrap_or_default())
    }
}

/// Fixed-content store for tests and local experiments.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    branches: BTreeSet<String>,
    versions: BTreeMap<String, BTreeSet<String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch with its versions.
    pub fn with_branch(mut self, branch: &str, versions: &[&str]) -> Self {
        self.branches.insert(branch.to_string());
        self.versions.insert(
            branch.to_string(),
            versions.iter().map(|v| (*v).to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl BranchStore for MemoryStore {
    async fn branches(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.branches.clone())
    }

    async fn versions(&self, branch: &str) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.versions.get(branch).cloned().unwrap_or_default())
    }
}
