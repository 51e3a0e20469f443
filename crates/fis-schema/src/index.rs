//! Merged package-index documents.
//!
//! An index document is what the server hands out: a `packages` mapping
//! assembled from one or more upstream manifests, plus whatever metadata
//! fields the base manifest carried. Upstream documents are loosely typed,
//! so unknown fields ride along as open JSON values instead of being
//! dropped by a closed struct.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Mapping from package name to opaque metadata (typically a version
/// string). Insertion order is irrelevant; key collisions are
/// last-write-wins.
pub type PackageManifest = BTreeMap<String, Value>;

/// A package-index document: the merged `packages` mapping plus
/// pass-through fields from the base manifest (e.g. `architecture`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Merge of all contributing package manifests.
    #[serde(default)]
    pub packages: PackageManifest,

    /// Fields of the base manifest that are not interpreted here. They
    /// survive every merge untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl IndexDocument {
    /// Merge another manifest's packages into this document.
    ///
    /// Incoming entries win on name collision; every other field of the
    /// document is left as-is.
    pub fn merge_packages(&mut self, packages: PackageManifest) {
        self.packages.extend(packages);
    }
}
