//! Branch/version directory listing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Versions known for a single branch, lexicographically sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchVersions {
    /// Known version strings of the branch.
    pub versions: Vec<String>,
}

/// Mapping from branch name to its known versions. A `BTreeMap` keeps the
/// branch listing lexicographically ordered on the wire.
pub type Directory = BTreeMap<String, BranchVersions>;
