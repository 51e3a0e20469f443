//! Branch/version directory assembly.

use crate::store::{BranchStore, StoreError};
use fis_schema::{BranchVersions, Directory};

/// Assemble the branch → versions mapping from the shared store.
///
/// Branches and versions come out lexicographically sorted regardless of
/// the store's iteration order. Pure read - nothing is merged or mutated.
///
/// # Errors
///
/// Returns [`StoreError::Unavailable`] if any store read fails.
pub async fn build_directory<S: BranchStore + ?Sized>(store: &S) -> Result<Directory, StoreError> {
    let mut directory = Directory::new();
    for branch in store.branches().await? {
        let versions = store.versions(&branch).await?;
        directory.insert(
            branch,
            BranchVersions {
                versions: versions.into_iter().collect(),
            },
        );
    }
    Ok(directory)
}
