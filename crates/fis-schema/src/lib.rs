//! Shared types and wire format for fis.
//!
//! Everything the server puts on the wire lives here: the validated
//! [`TargetPath`] identifier, the merged [`IndexDocument`], and the
//! branch/version [`Directory`] listing.

pub mod directory;
pub mod index;
pub mod target;

// Re-exports
pub use directory::{BranchVersions, Directory};
pub use index::{IndexDocument, PackageManifest};
pub use target::{TargetPath, TargetPathError};
