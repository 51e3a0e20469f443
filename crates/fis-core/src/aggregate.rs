//! Index aggregation - the whole-target and per-architecture merges.
//!
//! Merge order is the correctness contract here: for a whole target the
//! kmod manifest is applied after the base manifest, and for an
//! architecture the feeds are applied in `feeds.conf` order. In both cases
//! the later writer wins on a package-name collision.

use crate::kmod;
use crate::upstream::{UpstreamClient, UpstreamError};
use fis_schema::{IndexDocument, PackageManifest, TargetPath};
use thiserror::Error;

/// Errors from building an index document.
#[derive(Error, Debug)]
pub enum AggregateError {
    /// The target path has no published package index upstream.
    #[error("no package index for target '{0}'")]
    NotFound(String),

    /// An upstream fetch or parse failed. Never retried here; the boundary
    /// decides what to tell the client.
    #[error("upstream fetch failed: {0}")]
    Upstream(#[from] UpstreamError),
}

/// Builds merged index documents for targets and architectures.
#[derive(Debug, Clone)]
pub struct Aggregator {
    upstream: UpstreamClient,
    upstream_url: String,
}

impl Aggregator {
    /// Create an aggregator fetching from the download tree rooted at
    /// `upstream_url`.
    pub fn new(upstream: UpstreamClient, upstream_url: impl Into<String>) -> Self {
        let upstream_url = upstream_url.into().trim_end_matches('/').to_string();
        Self {
            upstream,
            upstream_url,
        }
    }

    /// Build the merged index document for a whole target.
    ///
    /// Fetches the base manifest from `{root}/{path}/packages`. For
    /// kmod-split targets whose kmods directory resolves, the kernel-module
    /// manifest from `{root}/{path}/kmods/{dir}` is merged into `packages`
    /// (kmod entries win on collision); all other fields of the base
    /// document pass through untouched. An unresolvable kmods directory is
    /// "no kmods for this target", not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::NotFound`] if the base manifest is absent
    /// upstream, [`AggregateError::Upstream`] on any other fetch or parse
    /// failure.
    pub async fn target_index(&self, path: &TargetPath) -> Result<IndexDocument, AggregateError> {
        let base = format!("{}/{path}", self.upstream_url);
        let mut document = self
            .upstream
            .fetch_manifest(&format!("{base}/packages"))
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    AggregateError::NotFound(path.to_string())
                } else {
                    AggregateError::Upstream(err)
                }
            })?;

        if kmod::is_post_kmod_split(path) {
            if let Some(kmods_dir) = self.upstream.fetch_kmods_directory(&base).await? {
                let kmods = self
                    .upstream
                    .fetch_manifest(&format!("{base}/kmods/{kmods_dir}"))
                    .await?;
                document.merge_packages(kmods.packages);
            } else {
                tracing::debug!(target_path = %path, "no kmods directory for target");
            }
        }

        Ok(document)
    }

    /// Build the merged package manifest for one architecture of a target.
    ///
    /// Resolves the feed list from `{root}/{path}/{arch}/feeds.conf` and
    /// folds the feeds' manifests into a single mapping in list order;
    /// later feeds overwrite earlier ones on a name collision. The result
    /// is pure package data - no pass-through metadata at this level.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::Upstream`] if the feed list or any single
    /// feed manifest cannot be fetched; partial results are never returned.
    pub async fn arch_index(
        &self,
        path: &TargetPath,
        arch: &str,
    ) -> Result<PackageManifest, AggregateError> {
        let feed_url = format!("{}/{path}/{arch}", self.upstream_url);
        let feeds = self.upstream.fetch_feeds(&feed_url).await?;
        tracing::debug!(target_path = %path, arch, feeds = feeds.len(), "merging feeds");

        let mut packages = PackageManifest::new();
        for feed in feeds {
            let manifest = self
                .upstream
                .fetch_manifest(&format!("{feed_url}/{feed}"))
                .await?;
            packages.extend(manifest.packages);
        }
        Ok(packages)
    }
}
