//! Kernel-module split detection.
//!
//! Newer release lines publish kernel-module packages under a separate
//! `kmods/` tree instead of the main package index. Whether a target path
//! is affected depends only on its branch segment: snapshot builds always
//! are, releases are from 24.10 on.

use fis_schema::TargetPath;

/// First release line whose builds publish kernel modules separately.
const KMOD_SPLIT_RELEASE: (u32, u32) = (24, 10);

/// Whether this target path publishes kernel-module packages in a separate
/// manifest.
pub fn is_post_kmod_split(path: &TargetPath) -> bool {
    let mut segments = path.segments();
    match segments.next() {
        Some("snapshots") => true,
        Some("releases") => segments.next().is_some_and(version_is_post_split),
        _ => false,
    }
}

fn version_is_post_split(version: &str) -> bool {
    // Only the numeric major.minor prefix matters; "24.10.0-rc2" and
    // "24.10-SNAPSHOT" compare the same as "24.10".
    let numeric: &str = version
        .split(|c: char| !c.is_ascii_digit() && c != '.')
        .next()
        .unwrap_or("");
    let mut parts = numeric.split('.');
    let (Some(major), Some(minor)) = (parts.next(), parts.next()) else {
        return false;
    };
    match (major.parse::<u32>(), minor.parse::<u32>()) {
        (Ok(major), Ok(minor)) => (major, minor) >= KMOD_SPLIT_RELEASE,
        _ => false,
    }
}
