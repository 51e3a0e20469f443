//! Validated upstream target paths.

use serde::{Deserialize, Serialize};

/// A validated upstream target path in `branch/device/release` form.
///
/// The path is opaque: it is spliced verbatim into upstream URLs and never
/// interpreted beyond kmod-split eligibility. Validation only enforces the
/// shape needed for safe URL construction.
///
/// # Example
///
/// ```
/// use fis_schema::TargetPath;
///
/// let path = TargetPath::new("releases/24.10.0/targets/x86/64").unwrap();
/// assert_eq!(path.as_str(), "releases/24.10.0/targets/x86/64");
/// assert_eq!(path.segments().next(), Some("releases"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetPath(String);

/// Errors that can occur when validating a [`TargetPath`].
#[derive(thiserror::Error, Debug)]
pub enum TargetPathError {
    /// The path string is empty.
    #[error("empty target path")]
    Empty,

    /// The path contains an empty segment (leading, trailing, or doubled slash).
    #[error("empty segment in target path '{0}'")]
    EmptySegment(String),

    /// The path contains a `.` or `..` segment.
    #[error("dot segment in target path '{0}'")]
    DotSegment(String),
}

impl TargetPath {
    /// Create a new `TargetPath`, validating its shape.
    ///
    /// # Errors
    ///
    /// Returns [`TargetPathError`] if `s` is empty, contains an empty
    /// segment, or contains a `.`/`..` segment.
    pub fn new(s: &str) -> Result<Self, TargetPathError> {
        if s.is_empty() {
            return Err(TargetPathError::Empty);
        }
        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(TargetPathError::EmptySegment(s.to_string()));
            }
            if segment == "." || segment == ".." {
                return Err(TargetPathError::DotSegment(s.to_string()));
            }
        }
        Ok(Self(s.to_string()))
    }

    /// Return the raw slash-delimited path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the path segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl std::fmt::Display for TargetPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_release_and_snapshot_paths() {
        assert!(TargetPath::new("releases/24.10.0/targets/x86/64").is_ok());
        assert!(TargetPath::new("snapshots/targets/ath79/generic").is_ok());
    }

    #[test]
    fn rejects_empty_and_slashed_edges() {
        assert!(matches!(TargetPath::new(""), Err(TargetPathError::Empty)));
        assert!(matches!(
            TargetPath::new("/releases/24.10.0"),
            Err(TargetPathError::EmptySegment(_))
        ));
        assert!(matches!(
            TargetPath::new("releases//targets"),
            Err(TargetPathError::EmptySegment(_))
        ));
        assert!(matches!(
            TargetPath::new("releases/24.10.0/"),
            Err(TargetPathError::EmptySegment(_))
        ));
    }

    #[test]
    fn rejects_dot_segments() {
        assert!(matches!(
            TargetPath::new("releases/../secrets"),
            Err(TargetPathError::DotSegment(_))
        ));
        assert!(matches!(
            TargetPath::new("./snapshots"),
            Err(TargetPathError::DotSegment(_))
        ));
    }
}
