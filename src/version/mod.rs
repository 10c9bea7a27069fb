//! Version model for module retrieval
//!
//! # Modules
//!
//! - [`semver`]: Go-flavoured semantic version parsing and precedence
//! - [`resolver`]: Resolution of the "latest" request against available versions

pub mod resolver;
pub mod semver;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text form of the [`Version::Latest`] sentinel
pub const LATEST: &str = "latest";

/// A requested module version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Version {
    /// Resolve to the newest available concrete version
    Latest,
    /// A concrete version such as `v1.2.3`
    Concrete(String),
}

impl Version {
    pub fn concrete(version: impl Into<String>) -> Self {
        Version::Concrete(version.into())
    }

    /// Returns the concrete version string, or `None` for [`Version::Latest`].
    pub fn as_concrete(&self) -> Option<&str> {
        match self {
            Version::Latest => None,
            Version::Concrete(v) => Some(v),
        }
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        if s == LATEST {
            Version::Latest
        } else {
            Version::Concrete(s.to_string())
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Latest => f.write_str(LATEST),
            Version::Concrete(v) => f.write_str(v),
        }
    }
}

/// Metadata of a concrete module version, as stored in `.info` files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionInfo {
    pub version: String,
    pub time: DateTime<Utc>,
}

impl VersionInfo {
    pub fn new(version: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            version: version.into(),
            time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("latest", Version::Latest)]
    #[case("v1.0.0", Version::concrete("v1.0.0"))]
    #[case("Latest", Version::concrete("Latest"))]
    fn version_from_str_recognizes_sentinel(#[case] input: &str, #[case] expected: Version) {
        assert_eq!(Version::from(input), expected);
    }

    #[test]
    fn version_display_round_trips_text_form() {
        assert_eq!(Version::Latest.to_string(), "latest");
        assert_eq!(Version::concrete("v2.0.0").to_string(), "v2.0.0");
    }

    #[test]
    fn version_info_parses_proxy_info_record() {
        let info: VersionInfo = serde_json::from_str(
            r#"{"Version":"v1.0.0","Time":"2019-03-30T17:04:38Z","Origin":{"VCS":"git"}}"#,
        )
        .unwrap();

        assert_eq!(info.version, "v1.0.0");
        assert_eq!(
            info.time,
            DateTime::parse_from_rfc3339("2019-03-30T17:04:38Z")
                .unwrap()
                .with_timezone(&Utc)
        );
    }

    #[test]
    fn version_info_serializes_with_proxy_field_names() {
        let info = VersionInfo::new("v1.0.0", DateTime::<Utc>::UNIX_EPOCH);
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["Version"], "v1.0.0");
        assert_eq!(value["Time"], "1970-01-01T00:00:00Z");
    }
}
