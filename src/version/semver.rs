//! Go module version precedence
//!
//! Go modules use semantic versions with a mandatory `v` prefix:
//! - Standard semver: v1.2.3
//! - +incompatible suffix: v2.0.0+incompatible (pre-go.mod v2+ modules)
//! - Pseudo-versions: v0.0.0-20210101000000-abcdef123456
//!
//! Build metadata (including `+incompatible`) does not take part in precedence.

use std::cmp::Ordering;

use semver::{BuildMetadata, Version};

/// Parse a Go module version into a semver::Version with build metadata cleared.
///
/// Returns `None` for anything that is not a canonical `vMAJOR.MINOR.PATCH[-pre]`.
pub fn parse_go_version(version: &str) -> Option<Version> {
    let stripped = version.strip_prefix('v')?;
    let mut parsed = Version::parse(stripped).ok()?;
    parsed.build = BuildMetadata::EMPTY;
    Some(parsed)
}

/// Compare two Go module versions by semver precedence.
///
/// Returns `None` if either version is invalid.
pub fn compare_go_versions(a: &str, b: &str) -> Option<Ordering> {
    Some(parse_go_version(a)?.cmp(&parse_go_version(b)?))
}

/// Check if a version is a pseudo-version.
///
/// Pseudo-version formats:
/// - vX.0.0-YYYYMMDDHHMMSS-commit (no base version)
/// - vX.Y.Z-pre.0.YYYYMMDDHHMMSS-commit (pre-release base)
/// - vX.Y.Z-0.YYYYMMDDHHMMSS-commit (release base)
pub fn is_pseudo_version(version: &str) -> bool {
    let Some(parsed) = parse_go_version(version) else {
        return false;
    };

    let pre = parsed.pre.as_str();
    let Some((head, commit)) = pre.rsplit_once('-') else {
        return false;
    };
    if commit.len() < 12 || !commit.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }

    let timestamp = head.rsplit('.').next().unwrap_or(head);
    timestamp.len() == 14 && timestamp.chars().all(|c| c.is_ascii_digit())
}

/// Check if a version has a pre-release component. Pseudo-versions always do.
pub fn is_prerelease(version: &str) -> bool {
    parse_go_version(version).is_some_and(|v| !v.pre.is_empty())
}
