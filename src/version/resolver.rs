//! Latest version resolution
//!
//! The module proxy defines "latest" by version precedence, not by
//! publication order. Candidates are ranked in tiers: the highest release
//! wins, then the highest tagged pre-release, and a pseudo-version is only
//! chosen when no tagged version exists.

use crate::version::semver::{is_prerelease, is_pseudo_version, parse_go_version};

/// Find the semantically maximum version from a list
///
/// Invalid versions are skipped. On equal precedence the first one seen wins.
pub fn find_semantic_max<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, semver::Version)> = None;
    for version in versions {
        let Some(parsed) = parse_go_version(version) else {
            continue;
        };
        if best.as_ref().is_none_or(|(_, current)| parsed > *current) {
            best = Some((version, parsed));
        }
    }
    best.map(|(original, _)| original)
}

/// Determine the "latest" version from the available versions
///
/// Returns the highest release, else the highest tagged pre-release, else
/// the highest pseudo-version, or None if no valid version is present.
pub fn resolve_latest(versions: &[String]) -> Option<String> {
    let tier = move |keep: fn(&str) -> bool| {
        find_semantic_max(versions.iter().map(String::as_str).filter(|v| keep(v)))
    };

    tier(|v| !is_prerelease(v))
        .or_else(|| tier(|v| is_prerelease(v) && !is_pseudo_version(v)))
        .or_else(|| tier(is_pseudo_version))
        .map(str::to_string)
}
