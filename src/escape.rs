//! Module proxy path escaping
//!
//! The module proxy protocol stores files under case-insensitive-safe names:
//! every uppercase ASCII letter is written as `!` followed by its lowercase
//! form. For example `github.com/Azure` is stored as `github.com/!azure`.
//!
//! Mirror layout:
//! ```text
//! <base>/cache/download/<escaped module>/@v/<escaped version>.{info,mod,zip}
//! ```

use std::path::{Path, PathBuf};

/// Escape marker used by the module proxy protocol
const ESCAPE_CHAR: char = '!';

/// Error type for escaping operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EscapeError {
    #[error("empty {0}")]
    Empty(&'static str),

    #[error("invalid character {ch:?} in {what} {value:?}")]
    InvalidChar {
        what: &'static str,
        value: String,
        ch: char,
    },

    #[error("invalid escaped {what} {value:?}")]
    InvalidEscape { what: &'static str, value: String },

    #[error("cannot make {0:?} absolute: {1}")]
    Absolute(PathBuf, String),
}

/// Suffix of a file in a mirror's `@v` directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suffix {
    Info,
    Mod,
    Zip,
}

impl Suffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Suffix::Info => "info",
            Suffix::Mod => "mod",
            Suffix::Zip => "zip",
        }
    }
}

impl std::fmt::Display for Suffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escapes a module path for use in a mirror directory or proxy URL.
pub fn escape_module_path(module_path: &str) -> Result<String, EscapeError> {
    escape_string("module path", module_path)
}

/// Escapes a concrete version string.
pub fn escape_version(version: &str) -> Result<String, EscapeError> {
    escape_string("version", version)
}

fn escape_string(what: &'static str, value: &str) -> Result<String, EscapeError> {
    if value.is_empty() {
        return Err(EscapeError::Empty(what));
    }

    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        if c == ESCAPE_CHAR || !c.is_ascii() {
            return Err(EscapeError::InvalidChar {
                what,
                value: value.to_string(),
                ch: c,
            });
        }
        if c.is_ascii_uppercase() {
            result.push(ESCAPE_CHAR);
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    Ok(result)
}

/// Reverses [`escape_module_path`].
pub fn unescape_module_path(escaped: &str) -> Result<String, EscapeError> {
    unescape_string("module path", escaped)
}

/// Reverses [`escape_version`].
pub fn unescape_version(escaped: &str) -> Result<String, EscapeError> {
    unescape_string("version", escaped)
}

fn unescape_string(what: &'static str, escaped: &str) -> Result<String, EscapeError> {
    let invalid = || EscapeError::InvalidEscape {
        what,
        value: escaped.to_string(),
    };

    if escaped.is_empty() {
        return Err(EscapeError::Empty(what));
    }

    let mut result = String::with_capacity(escaped.len());
    let mut bang = false;
    for c in escaped.chars() {
        if !c.is_ascii() {
            return Err(invalid());
        }
        if bang {
            bang = false;
            if !c.is_ascii_lowercase() {
                return Err(invalid());
            }
            result.push(c.to_ascii_uppercase());
            continue;
        }
        if c == ESCAPE_CHAR {
            bang = true;
            continue;
        }
        // An uppercase letter can never appear in escaped text.
        if c.is_ascii_uppercase() {
            return Err(invalid());
        }
        result.push(c);
    }

    if bang {
        return Err(invalid());
    }
    Ok(result)
}

/// Returns the absolute path of a mirror file.
///
/// `base` is made absolute lexically; the filesystem is not consulted, so
/// the returned path may not exist.
pub fn escaped_path(
    base: &Path,
    module_path: &str,
    version: &str,
    suffix: Suffix,
) -> Result<PathBuf, EscapeError> {
    let module_dir = escaped_module_dir(base, module_path)?;
    let version = escape_version(version)?;
    Ok(module_dir.join(format!("{}.{}", version, suffix)))
}

/// Returns the absolute `@v` directory of a module in a mirror.
pub fn escaped_module_dir(base: &Path, module_path: &str) -> Result<PathBuf, EscapeError> {
    let module = escape_module_path(module_path)?;
    let base = std::path::absolute(base)
        .map_err(|e| EscapeError::Absolute(base.to_path_buf(), e.to_string()))?;

    let mut dir = base.join("cache").join("download");
    // Module paths are slash-separated regardless of platform.
    for segment in module.split('/') {
        dir.push(segment);
    }
    dir.push("@v");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("m.com", "v1", Suffix::Info, "dir/cache/download/m.com/@v/v1.info")]
    #[case(
        "github.com/aBc",
        "v2.3.4",
        Suffix::Zip,
        "dir/cache/download/github.com/a!bc/@v/v2.3.4.zip"
    )]
    #[case(
        "github.com/Azure/azure-sdk-for-go",
        "v1.0.0-RC1",
        Suffix::Mod,
        "dir/cache/download/github.com/!azure/azure-sdk-for-go/@v/v1.0.0-!r!c1.mod"
    )]
    fn escaped_path_builds_mirror_path(
        #[case] module: &str,
        #[case] version: &str,
        #[case] suffix: Suffix,
        #[case] expected: &str,
    ) {
        let got = escaped_path(Path::new("dir"), module, version, suffix).unwrap();
        let want = std::path::absolute(expected).unwrap();
        assert_eq!(got, want);
    }

    #[test]
    fn escaped_path_is_deterministic() {
        let a = escaped_path(Path::new("dir"), "github.com/X/y", "v1.0.0", Suffix::Zip).unwrap();
        let b = escaped_path(Path::new("dir"), "github.com/X/y", "v1.0.0", Suffix::Zip).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn escape_module_path_escapes_uppercase_letters() {
        assert_eq!(
            escape_module_path("github.com/Azure").unwrap(),
            "github.com/!azure"
        );
        assert_eq!(
            escape_module_path("github.com/Azure/AzureSDK").unwrap(),
            "github.com/!azure/!azure!s!d!k"
        );
        assert_eq!(
            escape_module_path("golang.org/x/text").unwrap(),
            "golang.org/x/text"
        );
        assert_eq!(
            escape_module_path("example.com/a-b_c~d+e").unwrap(),
            "example.com/a-b_c~d+e"
        );
    }

    #[rstest]
    #[case("")]
    #[case("github.com/a!b")]
    #[case("github.com/caf\u{e9}")]
    fn escape_module_path_rejects_malformed_input(#[case] input: &str) {
        assert!(escape_module_path(input).is_err());
    }

    #[test]
    fn escaped_path_rejects_empty_version() {
        let err = escaped_path(Path::new("dir"), "m.com", "", Suffix::Info).unwrap_err();
        assert_eq!(err, EscapeError::Empty("version"));
    }

    #[rstest]
    #[case("github.com/!azure", "github.com/Azure")]
    #[case("github.com/!azure/!azure!s!d!k", "github.com/Azure/AzureSDK")]
    #[case("golang.org/x/text", "golang.org/x/text")]
    fn unescape_module_path_reverses_escaping(#[case] escaped: &str, #[case] expected: &str) {
        assert_eq!(unescape_module_path(escaped).unwrap(), expected);
        assert_eq!(escape_module_path(expected).unwrap(), escaped);
    }

    #[rstest]
    #[case("github.com/Azure")] // bare uppercase
    #[case("github.com/azure!")] // dangling marker
    #[case("github.com/!Azure")] // marker before uppercase
    #[case("github.com/!1")] // marker before digit
    #[case("")]
    fn unescape_module_path_rejects_malformed_input(#[case] input: &str) {
        assert!(unescape_module_path(input).is_err());
    }

    #[test]
    fn unescape_version_restores_uppercase() {
        assert_eq!(unescape_version("v1.0.0-!r!c1").unwrap(), "v1.0.0-RC1");
    }
}
