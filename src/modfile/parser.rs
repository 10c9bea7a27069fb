//! go.mod parser
//!
//! Extracts the module path, the `go` directive and requirements.
//! Supports both single-line directives and parenthesized blocks.
//!
//! Format examples:
//! - Module: `module example.com/myapp` or `module "example.com/myapp"`
//! - Single: `require golang.org/x/text v0.14.0`
//! - Block:
//!   ```text
//!   require (
//!       golang.org/x/text v0.14.0
//!       golang.org/x/net v0.20.0 // indirect
//!   )
//!   ```
//!
//! `replace`, `exclude`, `retract` and `toolchain` directives are skipped.

use regex::Regex;

use crate::modfile::types::{ModFile, Requirement};

/// Error type for go.mod parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Invalid syntax on a specific line (1-indexed)
    #[error("go.mod:{line}: {message}")]
    InvalidSyntax { line: usize, message: String },

    /// A parenthesized block was never closed
    #[error("go.mod: unterminated {0} block")]
    UnterminatedBlock(String),
}

/// Parser for go.mod files
pub struct GoModParser {
    /// Regex for `module path` or `module "path"`
    module_re: Regex,
    /// Regex for `go 1.21`
    go_re: Regex,
    /// Regex for single-line require: `require module/path v1.2.3`
    single_require_re: Regex,
    /// Regex for block start: `require (`, `replace (`, ...
    block_start_re: Regex,
    /// Regex for require spec inside block: `module/path v1.2.3`
    require_line_re: Regex,
}

impl GoModParser {
    pub fn new() -> Self {
        Self {
            // Match: module path [// comment]
            module_re: Regex::new(r#"^module\s+(?:"([^"]+)"|([^\s"]+))\s*(?://.*)?$"#).unwrap(),
            // Match: go 1.21 [// comment]
            go_re: Regex::new(r"^go\s+(\S+)\s*(?://.*)?$").unwrap(),
            // Match: require module/path v1.2.3 [// comment]
            single_require_re: Regex::new(r"^require\s+(\S+)\s+(v[^\s]+)\s*(//.*)?$").unwrap(),
            // Match: directive (
            block_start_re: Regex::new(r"^([a-z]+)\s*\(\s*(?://.*)?$").unwrap(),
            // Match: module/path v1.2.3 [// comment]
            require_line_re: Regex::new(r"^(\S+)\s+(v[^\s]+)\s*(//.*)?$").unwrap(),
        }
    }

    pub fn parse(&self, content: &str) -> Result<ModFile, ParseError> {
        let mut result = ModFile::default();
        let mut open_block: Option<String> = None;

        for (line_num, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            let line_no = line_num + 1;

            // Skip empty lines and comments
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }

            // Check for block end
            if let Some(block) = &open_block {
                if trimmed == ")" {
                    open_block = None;
                    continue;
                }

                if block == "require" {
                    let caps = self.require_line_re.captures(trimmed).ok_or_else(|| {
                        ParseError::InvalidSyntax {
                            line: line_no,
                            message: format!("malformed requirement {:?}", trimmed),
                        }
                    })?;
                    result.requires.push(requirement(&caps));
                }
                continue;
            }

            // Check for block start
            if let Some(caps) = self.block_start_re.captures(trimmed) {
                open_block = Some(caps[1].to_string());
                continue;
            }

            if trimmed.starts_with("module") && is_directive(trimmed, "module") {
                let caps =
                    self.module_re
                        .captures(trimmed)
                        .ok_or_else(|| ParseError::InvalidSyntax {
                            line: line_no,
                            message: "usage: module module/path".to_string(),
                        })?;
                if result.module_path.is_some() {
                    return Err(ParseError::InvalidSyntax {
                        line: line_no,
                        message: "repeated module statement".to_string(),
                    });
                }
                let path = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
                result.module_path = path.map(str::to_string);
            } else if let Some(caps) = self.go_re.captures(trimmed) {
                result.go_version = Some(caps[1].to_string());
            } else if let Some(caps) = self.single_require_re.captures(trimmed) {
                result.requires.push(requirement(&caps));
            }
        }

        if let Some(block) = open_block {
            return Err(ParseError::UnterminatedBlock(block));
        }

        Ok(result)
    }
}

impl Default for GoModParser {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `line` starts with the keyword `name` followed by whitespace or end of line.
fn is_directive(line: &str, name: &str) -> bool {
    line.strip_prefix(name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

fn requirement(caps: &regex::Captures<'_>) -> Requirement {
    let indirect = caps
        .get(3)
        .is_some_and(|c| c.as_str().trim_start_matches('/').trim() == "indirect");
    Requirement {
        path: caps[1].to_string(),
        version: caps[2].to_string(),
        indirect,
    }
}
