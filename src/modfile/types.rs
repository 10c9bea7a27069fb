//! Types produced by the go.mod parser

/// Parsed contents of a go.mod file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModFile {
    /// Declared module path (`module example.com/foo`)
    pub module_path: Option<String>,
    /// Language version from the `go` directive
    pub go_version: Option<String>,
    /// Requirements in declaration order
    pub requires: Vec<Requirement>,
}

/// A single `require` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
    /// Marked with a trailing `// indirect` comment
    pub indirect: bool,
}
