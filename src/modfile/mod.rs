//! go.mod manifest parsing
//! - parser.rs: line-oriented go.mod parser
//! - types.rs: ModFile and Requirement

pub mod parser;
pub mod types;

pub use parser::{GoModParser, ParseError};
pub use types::{ModFile, Requirement};

/// Name of the manifest file at a module root
pub const MANIFEST_FILE: &str = "go.mod";
