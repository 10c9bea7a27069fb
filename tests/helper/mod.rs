//! Shared test utilities
#![allow(dead_code)]

pub mod mirror;

use std::path::PathBuf;

pub use mirror::{MirrorBuilder, build_module_zip};

/// Returns the path of a fixture under `testdata/`.
pub fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}
