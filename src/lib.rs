//! Retrieve a module's metadata, go.mod and source tree from a local
//! directory or a local module proxy mirror.
//!
//! # Modules
//!
//! - [`escape`]: module proxy path escaping
//! - [`version`]: version model, precedence and latest resolution
//! - [`modfile`]: go.mod parsing
//! - [`getter`]: the `ModuleGetter` trait and its implementations
//! - [`fetch`]: fetch pipeline over a single getter
//! - [`config`]: configuration and default directories
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod escape;
pub mod fetch;
pub mod getter;
pub mod logging;
pub mod modfile;
pub mod version;
