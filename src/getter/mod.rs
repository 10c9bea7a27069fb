//! Module getters: uniform access to a module's metadata, manifest and files
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │ DirectoryModule  │     │  FsProxyModule   │
//! │     Getter       │     │     Getter       │
//! └────────┬─────────┘     └────────┬─────────┘
//!          │  ModuleGetter          │  escape + zip
//!          ▼                        ▼
//! ┌──────────────────┐     ┌──────────────────┐
//! │   DirContent     │     │   ZipContent     │
//! └──────────────────┘     └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`content`]: read-only file trees returned by `content_dir`
//! - [`directory`]: a local working directory as a single-version module
//! - [`fs_proxy`]: a local mirror of a module proxy's download cache
//! - [`error`]: error type and error kinds

pub mod content;
pub mod directory;
pub mod error;
pub mod fs_proxy;

#[cfg(test)]
use mockall::automock;
use tokio_util::sync::CancellationToken;

pub use content::{ContentDir, ContentFile, DirContent, ZipContent};
pub use directory::DirectoryModuleGetter;
pub use error::{ErrorKind, GetterError};
pub use fs_proxy::FsProxyModuleGetter;

use crate::version::{Version, VersionInfo};

/// Backing store of a getter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GetterKind {
    /// Local working directory
    Directory,
    /// Local module proxy mirror
    FsProxy,
}

impl GetterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GetterKind::Directory => "directory",
            GetterKind::FsProxy => "fs_proxy",
        }
    }
}

/// Trait for retrieving module data from a backing store
///
/// All operations fail with [`ErrorKind::NotFound`] when the module or
/// version is unknown to the store, and return [`GetterError::Cancelled`]
/// once `cancel` fires.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ModuleGetter: Send + Sync {
    /// Returns the type of backing store this implementation reads
    fn kind(&self) -> GetterKind;

    /// Resolves `version` (possibly [`Version::Latest`]) to its metadata
    async fn info(
        &self,
        module_path: &str,
        version: &Version,
        cancel: &CancellationToken,
    ) -> Result<VersionInfo, GetterError>;

    /// Returns the raw go.mod content
    async fn module_file(
        &self,
        module_path: &str,
        version: &Version,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, GetterError>;

    /// Returns the module's file tree
    ///
    /// Fails with [`ErrorKind::BadModule`] if the stored data does not
    /// follow the expected layout.
    async fn content_dir(
        &self,
        module_path: &str,
        version: &Version,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn ContentDir>, GetterError>;
}

/// Runs `fut` unless `cancel` fires first.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, GetterError>
where
    F: std::future::Future<Output = Result<T, GetterError>>,
{
    if cancel.is_cancelled() {
        return Err(GetterError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GetterError::Cancelled),
        result = fut => result,
    }
}
