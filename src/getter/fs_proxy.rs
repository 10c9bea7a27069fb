//! Module proxy mirror getter
//!
//! Reads modules from a directory laid out like the module proxy's download
//! cache (`$GOMODCACHE`):
//!
//! ```text
//! <dir>/cache/download/<escaped module>/@v/<escaped version>.info
//! <dir>/cache/download/<escaped module>/@v/<escaped version>.mod
//! <dir>/cache/download/<escaped module>/@v/<escaped version>.zip
//! ```

use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::escape::{self, Suffix, escaped_module_dir, unescape_version};
use crate::getter::content::{ContentDir, ZipContent};
use crate::getter::error::GetterError;
use crate::getter::{GetterKind, ModuleGetter, cancellable};
use crate::version::resolver::resolve_latest;
use crate::version::semver::{compare_go_versions, parse_go_version};
use crate::version::{Version, VersionInfo};

/// Getter for a local module proxy mirror
#[derive(Debug, Clone)]
pub struct FsProxyModuleGetter {
    dir: PathBuf,
}

impl FsProxyModuleGetter {
    /// Creates a getter rooted at `dir`, which must be an existing directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, GetterError> {
        let dir = std::path::absolute(dir.as_ref())?;
        let metadata = std::fs::metadata(&dir).map_err(|e| GetterError::from_read(e, &dir))?;
        if !metadata.is_dir() {
            return Err(GetterError::Io(io::Error::other(format!(
                "{} is not a directory",
                dir.display()
            ))));
        }

        debug!("Using module mirror at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the mirror path of a module file for a concrete version.
    pub fn escaped_path(
        &self,
        module_path: &str,
        version: &str,
        suffix: Suffix,
    ) -> Result<PathBuf, GetterError> {
        Ok(escape::escaped_path(&self.dir, module_path, version, suffix)?)
    }

    /// Lists the versions that have an `.info` file in the mirror, in
    /// ascending precedence.
    pub async fn list_versions(&self, module_path: &str) -> Result<Vec<String>, GetterError> {
        let dir = escaped_module_dir(&self.dir, module_path)?;
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| GetterError::from_read(e, &dir))?;

        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(stem) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(".info"))
            else {
                continue;
            };

            match unescape_version(stem) {
                Ok(version) if parse_go_version(&version).is_some() => versions.push(version),
                Ok(version) => warn!("Skipping invalid version {:?} in {:?}", version, dir),
                Err(e) => warn!("Skipping {:?} in {:?}: {}", stem, dir, e),
            }
        }

        versions.sort_by(|a, b| {
            compare_go_versions(a, b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.cmp(b))
        });
        Ok(versions)
    }

    /// Resolves the latest version by semver precedence, not file time.
    async fn latest_version(&self, module_path: &str) -> Result<String, GetterError> {
        let versions = self.list_versions(module_path).await?;
        let latest = resolve_latest(&versions).ok_or_else(|| {
            GetterError::NotFound(format!(
                "no versions of {} in {}",
                module_path,
                self.dir.display()
            ))
        })?;
        debug!("Resolved {}@latest to {}", module_path, latest);
        Ok(latest)
    }

    async fn resolve(&self, module_path: &str, version: &Version) -> Result<String, GetterError> {
        match version {
            Version::Latest => self.latest_version(module_path).await,
            Version::Concrete(v) => Ok(v.clone()),
        }
    }

    async fn read(
        &self,
        module_path: &str,
        version: &str,
        suffix: Suffix,
    ) -> Result<Vec<u8>, GetterError> {
        let path = self.escaped_path(module_path, version, suffix)?;
        debug!("Reading {}", path.display());
        tokio::fs::read(&path)
            .await
            .map_err(|e| GetterError::from_read(e, &path))
    }
}

#[async_trait::async_trait]
impl ModuleGetter for FsProxyModuleGetter {
    fn kind(&self) -> GetterKind {
        GetterKind::FsProxy
    }

    async fn info(
        &self,
        module_path: &str,
        version: &Version,
        cancel: &CancellationToken,
    ) -> Result<VersionInfo, GetterError> {
        cancellable(cancel, async {
            let version = self.resolve(module_path, version).await?;
            let data = self.read(module_path, &version, Suffix::Info).await?;
            serde_json::from_slice(&data).map_err(|e| {
                GetterError::BadModule(format!("{}@{}: invalid info file: {}", module_path, version, e))
            })
        })
        .await
    }

    async fn module_file(
        &self,
        module_path: &str,
        version: &Version,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, GetterError> {
        cancellable(cancel, async {
            let version = self.resolve(module_path, version).await?;
            self.read(module_path, &version, Suffix::Mod).await
        })
        .await
    }

    async fn content_dir(
        &self,
        module_path: &str,
        version: &Version,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn ContentDir>, GetterError> {
        cancellable(cancel, async {
            let version = self.resolve(module_path, version).await?;
            let data = self.read(module_path, &version, Suffix::Zip).await?;
            let prefix = format!("{}@{}/", module_path, version);

            let content = tokio::task::spawn_blocking(move || ZipContent::new(data, &prefix))
                .await
                .map_err(|e| GetterError::Io(io::Error::other(e)))??;
            Ok(Box::new(content) as Box<dyn ContentDir>)
        })
        .await
    }
}
