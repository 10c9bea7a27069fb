//! Local directory getter
//!
//! Treats a working directory as an untagged snapshot of a single module.
//! It has no version history: every request resolves to [`LOCAL_VERSION`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::getter::content::{ContentDir, DirContent};
use crate::getter::error::GetterError;
use crate::getter::{GetterKind, ModuleGetter, cancellable};
use crate::modfile::{GoModParser, MANIFEST_FILE};
use crate::version::{Version, VersionInfo};

/// Pseudo-version reported for a local directory
pub const LOCAL_VERSION: &str = "v0.0.0";

/// Commit time reported for a local directory
pub const LOCAL_COMMIT_TIME: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

/// Getter for a module stored in a local directory
#[derive(Debug, Clone)]
pub struct DirectoryModuleGetter {
    module_path: String,
    dir: PathBuf,
}

impl DirectoryModuleGetter {
    /// Creates a getter for `dir`.
    ///
    /// When `module_path` is `None` or empty, the path is read from the
    /// `module` directive of `dir/go.mod`.
    pub fn new(module_path: Option<&str>, dir: impl AsRef<Path>) -> Result<Self, GetterError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(GetterError::BadModule(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let module_path = match module_path.filter(|p| !p.is_empty()) {
            Some(path) => path.to_string(),
            None => Self::declared_module_path(dir)?,
        };

        info!(
            "Serving module {} from directory {}",
            module_path,
            dir.display()
        );

        Ok(Self {
            module_path,
            dir: dir.to_path_buf(),
        })
    }

    fn declared_module_path(dir: &Path) -> Result<String, GetterError> {
        let manifest = dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&manifest).map_err(|e| {
            GetterError::BadModule(format!(
                "cannot obtain module path for {} ({})",
                dir.display(),
                e
            ))
        })?;

        let parsed = GoModParser::new()
            .parse(&content)
            .map_err(|e| GetterError::BadModule(format!("{}: {}", manifest.display(), e)))?;

        parsed.module_path.ok_or_else(|| {
            GetterError::BadModule(format!("{} has no module path", manifest.display()))
        })
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn check(&self, module_path: &str, version: &Version) -> Result<(), GetterError> {
        if module_path != self.module_path {
            return Err(GetterError::NotFound(format!(
                "given module path {:?} but getter is for {:?}",
                module_path, self.module_path
            )));
        }
        match version.as_concrete() {
            None | Some(LOCAL_VERSION) => Ok(()),
            Some(other) => Err(GetterError::NotFound(format!(
                "{}@{}: local directory only provides {}",
                module_path, other, LOCAL_VERSION
            ))),
        }
    }
}

#[async_trait::async_trait]
impl ModuleGetter for DirectoryModuleGetter {
    fn kind(&self) -> GetterKind {
        GetterKind::Directory
    }

    async fn info(
        &self,
        module_path: &str,
        version: &Version,
        cancel: &CancellationToken,
    ) -> Result<VersionInfo, GetterError> {
        cancellable(cancel, async {
            self.check(module_path, version)?;
            Ok(VersionInfo::new(LOCAL_VERSION, LOCAL_COMMIT_TIME))
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
            self.check(module_path, version)?;
            let manifest = self.dir.join(MANIFEST_FILE);
            match tokio::fs::read(&manifest).await {
                Ok(data) => Ok(data),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    // Only reachable with an explicit module path.
                    debug!("No go.mod in {}, synthesizing one", self.dir.display());
                    Ok(format!("module {}\n", self.module_path).into_bytes())
                }
                Err(e) => Err(GetterError::Io(e)),
            }
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
            self.check(module_path, version)?;
            Ok(Box::new(DirContent::new(&self.dir)) as Box<dyn ContentDir>)
        })
        .await
    }
}
