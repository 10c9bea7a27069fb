//! Module fetch pipeline
//!
//! Resolves a version and gathers everything a documentation pipeline needs
//! from a single [`ModuleGetter`]: metadata, go.mod and the file tree.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::getter::{ContentDir, GetterError, ModuleGetter};
use crate::modfile::MANIFEST_FILE;
use crate::version::{Version, VersionInfo};

/// A module retrieved from a backing store
#[derive(Debug)]
pub struct FetchedModule {
    pub module_path: String,
    /// Metadata of the resolved concrete version
    pub info: VersionInfo,
    /// Raw go.mod content
    pub go_mod: Vec<u8>,
    pub content: Box<dyn ContentDir>,
}

/// Fetch a module at `version`, resolving [`Version::Latest`] first.
///
/// go.mod and the file tree are requested for the resolved concrete version,
/// so a concurrent change to the store cannot mix two versions. A tree whose
/// go.mod differs from the one served separately is a bad module.
pub async fn fetch_module(
    getter: &dyn ModuleGetter,
    module_path: &str,
    version: &Version,
    cancel: &CancellationToken,
) -> Result<FetchedModule, GetterError> {
    let kind = getter.kind().as_str();
    debug!("Fetching {}@{} from {}", module_path, version, kind);

    let info = getter.info(module_path, version, cancel).await?;
    let resolved = Version::concrete(info.version.clone());

    let go_mod = getter.module_file(module_path, &resolved, cancel).await?;
    let content = getter.content_dir(module_path, &resolved, cancel).await?;

    if content.exists(MANIFEST_FILE) && content.read_file(MANIFEST_FILE)? != go_mod {
        return Err(GetterError::BadModule(format!(
            "{}@{}: go.mod in module content differs from served go.mod",
            module_path, info.version
        )));
    }

    info!(
        "Fetched {}@{} from {} ({} files)",
        module_path,
        info.version,
        kind,
        content.files()?.len()
    );

    Ok(FetchedModule {
        module_path: module_path.to_string(),
        info,
        go_mod,
        content,
    })
}
