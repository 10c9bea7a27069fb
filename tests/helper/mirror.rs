//! Module mirror fixtures

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;

use modfetch::escape::{Suffix, escaped_path};
use modfetch::getter::FsProxyModuleGetter;

/// Builds a zip whose entries are `files` placed under `prefix`.
pub fn build_module_zip(prefix: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default();
        for (name, content) in files {
            zip.start_file(format!("{}{}", prefix, name), options)
                .unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer.into_inner()
}

/// Temporary module proxy mirror
pub struct MirrorBuilder {
    dir: TempDir,
}

impl MirrorBuilder {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Adds a complete module version: `.info`, `.mod` (taken from the
    /// `go.mod` entry of `files`) and `.zip`.
    pub fn with_module(
        self,
        module: &str,
        version: &str,
        time: &str,
        files: &[(&str, &str)],
    ) -> Self {
        let info = format!(r#"{{"Version":"{}","Time":"{}"}}"#, version, time);
        let go_mod = files
            .iter()
            .find(|(name, _)| *name == "go.mod")
            .map(|(_, content)| content.to_string())
            .unwrap_or_else(|| format!("module {}\n", module));
        let zip = build_module_zip(&format!("{}@{}/", module, version), files);

        self.with_file(module, version, Suffix::Info, info.as_bytes())
            .with_file(module, version, Suffix::Mod, go_mod.as_bytes())
            .with_file(module, version, Suffix::Zip, &zip)
    }

    /// Writes one raw mirror file.
    pub fn with_file(self, module: &str, version: &str, suffix: Suffix, data: &[u8]) -> Self {
        let path = self.file_path(module, version, suffix);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, data).unwrap();
        self
    }

    pub fn file_path(&self, module: &str, version: &str, suffix: Suffix) -> PathBuf {
        escaped_path(self.dir.path(), module, version, suffix).unwrap()
    }

    pub fn getter(&self) -> FsProxyModuleGetter {
        FsProxyModuleGetter::new(self.dir.path()).unwrap()
    }
}
