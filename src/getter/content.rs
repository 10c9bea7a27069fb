//! Read-only module file trees
//!
//! A [`ContentDir`] is rooted at a module's logical root. Paths are relative
//! and slash-separated; absolute paths and `..` components never resolve.
//!
//! Two backings exist:
//! - [`DirContent`]: a directory on disk, minus VCS metadata and nested modules
//! - [`ZipContent`]: a module zip with its `<module>@<version>/` prefix stripped

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;
use zip::ZipArchive;

use crate::getter::error::GetterError;
use crate::modfile::MANIFEST_FILE;

/// Directories that belong to version control, not to the module
pub const VCS_DIRS: &[&str] = &[".bzr", ".git", ".hg", ".svn"];

/// Largest uncompressed size accepted for a single zip entry (500 MiB)
pub const MAX_ZIP_FILE_SIZE: u64 = 500 << 20;

/// Upper bound for pre-allocating a read buffer
const READ_BUFFER_HINT: u64 = 1 << 20;

/// A virtual read-only file tree
pub trait ContentDir: Send + Sync + fmt::Debug {
    /// Opens a regular file for reading.
    fn open(&self, path: &str) -> Result<ContentFile, GetterError>;

    /// Lists every regular file, sorted.
    fn files(&self) -> Result<Vec<String>, GetterError>;

    fn exists(&self, path: &str) -> bool {
        self.open(path).is_ok()
    }

    /// Reads a whole file.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, GetterError> {
        let mut file = self.open(path)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

/// An open file from a [`ContentDir`]; the handle is released on drop.
#[derive(Debug)]
pub struct ContentFile {
    reader: Reader,
}

#[derive(Debug)]
enum Reader {
    Disk(File),
    Memory(Cursor<Vec<u8>>),
}

impl ContentFile {
    pub fn from_file(file: File) -> Self {
        Self {
            reader: Reader::Disk(file),
        }
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            reader: Reader::Memory(Cursor::new(data)),
        }
    }
}

impl Read for ContentFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.reader {
            Reader::Disk(f) => f.read(buf),
            Reader::Memory(c) => c.read(buf),
        }
    }
}

/// Normalizes a relative slash-separated path.
///
/// Returns `None` for empty, absolute or parent-escaping paths.
fn clean_path(path: &str) -> Option<String> {
    if path.starts_with('/') || path.starts_with('\\') {
        return None;
    }

    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => return None,
            p if p.contains('\\') => return None,
            p => parts.push(p),
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn not_found(path: &str) -> GetterError {
    GetterError::NotFound(format!("{} in module content", path))
}

fn oversized(path: &str, size: u64) -> GetterError {
    GetterError::BadModule(format!(
        "zip entry {:?} is {} bytes, limit is {}",
        path, size, MAX_ZIP_FILE_SIZE
    ))
}

/// Module content backed by a directory on disk.
#[derive(Debug, Clone)]
pub struct DirContent {
    root: PathBuf,
}

impl DirContent {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// True if `dir` (relative to root, non-empty) must be left out of the tree.
    fn is_excluded_dir(&self, rel: &Path, name: &str) -> bool {
        VCS_DIRS.contains(&name) || self.root.join(rel).join(MANIFEST_FILE).is_file()
    }

    fn walk(&self, rel: &Path, out: &mut Vec<String>) -> Result<(), GetterError> {
        for entry in std::fs::read_dir(self.root.join(rel))? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                debug!("Skipping non UTF-8 entry in {:?}", rel);
                continue;
            };
            let child = rel.join(name);

            if file_type.is_dir() {
                if !self.is_excluded_dir(&child, name) {
                    self.walk(&child, out)?;
                }
            } else if file_type.is_file() {
                let parts: Vec<&str> = child
                    .components()
                    .filter_map(|c| c.as_os_str().to_str())
                    .collect();
                out.push(parts.join("/"));
            }
        }
        Ok(())
    }
}

impl ContentDir for DirContent {
    fn open(&self, path: &str) -> Result<ContentFile, GetterError> {
        let cleaned = clean_path(path).ok_or_else(|| not_found(path))?;
        let segments: Vec<&str> = cleaned.split('/').collect();

        // Every directory on the way must be part of this module. Symlinks
        // are not followed, matching what files() lists.
        let mut rel = PathBuf::new();
        for dir in &segments[..segments.len() - 1] {
            rel.push(dir);
            let full = self.root.join(&rel);
            let metadata =
                std::fs::symlink_metadata(&full).map_err(|e| GetterError::from_read(e, &full))?;
            if !metadata.is_dir() || self.is_excluded_dir(&rel, dir) {
                return Err(not_found(path));
            }
        }

        let full = self.root.join(segments.join(std::path::MAIN_SEPARATOR_STR));
        let metadata =
            std::fs::symlink_metadata(&full).map_err(|e| GetterError::from_read(e, &full))?;
        if !metadata.is_file() {
            return Err(not_found(path));
        }
        let file = File::open(&full).map_err(|e| GetterError::from_read(e, &full))?;
        Ok(ContentFile::from_file(file))
    }

    fn files(&self) -> Result<Vec<String>, GetterError> {
        let mut out = Vec::new();
        self.walk(Path::new(""), &mut out)?;
        out.sort();
        Ok(out)
    }
}

/// Module content backed by an in-memory zip archive.
///
/// Only entry names are indexed up front; file data is decompressed when a
/// file is opened.
#[derive(Clone)]
pub struct ZipContent {
    archive: ZipArchive<Cursor<Arc<[u8]>>>,
    /// Stripped path -> archive index
    entries: BTreeMap<String, usize>,
}

impl ZipContent {
    /// Indexes `data`, requiring every entry name to start with `prefix`
    /// (normally `<module>@<version>/`) and stripping it.
    pub fn new(data: impl Into<Arc<[u8]>>, prefix: &str) -> Result<Self, GetterError> {
        let mut archive = ZipArchive::new(Cursor::new(data.into()))?;
        let mut entries = BTreeMap::new();

        for index in 0..archive.len() {
            let file = archive.by_index_raw(index)?;
            let name = file.name();

            let Some(stripped) = name.strip_prefix(prefix) else {
                return Err(GetterError::BadModule(format!(
                    "zip entry {:?} does not start with {:?}",
                    name, prefix
                )));
            };

            if file.is_dir() || stripped.is_empty() {
                continue;
            }

            let cleaned = clean_path(stripped).ok_or_else(|| {
                GetterError::BadModule(format!("zip entry {:?} has an unsafe path", name))
            })?;
            if entries.insert(cleaned, index).is_some() {
                return Err(GetterError::BadModule(format!(
                    "zip entry {:?} is duplicated",
                    name
                )));
            }
        }

        debug!("Indexed {} zip entries under {:?}", entries.len(), prefix);
        Ok(Self { archive, entries })
    }

}

impl fmt::Debug for ZipContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipContent")
            .field("entries", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ContentDir for ZipContent {
    fn open(&self, path: &str) -> Result<ContentFile, GetterError> {
        let index = clean_path(path)
            .and_then(|p| self.entries.get(&p).copied())
            .ok_or_else(|| not_found(path))?;

        // Clones share the parsed central directory; only the cursor is copied.
        let mut archive = self.archive.clone();
        let file = archive.by_index(index)?;
        let declared = file.size();
        if declared > MAX_ZIP_FILE_SIZE {
            return Err(oversized(path, declared));
        }

        let mut data = Vec::with_capacity(declared.min(READ_BUFFER_HINT) as usize);
        file.take(MAX_ZIP_FILE_SIZE + 1).read_to_end(&mut data)?;
        if data.len() as u64 > MAX_ZIP_FILE_SIZE {
            return Err(oversized(path, data.len() as u64));
        }
        Ok(ContentFile::from_bytes(data))
    }

    fn files(&self) -> Result<Vec<String>, GetterError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn exists(&self, path: &str) -> bool {
        clean_path(path).is_some_and(|p| self.entries.contains_key(&p))
    }
}
