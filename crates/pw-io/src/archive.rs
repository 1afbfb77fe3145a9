use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error::{ResourceError, ResourceResult};
use crate::path;

/// The entry listing of a zip or jar archive, read once at open time.
///
/// Entry contents are read lazily: each [`read`](Self::read) reopens the
/// archive, so an index never holds a file descriptor.
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    path: PathBuf,
    files: BTreeSet<String>,
    dirs: BTreeSet<String>,
}

impl ArchiveIndex {
    /// Read the central directory of the archive at `path`.
    pub fn open(path: &Path) -> ResourceResult<Self> {
        let archive = open_archive(path)?;
        let mut files = BTreeSet::new();
        let mut dirs = BTreeSet::new();

        for name in archive.file_names() {
            let Ok(canonical) = path::normalize(name) else {
                tracing::warn!(archive = %path.display(), entry = name, "skipping unsafe archive entry");
                continue;
            };
            if canonical.is_empty() {
                continue;
            }
            if name.ends_with('/') {
                dirs.insert(canonical.clone());
            } else {
                files.insert(canonical.clone());
            }
            // Zips do not always carry explicit directory entries.
            let mut ancestor = path::parent(&canonical);
            while !ancestor.is_empty() {
                dirs.insert(ancestor.to_string());
                ancestor = path::parent(ancestor);
            }
        }

        tracing::debug!(
            archive = %path.display(),
            files = files.len(),
            dirs = dirs.len(),
            "indexed archive"
        );
        Ok(Self {
            path: path.to_path_buf(),
            files,
            dirs,
        })
    }

    /// Physical path of the archive file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return `true` if `entry` names a file in the archive.
    pub fn contains_file(&self, entry: &str) -> bool {
        self.files.contains(entry)
    }

    /// Return `true` if `entry` names a directory in the archive. The empty
    /// entry is the archive root.
    pub fn contains_dir(&self, entry: &str) -> bool {
        entry.is_empty() || self.dirs.contains(entry)
    }

    /// Names of the direct children of a directory entry.
    pub fn children(&self, dir: &str) -> Vec<String> {
        self.files
            .iter()
            .chain(self.dirs.iter())
            .filter(|entry| path::parent(entry) == dir && entry.as_str() != dir)
            .map(|entry| path::file_name(entry).to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Read the full contents of a file entry.
    pub fn read(&self, entry: &str) -> ResourceResult<Vec<u8>> {
        let mut archive = open_archive(&self.path)?;
        let mut file = archive.by_name(entry).map_err(|source| ResourceError::Archive {
            path: self.path.display().to_string(),
            source,
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| ResourceError::io(format!("{}/{entry}", self.path.display()), e))?;
        Ok(bytes)
    }

    /// Uncompressed size of a file entry, or 0 if it cannot be read.
    pub fn size(&self, entry: &str) -> u64 {
        let Ok(mut archive) = open_archive(&self.path) else {
            return 0;
        };
        match archive.by_name(entry) {
            Ok(file) => file.size(),
            Err(_) => 0,
        }
    }
}

fn open_archive(path: &Path) -> ResourceResult<ZipArchive<File>> {
    let file = File::open(path).map_err(|e| ResourceError::io(path.display().to_string(), e))?;
    ZipArchive::new(file).map_err(|source| ResourceError::Archive {
        path: path.display().to_string(),
        source,
    })
}
