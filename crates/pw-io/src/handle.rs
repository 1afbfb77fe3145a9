use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{Cursor, Read, Write};
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use crate::archive::ArchiveIndex;
use crate::error::{ResourceError, ResourceResult};
use crate::manager::Shared;
use crate::path;
use crate::root::EmbeddedRoot;

/// Where the bytes behind a handle actually live.
#[derive(Debug)]
pub(crate) enum Backing {
    /// A file or directory on disk, possibly not yet created.
    Fs { path: PathBuf, writable: bool },
    /// An entry inside an archive. The empty entry is the archive itself.
    Archive { index: Rc<ArchiveIndex>, entry: String },
    /// A file or implied directory in an embedded root.
    Embedded { root: Rc<EmbeddedRoot>, key: String },
}

/// A resolved logical path.
///
/// Handles are created by a [`ResourceManager`](crate::ResourceManager) and
/// shared through `Rc`. Navigation (`parent`, `child`, `sibling`, `list`)
/// goes back through the manager, so those calls fail with
/// [`ResourceError::ManagerDropped`] once the manager is gone.
#[derive(Debug)]
pub struct FileHandle {
    path: String,
    backing: Backing,
    manager: Weak<Shared>,
}

impl FileHandle {
    pub(crate) fn new(path: String, backing: Backing, manager: Weak<Shared>) -> Self {
        Self {
            path,
            backing,
            manager,
        }
    }

    /// Logical path, always starting with `/`.
    pub fn path(&self) -> String {
        path::display(&self.path)
    }

    /// File name without its extension.
    pub fn name(&self) -> &str {
        let file = path::file_name(&self.path);
        match file.rfind('.') {
            Some(0) | None => file,
            Some(i) => &file[..i],
        }
    }

    /// Extension of the file name, without the dot.
    pub fn extension(&self) -> Option<&str> {
        let file = path::file_name(&self.path);
        match file.rfind('.') {
            Some(0) | None => None,
            Some(i) => Some(&file[i + 1..]),
        }
    }

    /// Return `true` if something exists at this path.
    pub fn exists(&self) -> bool {
        match &self.backing {
            Backing::Fs { path, .. } => path.exists(),
            Backing::Archive { index, entry } => {
                index.contains_file(entry) || index.contains_dir(entry)
            }
            Backing::Embedded { root, key } => root.file(key).is_some() || root.is_dir(key),
        }
    }

    /// Return `true` if this handle is a directory. Archives count as
    /// directories.
    pub fn is_directory(&self) -> bool {
        match &self.backing {
            Backing::Fs { path, .. } => path.is_dir(),
            Backing::Archive { index, entry } => index.contains_dir(entry),
            Backing::Embedded { root, key } => root.is_dir(key),
        }
    }

    /// Return `true` if [`write`](Self::write) can succeed.
    pub fn writable(&self) -> bool {
        match &self.backing {
            Backing::Fs { path, writable } => *writable && !path.is_dir(),
            Backing::Archive { .. } | Backing::Embedded { .. } => false,
        }
    }

    /// Physical location, when the handle is backed by the file system.
    ///
    /// Archive entries report `<archive>/<entry>`; embedded files have none.
    pub fn physical_path(&self) -> Option<PathBuf> {
        match &self.backing {
            Backing::Fs { path, .. } => Some(path.clone()),
            Backing::Archive { index, entry } if entry.is_empty() => {
                Some(index.path().to_path_buf())
            }
            Backing::Archive { index, entry } => Some(index.path().join(entry)),
            Backing::Embedded { .. } => None,
        }
    }

    /// Size in bytes, or 0 for directories and missing files.
    pub fn length(&self) -> u64 {
        if self.is_directory() {
            return 0;
        }
        match &self.backing {
            Backing::Fs { path, .. } => fs::metadata(path).map(|m| m.len()).unwrap_or(0),
            Backing::Archive { index, entry } => index.size(entry),
            Backing::Embedded { root, key } => root.file(key).map_or(0, |b| b.len() as u64),
        }
    }

    /// Open the file for reading.
    pub fn read(&self) -> ResourceResult<Box<dyn Read>> {
        if self.is_directory() {
            return Err(ResourceError::NotReadable(self.path()));
        }
        match &self.backing {
            Backing::Fs { path, .. } => {
                let file = fs::File::open(path).map_err(|e| ResourceError::io(self.path(), e))?;
                Ok(Box::new(file))
            }
            Backing::Archive { index, entry } => Ok(Box::new(Cursor::new(index.read(entry)?))),
            Backing::Embedded { root, key } => match root.file(key) {
                Some(bytes) => Ok(Box::new(Cursor::new(bytes.to_vec()))),
                None => Err(ResourceError::NotFound(self.path())),
            },
        }
    }

    /// Read the whole file as UTF-8 text.
    pub fn read_string(&self) -> ResourceResult<String> {
        let mut text = String::new();
        self.read()?
            .read_to_string(&mut text)
            .map_err(|e| ResourceError::io(self.path(), e))?;
        Ok(text)
    }

    /// Open the file for writing, creating it and its parent directories as
    /// needed. With `append` the existing contents are kept.
    pub fn write(&self, append: bool) -> ResourceResult<Box<dyn Write>> {
        let Backing::Fs { path, .. } = &self.backing else {
            return Err(ResourceError::ReadOnly(self.path()));
        };
        if !self.writable() {
            return Err(ResourceError::ReadOnly(self.path()));
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ResourceError::io(self.path(), e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)
            .map_err(|e| ResourceError::io(self.path(), e))?;
        tracing::trace!(path = %self.path(), append, "opened resource for writing");
        Ok(Box::new(file))
    }

    /// Write `text` to the file.
    pub fn write_string(&self, text: &str, append: bool) -> ResourceResult<()> {
        self.write(append)?
            .write_all(text.as_bytes())
            .map_err(|e| ResourceError::io(self.path(), e))
    }

    /// Delete the file. Deleting a missing file succeeds.
    pub fn delete(&self) -> ResourceResult<()> {
        let Backing::Fs { path, .. } = &self.backing else {
            return Err(ResourceError::ReadOnly(self.path()));
        };
        if !self.writable() {
            return Err(ResourceError::ReadOnly(self.path()));
        }
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ResourceError::io(self.path(), e)),
        }
    }

    /// Handles for the direct children of a directory, merged across every
    /// root that contains it. Files have no children.
    pub fn list(&self) -> ResourceResult<Vec<Rc<FileHandle>>> {
        if !self.is_directory() {
            return Ok(Vec::new());
        }
        self.shared()?.list(&self.path)
    }

    /// Children whose file name ends with `suffix`.
    pub fn list_with_suffix(&self, suffix: &str) -> ResourceResult<Vec<Rc<FileHandle>>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|h| path::file_name(&h.path).ends_with(suffix))
            .collect())
    }

    /// The containing directory. The root is its own parent.
    pub fn parent(&self) -> ResourceResult<Rc<FileHandle>> {
        self.shared()?.resolve(path::parent(&self.path))
    }

    /// A handle in the same directory.
    pub fn sibling(&self, name: &str) -> ResourceResult<Rc<FileHandle>> {
        let joined = path::join(path::parent(&self.path), name);
        self.shared()?.resolve(&path::normalize(&joined)?)
    }

    /// A handle inside this directory.
    pub fn child(&self, name: &str) -> ResourceResult<Rc<FileHandle>> {
        let joined = path::join(&self.path, name);
        self.shared()?.resolve(&path::normalize(&joined)?)
    }

    fn shared(&self) -> ResourceResult<Rc<Shared>> {
        self.manager
            .upgrade()
            .ok_or_else(|| ResourceError::ManagerDropped(self.path()))
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
