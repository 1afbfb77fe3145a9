use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::path;

/// Order in which declared roots are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadOrder {
    /// Roots are consulted in the order they were added.
    #[default]
    Declared,
    /// Roots are consulted alphabetically by their label.
    Alphabetical,
}

/// A backing store that contributes files to the logical tree.
#[derive(Debug, Clone)]
pub enum ResourceRoot {
    /// A directory on disk.
    Directory {
        /// Physical directory.
        path: PathBuf,
        /// Whether new files may be created and existing files written.
        writable: bool,
    },
    /// A zip or jar archive, always read-only.
    Archive {
        /// Physical archive file.
        path: PathBuf,
    },
    /// Files compiled into the binary or built in memory, always read-only.
    Embedded(EmbeddedRoot),
}

impl ResourceRoot {
    /// A read-only directory root.
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory {
            path: path.into(),
            writable: false,
        }
    }

    /// A directory root that accepts writes and new files.
    pub fn writable_directory(path: impl Into<PathBuf>) -> Self {
        Self::Directory {
            path: path.into(),
            writable: true,
        }
    }

    /// An archive root.
    pub fn archive(path: impl Into<PathBuf>) -> Self {
        Self::Archive { path: path.into() }
    }

    /// An embedded root.
    pub fn embedded(root: EmbeddedRoot) -> Self {
        Self::Embedded(root)
    }

    /// Label used for alphabetical ordering and diagnostics.
    pub fn label(&self) -> String {
        match self {
            Self::Directory { path, .. } | Self::Archive { path } => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Embedded(root) => root.name().to_string(),
        }
    }
}

/// An in-memory tree of files, typically built from `include_bytes!`.
///
/// Directories are implied by the file paths.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedRoot {
    name: String,
    files: BTreeMap<String, Cow<'static, [u8]>>,
}

impl EmbeddedRoot {
    /// Create an empty embedded root with a label.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeMap::new(),
        }
    }

    /// Add a file. Paths are normalized; a path that climbs with `..` is ignored.
    pub fn with_file(mut self, file: &str, contents: impl Into<Cow<'static, [u8]>>) -> Self {
        match path::normalize(file) {
            Ok(canonical) if !canonical.is_empty() => {
                self.files.insert(canonical, contents.into());
            }
            _ => tracing::warn!(root = %self.name, file, "ignoring invalid embedded path"),
        }
        self
    }

    /// The label of this root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn file(&self, canonical: &str) -> Option<&[u8]> {
        self.files.get(canonical).map(|c| c.as_ref())
    }

    pub(crate) fn is_dir(&self, canonical: &str) -> bool {
        canonical.is_empty()
            || self
                .files
                .keys()
                .any(|k| k.len() > canonical.len() && k.starts_with(canonical) && k.as_bytes()[canonical.len()] == b'/')
    }

    pub(crate) fn children(&self, dir: &str) -> Vec<String> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        let mut names: Vec<String> = self
            .files
            .keys()
            .filter_map(|k| k.strip_prefix(prefix.as_str()))
            .map(|rest| rest.split('/').next().unwrap_or(rest).to_string())
            .collect();
        names.dedup();
        names
    }
}
