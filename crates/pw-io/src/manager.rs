use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::archive::ArchiveIndex;
use crate::error::{ResourceError, ResourceResult};
use crate::handle::{Backing, FileHandle};
use crate::path;
use crate::root::{EmbeddedRoot, LoadOrder, ResourceRoot};

/// A root after mounting.
#[derive(Debug)]
enum Mount {
    Directory { path: PathBuf, writable: bool },
    Archive(Rc<ArchiveIndex>),
    Embedded(Rc<EmbeddedRoot>),
}

impl Mount {
    fn label(&self) -> String {
        match self {
            Self::Directory { path, writable } => {
                let mode = if *writable { "rw" } else { "ro" };
                format!("dir:{} ({mode})", path.display())
            }
            Self::Archive(index) => format!("archive:{}", index.path().display()),
            Self::Embedded(root) => format!("embedded:{}", root.name()),
        }
    }
}

/// State shared between a manager and the handles it resolved.
#[derive(Debug)]
pub(crate) struct Shared {
    mounts: Vec<Mount>,
    cache: RefCell<HashMap<String, Rc<FileHandle>>>,
    nested: RefCell<HashMap<PathBuf, Rc<ArchiveIndex>>>,
}

impl Shared {
    /// Resolve a canonical path, consulting the cache first.
    pub(crate) fn resolve(self: &Rc<Self>, canonical: &str) -> ResourceResult<Rc<FileHandle>> {
        if let Some(hit) = self.cache.borrow().get(canonical) {
            tracing::trace!(path = %path::display(canonical), "resource cache hit");
            return Ok(Rc::clone(hit));
        }

        let backing = self.locate(canonical)?;
        let handle = Rc::new(FileHandle::new(
            canonical.to_string(),
            backing,
            Rc::downgrade(self),
        ));
        tracing::debug!(path = %handle.path(), "resolved resource");
        self.cache
            .borrow_mut()
            .insert(canonical.to_string(), Rc::clone(&handle));
        Ok(handle)
    }

    /// Handles for the children of a directory across all mounts.
    pub(crate) fn list(self: &Rc<Self>, canonical: &str) -> ResourceResult<Vec<Rc<FileHandle>>> {
        let mut names = BTreeSet::new();
        for mount in &self.mounts {
            names.extend(self.children_in(mount, canonical));
        }
        names
            .into_iter()
            .map(|name| self.resolve(&path::join(canonical, &name)))
            .collect()
    }

    fn locate(&self, canonical: &str) -> ResourceResult<Backing> {
        for mount in &self.mounts {
            if let Some(backing) = self.locate_in(mount, canonical) {
                return Ok(backing);
            }
        }

        let writable_root = self.mounts.iter().find_map(|m| match m {
            Mount::Directory {
                path,
                writable: true,
            } => Some(path),
            _ => None,
        });
        match writable_root {
            Some(root) => Ok(Backing::Fs {
                path: physical(root, canonical),
                writable: true,
            }),
            None => Err(ResourceError::NotFound(path::display(canonical))),
        }
    }

    fn locate_in(&self, mount: &Mount, canonical: &str) -> Option<Backing> {
        match mount {
            Mount::Directory { path, writable } => {
                if let Some((index, entry)) = self.nested_archive(path, canonical) {
                    let present = index.contains_file(&entry) || index.contains_dir(&entry);
                    return present.then_some(Backing::Archive { index, entry });
                }
                let physical = physical(path, canonical);
                physical.exists().then(|| Backing::Fs {
                    path: physical,
                    writable: *writable,
                })
            }
            Mount::Archive(index) => (index.contains_file(canonical)
                || index.contains_dir(canonical))
            .then(|| Backing::Archive {
                index: Rc::clone(index),
                entry: canonical.to_string(),
            }),
            Mount::Embedded(root) => (root.file(canonical).is_some() || root.is_dir(canonical))
                .then(|| Backing::Embedded {
                    root: Rc::clone(root),
                    key: canonical.to_string(),
                }),
        }
    }

    fn children_in(&self, mount: &Mount, canonical: &str) -> Vec<String> {
        match mount {
            Mount::Directory { path, .. } => {
                if let Some((index, entry)) = self.nested_archive(path, canonical) {
                    return index.children(&entry);
                }
                let Ok(entries) = fs::read_dir(physical(path, canonical)) else {
                    return Vec::new();
                };
                entries
                    .filter_map(Result::ok)
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            }
            Mount::Archive(index) if index.contains_dir(canonical) => index.children(canonical),
            Mount::Archive(_) => Vec::new(),
            Mount::Embedded(root) => root.children(canonical),
        }
    }

    /// If some prefix of `canonical` names an archive file inside `dir`,
    /// return that archive's index and the remaining entry path.
    fn nested_archive(&self, dir: &Path, canonical: &str) -> Option<(Rc<ArchiveIndex>, String)> {
        let segments: Vec<&str> = canonical.split('/').filter(|s| !s.is_empty()).collect();
        for (i, segment) in segments.iter().enumerate() {
            if !path::is_archive_name(segment) {
                continue;
            }
            let prefix = segments[..=i].join("/");
            let candidate = physical(dir, &prefix);
            if !candidate.is_file() {
                continue;
            }
            let index = self.nested_index(&candidate)?;
            return Some((index, segments[i + 1..].join("/")));
        }
        None
    }

    fn nested_index(&self, archive: &Path) -> Option<Rc<ArchiveIndex>> {
        if let Some(index) = self.nested.borrow().get(archive) {
            return Some(Rc::clone(index));
        }
        match ArchiveIndex::open(archive) {
            Ok(index) => {
                let index = Rc::new(index);
                self.nested
                    .borrow_mut()
                    .insert(archive.to_path_buf(), Rc::clone(&index));
                Some(index)
            }
            Err(e) => {
                tracing::warn!(archive = %archive.display(), error = %e, "cannot open nested archive");
                None
            }
        }
    }
}

fn physical(root: &Path, canonical: &str) -> PathBuf {
    canonical
        .split('/')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Resolves logical paths against an ordered list of mounted roots.
///
/// The first root containing a path wins. A path no root contains resolves
/// into the first writable directory root, so it can be created; without one
/// it is [`ResourceError::NotFound`].
#[derive(Debug, Clone)]
pub struct ResourceManager {
    shared: Rc<Shared>,
}

impl ResourceManager {
    /// Start building a manager.
    pub fn builder() -> ResourceManagerBuilder {
        ResourceManagerBuilder::default()
    }

    /// Resolve a logical path to a shared handle.
    ///
    /// Repeated lookups of the same path return the same `Rc`.
    pub fn handle(&self, logical: &str) -> ResourceResult<Rc<FileHandle>> {
        let canonical = path::normalize(logical)?;
        self.shared.resolve(&canonical)
    }

    /// Descriptions of the mounted roots in precedence order.
    pub fn mount_labels(&self) -> Vec<String> {
        self.shared.mounts.iter().map(Mount::label).collect()
    }

    /// Number of cached handles.
    pub fn cached(&self) -> usize {
        self.shared.cache.borrow().len()
    }
}

/// Builder for [`ResourceManager`].
#[derive(Debug, Clone, Default)]
pub struct ResourceManagerBuilder {
    roots: Vec<ResourceRoot>,
    order: LoadOrder,
    discover_archives: bool,
}

impl ResourceManagerBuilder {
    /// Add a root.
    pub fn with_root(mut self, root: ResourceRoot) -> Self {
        self.roots.push(root);
        self
    }

    /// Add several roots.
    pub fn with_roots(mut self, roots: impl IntoIterator<Item = ResourceRoot>) -> Self {
        self.roots.extend(roots);
        self
    }

    /// Set the order in which roots are consulted.
    pub fn with_load_order(mut self, order: LoadOrder) -> Self {
        self.order = order;
        self
    }

    /// Mount the `.zip` and `.jar` files at the top level of each directory
    /// root, alphabetically, right after that directory.
    pub fn with_archive_discovery(mut self, enabled: bool) -> Self {
        self.discover_archives = enabled;
        self
    }

    /// Mount every root and build the manager.
    ///
    /// Archives that cannot be opened are skipped with a warning.
    pub fn build(self) -> ResourceManager {
        let mut roots = self.roots;
        if self.order == LoadOrder::Alphabetical {
            roots.sort_by_key(ResourceRoot::label);
        }

        let mut mounts = Vec::new();
        for root in roots {
            match root {
                ResourceRoot::Directory { path, writable } => {
                    let discovered = if self.discover_archives {
                        discover_archives(&path)
                    } else {
                        Vec::new()
                    };
                    mounts.push(Mount::Directory { path, writable });
                    mounts.extend(discovered.into_iter().map(Mount::Archive));
                }
                ResourceRoot::Archive { path } => match ArchiveIndex::open(&path) {
                    Ok(index) => mounts.push(Mount::Archive(Rc::new(index))),
                    Err(e) => tracing::warn!(archive = %path.display(), error = %e, "skipping archive root"),
                },
                ResourceRoot::Embedded(root) => mounts.push(Mount::Embedded(Rc::new(root))),
            }
        }

        for mount in &mounts {
            tracing::debug!(root = %mount.label(), "mounted resource root");
        }
        ResourceManager {
            shared: Rc::new(Shared {
                mounts,
                cache: RefCell::new(HashMap::new()),
                nested: RefCell::new(HashMap::new()),
            }),
        }
    }
}

fn discover_archives(dir: &Path) -> Vec<Rc<ArchiveIndex>> {
    let Ok(entries) = fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "cannot scan directory root for archives");
        return Vec::new();
    };
    let mut found: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .is_some_and(|n| path::is_archive_name(&n.to_string_lossy()))
        })
        .collect();
    found.sort();

    found
        .into_iter()
        .filter_map(|archive| match ArchiveIndex::open(&archive) {
            Ok(index) => Some(Rc::new(index)),
            Err(e) => {
                tracing::warn!(archive = %archive.display(), error = %e, "skipping discovered archive");
                None
            }
        })
        .collect()
}
