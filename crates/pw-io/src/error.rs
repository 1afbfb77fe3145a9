/// Alias for `Result<T, ResourceError>`.
pub type ResourceResult<T> = Result<T, ResourceError>;

/// Errors raised while resolving or accessing resources.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// No root contains the path and no writable root can create it.
    #[error("no resource at {0}, and no writable root can create it")]
    NotFound(String),

    /// The handle names a directory or archive, which has no byte content.
    #[error("{0} is a directory and cannot be read")]
    NotReadable(String),

    /// The handle lives in a read-only root.
    #[error("{0} is not writable")]
    ReadOnly(String),

    /// The logical path escapes the root or is otherwise malformed.
    #[error("invalid resource path \"{0}\"")]
    InvalidPath(String),

    /// An operating-system I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Logical or physical path being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The archive could not be opened or an entry could not be read.
    #[error("archive error in {path}: {source}")]
    Archive {
        /// Physical path of the archive.
        path: String,
        /// Underlying error.
        #[source]
        source: zip::result::ZipError,
    },

    /// A handle tried to navigate after its manager was dropped.
    #[error("the resource manager that resolved {0} no longer exists")]
    ManagerDropped(String),
}

impl ResourceError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
