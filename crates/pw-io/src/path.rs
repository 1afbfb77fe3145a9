use crate::error::{ResourceError, ResourceResult};

/// Normalize a logical path to its canonical relative form.
///
/// Leading, trailing, and repeated separators and `.` segments are dropped;
/// the root is the empty string. `..` is rejected rather than resolved so a
/// path can never climb out of a root.
pub fn normalize(path: &str) -> ResourceResult<String> {
    let mut parts = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => return Err(ResourceError::InvalidPath(path.to_string())),
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}

/// Display form of a canonical path: always starts with `/`.
pub fn display(canonical: &str) -> String {
    format!("/{canonical}")
}

/// Join a child name onto a canonical path.
pub fn join(canonical: &str, name: &str) -> String {
    if canonical.is_empty() {
        name.to_string()
    } else {
        format!("{canonical}/{name}")
    }
}

/// Canonical parent of a canonical path. The root is its own parent.
pub fn parent(canonical: &str) -> &str {
    match canonical.rfind('/') {
        Some(i) => &canonical[..i],
        None => "",
    }
}

/// Last segment of a canonical path.
pub fn file_name(canonical: &str) -> &str {
    match canonical.rfind('/') {
        Some(i) => &canonical[i + 1..],
        None => canonical,
    }
}

/// Return `true` if a file name looks like an archive the layer can mount.
pub fn is_archive_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".zip") || lower.ends_with(".jar")
}
