//! Path helpers shared by the resolver and the archiver.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Makes `path` absolute and removes `.`, `..` and trailing separators
/// without touching the filesystem, so `parent()` and `file_name()` mean
/// what the user typed.
pub fn normalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

/// Renders a relative path with `/` separators.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_separator_and_dots() {
        let normalized = normalize(Path::new("/tmp/hoppity/./python/")).unwrap();
        assert_eq!(normalized, PathBuf::from("/tmp/hoppity/python"));
        assert_eq!(normalized.file_name().unwrap(), "python");
    }

    #[test]
    fn resolves_parent_components_lexically() {
        let normalized = normalize(Path::new("/tmp/hoppity/python/../ruby")).unwrap();
        assert_eq!(normalized, PathBuf::from("/tmp/hoppity/ruby"));
    }

    #[test]
    fn relative_paths_become_absolute() {
        let normalized = normalize(Path::new("python")).unwrap();
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("python"));
    }

    #[test]
    fn slash_path_joins_components() {
        assert_eq!(slash_path(Path::new("lib/sub/a.txt")), "lib/sub/a.txt");
    }
}
