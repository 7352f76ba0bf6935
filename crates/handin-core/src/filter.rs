//! Archive exclusion rules.

use std::path::Path;

/// Suffixes of compiled artifacts left out of archives by default.
pub const DEFAULT_EXCLUDED_SUFFIXES: &[&str] = &[".pyc", ".pyo", ".class", ".o"];

/// Leading character of hidden files and directories.
pub const DEFAULT_HIDDEN_MARKER: char = '.';

/// Decides which paths stay out of a library archive.
///
/// A path is excluded when its file name ends with one of the configured
/// suffixes or starts with the hidden-file marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFilter {
    suffixes: Vec<String>,
    hidden_marker: char,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_SUFFIXES.iter().copied(), DEFAULT_HIDDEN_MARKER)
    }
}

impl PathFilter {
    /// Creates a filter from a suffix list and a hidden-file marker.
    #[must_use]
    pub fn new<I, S>(suffixes: I, hidden_marker: char) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(Into::into)
                .filter(|s: &String| !s.is_empty())
                .collect(),
            hidden_marker,
        }
    }

    /// Adds another excluded suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        if !suffix.is_empty() && !self.suffixes.contains(&suffix) {
            self.suffixes.push(suffix);
        }
        self
    }

    /// Returns the excluded suffixes.
    #[must_use]
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// Returns true if `path` must not be archived.
    ///
    /// Only the final component is inspected; a path without one (such as
    /// `/` or `..`) is never excluded.
    #[must_use]
    pub fn should_exclude(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        name.starts_with(self.hidden_marker)
            || self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }
}
