//! Solution directory validation and attachment selection.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::archive::{ArchiveSummary, Archiver};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::paths::normalize;

/// Build-control file preferred over a puzzle-named executable.
pub const MAKEFILE: &str = "Makefile";

/// Files to attach: the primary artifact first, then the optional archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSet {
    primary: PathBuf,
    archive: Option<PathBuf>,
}

impl AttachmentSet {
    /// Creates a set from a primary artifact and an optional archive.
    #[must_use]
    pub const fn new(primary: PathBuf, archive: Option<PathBuf>) -> Self {
        Self { primary, archive }
    }

    /// The `Makefile` or puzzle-named executable.
    #[must_use]
    pub fn primary(&self) -> &Path {
        &self.primary
    }

    /// The library archive, if one was built.
    #[must_use]
    pub fn archive(&self) -> Option<&Path> {
        self.archive.as_deref()
    }

    /// Paths in attachment order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.primary.as_path()).chain(self.archive.as_deref())
    }

    /// Owned paths in attachment order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<PathBuf> {
        self.iter().map(Path::to_path_buf).collect()
    }
}

/// A validated solution directory.
#[derive(Debug, Clone)]
pub struct Submission {
    /// Normalized absolute directory.
    pub directory: PathBuf,
    /// Puzzle name taken from the parent directory.
    pub name: String,
    /// Files to attach.
    pub attachments: AttachmentSet,
    /// Details of the library archive, if one was built.
    pub archive: Option<ArchiveSummary>,
}

/// Turns a directory argument into a [`Submission`].
#[derive(Debug, Clone)]
pub struct SubmissionResolver {
    puzzles: BTreeSet<String>,
    library_dir: String,
    archiver: Archiver,
}

impl SubmissionResolver {
    /// Creates a resolver from explicit rules.
    #[must_use]
    pub fn new(
        puzzles: BTreeSet<String>,
        library_dir: impl Into<String>,
        archiver: Archiver,
    ) -> Self {
        Self {
            puzzles,
            library_dir: library_dir.into(),
            archiver,
        }
    }

    /// Creates a resolver from settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.puzzles.clone(),
            settings.library_dir.clone(),
            Archiver::new(settings.path_filter()),
        )
    }

    /// Validates `raw` and selects its attachments.
    ///
    /// The directory's parent must carry a recognized puzzle name. A
    /// `Makefile` wins over an executable named after the puzzle. If a
    /// library folder exists it is archived next to itself and attached
    /// second.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingArgument`] when `raw` is `None`
    /// - [`Error::InvalidDirectory`] when `raw` is not an existing directory
    /// - [`Error::UnrecognizedName`] when the parent name is not recognized
    /// - [`Error::NoPrimaryArtifact`] when there is nothing to attach
    /// - [`Error::ArchiveIo`] when the library archive cannot be written
    pub fn resolve(&self, raw: Option<&Path>) -> Result<Submission> {
        let raw = raw.ok_or(Error::MissingArgument)?;
        let directory = normalize(raw).map_err(|_| Error::InvalidDirectory(raw.to_path_buf()))?;
        if !directory.is_dir() {
            return Err(Error::InvalidDirectory(directory));
        }

        let name = directory
            .parent()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !self.puzzles.contains(&name) {
            return Err(Error::UnrecognizedName {
                name,
                recognized: self.puzzles.iter().cloned().collect(),
            });
        }
        debug!("Puzzle {name} in {}", directory.display());

        let primary = Self::primary_artifact(&directory, &name)?;
        debug!("Primary artifact {}", primary.display());

        let archive = match find_entry(&directory, &self.library_dir)? {
            Some(lib) if lib.is_dir() => Some(self.archiver.archive(&lib)?),
            _ => None,
        };

        Ok(Submission {
            attachments: AttachmentSet::new(primary, archive.as_ref().map(|a| a.path.clone())),
            directory,
            name,
            archive,
        })
    }

    fn primary_artifact(directory: &Path, name: &str) -> Result<PathBuf> {
        if let Some(makefile) = find_entry(directory, MAKEFILE)?
            && makefile.is_file()
        {
            return Ok(makefile);
        }
        match find_entry(directory, name)? {
            Some(path) if path.is_file() => Ok(path),
            _ => Err(Error::NoPrimaryArtifact {
                directory: directory.to_path_buf(),
                name: name.to_string(),
            }),
        }
    }
}

/// Looks up an entry by exact, case-sensitive name, even on filesystems
/// that fold case.
fn find_entry(directory: &Path, name: &str) -> Result<Option<PathBuf>> {
    let entries =
        fs::read_dir(directory).map_err(|_| Error::InvalidDirectory(directory.to_path_buf()))?;
    Ok(entries
        .filter_map(std::result::Result::ok)
        .find(|entry| entry.file_name() == OsStr::new(name))
        .map(|entry| entry.path()))
}
