//! Library folder archiving.
//!
//! The archive is written next to its source directory as
//! `<name>.tar.gz`, and every entry is rooted at `<name>/` so extraction
//! recreates the folder wherever it runs. The file stays on disk after the
//! submission, and a failed run leaves whatever was written in place.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::filter::PathFilter;
use crate::paths::{normalize, slash_path};

/// Suffix appended to the source directory name.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// What an archive run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Path of the written archive.
    pub path: PathBuf,
    /// Archive-relative names of the files added, in archive order.
    pub entries: Vec<String>,
    /// Archive-relative names of files and directories left out.
    pub skipped: Vec<String>,
}

/// Packs a directory into a gzip-compressed tarball.
#[derive(Debug, Clone, Default)]
pub struct Archiver {
    filter: PathFilter,
}

impl Archiver {
    /// Creates an archiver using `filter` to decide exclusions.
    #[must_use]
    pub const fn new(filter: PathFilter) -> Self {
        Self { filter }
    }

    /// Returns where the archive of `source` will be written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirectory`] if `source` has no parent or no
    /// final component.
    pub fn archive_path(source: &Path) -> Result<PathBuf> {
        let source = normalize(source).map_err(|_| Error::InvalidDirectory(source.to_path_buf()))?;
        let (Some(parent), Some(name)) = (source.parent(), source.file_name()) else {
            return Err(Error::InvalidDirectory(source));
        };
        Ok(parent.join(format!("{}{ARCHIVE_SUFFIX}", name.to_string_lossy())))
    }

    /// Archives every non-excluded file below `source`.
    ///
    /// Entries are visited in file-name order, so two runs over an
    /// unchanged tree produce the same entry list. Excluded directories are
    /// pruned whole and reported once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDirectory`] if `source` is not a directory
    /// and [`Error::ArchiveIo`] if walking the tree or writing the archive
    /// fails.
    pub fn archive(&self, source: &Path) -> Result<ArchiveSummary> {
        let source = normalize(source).map_err(|_| Error::InvalidDirectory(source.to_path_buf()))?;
        if !source.is_dir() {
            return Err(Error::InvalidDirectory(source));
        }
        let target = Self::archive_path(&source)?;
        let Some(root) = source.parent() else {
            return Err(Error::InvalidDirectory(source));
        };

        let io_error = |err: io::Error| Error::ArchiveIo {
            path: target.clone(),
            source: err,
        };

        let file = File::create(&target).map_err(io_error)?;
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        let mut entries = Vec::new();
        let mut skipped = Vec::new();

        let mut walker = WalkDir::new(&source)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry.map_err(|e| io_error(e.into()))?;
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let name = slash_path(relative);

            if self.filter.should_exclude(entry.path()) {
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                warn!("Skipping {name}");
                skipped.push(name);
                continue;
            }

            if entry.file_type().is_dir() {
                continue;
            }
            if !entry.path().is_file() {
                debug!("Ignoring {name}: not a regular file");
                continue;
            }

            builder
                .append_path_with_name(entry.path(), relative)
                .map_err(io_error)?;
            debug!("Added {name}");
            entries.push(name);
        }

        builder
            .into_inner()
            .and_then(GzEncoder::finish)
            .map_err(io_error)?;

        debug!(
            "Wrote {} ({} entries, {} skipped)",
            target.display(),
            entries.len(),
            skipped.len()
        );

        Ok(ArchiveSummary {
            path: target,
            entries,
            skipped,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::fs;
    use tempfile::TempDir;

    fn read_entries(archive: &Path) -> Vec<String> {
        let mut tar = tar::Archive::new(GzDecoder::new(File::open(archive).unwrap()));
        tar.entries()
            .unwrap()
            .map(|e| slash_path(&e.unwrap().path().unwrap()))
            .collect()
    }

    #[test]
    fn keeps_only_non_excluded_files_rooted_at_folder_name() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib");
        fs::create_dir(&lib).unwrap();
        fs::write(lib.join("a.txt"), "alpha").unwrap();
        fs::write(lib.join(".hidden"), "secret").unwrap();
        fs::write(lib.join("b.pyc"), [0u8, 1, 2]).unwrap();

        let summary = Archiver::default().archive(&lib).unwrap();

        assert_eq!(summary.path, tmp.path().join("lib.tar.gz"));
        assert_eq!(summary.entries, vec!["lib/a.txt"]);
        assert_eq!(summary.skipped, vec!["lib/.hidden", "lib/b.pyc"]);
        assert_eq!(read_entries(&summary.path), vec!["lib/a.txt"]);
    }

    #[test]
    fn recurses_and_prunes_hidden_directories() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib");
        fs::create_dir_all(lib.join("sub")).unwrap();
        fs::create_dir_all(lib.join(".git")).unwrap();
        fs::write(lib.join("sub/c.txt"), "gamma").unwrap();
        fs::write(lib.join(".git/config"), "[core]").unwrap();
        fs::write(lib.join("a.txt"), "alpha").unwrap();

        let summary = Archiver::default().archive(&lib).unwrap();

        assert_eq!(summary.entries, vec!["lib/a.txt", "lib/sub/c.txt"]);
        assert_eq!(summary.skipped, vec!["lib/.git"]);
        let entries = read_entries(&summary.path);
        assert!(entries.iter().all(|e| e.starts_with("lib/")));
        assert!(!entries.iter().any(|e| e.contains(".git")));
    }

    #[test]
    fn archived_bytes_survive_extraction() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib");
        fs::create_dir(&lib).unwrap();
        fs::write(lib.join("data.bin"), [0u8, 255, 10, 13]).unwrap();

        let summary = Archiver::default().archive(&lib).unwrap();

        let out = TempDir::new().unwrap();
        tar::Archive::new(GzDecoder::new(File::open(&summary.path).unwrap()))
            .unpack(out.path())
            .unwrap();
        assert_eq!(
            fs::read(out.path().join("lib/data.bin")).unwrap(),
            vec![0u8, 255, 10, 13]
        );
    }

    #[test]
    fn trailing_separator_and_rerun_hit_the_same_target() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib");
        fs::create_dir(&lib).unwrap();
        fs::write(lib.join("a.txt"), "alpha").unwrap();

        let with_slash = PathBuf::from(format!("{}/", lib.display()));
        let first = Archiver::default().archive(&with_slash).unwrap();
        let second = Archiver::default().archive(&lib).unwrap();

        assert_eq!(first.path, second.path);
        assert_eq!(first.entries, second.entries);
    }

    #[test]
    fn empty_directory_yields_empty_archive() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib");
        fs::create_dir(&lib).unwrap();

        let summary = Archiver::default().archive(&lib).unwrap();
        assert!(summary.entries.is_empty());
        assert!(read_entries(&summary.path).is_empty());
    }

    #[test]
    fn missing_source_is_invalid_directory() {
        let tmp = TempDir::new().unwrap();
        let err = Archiver::default()
            .archive(&tmp.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDirectory(_)));
    }
}
