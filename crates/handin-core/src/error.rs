//! Error types for the core library.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that abort a submission.
#[derive(Debug, Error)]
pub enum Error {
    /// No submission directory was given.
    #[error("no submission directory given")]
    MissingArgument,

    /// The argument does not name an existing directory.
    #[error("{} is not an existing directory", .0.display())]
    InvalidDirectory(PathBuf),

    /// The parent directory is not a recognized puzzle name.
    #[error(
        "unrecognized puzzle name {name:?}; the solution must live in a directory named one of: {}",
        .recognized.join(", ")
    )]
    UnrecognizedName {
        /// Name taken from the parent directory.
        name: String,
        /// Every recognized name, sorted.
        recognized: Vec<String>,
    },

    /// Neither a `Makefile` nor an executable named after the puzzle exists.
    #[error(
        "nothing to submit in {}: expected a file named \"Makefile\" or a file named {name:?}",
        .directory.display()
    )]
    NoPrimaryArtifact {
        /// Directory that was searched.
        directory: PathBuf,
        /// Puzzle name that was looked for.
        name: String,
    },

    /// Creating or writing the library archive failed.
    #[error("failed to write archive {}", .path.display())]
    ArchiveIo {
        /// Archive being written.
        path: PathBuf,
        /// Underlying failure.
        source: io::Error,
    },

    /// An attachment could not be read.
    #[error("failed to read attachment {}", .path.display())]
    AttachmentRead {
        /// Attachment path.
        path: PathBuf,
        /// Underlying failure.
        source: io::Error,
    },

    /// A required address has no value in any configuration tier.
    #[error(
        "{name} is not configured; set {env_var} or add \"{key}\" to the settings file"
    )]
    ConfigurationMissing {
        /// Human-readable name of the value.
        name: &'static str,
        /// Environment variable that overrides it.
        env_var: &'static str,
        /// Settings file key that provides it.
        key: &'static str,
    },

    /// The settings file could not be read or parsed.
    #[error("settings file {}: {message}", .path.display())]
    ConfigFile {
        /// Settings file path.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A configured address is not usable.
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress {
        /// The offending address.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The credential could not be obtained.
    #[error("could not read password: {0}")]
    Credential(String),

    /// The message could not be generated.
    #[error("failed to build message")]
    Mime(#[from] handin_mime::Error),

    /// Delivery failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The operator interrupted the run.
    #[error("interrupted")]
    Interrupted,
}

/// Fieldless discriminant of [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::MissingArgument`].
    MissingArgument,
    /// See [`Error::InvalidDirectory`].
    InvalidDirectory,
    /// See [`Error::UnrecognizedName`].
    UnrecognizedName,
    /// See [`Error::NoPrimaryArtifact`].
    NoPrimaryArtifact,
    /// See [`Error::ArchiveIo`].
    ArchiveIo,
    /// See [`Error::AttachmentRead`].
    AttachmentRead,
    /// See [`Error::ConfigurationMissing`].
    ConfigurationMissing,
    /// See [`Error::ConfigFile`].
    ConfigFile,
    /// See [`Error::InvalidAddress`].
    InvalidAddress,
    /// See [`Error::Credential`].
    Credential,
    /// See [`Error::Mime`].
    Mime,
    /// See [`Error::Transport`].
    Transport,
    /// See [`Error::Interrupted`].
    Interrupted,
}

impl Error {
    /// Returns the kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingArgument => ErrorKind::MissingArgument,
            Self::InvalidDirectory(_) => ErrorKind::InvalidDirectory,
            Self::UnrecognizedName { .. } => ErrorKind::UnrecognizedName,
            Self::NoPrimaryArtifact { .. } => ErrorKind::NoPrimaryArtifact,
            Self::ArchiveIo { .. } => ErrorKind::ArchiveIo,
            Self::AttachmentRead { .. } => ErrorKind::AttachmentRead,
            Self::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            Self::ConfigFile { .. } => ErrorKind::ConfigFile,
            Self::InvalidAddress { .. } => ErrorKind::InvalidAddress,
            Self::Credential(_) => ErrorKind::Credential,
            Self::Mime(_) => ErrorKind::Mime,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// Returns true if the operator aborted the run.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
