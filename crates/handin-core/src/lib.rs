//! # handin-core
//!
//! The directory-to-submission pipeline behind the `handin` tool.
//!
//! A solution directory lives at `<puzzle>/<language>/`. The pipeline:
//! - checks the puzzle name against the configured set ([`resolver`])
//! - picks the primary artifact, a `Makefile` or an executable named after
//!   the puzzle ([`resolver`])
//! - packs an optional library folder into a `.tar.gz`, leaving out
//!   compiled and hidden files ([`archive`], [`filter`])
//! - assembles a multipart message ([`assembler`])
//! - delivers it over SMTP to the grader, or to a test address
//!   ([`transport`], [`submit`])
//!
//! Prompting for a password and logging setup belong to the caller; they
//! come in through [`credentials::CredentialProvider`] and `tracing`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod archive;
pub mod assembler;
pub mod config;
pub mod credentials;
mod error;
pub mod filter;
mod paths;
pub mod resolver;
pub mod submit;
pub mod transport;

pub use archive::{ArchiveSummary, Archiver};
pub use assembler::{SubmissionMessage, build_message};
pub use config::{Addresses, Environment, Security, Settings, SmtpSettings};
pub use credentials::{Credential, CredentialProvider};
pub use error::{Error, ErrorKind, Result};
pub use filter::PathFilter;
pub use resolver::{AttachmentSet, Submission, SubmissionResolver};
pub use submit::{DeliveryMode, SubmissionReport, SubmitRequest, submit};
pub use transport::{MailTransport, SmtpTransport, TransportError};
