//! End-to-end submission.

use std::fmt;
use std::path::PathBuf;

use tracing::info;

use crate::assembler::build_message;
use crate::config::{Addresses, Environment, Settings};
use crate::credentials::CredentialProvider;
use crate::error::Result;
use crate::resolver::SubmissionResolver;
use crate::transport::MailTransport;

/// Fixed first line of every submission body.
pub const BODY_TEMPLATE: &str = "Puzzle submission sent with handin.";

/// Where the submission goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryMode {
    /// To the configured test address.
    #[default]
    Test,
    /// To the fixed submission address.
    Real,
}

impl DeliveryMode {
    /// Picks the recipient for this mode.
    #[must_use]
    pub fn recipient(self, addresses: &Addresses) -> &str {
        match self {
            Self::Test => &addresses.test_address,
            Self::Real => &addresses.submission,
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Test => write!(f, "test"),
            Self::Real => write!(f, "real"),
        }
    }
}

/// One invocation's inputs.
#[derive(Debug, Clone, Default)]
pub struct SubmitRequest {
    /// Solution directory as given by the operator.
    pub directory: Option<PathBuf>,
    /// Delivery mode.
    pub mode: DeliveryMode,
    /// Optional note for the body.
    pub note: Option<String>,
    /// Stop after assembling the message.
    pub dry_run: bool,
}

/// What was (or would have been) sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    /// Puzzle name, also the subject.
    pub puzzle: String,
    /// Delivery mode used.
    pub mode: DeliveryMode,
    /// Sender, copied on the message.
    pub sender: String,
    /// Primary recipient.
    pub recipient: String,
    /// Attached files, in order.
    pub attachments: Vec<PathBuf>,
    /// Archive entries left out.
    pub skipped: Vec<String>,
    /// Message body.
    pub body: String,
    /// Size of the generated message in bytes.
    pub size: usize,
    /// False for a dry run.
    pub delivered: bool,
}

impl fmt::Display for SubmissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.delivered { "Sent" } else { "Would send" };
        writeln!(
            f,
            "{verb} {} to {} ({} mode), cc {}",
            self.puzzle, self.recipient, self.mode, self.sender
        )?;
        for path in &self.attachments {
            writeln!(f, "  attached {}", path.display())?;
        }
        for name in &self.skipped {
            writeln!(f, "  skipped {name}")?;
        }
        Ok(())
    }
}

/// Renders the body: the template line, then the note if there is one.
#[must_use]
pub fn render_body(note: Option<&str>) -> String {
    match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(note) => format!("{BODY_TEMPLATE}\n\n{note}\n"),
        None => format!("{BODY_TEMPLATE}\n"),
    }
}

/// Runs a submission.
///
/// Steps run strictly in order and the first failure aborts: address
/// resolution, directory resolution and archiving, the summary log line,
/// the credential request, message assembly, delivery. A dry run stops
/// before the credential request, after assembling the message.
///
/// The library archive stays on disk whatever the outcome.
///
/// # Errors
///
/// Returns the first failing step's error.
pub async fn submit<C, T>(
    settings: &Settings,
    env: &Environment,
    request: &SubmitRequest,
    credentials: &C,
    transport: &T,
) -> Result<SubmissionReport>
where
    C: CredentialProvider,
    T: MailTransport,
{
    let addresses = Addresses::resolve(settings, env)?;
    let submission =
        SubmissionResolver::from_settings(settings).resolve(request.directory.as_deref())?;

    let recipient = request.mode.recipient(&addresses).to_string();
    let body = render_body(request.note.as_deref());
    let attachments = submission.attachments.to_vec();
    let skipped = submission
        .archive
        .as_ref()
        .map(|a| a.skipped.clone())
        .unwrap_or_default();

    info!(
        "Submitting {} to {recipient} ({} mode), cc {}",
        submission.name, request.mode, addresses.sender
    );
    info!("Message: {}", body.trim_end().replace('\n', " "));
    for path in &attachments {
        info!("Attachment: {}", path.display());
    }

    let to = [recipient.clone()];
    let cc = [addresses.sender.clone()];

    let credential = if request.dry_run {
        None
    } else {
        Some(credentials.credential_for(&addresses.sender).await?)
    };

    let message = build_message(
        &addresses.sender,
        &to,
        &cc,
        &submission.name,
        &body,
        &attachments,
    )?;
    let size = message.to_bytes().len();

    let delivered = match credential {
        Some(credential) => {
            transport.deliver(&message, &credential).await?;
            info!("Submission sent");
            true
        }
        None => {
            info!("Dry run, not sending");
            false
        }
    };

    Ok(SubmissionReport {
        puzzle: submission.name,
        mode: request.mode,
        sender: addresses.sender,
        recipient,
        attachments,
        skipped,
        body,
        size,
        delivered,
    })
}
