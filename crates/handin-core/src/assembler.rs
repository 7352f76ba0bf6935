//! Submission message assembly.

use std::fs;
use std::path::{Path, PathBuf};

use handin_mime::{Attachment, Message, MessageBuilder};
use tracing::debug;

use crate::error::{Error, Result};

/// A fully assembled submission, ready for a [`crate::MailTransport`].
#[derive(Debug, Clone)]
pub struct SubmissionMessage {
    sender: String,
    to: Vec<String>,
    cc: Vec<String>,
    subject: String,
    body: String,
    attachments: Vec<(String, usize)>,
    mime: Message,
}

impl SubmissionMessage {
    /// Sender address, also used as the login name.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// `To` recipients.
    #[must_use]
    pub fn to(&self) -> &[String] {
        &self.to
    }

    /// `Cc` recipients.
    #[must_use]
    pub fn cc(&self) -> &[String] {
        &self.cc
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Plain-text body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Attachment base names and sizes in bytes, in order.
    #[must_use]
    pub fn attachments(&self) -> &[(String, usize)] {
        &self.attachments
    }

    /// The generated MIME message.
    #[must_use]
    pub const fn mime(&self) -> &Message {
        &self.mime
    }

    /// Every envelope recipient, `To` before `Cc`, without duplicates.
    #[must_use]
    pub fn envelope_recipients(&self) -> Vec<&str> {
        let mut recipients: Vec<&str> = Vec::with_capacity(self.to.len() + self.cc.len());
        for addr in self.to.iter().chain(&self.cc) {
            if !recipients.iter().any(|r| r.eq_ignore_ascii_case(addr)) {
                recipients.push(addr);
            }
        }
        recipients
    }

    /// The message in wire form.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.mime.to_bytes()
    }
}

/// Builds a submission message with one text part and one binary part per
/// attachment.
///
/// Each file is read completely before encoding, and the recipient sees
/// only its base name.
///
/// # Errors
///
/// Returns [`Error::AttachmentRead`] if a file cannot be read and
/// [`Error::Mime`] if the message cannot be generated.
pub fn build_message(
    sender: &str,
    to: &[String],
    cc: &[String],
    subject: &str,
    body: &str,
    attachments: &[PathBuf],
) -> Result<SubmissionMessage> {
    let mut builder = MessageBuilder::new()
        .from(sender)
        .subject(subject)
        .text_body(body);
    for addr in to {
        builder = builder.to(addr.as_str());
    }
    for addr in cc {
        builder = builder.cc(addr.as_str());
    }

    let mut listed = Vec::with_capacity(attachments.len());
    for path in attachments {
        let data = fs::read(path).map_err(|source| Error::AttachmentRead {
            path: path.clone(),
            source,
        })?;
        let name = base_name(path);
        debug!("Attaching {name} ({} bytes)", data.len());
        listed.push((name.clone(), data.len()));
        builder = builder.attach(Attachment::binary(name, data));
    }

    Ok(SubmissionMessage {
        sender: sender.to_string(),
        to: to.to_vec(),
        cc: cc.to_vec(),
        subject: subject.to_string(),
        body: body.to_string(),
        attachments: listed,
        mime: builder.build()?,
    })
}

fn base_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Vec<PathBuf>) {
        let tmp = TempDir::new().unwrap();
        let solution = tmp.path().join("hoppity/python");
        fs::create_dir_all(&solution).unwrap();
        let primary = solution.join("hoppity");
        let archive = solution.join("lib.tar.gz");
        fs::write(&primary, "#!/usr/bin/env python\nprint(1)\n").unwrap();
        fs::write(&archive, [0x1f, 0x8b, 0x08, 0x00]).unwrap();
        (tmp, vec![primary, archive])
    }

    #[test]
    fn attachments_use_base_names_and_raw_bytes() {
        let (_tmp, paths) = fixture();
        let message = build_message(
            "me@example.com",
            &["grader@example.com".to_string()],
            &["me@example.com".to_string()],
            "hoppity",
            "Submission attached.\n",
            &paths,
        )
        .unwrap();

        let names: Vec<_> = message.attachments().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["hoppity", "lib.tar.gz"]);

        let parts: Vec<_> = message.mime().attachments().collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(
            parts[1].decode_body().unwrap(),
            vec![0x1f, 0x8b, 0x08, 0x00]
        );
        assert_eq!(
            parts[0].content_type().unwrap().to_string(),
            "application/octet-stream; name=hoppity"
        );

        let wire = String::from_utf8(message.to_bytes()).unwrap();
        assert!(wire.contains("To: grader@example.com\r\n"));
        assert!(wire.contains("Cc: me@example.com\r\n"));
        assert!(wire.contains("Subject: hoppity\r\n"));
        assert!(!wire.contains(&*paths[0].display().to_string()));
    }

    #[test]
    fn address_lists_are_comma_joined() {
        let (_tmp, paths) = fixture();
        let message = build_message(
            "me@example.com",
            &["a@example.com".to_string(), "b@example.com".to_string()],
            &[],
            "hoppity",
            "",
            &paths[..1],
        )
        .unwrap();
        assert_eq!(message.mime().to(), Some("a@example.com, b@example.com"));
        assert!(message.mime().cc().is_none());
    }

    #[test]
    fn envelope_recipients_skip_duplicates() {
        let (_tmp, paths) = fixture();
        let message = build_message(
            "me@example.com",
            &["me@example.com".to_string()],
            &["Me@Example.com".to_string()],
            "hoppity",
            "",
            &paths[..1],
        )
        .unwrap();
        assert_eq!(message.envelope_recipients(), vec!["me@example.com"]);
    }

    #[test]
    fn unreadable_attachment_names_the_path() {
        let (tmp, _) = fixture();
        let missing = tmp.path().join("gone");
        let err = build_message(
            "me@example.com",
            &["grader@example.com".to_string()],
            &[],
            "hoppity",
            "",
            std::slice::from_ref(&missing),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AttachmentRead);
        assert!(err.to_string().contains(&*missing.display().to_string()));
    }
}
