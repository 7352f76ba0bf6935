//! Builder for outgoing multipart messages.

use crate::content_type::ContentType;
use crate::encoding::encode_rfc2047;
use crate::error::{Error, Result};
use crate::header::Headers;
use crate::message::{Attachment, Message, Part};
use chrono::{DateTime, FixedOffset, Local};
use uuid::Uuid;

/// Builds a `multipart/mixed` message: one text part followed by one part
/// per attachment, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Vec<String>,
    cc: Vec<String>,
    subject: String,
    text: String,
    attachments: Vec<Attachment>,
    date: Option<DateTime<FixedOffset>>,
    boundary: Option<String>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender address.
    #[must_use]
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Adds a `To` recipient.
    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Adds a `Cc` recipient.
    #[must_use]
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Sets the subject line.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the plain-text body.
    #[must_use]
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Appends an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Overrides the `Date` header (defaults to now).
    #[must_use]
    pub const fn date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    /// Overrides the multipart boundary (defaults to a random one).
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Builds the message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`] without a sender or at least one
    /// `To` recipient, and [`Error::InvalidHeader`] if any header value
    /// contains a line break.
    pub fn build(self) -> Result<Message> {
        let from = self
            .from
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| Error::MissingHeader("From".into()))?;
        if self.to.is_empty() {
            return Err(Error::MissingHeader("To".into()));
        }

        let boundary = self
            .boundary
            .unwrap_or_else(|| format!("=_handin_{}", Uuid::new_v4().simple()));
        let date = self.date.unwrap_or_else(|| Local::now().fixed_offset());
        let domain = from.rsplit_once('@').map_or("localhost", |(_, d)| d);

        let mut headers = Headers::new();
        headers.add("From", from.as_str())?;
        headers.add("To", self.to.join(", "))?;
        if !self.cc.is_empty() {
            headers.add("Cc", self.cc.join(", "))?;
        }
        headers.add("Subject", encode_rfc2047(&self.subject))?;
        headers.add("Date", date.to_rfc2822())?;
        headers.add(
            "Message-ID",
            format!("<{}@{domain}>", Uuid::new_v4().simple()),
        )?;
        headers.add("MIME-Version", "1.0")?;
        headers.add(
            "Content-Type",
            ContentType::multipart_mixed(boundary.as_str()).to_string(),
        )?;

        let mut parts = Vec::with_capacity(self.attachments.len() + 1);
        parts.push(Part::text(&self.text)?);
        for attachment in &self.attachments {
            parts.push(Part::attachment(attachment)?);
        }

        Ok(Message::new(headers, parts, boundary))
    }
}
