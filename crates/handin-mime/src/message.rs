//! MIME message structure and serialization.

use crate::content_type::ContentType;
use crate::encoding::{decode_base64, encode_base64_lines, encode_quoted_printable, encode_rfc2047};
use crate::error::Result;
use crate::header::Headers;
use std::fmt;

/// Preamble shown by clients that do not understand MIME.
const PREAMBLE: &str = "This is a multi-part message in MIME format.";

/// Transfer encoding types used for generated parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    /// 7-bit ASCII, no encoding.
    SevenBit,
    /// Quoted-Printable encoding.
    QuotedPrintable,
    /// Base64 encoding.
    Base64,
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Base64 => write!(f, "base64"),
        }
    }
}

/// A file to attach: raw bytes plus the name the recipient will see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to the recipient (a base name, not a path).
    pub filename: String,
    /// Declared content type.
    pub content_type: ContentType,
    /// Raw, unencoded content.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates an `application/octet-stream` attachment.
    #[must_use]
    pub fn binary(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: ContentType::octet_stream(),
            data,
        }
    }
}

/// One body part of a multipart message.
#[derive(Debug, Clone)]
pub struct Part {
    /// Part headers.
    pub headers: Headers,
    /// Encoded body, exactly as it goes on the wire.
    pub body: String,
    /// Attachment file name, for attachment parts.
    pub filename: Option<String>,
}

impl Part {
    /// Creates a UTF-8 `text/plain` part, quoted-printable encoded.
    ///
    /// # Errors
    ///
    /// Returns an error if a header cannot be built.
    pub fn text(text: &str) -> Result<Self> {
        let mut headers = Headers::new();
        headers.add("Content-Type", ContentType::text_plain().to_string())?;
        headers.add(
            "Content-Transfer-Encoding",
            TransferEncoding::QuotedPrintable.to_string(),
        )?;
        Ok(Self {
            headers,
            body: encode_quoted_printable(text),
            filename: None,
        })
    }

    /// Creates a base64-encoded attachment part.
    ///
    /// # Errors
    ///
    /// Returns an error if a header cannot be built.
    pub fn attachment(attachment: &Attachment) -> Result<Self> {
        let name = encode_rfc2047(&attachment.filename);
        let content_type = attachment.content_type.clone().with_parameter("name", &name);

        let mut headers = Headers::new();
        headers.add("Content-Type", content_type.to_string())?;
        headers.add(
            "Content-Transfer-Encoding",
            TransferEncoding::Base64.to_string(),
        )?;
        headers.add(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", name.replace('"', "\\\"")),
        )?;

        Ok(Self {
            headers,
            body: encode_base64_lines(&attachment.data),
            filename: Some(attachment.filename.clone()),
        })
    }

    /// Gets the content type.
    ///
    /// # Errors
    ///
    /// Returns an error if the content type header is invalid.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers
            .get("content-type")
            .map_or_else(|| Ok(ContentType::text_plain()), ContentType::parse)
    }

    /// Returns the decoded body bytes for base64 parts and the wire text
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if a base64 body is corrupt.
    pub fn decode_body(&self) -> Result<Vec<u8>> {
        let base64 = self
            .headers
            .get("content-transfer-encoding")
            .is_some_and(|enc| enc.eq_ignore_ascii_case("base64"));
        if base64 {
            decode_base64(&self.body)
        } else {
            Ok(self.body.clone().into_bytes())
        }
    }
}

/// A complete `multipart/mixed` message.
#[derive(Debug, Clone)]
pub struct Message {
    /// Top-level headers.
    pub headers: Headers,
    /// Body parts in order: text first, then attachments.
    pub parts: Vec<Part>,
    boundary: String,
}

impl Message {
    pub(crate) fn new(headers: Headers, parts: Vec<Part>, boundary: String) -> Self {
        Self {
            headers,
            parts,
            boundary,
        }
    }

    /// Gets the From header.
    #[must_use]
    pub fn from(&self) -> Option<&str> {
        self.headers.get("from")
    }

    /// Gets the To header.
    #[must_use]
    pub fn to(&self) -> Option<&str> {
        self.headers.get("to")
    }

    /// Gets the Cc header.
    #[must_use]
    pub fn cc(&self) -> Option<&str> {
        self.headers.get("cc")
    }

    /// Gets the Subject header.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.headers.get("subject")
    }

    /// Returns the multipart boundary.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Iterates over attachment parts.
    pub fn attachments(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|part| part.filename.is_some())
    }

    /// Serializes the message in RFC 5322 form with CRLF line endings.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(&self.headers.to_string());
        out.push_str("\r\n");
        out.push_str(PREAMBLE);
        out.push_str("\r\n");

        for part in &self.parts {
            out.push_str("--");
            out.push_str(&self.boundary);
            out.push_str("\r\n");
            out.push_str(&part.headers.to_string());
            out.push_str("\r\n");
            out.push_str(&part.body);
            // The CRLF before a delimiter belongs to the delimiter.
            out.push_str("\r\n");
        }

        out.push_str("--");
        out.push_str(&self.boundary);
        out.push_str("--\r\n");
        out.into_bytes()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn attachment_part_names_file_and_encodes_bytes() {
        let part = Part::attachment(&Attachment::binary("lib.tar.gz", vec![0, 159, 146, 150]))
            .unwrap();
        assert_eq!(
            part.headers.get("Content-Disposition"),
            Some("attachment; filename=\"lib.tar.gz\"")
        );
        let ct = part.content_type().unwrap();
        assert_eq!(ct.to_string(), "application/octet-stream; name=lib.tar.gz");
        assert_eq!(part.decode_body().unwrap(), vec![0, 159, 146, 150]);
    }

    #[test]
    fn non_ascii_file_names_are_encoded_words() {
        let part = Part::attachment(&Attachment::binary("résumé", b"x".to_vec())).unwrap();
        let disposition = part.headers.get("content-disposition").unwrap();
        assert!(disposition.contains("=?utf-8?B?"));
        assert_eq!(part.filename.as_deref(), Some("résumé"));
    }

    #[test]
    fn text_part_is_quoted_printable() {
        let part = Part::text("Grüße\n").unwrap();
        assert_eq!(
            part.headers.get("content-transfer-encoding"),
            Some("quoted-printable")
        );
        assert_eq!(part.body, "Gr=C3=BC=C3=9Fe\r\n");
        assert_eq!(part.content_type().unwrap().charset(), Some("utf-8"));
    }

    #[test]
    fn serializes_boundaries_around_every_part() {
        let mut headers = Headers::new();
        headers.add("Subject", "hoppity").unwrap();
        let parts = vec![
            Part::text("body").unwrap(),
            Part::attachment(&Attachment::binary("hoppity", b"#!/bin/sh\n".to_vec())).unwrap(),
        ];
        let message = Message::new(headers, parts, "XYZ".to_string());

        let wire = String::from_utf8(message.to_bytes()).unwrap();
        assert!(wire.starts_with("Subject: hoppity\r\n\r\n"));
        assert_eq!(wire.matches("--XYZ\r\n").count(), 2);
        assert!(wire.ends_with("\r\n--XYZ--\r\n"));
        assert!(!wire.replace("\r\n", "").contains('\n'));
        assert_eq!(message.attachments().count(), 1);
    }

    #[test]
    fn trailing_newline_of_a_part_survives_the_delimiter() {
        let parts = vec![Part::text("first attempt\n").unwrap(), Part::text("no newline").unwrap()];
        let message = Message::new(Headers::new(), parts, "XYZ".to_string());

        let wire = String::from_utf8(message.to_bytes()).unwrap();
        assert!(wire.contains("first attempt\r\n\r\n--XYZ\r\n"));
        assert!(wire.contains("no newline\r\n--XYZ--\r\n"));
    }
}
