//! # handin-mime
//!
//! MIME message generation for outgoing mail.
//!
//! ## Features
//!
//! - **Message building**: headers, a plain-text body and any number of
//!   binary attachments in a `multipart/mixed` container
//! - **Encoding**: Base64 (76-column lines), Quoted-Printable, RFC 2047
//!   header words
//! - **Content types**: parameterized MIME types with correct quoting
//!
//! ## Quick Start
//!
//! ```ignore
//! use handin_mime::{Attachment, MessageBuilder};
//!
//! let message = MessageBuilder::new()
//!     .from("sender@example.com")
//!     .to("recipient@example.com")
//!     .cc("sender@example.com")
//!     .subject("hoppity")
//!     .text_body("Submission attached.")
//!     .attach(Attachment::binary("hoppity", std::fs::read("hoppity")?))
//!     .build()?;
//!
//! let bytes = message.to_bytes();
//! ```
//!
//! ## Encoding
//!
//! ```ignore
//! use handin_mime::encoding::{encode_base64_lines, encode_quoted_printable, encode_rfc2047};
//!
//! let body = encode_base64_lines(&[0u8; 1024]);     // CRLF every 76 columns
//! let text = encode_quoted_printable("Héllo\n");     // =C3=A9 escapes
//! let word = encode_rfc2047("résumé.pdf");           // =?utf-8?B?...?=
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod builder;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use builder::MessageBuilder;
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Attachment, Message, Part, TransferEncoding};
