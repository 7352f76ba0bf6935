//! # handin-smtp
//!
//! A small SMTP submission client: just enough of RFC 5321 to log in to a
//! mail submission agent and hand over one message.
//!
//! ## Features
//!
//! - **Type-state sessions**: the compiler rejects `DATA` before `RCPT TO`,
//!   `RCPT TO` before `MAIL FROM`, and so on
//! - **TLS**: STARTTLS upgrade (port 587) and implicit TLS (port 465)
//! - **Authentication**: AUTH PLAIN, with AUTH LOGIN as a fallback
//! - **SIZE**: messages larger than the advertised limit are refused
//!   before any data is sent
//!
//! ## Quick Start
//!
//! ```ignore
//! use handin_smtp::{Address, Client};
//! use handin_smtp::connection::connect;
//!
//! #[tokio::main]
//! async fn main() -> handin_smtp::Result<()> {
//!     let stream = connect("smtp.example.com", 587).await?;
//!     let client = Client::from_stream(stream).await?;
//!     let client = client.ehlo("localhost").await?;
//!     let client = client.starttls("smtp.example.com").await?;
//!     let client = client.login("user@example.com", "secret").await?;
//!
//!     let message = b"Subject: Test\r\n\r\nHello\r\n";
//!     let client = client
//!         .mail_from(Address::new("user@example.com")?, Some(message.len()))
//!         .await?;
//!     let client = client.rcpt_to(Address::new("them@example.com")?).await?;
//!     let client = client.data().await?;
//!     let client = client.send_message(message).await?;
//!     client.quit().await
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! Connected ── login() ──→ Authenticated ── mail_from() ──→ MailTransaction
//!                                                               │
//!                        Data ←── data() ── RecipientAdded ←── rcpt_to()
//!                          │
//!                          └── send_message() ──→ Authenticated
//! ```
//!
//! Every state owns the underlying stream. When a step fails the client is
//! consumed and dropped, which closes the socket.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Authenticated, Client, Connected, Data, MailTransaction, RecipientAdded, ServerInfo,
    SmtpConnection,
};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
