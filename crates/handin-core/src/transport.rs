//! Message delivery.
//!
//! [`MailTransport`] is the seam between the pipeline and the network;
//! [`SmtpTransport`] drives a `handin-smtp` session through it.

use std::future::Future;

use handin_smtp::connection::{connect, connect_tls};
use handin_smtp::{Address, Client};
use tracing::{debug, warn};

use crate::assembler::SubmissionMessage;
use crate::config::{Security, SmtpSettings};
use crate::credentials::Credential;

/// Hostname announced in EHLO.
const EHLO_NAME: &str = "localhost";

/// Errors that can occur during delivery.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Send failed.
    #[error("send failed: {0}")]
    Send(String),

    /// Invalid address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The server's advertised size limit is smaller than the message.
    #[error("message too large: {0}")]
    MessageTooLarge(String),
}

impl TransportError {
    fn classify(err: handin_smtp::Error, stage: fn(String) -> Self) -> Self {
        match err {
            e @ handin_smtp::Error::MessageTooLarge { .. } => Self::MessageTooLarge(e.to_string()),
            e @ handin_smtp::Error::InvalidAddress(_) => Self::InvalidAddress(e.to_string()),
            e => stage(e.to_string()),
        }
    }
}

/// Delivers an assembled message.
pub trait MailTransport {
    /// Sends `message`, logging in as its sender with `credential`.
    fn deliver(
        &self,
        message: &SubmissionMessage,
        credential: &Credential,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// SMTP delivery using the configured server.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    host: String,
    port: u16,
    security: Security,
}

impl SmtpTransport {
    /// Creates a transport for the given server.
    #[must_use]
    pub fn new(settings: &SmtpSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            security: settings.security,
        }
    }
}

impl MailTransport for SmtpTransport {
    /// Runs one session: connect, EHLO, optional STARTTLS, login, one
    /// transaction, QUIT. The connection is owned by the client value, so
    /// every early return closes it.
    async fn deliver(
        &self,
        message: &SubmissionMessage,
        credential: &Credential,
    ) -> Result<(), TransportError> {
        let recipients = message.envelope_recipients();
        if recipients.is_empty() {
            return Err(TransportError::InvalidAddress("no recipients specified".into()));
        }

        debug!("Connecting to {}:{} ({:?})", self.host, self.port, self.security);
        let stream = match self.security {
            Security::Tls => connect_tls(&self.host, self.port).await,
            Security::StartTls | Security::None => connect(&self.host, self.port).await,
        }
        .map_err(|e| TransportError::Connection(e.to_string()))?;

        let client = Client::from_stream(stream)
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let client = client
            .ehlo(EHLO_NAME)
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let client = if self.security == Security::StartTls {
            client
                .starttls(&self.host)
                .await
                .map_err(|e| TransportError::Connection(e.to_string()))?
        } else {
            client
        };

        let client = client
            .login(message.sender(), credential.expose())
            .await
            .map_err(|e| TransportError::Authentication(e.to_string()))?;

        let from = Address::new(message.sender())
            .map_err(|e| TransportError::InvalidAddress(e.to_string()))?;
        let bytes = message.to_bytes();

        let client = client
            .mail_from(from, Some(bytes.len()))
            .await
            .map_err(|e| TransportError::classify(e, TransportError::Send))?;

        let mut addresses = recipients.iter().map(|r| {
            Address::new(*r).map_err(|e| TransportError::InvalidAddress(e.to_string()))
        });
        let first = addresses
            .next()
            .ok_or_else(|| TransportError::InvalidAddress("no recipients specified".into()))??;
        let mut client = client
            .rcpt_to(first)
            .await
            .map_err(|e| TransportError::classify(e, TransportError::Send))?;
        for address in addresses {
            client = client
                .rcpt_to(address?)
                .await
                .map_err(|e| TransportError::classify(e, TransportError::Send))?;
        }

        let client = client
            .data()
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;
        let client = client
            .send_message(&bytes)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;
        debug!("Server accepted {} bytes", bytes.len());

        // The message is already queued; a failed QUIT only loses the goodbye.
        if let Err(e) = client.quit().await {
            warn!("QUIT failed after delivery: {e}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_keeps_size_and_address_failures_distinct() {
        let too_large = TransportError::classify(
            handin_smtp::Error::MessageTooLarge { size: 10, limit: 5 },
            TransportError::Send,
        );
        assert!(matches!(too_large, TransportError::MessageTooLarge(_)));

        let bad = TransportError::classify(
            handin_smtp::Error::InvalidAddress("x".into()),
            TransportError::Send,
        );
        assert!(matches!(bad, TransportError::InvalidAddress(_)));

        let other = TransportError::classify(
            handin_smtp::Error::SmtpError {
                code: 550,
                message: "no such user".into(),
            },
            TransportError::Send,
        );
        assert!(matches!(other, TransportError::Send(m) if m.contains("550")));
    }
}
