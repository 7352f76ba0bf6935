//! Credential handling.
//!
//! The core never prompts on its own; the caller supplies a
//! [`CredentialProvider`] that knows how to ask.

use std::fmt;
use std::future::Future;

use crate::error::Result;

/// A secret used to log in to the outgoing server.
///
/// `Debug` output never shows the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a secret.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the secret for handing to the transport.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// Source of the login secret for an account.
pub trait CredentialProvider {
    /// Obtains the secret for `account`.
    ///
    /// Implementations that prompt should return
    /// [`crate::Error::Interrupted`] when the operator aborts.
    fn credential_for(&self, account: &str) -> impl Future<Output = Result<Credential>> + Send;
}

/// Provider that always returns the same secret.
#[derive(Debug, Clone)]
pub struct StaticCredential(Credential);

impl StaticCredential {
    /// Creates a provider returning `secret`.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Credential::new(secret))
    }
}

impl CredentialProvider for StaticCredential {
    async fn credential_for(&self, _account: &str) -> Result<Credential> {
        Ok(self.0.clone())
    }
}
