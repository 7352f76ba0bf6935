//! Interactive password prompt.

use dialoguer::Password;
use handin_core::{Credential, CredentialProvider, Error};

/// Asks for the password on the terminal without echoing it.
///
/// The read runs on a blocking thread so the runtime keeps watching for
/// Ctrl-C while the prompt is open. An interrupted read is never resumed;
/// the caller restores the terminal with [`crate::terminal::TerminalMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl CredentialProvider for TerminalPrompt {
    async fn credential_for(&self, account: &str) -> handin_core::Result<Credential> {
        let prompt = format!("Password for {account}");
        let secret = tokio::task::spawn_blocking(move || Password::new().with_prompt(prompt).interact())
            .await
            .map_err(|e| Error::Credential(e.to_string()))?
            .map_err(|e| Error::Credential(e.to_string()))?;
        Ok(Credential::new(secret))
    }
}
