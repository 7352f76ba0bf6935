//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::marker::PhantomData;
use tracing::debug;

/// Type-state marker: greeted, not yet logged in.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker: logged in, ready for a transaction.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker: `MAIL FROM` accepted.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker: at least one `RCPT TO` accepted.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker: `DATA` accepted, waiting for the message.
#[derive(Debug)]
pub struct Data;

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    client_hostname: String,
    _state: PhantomData<State>,
}

/// Connection trait for all states.
pub trait SmtpConnection {
    /// Returns the server information.
    fn server_info(&self) -> &ServerInfo;
}

impl<S> SmtpConnection for Client<S> {
    fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or the server is not
    /// ready to accept mail.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = read_reply(&mut stream).await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(reply_error(&greeting));
        }

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        debug!(server = %hostname, "SMTP greeting received");

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                extensions: Vec::new(),
            },
            client_hostname: String::new(),
            _state: PhantomData,
        })
    }

    /// Sends EHLO and records the server's capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        self.client_hostname = client_hostname.to_string();
        self.say_ehlo().await?;
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS and repeats EHLO, since
    /// capabilities advertised in plaintext must be discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not advertised or the upgrade fails.
    pub async fn starttls(mut self, server_hostname: &str) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.expect(Command::StartTls, ReplyCode::is_success).await?;
        self.stream = self.stream.upgrade_to_tls(server_hostname).await?;
        debug!(server = server_hostname, "TLS established");

        self.say_ehlo().await?;
        Ok(self)
    }

    /// Logs in with the best mechanism the server advertises.
    ///
    /// PLAIN is preferred; LOGIN is used when it is the only choice.
    ///
    /// # Errors
    ///
    /// Returns an error if neither mechanism is offered or the server
    /// rejects the credentials.
    pub async fn login(self, username: &str, password: &str) -> Result<Client<Authenticated>> {
        let offered = self.server_info.auth_mechanisms();
        let (plain, login) = (
            offered.contains(&AuthMechanism::Plain),
            offered.contains(&AuthMechanism::Login),
        );
        if plain {
            self.auth_plain(username, password).await
        } else if login {
            self.auth_login(username, password).await
        } else {
            Err(Error::NotSupported("AUTH PLAIN or AUTH LOGIN".into()))
        }
    }

    /// Authenticates using the PLAIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        let credentials = format!("\0{username}\0{password}");
        let cmd = Command::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: Some(STANDARD.encode(credentials.as_bytes())),
        };
        self.expect(cmd, ReplyCode::is_success).await?;
        Ok(self.into_state())
    }

    /// Authenticates using the LOGIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub async fn auth_login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        let cmd = Command::Auth {
            mechanism: AuthMechanism::Login,
            initial_response: None,
        };
        self.expect(cmd, |code| code == ReplyCode::AUTH_CONTINUE)
            .await?;

        let user = Command::AuthResponse(STANDARD.encode(username.as_bytes()));
        self.expect(user, |code| code == ReplyCode::AUTH_CONTINUE)
            .await?;

        let pass = Command::AuthResponse(STANDARD.encode(password.as_bytes()));
        self.expect(pass, ReplyCode::is_success).await?;
        Ok(self.into_state())
    }

    async fn say_ehlo(&mut self) -> Result<()> {
        let cmd = Command::Ehlo {
            hostname: self.client_hostname.clone(),
        };
        let reply = self.expect(cmd, ReplyCode::is_success).await?;
        self.server_info.update_from_ehlo(&reply.message);
        Ok(())
    }
}

impl Client<Authenticated> {
    /// Starts a mail transaction.
    ///
    /// When the server advertises SIZE, the message size is declared and
    /// checked against the advertised limit before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MessageTooLarge`] if the message exceeds the limit,
    /// or an error if the MAIL FROM command fails.
    pub async fn mail_from(
        mut self,
        from: Address,
        size: Option<usize>,
    ) -> Result<Client<MailTransaction>> {
        if let (Some(size), Some(limit)) = (size, self.server_info.max_message_size())
            && size > limit
        {
            return Err(Error::MessageTooLarge { size, limit });
        }

        let advertises_size = self
            .server_info
            .extensions
            .iter()
            .any(|ext| matches!(ext, Extension::Size(_)));

        let cmd = Command::MailFrom {
            from,
            size: size.filter(|_| advertises_size),
        };
        self.expect(cmd, ReplyCode::is_success).await?;
        Ok(self.into_state())
    }
}

impl Client<MailTransaction> {
    /// Adds the first recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<RecipientAdded>> {
        self.expect(Command::RcptTo { to }, ReplyCode::is_success)
            .await?;
        Ok(self.into_state())
    }
}

impl Client<RecipientAdded> {
    /// Adds another recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Self> {
        self.expect(Command::RcptTo { to }, ReplyCode::is_success)
            .await?;
        Ok(self)
    }

    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error if the DATA command fails.
    pub async fn data(mut self) -> Result<Client<Data>> {
        self.expect(Command::Data, |code| code == ReplyCode::START_DATA)
            .await?;
        Ok(self.into_state())
    }
}

impl Client<Data> {
    /// Sends the message content and completes the transaction.
    ///
    /// Line endings are normalized to CRLF, lines starting with `.` are
    /// dot-stuffed, and the terminating `.` line is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if sending fails or the server rejects the message.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Authenticated>> {
        let payload = dot_stuff(message);
        debug!(bytes = payload.len(), "C: <message data>");
        self.stream.write_all(&payload).await?;

        let reply = read_reply(&mut self.stream).await?;
        if !reply.is_success() {
            return Err(reply_error(&reply));
        }
        Ok(self.into_state())
    }
}

// Common implementation for all states
impl<S> Client<S> {
    fn into_state<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            client_hostname: self.client_hostname,
            _state: PhantomData,
        }
    }

    async fn expect(&mut self, cmd: Command, accept: impl Fn(ReplyCode) -> bool) -> Result<Reply> {
        debug!("C: {}", cmd.redacted());
        self.stream.write_all(&cmd.serialize()).await?;
        let reply = read_reply(&mut self.stream).await?;
        debug!("S: {} {}", reply.code, reply.message.last().map_or("", String::as_str));
        if accept(reply.code) {
            Ok(reply)
        } else {
            Err(reply_error(&reply))
        }
    }

    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        self.expect(Command::Quit, |code| {
            code == ReplyCode::CLOSING || code.is_success()
        })
        .await?;
        Ok(())
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        if line.is_empty() {
            continue;
        }

        let is_last = is_last_reply_line(&line);
        lines.push(line);

        if is_last {
            break;
        }
    }

    parse_reply(&lines)
}

fn reply_error(reply: &Reply) -> Error {
    Error::smtp_error(reply.code.as_u16(), reply.message_text())
}

/// Prepares message bytes for the DATA phase.
fn dot_stuff(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + message.len() / 50 + 5);
    let body = message.strip_suffix(b"\n").unwrap_or(message);

    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.first() == Some(&b'.') {
            out.push(b'.');
        }
        out.extend_from_slice(line);
        out.extend_from_slice(b"\r\n");
    }

    out.extend_from_slice(b".\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::dot_stuff;

    #[test]
    fn normalizes_line_endings() {
        assert_eq!(dot_stuff(b"a\nb\r\nc"), b"a\r\nb\r\nc\r\n.\r\n");
    }

    #[test]
    fn trailing_newline_does_not_add_blank_line() {
        assert_eq!(dot_stuff(b"hello\r\n"), b"hello\r\n.\r\n");
    }

    #[test]
    fn stuffs_leading_dots() {
        assert_eq!(dot_stuff(b".\n..x\ny.z"), b"..\r\n...x\r\ny.z\r\n.\r\n");
    }
}
