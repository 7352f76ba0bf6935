//! MIME header handling.

use crate::error::{Error, Result};
use std::fmt;

/// Ordered collection of email headers.
///
/// Headers render in insertion order with the name spelled as given;
/// lookups ignore case.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid field name or the
    /// value contains a line break.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        let value = value.into();

        if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic() && b != b':') {
            return Err(Error::InvalidHeader(format!("bad field name {name:?}")));
        }
        if value.contains(['\r', '\n']) {
            return Err(Error::InvalidHeader(format!(
                "{name}: value contains a line break"
            )));
        }

        self.entries.push((name, value));
        Ok(())
    }

    /// Replaces every value of a header with a single new one.
    ///
    /// # Errors
    ///
    /// Same as [`Headers::add`].
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.remove(&name);
        self.add(name, value)
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Removes all values for a header.
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Returns an iterator over all headers in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_insertion_order_with_crlf() {
        let mut headers = Headers::new();
        headers.add("From", "a@example.com").unwrap();
        headers.add("To", "b@example.com, c@example.com").unwrap();
        headers.add("Subject", "hoppity").unwrap();
        assert_eq!(
            headers.to_string(),
            "From: a@example.com\r\nTo: b@example.com, c@example.com\r\nSubject: hoppity\r\n"
        );
    }

    #[test]
    fn lookup_ignores_case() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain").unwrap();
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn set_replaces_existing_values() {
        let mut headers = Headers::new();
        headers.add("Cc", "one@example.com").unwrap();
        headers.add("cc", "two@example.com").unwrap();
        headers.set("Cc", "three@example.com").unwrap();
        assert_eq!(headers.iter().count(), 1);
        assert_eq!(headers.get("cc"), Some("three@example.com"));
    }

    #[test]
    fn rejects_header_injection() {
        let mut headers = Headers::new();
        assert!(
            headers
                .add("Subject", "hi\r\nBcc: victim@example.com")
                .is_err()
        );
        assert!(headers.add("Bad Name", "x").is_err());
        assert!(headers.add("", "x").is_err());
        assert_eq!(headers.iter().count(), 0);
    }
}
