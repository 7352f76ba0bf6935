//! MIME transfer and header encodings.
//!
//! Supports Base64, Quoted-Printable, and RFC 2047 encoded words.

use crate::error::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Write as _;

/// Maximum encoded line length (RFC 2045).
const MAX_LINE_LENGTH: usize = 76;

/// Encodes data as a single Base64 string.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Encodes data as Base64 broken into CRLF-terminated lines of at most
/// 76 characters, ready to be used as a MIME part body.
#[must_use]
pub fn encode_base64_lines(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / MAX_LINE_LENGTH * 2 + 2);
    for chunk in encoded.as_bytes().chunks(MAX_LINE_LENGTH) {
        // Base64 output is ASCII, so every chunk boundary is a char boundary.
        out.push_str(&String::from_utf8_lossy(chunk));
        out.push_str("\r\n");
    }
    out
}

/// Decodes Base64 data, ignoring line breaks and other whitespace.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let cleaned: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD.decode(cleaned).map_err(Into::into)
}

/// Encodes text using Quoted-Printable encoding (RFC 2045).
///
/// Line breaks in the input (LF or CRLF) become CRLF hard breaks; long
/// lines get `=` soft breaks; whitespace at the end of a line is escaped so
/// transports cannot strip it.
#[must_use]
pub fn encode_quoted_printable(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            result.push_str("\r\n");
        }
        let line = line.strip_suffix('\r').unwrap_or(line).as_bytes();

        let mut column = 0;
        for (i, &byte) in line.iter().enumerate() {
            let at_end = i + 1 == line.len();
            let literal = match byte {
                b' ' | b'\t' => !at_end,
                b'!'..=b'<' | b'>'..=b'~' => true,
                _ => false,
            };
            let width = if literal { 1 } else { 3 };

            if column + width > MAX_LINE_LENGTH - 1 {
                result.push_str("=\r\n");
                column = 0;
            }

            if literal {
                result.push(char::from(byte));
            } else {
                let _ = write!(result, "={byte:02X}");
            }
            column += width;
        }
    }

    result
}

/// Encodes a header value as an RFC 2047 encoded word when it is not
/// plain printable ASCII.
///
/// Format: `=?utf-8?B?encoded-text?=`
#[must_use]
pub fn encode_rfc2047(text: &str) -> String {
    let plain = text.chars().all(|c| c == ' ' || c.is_ascii_graphic()) && !text.contains("=?");
    if plain {
        return text.to_string();
    }

    format!("=?utf-8?B?{}?=", encode_base64(text.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn base64_lines_wrap_at_76_columns() {
        let encoded = encode_base64_lines(&[0xAB; 200]);
        let lines: Vec<&str> = encoded.split("\r\n").collect();
        assert_eq!(lines[0].len(), 76);
        assert_eq!(lines.last(), Some(&""));
        assert_eq!(decode_base64(&encoded).unwrap(), vec![0xAB; 200]);
    }

    #[test]
    fn base64_of_empty_input_is_empty() {
        assert_eq!(encode_base64_lines(&[]), "");
    }

    #[test]
    fn quoted_printable_leaves_ascii_alone() {
        assert_eq!(encode_quoted_printable("Hello, World!"), "Hello, World!");
    }

    #[test]
    fn quoted_printable_escapes_non_ascii_and_equals() {
        assert_eq!(encode_quoted_printable("Héllo a=b"), "H=C3=A9llo a=3Db");
    }

    #[test]
    fn quoted_printable_hard_breaks_and_trailing_space() {
        assert_eq!(
            encode_quoted_printable("one \r\ntwo\tthree\n"),
            "one=20\r\ntwo\tthree\r\n"
        );
    }

    #[test]
    fn quoted_printable_soft_breaks_long_lines() {
        let encoded = encode_quoted_printable(&"x".repeat(200));
        for line in encoded.split("\r\n") {
            assert!(line.len() <= 76, "line too long: {line}");
        }
        assert_eq!(encoded.replace("=\r\n", ""), "x".repeat(200));
    }

    #[test]
    fn rfc2047_only_encodes_when_needed() {
        assert_eq!(encode_rfc2047("lib.tar.gz"), "lib.tar.gz");
        assert_eq!(encode_rfc2047("Héllo"), "=?utf-8?B?SMOpbGxv?=");
        assert!(encode_rfc2047("tab\there").starts_with("=?utf-8?B?"));
    }

    proptest! {
        #[test]
        fn quoted_printable_lines_never_exceed_limit(text in "\\PC{0,400}") {
            let encoded = encode_quoted_printable(&text);
            for line in encoded.split("\r\n") {
                prop_assert!(line.len() <= 76);
            }
            prop_assert!(encoded.is_ascii());
        }

        #[test]
        fn base64_lines_decode_to_input(data in proptest::collection::vec(any::<u8>(), 0..600)) {
            let encoded = encode_base64_lines(&data);
            prop_assert!(encoded.split("\r\n").all(|line| line.len() <= 76));
            prop_assert_eq!(decode_base64(&encoded).unwrap(), data);
        }
    }
}
