//! `application/x-www-form-urlencoded` encoding.
//!
//! Unreserved characters (`0-9A-Za-z-._~`) pass through, space becomes `+`
//! and every other byte is written as `%XX`.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Display};

/// Errors raised while decoding form data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    /// A `%` not followed by two hex digits.
    InvalidPercentSequence {
        /// Byte offset of the `%` within the escaped component.
        position: usize,
    },
    /// The decoded bytes are not UTF-8.
    InvalidUtf8,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::InvalidPercentSequence { position } => {
                write!(f, "invalid percent sequence at byte {position}")
            }
            FormError::InvalidUtf8 => f.write_str("decoded form data is not UTF-8"),
        }
    }
}

impl core::error::Error for FormError {}

#[cfg(feature = "defmt")]
impl defmt::Format for FormError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            FormError::InvalidPercentSequence { position } => {
                defmt::write!(f, "InvalidPercentSequence({=usize})", *position)
            }
            FormError::InvalidUtf8 => defmt::write!(f, "InvalidUtf8"),
        }
    }
}

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

/// Escape a single key or value.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for &b in s.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else if b == b' ' {
            out.push('+');
        } else {
            out.push('%');
            out.push(HEX_UPPER[(b >> 4) as usize] as char);
            out.push(HEX_UPPER[(b & 0x0F) as usize] as char);
        }
    }
    out
}

/// Encode key/value pairs in iteration order.
///
/// ```
/// use webapi::http::form;
///
/// let body = form::encode([("abc", "123"), ("space", "s p a c e")]);
/// assert_eq!(body, "abc=123&space=s+p+a+c+e");
/// ```
pub fn encode<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    let mut out = String::new();
    for (key, value) in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&escape(&key.to_string()));
        out.push('=');
        out.push_str(&escape(&value.to_string()));
    }
    out
}

/// Reverse [`escape`].
pub fn unescape(s: &str) -> Result<String, FormError> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let byte = bytes
                    .get(i + 1..i + 3)
                    .and_then(|hex| Some(hex_value(hex[0])? << 4 | hex_value(hex[1])?))
                    .ok_or(FormError::InvalidPercentSequence { position: i })?;
                out.push(byte);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| FormError::InvalidUtf8)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Decode `k=v&k=v` into pairs, in input order.
///
/// Empty entries are skipped and an entry without `=` gets an empty value.
pub fn decode(s: &str) -> Result<Vec<(String, String)>, FormError> {
    s.split('&')
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
            Ok((unescape(key)?, unescape(value)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn encode_mixed_value_types() {
        let pairs: [(&str, &dyn Display); 2] = [("abc", &123), ("space", &"s p a c e")];
        let body = encode(pairs);
        assert_eq!(body, "abc=123&space=s+p+a+c+e");
    }

    #[test]
    fn decode_keeps_input_order() {
        let pairs = decode("abc=123&space=s+p+a+c+e").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("abc".to_string(), "123".to_string()),
                ("space".to_string(), "s p a c e".to_string()),
            ]
        );
    }

    #[test]
    fn escape_reserved_and_multibyte() {
        assert_eq!(escape("a&b=c"), "a%26b%3Dc");
        assert_eq!(escape("100%"), "100%25");
        assert_eq!(escape("-._~"), "-._~");
        assert_eq!(escape("é"), "%C3%A9");
    }

    #[test]
    fn unescape_accepts_both_hex_cases() {
        assert_eq!(unescape("%c3%A9").unwrap(), "é");
        assert_eq!(unescape("a+b%2Bc").unwrap(), "a b+c");
    }

    #[test]
    fn trailing_percent_sequence_is_decoded() {
        assert_eq!(unescape("abc%41").unwrap(), "abcA");
    }

    #[test]
    fn truncated_percent_sequence_fails() {
        assert_eq!(
            unescape("ab%4"),
            Err(FormError::InvalidPercentSequence { position: 2 })
        );
        assert_eq!(
            unescape("%zz"),
            Err(FormError::InvalidPercentSequence { position: 0 })
        );
    }

    #[test]
    fn invalid_utf8_fails() {
        assert_eq!(unescape("%FF"), Err(FormError::InvalidUtf8));
    }

    #[test]
    fn decode_edge_entries() {
        assert!(decode("").unwrap().is_empty());
        let pairs = decode("flag&&x=1").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("flag".to_string(), String::new()),
                ("x".to_string(), "1".to_string()),
            ]
        );
    }
}
