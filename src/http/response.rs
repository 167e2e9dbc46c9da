//! HTTP/1.1 response parsing.
//!
//! The parser works on a complete response as read from the connection:
//! status line, header block, then transfer- and content-decoding of the
//! body. It either returns a fully built [`Response`] or an error; nothing
//! half-parsed is ever handed out.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use heapless::Vec as BoundedVec;

use super::error::ResponseError;
use super::{CRLF, chunked, find_slice};
use crate::compression::{Algorithm, Compression};

/// Largest byte offset at which the header block may end.
pub const MAX_HEADER_BYTES: usize = 65536;
/// Most header lines accepted in one response.
pub const MAX_HEADER_COUNT: usize = 64;

const HEADER_END: &[u8] = b"\r\n\r\n";

/// Value of one header field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// A single value; repeats of the field are joined with `,`.
    Single(String),
    /// Every occurrence in order. Only used for `set-cookie`.
    List(Vec<String>),
}

impl HeaderValue {
    /// The value, unless this is a list.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Single(value) => Some(value.as_str()),
            HeaderValue::List(_) => None,
        }
    }

    /// Every value in order.
    pub fn values(&self) -> &[String] {
        match self {
            HeaderValue::Single(value) => core::slice::from_ref(value),
            HeaderValue::List(values) => values.as_slice(),
        }
    }
}

/// Response header fields, keyed by lower-cased name in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BoundedVec<(String, HeaderValue), MAX_HEADER_COUNT>,
}

impl Headers {
    /// Look a field up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Single value of a field, ignoring case.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(HeaderValue::as_str)
    }

    /// Every value of a field, empty if absent.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.get(name).map(HeaderValue::values).unwrap_or(&[])
    }

    /// Whether a field named `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fields in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn append(&mut self, name: String, value: &str) -> Result<(), ResponseError> {
        let is_cookie = name == "set-cookie";
        if let Some((_, existing)) = self.entries.iter_mut().find(|(key, _)| *key == name) {
            match existing {
                HeaderValue::List(values) => values.push(value.to_string()),
                HeaderValue::Single(joined) => {
                    joined.push(',');
                    joined.push_str(value);
                }
            }
            return Ok(());
        }

        let value = if is_cookie {
            HeaderValue::List(alloc::vec![value.to_string()])
        } else {
            HeaderValue::Single(value.to_string())
        };
        self.entries
            .push((name, value))
            .map_err(|_| ResponseError::TooManyHeaders {
                count: MAX_HEADER_COUNT + 1,
            })
    }
}

/// A parsed HTTP/1.1 response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    http_version: String,
    code: String,
    message: String,
    headers: Headers,
    body: Vec<u8>,
    raw: Vec<u8>,
}

impl Response {
    /// Parse a complete response.
    ///
    /// With a `compression` capability, `gzip` and `deflate` bodies are
    /// decompressed. Without one, or for any other coding, the body is
    /// returned as received and `content-encoding` tells the caller what it
    /// holds.
    pub fn parse(raw: &[u8], compression: Option<&dyn Compression>) -> Result<Self, ResponseError> {
        let (status_line, rest) = match find_slice(raw, CRLF) {
            Some(end) => (&raw[..end], &raw[end + CRLF.len()..]),
            None => (raw, &[][..]),
        };
        let (http_version, code, message) = parse_status_line(status_line)?;

        let (header_block, body) = split_header_block(rest)?;
        let headers = parse_headers(header_block)?;

        let body = decode_transfer(&headers, body)?;
        let body = decode_content(&headers, body, compression)?;

        Ok(Response {
            http_version,
            code,
            message,
            headers,
            body,
            raw: raw.to_vec(),
        })
    }

    /// Protocol version from the status line, e.g. `HTTP/1.1`.
    pub fn http_version(&self) -> &str {
        &self.http_version
    }

    /// Status code as sent.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Status code as a number, if it is one.
    pub fn status(&self) -> Option<u16> {
        self.code.parse().ok()
    }

    /// Reason phrase; may contain spaces or be empty.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Every header field.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Single-valued header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get_str(name)
    }

    /// Every `Set-Cookie` value, in order.
    pub fn set_cookies(&self) -> &[String] {
        self.headers.get_all("set-cookie")
    }

    /// Body after transfer- and content-decoding.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body as text, if it is UTF-8.
    pub fn text(&self) -> Option<&str> {
        core::str::from_utf8(&self.body).ok()
    }

    /// Take the decoded body.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// The response exactly as received.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

fn parse_status_line(line: &[u8]) -> Result<(String, String, String), ResponseError> {
    let line = core::str::from_utf8(line).map_err(|_| ResponseError::NotText)?;
    let mut fields = line.splitn(3, ' ');
    let mut next_field = || {
        fields
            .next()
            .filter(|field| !field.is_empty())
            .ok_or(ResponseError::MalformedStatusLine)
    };
    let version = next_field()?;
    let code = next_field()?;
    let message = fields.next().unwrap_or("");
    Ok((version.to_string(), code.to_string(), message.to_string()))
}

/// Split what follows the status line into header block and body.
fn split_header_block(rest: &[u8]) -> Result<(&[u8], &[u8]), ResponseError> {
    if let Some(body) = rest.strip_prefix(CRLF) {
        return Ok((&[][..], body));
    }
    match find_slice(rest, HEADER_END) {
        Some(offset) if offset > MAX_HEADER_BYTES => Err(ResponseError::HeaderTooLong { offset }),
        Some(offset) => Ok((&rest[..offset], &rest[offset + HEADER_END.len()..])),
        None if rest.len() > MAX_HEADER_BYTES => Err(ResponseError::HeaderTooLong {
            offset: rest.len(),
        }),
        None => Ok((rest, &[][..])),
    }
}

fn parse_headers(block: &[u8]) -> Result<Headers, ResponseError> {
    let text = core::str::from_utf8(block).map_err(|_| ResponseError::NotText)?;
    let lines = || text.split("\r\n").filter(|line| !line.is_empty());

    let count = lines().count();
    if count > MAX_HEADER_COUNT {
        return Err(ResponseError::TooManyHeaders { count });
    }

    let mut headers = Headers::default();
    for line in lines() {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ResponseError::InvalidHeaderLine(line.to_string()))?;
        headers.append(name.to_ascii_lowercase(), strip_ows(value))?;
    }
    Ok(headers)
}

fn strip_ows(value: &str) -> &str {
    value.trim_matches([' ', '\t'])
}

fn decode_transfer(headers: &Headers, body: &[u8]) -> Result<Vec<u8>, ResponseError> {
    match headers.get_str("transfer-encoding").unwrap_or("") {
        "" => Ok(body.to_vec()),
        coding if coding.eq_ignore_ascii_case("chunked") => chunked::decode(body),
        coding => Err(ResponseError::UnsupportedTransferEncoding(coding.to_string())),
    }
}

fn decode_content(
    headers: &Headers,
    body: Vec<u8>,
    compression: Option<&dyn Compression>,
) -> Result<Vec<u8>, ResponseError> {
    let Some(compression) = compression else {
        return Ok(body);
    };
    let encoding = headers.get_str("content-encoding").unwrap_or("");
    let Some(algorithm) = Algorithm::from_name(encoding) else {
        return Ok(body);
    };
    compression
        .decompress(&body, algorithm)
        .map_err(|e| ResponseError::BrokenContent {
            encoding: encoding.to_string(),
            cause: e.to_string(),
        })
}
