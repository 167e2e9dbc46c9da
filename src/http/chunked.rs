//! Chunked transfer-coding.

use alloc::vec::Vec;

use super::error::ResponseError;
use super::{CRLF, find_slice};

/// Reassemble a `Transfer-Encoding: chunked` body.
///
/// Chunk extensions after `;` are ignored. Decoding stops at the zero-size
/// chunk; trailer fields after it are not inspected.
///
/// ```
/// use webapi::http::chunked;
///
/// let body = chunked::decode(b"5\r\nmruby\r\n1\r\n-\r\n6; ext\r\nwebapi\r\n0\r\n\r\n").unwrap();
/// assert_eq!(body, b"mruby-webapi");
/// ```
pub fn decode(mut raw: &[u8]) -> Result<Vec<u8>, ResponseError> {
    let mut joined = Vec::new();
    loop {
        let line_end = find_slice(raw, CRLF).ok_or(ResponseError::BrokenChunk)?;
        let (line, rest) = (&raw[..line_end], &raw[line_end + CRLF.len()..]);

        let size_field = match line.iter().position(|&b| b == b';') {
            Some(semicolon) => &line[..semicolon],
            None => line,
        };
        let size = parse_size(size_field)?;
        if size == 0 {
            break;
        }
        if size > rest.len() {
            return Err(ResponseError::BrokenChunk);
        }

        let (data, tail) = rest.split_at(size);
        joined.extend_from_slice(data);
        raw = tail.strip_prefix(CRLF).ok_or(ResponseError::BrokenChunk)?;
    }
    Ok(joined)
}

fn parse_size(field: &[u8]) -> Result<usize, ResponseError> {
    let text = core::str::from_utf8(field)
        .map_err(|_| ResponseError::BrokenChunk)?
        .trim_matches([' ', '\t']);
    if text.is_empty() || text.starts_with('+') {
        return Err(ResponseError::BrokenChunk);
    }
    usize::from_str_radix(text, 16).map_err(|_| ResponseError::BrokenChunk)
}
