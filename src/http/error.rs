//! Error types for the HTTP client.
//!
//! Every failure is terminal for the call in progress. [`ResponseError`] is
//! kept separate so the parser can be used on its own without dragging in
//! transport or configuration errors.

use alloc::string::String;
use core::fmt;

use super::response::{MAX_HEADER_BYTES, MAX_HEADER_COUNT};
use crate::network;

/// Errors returned by the client and its building blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The URL string could not be decomposed.
    InvalidUrl(String),
    /// An option needs a capability this client does not have.
    UnsupportedOption(&'static str),
    /// The options document could not be loaded.
    InvalidOptions(String),
    /// The response was malformed.
    Response(ResponseError),
    /// The transport failed.
    Transport(network::error::Error),
}

/// A malformed, oversized or otherwise non-conformant response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The status line has no version or no status code.
    MalformedStatusLine,
    /// The status line or header block is not valid UTF-8.
    NotText,
    /// The blank line ending the header block starts past the limit.
    HeaderTooLong {
        /// Byte offset of the header block terminator.
        offset: usize,
    },
    /// The header block has more lines than the limit.
    TooManyHeaders {
        /// Number of header lines seen.
        count: usize,
    },
    /// A header line without a `:`.
    InvalidHeaderLine(String),
    /// Chunked framing is broken.
    BrokenChunk,
    /// A `Transfer-Encoding` other than `chunked`.
    UnsupportedTransferEncoding(String),
    /// A gzip/deflate body failed to decompress.
    BrokenContent {
        /// The `Content-Encoding` value as received.
        encoding: String,
        /// What the decompressor reported.
        cause: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidUrl(reason) => write!(f, "invalid URL: {reason}"),
            Error::UnsupportedOption(option) => {
                write!(f, "option `{option}` requires a compression capability")
            }
            Error::InvalidOptions(reason) => write!(f, "invalid options: {reason}"),
            Error::Response(e) => fmt::Display::fmt(e, f),
            Error::Transport(e) => write!(f, "transport error: {e}"),
        }
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseError::MalformedStatusLine => f.write_str("malformed status line"),
            ResponseError::NotText => f.write_str("status line or header is not UTF-8"),
            ResponseError::HeaderTooLong { offset } => {
                write!(f, "header is too long ({offset} > {MAX_HEADER_BYTES}:max)")
            }
            ResponseError::TooManyHeaders { count } => {
                write!(f, "too many header fields ({count} > {MAX_HEADER_COUNT}:max)")
            }
            ResponseError::InvalidHeaderLine(line) => {
                write!(f, "invalid header line not including \":\": {line}")
            }
            ResponseError::BrokenChunk => f.write_str("broken chunk"),
            ResponseError::UnsupportedTransferEncoding(coding) => {
                write!(f, "unsupported Transfer-Encoding: {coding}")
            }
            ResponseError::BrokenContent { encoding, cause } => {
                write!(f, "broken {encoding} response ({cause})")
            }
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Response(e) => Some(e),
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl core::error::Error for ResponseError {}

impl From<ResponseError> for Error {
    fn from(e: ResponseError) -> Self {
        Error::Response(e)
    }
}

impl From<network::error::Error> for Error {
    fn from(e: network::error::Error) -> Self {
        Error::Transport(e)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::InvalidUrl(reason) => defmt::write!(f, "InvalidUrl({=str})", reason.as_str()),
            Error::UnsupportedOption(option) => defmt::write!(f, "UnsupportedOption({=str})", *option),
            Error::InvalidOptions(reason) => {
                defmt::write!(f, "InvalidOptions({=str})", reason.as_str())
            }
            Error::Response(e) => defmt::write!(f, "Response({})", e),
            Error::Transport(e) => defmt::write!(f, "Transport({})", e),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ResponseError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ResponseError::MalformedStatusLine => defmt::write!(f, "MalformedStatusLine"),
            ResponseError::NotText => defmt::write!(f, "NotText"),
            ResponseError::HeaderTooLong { offset } => {
                defmt::write!(f, "HeaderTooLong({=usize})", *offset)
            }
            ResponseError::TooManyHeaders { count } => {
                defmt::write!(f, "TooManyHeaders({=usize})", *count)
            }
            ResponseError::InvalidHeaderLine(line) => {
                defmt::write!(f, "InvalidHeaderLine({=str})", line.as_str())
            }
            ResponseError::BrokenChunk => defmt::write!(f, "BrokenChunk"),
            ResponseError::UnsupportedTransferEncoding(coding) => {
                defmt::write!(f, "UnsupportedTransferEncoding({=str})", coding.as_str())
            }
            ResponseError::BrokenContent { encoding, cause } => defmt::write!(
                f,
                "BrokenContent({=str}, {=str})",
                encoding.as_str(),
                cause.as_str()
            ),
        }
    }
}
