//! Compression capability for `Content-Encoding`.
//!
//! The HTTP layer never compresses anything itself. It asks the
//! [`Compression`] implementation found in its [`Capabilities`] and, when
//! there is none, leaves bodies untouched. With the `zlib` feature the
//! built-in [`Zlib`] capability is picked up by [`Capabilities::detect`].

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use serde::Deserialize;

#[cfg(feature = "zlib")]
mod zlib;

#[cfg(feature = "zlib")]
pub use zlib::Zlib;

/// A content coding the client knows how to negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// RFC 1952 gzip member.
    Gzip,
    /// RFC 1950 zlib stream (HTTP calls it `deflate`).
    Deflate,
}

impl Algorithm {
    /// The token used in `Content-Encoding` and `Accept-Encoding`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Gzip => "gzip",
            Algorithm::Deflate => "deflate",
        }
    }

    /// Matches a coding token case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("gzip") {
            Some(Algorithm::Gzip)
        } else if name.eq_ignore_ascii_case("deflate") {
            Some(Algorithm::Deflate)
        } else {
            None
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while decompressing a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The gzip magic, method or header fields are invalid.
    BadHeader,
    /// The input ended before the stream did.
    Truncated,
    /// The DEFLATE stream itself is corrupt.
    Corrupt(String),
    /// The gzip CRC-32 trailer does not match the data.
    ChecksumMismatch,
    /// The gzip ISIZE trailer does not match the data.
    LengthMismatch,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BadHeader => f.write_str("invalid gzip header"),
            Error::Truncated => f.write_str("truncated stream"),
            Error::Corrupt(status) => write!(f, "corrupt deflate stream: {status}"),
            Error::ChecksumMismatch => f.write_str("crc32 mismatch"),
            Error::LengthMismatch => f.write_str("length mismatch"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::BadHeader => defmt::write!(f, "BadHeader"),
            Error::Truncated => defmt::write!(f, "Truncated"),
            Error::Corrupt(status) => defmt::write!(f, "Corrupt({=str})", status.as_str()),
            Error::ChecksumMismatch => defmt::write!(f, "ChecksumMismatch"),
            Error::LengthMismatch => defmt::write!(f, "LengthMismatch"),
        }
    }
}

/// Whole-body compression used for `Content-Encoding`.
pub trait Compression: Send + Sync {
    /// Compress `data` with `algorithm`.
    fn compress(&self, data: &[u8], algorithm: Algorithm) -> Vec<u8>;

    /// Reverse [`Compression::compress`].
    fn decompress(&self, data: &[u8], algorithm: Algorithm) -> Result<Vec<u8>, Error>;
}

/// Optional capabilities a [`Client`](crate::Client) may use.
///
/// Decided once when the client is configured; the request and response
/// paths only ever look at what is stored here.
#[derive(Clone, Copy, Default)]
pub struct Capabilities {
    compression: Option<&'static dyn Compression>,
}

impl Capabilities {
    /// No optional capabilities.
    pub const fn none() -> Self {
        Self { compression: None }
    }

    /// Everything compiled into this build.
    pub fn detect() -> Self {
        #[cfg(feature = "zlib")]
        {
            Self::none().with_compression(&zlib::ZLIB)
        }
        #[cfg(not(feature = "zlib"))]
        {
            Self::none()
        }
    }

    /// Use `compression` for request and response bodies.
    pub const fn with_compression(mut self, compression: &'static dyn Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    /// The compression capability, if any.
    pub fn compression(&self) -> Option<&'static dyn Compression> {
        self.compression
    }

    /// Whether a compression capability is present.
    pub fn has_compression(&self) -> bool {
        self.compression.is_some()
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities")
            .field("compression", &self.has_compression())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_names_are_case_insensitive() {
        assert_eq!(Algorithm::from_name("gzip"), Some(Algorithm::Gzip));
        assert_eq!(Algorithm::from_name("GZip"), Some(Algorithm::Gzip));
        assert_eq!(Algorithm::from_name("DEFLATE"), Some(Algorithm::Deflate));
        assert_eq!(Algorithm::from_name("br"), None);
        assert_eq!(Algorithm::from_name(""), None);
    }

    #[test]
    fn none_has_no_compression() {
        assert!(!Capabilities::none().has_compression());
        assert!(!Capabilities::default().has_compression());
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn detect_finds_builtin_zlib() {
        assert!(Capabilities::detect().has_compression());
    }
}
