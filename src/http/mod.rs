//! HTTP/1.1 protocol implementation.
//!
//! The protocol layer is split so each piece can be used on its own:
//!
//! - [`url`]: URL decomposition
//! - [`form`]: form encoding for bodies and query strings
//! - [`request`]: request serialization
//! - [`response`] and [`chunked`]: response parsing and transfer-decoding
//! - [`client`]: the facade that runs one request over a
//!   [`Transport`](client::Transport)
//!
//! Every request is sent with `Connection: close` and the whole response is
//! read before parsing, so there is no connection reuse and no streaming.

pub mod chunked;
pub mod client;
pub mod error;
pub mod form;
pub mod options;
pub mod request;
pub mod response;
pub mod url;

pub use client::{Client, Transport};
#[cfg(feature = "async")]
pub use client::AsyncTransport;
pub use error::{Error, ResponseError};
pub use options::Options;
pub use request::Method;
pub use response::{HeaderValue, Headers, Response};
pub use url::Url;

pub(crate) const CRLF: &[u8] = b"\r\n";

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = "mruby-webapi";

/// Finds the first occurrence of a slice in another slice and returns its starting position.
pub(crate) fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
