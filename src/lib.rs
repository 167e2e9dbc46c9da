//! # webapi - a minimal HTTP/1.1 client
//!
//! `webapi` builds HTTP/1.1 request messages, sends them over a transport the
//! caller supplies, and parses the raw response bytes into a structured
//! [`Response`]. It is designed for embedded systems and supports `no_std`
//! environments with an allocator.
//!
//! ## Features
//!
//! - URL decomposition for `http`, `https`, other explicit-port schemes and
//!   `unix:` socket paths
//! - Request construction with proxy (absolute-form and CONNECT tunnel)
//!   support
//! - Response parsing with bounded header blocks, chunked transfer-decoding
//!   and gzip/deflate content-decoding
//! - Form (`application/x-www-form-urlencoded`) encoding and decoding
//!
//! ## Usage
//!
//! ```rust,no_run
//! use webapi::{Client, Options};
//! use webapi::http::Transport;
//! # use webapi::network::{Close, Connect, Connection, Read, Write};
//! # use webapi::network::error::Error as NetError;
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl Read for MockConnection {
//! #     type Error = NetError;
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for MockConnection {
//! #     type Error = NetError;
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Close for MockConnection {
//! #     type Error = NetError;
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct MockNetwork;
//! # impl Connect for MockNetwork {
//! #     type Connection = MockConnection;
//! #     type Error = NetError;
//! #     fn connect(&mut self, _remote: &str) -> Result<MockConnection, NetError> { Ok(MockConnection) }
//! # }
//!
//! let options = Options::default().with_content_type("application/json");
//! let client = Client::new("http://example.com/api/", options)?;
//!
//! let mut transport = Transport::plain(MockNetwork);
//! let response = client.post(&mut transport, "/items", br#"{"name":"sensor"}"#)?;
//! assert_eq!(response.code(), "201");
//! # Ok::<(), webapi::Error>(())
//! ```
//!
//! ## Optional Features
//!
//! - `zlib` (default): built-in gzip/deflate capability
//! - `std`: `std::net` TCP transport
//! - `async`: async transport traits and client methods
//! - `defmt`: defmt logging and `defmt::Format` for error types

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate alloc;

#[macro_use]
mod logging;

/// Compression capability used for `Content-Encoding`.
pub mod compression;

/// HTTP/1.1 protocol layer: URLs, requests, responses and the client facade.
pub mod http;

/// Transport abstraction the client runs on.
///
/// Implement [`network::Connect`] (and [`network::Tls`] for `https`) for the
/// socket stack of the target platform.
pub mod network;

pub use compression::Capabilities;
pub use http::{Client, Error, Method, Options, Response, ResponseError, Url};
