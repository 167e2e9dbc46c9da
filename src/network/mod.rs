//! A transport abstraction layer for the HTTP client
//!
//! The client never opens sockets itself. It talks to whatever implements the
//! traits below: plain byte streams through [`Connect`], and TLS through a
//! [`Tls`] wrapper that takes an already connected stream. Async mirrors are
//! available behind the `async` feature.
//!

#![allow(missing_docs)]
#![allow(async_fn_in_trait)]
#![deny(unsafe_code)]

/// Common error types for transport operations
pub mod error;

/// `std::net` TCP adapter
#[cfg(feature = "std")]
pub mod tcp;

/// Re-exports of common traits
pub mod prelude {
    #[cfg(feature = "async")]
    pub use super::{AsyncClose, AsyncConnect, AsyncRead, AsyncTls, AsyncWrite};
    pub use super::{Close, Connect, Read, Tls, Write};
}

// Core synchronous traits
pub trait Read {
    /// Associated error type, folded into [`error::Error`] by the client
    type Error: core::fmt::Debug + Into<error::Error>;
    /// Read data from the connection. `Ok(0)` means the peer closed it.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

pub trait Write {
    /// Associated error type, folded into [`error::Error`] by the client
    type Error: core::fmt::Debug + Into<error::Error>;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type, folded into [`error::Error`] by the client
    type Error: core::fmt::Debug + Into<error::Error>;
    /// Open a connection to `remote`, either `host:port` or a unix socket path
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}

/// Parameters handed to a TLS wrapper for one handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TlsSettings<'a> {
    /// Host name the server certificate is checked against.
    pub server_name: &'a str,
    /// Port of the origin server.
    pub port: u16,
    /// Trust anchors (PEM or whatever the wrapper understands).
    pub certs: Option<&'a str>,
    /// Server name to send in the SNI extension, if it differs from `server_name`.
    pub sni: Option<&'a str>,
    /// Accept certificates outside their validity period.
    pub ignore_certificate_validity: bool,
}

/// Wraps a connected byte stream in TLS.
///
/// The wrapper owns `stream` once called and must release it if the
/// handshake fails.
pub trait Tls<C: Connection> {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Run the client handshake over `stream`
    fn wrap(&mut self, stream: C, settings: &TlsSettings<'_>)
    -> Result<Self::Connection, Self::Error>;
}

/// A [`Tls`] wrapper for hosts without TLS support. Every handshake fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoTls;

impl<C: Connection> Tls<C> for NoTls {
    type Connection = C;
    type Error = error::Error;

    fn wrap(&mut self, stream: C, _settings: &TlsSettings<'_>) -> Result<C, Self::Error> {
        let _ = stream.close();
        Err(error::Error::TlsHandshake)
    }
}

// Core async traits
#[cfg(feature = "async")]
pub trait AsyncRead {
    /// Associated error type, folded into [`error::Error`] by the client
    type Error: core::fmt::Debug + Into<error::Error>;
    /// Read data from the connection asynchronously
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

#[cfg(feature = "async")]
pub trait AsyncWrite {
    /// Associated error type, folded into [`error::Error`] by the client
    type Error: core::fmt::Debug + Into<error::Error>;
    /// Write data to the connection asynchronously
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer asynchronously
    async fn flush(&mut self) -> Result<(), Self::Error>;
}

#[cfg(feature = "async")]
pub trait AsyncClose {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection asynchronously
    async fn close(self) -> Result<(), Self::Error>;
}

#[cfg(feature = "async")]
pub trait AsyncConnection: AsyncRead + AsyncWrite + AsyncClose {}

#[cfg(feature = "async")]
pub trait AsyncConnect {
    /// Associated connection type
    type Connection: AsyncConnection;
    /// Associated error type, folded into [`error::Error`] by the client
    type Error: core::fmt::Debug + Into<error::Error>;
    /// Open a connection asynchronously
    async fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}

#[cfg(feature = "async")]
pub trait AsyncTls<C: AsyncConnection> {
    /// Associated connection type
    type Connection: AsyncConnection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Run the client handshake over `stream` asynchronously
    async fn wrap(
        &mut self,
        stream: C,
        settings: &TlsSettings<'_>,
    ) -> Result<Self::Connection, Self::Error>;
}

#[cfg(feature = "async")]
impl<C: AsyncConnection> AsyncTls<C> for NoTls {
    type Connection = C;
    type Error = error::Error;

    async fn wrap(&mut self, stream: C, _settings: &TlsSettings<'_>) -> Result<C, Self::Error> {
        let _ = stream.close().await;
        Err(error::Error::TlsHandshake)
    }
}
