//! Blocking TCP transport over `std::net`.
//!
//! ```rust,no_run
//! use webapi::Client;
//! use webapi::http::Transport;
//! use webapi::network::tcp::TcpConnector;
//!
//! let client = Client::new("http://example.com/", Default::default()).unwrap();
//! let mut transport = Transport::plain(TcpConnector::new());
//! let response = client.get(&mut transport, "index.html").unwrap();
//! println!("{}", response);
//! ```

use std::io::{self, Read as _, Write as _};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use super::error::Error;
use super::{Close, Connect, Connection, Read, Write};

/// Opens [`TcpConnection`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcpConnector {
    read_timeout: Option<Duration>,
}

impl TcpConnector {
    /// Connector with blocking reads.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail reads that block longer than `timeout`.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }
}

impl Connect for TcpConnector {
    type Connection = TcpConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        let stream = TcpStream::connect(remote).map_err(map_io_error)?;
        stream
            .set_read_timeout(self.read_timeout)
            .map_err(map_io_error)?;
        Ok(TcpConnection { stream })
    }
}

/// A connected TCP stream.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
}

impl TcpConnection {
    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl Read for TcpConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.stream.read(buf).map_err(|e| match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Error::Timeout,
            _ => Error::ReadError,
        })
    }
}

impl Write for TcpConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream.write(buf).map_err(|_| Error::WriteError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush().map_err(|_| Error::WriteError)
    }
}

impl Close for TcpConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        match self.stream.shutdown(Shutdown::Both) {
            // The peer may already have torn the socket down after sending.
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(_) => Err(Error::ProtocolError),
        }
    }
}

impl Connection for TcpConnection {}

fn map_io_error(e: io::Error) -> Error {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::Timeout,
        io::ErrorKind::InvalidInput => Error::InvalidAddress,
        _ => Error::ConnectionRefused,
    }
}
