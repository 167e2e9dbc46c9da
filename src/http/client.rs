//! The client facade: one request, one connection, one complete response.
//!
//! # Flow
//!
//! 1. [`Client::new`] parses the URL and options once and checks that every
//!    option is backed by a capability.
//! 2. Each call builds the request bytes, opens a connection through the
//!    [`Transport`], writes the request, reads until the peer closes, and
//!    closes the connection on every path.
//! 3. The collected bytes go through [`Response::parse`].
//!
//! Plain `http` targets behind a proxy are sent to the proxy in absolute
//! form. `https` targets behind a proxy get a `CONNECT` tunnel first, then
//! the TLS wrapper runs over the tunnelled stream.

use alloc::format;
use alloc::vec::Vec;
use core::fmt::Display;

use super::error::Error;
use super::options::Options;
use super::request::{self, Method};
use super::response::Response;
use super::url::Url;
use super::{CRLF, find_slice, form};
use crate::compression::Capabilities;
use crate::network::error::Error as NetError;
use crate::network::{Connect, Connection, NoTls, Read, Tls, TlsSettings, Write};

#[cfg(feature = "async")]
mod nonblocking;

#[cfg(feature = "async")]
pub use nonblocking::AsyncTransport;

const READ_CHUNK: usize = 1024;
const PROXY_READ_CHUNK: usize = 100;
/// Upper bound on a proxy's answer to `CONNECT`.
const PROXY_REPLY_LIMIT: usize = 1024;

/// A connector plus the TLS wrapper used for `https` targets.
#[derive(Debug)]
pub struct Transport<N, T = NoTls> {
    network: N,
    tls: T,
}

impl<N> Transport<N, NoTls> {
    /// A transport that can only reach `http` and `unix` targets.
    pub fn plain(network: N) -> Self {
        Self {
            network,
            tls: NoTls,
        }
    }
}

impl<N, T> Transport<N, T> {
    /// A transport that wraps `https` connections with `tls`.
    pub fn with_tls(network: N, tls: T) -> Self {
        Self { network, tls }
    }

    /// The connector.
    pub fn network(&self) -> &N {
        &self.network
    }

    /// The connector, mutably.
    pub fn network_mut(&mut self) -> &mut N {
        &mut self.network
    }

    /// Give back the connector and the TLS wrapper.
    pub fn into_parts(self) -> (N, T) {
        (self.network, self.tls)
    }
}

/// HTTP/1.1 client bound to one base URL.
///
/// ```rust,no_run
/// use webapi::{Client, Options};
/// use webapi::compression::Algorithm;
///
/// let options = Options::default()
///     .with_content_encoding(Algorithm::Gzip)
///     .with_accept_encoding("gzip");
/// let client = Client::new("https://api.example.com/v1/", options)?;
/// let request = client.build_get("/status");
/// assert!(request.starts_with(b"GET /v1/status HTTP/1.1\r\n"));
/// # Ok::<(), webapi::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    url: Url,
    proxy: Option<Url>,
    options: Options,
    capabilities: Capabilities,
}

impl Client {
    /// Client using every capability compiled into this build.
    pub fn new(url: &str, options: Options) -> Result<Self, Error> {
        Self::with_capabilities(url, options, Capabilities::detect())
    }

    /// Client restricted to `capabilities`.
    ///
    /// Fails with [`Error::UnsupportedOption`] when `content_encoding` or
    /// `accept_encoding` is set but there is no compression capability, and
    /// with [`Error::InvalidUrl`] when `url` or the proxy URL is malformed.
    pub fn with_capabilities(
        url: &str,
        options: Options,
        capabilities: Capabilities,
    ) -> Result<Self, Error> {
        let url = Url::parse(url)?;
        if !capabilities.has_compression() {
            if options.content_encoding.is_some() {
                return Err(Error::UnsupportedOption("content_encoding"));
            }
            if options.accept_encoding.is_some() {
                return Err(Error::UnsupportedOption("accept_encoding"));
            }
        }
        let proxy = options.proxy.as_deref().map(Url::parse).transpose()?;

        Ok(Self {
            url,
            proxy,
            options,
            capabilities,
        })
    }

    /// The base URL every resource is resolved against.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Options fixed at construction.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Capabilities fixed at construction.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Request bytes for `method` on `resource`, without sending anything.
    pub fn build_request(&self, method: Method, resource: &str, body: &[u8]) -> Vec<u8> {
        request::build(
            method,
            &self.url,
            resource,
            body,
            &self.options,
            self.capabilities.compression(),
        )
    }

    /// `GET` request bytes.
    pub fn build_get(&self, resource: &str) -> Vec<u8> {
        self.build_request(Method::Get, resource, b"")
    }

    /// `POST` request bytes. `Content-Type` and `Content-Encoding` only apply to
    /// a non-empty body.
    pub fn build_post(&self, resource: &str, body: &[u8]) -> Vec<u8> {
        self.build_request(Method::Post, resource, body)
    }

    /// `POST` with a form-encoded body.
    pub fn build_post_form<I, K, V>(&self, resource: &str, pairs: I) -> Vec<u8>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Display,
    {
        self.build_post(resource, form::encode(pairs).as_bytes())
    }

    /// Send one request and parse the response.
    pub fn request<N, T>(
        &self,
        transport: &mut Transport<N, T>,
        method: Method,
        resource: &str,
        body: &[u8],
    ) -> Result<Response, Error>
    where
        N: Connect,
        T: Tls<N::Connection>,
    {
        let request = self.build_request(method, resource, body);
        let raw = self.exchange(transport, &request)?;
        self.parse(&raw)
    }

    /// `GET` `resource`.
    pub fn get<N, T>(&self, transport: &mut Transport<N, T>, resource: &str) -> Result<Response, Error>
    where
        N: Connect,
        T: Tls<N::Connection>,
    {
        self.request(transport, Method::Get, resource, b"")
    }

    /// `POST` `body` to `resource`.
    pub fn post<N, T>(
        &self,
        transport: &mut Transport<N, T>,
        resource: &str,
        body: &[u8],
    ) -> Result<Response, Error>
    where
        N: Connect,
        T: Tls<N::Connection>,
    {
        self.request(transport, Method::Post, resource, body)
    }

    /// `POST` with a form-encoded body.
    pub fn post_form<N, T, I, K, V>(
        &self,
        transport: &mut Transport<N, T>,
        resource: &str,
        pairs: I,
    ) -> Result<Response, Error>
    where
        N: Connect,
        T: Tls<N::Connection>,
        I: IntoIterator<Item = (K, V)>,
        K: Display,
        V: Display,
    {
        self.post(transport, resource, form::encode(pairs).as_bytes())
    }

    fn parse(&self, raw: &[u8]) -> Result<Response, Error> {
        let response = Response::parse(raw, self.capabilities.compression())?;
        debug!(
            "response {=str}, {=usize} body byte(s)",
            response.code(),
            response.body().len()
        );
        Ok(response)
    }

    /// Where the connection goes first: the proxy, if one applies.
    fn first_hop(&self) -> &Url {
        match &self.proxy {
            Some(proxy) if !self.url.is_unix() => proxy,
            _ => &self.url,
        }
    }

    fn tunnels(&self) -> bool {
        self.proxy.is_some() && self.url.is_tls()
    }

    fn tls_settings(&self) -> TlsSettings<'_> {
        TlsSettings {
            server_name: self.url.host(),
            port: self.url.port().unwrap_or_default(),
            certs: self.options.certs.as_deref(),
            sni: self.options.sni.as_deref(),
            ignore_certificate_validity: self.options.ignore_certificate_validity,
        }
    }

    fn exchange<N, T>(&self, transport: &mut Transport<N, T>, request: &[u8]) -> Result<Vec<u8>, Error>
    where
        N: Connect,
        T: Tls<N::Connection>,
    {
        let remote = self.first_hop().remote();
        let stream = transport
            .network
            .connect(&remote)
            .map_err(transport_error)?;
        debug!("connected to {=str}", remote.as_str());

        if !self.url.is_tls() {
            return round_trip(stream, request);
        }

        let stream = if self.tunnels() {
            open_tunnel(stream, &self.url)?
        } else {
            stream
        };
        let stream = transport
            .tls
            .wrap(stream, &self.tls_settings())
            .map_err(|_| NetError::TlsHandshake)?;
        round_trip(stream, request)
    }
}

/// Write `request`, read the whole response, close.
fn round_trip<C: Connection>(mut stream: C, request: &[u8]) -> Result<Vec<u8>, Error> {
    let result = write_all(&mut stream, request).and_then(|()| read_to_end(&mut stream));
    if stream.close().is_err() {
        warn!("closing the connection failed");
    }
    result
}

fn write_all<W: Write>(stream: &mut W, mut buf: &[u8]) -> Result<(), Error> {
    while !buf.is_empty() {
        match stream.write(buf) {
            Ok(0) => return Err(NetError::WriteError.into()),
            Ok(n) => buf = &buf[n..],
            Err(e) => return Err(transport_error(e)),
        }
    }
    stream.flush().map_err(transport_error)?;
    Ok(())
}

fn read_to_end<R: Read>(stream: &mut R) -> Result<Vec<u8>, Error> {
    let mut received = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match stream.read(&mut chunk) {
            Ok(0) if received.is_empty() => return Err(NetError::ConnectionClosed.into()),
            Ok(0) => return Ok(received),
            Ok(n) => received.extend_from_slice(&chunk[..n]),
            Err(e) => return Err(transport_error(e)),
        }
    }
}

fn open_tunnel<C: Connection>(mut stream: C, url: &Url) -> Result<C, Error> {
    match connect_through_proxy(&mut stream, url) {
        Ok(()) => Ok(stream),
        Err(e) => {
            let _ = stream.close();
            Err(e)
        }
    }
}

fn connect_request(url: &Url) -> alloc::string::String {
    let authority = format!("{}:{}", url.host(), url.port().unwrap_or_default());
    format!("CONNECT {authority} HTTP/1.1\r\nHost: {authority}\r\n\r\n")
}

fn connect_through_proxy<C: Connection>(stream: &mut C, url: &Url) -> Result<(), Error> {
    write_all(stream, connect_request(url).as_bytes())?;

    let mut reply: heapless::Vec<u8, PROXY_REPLY_LIMIT> = heapless::Vec::new();
    let mut chunk = [0u8; PROXY_READ_CHUNK];
    while find_slice(&reply, b"\r\n\r\n").is_none() {
        let n = stream.read(&mut chunk).map_err(transport_error)?;
        if n == 0 {
            return Err(NetError::ConnectionClosed.into());
        }
        reply
            .extend_from_slice(&chunk[..n])
            .map_err(|_| NetError::ProtocolError)?;
    }
    check_proxy_reply(&reply)?;
    debug!("tunnel open to {=str}", url.host());
    Ok(())
}

/// The proxy must answer `CONNECT` with a 2xx status.
fn check_proxy_reply(reply: &[u8]) -> Result<(), Error> {
    let status_line = match find_slice(reply, CRLF) {
        Some(end) => &reply[..end],
        None => reply,
    };
    match status_line.splitn(3, |&b| b == b' ').nth(1) {
        Some([b'2', tens, ones]) if tens.is_ascii_digit() && ones.is_ascii_digit() => Ok(()),
        _ => Err(NetError::ProxyRejected.into()),
    }
}

/// Keep the adapter's own classification of a transport failure.
fn transport_error<E: Into<NetError>>(e: E) -> Error {
    Error::Transport(e.into())
}
