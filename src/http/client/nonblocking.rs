//! Async flavour of the client round trip.

use alloc::vec::Vec;

use super::{
    Client, PROXY_READ_CHUNK, PROXY_REPLY_LIMIT, READ_CHUNK, check_proxy_reply, connect_request,
    transport_error,
};
use crate::http::error::Error;
use crate::http::find_slice;
use crate::http::request::Method;
use crate::http::url::Url;
use crate::http::response::Response;
use crate::network::error::Error as NetError;
use crate::network::{
    AsyncConnect, AsyncConnection, AsyncRead, AsyncTls, AsyncWrite, NoTls,
};

/// Async counterpart of [`Transport`](super::Transport).
#[derive(Debug)]
pub struct AsyncTransport<N, T = NoTls> {
    network: N,
    tls: T,
}

impl<N> AsyncTransport<N, NoTls> {
    /// A transport that can only reach `http` and `unix` targets.
    pub fn plain(network: N) -> Self {
        Self {
            network,
            tls: NoTls,
        }
    }
}

impl<N, T> AsyncTransport<N, T> {
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

impl Client {
    /// Send one request and parse the response.
    pub async fn request_async<N, T>(
        &self,
        transport: &mut AsyncTransport<N, T>,
        method: Method,
        resource: &str,
        body: &[u8],
    ) -> Result<Response, Error>
    where
        N: AsyncConnect,
        T: AsyncTls<N::Connection>,
    {
        let request = self.build_request(method, resource, body);
        let raw = self.exchange_async(transport, &request).await?;
        self.parse(&raw)
    }

    /// `GET` `resource`.
    pub async fn get_async<N, T>(
        &self,
        transport: &mut AsyncTransport<N, T>,
        resource: &str,
    ) -> Result<Response, Error>
    where
        N: AsyncConnect,
        T: AsyncTls<N::Connection>,
    {
        self.request_async(transport, Method::Get, resource, b"").await
    }

    /// `POST` `body` to `resource`.
    pub async fn post_async<N, T>(
        &self,
        transport: &mut AsyncTransport<N, T>,
        resource: &str,
        body: &[u8],
    ) -> Result<Response, Error>
    where
        N: AsyncConnect,
        T: AsyncTls<N::Connection>,
    {
        self.request_async(transport, Method::Post, resource, body).await
    }

    async fn exchange_async<N, T>(
        &self,
        transport: &mut AsyncTransport<N, T>,
        request: &[u8],
    ) -> Result<Vec<u8>, Error>
    where
        N: AsyncConnect,
        T: AsyncTls<N::Connection>,
    {
        let remote = self.first_hop().remote();
        let stream = transport
            .network
            .connect(&remote)
            .await
            .map_err(transport_error)?;
        debug!("connected to {=str}", remote.as_str());

        if !self.url.is_tls() {
            return round_trip(stream, request).await;
        }

        let stream = if self.tunnels() {
            open_tunnel(stream, &self.url).await?
        } else {
            stream
        };
        let stream = transport
            .tls
            .wrap(stream, &self.tls_settings())
            .await
            .map_err(|_| NetError::TlsHandshake)?;
        round_trip(stream, request).await
    }
}

async fn round_trip<C: AsyncConnection>(mut stream: C, request: &[u8]) -> Result<Vec<u8>, Error> {
    let result = match write_all(&mut stream, request).await {
        Ok(()) => read_to_end(&mut stream).await,
        Err(e) => Err(e),
    };
    if stream.close().await.is_err() {
        warn!("closing the connection failed");
    }
    result
}

async fn write_all<W: AsyncWrite>(stream: &mut W, mut buf: &[u8]) -> Result<(), Error> {
    while !buf.is_empty() {
        match stream.write(buf).await {
            Ok(0) => return Err(NetError::WriteError.into()),
            Ok(n) => buf = &buf[n..],
            Err(e) => return Err(transport_error(e)),
        }
    }
    stream.flush().await.map_err(transport_error)?;
    Ok(())
}

async fn read_to_end<R: AsyncRead>(stream: &mut R) -> Result<Vec<u8>, Error> {
    let mut received = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) if received.is_empty() => return Err(NetError::ConnectionClosed.into()),
            Ok(0) => return Ok(received),
            Ok(n) => received.extend_from_slice(&chunk[..n]),
            Err(e) => return Err(transport_error(e)),
        }
    }
}

async fn open_tunnel<C: AsyncConnection>(mut stream: C, url: &Url) -> Result<C, Error> {
    match connect_through_proxy(&mut stream, url).await {
        Ok(()) => Ok(stream),
        Err(e) => {
            let _ = stream.close().await;
            Err(e)
        }
    }
}

async fn connect_through_proxy<C: AsyncConnection>(stream: &mut C, url: &Url) -> Result<(), Error> {
    write_all(stream, connect_request(url).as_bytes()).await?;

    let mut reply: heapless::Vec<u8, PROXY_REPLY_LIMIT> = heapless::Vec::new();
    let mut chunk = [0u8; PROXY_READ_CHUNK];
    while find_slice(&reply, b"\r\n\r\n").is_none() {
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(transport_error)?;
        if n == 0 {
            return Err(NetError::ConnectionClosed.into());
        }
        reply
            .extend_from_slice(&chunk[..n])
            .map_err(|_| NetError::ProtocolError)?;
    }
    check_proxy_reply(&reply)
}
