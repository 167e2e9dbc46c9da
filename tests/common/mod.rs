#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use webapi::network::error::Error;
use webapi::network::*;

/// What the client did on the wire, shared between a network and every
/// connection it handed out.
#[derive(Debug, Default)]
pub struct Wire {
    pub remotes: Vec<String>,
    pub written: Vec<u8>,
    pub closed: usize,
    pub handshakes: Vec<(String, u16, Option<String>, Option<String>, bool)>,
}

impl Wire {
    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }
}

/// A connection that answers reads from a script of segments.
///
/// A read never crosses a segment boundary, so a reader that stops after
/// one segment (like the proxy handshake) leaves the next one untouched.
#[derive(Debug)]
pub struct MockConnection {
    segments: VecDeque<Vec<u8>>,
    read_chunk: usize,
    read_error: Option<Error>,
    fail_writes: bool,
    wire: Rc<RefCell<Wire>>,
}

impl Read for MockConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(segment) = self.segments.front_mut() else {
            return self.read_error.map_or(Ok(0), Err);
        };
        let len = buf.len().min(self.read_chunk).min(segment.len());
        buf[..len].copy_from_slice(&segment[..len]);
        segment.drain(..len);
        if segment.is_empty() {
            self.segments.pop_front();
        }
        Ok(len)
    }
}

impl Write for MockConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if self.fail_writes {
            return Err(Error::WriteError);
        }
        self.wire.borrow_mut().written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        self.wire.borrow_mut().closed += 1;
        Ok(())
    }
}

impl Connection for MockConnection {}

/// Hands out one scripted connection per `connect`.
#[derive(Debug)]
pub struct MockNetwork {
    pub wire: Rc<RefCell<Wire>>,
    segments: Vec<Vec<u8>>,
    read_chunk: usize,
    refuse: Option<Error>,
    read_error: Option<Error>,
    fail_writes: bool,
}

impl MockNetwork {
    /// A network whose connections reply with `segments`.
    pub fn replying<S: AsRef<[u8]>>(segments: &[S]) -> Self {
        Self {
            wire: Rc::default(),
            segments: segments.iter().map(|s| s.as_ref().to_vec()).collect(),
            read_chunk: 7,
            refuse: None,
            read_error: None,
            fail_writes: false,
        }
    }

    /// A network whose connections close without a reply.
    pub fn silent() -> Self {
        Self::replying::<&[u8]>(&[])
    }

    pub fn refusing() -> Self {
        Self::refusing_with(Error::ConnectionRefused)
    }

    /// A network whose `connect` fails with `error`.
    pub fn refusing_with(error: Error) -> Self {
        Self {
            refuse: Some(error),
            ..Self::silent()
        }
    }

    /// Reads fail with `error` once the scripted segments run out.
    pub fn then_failing(mut self, error: Error) -> Self {
        self.read_error = Some(error);
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn with_read_chunk(mut self, read_chunk: usize) -> Self {
        self.read_chunk = read_chunk;
        self
    }

    pub fn wire(&self) -> Rc<RefCell<Wire>> {
        Rc::clone(&self.wire)
    }
}

impl Connect for MockNetwork {
    type Connection = MockConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        if let Some(error) = self.refuse {
            return Err(error);
        }
        self.wire.borrow_mut().remotes.push(remote.to_string());
        Ok(MockConnection {
            segments: self.segments.iter().cloned().collect(),
            read_chunk: self.read_chunk,
            read_error: self.read_error,
            fail_writes: self.fail_writes,
            wire: Rc::clone(&self.wire),
        })
    }
}

/// A TLS wrapper that records the handshake settings and passes the stream
/// through unchanged.
#[derive(Debug, Default)]
pub struct MockTls {
    pub reject: bool,
}

impl<C: Connection> Tls<C> for MockTls
where
    C: HasWire,
{
    type Connection = C;
    type Error = Error;

    fn wrap(&mut self, stream: C, settings: &TlsSettings<'_>) -> Result<C, Self::Error> {
        stream.wire().borrow_mut().handshakes.push((
            settings.server_name.to_string(),
            settings.port,
            settings.certs.map(str::to_string),
            settings.sni.map(str::to_string),
            settings.ignore_certificate_validity,
        ));
        if self.reject {
            let _ = stream.close();
            return Err(Error::TlsHandshake);
        }
        Ok(stream)
    }
}

pub trait HasWire {
    fn wire(&self) -> Rc<RefCell<Wire>>;
}

impl HasWire for MockConnection {
    fn wire(&self) -> Rc<RefCell<Wire>> {
        Rc::clone(&self.wire)
    }
}

#[cfg(feature = "async")]
mod nonblocking {
    use super::*;

    impl AsyncRead for MockConnection {
        type Error = Error;
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            Read::read(self, buf)
        }
    }

    impl AsyncWrite for MockConnection {
        type Error = Error;
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            Write::write(self, buf)
        }
        async fn flush(&mut self) -> Result<(), Self::Error> {
            Write::flush(self)
        }
    }

    impl AsyncClose for MockConnection {
        type Error = Error;
        async fn close(self) -> Result<(), Self::Error> {
            Close::close(self)
        }
    }

    impl AsyncConnection for MockConnection {}

    impl AsyncConnect for MockNetwork {
        type Connection = MockConnection;
        type Error = Error;

        async fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
            Connect::connect(self, remote)
        }
    }

    impl AsyncTls<MockConnection> for MockTls {
        type Connection = MockConnection;
        type Error = Error;

        async fn wrap(
            &mut self,
            stream: MockConnection,
            settings: &TlsSettings<'_>,
        ) -> Result<MockConnection, Self::Error> {
            Tls::wrap(self, stream, settings)
        }
    }
}
