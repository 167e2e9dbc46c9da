//! Absolute URL decomposition.
//!
//! Only what the client needs: scheme, authority, host, port and path. The
//! `unix` scheme carries a socket path instead of an authority. Userinfo is
//! not split out of the authority.

use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;

use super::error::Error;

/// Ports used when the authority has none.
const DEFAULT_PORTS: [(&str, u16); 2] = [("http", 80), ("https", 443)];

/// Default port for `scheme`, if it has one.
pub fn default_port(scheme: &str) -> Option<u16> {
    DEFAULT_PORTS
        .iter()
        .find(|(name, _)| *name == scheme)
        .map(|&(_, port)| port)
}

/// A parsed absolute URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Url {
    scheme: String,
    authority: Option<String>,
    host: String,
    port: Option<u16>,
    path: String,
}

impl Url {
    /// Parse `scheme://authority[/path]` or `unix://<socket path>`.
    ///
    /// ```
    /// use webapi::Url;
    ///
    /// let url = Url::parse("HTTP://example.com/api").unwrap();
    /// assert_eq!(url.scheme(), "http");
    /// assert_eq!(url.port(), Some(80));
    /// assert_eq!(url.path(), "/api");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let (scheme, tail) = raw
            .split_once("://")
            .ok_or_else(|| Error::InvalidUrl(format!("missing \"://\": {raw}")))?;
        if scheme.is_empty() {
            return Err(Error::InvalidUrl(format!("missing scheme: {raw}")));
        }
        let scheme = scheme.to_ascii_lowercase();

        if scheme == "unix" {
            return Ok(Url {
                scheme,
                authority: None,
                host: String::new(),
                port: None,
                path: tail.to_string(),
            });
        }

        let (authority, path) = match tail.split_once('/') {
            Some((authority, path)) => (authority, Some(path)),
            None => (tail, None),
        };

        let (host, port) = split_authority(authority, raw)?;
        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| Error::InvalidUrl(format!("invalid port {port:?}: {raw}")))?,
            None => default_port(&scheme)
                .ok_or_else(|| Error::InvalidUrl(format!("port must be specified: {raw}")))?,
        };
        if host.is_empty() {
            return Err(Error::InvalidUrl(format!("missing host: {raw}")));
        }

        Ok(Url {
            scheme,
            authority: Some(authority.to_string()),
            host: host.to_string(),
            port: Some(port),
            path: path.map(|p| format!("/{p}")).unwrap_or_default(),
        })
    }

    /// Lower-cased scheme.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Raw `host[:port]` as written, `None` for `unix`.
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Host part of the authority; empty for `unix`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit or default port; `None` only for `unix`.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Path starting with `/`, or empty when the URL had none. For `unix`
    /// this is the socket path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this is a `unix` socket URL.
    pub fn is_unix(&self) -> bool {
        self.scheme == "unix"
    }

    /// Whether the connection must be wrapped in TLS.
    pub fn is_tls(&self) -> bool {
        self.scheme == "https"
    }

    /// `host:port` for network URLs, the socket path for `unix`. This is what
    /// the client hands to [`Connect::connect`](crate::network::Connect::connect).
    pub fn remote(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.host, port),
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.authority {
            Some(authority) => write!(f, "{}://{}{}", self.scheme, authority, self.path),
            None => write!(f, "{}://{}", self.scheme, self.path),
        }
    }
}

/// Split `host[:port]`; a bracketed IPv6 literal keeps its colons.
fn split_authority<'a>(authority: &'a str, raw: &str) -> Result<(&'a str, Option<&'a str>), Error> {
    if authority.starts_with('[') {
        let end = authority
            .find(']')
            .ok_or_else(|| Error::InvalidUrl(format!("unterminated IPv6 literal: {raw}")))?;
        let (host, rest) = authority.split_at(end + 1);
        return match rest.strip_prefix(':') {
            Some(port) => Ok((host, Some(port))),
            None if rest.is_empty() => Ok((host, None)),
            None => Err(Error::InvalidUrl(format!("garbage after IPv6 literal: {raw}"))),
        };
    }
    Ok(match authority.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (authority, None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_defaults_to_port_80() {
        let url = Url::parse("http://example.com/a/b").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.authority(), Some("example.com"));
        assert_eq!(url.host(), "example.com");
        assert_eq!(url.port(), Some(80));
        assert_eq!(url.path(), "/a/b");
        assert_eq!(url.remote(), "example.com:80");
    }

    #[test]
    fn https_defaults_to_port_443() {
        let url = Url::parse("https://example.com").unwrap();
        assert_eq!(url.port(), Some(443));
        assert!(url.is_tls());
    }

    #[test]
    fn scheme_is_lowercased() {
        let url = Url::parse("HtTpS://Example.com:8443/").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host(), "Example.com");
        assert_eq!(url.port(), Some(8443));
    }

    #[test]
    fn path_is_empty_without_slash() {
        assert_eq!(Url::parse("http://example.com").unwrap().path(), "");
        assert_eq!(Url::parse("http://example.com/").unwrap().path(), "/");
    }

    #[test]
    fn explicit_port_allows_any_scheme() {
        let url = Url::parse("ws://localhost:9000/socket").unwrap();
        assert_eq!(url.port(), Some(9000));
        assert_eq!(url.authority(), Some("localhost:9000"));
    }

    #[test]
    fn unknown_scheme_without_port_is_rejected() {
        let err = Url::parse("ftp://example.com/file").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn missing_separator_is_rejected() {
        assert!(matches!(
            Url::parse("example.com/path"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn non_numeric_port_is_rejected() {
        assert!(Url::parse("http://example.com:http/").is_err());
        assert!(Url::parse("http://example.com:70000/").is_err());
    }

    #[test]
    fn unix_keeps_the_socket_path() {
        let url = Url::parse("unix:///var/run/app.sock").unwrap();
        assert!(url.is_unix());
        assert_eq!(url.authority(), None);
        assert_eq!(url.port(), None);
        assert_eq!(url.path(), "/var/run/app.sock");
        assert_eq!(url.remote(), "/var/run/app.sock");
    }

    #[test]
    fn userinfo_stays_in_the_authority() {
        let url = Url::parse("http://user@example.com/").unwrap();
        assert_eq!(url.authority(), Some("user@example.com"));
        assert_eq!(url.host(), "user@example.com");
    }

    #[test]
    fn ipv6_literal_keeps_brackets() {
        let url = Url::parse("http://[::1]:8080/x").unwrap();
        assert_eq!(url.host(), "[::1]");
        assert_eq!(url.port(), Some(8080));
        assert_eq!(url.remote(), "[::1]:8080");
    }

    #[test]
    fn display_round_trips() {
        let url = Url::parse("http://example.com:8080/a?b=c").unwrap();
        assert_eq!(url.to_string(), "http://example.com:8080/a?b=c");
    }
}
