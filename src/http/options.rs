//! Client configuration.
//!
//! Options can be built in code or loaded from a small JSON document, which
//! is handy when the settings live in flash next to the firmware:
//!
//! ```json
//! {
//!   "proxy": "http://proxy.local:3128",
//!   "content_type": "application/json",
//!   "content_encoding": "gzip",
//!   "headers": [["X-Device", "sensor-01"]]
//! }
//! ```

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use serde::Deserialize;

use super::error::Error;
use crate::compression::Algorithm;

/// Everything that shapes how a [`Client`](super::Client) builds and sends requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Proxy URL. `http` targets use absolute-form requests through it,
    /// `https` targets a CONNECT tunnel.
    #[serde(default)]
    pub proxy: Option<String>,
    /// `Content-Type` for requests with a body.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Compress request bodies with this coding.
    #[serde(default)]
    pub content_encoding: Option<Algorithm>,
    /// `Accept-Encoding` to send.
    #[serde(default)]
    pub accept_encoding: Option<String>,
    /// Extra headers merged over the built-in ones by exact name.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Trust anchors for the TLS wrapper.
    #[serde(default)]
    pub certs: Option<String>,
    /// SNI host name for the TLS wrapper.
    #[serde(default)]
    pub sni: Option<String>,
    /// Accept certificates outside their validity period.
    #[serde(default)]
    pub ignore_certificate_validity: bool,
}

impl Options {
    /// Load options from a JSON document. String escapes are decoded.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        // An unescaped string is never longer than its escaped form.
        let mut unescape_buffer = vec![0u8; json.len()];
        let (options, _) = serde_json_core::from_str_escaped::<Options>(json, &mut unescape_buffer)
            .map_err(|e| Error::InvalidOptions(format!("{e:?}")))?;
        Ok(options)
    }

    /// Route requests through the proxy at `proxy`.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// `Content-Type` for requests with a body.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Compress request bodies with `algorithm`.
    pub fn with_content_encoding(mut self, algorithm: Algorithm) -> Self {
        self.content_encoding = Some(algorithm);
        self
    }

    /// `Accept-Encoding` to send.
    pub fn with_accept_encoding(mut self, accept_encoding: impl Into<String>) -> Self {
        self.accept_encoding = Some(accept_encoding.into());
        self
    }

    /// Append a header; a later header with the same name replaces it.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// PEM trust anchors handed to the TLS wrapper.
    pub fn with_certs(mut self, certs: impl Into<String>) -> Self {
        self.certs = Some(certs.into());
        self
    }

    /// SNI host name handed to the TLS wrapper.
    pub fn with_sni(mut self, sni: impl Into<String>) -> Self {
        self.sni = Some(sni.into());
        self
    }

    /// Accept certificates outside their validity period.
    pub fn ignore_certificate_validity(mut self, ignore: bool) -> Self {
        self.ignore_certificate_validity = ignore;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn defaults_are_unset() {
        let options = Options::default();
        assert!(options.proxy.is_none());
        assert!(options.content_encoding.is_none());
        assert!(options.headers.is_empty());
        assert!(!options.ignore_certificate_validity);
    }

    #[test]
    fn builder_sets_fields() {
        let options = Options::default()
            .with_content_type("text/plain")
            .with_content_encoding(Algorithm::Deflate)
            .with_header("X-A", "1");
        assert_eq!(options.content_type.as_deref(), Some("text/plain"));
        assert_eq!(options.content_encoding, Some(Algorithm::Deflate));
        assert_eq!(options.headers, vec![("X-A".to_string(), "1".to_string())]);
    }

    #[test]
    fn from_json_reads_every_field() {
        let options = Options::from_json(
            r#"{"proxy":"http://proxy:3128","content_type":"application/json",
                "content_encoding":"gzip","accept_encoding":"gzip",
                "headers":[["X-Device","sensor-01"]],"sni":"api.example.com",
                "ignore_certificate_validity":true}"#,
        )
        .unwrap();
        assert_eq!(options.proxy.as_deref(), Some("http://proxy:3128"));
        assert_eq!(options.content_encoding, Some(Algorithm::Gzip));
        assert_eq!(options.accept_encoding.as_deref(), Some("gzip"));
        assert_eq!(
            options.headers,
            vec![("X-Device".to_string(), "sensor-01".to_string())]
        );
        assert_eq!(options.sni.as_deref(), Some("api.example.com"));
        assert!(options.ignore_certificate_validity);
        assert!(options.certs.is_none());
    }

    #[test]
    fn from_json_decodes_string_escapes() {
        let options = Options::from_json(
            r#"{"certs":"-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n",
                "headers":[["X-Q","a \"quoted\" v\u00e9"]]}"#,
        )
        .unwrap();
        assert_eq!(
            options.certs.as_deref(),
            Some("-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n")
        );
        assert_eq!(
            options.headers,
            vec![("X-Q".to_string(), "a \"quoted\" v\u{e9}".to_string())]
        );
    }

    #[test]
    fn from_json_accepts_empty_object() {
        assert_eq!(Options::from_json("{}").unwrap(), Options::default());
    }

    #[test]
    fn from_json_rejects_unknown_encoding() {
        let err = Options::from_json(r#"{"content_encoding":"br"}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
    }

    #[test]
    fn from_json_rejects_unknown_fields() {
        assert!(Options::from_json(r#"{"timeout":5}"#).is_err());
    }
}
