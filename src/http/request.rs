//! HTTP/1.1 request construction.

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use super::options::Options;
use super::url::Url;
use super::{CRLF, USER_AGENT};
use crate::compression::Compression;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
}

impl Method {
    /// Method token as sent on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request target for `resource` under `url`.
///
/// A `/` shared between the end of the URL path and the start of `resource`
/// is written once. Through a proxy, plain `http` requests use the absolute
/// form.
pub fn target(url: &Url, resource: &str, via_proxy: bool) -> String {
    if url.is_unix() {
        return origin_form(resource.to_string());
    }

    let path = match (url.path().ends_with('/'), resource.strip_prefix('/')) {
        (true, Some(rest)) => format!("{}{}", url.path(), rest),
        _ => format!("{}{}", url.path(), resource),
    };

    match url.authority() {
        Some(authority) if via_proxy && url.scheme() == "http" => {
            format!("{}://{}{}", url.scheme(), authority, origin_form(path))
        }
        _ => origin_form(path),
    }
}

fn origin_form(path: String) -> String {
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

/// Header fields in insertion order.
#[derive(Debug, Default)]
struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    /// Replace the value of an existing `name` in place, or append.
    fn set(&mut self, name: &str, value: &str) {
        match self.0.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.0.push((name.to_string(), value.to_string())),
        }
    }
}

/// Serialize one request.
///
/// `compression` is the client's capability; without one, `content_encoding`
/// and `accept_encoding` are not applied. Caller headers from `options` are
/// merged last by exact name, so `Host` can be overridden but `host` is sent
/// alongside it.
pub fn build(
    method: Method,
    url: &Url,
    resource: &str,
    body: &[u8],
    options: &Options,
    compression: Option<&dyn Compression>,
) -> Vec<u8> {
    let via_proxy = options.proxy.is_some();
    let target = target(url, resource, via_proxy);

    let mut headers = HeaderList::default();
    headers.set("Host", &host_header(url));
    headers.set("Connection", "close");
    headers.set("User-Agent", USER_AGENT);

    let mut body = Cow::Borrowed(body);
    if !body.is_empty() {
        if let Some(content_type) = &options.content_type {
            headers.set("Content-Type", content_type);
        }
        if let (Some(compression), Some(algorithm)) = (compression, options.content_encoding) {
            headers.set("Content-Encoding", algorithm.as_str());
            body = Cow::Owned(compression.compress(&body, algorithm));
        }
        headers.set("Content-Length", &body.len().to_string());
    }

    if compression.is_some() {
        if let Some(accept_encoding) = &options.accept_encoding {
            headers.set("Accept-Encoding", accept_encoding);
        }
    }

    for (name, value) in &options.headers {
        headers.set(name, value);
    }

    let mut out = Vec::with_capacity(target.len() + 128 + body.len());
    out.extend_from_slice(method.as_str().as_bytes());
    out.push(b' ');
    out.extend_from_slice(target.as_bytes());
    out.extend_from_slice(b" HTTP/1.1");
    out.extend_from_slice(CRLF);
    for (name, value) in &headers.0 {
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(CRLF);
    }
    out.extend_from_slice(CRLF);
    out.extend_from_slice(&body);

    trace!(
        "built {=str} request, {=usize} header(s), {=usize} body byte(s)",
        method.as_str(),
        headers.0.len(),
        body.len()
    );
    out
}

fn host_header(url: &Url) -> String {
    match url.port() {
        Some(port) => format!("{}:{}", url.host(), port),
        None => "localhost".to_string(),
    }
}
