//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! pipeline builds `RawRequest` values and reads `RawResponse` values without
//! ever touching the network; an injected `HttpClient` performs the actual
//! round-trip.
//!
//! Header names are a closed set of well-known keys plus a lowercase
//! `Custom` escape hatch, so `Headers` behaves as a case-insensitive map with
//! a deterministic iteration order.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::structured_url::StructuredUrl;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
    Connect,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Connect => "CONNECT",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            "TRACE" => Ok(Method::Trace),
            "CONNECT" => Ok(Method::Connect),
            other => Err(format!("unknown HTTP method: {other}")),
        }
    }
}

/// Header names used as typed map keys.
///
/// Equality, ordering and hashing compare the lowercase wire name, so
/// `Custom("X-Api-Version")` and `Custom("x-api-version")` are the same key,
/// and `Custom("Accept")` is the same key as `Accept`.
#[derive(Debug, Clone)]
pub enum HeaderKey {
    Accept,
    AcceptEncoding,
    AcceptLanguage,
    Authorization,
    CacheControl,
    ContentDisposition,
    ContentEncoding,
    ContentLength,
    ContentType,
    Cookie,
    Etag,
    IfNoneMatch,
    Location,
    SetCookie,
    UserAgent,
    /// Any other header. `From<&str>` stores it lowercase.
    Custom(String),
}

impl HeaderKey {
    pub fn as_str(&self) -> &str {
        match self {
            HeaderKey::Accept => "accept",
            HeaderKey::AcceptEncoding => "accept-encoding",
            HeaderKey::AcceptLanguage => "accept-language",
            HeaderKey::Authorization => "authorization",
            HeaderKey::CacheControl => "cache-control",
            HeaderKey::ContentDisposition => "content-disposition",
            HeaderKey::ContentEncoding => "content-encoding",
            HeaderKey::ContentLength => "content-length",
            HeaderKey::ContentType => "content-type",
            HeaderKey::Cookie => "cookie",
            HeaderKey::Etag => "etag",
            HeaderKey::IfNoneMatch => "if-none-match",
            HeaderKey::Location => "location",
            HeaderKey::SetCookie => "set-cookie",
            HeaderKey::UserAgent => "user-agent",
            HeaderKey::Custom(name) => name,
        }
    }

    fn folded(&self) -> impl Iterator<Item = u8> + '_ {
        self.as_str().bytes().map(|b| b.to_ascii_lowercase())
    }
}

impl PartialEq for HeaderKey {
    fn eq(&self, other: &Self) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}

impl Eq for HeaderKey {}

impl PartialOrd for HeaderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeaderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl Hash for HeaderKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.folded() {
            state.write_u8(b);
        }
        state.write_u8(0xff);
    }
}

impl From<&str> for HeaderKey {
    fn from(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "accept" => HeaderKey::Accept,
            "accept-encoding" => HeaderKey::AcceptEncoding,
            "accept-language" => HeaderKey::AcceptLanguage,
            "authorization" => HeaderKey::Authorization,
            "cache-control" => HeaderKey::CacheControl,
            "content-disposition" => HeaderKey::ContentDisposition,
            "content-encoding" => HeaderKey::ContentEncoding,
            "content-length" => HeaderKey::ContentLength,
            "content-type" => HeaderKey::ContentType,
            "cookie" => HeaderKey::Cookie,
            "etag" => HeaderKey::Etag,
            "if-none-match" => HeaderKey::IfNoneMatch,
            "location" => HeaderKey::Location,
            "set-cookie" => HeaderKey::SetCookie,
            "user-agent" => HeaderKey::UserAgent,
            _ => HeaderKey::Custom(lower),
        }
    }
}

impl From<String> for HeaderKey {
    fn from(name: String) -> Self {
        HeaderKey::from(name.as_str())
    }
}

impl fmt::Display for HeaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header map keyed by `HeaderKey`. Iteration order is deterministic.
pub type Headers = BTreeMap<HeaderKey, String>;

/// Classification of a status code by its hundreds digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
    Unknown,
}

/// An HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const ACCEPTED: StatusCode = StatusCode(202);
    pub const NO_CONTENT: StatusCode = StatusCode(204);
    pub const MOVED_PERMANENTLY: StatusCode = StatusCode(301);
    pub const FOUND: StatusCode = StatusCode(302);
    pub const NOT_MODIFIED: StatusCode = StatusCode(304);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const CONFLICT: StatusCode = StatusCode(409);
    pub const UNPROCESSABLE_ENTITY: StatusCode = StatusCode(422);
    pub const TOO_MANY_REQUESTS: StatusCode = StatusCode(429);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    pub fn class(&self) -> StatusClass {
        match self.0 {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirection,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Unknown,
        }
    }

    pub fn is_success(&self) -> bool {
        self.class() == StatusClass::Success
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An HTTP request described as plain data.
///
/// Built fresh by `RequestPipeline` for every execution and handed to the
/// client, which owns the I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequest {
    pub method: Method,
    pub url: StructuredUrl,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

impl RawRequest {
    pub fn new(method: Method, url: StructuredUrl) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn header(mut self, key: impl Into<HeaderKey>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Render the request as an equivalent curl command line, for logging.
    pub fn curl(&self) -> String {
        let mut parts = vec![
            "curl".to_string(),
            format!("-X {}", self.method),
            format!("'{}'", self.url),
        ];
        for (key, value) in &self.headers {
            parts.push(format!("-H '{key}: {value}'"));
        }
        if let Some(body) = &self.body {
            let text = String::from_utf8_lossy(body).replace('\'', "'\\''");
            parts.push(format!("-d '{text}'"));
        }
        parts.join(" ")
    }
}

/// An HTTP response described as plain data.
///
/// Produced by the client after executing a `RawRequest`; the pipeline only
/// reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode(status),
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn header(mut self, key: impl Into<HeaderKey>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn header_value(&self, key: &HeaderKey) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    pub fn status_class(&self) -> StatusClass {
        self.status.class()
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<&str, Error> {
        std::str::from_utf8(&self.body).map_err(|e| Error::Decoding {
            source: Box::new(e),
            body: Some(self.body.clone()),
        })
    }
}
