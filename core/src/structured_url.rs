//! Immutable structured URL value.
//!
//! # Design
//! `StructuredUrl` keeps a URL as its parts instead of a string. Every
//! `with_*` method returns a new value and leaves the receiver untouched, so a
//! shared base URL can be derived from concurrently without coordination.
//!
//! Path segments are emitted as given. Only `resource` is percent-encoded, with
//! a host-safe set that also encodes `/`: a resource such as
//! `some/file/path.xml` stays a single opaque segment. `suffix` is appended
//! verbatim after the resource.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

pub const DEFAULT_SCHEME: &str = "https";

/// Port treated as "default" and omitted from rendered URLs.
pub const DEFAULT_PORT: u16 = 80;

/// Characters outside the URL host-allowed set. Includes `/`.
const RESOURCE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const QUERY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'`');

/// A URL held as scheme, host, port, path, resource, suffix, query and
/// fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructuredUrl {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Path segments in order, e.g. `/api/list` is `["api", "list"]`.
    pub path: Vec<String>,
    /// Trailing path component, percent-encoded on render.
    pub resource: Option<String>,
    /// Literal text appended after the resource.
    pub suffix: Option<String>,
    pub query: BTreeMap<String, String>,
    pub fragment: Option<String>,
}

impl StructuredUrl {
    /// A URL for `host` with the default scheme and port and nothing else.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            host: host.into(),
            port: DEFAULT_PORT,
            path: Vec::new(),
            resource: None,
            suffix: None,
            query: BTreeMap::new(),
            fragment: None,
        }
    }

    /// Decompose a URL string. Returns `None` when the input is not a URL.
    pub fn parse(input: &str) -> Option<Self> {
        Url::parse(input).ok().map(|url| Self::from(&url))
    }

    pub fn with_scheme(&self, scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            ..self.clone()
        }
    }

    pub fn with_host(&self, host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..self.clone()
        }
    }

    pub fn with_port(&self, port: u16) -> Self {
        Self {
            port,
            ..self.clone()
        }
    }

    /// Append path segments after the existing ones.
    pub fn with_path<I, S>(&self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut url = self.clone();
        url.path.extend(segments.into_iter().map(Into::<String>::into));
        url
    }

    /// Merge query parameters into the existing ones; new values win.
    pub fn with_query<I, K, V>(&self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut url = self.clone();
        url.query
            .extend(params.into_iter().map(|(k, v)| -> (String, String) { (k.into(), v.into()) }));
        url
    }

    /// Set a single query parameter. A `None` value leaves the query as is.
    pub fn with_query_param(&self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => {
                let pair: (String, String) = (key.into(), value.into());
                self.with_query([pair])
            }
            None => self.clone(),
        }
    }

    pub fn with_resource(&self, resource: impl Into<String>) -> Self {
        Self {
            resource: Some(resource.into()),
            ..self.clone()
        }
    }

    pub fn with_suffix(&self, suffix: impl Into<String>) -> Self {
        Self {
            suffix: Some(suffix.into()),
            ..self.clone()
        }
    }

    pub fn with_fragment(&self, fragment: impl Into<String>) -> Self {
        Self {
            fragment: Some(fragment.into()),
            ..self.clone()
        }
    }

    /// Render the canonical URL string.
    ///
    /// Fails with `InvalidUrl` when the parts do not form a valid URL, e.g.
    /// an empty host.
    pub fn render(&self) -> Result<String> {
        if self.scheme.is_empty() {
            return Err(Error::invalid_url("empty scheme"));
        }
        if self.host.is_empty() {
            return Err(Error::invalid_url("empty host"));
        }
        let rendered = self.assemble();
        Url::parse(&rendered).map_err(|e| Error::invalid_url(format!("{rendered}: {e}")))?;
        Ok(rendered)
    }

    /// Render and parse into a `url::Url`.
    pub fn to_url(&self) -> Result<Url> {
        let rendered = self.render()?;
        Url::parse(&rendered).map_err(|e| Error::invalid_url(e.to_string()))
    }

    fn assemble(&self) -> String {
        let mut out = format!("{}://{}", self.scheme, self.host);
        if self.port != DEFAULT_PORT {
            out.push_str(&format!(":{}", self.port));
        }

        out.push('/');
        out.push_str(&self.path.join("/"));

        if let Some(resource) = &self.resource {
            let encoded = utf8_percent_encode(resource, RESOURCE).to_string();
            if !encoded.starts_with('/') && !self.path.is_empty() {
                out.push('/');
            }
            out.push_str(&encoded);
        }

        if let Some(suffix) = &self.suffix {
            out.push_str(suffix);
        }

        if !self.query.is_empty() {
            let pairs: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(k, QUERY),
                        utf8_percent_encode(v, QUERY)
                    )
                })
                .collect();
            out.push('?');
            out.push_str(&pairs.join("&"));
        }

        if let Some(fragment) = &self.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }
}

impl fmt::Display for StructuredUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.assemble())
    }
}

impl From<&Url> for StructuredUrl {
    fn from(url: &Url) -> Self {
        let mut path: Vec<String> = url
            .path()
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        // A dotted last segment is the resource; decode it so rendering
        // re-encodes to the same text.
        let resource = match path.last() {
            Some(last) if last.contains('.') => path
                .pop()
                .map(|last| percent_decode_str(&last).decode_utf8_lossy().into_owned()),
            _ => None,
        };

        Self {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port().unwrap_or(DEFAULT_PORT),
            path,
            resource,
            suffix: None,
            query: url.query_pairs().into_owned().collect(),
            fragment: url.fragment().map(String::from),
        }
    }
}

impl FromStr for StructuredUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::invalid_url(format!("cannot parse {s:?}")))
    }
}
