//! Blocking `HttpClient` backed by ureq.
//!
//! Status codes are never turned into errors here: 4xx/5xx responses come
//! back as data so the pipeline's validators can judge them.

use std::io;
use std::time::Duration;

use crate::client::HttpClient;
use crate::error::{Error, Result};
use crate::http::{HeaderKey, Headers, RawRequest, RawResponse, StatusCode};

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for the whole call, connect to last body byte.
    pub timeout: Duration,
    /// Sent unless the request carries its own `user-agent`.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("httpkit/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
    config: ClientConfig,
}

impl UreqClient {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .new_agent();
        Self { agent, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

fn transport<E>(e: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::Transport(Box::new(e))
}

impl UreqClient {
    fn send(&self, request: &RawRequest) -> Result<(String, ureq::http::Response<ureq::Body>)> {
        let url = request.url.render()?;
        tracing::info!(curl = %request.curl(), "sending request");

        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(url.as_str());
        if !request.headers.contains_key(&HeaderKey::UserAgent) {
            builder = builder.header("user-agent", self.config.user_agent.as_str());
        }
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = match &request.body {
            Some(body) => {
                let req = builder.body(body.as_slice()).map_err(transport)?;
                self.agent.run(req).map_err(transport)?
            }
            None => {
                let req = builder.body(()).map_err(transport)?;
                self.agent.run(req).map_err(transport)?
            }
        };
        tracing::debug!(status = response.status().as_u16(), url = %url, "received response");
        Ok((url, response))
    }
}

/// Collect response headers. Repeated names are joined with `", "` in the
/// order received; values that are not visible ASCII are skipped.
fn collect_headers(map: &ureq::http::HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let Ok(value) = value.to_str() else {
            continue;
        };
        headers
            .entry(HeaderKey::from(name.as_str()))
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    headers
}

impl HttpClient for UreqClient {
    fn execute(&self, request: &RawRequest) -> Result<RawResponse> {
        let (_, mut response) = self.send(request)?;
        let status = StatusCode(response.status().as_u16());
        let headers = collect_headers(response.headers());
        let body = response.body_mut().read_to_vec().map_err(transport)?;
        tracing::trace!(body = %String::from_utf8_lossy(&body), "response body");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Stream the body into a temporary file that outlives the call. The
    /// returned body is the file's path; removing the file is up to the
    /// caller.
    fn download(&self, request: &RawRequest) -> Result<RawResponse> {
        let (url, mut response) = self.send(request)?;
        let status = StatusCode(response.status().as_u16());
        let headers = collect_headers(response.headers());

        let mut file = tempfile::Builder::new()
            .prefix("httpkit-")
            .tempfile()
            .map_err(transport)?;
        let written = io::copy(&mut response.body_mut().as_reader(), &mut file).map_err(transport)?;
        let (_, path) = file.keep().map_err(transport)?;
        let Some(location) = path.to_str() else {
            return Err(Error::Transport(
                format!("download path is not UTF-8: {}", path.display()).into(),
            ));
        };
        tracing::debug!(url = %url, path = location, bytes = written, "downloaded response body");

        Ok(RawResponse {
            status,
            headers,
            body: location.as_bytes().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use ureq::http::header::{HeaderValue, CONTENT_TYPE, SET_COOKIE};
    use ureq::http::HeaderMap;

    use super::*;

    #[test]
    fn repeated_headers_are_joined_in_order() {
        let mut map = HeaderMap::new();
        map.append(SET_COOKIE, HeaderValue::from_static("a=1"));
        map.append(SET_COOKIE, HeaderValue::from_static("b=2"));
        map.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let headers = collect_headers(&map);
        assert_eq!(headers[&HeaderKey::SetCookie], "a=1, b=2");
        assert_eq!(headers[&HeaderKey::ContentType], "text/plain");
    }

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("httpkit/"));
    }
}
