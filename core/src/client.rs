//! The executor capability the pipeline delegates I/O to.
//!
//! # Design
//! `HttpClient` is the single seam between the pipeline and the network. It
//! takes a fully built `RawRequest` and returns whatever the server answered;
//! status interpretation is left to the validators. Any closure with the
//! right signature is a client, which keeps fake executors in tests trivial.

use crate::error::{Error, Result};
use crate::http::{RawRequest, RawResponse};

/// Performs the actual HTTP round-trip.
///
/// Implementations may block. Cancellation and retries are theirs to handle;
/// a cancelled call should surface as `Error::Transport`.
pub trait HttpClient: Send + Sync {
    fn execute(&self, request: &RawRequest) -> Result<RawResponse>;

    /// Send a request whose body must be present.
    fn upload(&self, request: &RawRequest) -> Result<RawResponse> {
        if request.body.is_none() {
            return Err(Error::MissingRequiredData);
        }
        self.execute(request)
    }

    /// Fetch a response body into local storage.
    ///
    /// Clients that persist the body return its location as the response
    /// body. The default keeps the body in memory like `execute`.
    fn download(&self, request: &RawRequest) -> Result<RawResponse> {
        self.execute(request)
    }
}

impl<F> HttpClient for F
where
    F: Fn(&RawRequest) -> Result<RawResponse> + Send + Sync,
{
    fn execute(&self, request: &RawRequest) -> Result<RawResponse> {
        self(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::structured_url::StructuredUrl;

    fn echo(request: &RawRequest) -> Result<RawResponse> {
        Ok(RawResponse::new(200, request.body.clone().unwrap_or_default()))
    }

    #[test]
    fn closures_are_clients() {
        let req = RawRequest::new(Method::Post, StructuredUrl::new("h")).body(b"hi".to_vec());
        let response = echo.execute(&req).unwrap();
        assert_eq!(response.body, b"hi");
    }

    #[test]
    fn upload_requires_body() {
        let req = RawRequest::new(Method::Put, StructuredUrl::new("h"));
        assert!(matches!(echo.upload(&req), Err(Error::MissingRequiredData)));
        let req = req.body(vec![1, 2, 3]);
        assert_eq!(echo.upload(&req).unwrap().body, vec![1, 2, 3]);
    }

    #[test]
    fn download_defaults_to_execute() {
        let req = RawRequest::new(Method::Get, StructuredUrl::new("h")).body(b"file".to_vec());
        assert_eq!(echo.download(&req).unwrap(), echo.execute(&req).unwrap());
    }
}
