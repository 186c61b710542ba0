//! Building blocks for REST API clients.
//!
//! # Design
//! An API type implements `PipelineCollection` by handing out its client and,
//! optionally, shared headers and validators. The default methods cover the
//! four request shapes a JSON API needs: raw, body-only, result-only and
//! body-and-result. JSON results also require a JSON `content-type`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::HttpClient;
use crate::codec::APPLICATION_JSON;
use crate::error::Result;
use crate::http::{HeaderKey, Headers, Method, RawResponse};
use crate::pipeline::RequestPipeline;
use crate::structured_url::StructuredUrl;
use crate::validation::{HeaderValidator, ValidationChain};

pub trait PipelineCollection {
    type Client: HttpClient + ?Sized;

    fn client(&self) -> &Self::Client;

    /// Headers sent with every request.
    fn headers(&self) -> Headers {
        Headers::new()
    }

    /// Chain applied to every response.
    fn validators(&self) -> ValidationChain {
        ValidationChain::success()
    }

    fn pipeline(&self, url: StructuredUrl, method: Method) -> RequestPipeline {
        RequestPipeline::new(url, method)
            .headers(self.headers())
            .validators(self.validators())
    }

    /// No body, raw response.
    fn raw(&self, url: StructuredUrl, method: Method) -> Result<RawResponse> {
        self.pipeline(url, method).execute_raw(self.client())
    }

    /// JSON body, raw response.
    fn encodable<B: Serialize>(&self, url: StructuredUrl, method: Method, body: &B) -> Result<RawResponse> {
        self.pipeline(url, method).body(body).execute_raw(self.client())
    }

    /// No body, JSON result.
    fn decodable<R: DeserializeOwned>(&self, url: StructuredUrl, method: Method) -> Result<R> {
        expect_json(self.pipeline(url, method)).execute(self.client())
    }

    /// JSON body, JSON result.
    fn codable<B: Serialize, R: DeserializeOwned>(
        &self,
        url: StructuredUrl,
        method: Method,
        body: &B,
    ) -> Result<R> {
        expect_json(self.pipeline(url, method)).body(body).execute(self.client())
    }
}

fn expect_json(pipeline: RequestPipeline) -> RequestPipeline {
    pipeline
        .header(HeaderKey::Accept, APPLICATION_JSON)
        .validator(HeaderValidator::contains(HeaderKey::ContentType, APPLICATION_JSON))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::error::Error;
    use crate::http::RawRequest;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Todo {
        id: u32,
        title: String,
    }

    type Handler = fn(&RawRequest) -> Result<RawResponse>;

    struct TodoApi {
        base: StructuredUrl,
        client: Handler,
    }

    impl PipelineCollection for TodoApi {
        type Client = Handler;

        fn client(&self) -> &Handler {
            &self.client
        }

        fn headers(&self) -> Headers {
            Headers::from([(HeaderKey::Authorization, "Bearer secret".to_string())])
        }
    }

    impl TodoApi {
        fn new(client: Handler) -> Self {
            Self {
                base: StructuredUrl::new("api.example.com"),
                client,
            }
        }

        fn get(&self, id: u32) -> Result<Todo> {
            self.decodable(self.base.with_path(["todos".to_string(), id.to_string()]), Method::Get)
        }

        fn create(&self, todo: &Todo) -> Result<Todo> {
            self.codable(self.base.with_path(["todos"]), Method::Post, todo)
        }
    }

    fn json_echo(request: &RawRequest) -> Result<RawResponse> {
        assert_eq!(request.headers[&HeaderKey::Authorization], "Bearer secret");
        assert_eq!(request.headers[&HeaderKey::Accept], APPLICATION_JSON);
        let body = request
            .body
            .clone()
            .unwrap_or_else(|| br#"{"id":7,"title":"stored"}"#.to_vec());
        Ok(RawResponse::new(200, body).header(HeaderKey::ContentType, "application/json; charset=utf-8"))
    }

    fn html(_: &RawRequest) -> Result<RawResponse> {
        Ok(RawResponse::new(200, "<html></html>").header(HeaderKey::ContentType, "text/html"))
    }

    #[test]
    fn decodable_and_codable() {
        let api = TodoApi::new(json_echo);
        assert_eq!(
            api.get(7).unwrap(),
            Todo {
                id: 7,
                title: "stored".to_string()
            }
        );
        let todo = Todo {
            id: 1,
            title: "new".to_string(),
        };
        assert_eq!(api.create(&todo).unwrap(), todo);
    }

    #[test]
    fn json_results_require_json_content_type() {
        let api = TodoApi::new(html);
        let err = api.get(1).unwrap_err();
        match err {
            Error::Validation { rejection, response } => {
                assert_eq!(rejection.kind(), "header");
                assert_eq!(response.body, b"<html></html>");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn raw_skips_content_type_check() {
        let api = TodoApi::new(html);
        let response = api.raw(api.base.with_path(["index.html"]), Method::Get).unwrap();
        assert_eq!(response.body, b"<html></html>");
    }
}
