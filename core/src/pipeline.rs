//! Encode, execute, validate, decode.
//!
//! # Design
//! `RequestPipeline` holds everything needed to describe one logical request
//! and carries no state between calls. `execute` builds a fresh `RawRequest`,
//! hands it to the client (the only place that may block), runs the
//! validation chain and decodes the body. Every step short-circuits with a
//! single terminal `Error`; nothing is retried or swallowed.

use crate::client::HttpClient;
use crate::codec::{JsonDecoder, JsonEncoder, RequestEncoder, ResponseDecoder};
use crate::error::{Error, Result};
use crate::http::{HeaderKey, Headers, Method, RawRequest, RawResponse};
use crate::structured_url::StructuredUrl;
use crate::validation::{ResponseValidator, ValidationChain};

/// A reusable description of one request and how to interpret its answer.
///
/// `B` is the body type, `E` the encoder for it and `D` the decoder used by
/// `execute`. A pipeline without a body sends no payload and no encoder
/// headers.
#[derive(Debug, Clone)]
pub struct RequestPipeline<B = (), E = JsonEncoder, D = JsonDecoder> {
    url: StructuredUrl,
    method: Method,
    headers: Headers,
    body: Option<B>,
    validators: ValidationChain,
    encoder: E,
    decoder: D,
    mode: Mode,
}

/// Which `HttpClient` entry point a pipeline executes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Data,
    Upload,
    Download,
}

impl RequestPipeline {
    /// A body-less pipeline with the JSON codecs and the 2xx-only chain.
    pub fn new(url: StructuredUrl, method: Method) -> Self {
        Self {
            url,
            method,
            headers: Headers::new(),
            body: None,
            validators: ValidationChain::success(),
            encoder: JsonEncoder,
            decoder: JsonDecoder,
            mode: Mode::Data,
        }
    }
}

impl<B, E, D> RequestPipeline<B, E, D> {
    pub fn url(&self) -> &StructuredUrl {
        &self.url
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// Set a caller header. Caller headers override encoder headers.
    pub fn header(mut self, key: impl Into<HeaderKey>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Append a validator to the chain.
    pub fn validator(mut self, validator: impl ResponseValidator + 'static) -> Self {
        self.validators = self.validators.then(validator);
        self
    }

    /// Replace the whole chain, including the default status check.
    pub fn validators(mut self, validators: ValidationChain) -> Self {
        self.validators = validators;
        self
    }

    /// Route execution through `HttpClient::upload`.
    pub fn upload(mut self) -> Self {
        self.mode = Mode::Upload;
        self
    }

    /// Route execution through `HttpClient::download`.
    pub fn download(mut self) -> Self {
        self.mode = Mode::Download;
        self
    }

    pub fn body<T>(self, body: T) -> RequestPipeline<T, E, D> {
        RequestPipeline {
            url: self.url,
            method: self.method,
            headers: self.headers,
            body: Some(body),
            validators: self.validators,
            encoder: self.encoder,
            decoder: self.decoder,
            mode: self.mode,
        }
    }

    pub fn encoder<E2>(self, encoder: E2) -> RequestPipeline<B, E2, D> {
        RequestPipeline {
            url: self.url,
            method: self.method,
            headers: self.headers,
            body: self.body,
            validators: self.validators,
            encoder,
            decoder: self.decoder,
            mode: self.mode,
        }
    }

    pub fn decoder<D2>(self, decoder: D2) -> RequestPipeline<B, E, D2> {
        RequestPipeline {
            url: self.url,
            method: self.method,
            headers: self.headers,
            body: self.body,
            validators: self.validators,
            encoder: self.encoder,
            decoder,
            mode: self.mode,
        }
    }
}

impl<B, E, D> RequestPipeline<B, E, D>
where
    E: RequestEncoder<B>,
{
    /// Encode the body and assemble the request the client will receive.
    pub fn build_request(&self) -> Result<RawRequest> {
        self.url.render()?;

        let mut headers = Headers::new();
        let body = match &self.body {
            Some(body) => {
                headers.extend(self.encoder.headers());
                Some(self.encoder.encode(body)?)
            }
            None => None,
        };
        headers.extend(self.headers.clone());

        Ok(RawRequest {
            method: self.method,
            url: self.url.clone(),
            headers,
            body,
        })
    }

    /// Run the pipeline up to validation and return the raw response.
    pub fn execute_raw<C>(&self, client: &C) -> Result<RawResponse>
    where
        C: HttpClient + ?Sized,
    {
        let request = self.build_request()?;
        tracing::debug!(method = %request.method, url = %request.url, "executing request");

        let response = match self.mode {
            Mode::Data => client.execute(&request)?,
            Mode::Upload => client.upload(&request)?,
            Mode::Download => client.download(&request)?,
        };

        if let Err(rejection) = self.validators.validate(&response) {
            tracing::warn!(
                method = %request.method,
                url = %request.url,
                status = response.status.as_u16(),
                %rejection,
                "response rejected"
            );
            return Err(Error::Validation {
                rejection,
                response: Box::new(response),
            });
        }

        tracing::debug!(status = response.status.as_u16(), "response validated");
        Ok(response)
    }

    /// Run the full pipeline and decode the body into `R`.
    pub fn execute<R, C>(&self, client: &C) -> Result<R>
    where
        D: ResponseDecoder<R>,
        C: HttpClient + ?Sized,
    {
        let response = self.execute_raw(client)?;
        self.decoder.decode(&response.body)
    }
}
