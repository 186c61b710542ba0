//! Typed HTTP client toolkit.
//!
//! # Overview
//! Two pieces: `StructuredUrl`, an immutable URL value that renders itself
//! with a fixed percent-encoding policy, and `RequestPipeline`, which
//! encodes a body, hands the request to an injected `HttpClient`, validates
//! the response and decodes the result.
//!
//! # Design
//! - The core never does I/O itself. `HttpClient` is the only seam, so tests
//!   swap in a closure that returns canned responses.
//! - URL mutators return new values; a base URL can be shared freely.
//! - Encoders, decoders and validators are traits picked at build time.
//! - `CachingClient` and the ureq-backed `UreqClient` are optional transport
//!   layers outside the pipeline.

pub mod cache;
pub mod client;
pub mod codec;
pub mod collection;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod structured_url;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod validation;

pub use cache::{CacheConfig, CacheStats, CachingClient};
pub use client::HttpClient;
pub use codec::{BytesEncoder, JsonDecoder, JsonEncoder, RequestEncoder, ResponseDecoder, TextDecoder};
pub use collection::PipelineCollection;
pub use error::{BoxError, Error, Result};
pub use http::{HeaderKey, Headers, Method, RawRequest, RawResponse, StatusClass, StatusCode};
pub use pipeline::RequestPipeline;
pub use structured_url::StructuredUrl;
#[cfg(feature = "ureq")]
pub use transport::{ClientConfig, UreqClient};
pub use validation::{HeaderValidator, Rejection, ResponseValidator, StatusCodeValidator, ValidationChain};
