//! Request body encoders and response body decoders.
//!
//! # Design
//! Encoders and decoders are chosen when a pipeline is built, never by
//! inspecting the body at runtime. An encoder also reports the headers its
//! format implies, e.g. `content-type`. The JSON pair is the default; the
//! pipeline itself does not care about the format.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::http::{HeaderKey, Headers};

pub const APPLICATION_JSON: &str = "application/json";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Turns a typed request body into bytes.
pub trait RequestEncoder<T: ?Sized> {
    /// Headers implied by the encoding.
    fn headers(&self) -> Headers;

    fn encode(&self, value: &T) -> Result<Vec<u8>>;
}

/// Turns response bytes into a typed value.
pub trait ResponseDecoder<T> {
    fn decode(&self, body: &[u8]) -> Result<T>;
}

/// serde_json request encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl<T: Serialize + ?Sized> RequestEncoder<T> for JsonEncoder {
    fn headers(&self) -> Headers {
        Headers::from([(HeaderKey::ContentType, APPLICATION_JSON.to_string())])
    }

    fn encode(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| Error::Encoding { source: Box::new(e) })
    }
}

/// serde_json response decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl<T: DeserializeOwned> ResponseDecoder<T> for JsonDecoder {
    fn decode(&self, body: &[u8]) -> Result<T> {
        serde_json::from_slice(body).map_err(|e| Error::Decoding {
            source: Box::new(e),
            body: Some(body.to_vec()),
        })
    }
}

/// Sends bytes as-is, e.g. for uploads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesEncoder;

impl<T: AsRef<[u8]> + ?Sized> RequestEncoder<T> for BytesEncoder {
    fn headers(&self) -> Headers {
        Headers::from([(HeaderKey::ContentType, OCTET_STREAM.to_string())])
    }

    fn encode(&self, value: &T) -> Result<Vec<u8>> {
        Ok(value.as_ref().to_vec())
    }
}

/// Decodes a UTF-8 body into a `String`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDecoder;

impl ResponseDecoder<String> for TextDecoder {
    fn decode(&self, body: &[u8]) -> Result<String> {
        String::from_utf8(body.to_vec()).map_err(|e| Error::Decoding {
            source: Box::new(e),
            body: Some(body.to_vec()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Post {
        id: u32,
        title: String,
    }

    #[test]
    fn json_roundtrip() {
        let post = Post {
            id: 1,
            title: "hello".to_string(),
        };
        let bytes = JsonEncoder.encode(&post).unwrap();
        let back: Post = JsonDecoder.decode(&bytes).unwrap();
        assert_eq!(back, post);
    }

    #[test]
    fn json_encoder_sets_content_type() {
        let headers = RequestEncoder::<Post>::headers(&JsonEncoder);
        assert_eq!(headers[&HeaderKey::ContentType], APPLICATION_JSON);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn json_decode_failure_keeps_body() {
        let err = ResponseDecoder::<Post>::decode(&JsonDecoder, b"not json").unwrap_err();
        match err {
            Error::Decoding { body, .. } => assert_eq!(body.as_deref(), Some(&b"not json"[..])),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn json_encode_failure_is_encoding_error() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "tuple keys are not valid JSON object keys");
        let err = JsonEncoder.encode(&map).unwrap_err();
        assert!(matches!(err, Error::Encoding { .. }));
    }

    #[test]
    fn bytes_and_text() {
        let bytes = BytesEncoder.encode("raw body").unwrap();
        assert_eq!(bytes, b"raw body");
        assert_eq!(TextDecoder.decode(&bytes).unwrap(), "raw body");
        assert!(TextDecoder.decode(&[0xff]).is_err());
    }
}
