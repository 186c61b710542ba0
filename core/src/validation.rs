//! Response validators and the ordered validation chain.
//!
//! # Design
//! A validator is a pure predicate over a `RawResponse`. A chain runs its
//! validators left to right and stops at the first rejection. Chains are
//! validators themselves, so nesting them keeps the flat order and gives the
//! same result.

use std::fmt;
use std::sync::Arc;

use crate::http::{HeaderKey, RawResponse, StatusClass, StatusCode};

/// Why a validator rejected a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Status {
        expected: String,
        actual: StatusCode,
    },
    Header {
        key: HeaderKey,
        expected: String,
        actual: Option<String>,
    },
}

impl Rejection {
    /// Name of the validator kind that produced the rejection.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::Status { .. } => "status code",
            Rejection::Header { .. } => "header",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Status { expected, actual } => {
                write!(f, "expected status {expected}, got {actual}")
            }
            Rejection::Header {
                key,
                expected,
                actual: Some(actual),
            } => write!(f, "expected {key} {expected}, got {actual:?}"),
            Rejection::Header {
                key,
                expected,
                actual: None,
            } => write!(f, "expected {key} {expected}, header missing"),
        }
    }
}

/// A check run against every response before it is decoded.
///
/// A validator only reports why it rejected. The response itself is attached
/// by `RequestPipeline`, which wraps both in `Error::Validation`; callers
/// running a chain directly still hold the response they passed in.
pub trait ResponseValidator: Send + Sync {
    fn validate(&self, response: &RawResponse) -> Result<(), Rejection>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Accepted {
    Classes(Vec<StatusClass>),
    Codes(Vec<StatusCode>),
}

/// Accepts a set of status codes or status classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCodeValidator {
    accepted: Accepted,
}

impl StatusCodeValidator {
    /// Accept any 2xx status.
    pub fn success() -> Self {
        Self::classes([StatusClass::Success])
    }

    pub fn classes(classes: impl IntoIterator<Item = StatusClass>) -> Self {
        Self {
            accepted: Accepted::Classes(classes.into_iter().collect()),
        }
    }

    pub fn codes(codes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            accepted: Accepted::Codes(codes.into_iter().map(StatusCode).collect()),
        }
    }

    fn expected(&self) -> String {
        match &self.accepted {
            Accepted::Classes(classes) => classes
                .iter()
                .map(|c| format!("{c:?}"))
                .collect::<Vec<_>>()
                .join(" | "),
            Accepted::Codes(codes) => codes
                .iter()
                .map(StatusCode::to_string)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

impl Default for StatusCodeValidator {
    fn default() -> Self {
        Self::success()
    }
}

impl ResponseValidator for StatusCodeValidator {
    fn validate(&self, response: &RawResponse) -> Result<(), Rejection> {
        let ok = match &self.accepted {
            Accepted::Classes(classes) => classes.contains(&response.status.class()),
            Accepted::Codes(codes) => codes.contains(&response.status),
        };
        if ok {
            return Ok(());
        }
        Err(Rejection::Status {
            expected: self.expected(),
            actual: response.status,
        })
    }
}

type HeaderPredicate = dyn Fn(&str) -> bool + Send + Sync;

/// Checks a header value with a predicate. A missing header fails.
#[derive(Clone)]
pub struct HeaderValidator {
    key: HeaderKey,
    description: String,
    predicate: Arc<HeaderPredicate>,
}

impl HeaderValidator {
    pub fn new<F>(key: impl Into<HeaderKey>, description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Header value must contain `needle`.
    pub fn contains(key: impl Into<HeaderKey>, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        let description = format!("to contain {needle:?}");
        Self::new(key, description, move |value| value.contains(needle.as_str()))
    }
}

impl fmt::Debug for HeaderValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderValidator")
            .field("key", &self.key)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl ResponseValidator for HeaderValidator {
    fn validate(&self, response: &RawResponse) -> Result<(), Rejection> {
        let actual = response.header_value(&self.key);
        if actual.is_some_and(|value| (self.predicate)(value)) {
            return Ok(());
        }
        Err(Rejection::Header {
            key: self.key.clone(),
            expected: self.description.clone(),
            actual: actual.map(String::from),
        })
    }
}

/// Ordered list of validators; the first rejection wins.
#[derive(Clone, Default)]
pub struct ValidationChain {
    validators: Vec<Arc<dyn ResponseValidator>>,
}

impl ValidationChain {
    /// An empty chain accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// The chain used when the caller configures none: 2xx only.
    pub fn success() -> Self {
        Self::new().then(StatusCodeValidator::success())
    }

    pub fn then(mut self, validator: impl ResponseValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Append every validator of `other`, keeping its order.
    pub fn extend(mut self, other: ValidationChain) -> Self {
        self.validators.extend(other.validators);
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for ValidationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationChain")
            .field("len", &self.validators.len())
            .finish()
    }
}

impl ResponseValidator for ValidationChain {
    fn validate(&self, response: &RawResponse) -> Result<(), Rejection> {
        self.validators.iter().try_for_each(|v| v.validate(response))
    }
}
