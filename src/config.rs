//! Endpoint configuration types and registration-time validation.
//!
//! An [`EndpointConfig`] is an immutable-after-registration description of
//! one fake route: method, path, latency window, response format, optional
//! list expansion and optional error injection. Every config must pass
//! [`EndpointConfig::validate`] before it reaches the route table; an
//! invalid config is rejected synchronously and never serves traffic.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::FakeDataProvider;

/// Wire format of a response body.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// JSON-encoded body with `Content-Type: application/json`.
    #[default]
    Json,
    /// Raw bytes written verbatim; only valid for error payloads.
    Bytes,
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Bytes => f.write_str("bytes"),
        }
    }
}

/// Body of an injected error response.
///
/// The format tag of the original design is intrinsic to the variant here:
/// a payload is either a JSON value or raw bytes, nothing else.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON value, encoded with `serde_json` when the response is written.
    Json(serde_json::Value),
    /// Raw bytes written to the wire verbatim.
    Bytes(Bytes),
}

/// One candidate outcome of error injection.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponse {
    /// HTTP status code in `[100, 599]`.
    pub status_code: u16,
    /// Response body; `Payload::Json(Value::Null)` is rejected by validation.
    pub payload: Payload,
}

/// Probabilistic error injection policy for an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorResponseConfig {
    /// Probability in `[0.0, 1.0]` that a request is answered with one of
    /// `responses` instead of fake data.
    pub frequency: f64,
    /// Candidate error outcomes, one chosen uniformly per injection.
    pub responses: Vec<ErrorResponse>,
}

/// List expansion settings for an endpoint.
///
/// When present, the endpoint returns a JSON array whose length is drawn
/// uniformly from `[min_items, max_items]`, inclusive at both ends. Equal
/// bounds give a fixed length; `0..=0` always produces an empty array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListResponseConfig {
    pub min_items: usize,
    pub max_items: usize,
}

/// Declarative description of one fake endpoint.
///
/// Built as a struct literal, usually over [`Default`]:
///
/// ```
/// use std::time::Duration;
/// use faux_mock_rs::EndpointConfig;
///
/// let config = EndpointConfig {
///     method: "GET".to_string(),
///     path: "/users".to_string(),
///     min_latency: Duration::from_millis(100),
///     max_latency: Duration::from_millis(500),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Default, Clone)]
pub struct EndpointConfig {
    /// HTTP method, matched verbatim against incoming requests.
    pub method: String,
    /// Request path, used verbatim as the routing key.
    pub path: String,
    /// Lower bound of the simulated latency window.
    pub min_latency: Duration,
    /// Upper bound of the simulated latency window, inclusive.
    pub max_latency: Duration,
    /// Format of the normal (non-error) response; only `Json` is supported.
    pub response_format: ResponseFormat,
    /// When set, respond with a randomly sized list instead of one item.
    pub list_response: Option<ListResponseConfig>,
    /// When set, answer a fraction of requests with a configured error.
    pub error_response: Option<ErrorResponseConfig>,
    /// Per-endpoint provider, overriding the mux-wide default.
    pub provider: Option<Arc<dyn FakeDataProvider>>,
}

impl fmt::Debug for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointConfig")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("min_latency", &self.min_latency)
            .field("max_latency", &self.max_latency)
            .field("response_format", &self.response_format)
            .field("list_response", &self.list_response)
            .field("error_response", &self.error_response)
            .field("provider", &self.provider.as_ref().map(|_| "<provider>"))
            .finish()
    }
}

/// Validation failures for endpoint configurations.
///
/// Each variant names the violated field so registration errors can be
/// diagnosed directly from the message.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("method cannot be empty")]
    EmptyMethod,
    #[error("path cannot be empty")]
    EmptyPath,
    #[error("max latency {max:?} cannot be less than min latency {min:?}")]
    LatencyRange { min: Duration, max: Duration },
    #[error("unsupported response format for endpoint: {0}")]
    UnsupportedFormat(ResponseFormat),
    #[error("max items {max} cannot be less than min items {min}")]
    ItemRange { min: usize, max: usize },
    #[error("error frequency must be within [0.0, 1.0], got {0}")]
    FrequencyRange(f64),
    #[error("error responses cannot be empty")]
    EmptyErrorResponses,
    #[error("status code {0} is outside [100, 599]")]
    StatusCodeRange(u16),
    #[error("error payload cannot be null")]
    NullPayload,
}

impl ListResponseConfig {
    /// Check internal consistency of the list bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ItemRange`] when `max_items < min_items`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_items < self.min_items {
            return Err(ConfigError::ItemRange { min: self.min_items, max: self.max_items });
        }
        Ok(())
    }
}

impl ErrorResponseConfig {
    /// Check internal consistency of the error injection policy.
    ///
    /// # Errors
    ///
    /// Returns the first violation among: frequency outside `[0.0, 1.0]`,
    /// empty response list, status code outside `[100, 599]`, null payload.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.frequency) {
            return Err(ConfigError::FrequencyRange(self.frequency));
        }

        if self.responses.is_empty() {
            return Err(ConfigError::EmptyErrorResponses);
        }

        for response in &self.responses {
            if !(100..=599).contains(&response.status_code) {
                return Err(ConfigError::StatusCodeRange(response.status_code));
            }

            if matches!(response.payload, Payload::Json(serde_json::Value::Null)) {
                return Err(ConfigError::NullPayload);
            }
        }

        Ok(())
    }
}

impl EndpointConfig {
    /// Check internal consistency of the whole endpoint description.
    ///
    /// Checks run in order and fail fast; a config that does not pass is
    /// never added to the route table.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first violated field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.method.is_empty() {
            return Err(ConfigError::EmptyMethod);
        }

        if self.path.is_empty() {
            return Err(ConfigError::EmptyPath);
        }

        if self.max_latency < self.min_latency {
            return Err(ConfigError::LatencyRange {
                min: self.min_latency,
                max: self.max_latency,
            });
        }

        // Fake data is produced by filling typed values, so only JSON can
        // carry a normal response; raw bytes exist for error payloads.
        if self.response_format != ResponseFormat::Json {
            return Err(ConfigError::UnsupportedFormat(self.response_format));
        }

        if let Some(list) = &self.list_response {
            list.validate()?;
        }

        if let Some(errors) = &self.error_response {
            errors.validate()?;
        }

        Ok(())
    }
}
