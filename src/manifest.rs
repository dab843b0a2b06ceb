//! Declarative endpoint definitions loaded from YAML files.
//!
//! A manifest lets the CLI serve fake endpoints without writing code: each
//! entry describes one endpoint plus a JSON `template` that a
//! template-cloning provider returns on every request. Latency bounds are
//! humantime strings (`"100ms"`, `"1s"`).
//!
//! ```yaml
//! version: 1
//! endpoints:
//!   - method: GET
//!     path: /users
//!     min_latency: 100ms
//!     max_latency: 500ms
//!     template: { id: 1, name: "Doe" }
//!     list: { min_items: 2, max_items: 5 }
//!     errors:
//!       frequency: 0.1
//!       responses:
//!         - status_code: 503
//!           json: { error: "unavailable" }
//!         - status_code: 500
//!           text: "internal error"
//! ```

use std::time::Duration;
use std::{fs, path::Path};

use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

use crate::config::{
    ConfigError, EndpointConfig, ErrorResponse, ErrorResponseConfig, ListResponseConfig, Payload,
};
use crate::http::Mux;
use crate::provider::provider_fn;

/// Errors that can occur when loading or applying a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// I/O error while reading the manifest file.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// YAML parsing error.
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// A latency field does not parse as a humantime duration.
    #[error("invalid duration {value:?}: {source}")]
    Duration {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
    /// An error response gives neither or both of `json` and `text`.
    #[error("error response for {path} needs exactly one of `json` or `text`")]
    AmbiguousPayload { path: String },
    /// The converted endpoint failed registration-time validation.
    #[error("endpoint {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },
}

/// A set of declarative endpoint definitions.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct EndpointBook {
    /// Schema version of the manifest file.
    pub version: Option<u8>,
    /// Endpoint definitions.
    pub endpoints: Vec<EndpointSpec>,
}

/// One declarative endpoint definition.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointSpec {
    pub method: String,
    pub path: String,
    /// Lower latency bound as a humantime string; absent means zero.
    #[serde(default)]
    pub min_latency: Option<String>,
    /// Upper latency bound as a humantime string; absent means zero.
    #[serde(default)]
    pub max_latency: Option<String>,
    /// JSON value returned (once or per list item) for this endpoint.
    pub template: serde_json::Value,
    /// Optional list expansion bounds.
    #[serde(default)]
    pub list: Option<ListSpec>,
    /// Optional error injection policy.
    #[serde(default)]
    pub errors: Option<ErrorSpec>,
}

/// List expansion bounds in a manifest.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListSpec {
    #[serde(default)]
    pub min_items: usize,
    #[serde(default)]
    pub max_items: usize,
}

/// Error injection policy in a manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorSpec {
    pub frequency: f64,
    pub responses: Vec<ErrorResponseSpec>,
}

/// One error response candidate in a manifest.
///
/// Exactly one of `json` or `text` must be given; `text` bodies are
/// written to the wire verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponseSpec {
    pub status_code: u16,
    #[serde(default)]
    pub json: Option<serde_json::Value>,
    #[serde(default)]
    pub text: Option<String>,
}

fn parse_latency(value: Option<&str>) -> Result<Duration, ManifestError> {
    match value {
        None => Ok(Duration::ZERO),
        Some(s) => humantime::parse_duration(s)
            .map_err(|source| ManifestError::Duration { value: s.to_string(), source }),
    }
}

impl EndpointSpec {
    /// Convert this definition into a runtime [`EndpointConfig`].
    ///
    /// The endpoint gets its own provider that clones `template` into a
    /// `serde_json::Value` target on every request.
    ///
    /// # Errors
    ///
    /// Returns a [`ManifestError`] when a latency string or an error
    /// payload is malformed.
    pub fn to_config(&self) -> Result<EndpointConfig, ManifestError> {
        let error_response = match &self.errors {
            None => None,
            Some(spec) => {
                let mut responses = Vec::with_capacity(spec.responses.len());
                for response in &spec.responses {
                    let payload = match (&response.json, &response.text) {
                        (Some(value), None) => Payload::Json(value.clone()),
                        (None, Some(text)) => Payload::Bytes(Bytes::from(text.clone())),
                        _ => {
                            return Err(ManifestError::AmbiguousPayload {
                                path: self.path.clone(),
                            })
                        }
                    };
                    responses.push(ErrorResponse { status_code: response.status_code, payload });
                }
                Some(ErrorResponseConfig { frequency: spec.frequency, responses })
            }
        };

        let template = self.template.clone();
        let provider = provider_fn::<serde_json::Value, _>(move |value| {
            *value = template.clone();
            Ok(())
        });

        Ok(EndpointConfig {
            method: self.method.clone(),
            path: self.path.clone(),
            min_latency: parse_latency(self.min_latency.as_deref())?,
            max_latency: parse_latency(self.max_latency.as_deref())?,
            list_response: self
                .list
                .map(|l| ListResponseConfig { min_items: l.min_items, max_items: l.max_items }),
            error_response,
            provider: Some(provider),
            ..Default::default()
        })
    }
}

impl EndpointBook {
    /// Load a manifest from a YAML file.
    ///
    /// # Parameters
    ///
    /// - `path` - Path to the YAML manifest
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Io`] or [`ManifestError::Yaml`] when the
    /// file cannot be read or parsed.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let txt = fs::read_to_string(path)?;
        let book: Self = serde_yaml::from_str(&txt)?;
        Ok(book)
    }

    /// Register every endpoint of this manifest on a mux.
    ///
    /// Stops at the first invalid definition; earlier endpoints stay
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns the conversion or validation failure of the offending
    /// endpoint, naming its path.
    pub fn register_into(&self, mux: &Mux) -> Result<(), ManifestError> {
        for spec in &self.endpoints {
            let config = spec.to_config()?;
            mux.register::<serde_json::Value>(config).map_err(|source| {
                ManifestError::Config { path: spec.path.clone(), source }
            })?;
        }
        Ok(())
    }
}
