//! Response synthesis: turning a validated endpoint config plus a fake
//! data provider into a concrete response.
//!
//! Each request resolves to one of three outcomes, checked in order:
//! error injection, list response, single response. All randomness is
//! drawn per request; nothing is cached between requests.

use std::time::Duration;

use bytes::Bytes;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::config::{EndpointConfig, ErrorResponseConfig, Payload, ResponseFormat};
use crate::provider::{FakeDataProvider, ProviderError};

/// A fully decided response, ready to be written to the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Synthesized {
    /// JSON body, written with `Content-Type: application/json`.
    Json { status: u16, body: serde_json::Value },
    /// Raw bytes written verbatim.
    Bytes { status: u16, body: Bytes },
}

/// Failures during response synthesis.
///
/// All variants are converted to 500 responses at the HTTP edge; none of
/// them can crash the serving process.
#[derive(Debug, Error)]
pub enum SynthError {
    /// The injected fake data provider returned an error.
    #[error("fake data provider failed: {0}")]
    Provider(ProviderError),
    /// The endpoint's configured format cannot carry a normal response.
    #[error("unsupported response format: {0}")]
    UnsupportedFormat(ResponseFormat),
    /// Neither a per-endpoint nor a default provider is configured.
    #[error("no fake data provider configured")]
    MissingProvider,
    /// Error injection fired but the response list is empty. Validation
    /// makes this unreachable for registered endpoints.
    #[error("error injection fired but no responses are configured")]
    EmptyErrorConfig,
    /// Encoding the synthesized value as JSON failed.
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decide whether error injection fires for this request.
fn should_inject(errors: &ErrorResponseConfig) -> bool {
    // gen::<f64>() is uniform in [0, 1), so frequency 1.0 always fires
    // and 0.0 never does.
    rand::thread_rng().gen::<f64>() < errors.frequency
}

/// Pick one configured error response uniformly.
fn inject_error(errors: &ErrorResponseConfig) -> Result<Synthesized, SynthError> {
    let response =
        errors.responses.choose(&mut rand::thread_rng()).ok_or(SynthError::EmptyErrorConfig)?;

    // The payload's own format decides the encoding, independent of the
    // endpoint's normal response format.
    Ok(match &response.payload {
        Payload::Json(value) => {
            Synthesized::Json { status: response.status_code, body: value.clone() }
        }
        Payload::Bytes(bytes) => {
            Synthesized::Bytes { status: response.status_code, body: bytes.clone() }
        }
    })
}

/// Produce one fake value of type `T` through the provider.
fn fill_one<T>(provider: &dyn FakeDataProvider) -> Result<T, SynthError>
where
    T: Default + 'static,
{
    let mut item = T::default();
    provider.fill(&mut item).map_err(SynthError::Provider)?;
    Ok(item)
}

/// Synthesize a response for one request.
///
/// Runs the per-request decision tree: error injection first, then list
/// expansion, then a single item. List counts are drawn uniformly from
/// `[min_items, max_items]`, inclusive at both ends. A provider failure
/// mid-list discards the partial result; no partial response is produced.
///
/// # Parameters
///
/// - `config` - Validated endpoint configuration
/// - `provider` - Fake data provider resolved for this endpoint
///
/// # Returns
///
/// Returns the decided response, or a [`SynthError`] that the dispatcher
/// reports as a 500.
pub fn synthesize<T>(
    config: &EndpointConfig,
    provider: &dyn FakeDataProvider,
) -> Result<Synthesized, SynthError>
where
    T: Default + Serialize + 'static,
{
    if let Some(errors) = &config.error_response {
        if should_inject(errors) {
            return inject_error(errors);
        }
    }

    match config.response_format {
        ResponseFormat::Json => {}
        other => return Err(SynthError::UnsupportedFormat(other)),
    }

    let body = if let Some(list) = &config.list_response {
        let count = rand::thread_rng().gen_range(list.min_items..=list.max_items);
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(fill_one::<T>(provider)?);
        }
        serde_json::to_value(items)?
    } else {
        serde_json::to_value(fill_one::<T>(provider)?)?
    };

    Ok(Synthesized::Json { status: 200, body })
}

/// Sample a simulated latency uniformly from `[min, max]`, inclusive.
///
/// Equal bounds give a fixed delay.
pub(crate) fn sample_latency(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let nanos = rand::thread_rng().gen_range(min.as_nanos()..=max.as_nanos());
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
