//! # Fake Endpoint Mock Library
//!
//! A library for generating configurable fake HTTP endpoints for
//! integration testing and client development.
//!
//! This library provides components for:
//! - **Declarative Endpoints**: Method, path, latency window, response
//!   shape, list expansion, and error injection described per route
//! - **Fake Data Providers**: A pluggable capability filling typed values
//!   with synthetic content, mux-wide or per endpoint
//! - **Response Synthesis**: Per-request randomized selection between
//!   normal, list, and injected-error responses
//! - **Route Table**: Concurrent path/method dispatch with 404/405
//!   semantics, safe to grow while traffic is live
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use serde::{Deserialize, Serialize};
//!
//! use faux_mock_rs::{build_router, provider_fn, EndpointConfig, Mux};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mux = Arc::new(Mux::new());
//! mux.set_default_provider(provider_fn::<User, _>(|user| {
//!     user.id = 1;
//!     user.name = "Doe".to_string();
//!     Ok(())
//! }));
//!
//! mux.register::<User>(EndpointConfig {
//!     method: "GET".to_string(),
//!     path: "/users".to_string(),
//!     min_latency: Duration::from_millis(100),
//!     max_latency: Duration::from_millis(500),
//!     ..Default::default()
//! })?;
//!
//! let app = build_router(mux);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:18080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod http;
pub mod manifest;
pub mod provider;
pub mod synthesizer;

// Re-export commonly used types for convenience
pub use config::{
    ConfigError, EndpointConfig, ErrorResponse, ErrorResponseConfig, ListResponseConfig, Payload,
    ResponseFormat,
};
pub use http::{build_router, Mux};
pub use manifest::{EndpointBook, ManifestError};
pub use provider::{provider_fn, FakeDataProvider, ProviderError};
pub use synthesizer::{SynthError, Synthesized};
