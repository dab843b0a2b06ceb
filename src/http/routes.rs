//! Request dispatch against the route table.
//!
//! An axum `Router` fixes its route set when serving starts, while the
//! route table keeps growing under live traffic. A single fallback handler
//! therefore resolves every request against the table at request time:
//! unknown path → 404, known path without the method → 405, otherwise the
//! matched entry serves the request.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use tokio::time::sleep;

use crate::http::mux::{Mux, RouteEntry, RouteLookup};
use crate::synthesizer::{sample_latency, SynthError, Synthesized};

/// Build the axum router serving the given route table.
///
/// # Parameters
///
/// - `mux` - Shared route table; endpoints registered on it after this
///   call still become reachable
///
/// # Returns
///
/// Returns a `Router` ready for `axum::serve` or an in-process test
/// server.
pub fn build_router(mux: Arc<Mux>) -> Router {
    Router::new().fallback(dispatch).with_state(mux)
}

/// Resolve and serve one request.
async fn dispatch(State(mux): State<Arc<Mux>>, request: Request) -> Response {
    let path = request.uri().path();
    let method = request.method().as_str();

    match mux.route(path, method) {
        RouteLookup::NotFound => (StatusCode::NOT_FOUND, "not found").into_response(),
        RouteLookup::MethodNotAllowed => {
            (StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response()
        }
        RouteLookup::Found(entry) => serve_entry(&mux, &entry).await,
    }
}

/// Run one matched endpoint: simulated latency, then synthesis.
///
/// The sleep suspends only the task serving this request; concurrent
/// requests proceed independently.
async fn serve_entry(mux: &Mux, entry: &RouteEntry) -> Response {
    let latency = sample_latency(entry.config.min_latency, entry.config.max_latency);
    if !latency.is_zero() {
        sleep(latency).await;
    }

    let Some(provider) = entry.config.provider.clone().or_else(|| mux.default_provider()) else {
        return synthesis_failure(&SynthError::MissingProvider);
    };

    match (entry.synth)(&entry.config, provider.as_ref()) {
        Ok(synthesized) => synthesized.into_response(),
        Err(err) => synthesis_failure(&err),
    }
}

impl IntoResponse for Synthesized {
    fn into_response(self) -> Response {
        match self {
            Self::Json { status, body } => (status_code(status), Json(body)).into_response(),
            Self::Bytes { status, body } => (status_code(status), body).into_response(),
        }
    }
}

/// Convert a validated status code; out-of-range codes (impossible for
/// registered endpoints) degrade to 500.
fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Convert a synthesis failure to a 500 with an explanatory body.
fn synthesis_failure(err: &SynthError) -> Response {
    tracing::warn!("synthesis failed: {err}");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal server error: {err}")).into_response()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use axum_test::TestServer;
    use bytes::Bytes;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use crate::config::{
        EndpointConfig, ErrorResponse, ErrorResponseConfig, ListResponseConfig, Payload,
    };
    use crate::provider::{provider_fn, FakeDataProvider};

    use super::*;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
        email: String,
    }

    fn fixed_user_provider() -> Arc<dyn FakeDataProvider> {
        provider_fn::<User, _>(|user| {
            user.id = 1;
            user.name = "Doe".to_string();
            user.email = "doe@testing.com".to_string();
            Ok(())
        })
    }

    fn user_mux() -> Arc<Mux> {
        let mux = Arc::new(Mux::new());
        mux.set_default_provider(fixed_user_provider());
        mux
    }

    fn get_users() -> EndpointConfig {
        EndpointConfig {
            method: "GET".to_string(),
            path: "/users".to_string(),
            ..Default::default()
        }
    }

    /// Test a basic GET endpoint: 200, JSON content type, exact fields.
    #[tokio::test]
    async fn test_basic_get() {
        let mux = user_mux();
        mux.register::<User>(get_users()).expect("register");

        let server = TestServer::new(build_router(mux)).expect("test server");
        let response = server.get("/users").await;

        response.assert_status_ok();
        let content_type = response.header("content-type");
        assert!(content_type.to_str().expect("header").starts_with("application/json"));

        let user: User = response.json();
        assert_eq!(
            user,
            User { id: 1, name: "Doe".to_string(), email: "doe@testing.com".to_string() }
        );
    }

    /// Test multiple methods on one path, 405 for others, 404 elsewhere.
    #[tokio::test]
    async fn test_method_and_path_resolution() {
        let mux = user_mux();
        mux.register::<User>(get_users()).expect("register GET");
        mux.register::<User>(EndpointConfig { method: "POST".to_string(), ..get_users() })
            .expect("register POST");

        let server = TestServer::new(build_router(mux)).expect("test server");

        server.get("/users").await.assert_status_ok();
        server.post("/users").await.assert_status_ok();
        server.put("/users").await.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        server.get("/missing").await.assert_status(StatusCode::NOT_FOUND);
    }

    /// Test that list endpoints honor the configured length bounds.
    #[tokio::test]
    async fn test_list_response_bounds() {
        let mux = user_mux();
        mux.register::<User>(EndpointConfig {
            list_response: Some(ListResponseConfig { min_items: 2, max_items: 5 }),
            ..get_users()
        })
        .expect("register");

        let server = TestServer::new(build_router(mux)).expect("test server");

        for _ in 0..20 {
            let response = server.get("/users").await;
            response.assert_status_ok();
            let users: Vec<User> = response.json();
            assert!(
                (2..=5).contains(&users.len()),
                "expected between 2 and 5 users, got {}",
                users.len()
            );
        }
    }

    /// Test that equal list bounds always return that exact count.
    #[tokio::test]
    async fn test_list_response_fixed_length() {
        let mux = user_mux();
        mux.register::<User>(EndpointConfig {
            list_response: Some(ListResponseConfig { min_items: 5, max_items: 5 }),
            ..get_users()
        })
        .expect("register");

        let server = TestServer::new(build_router(mux)).expect("test server");
        let users: Vec<User> = server.get("/users").await.json();
        assert_eq!(users.len(), 5);
    }

    /// Test that observed latency falls inside the configured window.
    #[tokio::test]
    async fn test_latency_window() {
        let mux = user_mux();
        mux.register::<User>(EndpointConfig {
            min_latency: Duration::from_millis(150),
            max_latency: Duration::from_millis(350),
            ..get_users()
        })
        .expect("register");

        let server = TestServer::new(build_router(mux)).expect("test server");

        let start = Instant::now();
        server.get("/users").await.assert_status_ok();
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(150), "responded too early: {elapsed:?}");
        // Upper bound with measurement slack.
        assert!(elapsed < Duration::from_secs(2), "responded too late: {elapsed:?}");
    }

    /// Test that frequency 1.0 always returns a configured error.
    #[tokio::test]
    async fn test_error_injection_always() {
        let mux = user_mux();
        mux.register::<User>(EndpointConfig {
            error_response: Some(ErrorResponseConfig {
                frequency: 1.0,
                responses: vec![
                    ErrorResponse {
                        status_code: 500,
                        payload: Payload::Bytes(Bytes::from_static(b"Internal Server Error")),
                    },
                    ErrorResponse {
                        status_code: 503,
                        payload: Payload::Json(json!({"error": "Service Unavailable"})),
                    },
                ],
            }),
            ..get_users()
        })
        .expect("register");

        let server = TestServer::new(build_router(mux)).expect("test server");

        for _ in 0..20 {
            let response = server.get("/users").await;
            match response.status_code().as_u16() {
                500 => assert_eq!(response.text(), "Internal Server Error"),
                503 => {
                    let body: serde_json::Value = response.json();
                    assert_eq!(body, json!({"error": "Service Unavailable"}));
                }
                other => panic!("unexpected status {other}"),
            }
        }
    }

    /// Test that frequency 0.0 never injects an error.
    #[tokio::test]
    async fn test_error_injection_never() {
        let mux = user_mux();
        mux.register::<User>(EndpointConfig {
            error_response: Some(ErrorResponseConfig {
                frequency: 0.0,
                responses: vec![ErrorResponse {
                    status_code: 503,
                    payload: Payload::Json(json!("boom")),
                }],
            }),
            ..get_users()
        })
        .expect("register");

        let server = TestServer::new(build_router(mux)).expect("test server");
        for _ in 0..20 {
            server.get("/users").await.assert_status_ok();
        }
    }

    /// Test that a per-endpoint provider overrides the mux default.
    #[tokio::test]
    async fn test_per_endpoint_provider_override() {
        let mux = user_mux();
        let override_provider = provider_fn::<User, _>(|user| {
            user.id = 99;
            user.name = "Smith".to_string();
            user.email = "smith@testing.com".to_string();
            Ok(())
        });
        mux.register::<User>(EndpointConfig { provider: Some(override_provider), ..get_users() })
            .expect("register");

        let server = TestServer::new(build_router(mux)).expect("test server");
        let user: User = server.get("/users").await.json();
        assert_eq!(user.id, 99);
        assert_eq!(user.name, "Smith");
    }

    /// Test that a provider failure surfaces as a 500 with the cause.
    #[tokio::test]
    async fn test_provider_failure_is_500() {
        let mux = Arc::new(Mux::new());
        mux.set_default_provider(provider_fn::<User, _>(|_| Err("faker broke".into())));
        mux.register::<User>(get_users()).expect("register");

        let server = TestServer::new(build_router(mux)).expect("test server");
        let response = server.get("/users").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().contains("faker broke"));
    }

    /// Test that a missing provider surfaces as a 500.
    #[tokio::test]
    async fn test_missing_provider_is_500() {
        let mux = Arc::new(Mux::new());
        mux.register::<User>(get_users()).expect("register");

        let server = TestServer::new(build_router(mux)).expect("test server");
        let response = server.get("/users").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().contains("no fake data provider"));
    }

    /// Test that endpoints registered after serving starts are reachable.
    #[tokio::test]
    async fn test_registration_under_live_traffic() {
        let mux = user_mux();
        let server = TestServer::new(build_router(mux.clone())).expect("test server");

        server.get("/users").await.assert_status(StatusCode::NOT_FOUND);

        mux.register::<User>(get_users()).expect("register");
        server.get("/users").await.assert_status_ok();
    }
}
