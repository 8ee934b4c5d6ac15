//! HTTP surface for the screenshot service
//!
//! A thin axum layer over `ScreenshotService`: one capture endpoint and a
//! health probe. All orchestration lives in the service; this module only
//! extracts parameters, encodes the image, and maps errors to statuses.

use crate::{ScreenshotError, ScreenshotService};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Creates the router with all routes configured.
pub fn create_router(service: Arc<ScreenshotService>) -> Router {
    Router::new()
        .route("/api/screenshot", get(screenshot))
        .route("/health", get(health))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
struct ScreenshotQuery {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ScreenshotResponse {
    image: String,
    cached: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

async fn screenshot(
    State(service): State<Arc<ScreenshotService>>,
    Query(query): Query<ScreenshotQuery>,
) -> Response {
    let Some(url) = query.url else {
        return error_response(StatusCode::BAD_REQUEST, "URL parameter is required", None);
    };

    match service.handle(&url, query.width, query.height).await {
        Ok(outcome) => Json(ScreenshotResponse {
            image: BASE64.encode(outcome.image.as_slice()),
            cached: outcome.cached,
        })
        .into_response(),
        Err(err) => map_error(err, service.config().dev_mode),
    }
}

fn map_error(err: ScreenshotError, dev_mode: bool) -> Response {
    if err.is_client_error() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid URL format", None);
    }

    if err.is_busy() {
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            "Server is busy, please retry later",
            None,
        );
    }

    // Raw error text only leaves the process in dev mode.
    let detail = dev_mode.then(|| err.to_string());
    error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to capture screenshot",
        detail,
    )
}

fn error_response(status: StatusCode, error: &str, message: Option<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            message,
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    cache_entries: usize,
    available_capture_slots: usize,
    max_capture_slots: usize,
}

async fn health(State(service): State<Arc<ScreenshotService>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cache_entries: service.cache().len(),
        available_capture_slots: service.available_capture_slots(),
        max_capture_slots: service.max_capture_slots(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Capture, Config};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::util::ServiceExt;

    struct StubEngine {
        calls: AtomicUsize,
        response: Result<Vec<u8>, ScreenshotError>,
    }

    impl StubEngine {
        fn ok(bytes: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Ok(bytes.to_vec()),
            })
        }

        fn failing(error: ScreenshotError) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                response: Err(error),
            })
        }
    }

    #[async_trait]
    impl Capture for StubEngine {
        async fn capture(
            &self,
            _url: &str,
            _width: u32,
            _height: u32,
        ) -> Result<Vec<u8>, ScreenshotError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }

    fn test_app(engine: Arc<StubEngine>, config: Config) -> Router {
        let service = Arc::new(ScreenshotService::with_engine(config, engine));
        create_router(service)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap();
        (status, value)
    }

    #[tokio::test]
    async fn test_capture_then_cache_hit() {
        let engine = StubEngine::ok(b"fake-png");
        let service = Arc::new(ScreenshotService::with_engine(
            Config::default(),
            engine.clone(),
        ));
        let app = create_router(service);

        // First request renders and reports cached: false.
        let (status, body) = get_json(app.clone(), "/api/screenshot?url=example.com").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cached"], false);
        let decoded = BASE64.decode(body["image"].as_str().unwrap()).unwrap();
        assert_eq!(decoded, b"fake-png");

        // Immediate repeat is a cache hit with no new engine call.
        let (status, body) = get_json(app, "/api/screenshot?url=example.com").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cached"], true);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_url_parameter() {
        let app = test_app(StubEngine::ok(b"png"), Config::default());

        let (status, body) = get_json(app, "/api/screenshot").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "URL parameter is required");
    }

    #[tokio::test]
    async fn test_empty_url_is_invalid() {
        let engine = StubEngine::ok(b"png");
        let app = test_app(engine.clone(), Config::default());

        let (status, body) = get_json(app, "/api/screenshot?url=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid URL format");
        // Rejected before any capture was attempted.
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_oversized_dimensions_rejected() {
        let app = test_app(StubEngine::ok(b"png"), Config::default());

        let (status, body) =
            get_json(app, "/api/screenshot?url=example.com&width=8192&height=1080").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid URL format");
    }

    #[tokio::test]
    async fn test_navigation_timeout_maps_to_500() {
        let engine = StubEngine::failing(ScreenshotError::NavigationTimeout(
            Duration::from_secs(30),
        ));
        let app = test_app(engine, Config::default());

        let (status, body) = get_json(app, "/api/screenshot?url=example.com").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to capture screenshot");
        // Production-style mode withholds the raw error text.
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn test_dev_mode_includes_detail() {
        let engine = StubEngine::failing(ScreenshotError::CaptureFailed(
            "tab crashed".to_string(),
        ));
        let config = Config {
            dev_mode: true,
            ..Default::default()
        };
        let app = test_app(engine, config);

        let (status, body) = get_json(app, "/api/screenshot?url=example.com").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["message"].as_str().unwrap().contains("tab crashed"));
    }

    #[tokio::test]
    async fn test_busy_maps_to_429() {
        let engine = StubEngine::failing(ScreenshotError::ServiceBusy(Duration::from_secs(10)));
        let app = test_app(engine, Config::default());

        let (status, body) = get_json(app, "/api/screenshot?url=example.com").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Server is busy, please retry later");
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app(StubEngine::ok(b"png"), Config::default());

        let (status, body) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cache_entries"], 0);
        assert_eq!(
            body["available_capture_slots"],
            Config::default().max_concurrent_captures
        );
        assert_eq!(
            body["max_capture_slots"],
            Config::default().max_concurrent_captures
        );
    }
}
