//! # Bazaar Image Relay
//!
//! Token images live on hosts that forbid direct browser fetches (CORS) or
//! behind schemes browsers will not load. The relay fetches the target
//! server-side and streams the bytes back with the original content-type
//! and a long-lived, immutable cache directive.
//!
//! Deliberately NOT a hardened gateway: no caching, no retries, no size
//! limiting. It inherits the availability and trust of whatever origin the
//! caller points it at.

use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Cache directive attached to every successful relay response.
///
/// Relayed URLs are content-addressed or otherwise immutable, so the
/// browser may keep them for a year.
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=31536000, immutable";

/// Shared relay state: one upstream client for the process.
#[derive(Clone)]
struct RelayState {
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct RelayQuery {
    url: Option<String>,
}

/// Builds the relay router.
///
/// The router owns a fresh upstream client; use [`router_with_client`] to
/// share one with the rest of the process.
#[must_use]
pub fn router() -> Router {
    router_with_client(reqwest::Client::new())
}

/// Builds the relay router over an existing upstream client.
#[must_use]
pub fn router_with_client(client: reqwest::Client) -> Router {
    Router::new()
        .route("/api/proxy", get(relay))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(RelayState { client })
}

/// The single relay operation.
async fn relay(State(state): State<RelayState>, Query(query): Query<RelayQuery>) -> Response {
    let Some(url) = query.url.filter(|u| !u.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "url parameter is required" })),
        )
            .into_response();
    };

    let upstream = match state.client.get(&url).send().await {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            warn!(%url, status = %response.status(), "upstream returned non-success");
            return relay_failure();
        }
        Err(error) => {
            warn!(%url, %error, "upstream fetch failed");
            return relay_failure();
        }
    };

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    match upstream.bytes().await {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, content_type),
                (
                    header::CACHE_CONTROL,
                    HeaderValue::from_static(CACHE_CONTROL_VALUE),
                ),
            ],
            body,
        )
            .into_response(),
        Err(error) => {
            warn!(%url, %error, "upstream body read failed");
            relay_failure()
        }
    }
}

/// The generic 500 answer; upstream details stay in the log.
fn relay_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "failed to fetch target" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_missing_url_is_a_client_error() {
        let app = router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/proxy")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_url_is_a_client_error() {
        let app = router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/proxy?url=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_a_server_error() {
        let app = router();
        // A loopback port nothing listens on: the fetch itself must fail.
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/proxy?url=http%3A%2F%2F127.0.0.1%3A1%2Fx")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = router();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/other")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
