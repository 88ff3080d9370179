//! HTTP metrics middleware.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{
    normalize_path, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION,
};

/// Paths that are not recorded, so scrapes don't count themselves.
const UNTRACKED_PATHS: &[&str] = &["/metrics"];

/// Keeps the in-flight gauge right even if the request future is dropped
/// (client hung up mid-request).
struct InFlight;

impl InFlight {
    fn enter() -> Self {
        HTTP_REQUESTS_IN_FLIGHT.inc();
        InFlight
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        HTTP_REQUESTS_IN_FLIGHT.dec();
    }
}

/// Record latency and a per-route count for every API request.
///
/// Route labels go through [`normalize_path`] so game IDs and category
/// names don't explode label cardinality.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    if UNTRACKED_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let method = request.method().as_str().to_owned();
    let route = normalize_path(request.uri().path());
    let started = Instant::now();

    let response = {
        let _in_flight = InFlight::enter();
        next.run(request).await
    };

    let status = response.status().as_u16().to_string();
    let labels = [method.as_str(), route.as_str(), status.as_str()];
    HTTP_REQUEST_DURATION
        .with_label_values(&labels)
        .observe(started.elapsed().as_secs_f64());
    HTTP_REQUESTS_TOTAL.with_label_values(&labels).inc();

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Router};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/api/v1/categories/{category}/games", get(|| async { "[]" }))
            .route("/metrics", get(|| async { "" }))
            .layer(middleware::from_fn(metrics_middleware))
    }

    async fn hit(path: &str) {
        let response = app()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn test_counts_by_normalized_route() {
        let labels = ["GET", "/api/v1/categories/{category}/games", "200"];
        let before = HTTP_REQUESTS_TOTAL.with_label_values(&labels).get();

        hit("/api/v1/categories/puzzle/games").await;
        hit("/api/v1/categories/racing/games").await;

        assert_eq!(
            HTTP_REQUESTS_TOTAL.with_label_values(&labels).get(),
            before + 2
        );
    }

    #[tokio::test]
    async fn test_metrics_scrape_not_counted() {
        let labels = ["GET", "/metrics", "200"];
        hit("/metrics").await;
        assert_eq!(HTTP_REQUESTS_TOTAL.with_label_values(&labels).get(), 0);
    }
}
