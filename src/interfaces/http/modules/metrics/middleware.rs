//! HTTP request metrics middleware
//!
//! Records `http_requests_total` (counter) and `http_request_duration_seconds` (histogram)
//! for every HTTP request passing through the router.

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use std::time::Instant;

/// Middleware that records HTTP request metrics:
///
/// - **`http_requests_total`**: counter with labels `method`, `path`, `status`
/// - **`http_request_duration_seconds`**: histogram with labels `method`, `path`
///
/// `path` is the matched route template so user ids do not explode label cardinality.
pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let start = Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();

    metrics::counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/items/{id}", get(|| async { StatusCode::NO_CONTENT }))
            .layer(middleware::from_fn(http_metrics_middleware))
    }

    fn sample_line<'a>(rendered: &'a str, metric: &str, labels: &[&str]) -> Option<&'a str> {
        rendered
            .lines()
            .filter(|l| l.starts_with(metric))
            .find(|l| labels.iter().all(|label| l.contains(label)))
    }

    #[tokio::test]
    async fn records_count_and_duration_by_route_template() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let _guard = metrics::set_default_local_recorder(&recorder);

        let app = app();
        for uri in ["/items/1", "/items/2", "/missing"] {
            app.clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
        }

        let rendered = handle.render();
        let matched = sample_line(
            &rendered,
            "http_requests_total",
            &[r#"method="GET""#, r#"path="/items/{id}""#, r#"status="204""#],
        )
        .unwrap();
        assert!(matched.ends_with(" 2"), "{}", matched);

        let unmatched = sample_line(
            &rendered,
            "http_requests_total",
            &[r#"path="unmatched""#, r#"status="404""#],
        )
        .unwrap();
        assert!(unmatched.ends_with(" 1"), "{}", unmatched);

        assert!(rendered.contains("http_request_duration_seconds"));
        assert!(!rendered.contains(r#"path="/items/1""#));
    }
}
