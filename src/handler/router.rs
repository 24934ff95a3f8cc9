//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method check, static page,
//! proxied API routes, and the 404 fallback.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use crate::routing::QueryParams;
use hyper::{HeaderMap, Method, Request};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Paths answered with the dashboard page
const DASHBOARD_PATHS: [&str; 2] = ["/", "/index.html"];

/// Main entry point for HTTP request handling
///
/// Never fails: every outcome is turned into exactly one response.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();
    // Requests are GET/OPTIONS only; the body is never read
    let (parts, _) = req.into_parts();
    let uri = &parts.uri;

    let response = route(&parts.method, uri.path(), uri.query(), &state).await;

    if state.access_log() {
        let mut entry = AccessLogEntry::new(
            peer_addr.to_string(),
            parts.method.to_string(),
            uri.path().to_string(),
        );
        entry.query = uri.query().map(ToString::to_string);
        entry.http_version = version_label(parts.version).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get("Content-Length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        entry.referer = header_string(&parts.headers, "referer");
        entry.user_agent = header_string(&parts.headers, "user-agent");
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Decide what `method path?query` means and produce its response
pub async fn route(
    method: &Method,
    path: &str,
    raw_query: Option<&str>,
    state: &AppState,
) -> HttpResponse {
    match *method {
        Method::OPTIONS => return http::options_response(),
        Method::GET => {}
        _ => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            return http::method_not_allowed();
        }
    }

    if DASHBOARD_PATHS.contains(&path) {
        return static_files::serve_dashboard(&state.dashboard_path).await;
    }

    if let Some(route) = state.routes.resolve(path) {
        let params = QueryParams::parse(raw_query);
        let url = (route.build)(&params, state.routes.credentials());
        let outcome = state.upstream.fetch(&url).await;
        return http::from_outcome(outcome);
    }

    http::not_found()
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::upstream::{ProxyOutcome, Upstream};
    use async_trait::async_trait;
    use http_body_util::BodyExt;
    use hyper::body::Bytes;
    use hyper::StatusCode;
    use std::sync::Mutex;

    /// Upstream returning a canned outcome and remembering requested URLs
    struct StubUpstream {
        outcome: ProxyOutcome,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Upstream for StubUpstream {
        async fn fetch(&self, url: &str) -> ProxyOutcome {
            self.calls.lock().unwrap().push(url.to_string());
            self.outcome.clone()
        }
    }

    fn state_with(
        outcome: ProxyOutcome,
        dashboard_dir: &std::path::Path,
    ) -> (Arc<AppState>, Arc<StubUpstream>) {
        let mut config = Config::load_from("/nonexistent/gateway-config").unwrap();
        config.upstream.base_url = "https://cricket.test/v1".to_string();
        config.upstream.api_key = "secret-key".to_string();
        config.dashboard.dir = Some(dashboard_dir.to_string_lossy().into_owned());
        config.logging.access_log = false;

        let stub = Arc::new(StubUpstream {
            outcome,
            calls: Mutex::new(Vec::new()),
        });
        let state = Arc::new(AppState::new(config, stub.clone()));
        (state, stub)
    }

    fn ok_state() -> (Arc<AppState>, Arc<StubUpstream>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let (state, stub) = state_with(
            ProxyOutcome::Success(Bytes::from_static(br#"{"ok":true}"#)),
            dir.path(),
        );
        (state, stub, dir)
    }

    async fn read_body(resp: HttpResponse) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_proxied_route_calls_upstream_once() {
        let (state, stub, _dir) = ok_state();
        let resp = route(&Method::GET, "/api/scorecard", Some("id=abc-123"), &state).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Length"], "11");
        assert_eq!(read_body(resp).await, Bytes::from_static(br#"{"ok":true}"#));
        assert_eq!(
            *stub.calls.lock().unwrap(),
            vec!["https://cricket.test/v1/match_scorecard?apikey=secret-key&id=abc-123".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_id_forwarded_empty() {
        let (state, stub, _dir) = ok_state();
        route(&Method::GET, "/api/match", None, &state).await;
        assert_eq!(
            *stub.calls.lock().unwrap(),
            vec!["https://cricket.test/v1/match_info?apikey=secret-key&id=".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (state, stub, _dir) = ok_state();
        for path in ["/api/unknown", "/api", "/dashboard.html", "/api/live/extra"] {
            let resp = route(&Method::GET, path, None, &state).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
            assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
            let body: serde_json::Value = serde_json::from_slice(&read_body(resp).await).unwrap();
            assert_eq!(body, serde_json::json!({"error": "Not found"}));
        }
        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_options_on_any_path() {
        let (state, stub, _dir) = ok_state();
        for path in ["/", "/api/live", "/nowhere"] {
            let resp = route(&Method::OPTIONS, path, None, &state).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
            assert_eq!(resp.headers()["Access-Control-Allow-Methods"], "GET, OPTIONS");
            assert_eq!(resp.headers()["Access-Control-Allow-Headers"], "Content-Type");
            assert!(read_body(resp).await.is_empty());
        }
        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_methods_are_405() {
        let (state, stub, _dir) = ok_state();
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            let resp = route(&method, "/api/live", None, &state).await;
            assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(resp.headers()["Allow"], "GET, OPTIONS");
        }
        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dashboard_served_on_root_and_index() {
        let (state, _stub, dir) = ok_state();
        std::fs::write(dir.path().join("dashboard.html"), "<html>cricket</html>").unwrap();

        for path in DASHBOARD_PATHS {
            let resp = route(&Method::GET, path, None, &state).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(resp.headers()["Content-Type"], "text/html");
            assert!(resp.headers().get("Access-Control-Allow-Origin").is_none());
            assert_eq!(read_body(resp).await, Bytes::from("<html>cricket</html>"));
        }
    }

    #[tokio::test]
    async fn test_missing_dashboard_is_404_json() {
        let (state, _stub, _dir) = ok_state();
        let resp = route(&Method::GET, "/", None, &state).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_slice(&read_body(resp).await).unwrap();
        assert_eq!(body["error"], "dashboard.html not found");
    }

    #[tokio::test]
    async fn test_upstream_failures_mapped() {
        let dir = tempfile::tempdir().unwrap();
        let cases = [
            (
                ProxyOutcome::UpstreamHttpError {
                    status: 404,
                    detail: "not found".to_string(),
                },
                StatusCode::NOT_FOUND,
                serde_json::json!({"error": "API HTTP 404", "detail": "not found"}),
            ),
            (
                ProxyOutcome::UpstreamNetworkError("timed out".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({"error": "timed out"}),
            ),
            (
                ProxyOutcome::UnclassifiedError("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({"error": "boom"}),
            ),
        ];

        for (outcome, status, expected) in cases {
            let (state, _stub) = state_with(outcome, dir.path());
            let resp = route(&Method::GET, "/api/live", None, &state).await;
            assert_eq!(resp.status(), status);
            let length: usize = resp.headers()["Content-Length"].to_str().unwrap().parse().unwrap();
            let body = read_body(resp).await;
            assert_eq!(length, body.len());
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json, expected);
        }
    }

    #[tokio::test]
    async fn test_handle_request_uses_uri_query() {
        let (state, stub, _dir) = ok_state();
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/match?id=m%201")
            .body(())
            .unwrap();

        let resp = handle_request(req, state, "127.0.0.1:40000".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            *stub.calls.lock().unwrap(),
            vec!["https://cricket.test/v1/match_info?apikey=secret-key&id=m+1".to_string()]
        );
    }
}
