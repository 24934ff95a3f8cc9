//! Static file serving module
//!
//! Serves the single dashboard page verbatim.

use crate::http::{self, HttpResponse};
use crate::logger;
use hyper::body::Bytes;
use hyper::StatusCode;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Serve the dashboard HTML, or a JSON 404 naming the missing file
pub async fn serve_dashboard(path: &Path) -> HttpResponse {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

    match fs::read(path).await {
        Ok(content) => http::html_response(Bytes::from(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            logger::log_warning(&format!("Dashboard not found: {}", path.display()));
            http::error_response(StatusCode::NOT_FOUND, &format!("{name} not found"), None)
        }
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {e}",
                path.display()
            ));
            http::error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("failed to read {name}"),
                None,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_serves_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.html");
        std::fs::write(&path, "<h1>🏏 Live</h1>").unwrap();

        let resp = serve_dashboard(&path).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "text/html");
        assert_eq!(
            resp.headers()["Content-Length"],
            "<h1>🏏 Live</h1>".len().to_string().as_str()
        );
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, Bytes::from("<h1>🏏 Live</h1>"));
    }

    #[tokio::test]
    async fn test_missing_file_is_json_404() {
        let dir = tempfile::tempdir().unwrap();
        let resp = serve_dashboard(&dir.path().join("dashboard.html")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");

        let body = resp.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "dashboard.html not found"}));
    }

    #[tokio::test]
    async fn test_directory_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let resp = serve_dashboard(dir.path()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
