//! HTTP response building module
//!
//! Every response leaves here with an exact `Content-Length`. All responses
//! except the dashboard page also carry the CORS headers.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::upstream::ProxyOutcome;

pub type HttpResponse = Response<Full<Bytes>>;

pub const JSON: &str = "application/json";
pub const HTML: &str = "text/html";

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Error payload, `{"error": ..., "detail": ...}`
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<&'a str>,
}

/// Build a response with `Content-Length` set from `body`
fn build(status: StatusCode, content_type: Option<&str>, body: Bytes, cors: bool) -> HttpResponse {
    let mut builder = Response::builder()
        .status(status)
        .header("Content-Length", body.len());

    if let Some(content_type) = content_type {
        builder = builder.header("Content-Type", content_type);
    }

    if cors {
        builder = builder
            .header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
            .header("Access-Control-Allow-Methods", ALLOW_METHODS)
            .header("Access-Control-Allow-Headers", ALLOW_HEADERS);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(status, &e);
        fallback_response()
    })
}

/// Serialize `payload` as a JSON response with CORS headers
pub fn json_response<T: Serialize>(status: StatusCode, payload: &T) -> HttpResponse {
    match serde_json::to_vec(payload) {
        Ok(body) => build(status, Some(JSON), Bytes::from(body), true),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            fallback_response()
        }
    }
}

/// `{"error": message}` or `{"error": message, "detail": detail}`
pub fn error_response(status: StatusCode, error: &str, detail: Option<&str>) -> HttpResponse {
    json_response(status, &ErrorBody { error, detail })
}

/// Upstream JSON passed through byte for byte
pub fn raw_json_response(body: Bytes) -> HttpResponse {
    build(StatusCode::OK, Some(JSON), body, true)
}

/// Dashboard page, served without CORS headers
pub fn html_response(body: Bytes) -> HttpResponse {
    build(StatusCode::OK, Some(HTML), body, false)
}

/// Pre-flight answer: 200, empty body, CORS headers
pub fn options_response() -> HttpResponse {
    build(StatusCode::OK, None, Bytes::new(), true)
}

pub fn not_found() -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, "Not found", None)
}

pub fn method_not_allowed() -> HttpResponse {
    let mut resp = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed", None);
    if let Ok(allow) = ALLOW_METHODS.parse() {
        resp.headers_mut().insert("Allow", allow);
    }
    resp
}

/// Map an upstream outcome onto the one response the browser sees
pub fn from_outcome(outcome: ProxyOutcome) -> HttpResponse {
    match outcome {
        ProxyOutcome::Success(body) => raw_json_response(body),
        ProxyOutcome::UpstreamHttpError { status, detail } => error_response(
            passthrough_status(status),
            &format!("API HTTP {status}"),
            Some(detail.as_str()),
        ),
        ProxyOutcome::UpstreamNetworkError(reason) => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, &reason, None)
        }
        ProxyOutcome::UnclassifiedError(message) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &message, None)
        }
    }
}

/// Upstream status reused as ours; 502 when it cannot carry a JSON body
fn passthrough_status(code: u16) -> StatusCode {
    match StatusCode::from_u16(code) {
        Ok(status)
            if !status.is_informational()
                && status != StatusCode::NO_CONTENT
                && status != StatusCode::NOT_MODIFIED =>
        {
            status
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn fallback_response() -> HttpResponse {
    let body = Bytes::from_static(br#"{"error":"Internal server error"}"#);
    let mut resp = Response::new(Full::new(body.clone()));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp.headers_mut()
        .insert("Content-Type", hyper::header::HeaderValue::from_static(JSON));
    resp.headers_mut()
        .insert("Content-Length", hyper::header::HeaderValue::from(body.len()));
    resp
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
