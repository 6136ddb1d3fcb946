//! HTTP response building module
//!
//! Every response built here carries the cross-origin headers, so browser
//! callers on any origin can read successes and errors alike.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW,
    CONTENT_TYPE,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

pub const CORS_ALLOW_ORIGIN: &str = "*";
pub const CORS_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Client-Info, Apikey";

const JSON_CONTENT_TYPE: &str = "application/json";
const INTERNAL_ERROR_BODY: &str = r#"{"error":"Internal server error"}"#;

/// JSON error envelope: `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

/// Add the cross-origin headers to a response builder
pub fn with_cors(builder: Builder) -> Builder {
    builder
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, CORS_ALLOW_ORIGIN)
        .header(ACCESS_CONTROL_ALLOW_METHODS, CORS_ALLOW_METHODS)
        .header(ACCESS_CONTROL_ALLOW_HEADERS, CORS_ALLOW_HEADERS)
}

/// Build OPTIONS response (preflight request): 200 with an empty body
pub fn build_preflight_response() -> Response<Full<Bytes>> {
    with_cors(Response::builder().status(StatusCode::OK))
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build compact JSON response with CORS headers
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => build_json(status, Bytes::from(json)),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_json(
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(INTERNAL_ERROR_BODY.as_bytes()),
            )
        }
    }
}

/// Build `{"error": message}` response
pub fn build_error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &ErrorBody { error: message })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut response = build_error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    response
        .headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static("POST, OPTIONS"));
    response
}

/// Build liveness probe response
pub fn build_health_response() -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &serde_json::json!({ "status": "ok" }))
}

fn build_json(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    with_cors(Response::builder().status(status))
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(Full::new(Bytes::from_static(INTERNAL_ERROR_BODY.as_bytes())))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
