//! Request dispatch module
//!
//! Entry point for HTTP request processing. There is one route; the
//! method alone decides what happens to a request.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, HeaderValue, REFERER, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode};

use super::error::DiagnoseError;
use super::upload::{self, UploadedFile};
use crate::config::{AppState, Config, HealthConfig};
use crate::diagnosis::{self, DiagnosisResult};
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
///
/// Never fails: every fault is converted into an error response here.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let config = &state.config;
    let mut entry = access_entry(&req, remote_addr);

    let mut response = route_request(req, config, &mut entry).await;

    if let Ok(server_name) = HeaderValue::from_str(&config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch on method, then run the upload pipeline for POST
async fn route_request<B>(
    req: Request<B>,
    config: &Config,
    entry: &mut AccessLogEntry,
) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match req.method() {
        &Method::OPTIONS => return http::build_preflight_response(),
        &Method::POST => {}
        &Method::GET if is_health_probe(req.uri().path(), &config.routes.health) => {
            return http::build_health_response();
        }
        method => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            return http::build_405_response();
        }
    }

    match diagnose_upload(req, config.http.max_body_size).await {
        Ok((file, result)) => {
            logger::log_debug(&format!(
                "Diagnosed upload: {} bytes, filename={}, content-type={}, matched={}",
                file.content.len(),
                file.file_name.as_deref().unwrap_or("-"),
                file.content_type.as_deref().unwrap_or("-"),
                result.hash.as_deref().unwrap_or("none"),
            ));
            entry.upload_bytes = Some(file.content.len());
            entry.diagnosis_hash.clone_from(&result.hash);
            http::json_response(StatusCode::OK, &result)
        }
        Err(e) => {
            if e.status().is_server_error() {
                logger::log_error(&format!("Diagnosis failed: {e}"));
            } else {
                logger::log_warning(&format!("Rejected upload: {e}"));
            }
            e.into_response()
        }
    }
}

/// Body size check, multipart parse, signature lookup
async fn diagnose_upload<B>(
    req: Request<B>,
    max_body_size: u64,
) -> Result<(UploadedFile, DiagnosisResult), DiagnoseError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    upload::check_body_size(req.headers(), max_body_size)?;
    let boundary = upload::multipart_boundary(req.headers())?;

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = upload::read_body(req.into_body(), limit).await?;
    let file = upload::extract_image(body, boundary).await?;

    let result = diagnosis::diagnose(&file.content);
    Ok((file, result))
}

fn is_health_probe(path: &str, health: &HealthConfig) -> bool {
    health.enabled && path == health.path
}

fn access_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}
