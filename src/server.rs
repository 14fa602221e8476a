//! HTTP API Service
//!
//! A small JSON-over-HTTP service exposing the detector, one task per
//! connection. Requests are HTTP/1.1 with Content-Length bodies only and
//! connections close after each response, which keeps the wire handling
//! to a request-line/header parse and a bounded body read.
//!
//! Routes:
//!
//! - `POST /api/check_url` — classify a URL; 503 when no model is loaded
//! - `POST /api/train` — train from the configured dataset, synthesizing
//!   one when the file is absent, then swap the model in atomically
//! - `GET /`, `/style.css`, `/script.js` — embedded frontend assets

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::dataset::Dataset;
use crate::detector::UrlDetector;
use crate::error::DetectorError;
use crate::features::UrlFeatures;
use crate::synth;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const STYLE_CSS: &str = include_str!("../assets/style.css");
const SCRIPT_JS: &str = include_str!("../assets/script.js");

/// Upper bound on the request head (request line + headers).
const MAX_HEAD_SIZE: usize = 16 * 1024;

#[derive(Debug, Deserialize)]
struct CheckUrlRequest {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Serialize)]
struct CheckUrlResponse {
    prediction: String,
    confidence: f64,
    features: UrlFeatures,
}

#[derive(Debug, Serialize)]
struct TrainResponse {
    message: String,
    accuracy: f64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Parsed inbound request.
#[derive(Debug)]
struct HttpRequest {
    method: String,
    path: String,
    body: Vec<u8>,
}

/// Outbound response, written in one shot.
struct HttpResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl HttpResponse {
    fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_else(|_| b"{}".to_vec());
        Self {
            status,
            content_type: "application/json",
            body,
        }
    }

    fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::json(
            status,
            &ErrorResponse {
                error: message.into(),
            },
        )
    }

    fn asset(content_type: &'static str, body: &str) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.as_bytes().to_vec(),
        }
    }

    fn reason(status: u16) -> &'static str {
        match status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            503 => "Service Unavailable",
            _ => "Internal Server Error",
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status,
            Self::reason(self.status),
            self.content_type,
            self.body.len()
        );
        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

/// The JSON API server.
pub struct ApiServer {
    detector: Arc<UrlDetector>,
}

impl ApiServer {
    pub fn new(detector: Arc<UrlDetector>) -> Self {
        Self { detector }
    }

    /// Bind and serve until SIGINT/SIGTERM.
    pub async fn run(self, bind: &str) -> Result<()> {
        let listener = TcpListener::bind(bind)
            .await
            .with_context(|| format!("binding {bind}"))?;
        info!(addr = %bind, "API server listening");

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            debug!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    let detector = self.detector.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(detector, stream).await {
                            debug!(peer = %peer, error = %e, "connection error");
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("shutdown signal received, stopping API server");
                    return Ok(());
                }
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = ctrl_c.await;
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}

async fn handle_connection(detector: Arc<UrlDetector>, mut stream: TcpStream) -> Result<()> {
    let max_body = detector.config().server.max_body_size;
    let response = match read_request(&mut stream, max_body).await {
        Ok(request) => respond(detector, request).await,
        Err(e) => HttpResponse::api_error(400, format!("malformed request: {e}")),
    };
    stream.write_all(&response.to_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Read one request: head until the blank line, then a Content-Length
/// body, both bounded.
async fn read_request(stream: &mut TcpStream, max_body_size: usize) -> Result<HttpRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = find_blank_line(&buf) {
            break pos;
        }
        if buf.len() > MAX_HEAD_SIZE {
            bail!("request head too large");
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            bail!("connection closed mid-request");
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..head_end]).context("request head is not UTF-8")?;
    let (method, path, content_length) = parse_head(head)?;
    if content_length > max_body_size {
        bail!("request body exceeds {max_body_size} bytes");
    }

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            bail!("connection closed mid-body");
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(HttpRequest { method, path, body })
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Parse the request line and the Content-Length header.
fn parse_head(head: &str) -> Result<(String, String, usize)> {
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().context("missing method")?.to_string();
    let path = parts.next().context("missing path")?.to_string();

    let mut content_length = 0usize;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                content_length = value
                    .trim()
                    .parse()
                    .context("invalid Content-Length header")?;
            }
        }
    }

    Ok((method, path, content_length))
}

async fn respond(detector: Arc<UrlDetector>, request: HttpRequest) -> HttpResponse {
    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/api/check_url") => check_url(&detector, &request.body),
        ("POST", "/api/train") => {
            // Training is CPU-bound; keep it off the accept loop.
            let detector = detector.clone();
            match tokio::task::spawn_blocking(move || train_model(&detector)).await {
                Ok(response) => response,
                Err(e) => {
                    error!(error = %e, "training task panicked");
                    HttpResponse::api_error(500, "training task failed")
                }
            }
        }
        ("GET", "/") | ("GET", "/index.html") => HttpResponse::asset("text/html", INDEX_HTML),
        ("GET", "/style.css") => HttpResponse::asset("text/css", STYLE_CSS),
        ("GET", "/script.js") => HttpResponse::asset("application/javascript", SCRIPT_JS),
        _ => HttpResponse::api_error(404, "not found"),
    }
}

fn check_url(detector: &UrlDetector, body: &[u8]) -> HttpResponse {
    let request: CheckUrlRequest = match serde_json::from_slice(body) {
        Ok(r) => r,
        Err(e) => return HttpResponse::api_error(400, format!("invalid request body: {e}")),
    };
    if request.url.is_empty() {
        return HttpResponse::api_error(400, "no URL provided");
    }

    match detector.predict(&request.url) {
        Ok(prediction) => HttpResponse::json(
            200,
            &CheckUrlResponse {
                prediction: prediction.verdict.to_string(),
                confidence: prediction.confidence,
                features: prediction.features,
            },
        ),
        Err(DetectorError::ModelNotLoaded) => HttpResponse::api_error(
            503,
            "model unavailable: train a model first via POST /api/train",
        ),
        Err(e) => {
            error!(error = %e, "prediction failed");
            HttpResponse::api_error(500, e.to_string())
        }
    }
}

/// Train from the configured dataset file, synthesizing a dataset when
/// the file is absent. Explicit train-endpoint behavior, never triggered
/// by prediction.
fn train_model(detector: &UrlDetector) -> HttpResponse {
    let config = detector.config();
    let dataset = if config.dataset_path.exists() {
        match Dataset::read_csv(&config.dataset_path) {
            Ok(dataset) => dataset,
            Err(e) => {
                error!(error = %e, "failed to read dataset");
                return HttpResponse::api_error(500, e.to_string());
            }
        }
    } else {
        info!(
            samples = config.synth.samples,
            ratio = config.synth.phishing_ratio,
            "no dataset on disk, synthesizing one"
        );
        let mut rng = StdRng::from_entropy();
        Dataset::from_labeled_urls(synth::generate(
            config.synth.samples,
            config.synth.phishing_ratio,
            &mut rng,
        ))
    };

    let mut rng = StdRng::from_entropy();
    match detector.train(&dataset, &mut rng) {
        Ok(report) => HttpResponse::json(
            200,
            &TrainResponse {
                message: "model trained successfully".to_string(),
                accuracy: report.accuracy,
            },
        ),
        Err(e) => {
            error!(error = %e, "training failed");
            HttpResponse::api_error(500, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DetectorConfig;

    fn unloaded_detector() -> Arc<UrlDetector> {
        Arc::new(UrlDetector::new(DetectorConfig::default()))
    }

    #[test]
    fn parses_request_line_and_content_length() {
        let head = "POST /api/check_url HTTP/1.1\r\nHost: localhost\r\nContent-Length: 21";
        let (method, path, len) = parse_head(head).unwrap();
        assert_eq!(method, "POST");
        assert_eq!(path, "/api/check_url");
        assert_eq!(len, 21);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let head = "POST / HTTP/1.1\r\ncontent-LENGTH: 7";
        let (_, _, len) = parse_head(head).unwrap();
        assert_eq!(len, 7);
    }

    #[test]
    fn rejects_garbage_request_lines() {
        assert!(parse_head("").is_err());
        assert!(parse_head("GET").is_err());
    }

    #[tokio::test]
    async fn unknown_routes_are_404() {
        let request = HttpRequest {
            method: "GET".to_string(),
            path: "/nope".to_string(),
            body: Vec::new(),
        };
        let response = respond(unloaded_detector(), request).await;
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn check_url_without_model_is_503() {
        let request = HttpRequest {
            method: "POST".to_string(),
            path: "/api/check_url".to_string(),
            body: br#"{"url": "http://example.com"}"#.to_vec(),
        };
        let response = respond(unloaded_detector(), request).await;
        assert_eq!(response.status, 503);
    }

    #[tokio::test]
    async fn check_url_with_bad_json_is_400() {
        let request = HttpRequest {
            method: "POST".to_string(),
            path: "/api/check_url".to_string(),
            body: b"not json".to_vec(),
        };
        let response = respond(unloaded_detector(), request).await;
        assert_eq!(response.status, 400);
    }

    #[tokio::test]
    async fn empty_url_is_400() {
        let request = HttpRequest {
            method: "POST".to_string(),
            path: "/api/check_url".to_string(),
            body: br#"{"url": ""}"#.to_vec(),
        };
        let response = respond(unloaded_detector(), request).await;
        assert_eq!(response.status, 400);
    }

    #[test]
    fn responses_carry_content_length() {
        let response = HttpResponse::api_error(404, "not found");
        let bytes = response.to_bytes();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains(&format!("Content-Length: {}", response.body.len())));
    }
}
