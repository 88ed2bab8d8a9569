//! HTTP seam between the engine and the network.
//!
//! The engine only ever sees [`Transport`]; production code plugs in
//! [`ReqwestTransport`], tests plug in scripted doubles.

use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::TranscriptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TranscriptError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TranscriptError> {
        (**self).execute(request).await
    }
}

/// Production transport over a shared `reqwest::Client`.
///
/// No overall request timeout is set on the client; the engine bounds each
/// leg itself so the stage can be reported.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TranscriptError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .cookie_store(true)
            .gzip(true)
            .build()
            .map_err(|e| {
                TranscriptError::Config(format!("failed to build http client: {}", e))
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TranscriptError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TranscriptError::Config(format!("bad header name: {}", e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TranscriptError::Config(format!("bad header value: {}", e)))?;
            builder = builder.header(name, value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let t0 = Instant::now();
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        debug!(
            target: "transport.http",
            url = %request.url,
            status,
            body_bytes = body.len(),
            total_ms = %t0.elapsed().as_millis(),
            "http request finished"
        );

        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TranscriptError {
    let message = if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    TranscriptError::network(err.status().map(|s| s.as_u16()), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let req = HttpRequest::post("https://example.com", "{}")
            .header("Content-Type", "application/json")
            .header("X-Test", "1");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.body.as_deref(), Some("{}"));
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.header_value("missing"), None);
    }

    #[test]
    fn test_is_success() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}
