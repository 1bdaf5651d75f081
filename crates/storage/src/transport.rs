//! HTTP transport seam
//!
//! The client never talks to `reqwest` directly; it hands fully built
//! requests to a [`Transport`]. Tests substitute canned responses here.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use http::{Request, Response};
use thiserror::Error;

use crate::body::Body;

/// Network-level failure: no HTTP response was received
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("Request timeout: {err}")
        } else if err.is_connect() {
            format!("Connection error: {err}")
        } else {
            err.to_string()
        };
        Self { message }
    }
}

/// Sends one request and returns its response
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError>;
}

/// [`Transport`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport; `timeout` bounds each whole request
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request<Body>) -> Result<Response<Body>, TransportError> {
        let (parts, body) = request.into_parts();

        let mut builder = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers);
        if !body.is_empty() {
            builder = builder.body(body.into_reqwest());
        }

        let response = builder.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let stream = response.bytes_stream().map_err(io::Error::other);

        let mut out = Response::new(Body::from_stream(stream));
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        Ok(out)
    }
}
