//! HTTP transport layer.
//!
//! The dispatcher needs exactly one capability from the network: issue one
//! request and get back one response. That contract is the [`Transport`]
//! trait. Two backends are provided:
//!
//! - [`HyperTransport`]: pooled HTTP/1.1 + HTTP/2 client with rustls TLS
//! - [`ServiceTransport`]: any `tower::Service` (e.g. an in-process
//!   `axum::Router`), useful for tests and for layering tower middleware
//!
//! # Feature Flags
//!
//! TLS support for [`HyperTransport`] requires enabling the appropriate features:
//!
//! - `tls` (default) - Enables `tls-ring` + `tls-native-roots` for convenience
//! - `tls-ring` / `tls-aws-lc` - Crypto providers
//! - `tls-native-roots` / `tls-webpki-roots` - Root certificates

mod body;
mod connector;
mod hyper;
mod service;

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use http_body::Body;
use http_body_util::BodyExt;
use twirp_client_core::TwirpError;

pub use body::TransportBody;
pub use connector::{
    DangerousAcceptAnyCertVerifier, build_https_connector, danger_accept_invalid_certs_config,
    default_tls_config, has_tls_support,
};
pub use self::hyper::{HyperTransport, HyperTransportBuilder};
pub use service::ServiceTransport;

// Re-export rustls types that users might need for TLS configuration
pub use rustls::ClientConfig as TlsClientConfig;

/// Sends one HTTP request and yields one response.
///
/// Every call to [`send`](Transport::send) completes exactly once: either
/// with a [`TransportResponse`] (whatever its status) or with an error of
/// kind `TransportFailure` when no response could be obtained. Dropping the
/// returned future cancels the request.
pub trait Transport: Send + Sync + 'static {
    /// Send a request and wait for the complete response.
    fn send(
        &self,
        request: http::Request<TransportBody>,
    ) -> impl Future<Output = Result<TransportResponse, TwirpError>> + Send;
}

/// A complete HTTP response: status, headers and the whole body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TransportResponse {
    /// Create a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Read an HTTP response to the end.
    ///
    /// A body that fails mid-read means no usable response was obtained.
    pub async fn collect<B>(response: http::Response<B>) -> Result<Self, TwirpError>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TwirpError::transport(format!("failed to read response body: {}", e)))?
            .to_bytes();
        Ok(Self::new(parts.status, parts.headers, body))
    }

    /// The HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The response body (possibly empty).
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decompose into status, headers and body.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

/// Run a request future, turning an elapsed deadline into `TransportFailure`.
pub(crate) async fn within_deadline<F>(
    exchange: F,
    timeout: Option<Duration>,
) -> Result<TransportResponse, TwirpError>
where
    F: Future<Output = Result<TransportResponse, TwirpError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, exchange).await.map_err(|_| {
            TwirpError::transport(format!("no response within {}ms", limit.as_millis()))
        })?,
        None => exchange.await,
    }
}
