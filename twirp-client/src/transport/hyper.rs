//! Hyper-based HTTP transport.
//!
//! This module provides [`HyperTransport`], the default network transport,
//! built on hyper_util's pooled legacy client.

use std::time::Duration;

use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use rustls::ClientConfig;
use twirp_client_core::TwirpError;

use super::body::TransportBody;
use super::connector::{build_https_connector, danger_accept_invalid_certs_config, default_tls_config};
use super::{Transport, TransportResponse, within_deadline};
use crate::builder::ClientBuildError;

/// Type alias for the hyper client with HTTPS connector.
type HyperClient = Client<HttpsConnector<HttpConnector>, TransportBody>;

/// HTTP transport using hyper_util's legacy client.
///
/// Supports HTTP/1.1 and HTTP/2 (negotiated via ALPN over TLS), plain
/// `http://` addresses, and connection pooling. Cloning is cheap; clones
/// share the connection pool.
///
/// # Example
///
/// ```ignore
/// use twirp_client::transport::HyperTransport;
/// use std::time::Duration;
///
/// let transport = HyperTransport::builder()
///     .timeout(Duration::from_secs(10))
///     .build()?;
///
/// let client = TwirpClient::builder().transport(transport).build()?;
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
    /// Maximum wait for a response, if any.
    timeout: Option<Duration>,
    /// Whether HTTP/2 only mode is enabled.
    http2_only: bool,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("timeout", &self.timeout)
            .field("http2_only", &self.http2_only)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport builder.
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::new()
    }

    /// Create a new transport with default settings.
    pub fn new() -> Result<Self, ClientBuildError> {
        Self::builder().build()
    }

    /// The configured response timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Check if this transport is configured for HTTP/2 only.
    pub fn is_http2_only(&self) -> bool {
        self.http2_only
    }
}

impl Transport for HyperTransport {
    async fn send(
        &self,
        request: http::Request<TransportBody>,
    ) -> Result<TransportResponse, TwirpError> {
        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| TwirpError::transport(format!("request failed: {}", e)))?;
            TransportResponse::collect(response).await
        };
        within_deadline(exchange, self.timeout).await
    }
}

/// Builder for [`HyperTransport`].
pub struct HyperTransportBuilder {
    /// Custom TLS configuration.
    tls_config: Option<ClientConfig>,
    /// Maximum wait for a response.
    timeout: Option<Duration>,
    /// Force HTTP/2 only (for h2c or when HTTP/2 is required).
    http2_only: bool,
    /// Connection pool idle timeout.
    pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host.
    pool_max_idle_per_host: usize,
    /// Whether to accept invalid certificates (dangerous!).
    danger_accept_invalid_certs: bool,
}

impl Default for HyperTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransportBuilder {
    /// Create a new transport builder with default settings.
    pub fn new() -> Self {
        Self {
            tls_config: None,
            timeout: None,
            http2_only: false,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
            danger_accept_invalid_certs: false,
        }
    }

    /// Set a custom TLS configuration (custom roots, client certificates, ...).
    pub fn tls_config(mut self, config: ClientConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Maximum time to wait for a complete response.
    ///
    /// When it elapses the call fails with `ErrorKind::TransportFailure`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable HTTP/2 only mode (prior knowledge, no HTTP/1.1 upgrade).
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    /// Set the connection pool idle timeout.
    ///
    /// Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Disable connection pool idle timeout.
    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    /// Set the maximum number of idle connections per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Accept invalid TLS certificates.
    ///
    /// # Warning
    ///
    /// Only for development/testing.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.danger_accept_invalid_certs = true;
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HyperTransport, ClientBuildError> {
        let tls_config = if self.danger_accept_invalid_certs {
            danger_accept_invalid_certs_config()
        } else {
            self.tls_config.or_else(default_tls_config)
        };
        let tls_config = tls_config.ok_or(ClientBuildError::NoTlsConfig)?;

        let mut builder = Client::builder(TokioExecutor::new());

        // Required for pool_idle_timeout to work
        builder.pool_timer(TokioTimer::new());

        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);

        if self.http2_only {
            builder.http2_only(true);
        }

        let client = builder.build(build_https_connector(tls_config));

        Ok(HyperTransport {
            client,
            timeout: self.timeout,
            http2_only: self.http2_only,
        })
    }
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("tls_config", &self.tls_config.is_some())
            .field("timeout", &self.timeout)
            .field("http2_only", &self.http2_only)
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .field("danger_accept_invalid_certs", &self.danger_accept_invalid_certs)
            .finish()
    }
}
