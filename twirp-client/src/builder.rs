//! Client builder for the Twirp client.
//!
//! Provides a fluent API for configuring and building a [`TwirpClient`].
//! There is no base URL here: the server address is an
//! argument of every call.

use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};
use twirp_client_core::{JsonCodec, ProtobufCodec, WireFormat};

use crate::client::TwirpClient;
use crate::config::{Chain, Intercept};
use crate::transport::{HyperTransport, Transport};

/// Error type for client building failures.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// No TLS configuration could be built for the default transport.
    #[error(
        "no TLS configuration available: enable a crypto provider and root certificate feature or supply a ClientConfig"
    )]
    NoTlsConfig,
    /// A header name or value did not parse.
    #[error("{0}")]
    InvalidHeader(String),
}

/// Produces the transport a [`ClientBuilder`] hands to the client.
///
/// Implemented for every [`Transport`] (used as-is) and for
/// [`DefaultTransport`] (a fresh [`HyperTransport`]).
pub trait BuildTransport {
    /// The transport type the client ends up with.
    type Transport: Transport;

    /// Produce the transport.
    fn build_transport(self) -> Result<Self::Transport, ClientBuildError>;
}

/// Placeholder for "no transport chosen": `build` creates a [`HyperTransport`]
/// with default settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTransport;

impl BuildTransport for DefaultTransport {
    type Transport = HyperTransport;

    fn build_transport(self) -> Result<HyperTransport, ClientBuildError> {
        HyperTransport::new()
    }
}

impl<T: Transport> BuildTransport for T {
    type Transport = T;

    fn build_transport(self) -> Result<T, ClientBuildError> {
        Ok(self)
    }
}

/// Builder for creating a [`TwirpClient`].
///
/// # Example
///
/// ```ignore
/// use twirp_client::{ClientBuilder, HeaderInterceptor};
/// use std::time::Duration;
///
/// let client = ClientBuilder::new()
///     .timeout(Duration::from_secs(10))
///     .default_header("user-agent", "hello-cli/1.0")
///     .with_interceptor(HeaderInterceptor::new("authorization", "Bearer t"))
///     .build()?;
/// ```
pub struct ClientBuilder<T = DefaultTransport, C = JsonCodec, I = ()> {
    transport: T,
    codec: C,
    interceptor: I,
    default_headers: HeaderMap,
    default_timeout: Option<Duration>,
    /// First invalid `default_header`, reported by `build`.
    header_error: Option<String>,
}

impl<T, C, I> std::fmt::Debug for ClientBuilder<T, C, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("transport", &std::any::type_name::<T>())
            .field("codec", &std::any::type_name::<C>())
            .field("default_headers", &self.default_headers)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Create a builder with the default transport, the JSON codec and no
    /// interceptors.
    pub fn new() -> Self {
        Self {
            transport: DefaultTransport,
            codec: JsonCodec,
            interceptor: (),
            default_headers: HeaderMap::new(),
            default_timeout: None,
            header_error: None,
        }
    }
}

impl<T, C, I> ClientBuilder<T, C, I> {
    /// Use a specific transport.
    ///
    /// ```ignore
    /// let transport = HyperTransport::builder().http2_only(true).build()?;
    /// let client = ClientBuilder::new().transport(transport).build()?;
    /// ```
    pub fn transport<T2: Transport>(self, transport: T2) -> ClientBuilder<T2, C, I> {
        ClientBuilder {
            transport,
            codec: self.codec,
            interceptor: self.interceptor,
            default_headers: self.default_headers,
            default_timeout: self.default_timeout,
            header_error: self.header_error,
        }
    }

    /// Use a specific message codec.
    pub fn codec<C2: WireFormat>(self, codec: C2) -> ClientBuilder<T, C2, I> {
        ClientBuilder {
            transport: self.transport,
            codec,
            interceptor: self.interceptor,
            default_headers: self.default_headers,
            default_timeout: self.default_timeout,
            header_error: self.header_error,
        }
    }

    /// Use JSON bodies (`application/json`). This is the default.
    pub fn use_json(self) -> ClientBuilder<T, JsonCodec, I> {
        self.codec(JsonCodec)
    }

    /// Use protobuf bodies (`application/protobuf`).
    pub fn use_protobuf(self) -> ClientBuilder<T, ProtobufCodec, I> {
        self.codec(ProtobufCodec)
    }

    /// Add an interceptor.
    ///
    /// Interceptors run in the order they are added.
    pub fn with_interceptor<J: Intercept>(self, interceptor: J) -> ClientBuilder<T, C, Chain<I, J>> {
        ClientBuilder {
            transport: self.transport,
            codec: self.codec,
            interceptor: Chain(self.interceptor, interceptor),
            default_headers: self.default_headers,
            default_timeout: self.default_timeout,
            header_error: self.header_error,
        }
    }

    /// Set the default timeout for calls.
    ///
    /// When it elapses the call fails with `ErrorKind::TransportFailure`.
    /// Individual calls can override it with [`CallOptions::timeout`].
    ///
    /// [`CallOptions::timeout`]: crate::CallOptions::timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Send a header with every call.
    ///
    /// An invalid name or value makes [`build`](Self::build) fail.
    pub fn default_header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Display,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Display,
    {
        if self.header_error.is_some() {
            return self;
        }
        match (name.try_into(), value.try_into()) {
            (Ok(name), Ok(value)) => {
                self.default_headers.insert(name, value);
            }
            (Err(e), _) => self.header_error = Some(format!("invalid header name: {}", e)),
            (_, Err(e)) => self.header_error = Some(format!("invalid header value: {}", e)),
        }
        self
    }
}

impl<T, C, I> ClientBuilder<T, C, I>
where
    T: BuildTransport,
    C: WireFormat,
    I: Intercept,
{
    /// Build the client.
    ///
    /// # Errors
    ///
    /// Fails if a default header was invalid, or if the default transport
    /// has no TLS configuration available.
    pub fn build(self) -> Result<TwirpClient<T::Transport, C, I>, ClientBuildError> {
        if let Some(message) = self.header_error {
            return Err(ClientBuildError::InvalidHeader(message));
        }
        let transport = self.transport.build_transport()?;

        Ok(TwirpClient::new(
            transport,
            self.codec,
            self.interceptor,
            self.default_headers,
            self.default_timeout,
        ))
    }
}
