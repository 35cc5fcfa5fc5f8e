//! Twirp client implementation.
//!
//! This module provides [`TwirpClient`], the dispatcher every generated
//! facade calls into. One call is strictly sequential:
//!
//! 1. encode the request (failure: `MalformedRequest`, nothing is sent)
//! 2. build `POST {server_address}/twirp/{service}/{method}`
//! 3. send it through the [`Transport`]
//! 4. classify the status: `204`/`205` succeed without a body, `200`
//!    decodes the response message, anything else decodes a Twirp error
//!
//! and ends in exactly one outcome. There are no retries.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Request, Uri, header};
use twirp_client_core::{
    Codec, CodecError, Decoded, Disposition, JsonCodec, MethodDescriptor, TwirpError, WireFormat,
    classify,
};

#[cfg(feature = "tracing")]
use tracing::Instrument;

use crate::builder::ClientBuilder;
use crate::call::{Call, CallState};
use crate::completion::{CallHandle, DeliveryGate};
use crate::config::{CallOptions, InterceptContext, Intercept};
use crate::response::{Metadata, TwirpResponse, parse_error_response};
use crate::transport::{HyperTransport, Transport, TransportBody, within_deadline};

/// Headers the client always sets itself. User-supplied values for these
/// are dropped.
const RESERVED_HEADERS: [header::HeaderName; 3] = [
    header::CONTENT_TYPE,
    header::ACCEPT,
    header::CONTENT_LENGTH,
];

/// Twirp client.
///
/// Generic over the transport `T`, the message codec `C` and the interceptor
/// chain `I`. The client holds no per-call state: one instance can serve any
/// number of concurrent calls to any number of servers.
///
/// Use [`ClientBuilder`] or [`TwirpClient::builder`] to create an instance.
///
/// # Example
///
/// ```ignore
/// use twirp_client::TwirpClient;
///
/// let client = TwirpClient::builder().build()?;
///
/// let response = client
///     .invoke::<Words, Translation>(&SPEAK, "http://localhost:3000", &words)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct TwirpClient<T = HyperTransport, C = JsonCodec, I = ()> {
    transport: T,
    codec: C,
    interceptor: I,
    default_headers: HeaderMap,
    default_timeout: Option<Duration>,
}

impl TwirpClient {
    /// Create a new [`ClientBuilder`].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<T, C, I> TwirpClient<T, C, I>
where
    T: Transport,
    C: WireFormat,
    I: Intercept,
{
    /// Create a new client. Prefer the builder API.
    pub(crate) fn new(
        transport: T,
        codec: C,
        interceptor: I,
        default_headers: HeaderMap,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            codec,
            interceptor,
            default_headers,
            default_timeout,
        }
    }

    /// The transport this client sends through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The `Content-Type`/`Accept` value sent with every call.
    pub fn content_type(&self) -> &'static str {
        self.codec.content_type()
    }

    /// The default timeout applied to calls without their own.
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }

    /// Call a method on the server at `server_address`.
    ///
    /// Resolves to `Some(message)` for a `200` answer and `None` for
    /// `204`/`205`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let response = client
    ///     .invoke::<Words, Translation>(&SPEAK, "http://localhost:3000", &words)
    ///     .await?;
    /// if let Some(translation) = response.into_inner() {
    ///     println!("{}", translation.japanese);
    /// }
    /// ```
    pub async fn invoke<Req, Res>(
        &self,
        descriptor: &MethodDescriptor,
        server_address: &str,
        request: &Req,
    ) -> Result<TwirpResponse<Option<Res>>, TwirpError>
    where
        C: Codec<Req> + Codec<Res>,
        Req: Sync,
    {
        self.invoke_with_options(descriptor, server_address, request, CallOptions::default())
            .await
    }

    /// Same as [`invoke`](Self::invoke) with per-call options.
    pub async fn invoke_with_options<Req, Res>(
        &self,
        descriptor: &MethodDescriptor,
        server_address: &str,
        request: &Req,
        options: CallOptions,
    ) -> Result<TwirpResponse<Option<Res>>, TwirpError>
    where
        C: Codec<Req> + Codec<Res>,
        Req: Sync,
    {
        self.execute(
            descriptor,
            server_address,
            |codec: &C| Codec::<Req>::encode(codec, request).map(Some),
            options,
        )
        .await
    }

    /// Call a method that takes no meaningful input.
    ///
    /// The request is sent with an empty body, which is different from an
    /// encoded empty message (`{}` in JSON).
    pub async fn invoke_empty<Res>(
        &self,
        descriptor: &MethodDescriptor,
        server_address: &str,
        options: CallOptions,
    ) -> Result<TwirpResponse<Option<Res>>, TwirpError>
    where
        C: Codec<Res>,
    {
        self.execute(descriptor, server_address, |_: &C| Ok(None), options)
            .await
    }

    /// Start a call in the background and deliver its outcome to a callback.
    ///
    /// Exactly one of `on_success` and `on_error` runs, exactly once, on the
    /// tokio runtime, unless the call is cancelled through the returned
    /// [`CallHandle`] before its outcome is delivered.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn invoke_with_callbacks<Req, Res, S, E>(
        &self,
        descriptor: &MethodDescriptor,
        server_address: impl Into<String>,
        request: Req,
        on_success: S,
        on_error: E,
    ) -> CallHandle
    where
        Self: Clone,
        C: Codec<Req> + Codec<Res>,
        Req: Send + Sync + 'static,
        Res: Send + 'static,
        S: FnOnce(TwirpResponse<Option<Res>>) + Send + 'static,
        E: FnOnce(TwirpError) + Send + 'static,
    {
        let client = self.clone();
        let descriptor = *descriptor;
        let server_address = server_address.into();
        let gate = Arc::new(DeliveryGate::default());
        let task_gate = gate.clone();

        let task = tokio::spawn(async move {
            let outcome = client
                .invoke::<Req, Res>(&descriptor, &server_address, &request)
                .await;
            if !task_gate.claim() {
                return false;
            }
            match outcome {
                Ok(response) => on_success(response),
                Err(err) => on_error(err),
            }
            true
        });

        CallHandle::new(gate, task)
    }

    async fn execute<Res, F>(
        &self,
        descriptor: &MethodDescriptor,
        server_address: &str,
        encode: F,
        options: CallOptions,
    ) -> Result<TwirpResponse<Option<Res>>, TwirpError>
    where
        C: Codec<Res>,
        F: FnOnce(&C) -> Result<Option<Bytes>, CodecError>,
    {
        let exchange = async {
            let mut call = Call::new(descriptor, server_address);
            let result = self.run(&mut call, encode, options).await;
            call.advance(CallState::Done);

            #[cfg(feature = "tracing")]
            match &result {
                Ok(_) => tracing::debug!(
                    elapsed_ms = call.elapsed().as_millis() as u64,
                    "call completed"
                ),
                Err(err) => tracing::debug!(
                    elapsed_ms = call.elapsed().as_millis() as u64,
                    error.kind = %err.kind(),
                    error.message = %err.message(),
                    "call failed"
                ),
            }

            debug_assert!(call.state().is_terminal());
            result
        };

        #[cfg(feature = "tracing")]
        let exchange = exchange.instrument(tracing::info_span!(
            "rpc.call",
            rpc.system = "twirp",
            rpc.service = %descriptor.service(),
            rpc.method = %descriptor.method(),
            rpc.encoding = %self.codec.name(),
            server.address = %server_address,
            otel.kind = "client",
        ));

        exchange.await
    }

    async fn run<Res, F>(
        &self,
        call: &mut Call<'_>,
        encode: F,
        options: CallOptions,
    ) -> Result<TwirpResponse<Option<Res>>, TwirpError>
    where
        C: Codec<Res>,
        F: FnOnce(&C) -> Result<Option<Bytes>, CodecError>,
    {
        call.advance(CallState::Encoding);
        let body = encode(&self.codec).map_err(|e| TwirpError::malformed_request(e.to_string()))?;
        let request = self.build_request(call, body, options.headers)?;

        call.advance(CallState::Sent);
        let timeout = options.timeout.or(self.default_timeout);
        let response = within_deadline(self.transport.send(request), timeout).await?;

        let (status, headers, body) = response.into_parts();
        self.interceptor.after_response(&headers);

        match classify(status) {
            Disposition::NoContent => {
                call.advance(CallState::DecodingSuccess);
                Ok(TwirpResponse::new(None, Metadata::new(headers)))
            }
            Disposition::DecodeMessage => {
                call.advance(CallState::DecodingSuccess);
                match Codec::<Res>::decode(&self.codec, &body) {
                    Ok(Decoded::Message(message)) => {
                        Ok(TwirpResponse::new(Some(message), Metadata::new(headers)))
                    }
                    Ok(Decoded::NoContent) => Err(TwirpError::malformed_response(format!(
                        "status {} with an empty body",
                        status.as_u16()
                    ))),
                    Err(e) => Err(TwirpError::malformed_response(e.to_string())),
                }
            }
            Disposition::DecodeError => {
                call.advance(CallState::DecodingError);
                Err(parse_error_response(status, &headers, &body))
            }
        }
    }

    fn build_request(
        &self,
        call: &Call<'_>,
        body: Option<Bytes>,
        call_headers: HeaderMap,
    ) -> Result<Request<TransportBody>, TwirpError> {
        let server_address = call.server_address();
        let uri: Uri = call.descriptor().url(server_address).parse().map_err(|e| {
            TwirpError::transport(format!("invalid server address {:?}: {}", server_address, e))
        })?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(TwirpError::transport(format!(
                "server address {:?} must include a scheme and host",
                server_address
            )));
        }

        let mut headers = self.default_headers.clone();
        headers.extend(call_headers);
        self.interceptor.before_request(&mut InterceptContext::new(
            call.descriptor().procedure(),
            &mut headers,
        ))?;

        for name in &RESERVED_HEADERS {
            headers.remove(name);
        }
        let content_type = HeaderValue::from_str(self.codec.content_type()).map_err(|_| {
            TwirpError::malformed_request(format!(
                "invalid content type {:?}",
                self.codec.content_type()
            ))
        })?;
        headers.insert(header::ACCEPT, content_type.clone());
        headers.insert(header::CONTENT_TYPE, content_type);

        let mut request = Request::new(TransportBody::from_optional(body));
        *request.method_mut() = Method::POST;
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HeaderInterceptor;
    use crate::transport::TransportResponse;
    use http::StatusCode;
    use http_body_util::BodyExt;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use twirp_client_core::{Code, ErrorKind, method_descriptor};

    const SPEAK: MethodDescriptor = method_descriptor!("us.xeserv.api.HelloWorld", "Speak");
    const ADDR: &str = "http://localhost:3000";

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Words {
        english: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Translation {
        japanese: String,
    }

    #[derive(Debug)]
    struct Seen {
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    }

    /// Answers every request with a fixed status and body, recording what
    /// it was sent.
    #[derive(Clone)]
    struct FixedTransport {
        status: StatusCode,
        body: &'static [u8],
        seen: Arc<Mutex<Vec<Seen>>>,
    }

    impl FixedTransport {
        fn new(status: StatusCode, body: &'static [u8]) -> Self {
            Self {
                status,
                body,
                seen: Arc::default(),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    impl Transport for FixedTransport {
        async fn send(
            &self,
            request: Request<TransportBody>,
        ) -> Result<TransportResponse, TwirpError> {
            let (parts, body) = request.into_parts();
            let body = body.collect().await.unwrap().to_bytes();
            self.seen.lock().unwrap().push(Seen {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                body,
            });
            Ok(TransportResponse::new(
                self.status,
                HeaderMap::new(),
                Bytes::from_static(self.body),
            ))
        }
    }

    fn client(transport: FixedTransport) -> TwirpClient<FixedTransport> {
        ClientBuilder::new().transport(transport).build().unwrap()
    }

    fn hello() -> Words {
        Words {
            english: "hello".into(),
        }
    }

    #[tokio::test]
    async fn test_request_shape() {
        let transport = FixedTransport::new(StatusCode::OK, r#"{"japanese":"こんにちは"}"#.as_bytes());
        let response = client(transport.clone())
            .invoke::<_, Translation>(&SPEAK, ADDR, &hello())
            .await
            .unwrap();
        assert_eq!(response.into_inner().unwrap().japanese, "こんにちは");

        let seen = transport.seen.lock().unwrap();
        let seen = &seen[0];
        assert_eq!(seen.method, Method::POST);
        assert_eq!(
            seen.uri.to_string(),
            "http://localhost:3000/twirp/us.xeserv.api.HelloWorld/Speak"
        );
        assert_eq!(seen.headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(seen.headers[header::ACCEPT], "application/json");
        assert_eq!(&seen.body[..], br#"{"english":"hello"}"#);
    }

    #[tokio::test]
    async fn test_encode_failure_sends_nothing() {
        let transport = FixedTransport::new(StatusCode::OK, b"{}");
        let mut unrepresentable = BTreeMap::new();
        unrepresentable.insert(vec![1u8], "x".to_string());

        let err = client(transport.clone())
            .invoke::<_, Translation>(&SPEAK, ADDR, &unrepresentable)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::MalformedRequest);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_address_sends_nothing() {
        let transport = FixedTransport::new(StatusCode::OK, b"{}");
        let client = client(transport.clone());

        for address in ["not an address", "localhost:3000", ""] {
            let err = client
                .invoke::<_, Translation>(&SPEAK, address, &hello())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TransportFailure, "{address:?}");
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_content_ignores_body() {
        for status in [StatusCode::NO_CONTENT, StatusCode::RESET_CONTENT] {
            let transport = FixedTransport::new(status, b"definitely not json");
            let response = client(transport)
                .invoke::<_, Translation>(&SPEAK, ADDR, &hello())
                .await
                .unwrap();
            assert!(response.is_no_content());
        }
    }

    #[tokio::test]
    async fn test_ok_with_empty_body_is_malformed() {
        let transport = FixedTransport::new(StatusCode::OK, b"");
        let err = client(transport)
            .invoke::<_, Translation>(&SPEAK, ADDR, &hello())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_ok_with_wrong_shape_is_malformed() {
        let transport = FixedTransport::new(StatusCode::OK, br#"{"japanese": 7}"#);
        let err = client(transport)
            .invoke::<_, Translation>(&SPEAK, ADDR, &hello())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn test_server_error() {
        let transport = FixedTransport::new(
            StatusCode::NOT_FOUND,
            br#"{"code":"not_found","msg":"no such speaker","meta":{}}"#,
        );
        let err = client(transport)
            .invoke::<_, Translation>(&SPEAK, ADDR, &hello())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server(Code::NotFound));
        assert_eq!(err.message(), "no such speaker");
    }

    #[tokio::test]
    async fn test_reserved_headers_are_not_overwritten() {
        let transport = FixedTransport::new(StatusCode::NO_CONTENT, b"");
        let client = ClientBuilder::new()
            .transport(transport.clone())
            .default_header("content-type", "text/plain")
            .default_header("x-default", "d")
            .with_interceptor(HeaderInterceptor::new("accept", "text/html"))
            .build()
            .unwrap();

        let options = CallOptions::new()
            .header("content-length", "999")
            .header("x-call", "c");
        client
            .invoke_with_options::<_, Translation>(&SPEAK, ADDR, &hello(), options)
            .await
            .unwrap();

        let seen = transport.seen.lock().unwrap();
        let headers = &seen[0].headers;
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        assert_eq!(headers[header::ACCEPT], "application/json");
        assert!(headers.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(headers["x-default"], "d");
        assert_eq!(headers["x-call"], "c");
    }

    #[tokio::test]
    async fn test_call_headers_override_defaults() {
        let transport = FixedTransport::new(StatusCode::NO_CONTENT, b"");
        let client = ClientBuilder::new()
            .transport(transport.clone())
            .default_header("x-tenant", "default")
            .build()
            .unwrap();

        client
            .invoke_with_options::<_, Translation>(
                &SPEAK,
                ADDR,
                &hello(),
                CallOptions::new().header("x-tenant", "override"),
            )
            .await
            .unwrap();

        assert_eq!(transport.seen.lock().unwrap()[0].headers["x-tenant"], "override");
    }

    #[tokio::test]
    async fn test_interceptor_error_sends_nothing() {
        let transport = FixedTransport::new(StatusCode::OK, b"{}");
        let client = ClientBuilder::new()
            .transport(transport.clone())
            .with_interceptor(crate::Interceptor::new(|_ctx: &mut InterceptContext<'_>| {
                Err(TwirpError::malformed_request("no credentials"))
            }))
            .build()
            .unwrap();

        let err = client
            .invoke::<_, Translation>(&SPEAK, ADDR, &hello())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "no credentials");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_invoke_empty_sends_empty_body() {
        let transport = FixedTransport::new(StatusCode::NO_CONTENT, b"");
        client(transport.clone())
            .invoke_empty::<Translation>(&SPEAK, ADDR, CallOptions::new())
            .await
            .unwrap();

        assert!(transport.seen.lock().unwrap()[0].body.is_empty());
    }

    #[tokio::test]
    async fn test_trailing_slash_address() {
        let transport = FixedTransport::new(StatusCode::NO_CONTENT, b"");
        client(transport.clone())
            .invoke::<_, Translation>(&SPEAK, "http://localhost:3000/", &hello())
            .await
            .unwrap();
        assert_eq!(
            transport.seen.lock().unwrap()[0].uri.path(),
            "/twirp/us.xeserv.api.HelloWorld/Speak"
        );
    }
}
