//! Transport backed by any tower service.

use std::fmt::Display;
use std::time::Duration;

use http_body::Body;
use tower::{BoxError, ServiceExt};
use tower_service::Service;
use twirp_client_core::TwirpError;

use super::body::TransportBody;
use super::{Transport, TransportResponse, within_deadline};

/// Adapts a `tower::Service` over HTTP into a [`Transport`].
///
/// The service is cloned for every call, so each call drives its own
/// handle. An `axum::Router` works directly, which lets a client talk to a
/// server in the same process without opening a socket.
///
/// # Example
///
/// ```ignore
/// use twirp_client::{TwirpClient, transport::ServiceTransport};
///
/// let router = axum::Router::new().route("/twirp/pkg.Service/Method", post(handler));
/// let client = TwirpClient::builder()
///     .transport(ServiceTransport::new(router))
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct ServiceTransport<S> {
    service: S,
    timeout: Option<Duration>,
}

impl<S> ServiceTransport<S> {
    /// Wrap a service.
    pub fn new(service: S) -> Self {
        Self {
            service,
            timeout: None,
        }
    }

    /// Maximum time to wait for a complete response.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get a reference to the wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.service
    }
}

fn service_error<E: Into<BoxError>>(context: &'static str) -> impl FnOnce(E) -> TwirpError {
    move |e| {
        let e: BoxError = e.into();
        TwirpError::transport(format!("{}: {}", context, e))
    }
}

impl<S, B> Transport for ServiceTransport<S>
where
    S: Service<http::Request<TransportBody>, Response = http::Response<B>>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send,
    B: Body + Send,
    B::Data: Send,
    B::Error: Display,
{
    async fn send(
        &self,
        request: http::Request<TransportBody>,
    ) -> Result<TransportResponse, TwirpError> {
        let mut service = self.service.clone();
        let exchange = async move {
            let response = service
                .ready()
                .await
                .map_err(service_error("service not ready"))?
                .call(request)
                .await
                .map_err(service_error("request failed"))?;
            TransportResponse::collect(response).await
        };
        within_deadline(exchange, self.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::BodyExt;
    use std::convert::Infallible;
    use tower::service_fn;

    #[tokio::test]
    async fn test_service_transport_echoes_body() {
        let echo = service_fn(|req: http::Request<TransportBody>| async move {
            let body = req.into_body().collect().await.unwrap().to_bytes();
            Ok::<_, Infallible>(
                http::Response::builder()
                    .status(StatusCode::OK)
                    .body(TransportBody::full(body))
                    .unwrap(),
            )
        });
        let transport = ServiceTransport::new(echo);

        let request = http::Request::post("/twirp/echo.Echo/Echo")
            .body(TransportBody::full(Bytes::from_static(b"ping")))
            .unwrap();
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), &Bytes::from_static(b"ping"));
    }

    #[tokio::test]
    async fn test_service_error_is_transport_failure() {
        let failing = service_fn(|_req: http::Request<TransportBody>| async move {
            Err::<http::Response<TransportBody>, _>(std::io::Error::other("connection reset"))
        });
        let transport = ServiceTransport::new(failing);

        let request = http::Request::post("/").body(TransportBody::empty()).unwrap();
        let err = transport.send(request).await.unwrap_err();

        assert_eq!(err.kind(), twirp_client_core::ErrorKind::TransportFailure);
        assert_eq!(err.message(), "request failed: connection reset");
    }

    #[tokio::test(start_paused = true)]
    async fn test_service_timeout() {
        let slow = service_fn(|_req: http::Request<TransportBody>| async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, Infallible>(http::Response::new(TransportBody::empty()))
        });
        let transport = ServiceTransport::new(slow).with_timeout(Duration::from_secs(1));

        let request = http::Request::post("/").body(TransportBody::empty()).unwrap();
        let err = transport.send(request).await.unwrap_err();
        assert_eq!(err.kind(), twirp_client_core::ErrorKind::TransportFailure);
    }
}
