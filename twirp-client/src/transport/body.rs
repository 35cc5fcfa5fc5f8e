//! Request body type for the HTTP transports.
//!
//! Twirp requests are always unary, so a body is either nothing or one
//! complete buffer.

use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};

/// A request body for Twirp calls.
///
/// [`TransportBody::Empty`] is what a null request body is sent as: zero
/// bytes on the wire, which is different from an encoded empty message
/// (`{}` in JSON).
#[derive(Default)]
pub enum TransportBody {
    /// Empty request body.
    #[default]
    Empty,
    /// Full request body with all data available.
    Full { data: Option<Bytes> },
}

impl TransportBody {
    /// Create an empty body.
    pub fn empty() -> Self {
        TransportBody::Empty
    }

    /// Create a body with the given data.
    pub fn full(data: Bytes) -> Self {
        TransportBody::Full { data: Some(data) }
    }

    /// Create a body from optional data; `None` is sent as an empty body.
    pub fn from_optional(data: Option<Bytes>) -> Self {
        match data {
            Some(data) => Self::full(data),
            None => Self::empty(),
        }
    }
}

impl Body for TransportBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            TransportBody::Empty => Poll::Ready(None),
            TransportBody::Full { data } => Poll::Ready(data.take().map(|d| Ok(Frame::data(d)))),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            TransportBody::Empty => true,
            TransportBody::Full { data } => data.is_none(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            TransportBody::Full { data: Some(d) } => SizeHint::with_exact(d.len() as u64),
            _ => SizeHint::with_exact(0),
        }
    }
}

impl std::fmt::Debug for TransportBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportBody::Empty => write!(f, "TransportBody::Empty"),
            TransportBody::Full { data } => f
                .debug_struct("TransportBody::Full")
                .field("data_len", &data.as_ref().map(|d| d.len()))
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_empty_body() {
        let body = TransportBody::empty();
        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));

        let collected = body.collect().await.unwrap();
        assert!(collected.to_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_full_body() {
        let data = Bytes::from(r#"{"english":"hello"}"#);
        let body = TransportBody::full(data.clone());
        assert!(!body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(data.len() as u64));

        let collected = body.collect().await.unwrap();
        assert_eq!(collected.to_bytes(), data);
    }

    #[tokio::test]
    async fn test_none_is_sent_as_empty() {
        let body = TransportBody::from_optional(None);
        assert!(matches!(body, TransportBody::Empty));
        assert!(body.collect().await.unwrap().to_bytes().is_empty());
    }
}
