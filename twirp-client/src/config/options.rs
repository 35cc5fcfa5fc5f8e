//! Per-call settings layered over the client defaults.

use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue};

use crate::builder::ClientBuildError;

/// Settings for one Twirp call.
///
/// The timeout replaces the client's default for this call. Headers are
/// merged over the client's default headers, replacing values with the same
/// name; `content-type`, `accept` and `content-length` belong to the
/// dispatcher and are dropped.
///
/// ```ignore
/// let options = CallOptions::new()
///     .timeout(Duration::from_secs(2))
///     .header("x-request-id", "req-42");
///
/// speak_with_options(&client, "http://localhost:3000", &words, options).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub(crate) timeout: Option<Duration>,
    pub(crate) headers: HeaderMap,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up waiting for the response after `timeout`; the call then
    /// fails with `ErrorKind::TransportFailure`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send `name: value` with this call.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `value` is not a valid header; use
    /// [`try_header`](Self::try_header) for untrusted input.
    pub fn header(self, name: &str, value: &str) -> Self {
        match self.try_header(name, value) {
            Ok(options) => options,
            Err(e) => panic!("{e}"),
        }
    }

    /// Like [`header`](Self::header), reporting a bad name or value.
    pub fn try_header(mut self, name: &str, value: &str) -> Result<Self, ClientBuildError> {
        let name: HeaderName = name
            .parse()
            .map_err(|_| ClientBuildError::InvalidHeader(format!("invalid header name: {name}")))?;
        let value: HeaderValue = value.parse().map_err(|_| {
            ClientBuildError::InvalidHeader(format!("invalid header value for {name}"))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Send every entry of `headers` with this call, e.g. metadata carried
    /// over from an earlier response.
    pub fn forward_headers(mut self, headers: &HeaderMap) -> Self {
        for (name, value) in headers {
            self.headers.append(name, value.clone());
        }
        self
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn call_headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_defer_to_client() {
        let options = CallOptions::new();
        assert_eq!(options.call_timeout(), None);
        assert!(options.call_headers().is_empty());
    }

    #[test]
    fn test_later_header_replaces_earlier() {
        let options = CallOptions::new()
            .timeout(Duration::from_millis(250))
            .header("x-request-id", "first")
            .header("x-request-id", "second");

        assert_eq!(options.call_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(options.call_headers()["x-request-id"], "second");
        assert_eq!(options.call_headers().len(), 1);
    }

    #[test]
    fn test_try_header_reports_which_part_is_bad() {
        match CallOptions::new().try_header("bad name", "v") {
            Err(ClientBuildError::InvalidHeader(message)) => {
                assert_eq!(message, "invalid header name: bad name")
            }
            other => panic!("unexpected {other:?}"),
        }
        match CallOptions::new().try_header("x-speaker", "line\nbreak") {
            Err(ClientBuildError::InvalidHeader(message)) => {
                assert_eq!(message, "invalid header value for x-speaker")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "invalid header name")]
    fn test_header_panics_on_bad_name() {
        let _ = CallOptions::new().header("bad name", "v");
    }

    #[test]
    fn test_forward_headers_keeps_repeated_values() {
        let mut incoming = HeaderMap::new();
        incoming.append("x-trace", HeaderValue::from_static("a"));
        incoming.append("x-trace", HeaderValue::from_static("b"));

        let options = CallOptions::new().forward_headers(&incoming);
        let values: Vec<_> = options.call_headers().get_all("x-trace").iter().collect();
        assert_eq!(values, ["a", "b"]);
    }
}
