//! Error response parsing.
//!
//! A non-success response carries a JSON body `{"code", "msg", "meta"}`
//! regardless of the message codec in use. Any non-empty code is taken as
//! the server sent it, including codes the protocol does not define. When
//! the body is anything else, the response most likely came from a proxy or
//! load balancer, so the error is reported as `Unknown` with enough metadata
//! to diagnose it.

use http::{HeaderMap, StatusCode, header};
use twirp_client_core::{Code, ErrorBody, TwirpError};

/// Meta key set to `"true"` when the error body was not a Twirp error.
pub const META_HTTP_ERROR_FROM_INTERMEDIARY: &str = "http_error_from_intermediary";
/// Meta key holding the numeric HTTP status.
pub const META_STATUS_CODE: &str = "status_code";
/// Meta key holding the raw response body (lossy UTF-8).
pub const META_BODY: &str = "body";
/// Meta key holding the Twirp code that best matches the HTTP status.
pub const META_INTERMEDIARY_CODE: &str = "intermediary_code";
/// Meta key holding the `Location` header of a redirect.
pub const META_LOCATION: &str = "location";

/// Turn a non-success response into a [`TwirpError`].
pub(crate) fn parse_error_response(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> TwirpError {
    let decoded = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|payload| TwirpError::from_body(payload).ok());

    match decoded {
        Some(err) => err,
        None => intermediary_error(status, headers, body),
    }
}

fn intermediary_error(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> TwirpError {
    let mut err = TwirpError::unknown(status_text(status))
        .with_meta(META_HTTP_ERROR_FROM_INTERMEDIARY, "true")
        .with_meta(META_STATUS_CODE, status.as_u16().to_string())
        .with_meta(META_INTERMEDIARY_CODE, Code::from_http_status(status).as_str())
        .with_meta(META_BODY, String::from_utf8_lossy(body));

    if status.is_redirection() {
        if let Some(location) = headers.get(header::LOCATION).and_then(|v| v.to_str().ok()) {
            err = err.with_meta(META_LOCATION, location);
        }
    }

    err
}

/// `"500 Internal Server Error"`, or just the number for unregistered codes.
fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use twirp_client_core::ErrorKind;

    #[test]
    fn test_twirp_error_body_is_propagated_verbatim() {
        let body = br#"{"code":"not_found","msg":"no such speaker","meta":{"speaker":"bob"}}"#;
        let err = parse_error_response(StatusCode::NOT_FOUND, &HeaderMap::new(), body);

        assert_eq!(err.kind(), ErrorKind::Server(Code::NotFound));
        assert_eq!(err.message(), "no such speaker");
        assert_eq!(err.meta("speaker"), Some("bob"));
        assert_eq!(err.meta(META_HTTP_ERROR_FROM_INTERMEDIARY), None);
    }

    #[test]
    fn test_code_is_trusted_over_status() {
        // A server may pick any status; the body's code wins.
        let body = br#"{"code":"resource_exhausted","msg":"slow down"}"#;
        let err = parse_error_response(StatusCode::BAD_GATEWAY, &HeaderMap::new(), body);
        assert_eq!(err.code(), Some(Code::ResourceExhausted));
        assert!(err.meta_map().is_empty());
    }

    #[test]
    fn test_unparsable_body_is_unknown() {
        let err = parse_error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &HeaderMap::new(),
            b"not json",
        );

        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.message(), "500 Internal Server Error");
        assert_eq!(err.meta(META_HTTP_ERROR_FROM_INTERMEDIARY), Some("true"));
        assert_eq!(err.meta(META_STATUS_CODE), Some("500"));
        assert_eq!(err.meta(META_BODY), Some("not json"));
        assert_eq!(err.meta(META_INTERMEDIARY_CODE), Some("unknown"));
    }

    #[test]
    fn test_server_defined_code_is_propagated() {
        let body = br#"{"code":"speaker_busy","msg":"speaker is busy","meta":{"retry":"5"}}"#;
        let err = parse_error_response(StatusCode::IM_A_TEAPOT, &HeaderMap::new(), body);

        assert_eq!(
            err.kind(),
            ErrorKind::Server(Code::Other("speaker_busy".to_string()))
        );
        assert_eq!(err.message(), "speaker is busy");
        assert_eq!(err.meta("retry"), Some("5"));
        assert_eq!(err.meta(META_HTTP_ERROR_FROM_INTERMEDIARY), None);
    }

    #[test]
    fn test_empty_code_is_unknown() {
        let body = br#"{"code":"","msg":"who knows"}"#;
        let err = parse_error_response(StatusCode::SERVICE_UNAVAILABLE, &HeaderMap::new(), body);

        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.message(), "503 Service Unavailable");
        assert_eq!(err.meta(META_INTERMEDIARY_CODE), Some("unavailable"));
    }

    #[test]
    fn test_redirect_records_location() {
        let mut headers = HeaderMap::new();
        headers.insert(header::LOCATION, HeaderValue::from_static("https://elsewhere/"));
        let err = parse_error_response(StatusCode::FOUND, &headers, b"");

        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.meta(META_LOCATION), Some("https://elsewhere/"));
        assert_eq!(err.meta(META_INTERMEDIARY_CODE), Some("internal"));
        assert_eq!(err.meta(META_BODY), Some(""));
    }

    #[test]
    fn test_unregistered_status_text() {
        let status = StatusCode::from_u16(599).unwrap();
        assert_eq!(status_text(status), "599");
    }

    #[test]
    fn test_invalid_utf8_body_is_lossy() {
        let err = parse_error_response(StatusCode::BAD_GATEWAY, &HeaderMap::new(), &[0xff, b'x']);
        assert_eq!(err.meta(META_BODY), Some("\u{fffd}x"));
    }
}
