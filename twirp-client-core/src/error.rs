//! Twirp error codes and the client-facing error type.
//!
//! This module provides the core error types used by the Twirp protocol:
//! - [`Code`]: Error codes a Twirp server may report
//! - [`ErrorKind`]: Why a call did not yield a normal response
//! - [`TwirpError`]: The single error value surfaced to callers
//! - [`ErrorBody`]: The JSON error payload on the wire

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use http::StatusCode;
use serde::{Deserialize, Serialize, Serializer};

/// Twirp error codes.
///
/// The protocol defines the first eighteen variants. Servers may report
/// codes of their own; those arrive as [`Code::Other`] with the wire name
/// unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Code {
    Canceled,
    Unknown,
    InvalidArgument,
    Malformed,
    DeadlineExceeded,
    NotFound,
    BadRoute,
    AlreadyExists,
    PermissionDenied,
    Unauthenticated,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    /// A code outside the protocol's set, as the server spelled it.
    Other(String),
}

impl Code {
    /// All codes, in protocol order.
    pub const ALL: [Code; 18] = [
        Code::Canceled,
        Code::Unknown,
        Code::InvalidArgument,
        Code::Malformed,
        Code::DeadlineExceeded,
        Code::NotFound,
        Code::BadRoute,
        Code::AlreadyExists,
        Code::PermissionDenied,
        Code::Unauthenticated,
        Code::ResourceExhausted,
        Code::FailedPrecondition,
        Code::Aborted,
        Code::OutOfRange,
        Code::Unimplemented,
        Code::Internal,
        Code::Unavailable,
        Code::DataLoss,
    ];

    /// Code for a wire name: a protocol code when the name is one, else
    /// [`Code::Other`].
    pub fn from_wire(name: &str) -> Code {
        name.parse().unwrap_or_else(|_| Code::Other(name.to_string()))
    }

    /// Whether this is one of the protocol-defined codes.
    pub fn is_protocol_code(&self) -> bool {
        !matches!(self, Code::Other(_))
    }

    /// Get the wire name of this code.
    pub fn as_str(&self) -> &str {
        match self {
            Code::Canceled => "canceled",
            Code::Unknown => "unknown",
            Code::InvalidArgument => "invalid_argument",
            Code::Malformed => "malformed",
            Code::DeadlineExceeded => "deadline_exceeded",
            Code::NotFound => "not_found",
            Code::BadRoute => "bad_route",
            Code::AlreadyExists => "already_exists",
            Code::PermissionDenied => "permission_denied",
            Code::Unauthenticated => "unauthenticated",
            Code::ResourceExhausted => "resource_exhausted",
            Code::FailedPrecondition => "failed_precondition",
            Code::Aborted => "aborted",
            Code::OutOfRange => "out_of_range",
            Code::Unimplemented => "unimplemented",
            Code::Internal => "internal",
            Code::Unavailable => "unavailable",
            Code::DataLoss => "dataloss",
            Code::Other(name) => name,
        }
    }

    /// The HTTP status a Twirp server responds with for this code.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Code::Canceled | Code::DeadlineExceeded => StatusCode::REQUEST_TIMEOUT,
            Code::InvalidArgument | Code::Malformed | Code::OutOfRange => StatusCode::BAD_REQUEST,
            Code::NotFound | Code::BadRoute => StatusCode::NOT_FOUND,
            Code::AlreadyExists | Code::Aborted => StatusCode::CONFLICT,
            Code::PermissionDenied => StatusCode::FORBIDDEN,
            Code::Unauthenticated => StatusCode::UNAUTHORIZED,
            Code::ResourceExhausted => StatusCode::TOO_MANY_REQUESTS,
            Code::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
            Code::Unimplemented => StatusCode::NOT_IMPLEMENTED,
            Code::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Code::Unknown | Code::Internal | Code::DataLoss | Code::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Best-effort code for a response that did not come from a Twirp server
    /// (a proxy, load balancer or other intermediary answered instead).
    pub fn from_http_status(status: StatusCode) -> Code {
        match status.as_u16() {
            300..=399 => Code::Internal,
            400 => Code::Internal,
            401 => Code::Unauthenticated,
            403 => Code::PermissionDenied,
            404 => Code::BadRoute,
            429 | 502..=504 => Code::Unavailable,
            _ => Code::Unknown,
        }
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a protocol-defined [`Code`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid twirp error code: {0:?}")]
pub struct ParseCodeError(String);

impl FromStr for Code {
    type Err = ParseCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Code::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| ParseCodeError(s.to_string()))
    }
}

/// Why a call did not yield a normal response.
///
/// This is a closed set; it only grows together with the wire protocol.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request could not be encoded. Nothing was sent.
    MalformedRequest,
    /// No response was obtained (connection refused, DNS failure, timeout).
    TransportFailure,
    /// The server answered 200 but the body does not decode as the response.
    MalformedResponse,
    /// The server reported a structured error with this code.
    Server(Code),
    /// Non-success status with a body that is not a Twirp error.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MalformedRequest => f.write_str("malformed_request"),
            ErrorKind::TransportFailure => f.write_str("transport_failure"),
            ErrorKind::MalformedResponse => f.write_str("malformed_response"),
            ErrorKind::Server(code) => write!(f, "server_{}", code),
            ErrorKind::Unknown => f.write_str("unknown"),
        }
    }
}

/// The error outcome of a Twirp call.
///
/// Every failed call produces exactly one `TwirpError` carrying a kind,
/// a human readable message and string metadata.
///
/// # Example
///
/// ```
/// use twirp_client_core::{Code, ErrorKind, TwirpError};
///
/// let err = TwirpError::server(Code::NotFound, "no such speaker")
///     .with_meta("speaker", "kyoto");
/// assert_eq!(err.kind(), ErrorKind::Server(Code::NotFound));
/// assert_eq!(err.code(), Some(Code::NotFound));
/// assert_eq!(err.meta("speaker"), Some("kyoto"));
/// assert_eq!(err.to_string(), "server_not_found: no such speaker");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TwirpError {
    kind: ErrorKind,
    message: String,
    meta: BTreeMap<String, String>,
}

impl TwirpError {
    /// Create a new error with a kind and message.
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
            meta: BTreeMap::new(),
        }
    }

    /// Create a `MalformedRequest` error.
    pub fn malformed_request<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::MalformedRequest, message)
    }

    /// Create a `TransportFailure` error.
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::TransportFailure, message)
    }

    /// Create a `MalformedResponse` error.
    pub fn malformed_response<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::MalformedResponse, message)
    }

    /// Create a server-reported error.
    pub fn server<S: Into<String>>(code: Code, message: S) -> Self {
        Self::new(ErrorKind::Server(code), message)
    }

    /// Create an `Unknown` error.
    pub fn unknown<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Build a server error from a decoded wire payload.
    ///
    /// Code, message and meta are kept as sent. Fails only for an empty code.
    pub fn from_body(body: ErrorBody) -> Result<Self, ParseCodeError> {
        if body.code.is_empty() {
            return Err(ParseCodeError(body.code));
        }
        Ok(Self {
            kind: ErrorKind::Server(Code::from_wire(&body.code)),
            message: body.msg,
            meta: body.meta,
        })
    }

    /// Attach a metadata entry.
    pub fn with_meta<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind.clone()
    }

    /// Get the server-reported code, if the server reported one.
    pub fn code(&self) -> Option<Code> {
        match &self.kind {
            ErrorKind::Server(code) => Some(code.clone()),
            _ => None,
        }
    }

    /// Whether the server reported this error.
    pub fn is_server(&self) -> bool {
        matches!(self.kind, ErrorKind::Server(_))
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get a metadata value.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    /// Get all metadata.
    pub fn meta_map(&self) -> &BTreeMap<String, String> {
        &self.meta
    }
}

/// JSON body of a Twirp error response.
///
/// ```json
/// {"code": "not_found", "msg": "no such speaker", "meta": {"speaker": "kyoto"}}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, String>,
}

impl ErrorBody {
    /// Create a body for a code and message.
    pub fn new<S: Into<String>>(code: Code, msg: S) -> Self {
        Self {
            code: code.as_str().to_string(),
            msg: msg.into(),
            meta: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_meta<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}
