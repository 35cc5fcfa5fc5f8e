//! Response types for Twirp client calls.
//!
//! [`TwirpResponse`] wraps the outcome of a successful call together with the
//! HTTP headers the server sent back.

mod error_parser;

pub(crate) use error_parser::parse_error_response;
pub use error_parser::{
    META_BODY, META_HTTP_ERROR_FROM_INTERMEDIARY, META_INTERMEDIARY_CODE, META_LOCATION,
    META_STATUS_CODE,
};

use http::HeaderMap;
use std::ops::Deref;

/// Response wrapper for Twirp client calls.
///
/// The dispatcher hands back `TwirpResponse<Option<Res>>`: `Some` when the
/// server answered `200` with a message, `None` for `204`/`205`.
///
/// # Example
///
/// ```ignore
/// let response = client.invoke::<Words, Translation>(&SPEAK, addr, &words).await?;
///
/// if let Some(value) = response.metadata().get("x-served-by") {
///     println!("served by {value}");
/// }
///
/// let translation = response.into_inner();
/// ```
#[derive(Debug, Clone)]
pub struct TwirpResponse<T> {
    inner: T,
    metadata: Metadata,
}

impl<T> TwirpResponse<T> {
    /// Create a new response with the given value and metadata.
    pub fn new(inner: T, metadata: Metadata) -> Self {
        Self { inner, metadata }
    }

    /// Extract the inner value, discarding metadata.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Get a reference to the response metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Transform the inner value, preserving metadata.
    pub fn map<U, F>(self, f: F) -> TwirpResponse<U>
    where
        F: FnOnce(T) -> U,
    {
        TwirpResponse {
            inner: f(self.inner),
            metadata: self.metadata,
        }
    }

    /// Get a reference to the inner value.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Decompose into inner value and metadata.
    pub fn into_parts(self) -> (T, Metadata) {
        (self.inner, self.metadata)
    }
}

impl<T> TwirpResponse<Option<T>> {
    /// True when the server answered without a body (`204`/`205`).
    pub fn is_no_content(&self) -> bool {
        self.inner.is_none()
    }
}

impl<T> Deref for TwirpResponse<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> AsRef<T> for TwirpResponse<T> {
    fn as_ref(&self) -> &T {
        &self.inner
    }
}

/// Response metadata wrapper around HTTP headers.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    headers: HeaderMap,
}

impl Metadata {
    /// Create new metadata from HTTP headers.
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Create empty metadata.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a header value by name.
    ///
    /// Returns `None` if the header is not present or is not visible ASCII.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    /// Check if a header exists.
    pub fn contains(&self, key: &str) -> bool {
        self.headers.contains_key(key)
    }

    /// Get all values for a header that appears multiple times.
    pub fn get_all(&self, key: &str) -> impl Iterator<Item = &str> {
        self.headers
            .get_all(key)
            .iter()
            .filter_map(|v| v.to_str().ok())
    }

    /// Get the underlying HeaderMap.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Consume self and return the underlying HeaderMap.
    pub fn into_headers(self) -> HeaderMap {
        self.headers
    }

    /// Returns true if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl From<HeaderMap> for Metadata {
    fn from(headers: HeaderMap) -> Self {
        Self::new(headers)
    }
}
