//! Interceptors for the Twirp client.
//!
//! Interceptors add cross-cutting logic to every call: authentication
//! headers, request ids, logging. They run after the request is encoded and
//! before anything is sent; an error from `before_request` aborts the call
//! without touching the network.
//!
//! # Example
//!
//! ```ignore
//! use twirp_client::{HeaderInterceptor, Interceptor, InterceptContext, TwirpClient};
//!
//! let auth = HeaderInterceptor::new("authorization", "Bearer token123");
//! let logging = Interceptor::new(|ctx: &mut InterceptContext<'_>| {
//!     println!("calling {}", ctx.procedure);
//!     Ok(())
//! });
//!
//! let client = TwirpClient::builder()
//!     .with_interceptor(auth)
//!     .with_interceptor(logging)
//!     .build()?;
//! ```

use http::{HeaderMap, HeaderName, HeaderValue};
use twirp_client_core::TwirpError;

use crate::builder::ClientBuildError;

/// Context for a call that interceptors can inspect and modify.
#[derive(Debug)]
pub struct InterceptContext<'a> {
    /// The procedure being called (e.g. `"us.xeserv.api.HelloWorld/Speak"`).
    pub procedure: &'a str,
    /// HTTP headers for the request.
    pub headers: &'a mut HeaderMap,
}

impl<'a> InterceptContext<'a> {
    /// Create a new intercept context.
    pub fn new(procedure: &'a str, headers: &'a mut HeaderMap) -> Self {
        Self { procedure, headers }
    }
}

/// Trait for intercepting Twirp calls.
///
/// Interceptors compose at compile time through [`Chain`]; the unit type
/// `()` is the empty chain.
pub trait Intercept: Send + Sync + 'static {
    /// Called before the request is sent.
    ///
    /// Returning an error aborts the call; the error is delivered as the
    /// call's outcome.
    fn before_request(&self, ctx: &mut InterceptContext<'_>) -> Result<(), TwirpError> {
        let _ = ctx;
        Ok(())
    }

    /// Called with the response headers once a response arrived.
    fn after_response(&self, headers: &HeaderMap) {
        let _ = headers;
    }
}

impl Intercept for () {
    #[inline]
    fn before_request(&self, _ctx: &mut InterceptContext<'_>) -> Result<(), TwirpError> {
        Ok(())
    }

    #[inline]
    fn after_response(&self, _headers: &HeaderMap) {}
}

/// A compile-time chain of two interceptors.
///
/// `Chain<A, B>` applies `A` then `B` to requests, and `B` then `A` to
/// responses.
#[derive(Clone, Debug)]
pub struct Chain<A, B>(pub A, pub B);

impl<A, B> Intercept for Chain<A, B>
where
    A: Intercept,
    B: Intercept,
{
    #[inline]
    fn before_request(&self, ctx: &mut InterceptContext<'_>) -> Result<(), TwirpError> {
        self.0.before_request(ctx)?;
        self.1.before_request(ctx)
    }

    #[inline]
    fn after_response(&self, headers: &HeaderMap) {
        self.1.after_response(headers);
        self.0.after_response(headers);
    }
}

/// An interceptor that sets one header on every request.
#[derive(Clone, Debug)]
pub struct HeaderInterceptor {
    name: HeaderName,
    value: HeaderValue,
}

impl HeaderInterceptor {
    /// Create a new header interceptor.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.parse().expect("invalid header name"),
            value: value.parse().expect("invalid header value"),
        }
    }

    /// Try to create a new header interceptor, returning an error if invalid.
    pub fn try_new(name: &str, value: &str) -> Result<Self, ClientBuildError> {
        let name = name
            .parse()
            .map_err(|_| ClientBuildError::InvalidHeader(format!("invalid header name: {}", name)))?;
        let value = value.parse().map_err(|_| {
            ClientBuildError::InvalidHeader(format!("invalid header value: {}", value))
        })?;
        Ok(Self { name, value })
    }

    /// Create a new header interceptor from pre-parsed values.
    pub fn from_parts(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }
}

impl Intercept for HeaderInterceptor {
    fn before_request(&self, ctx: &mut InterceptContext<'_>) -> Result<(), TwirpError> {
        ctx.headers.insert(self.name.clone(), self.value.clone());
        Ok(())
    }
}

/// Adapts a closure to the [`Intercept`] trait.
pub struct Interceptor<F> {
    before: F,
}

impl<F> Interceptor<F>
where
    F: Fn(&mut InterceptContext<'_>) -> Result<(), TwirpError> + Send + Sync + 'static,
{
    /// Create a new interceptor from a closure.
    pub fn new(before: F) -> Self {
        Self { before }
    }
}

impl<F: Clone> Clone for Interceptor<F> {
    fn clone(&self) -> Self {
        Self {
            before: self.before.clone(),
        }
    }
}

impl<F> std::fmt::Debug for Interceptor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor").finish()
    }
}

impl<F> Intercept for Interceptor<F>
where
    F: Fn(&mut InterceptContext<'_>) -> Result<(), TwirpError> + Send + Sync + 'static,
{
    fn before_request(&self, ctx: &mut InterceptContext<'_>) -> Result<(), TwirpError> {
        (self.before)(ctx)
    }
}
