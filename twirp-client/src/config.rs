//! Request-level configuration for the Twirp client.
//!
//! - [`CallOptions`]: Per-call timeout and headers
//! - [`Intercept`]: Request/response interception

mod interceptor;
mod options;

pub use interceptor::{Chain, HeaderInterceptor, Intercept, InterceptContext, Interceptor};
pub use options::CallOptions;
