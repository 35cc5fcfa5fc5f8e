//! Twirp protocol client for Rust.
//!
//! This crate provides the runtime that generated Twirp client facades call
//! into: a dispatcher that turns one typed request into one
//! `POST /twirp/{service}/{method}` exchange and one typed outcome.
//!
//! ## Features
//!
//! - JSON (`application/json`) and protobuf (`application/protobuf`) bodies
//! - Error taxonomy: every failed call yields a [`TwirpError`] with an
//!   [`ErrorKind`], a message and string metadata
//! - Pluggable transports: [`HyperTransport`] for the network,
//!   [`ServiceTransport`](transport::ServiceTransport) for any tower service
//! - Future-based and callback-based completion
//! - Per-call options and compile-time composed interceptors
//!
//! ## Example
//!
//! ```ignore
//! use twirp_client::{TwirpClient, method_descriptor, MethodDescriptor};
//!
//! const SPEAK: MethodDescriptor = method_descriptor!("us.xeserv.api.HelloWorld", "Speak");
//!
//! let client = TwirpClient::builder().build()?;
//!
//! let response = client
//!     .invoke::<Words, Translation>(&SPEAK, "http://localhost:3000", &words)
//!     .await?;
//!
//! match response.into_inner() {
//!     Some(translation) => println!("{}", translation.japanese),
//!     None => println!("(no content)"),
//! }
//! ```
//!
//! ## Outcomes
//!
//! | Situation                                   | Result                         |
//! |---------------------------------------------|--------------------------------|
//! | request cannot be encoded                   | `ErrorKind::MalformedRequest`  |
//! | no response (refused, DNS, timeout)         | `ErrorKind::TransportFailure`  |
//! | `204` / `205`                               | `Ok(None)`, body ignored       |
//! | `200` with a decodable body                 | `Ok(Some(message))`            |
//! | `200` with an empty or undecodable body     | `ErrorKind::MalformedResponse` |
//! | other status, Twirp error body              | `ErrorKind::Server(code)`      |
//! | other status, anything else in the body     | `ErrorKind::Unknown`           |
//!
//! ## Callbacks
//!
//! ```ignore
//! let handle = client.invoke_with_callbacks::<_, Translation, _, _>(
//!     &SPEAK,
//!     "http://localhost:3000",
//!     words,
//!     |response| println!("ok: {:?}", response.into_inner()),
//!     |err| eprintln!("failed: {err}"),
//! );
//!
//! // Suppresses the callback if it has not run yet; no-op afterwards.
//! handle.cancel();
//! ```
//!
//! ## Timeouts
//!
//! A timeout (on the transport, the builder, or [`CallOptions`]) bounds the
//! wait for a response. When it elapses the call fails with
//! `ErrorKind::TransportFailure`.
//!
//! ## Tracing
//!
//! With the `tracing` feature every call runs inside an `rpc.call` span
//! carrying the service, method, encoding and server address.

mod builder;
mod call;
mod client;
mod completion;
pub mod config;
pub mod response;
pub mod transport;

pub use builder::{BuildTransport, ClientBuildError, ClientBuilder, DefaultTransport};
pub use call::CallState;
pub use client::TwirpClient;
pub use completion::CallHandle;

// Re-export from config module
pub use config::{CallOptions, Chain, HeaderInterceptor, Intercept, InterceptContext, Interceptor};

// Re-export from response module
pub use response::{Metadata, TwirpResponse};

// Re-export transport types at the top level for convenience
pub use transport::{
    HyperTransport, HyperTransportBuilder, ServiceTransport, TlsClientConfig, Transport,
    TransportBody, TransportResponse,
};

// Re-export core types that users and generated code need
pub use twirp_client_core::{
    Code, Codec, CodecError, Decoded, ErrorBody, ErrorKind, JsonCodec, MethodDescriptor,
    ProtobufCodec, TwirpError, WireFormat, method_descriptor,
};
