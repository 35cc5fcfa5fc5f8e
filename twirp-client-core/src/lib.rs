//! Core protocol types for Twirp clients.
//!
//! This crate provides the transport-independent pieces shared by every
//! Twirp client (`twirp-client`) and by generated service facades.
//!
//! ## Modules
//!
//! - [`error`]: Error codes, error kinds and the [`TwirpError`] type
//! - [`codec`]: Message codecs (JSON, protobuf)
//! - [`descriptor`]: Static method descriptors and URL composition
//! - [`classify`]: Response status classification table

mod classify;
mod codec;
mod descriptor;
mod error;

pub use classify::*;
pub use codec::*;
pub use descriptor::*;
pub use error::*;
