//! Message codecs.
//!
//! A [`Codec`] turns a typed message into wire bytes and wire bytes back into
//! a typed message. Codecs are pure: they never touch the network.
//!
//! - [`JsonCodec`]: `application/json` via serde_json
//! - [`ProtobufCodec`]: `application/protobuf` via prost
//!
//! # Example
//!
//! ```ignore
//! use twirp_client_core::{Codec, Decoded, CodecError, WireFormat};
//! use bytes::Bytes;
//!
//! struct CborCodec;
//!
//! impl WireFormat for CborCodec {
//!     fn name(&self) -> &'static str { "cbor" }
//!     fn content_type(&self) -> &'static str { "application/cbor" }
//! }
//!
//! impl<M: serde::Serialize + serde::de::DeserializeOwned> Codec<M> for CborCodec {
//!     fn encode(&self, message: &M) -> Result<Bytes, CodecError> { /* ... */ }
//!     fn decode(&self, bytes: &[u8]) -> Result<Decoded<M>, CodecError> { /* ... */ }
//! }
//! ```

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Codec failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The value cannot be represented in the wire format.
    #[error("encode error: {0}")]
    Encode(String),

    /// The bytes are malformed or do not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Result of decoding a body.
///
/// An empty or absent body is reported as [`Decoded::NoContent`], which is
/// distinct from a decoded empty message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded<M> {
    /// A message was decoded.
    Message(M),
    /// The body was empty.
    NoContent,
}

impl<M> Decoded<M> {
    /// Extract the message, if any.
    pub fn into_message(self) -> Option<M> {
        match self {
            Decoded::Message(m) => Some(m),
            Decoded::NoContent => None,
        }
    }

    /// Whether the body was empty.
    pub fn is_no_content(&self) -> bool {
        matches!(self, Decoded::NoContent)
    }
}

/// The message-independent half of a codec: what goes on the wire.
pub trait WireFormat: Send + Sync + 'static {
    /// Short encoding name (for tracing/debugging).
    fn name(&self) -> &'static str;

    /// The `Content-Type` (and `Accept`) header value for this codec.
    fn content_type(&self) -> &'static str;
}

/// Converts messages of type `M` to and from wire bytes.
pub trait Codec<M>: WireFormat {
    /// Encode a message.
    fn encode(&self, message: &M) -> Result<Bytes, CodecError>;

    /// Decode a message.
    fn decode(&self, bytes: &[u8]) -> Result<Decoded<M>, CodecError>;
}

/// JSON codec backed by serde_json.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonCodec;

/// Content type used by [`JsonCodec`].
pub const JSON_CONTENT_TYPE: &str = "application/json";

impl WireFormat for JsonCodec {
    fn name(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }
}

impl<M> Codec<M> for JsonCodec
where
    M: Serialize + DeserializeOwned,
{
    fn encode(&self, message: &M) -> Result<Bytes, CodecError> {
        serde_json::to_vec(message)
            .map(Bytes::from)
            .map_err(|e| CodecError::Encode(format!("JSON encoding failed: {}", e)))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Decoded<M>, CodecError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Decoded::NoContent);
        }
        serde_json::from_slice(bytes)
            .map(Decoded::Message)
            .map_err(|e| CodecError::Decode(format!("JSON decoding failed: {}", e)))
    }
}

/// Protobuf codec backed by prost.
///
/// Protobuf has no separate encoding for "nothing": an empty body is the
/// default message, so this codec never reports [`Decoded::NoContent`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProtobufCodec;

/// Content type used by [`ProtobufCodec`].
pub const PROTOBUF_CONTENT_TYPE: &str = "application/protobuf";

impl WireFormat for ProtobufCodec {
    fn name(&self) -> &'static str {
        "protobuf"
    }

    fn content_type(&self) -> &'static str {
        PROTOBUF_CONTENT_TYPE
    }
}

impl<M> Codec<M> for ProtobufCodec
where
    M: prost::Message + Default,
{
    fn encode(&self, message: &M) -> Result<Bytes, CodecError> {
        Ok(Bytes::from(message.encode_to_vec()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Decoded<M>, CodecError> {
        M::decode(bytes)
            .map(Decoded::Message)
            .map_err(|e| CodecError::Decode(format!("protobuf decoding failed: {}", e)))
    }
}
