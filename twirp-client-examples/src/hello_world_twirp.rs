//! Client facade for `us.xeserv.api.HelloWorld`.
//!
//! This module has the shape a Twirp code generator emits for
//!
//! ```proto
//! package us.xeserv.api;
//!
//! service HelloWorld {
//!   rpc Speak(Words) returns (Translation);
//! }
//!
//! message Words { string english = 1; }
//! message Translation { string japanese = 1; }
//! ```
//!
//! Every function forwards to the dispatcher with its fixed descriptor.

use serde::{Deserialize, Serialize};
use twirp_client::{
    CallHandle, CallOptions, ClientBuildError, Codec, HyperTransport, Intercept, JsonCodec,
    MethodDescriptor, Transport, TwirpClient, TwirpError, TwirpResponse, WireFormat,
    method_descriptor,
};

/// Fully qualified service name.
pub const SERVICE_NAME: &str = "us.xeserv.api.HelloWorld";

/// `HelloWorld.Speak`
pub const SPEAK: MethodDescriptor = method_descriptor!("us.xeserv.api.HelloWorld", "Speak");

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, prost::Message)]
pub struct Words {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub english: String,
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, prost::Message)]
pub struct Translation {
    #[prost(string, tag = "1")]
    #[serde(default)]
    pub japanese: String,
}

/// Call `Speak` on the server at `server_address`.
pub async fn speak<T, C, I>(
    client: &TwirpClient<T, C, I>,
    server_address: &str,
    words: &Words,
) -> Result<TwirpResponse<Option<Translation>>, TwirpError>
where
    T: Transport,
    C: Codec<Words> + Codec<Translation>,
    I: Intercept,
{
    client.invoke(&SPEAK, server_address, words).await
}

/// Call `Speak` with per-call options.
pub async fn speak_with_options<T, C, I>(
    client: &TwirpClient<T, C, I>,
    server_address: &str,
    words: &Words,
    options: CallOptions,
) -> Result<TwirpResponse<Option<Translation>>, TwirpError>
where
    T: Transport,
    C: Codec<Words> + Codec<Translation>,
    I: Intercept,
{
    client
        .invoke_with_options(&SPEAK, server_address, words, options)
        .await
}

/// Call `Speak` in the background; exactly one of the callbacks runs.
pub fn speak_with_callbacks<T, C, I, S, E>(
    client: &TwirpClient<T, C, I>,
    server_address: impl Into<String>,
    words: Words,
    on_success: S,
    on_error: E,
) -> CallHandle
where
    TwirpClient<T, C, I>: Clone,
    T: Transport,
    C: Codec<Words> + Codec<Translation>,
    I: Intercept,
    S: FnOnce(TwirpResponse<Option<Translation>>) + Send + 'static,
    E: FnOnce(TwirpError) + Send + 'static,
{
    client.invoke_with_callbacks(&SPEAK, server_address, words, on_success, on_error)
}

/// `HelloWorld` client bound to one server.
#[derive(Clone, Debug)]
pub struct HelloWorldClient<T = HyperTransport, C = JsonCodec, I = ()> {
    client: TwirpClient<T, C, I>,
    server_address: String,
}

impl HelloWorldClient {
    /// JSON client over the default hyper transport.
    pub fn new(server_address: impl Into<String>) -> Result<Self, ClientBuildError> {
        Ok(Self::with_client(
            TwirpClient::builder().build()?,
            server_address,
        ))
    }
}

impl<T, C, I> HelloWorldClient<T, C, I>
where
    T: Transport,
    C: WireFormat,
    I: Intercept,
{
    /// Bind an existing client to a server address.
    pub fn with_client(client: TwirpClient<T, C, I>, server_address: impl Into<String>) -> Self {
        Self {
            client,
            server_address: server_address.into(),
        }
    }

    pub fn server_address(&self) -> &str {
        &self.server_address
    }

    pub fn inner(&self) -> &TwirpClient<T, C, I> {
        &self.client
    }

    pub async fn speak(&self, words: &Words) -> Result<TwirpResponse<Option<Translation>>, TwirpError>
    where
        C: Codec<Words> + Codec<Translation>,
    {
        speak(&self.client, &self.server_address, words).await
    }

    pub async fn speak_with_options(
        &self,
        words: &Words,
        options: CallOptions,
    ) -> Result<TwirpResponse<Option<Translation>>, TwirpError>
    where
        C: Codec<Words> + Codec<Translation>,
    {
        speak_with_options(&self.client, &self.server_address, words, options).await
    }

    pub fn speak_with_callbacks<S, E>(&self, words: Words, on_success: S, on_error: E) -> CallHandle
    where
        TwirpClient<T, C, I>: Clone,
        C: Codec<Words> + Codec<Translation>,
        S: FnOnce(TwirpResponse<Option<Translation>>) + Send + 'static,
        E: FnOnce(TwirpError) + Send + 'static,
    {
        speak_with_callbacks(
            &self.client,
            self.server_address.clone(),
            words,
            on_success,
            on_error,
        )
    }
}
