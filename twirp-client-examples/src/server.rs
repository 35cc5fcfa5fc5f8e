//! Demo `HelloWorld` server.
//!
//! Accepts JSON and protobuf requests and answers in the request's encoding.
//! Errors are always Twirp JSON error bodies.

use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use twirp_client::{Code, Codec, ErrorBody, JsonCodec, ProtobufCodec, WireFormat};

use crate::hello_world_twirp::{SPEAK, Translation, Words};

/// Words the demo server knows, with their translations.
pub const DICTIONARY: &[(&str, &str)] = &[
    ("hello", "こんにちは"),
    ("goodbye", "さようなら"),
    ("thank you", "ありがとう"),
];

/// Router serving `HelloWorld.Speak`.
pub fn router() -> Router {
    Router::new().route(SPEAK.path(), post(speak))
}

/// Look a word up in [`DICTIONARY`].
pub fn translate(english: &str) -> Option<&'static str> {
    DICTIONARY
        .iter()
        .find(|(word, _)| word.eq_ignore_ascii_case(english.trim()))
        .map(|(_, japanese)| *japanese)
}

async fn speak(headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type == ProtobufCodec.content_type() {
        respond(ProtobufCodec, &body)
    } else if content_type == JsonCodec.content_type() {
        respond(JsonCodec, &body)
    } else {
        twirp_error(ErrorBody::new(
            Code::BadRoute,
            format!("unexpected content type {content_type:?}"),
        ))
    }
}

fn respond<C>(codec: C, body: &[u8]) -> Response
where
    C: Codec<Words> + Codec<Translation>,
{
    let words: Words = match Codec::<Words>::decode(&codec, body) {
        Ok(decoded) => decoded.into_message().unwrap_or_default(),
        Err(e) => {
            return twirp_error(ErrorBody::new(Code::Malformed, e.to_string()));
        }
    };

    if words.english.trim().is_empty() {
        return twirp_error(
            ErrorBody::new(Code::InvalidArgument, "english must not be empty")
                .with_meta("argument", "english"),
        );
    }

    let Some(japanese) = translate(&words.english) else {
        tracing::info!(english = %words.english, "no translation");
        return twirp_error(ErrorBody::new(Code::NotFound, "no such speaker"));
    };

    let translation = Translation {
        japanese: japanese.to_string(),
    };
    match Codec::<Translation>::encode(&codec, &translation) {
        Ok(bytes) => ([(header::CONTENT_TYPE, codec.content_type())], bytes).into_response(),
        Err(e) => twirp_error(ErrorBody::new(Code::Internal, e.to_string())),
    }
}

/// Twirp error response: the code's HTTP status and a JSON body.
pub fn twirp_error(body: ErrorBody) -> Response {
    let status = body
        .code
        .parse::<Code>()
        .map(|code| code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, axum::Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate() {
        assert_eq!(translate("hello"), Some("こんにちは"));
        assert_eq!(translate(" Goodbye "), Some("さようなら"));
        assert_eq!(translate("kyoto"), None);
    }

    #[test]
    fn test_twirp_error_status() {
        let response = twirp_error(ErrorBody::new(Code::NotFound, "no such speaker"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = twirp_error(ErrorBody::new(Code::InvalidArgument, "empty"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
