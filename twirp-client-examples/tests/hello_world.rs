//! The HelloWorld facade against the demo server over real TCP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use twirp_client::{Code, ErrorKind, HeaderInterceptor, TwirpClient};
use twirp_client_examples::{
    HelloWorldClient, SPEAK, Translation, Words, server, speak, speak_with_callbacks,
};

fn words(english: &str) -> Words {
    Words {
        english: english.to_string(),
    }
}

/// Demo router plus two misbehaving mounts: `/silent` answers 204 and
/// `/broken` answers a plain-text 500.
fn app() -> Router {
    let silent = Router::new().route(
        SPEAK.path(),
        post(|| async { StatusCode::NO_CONTENT.into_response() }),
    );
    let broken = Router::new().route(
        SPEAK.path(),
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "not json").into_response() }),
    );
    server::router()
        .nest("/silent", silent)
        .nest("/broken", broken)
}

async fn serve() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app()).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_speak_json() {
    let base = serve().await;
    let client = HelloWorldClient::new(&base).unwrap();

    let response = client.speak(&words("hello")).await.unwrap();
    assert_eq!(
        response.into_inner(),
        Some(Translation {
            japanese: "こんにちは".to_string()
        })
    );
}

#[tokio::test]
async fn test_speak_protobuf() {
    let base = serve().await;
    let client = TwirpClient::builder().use_protobuf().build().unwrap();

    let response = speak(&client, &base, &words("goodbye")).await.unwrap();
    assert_eq!(
        response.metadata().get("content-type"),
        Some("application/protobuf")
    );
    assert_eq!(response.into_inner().unwrap().japanese, "さようなら");
}

#[tokio::test]
async fn test_unknown_word_is_not_found() {
    let base = serve().await;
    let client = HelloWorldClient::new(&base).unwrap();

    let err = client.speak(&words("kyoto")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server(Code::NotFound));
    assert_eq!(err.message(), "no such speaker");
}

#[tokio::test]
async fn test_empty_word_carries_meta() {
    let base = serve().await;
    let client = HelloWorldClient::new(&base).unwrap();

    let err = client.speak(&words("")).await.unwrap_err();
    assert_eq!(err.code(), Some(Code::InvalidArgument));
    assert_eq!(err.meta("argument"), Some("english"));
}

#[tokio::test]
async fn test_no_content() {
    let base = serve().await;
    let client = HelloWorldClient::new(format!("{base}/silent")).unwrap();

    let response = client.speak(&words("hello")).await.unwrap();
    assert!(response.is_no_content());
}

#[tokio::test]
async fn test_plain_text_500_is_unknown() {
    let base = serve().await;
    let client = HelloWorldClient::new(format!("{base}/broken")).unwrap();

    let err = client.speak(&words("hello")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(err.message().contains("500 Internal Server Error"));
    assert_eq!(err.meta("status_code"), Some("500"));
    assert_eq!(err.meta("body"), Some("not json"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HelloWorldClient::new(format!("http://{addr}")).unwrap();
    let err = client.speak(&words("hello")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransportFailure);
}

#[tokio::test]
async fn test_interceptor_headers_are_sent() {
    let base = serve().await;
    let client = TwirpClient::builder()
        .with_interceptor(HeaderInterceptor::new("x-request-id", "abc"))
        .default_header("x-client", "hello-test")
        .build()
        .unwrap();
    let client = HelloWorldClient::with_client(client, base);

    let response = client.speak(&words("thank you")).await.unwrap();
    assert_eq!(response.get_ref().as_ref().unwrap().japanese, "ありがとう");
}

#[tokio::test]
async fn test_concurrent_calls() {
    let base = serve().await;
    let client = HelloWorldClient::new(&base).unwrap();
    let requests: Vec<Words> = ["hello", "goodbye", "thank you", "kyoto"]
        .repeat(8)
        .into_iter()
        .map(words)
        .collect();

    let outcomes =
        futures::future::join_all(requests.iter().map(|request| client.speak(request))).await;

    for (request, outcome) in requests.iter().zip(outcomes) {
        match server::translate(&request.english) {
            Some(japanese) => assert_eq!(outcome.unwrap().into_inner().unwrap().japanese, japanese),
            None => assert_eq!(outcome.unwrap_err().code(), Some(Code::NotFound)),
        }
    }
}

#[tokio::test]
async fn test_callbacks_exactly_once() {
    let base = serve().await;
    let client = TwirpClient::builder().build().unwrap();
    let successes = Arc::new(AtomicUsize::new(0));
    let errors = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = ["hello", "kyoto", "goodbye", ""]
        .into_iter()
        .map(|english| {
            let successes = successes.clone();
            let errors = errors.clone();
            speak_with_callbacks(
                &client,
                base.clone(),
                words(english),
                move |_| {
                    successes.fetch_add(1, Ordering::SeqCst);
                },
                move |_| {
                    errors.fetch_add(1, Ordering::SeqCst);
                },
            )
        })
        .collect();

    for handle in handles {
        assert!(handle.join().await);
    }
    assert_eq!(successes.load(Ordering::SeqCst), 2);
    assert_eq!(errors.load(Ordering::SeqCst), 2);
}
