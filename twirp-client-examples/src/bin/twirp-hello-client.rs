//! Demo Twirp client for `us.xeserv.api.HelloWorld`.
//!
//! Usage:
//!   # First, start the server in another terminal:
//!   cargo run --bin twirp-hello-server
//!
//!   # Then run the client (defaults to http://localhost:3000):
//!   cargo run --bin twirp-hello-client
//!
//!   # Or specify a custom server URL:
//!   cargo run --bin twirp-hello-client -- http://localhost:8080

use std::time::Duration;

use twirp_client::{CallOptions, Code, ErrorKind, TwirpClient};
use twirp_client_examples::{HelloWorldClient, Words, init_tracing, server_url, speak};

fn words(english: &str) -> Words {
    Words {
        english: english.to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let base_url = server_url();

    println!("=== Twirp HelloWorld client ===");
    println!("Server URL: {}", base_url);
    println!();

    // Test 1: JSON encoding
    println!("Test 1: Speak with JSON encoding...");
    {
        let client = HelloWorldClient::new(&base_url)?;
        let response = client.speak(&words("hello")).await?;

        let translation = response.into_inner();
        anyhow::ensure!(
            translation.as_ref().map(|t| t.japanese.as_str()) == Some("こんにちは"),
            "unexpected translation {:?}",
            translation
        );
        println!("  PASS: {:?}", translation);
    }

    // Test 2: protobuf encoding through the free facade function
    println!("Test 2: Speak with protobuf encoding...");
    {
        let client = TwirpClient::builder()
            .use_protobuf()
            .timeout(Duration::from_secs(5))
            .build()?;
        let response = speak(&client, &base_url, &words("goodbye")).await?;

        println!(
            "  PASS: {:?} ({} metadata headers)",
            response.get_ref(),
            response.metadata().headers().len()
        );
    }

    // Test 3: server error
    println!("Test 3: Speak with an unknown word...");
    {
        let client = HelloWorldClient::new(&base_url)?;
        match client.speak(&words("kyoto")).await {
            Err(err) if err.kind() == ErrorKind::Server(Code::NotFound) => {
                println!("  PASS: {}", err);
            }
            other => anyhow::bail!("expected not_found, got {:?}", other),
        }
    }

    // Test 4: per-call options
    println!("Test 4: Speak with call options...");
    {
        let client = HelloWorldClient::new(&base_url)?;
        let options = CallOptions::new()
            .timeout(Duration::from_secs(2))
            .header("x-request-id", "demo-4");
        let response = client.speak_with_options(&words("thank you"), options).await?;
        println!("  PASS: {:?}", response.get_ref());
    }

    // Test 5: callback completion
    println!("Test 5: Speak with callbacks...");
    {
        let client = HelloWorldClient::new(&base_url)?;
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let tx_err = tx.clone();

        let handle = client.speak_with_callbacks(
            words("hello"),
            move |response| {
                let _ = tx.send(format!("success: {:?}", response.into_inner()));
            },
            move |err| {
                let _ = tx_err.send(format!("error: {}", err));
            },
        );

        let outcome = rx.recv().await;
        anyhow::ensure!(handle.join().await, "callback did not run");
        println!("  PASS: {:?}", outcome);
    }

    println!();
    println!("All tests passed.");
    Ok(())
}
