//! Demo Twirp server for `us.xeserv.api.HelloWorld`.
//!
//! Run with: cargo run --bin twirp-hello-server
//! Listens on the port in `PORT` (default 3000).

use twirp_client_examples::{SPEAK, init_tracing, server, server_addr};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let addr = server_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("=== Twirp HelloWorld server ===");
    println!("Server listening on http://{}", addr);
    println!();
    println!("  - Speak: POST {}", SPEAK.path());
    println!();
    println!("Test with:");
    println!("  curl -X POST http://localhost:{}{} \\", addr.port(), SPEAK.path());
    println!("    -H 'Content-Type: application/json' \\");
    println!("    -d '{{\"english\": \"hello\"}}'");

    axum::serve(listener, server::router()).await?;
    Ok(())
}
