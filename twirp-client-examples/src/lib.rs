use std::net::SocketAddr;

pub mod hello_world_twirp;
pub mod server;

// Re-export for convenience
pub use hello_world_twirp::*;

/// Returns the server address from PORT env var, defaulting to 3000.
///
/// # Example
///
/// ```ignore
/// let addr = twirp_client_examples::server_addr();
/// let listener = tokio::net::TcpListener::bind(addr).await?;
/// ```
pub fn server_addr() -> SocketAddr {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    format!("0.0.0.0:{port}")
        .parse()
        .expect("invalid PORT env var")
}

/// Server URL for the demo client: first CLI argument, then `SERVER_URL`,
/// then `http://localhost:3000`.
pub fn server_url() -> String {
    std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SERVER_URL").ok())
        .unwrap_or_else(|| "http://localhost:3000".to_string())
}

/// Install a fmt subscriber filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A subscriber may already be installed (tests).
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
