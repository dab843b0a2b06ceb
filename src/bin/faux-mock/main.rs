//! # Fake Endpoint Server CLI
//!
//! Runs a mock server from a declarative YAML manifest: each entry becomes
//! a fake endpoint with its own latency window, optional list expansion,
//! and optional error injection.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use faux_mock_rs::http::{build_router, Mux};
use faux_mock_rs::manifest::EndpointBook;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> io::Result<()> {
    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    // Parse CLI arguments
    let cli = Cli::parse();

    let book = EndpointBook::load_from_path(&cli.endpoints)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mux = Arc::new(Mux::new());
    book.register_into(&mux).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    for route in mux.routes() {
        tracing::info!("serving {route}");
    }

    let app = build_router(mux);

    let addr: SocketAddr = cli.listen.parse().map_err(io::Error::other)?;
    tracing::info!("starting faux-mock on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
