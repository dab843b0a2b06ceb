//! Command-line interface definitions for the fake endpoint server.

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the fake endpoint server.
#[derive(Debug, Parser)]
#[command(name = "faux-mock")]
#[command(version, about = "Serve fake HTTP endpoints described in a YAML manifest")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:18080")]
    pub listen: String,

    /// Path to the YAML endpoint manifest
    #[arg(long)]
    pub endpoints: PathBuf,
}
