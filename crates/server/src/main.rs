//! HTTP preview server for rendered slide decks.
//!
//! Accepts rendered HTML and converted slide documents over HTTP, persists
//! them to disk, and serves the saved preview page back as a static file.

mod api;
mod preview;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

/// Serve the slide preview page and persist rendered HTML and slide data.
#[derive(Parser, Debug)]
#[command(name = "chartdeck-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to bind the HTTP server to
    #[arg(short, long, default_value_t = 8001)]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Directory for the preview file, saved logs, and static files
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let state = api::AppState { root: args.root };
    let app = api::build_router(state);

    let addr = format!("{}:{}", args.bind, args.port);
    log::info!("Preview server listening on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
