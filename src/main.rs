mod alerts;
mod api;
mod config;
mod error;
mod mcp;
mod server;

use api::prices::PriceSource;
use clap::Parser;
use config::{Cli, Command};
use env_logger::Builder;
use log::{info, LevelFilter};
use mcp::McpHandler;
use server::AppState;
use std::error::Error;
use std::io::Write;
use std::sync::Arc;

fn init_logger() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("crypto_price_alert", LevelFilter::Debug)
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            let ts = chrono::Local::now().format("%H:%M:%S%.3f");
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                ts,
                record.level(),
                record.target(),
                record.args()
            )
        })
        // stdout carries JSON-RPC frames in stdio mode
        .target(env_logger::Target::Stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    init_logger();
    let cli = Cli::parse();

    info!("Starting Crypto Price Alert...");

    let source = Arc::new(PriceSource::from_args(&cli.pricing)?);

    match cli.command() {
        Command::Serve => server::serve(&cli.bind_addr(), AppState::new(source)).await?,
        Command::Stdio => mcp::stdio::run(McpHandler::new(source)).await?,
    }

    info!("Shutdown complete");
    Ok(())
}
