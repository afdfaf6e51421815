use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

#[derive(Debug, Parser)]
#[command(name = "crypto-price-alert", version, about = "Crypto price alert server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Address the HTTP server binds to
    #[arg(long, env = "HOST", default_value = "0.0.0.0", global = true)]
    pub host: String,

    /// Port the HTTP server listens on
    #[arg(long, env = "PORT", default_value_t = 8080, global = true)]
    pub port: u16,

    #[command(flatten)]
    pub pricing: PricingArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Speak JSON-RPC over stdin/stdout, one message per line
    Stdio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Built-in table of demo prices
    Mock,
    /// Live prices from the CoinGecko simple price endpoint
    Coingecko,
}

#[derive(Debug, Clone, clap::Args)]
pub struct PricingArgs {
    #[arg(long, env = "PRICE_SOURCE", value_enum, default_value_t = SourceKind::Mock, global = true)]
    pub price_source: SourceKind,

    /// Quote currency for live prices
    #[arg(long, env = "VS_CURRENCY", default_value = "try", global = true)]
    pub vs_currency: String,

    #[arg(long, env = "PRICE_API_URL", default_value = DEFAULT_PRICE_API_URL, global = true)]
    pub price_api_url: String,

    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub upstream_timeout_secs: u64,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl PricingArgs {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}
