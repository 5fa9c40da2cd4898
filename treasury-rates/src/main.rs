//! Print the latest Treasury yield curve tenors as CSV.
//!
//! # Usage
//!
//! ```bash
//! # Current month, nominal then real
//! get-rates
//!
//! # A specific month
//! get-rates --month 202401
//!
//! # Show request details on stderr
//! RUST_LOG=treasury_rates=debug get-rates
//! ```

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use treasury_rates::config::{parse_month, TREASURY_XML_URL};
use treasury_rates::{FeedConfig, TreasuryClient};

/// Treasury yield curve CLI.
#[derive(Parser)]
#[command(name = "get-rates")]
#[command(about = "Print the latest Treasury nominal and real yield curve tenors as CSV")]
#[command(version)]
struct Cli {
    /// Month to query (YYYYMM); defaults to the current month
    #[arg(long, env = "TREASURY_MONTH", value_parser = parse_month)]
    month: Option<NaiveDate>,

    /// Feed endpoint
    #[arg(long, env = "TREASURY_BASE_URL", default_value = TREASURY_XML_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "TREASURY_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,

    /// Significant digits kept for each yield
    #[arg(
        long,
        env = "TREASURY_PRECISION",
        default_value_t = 6,
        value_parser = clap::value_parser!(u32).range(1..=28)
    )]
    precision: u32,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout carries only the CSV
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("treasury_rates=info".parse()?)
                .add_directive("get_rates=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let month = cli.month.unwrap_or_else(|| Local::now().date_naive());
    let config = FeedConfig {
        base_url: cli.base_url,
        timeout: Duration::from_secs(cli.timeout_secs),
        precision: cli.precision,
    };
    let client = TreasuryClient::new(config).context("Failed to build HTTP client")?;

    let mut failed = false;
    let mut out = io::stdout().lock();

    for (kind, result) in client.get_all_rates(month).await {
        match result {
            Ok(Some(rates)) => rates
                .write_csv(&mut out)
                .with_context(|| format!("Failed to write {} rates", kind))?,
            Ok(None) => {}
            Err(e) => {
                error!("Failed to retrieve {} rates: {}", kind, e);
                failed = true;
            }
        }
    }
    out.flush()?;

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
