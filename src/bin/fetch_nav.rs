use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dingtou::{load_nav_history, CacheMode, EastmoneyClient};

#[derive(Parser, Debug)]
#[command(name = "fetch_nav")]
#[command(about = "Download a fund's NAV history and store it in the cache", long_about = None)]
struct Args {
    /// Fund code, e.g. 017437
    fund_code: String,

    /// Directory holding NAV cache files
    #[arg(long, default_value = "data")]
    data_dir: std::path::PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let client = EastmoneyClient::new()?;
    let fund = load_nav_history(&client, &args.data_dir, &args.fund_code, CacheMode::Refresh)
        .await
        .with_context(|| format!("downloading NAV history for fund {}", args.fund_code))?;

    match (fund.data().first(), fund.data().last()) {
        (Some(first), Some(last)) => println!(
            "fund {}: {} NAV records, {} to {}",
            args.fund_code,
            fund.len(),
            first.date,
            last.date
        ),
        _ => println!("fund {}: no NAV records", args.fund_code),
    }
    Ok(())
}
