use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dingtou::{
    investment_dates, load_nav_history, schedule_description, simulate, CacheMode,
    EastmoneyClient, Error, Frequency,
};

#[derive(Parser, Debug)]
#[command(name = "backtest")]
#[command(about = "Backtest periodic purchases of a fund against its NAV history", long_about = None)]
struct Args {
    /// Fund code, e.g. 017437
    fund_code: String,

    /// First day of the backtest range
    #[arg(long, default_value = "2023-01-01")]
    start_date: NaiveDate,

    /// Last day of the backtest range
    #[arg(long, default_value = "2024-12-31")]
    end_date: NaiveDate,

    /// Amount contributed per period
    #[arg(long, default_value_t = 1000.0)]
    amount: f64,

    /// Contribution frequency: W, M, Q or Y
    #[arg(long, default_value = "M")]
    freq: String,

    /// Day within the period, counted from 1
    #[arg(long, default_value_t = 1)]
    day_offset: u32,

    /// Directory holding NAV cache files
    #[arg(long, default_value = "data")]
    data_dir: std::path::PathBuf,

    /// Re-download NAV data even when a cache file exists
    #[arg(long)]
    refresh: bool,

    /// Use only cached data, never the network
    #[arg(long, conflicts_with = "refresh")]
    offline: bool,

    /// Print the full contribution ledger
    #[arg(long)]
    ledger: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.start_date > args.end_date {
        return Err(Error::InvalidDateRange(args.start_date, args.end_date).into());
    }
    let freq: Frequency = args.freq.parse()?;

    let mode = if args.refresh {
        CacheMode::Refresh
    } else if args.offline {
        CacheMode::Offline
    } else {
        CacheMode::Prefer
    };
    let client = EastmoneyClient::new()?;
    let fund = load_nav_history(&client, &args.data_dir, &args.fund_code, mode)
        .await
        .with_context(|| format!("loading NAV history for fund {}", args.fund_code))?;

    let dates = investment_dates(args.start_date, args.end_date, freq, args.day_offset);
    let result = simulate(&fund, args.amount, &dates, args.end_date)
        .context("simulation failed")?;

    if args.ledger {
        println!("{}", result.ledger);
    }

    println!(
        "Fund {} from {} to {}, {} of {} per period:",
        args.fund_code,
        args.start_date,
        args.end_date,
        schedule_description(freq, args.day_offset),
        args.amount,
    );
    println!("########################################");
    println!("total invested   : {:.2}", result.total_invested);
    println!("final shares     : {:.4}", result.total_shares);
    println!(
        "final NAV        : {} ({})",
        result.final_nav, result.final_nav_date
    );
    println!("final asset value: {:.4}", result.final_asset_value);
    println!("total return     : {:.2}%", result.return_rate);
    match result.annualized_rate {
        Some(rate) => println!("annualized (IRR) : {:.2}%", rate),
        None => println!("annualized (IRR) : n/a"),
    }
    println!("########################################");
    Ok(())
}
