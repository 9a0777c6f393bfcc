use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by the backtesting pipeline.
///
/// Data-input failures carry the offending value.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unrecognized frequency `{0}`, expected one of W, M, Q, Y")]
    InvalidFrequency(String),

    #[error("no NAV record on or after {0}; shorten the range or refresh the cache")]
    NoMatchingNav(NaiveDate),

    #[error("no NAV record on or before {0} to value the holdings")]
    NoValuationNav(NaiveDate),

    #[error("contribution amount must be a positive number, got {0}")]
    InvalidContribution(f64),

    #[error("start date {0} is after end date {1}")]
    InvalidDateRange(NaiveDate, NaiveDate),

    #[error("total investment is zero, return rate is undefined")]
    ZeroInvestment,

    #[error("fetching NAV data failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("NAV API returned an unusable payload: {0}")]
    Api(String),

    #[error("cache file error: {0}")]
    Cache(#[from] csv::Error),

    #[error("no cached NAV data at {0}, run without --offline first")]
    CacheMiss(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
