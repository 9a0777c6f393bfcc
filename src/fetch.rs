use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cache::{self, CacheMode};
use crate::data::{Fund, NavSlice};
use crate::error::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.fund.eastmoney.com";
const PAGE_SIZE: usize = 20;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const PAGE_DELAY: Duration = Duration::from_millis(200);
const MAX_ATTEMPTS: u32 = 3;

// The endpoint rejects requests that do not look like the fund detail
// page making an XHR call.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/99.0.4844.82 Safari/537.36";
const REFERER: &str = "https://fundf10.eastmoney.com/";

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(rename = "Data")]
    data: Option<HistoryData>,
    #[serde(rename = "TotalCount", default)]
    total_count: usize,
    #[serde(rename = "ErrCode", default)]
    err_code: i32,
    #[serde(rename = "ErrMsg")]
    err_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistoryData {
    #[serde(rename = "LSJZList", default)]
    list: Vec<HistoryRow>,
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    /// Publish date, `YYYY-MM-DD`.
    #[serde(rename = "FSRQ", default)]
    publish_date: String,
    /// Unit NAV as a decimal string; blank on non-valuation rows.
    #[serde(rename = "DWJZ", default)]
    unit_nav: String,
}

impl HistoryRow {
    fn parse(&self) -> Option<NavSlice> {
        let date = NaiveDate::parse_from_str(&self.publish_date, "%Y-%m-%d").ok()?;
        let nav: f64 = self.unit_nav.trim().parse().ok()?;
        (nav > 0.0).then_some(NavSlice { date, nav })
    }
}

/// Client for the eastmoney fund NAV history endpoint (`f10/lsjz`).
pub struct EastmoneyClient {
    client: reqwest::Client,
    base_url: String,
}

impl EastmoneyClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(EastmoneyClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Downloads the complete NAV history for a fund, newest rows first
    /// as the endpoint returns them.
    ///
    /// Pages until the endpoint returns an empty page or `TotalCount`
    /// rows have been seen. Rows that do not carry a parsable date and a
    /// positive NAV are skipped.
    pub async fn fetch_all(&self, fund_code: &str) -> Result<Vec<NavSlice>> {
        let mut records = Vec::new();
        let mut seen_rows = 0usize;
        let mut page_index = 1usize;
        let mut total_count = None;

        loop {
            let page = self.fetch_page(fund_code, page_index).await?;
            if page.err_code != 0 {
                return Err(Error::Api(format!(
                    "fund {}: {}",
                    fund_code,
                    page.err_msg.unwrap_or_else(|| format!("error code {}", page.err_code))
                )));
            }
            let Some(data) = page.data else {
                return Err(Error::Api(format!("fund {}: empty Data payload", fund_code)));
            };
            if data.list.is_empty() {
                break;
            }
            let total = *total_count.get_or_insert(page.total_count);
            seen_rows += data.list.len();
            records.extend(data.list.iter().filter_map(HistoryRow::parse));
            info!(
                "fetched page {} ({} of {} rows)",
                page_index,
                seen_rows,
                total
            );
            if seen_rows >= total {
                break;
            }
            page_index += 1;
            tokio::time::sleep(PAGE_DELAY).await;
        }

        if records.is_empty() {
            return Err(Error::Api(format!(
                "fund {}: no NAV records returned, is the code valid?",
                fund_code
            )));
        }
        Ok(records)
    }

    async fn fetch_page(&self, fund_code: &str, page_index: usize) -> Result<HistoryResponse> {
        let mut attempt = 1;
        loop {
            match self.request_page(fund_code, page_index).await {
                Ok(page) => return Ok(page),
                Err(err) if attempt < MAX_ATTEMPTS => {
                    warn!(
                        "page {} request failed (attempt {}): {}, retrying",
                        page_index, attempt, err
                    );
                    tokio::time::sleep(PAGE_DELAY * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(Error::Network(err)),
            }
        }
    }

    async fn request_page(
        &self,
        fund_code: &str,
        page_index: usize,
    ) -> std::result::Result<HistoryResponse, reqwest::Error> {
        let url = format!("{}/f10/lsjz", self.base_url);
        debug!("GET {} page {}", url, page_index);
        self.client
            .get(&url)
            .query(&[
                ("fundCode", fund_code),
                ("pageIndex", &page_index.to_string()),
                ("pageSize", &PAGE_SIZE.to_string()),
            ])
            .header("User-Agent", USER_AGENT)
            .header("Referer", REFERER)
            .header("Accept", "application/json, text/javascript, */*; q=0.01")
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?
            .error_for_status()?
            .json::<HistoryResponse>()
            .await
    }
}

/// Resolves NAV history through the cache according to `mode`.
///
/// The one place that decides between the cache file and the network.
pub async fn load_nav_history(
    client: &EastmoneyClient,
    data_dir: &Path,
    fund_code: &str,
    mode: CacheMode,
) -> Result<Fund> {
    let path = cache::nav_cache_path(data_dir, fund_code);
    let records = match mode {
        CacheMode::Prefer if path.exists() => {
            info!("reading cached NAV data from {}", path.display());
            cache::load(&path)?
        }
        CacheMode::Offline => {
            if !path.exists() {
                return Err(Error::CacheMiss(path));
            }
            info!("reading cached NAV data from {}", path.display());
            cache::load(&path)?
        }
        CacheMode::Prefer | CacheMode::Refresh => {
            let records = client.fetch_all(fund_code).await?;
            cache::store(&path, &records)?;
            info!("stored {} NAV records to {}", records.len(), path.display());
            records
        }
    };
    Ok(Fund::from_records(fund_code, records))
}
