//! Feed retrieval configuration.

use std::time::Duration;

use chrono::NaiveDate;

use crate::data::DEFAULT_PRECISION;

/// Treasury interest rate XML endpoint.
pub const TREASURY_XML_URL: &str =
    "https://home.treasury.gov/resource-center/data-chart-center/interest-rates/pages/xml";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for [`crate::data::TreasuryClient`].
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Endpoint the `data` and month query parameters are appended to.
    pub base_url: String,

    /// Timeout applied to each feed request.
    pub timeout: Duration,

    /// Significant digits kept when parsing yields.
    pub precision: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: TREASURY_XML_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Parse a `YYYYMM` month into the first day of that month.
pub fn parse_month(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("expected YYYYMM, got {:?}", s));
    }
    NaiveDate::parse_from_str(&format!("{s}01"), "%Y%m%d")
        .map_err(|e| format!("invalid month {:?}: {}", s, e))
}

/// Format a date as the `YYYYMM` month the feeds are keyed by.
pub fn month_param(date: NaiveDate) -> String {
    date.format("%Y%m").to_string()
}
