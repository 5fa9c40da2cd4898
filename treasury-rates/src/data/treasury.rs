//! Treasury yield curve feed client.
//!
//! Feeds are selected by a `data` query parameter naming the curve and a
//! `field_tdr_date_value_month` parameter naming the month (`YYYYMM`). Each
//! feed lists that month's reporting days in chronological order.

use chrono::NaiveDate;
use reqwest::{Client, Request};
use tracing::{debug, info};

use super::extract::rates_from_document;
use super::feed::{self, Element};
use super::types::{DecimalContext, RateKind, RateSet};
use crate::config::{month_param, FeedConfig};
use crate::error::{FeedError, FeedResult};

/// Query parameter selecting the curve.
const DATA_PARAM: &str = "data";

/// Query parameter selecting the month.
const MONTH_PARAM: &str = "field_tdr_date_value_month";

/// Treasury feed client.
pub struct TreasuryClient {
    client: Client,
    config: FeedConfig,
    ctx: DecimalContext,
}

impl TreasuryClient {
    /// Create a client with the configured request timeout.
    pub fn new(config: FeedConfig) -> FeedResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(client, config))
    }

    /// Create a client around an existing `reqwest` client.
    pub fn with_client(client: Client, config: FeedConfig) -> Self {
        let ctx = DecimalContext::new(config.precision);
        Self {
            client,
            config,
            ctx,
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Build the GET request for a curve's feed for the month containing `month`.
    pub fn feed_request(&self, kind: RateKind, month: NaiveDate) -> FeedResult<Request> {
        let month = month_param(month);
        let request = self
            .client
            .get(&self.config.base_url)
            .query(&[(DATA_PARAM, kind.dataset()), (MONTH_PARAM, month.as_str())])
            .build()?;
        Ok(request)
    }

    /// Fetch and parse a curve's feed document.
    ///
    /// A non-success status is an error; the body is not parsed.
    pub async fn fetch_document(&self, kind: RateKind, month: NaiveDate) -> FeedResult<Element> {
        let request = self.feed_request(kind, month)?;
        let url = request.url().to_string();
        debug!("Requesting {} feed: {}", kind, url);

        let response = self.client.execute(request).await?;
        let status = response.status();
        info!("{} feed responded with {}", kind, status);

        if !status.is_success() {
            return Err(FeedError::Status { url, status });
        }

        let body = response.bytes().await?;
        feed::parse(&body)
    }

    /// Get the most recent rates published for `kind` in the given month.
    ///
    /// `Ok(None)` means the feed has no entries yet.
    pub async fn get_rates(&self, kind: RateKind, month: NaiveDate) -> FeedResult<Option<RateSet>> {
        let root = self.fetch_document(kind, month).await?;
        let rates = rates_from_document(&root, kind, &self.ctx)?;

        match &rates {
            Some(r) => info!("Latest {} rates dated {}", kind, r.date),
            None => info!("No {} entries published for {}", kind, month_param(month)),
        }

        Ok(rates)
    }

    /// Fetch both curves concurrently. Results are in [`RateKind::ALL`] order.
    pub async fn get_all_rates(
        &self,
        month: NaiveDate,
    ) -> Vec<(RateKind, FeedResult<Option<RateSet>>)> {
        let (nominal, real) = tokio::join!(
            self.get_rates(RateKind::Nominal, month),
            self.get_rates(RateKind::Real, month),
        );
        vec![(RateKind::Nominal, nominal), (RateKind::Real, real)]
    }
}
