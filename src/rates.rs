//! Exchange-rate fetching with a static fallback table.

use std::{collections::BTreeMap, time::Duration};

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use kassa_domain::{CurrencyCode, RateSource, RateTable};

use crate::errors::KassaError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct RateResponse {
    #[serde(default)]
    rates: BTreeMap<String, f64>,
}

/// Parses a rate-service body of the form `{"rates": {"USD": 0.094, ...}}`.
/// Entries that are zero, negative or not finite are skipped.
pub fn parse_rates(body: &str) -> Result<RateTable, KassaError> {
    let response: RateResponse =
        serde_json::from_str(body).map_err(|err| KassaError::Rates(err.to_string()))?;

    let mut table = RateTable::new(CurrencyCode::base(), RateSource::Live);
    for (code, rate) in response.rates {
        let code = CurrencyCode::new(code);
        if code.is_base() || !rate.is_finite() || rate <= 0.0 {
            continue;
        }
        table.rates.insert(code, rate);
    }

    if table.rates.is_empty() {
        return Err(KassaError::Rates("response contained no usable rates".into()));
    }
    Ok(table)
}

/// Client for the configured exchange-rate endpoint.
pub struct RateService {
    client: Client,
    url: String,
}

impl RateService {
    pub fn new(url: impl Into<String>) -> Result<Self, KassaError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> Result<RateTable, KassaError> {
        debug!(url = %self.url, "requesting exchange rates");
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_rates(&body)
    }

    /// Runs [`RateService::fetch`] to completion on a current-thread runtime.
    pub fn fetch_blocking(&self) -> Result<RateTable, KassaError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.fetch())
    }
}

/// Stamp handed out when a rate request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RateTicket(u64);

/// Holds the active rate table. Responses are applied only when their ticket
/// is newer than the last applied one, so a slow stale response never
/// overwrites fresher rates.
#[derive(Debug, Clone)]
pub struct RateBoard {
    issued: u64,
    applied: u64,
    table: RateTable,
}

impl RateBoard {
    pub fn new() -> Self {
        Self {
            issued: 0,
            applied: 0,
            table: RateTable::fallback(),
        }
    }

    pub fn table(&self) -> &RateTable {
        &self.table
    }

    pub fn begin_request(&mut self) -> RateTicket {
        self.issued += 1;
        RateTicket(self.issued)
    }

    /// Returns `false` when the response was discarded as stale.
    pub fn apply(&mut self, ticket: RateTicket, table: RateTable) -> bool {
        if ticket.0 <= self.applied {
            debug!(ticket = ticket.0, applied = self.applied, "discarding stale rate response");
            return false;
        }
        self.applied = ticket.0;
        self.table = table;
        true
    }

    /// Fetches fresh rates, falling back to the static table on any failure.
    pub fn refresh(&mut self, service: &RateService) -> RateSource {
        let ticket = self.begin_request();
        let table = match service.fetch_blocking() {
            Ok(table) => {
                info!(currencies = table.rates.len(), "exchange rates refreshed");
                table
            }
            Err(err) => {
                warn!(url = %service.url(), error = %err, "rate fetch failed; using fallback rates");
                RateTable::fallback()
            }
        };
        let source = table.source;
        self.apply(ticket, table);
        source
    }
}

impl Default for RateBoard {
    fn default() -> Self {
        Self::new()
    }
}
