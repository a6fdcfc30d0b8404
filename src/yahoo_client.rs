use crate::config;
use crate::models::{
    ChartResponse, ChartResult, OptionContract, OptionType, OptionsResponse, OptionsResult,
    PricePoint, PriceSeries, RawContract,
};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate};
use rand::{seq::SliceRandom, thread_rng};
use reqwest::{header, Client, StatusCode};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Non-success HTTP status with the start of the body
#[derive(Debug)]
struct HttpStatusError {
    status: StatusCode,
    preview: String,
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.preview)
    }
}

impl std::error::Error for HttpStatusError {}

/// True when Yahoo refused the session cookie or crumb
fn is_session_rejected(err: &anyhow::Error) -> bool {
    err.downcast_ref::<HttpStatusError>()
        .is_some_and(|e| matches!(e.status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN))
}

// -----------------------------------------------
// CLIENT WRAPPER WITH SESSION STATE
// -----------------------------------------------
pub struct YahooClient {
    client: Client,
    crumb: Arc<RwLock<Option<String>>>,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            crumb: Arc::new(RwLock::new(None)),
        })
    }

    /// Obtain the session cookie and crumb token, cached until Yahoo rejects it.
    /// The options endpoint rejects requests without both.
    async fn crumb(&self) -> Result<String> {
        if let Some(crumb) = self.crumb.read().await.as_ref() {
            return Ok(crumb.clone());
        }

        let mut cached = self.crumb.write().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // Only the Set-Cookie header matters, the status is usually 404
        let _ = self
            .client
            .get(config::YAHOO_COOKIE_URL)
            .header(header::ACCEPT, config::HEADER_ACCEPT_HTML)
            .send()
            .await
            .context("Failed to warm up Yahoo session")?;

        let crumb = self.fetch_text(&config::yahoo_crumb_url()).await?;
        let crumb = crumb.trim().to_string();
        if crumb.is_empty() || crumb.starts_with('<') || crumb.starts_with('{') {
            anyhow::bail!("Yahoo returned no usable crumb");
        }

        debug!("Yahoo session crumb acquired");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request send failed: {}", url))?;

        let status = res.status();
        debug!(url, status = status.as_u16(), "Yahoo response");

        let body = res.text().await.context("Failed to read body")?;
        if !status.is_success() {
            let preview: String = body.chars().take(200).collect();
            return Err(HttpStatusError { status, preview }.into());
        }
        Ok(body)
    }

    /// Fetch and sanity-check a JSON body. No retries: a failed call is
    /// reported to the caller and the next scan tries again.
    async fn fetch_json(&self, url: &str) -> Result<String> {
        let text = self.fetch_text(url).await?;

        let trimmed = text.trim();
        if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
            let preview: String = text.chars().take(200).collect();
            anyhow::bail!("Non-JSON response: {}", preview);
        }

        Ok(text)
    }

    /// Options calls carry the crumb. A 401/403 drops the cached one so the
    /// next call warms up a fresh session.
    async fn fetch_options_json(&self, url: &str) -> Result<String> {
        let result = self.fetch_json(url).await;
        if let Err(e) = &result {
            self.forget_crumb_if_rejected(e).await;
        }
        result
    }

    async fn forget_crumb_if_rejected(&self, err: &anyhow::Error) {
        if is_session_rejected(err) {
            warn!("Yahoo rejected the session crumb, clearing it");
            *self.crumb.write().await = None;
        }
    }

    // -----------------------------------------------
    // PRICE SERIES
    // -----------------------------------------------
    pub async fn fetch_price_series(&self, ticker: &str, range: &str, interval: &str) -> Result<PriceSeries> {
        let url = config::yahoo_chart_url(ticker, range, interval);
        let text = self.fetch_json(&url).await?;
        let chart = parse_chart(&text)?;
        price_series_from_chart(&chart)
    }

    // -----------------------------------------------
    // LATEST PRICE
    // -----------------------------------------------
    pub async fn fetch_latest_price(&self, ticker: &str) -> Result<f64> {
        let url = config::yahoo_chart_url(ticker, config::SERIES_RANGE, config::SERIES_INTERVAL);
        let text = self.fetch_json(&url).await?;
        let chart = parse_chart(&text)?;
        latest_price_from_chart(&chart)
    }

    // -----------------------------------------------
    // OPTION EXPIRATIONS
    // -----------------------------------------------
    pub async fn fetch_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>> {
        let crumb = self.crumb().await?;
        let url = config::yahoo_options_url(ticker, &crumb, None);
        let text = self.fetch_options_json(&url).await?;
        let result = parse_options(&text)?;
        Ok(expirations_from_options(&result))
    }

    // -----------------------------------------------
    // OPTION CHAIN FOR ONE EXPIRATION
    // -----------------------------------------------
    pub async fn fetch_option_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<Vec<OptionContract>> {
        let crumb = self.crumb().await?;
        let url = config::yahoo_options_url(ticker, &crumb, Some(expiry_epoch(expiry)?));
        let text = self.fetch_options_json(&url).await?;
        let result = parse_options(&text)?;
        Ok(contracts_from_options(&result, ticker, expiry))
    }
}

// -----------------------------------------------
// RESPONSE PARSING
// -----------------------------------------------

pub fn parse_chart(text: &str) -> Result<ChartResult> {
    let response: ChartResponse = serde_json::from_str(text).context("Failed to parse chart response")?;

    if let Some(err) = response.chart.error {
        return Err(anyhow!("Provider error: {}", err));
    }

    response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .context("Chart response has no result")
}

/// Pair timestamps with closes, dropping bars whose close is null
pub fn price_series_from_chart(chart: &ChartResult) -> Result<PriceSeries> {
    let closes = chart
        .indicators
        .quote
        .first()
        .map(|q| q.close.as_slice())
        .unwrap_or_default();

    let points: Vec<PricePoint> = chart
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(&ts, close)| {
            let price = (*close)?;
            let timestamp = DateTime::from_timestamp(ts, 0)?;
            Some(PricePoint { timestamp, price })
        })
        .collect();

    Ok(PriceSeries::new(points)?)
}

pub fn latest_price_from_chart(chart: &ChartResult) -> Result<f64> {
    chart
        .meta
        .regular_market_price
        .filter(|p| p.is_finite() && *p > 0.0)
        .context("Chart response has no market price")
}

pub fn parse_options(text: &str) -> Result<OptionsResult> {
    let response: OptionsResponse =
        serde_json::from_str(text).context("Failed to parse options response")?;

    if let Some(err) = response.option_chain.error {
        return Err(anyhow!("Provider error: {}", err));
    }

    response
        .option_chain
        .result
        .and_then(|r| r.into_iter().next())
        .context("Options response has no result")
}

pub fn expirations_from_options(result: &OptionsResult) -> Vec<NaiveDate> {
    result
        .expiration_dates
        .iter()
        .filter_map(|&ts| DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive()))
        .collect()
}

/// Calls first, then puts, provider order kept within each side
pub fn contracts_from_options(result: &OptionsResult, ticker: &str, expiry: NaiveDate) -> Vec<OptionContract> {
    let underlying = result.underlying_symbol.as_deref().unwrap_or(ticker);

    let mut contracts = Vec::new();
    for block in &result.options {
        let calls = block.calls.iter().map(|raw| (raw, OptionType::Call));
        let puts = block.puts.iter().map(|raw| (raw, OptionType::Put));

        contracts.extend(
            calls
                .chain(puts)
                .filter_map(|(raw, option_type)| convert_contract(raw, underlying, option_type, expiry)),
        );
    }
    contracts
}

fn convert_contract(
    raw: &RawContract,
    underlying: &str,
    option_type: OptionType,
    expiry: NaiveDate,
) -> Option<OptionContract> {
    let strike = raw.strike?;

    let expiration = raw
        .expiration
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.date_naive())
        .unwrap_or(expiry);

    Some(OptionContract {
        symbol: raw.contract_symbol.clone().unwrap_or_default(),
        underlying: underlying.to_string(),
        option_type,
        strike,
        expiration,
        last_price: raw.last_price.unwrap_or(0.0),
        bid: raw.bid.unwrap_or(0.0),
        ask: raw.ask.unwrap_or(0.0),
        volume: count(raw.volume),
        open_interest: count(raw.open_interest),
        implied_volatility: raw.implied_volatility.unwrap_or(0.0),
    })
}

fn count(value: Option<f64>) -> u64 {
    value.filter(|v| v.is_finite() && *v > 0.0).map(|v| v as u64).unwrap_or(0)
}

/// Yahoo keys expirations by midnight UTC of the expiry date
pub fn expiry_epoch(expiry: NaiveDate) -> Result<i64> {
    expiry
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .with_context(|| format!("Invalid expiry date: {}", expiry))
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client> {
    let mut headers = header::HeaderMap::new();

    let lang = config::ACCEPT_LANGUAGES
        .choose(&mut thread_rng())
        .copied()
        .unwrap_or("en-US,en;q=0.9");
    headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_str(lang)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

    Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .gzip(true)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}
