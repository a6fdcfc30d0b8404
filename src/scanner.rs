use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::indicators::compute_indicators;
use crate::models::{OptionContract, PriceSeries, SignalResult};
use crate::options_filter::{filter_options, select_expirations};
use crate::signals::classify;
use crate::yahoo_client::YahooClient;
use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};
use tracing::{info, warn};

/// Market data the scan depends on. Implemented by [`YahooClient`];
/// tests plug in in-memory sources.
#[allow(async_fn_in_trait)]
pub trait MarketDataSource {
    async fn fetch_price_series(&self, ticker: &str, range: &str, interval: &str) -> Result<PriceSeries>;
    async fn fetch_latest_price(&self, ticker: &str) -> Result<f64>;
    async fn fetch_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>>;
    async fn fetch_option_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<Vec<OptionContract>>;
}

impl MarketDataSource for YahooClient {
    async fn fetch_price_series(&self, ticker: &str, range: &str, interval: &str) -> Result<PriceSeries> {
        YahooClient::fetch_price_series(self, ticker, range, interval).await
    }

    async fn fetch_latest_price(&self, ticker: &str) -> Result<f64> {
        YahooClient::fetch_latest_price(self, ticker).await
    }

    async fn fetch_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>> {
        YahooClient::fetch_expirations(self, ticker).await
    }

    async fn fetch_option_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<Vec<OptionContract>> {
        YahooClient::fetch_option_chain(self, ticker, expiry).await
    }
}

/// Signals and surviving contracts for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct TickerReport {
    pub ticker: String,
    /// When this ticker's price series was analyzed
    pub analyzed_at: DateTime<Local>,
    pub signals: SignalResult,
    pub contracts: Vec<OptionContract>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickerOutcome {
    Analyzed(TickerReport),
    Skipped { ticker: String, error: ScanError },
}

impl TickerOutcome {
    pub fn ticker(&self) -> &str {
        match self {
            TickerOutcome::Analyzed(report) => &report.ticker,
            TickerOutcome::Skipped { ticker, .. } => ticker,
        }
    }

    pub fn is_analyzed(&self) -> bool {
        matches!(self, TickerOutcome::Analyzed(_))
    }
}

/// One outcome per configured ticker, in scan order
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub started_at: DateTime<Local>,
    pub outcomes: Vec<TickerOutcome>,
}

impl ScanReport {
    pub fn analyzed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_analyzed()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.analyzed_count()
    }
}

/// Latest price for one ticker, `None` when the provider had nothing
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub ticker: String,
    pub price: Option<f64>,
}

pub struct Scanner<S> {
    source: S,
    config: ScanConfig,
}

impl<S: MarketDataSource> Scanner<S> {
    pub fn new(source: S, config: ScanConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Scan every configured ticker, one at a time.
    /// A failing ticker is recorded and never stops the scan.
    pub async fn run_scan(&self, today: NaiveDate) -> ScanReport {
        let started_at = Local::now();
        info!(tickers = self.config.tickers.len(), %today, "Starting 0-1 DTE scan");

        let mut outcomes = Vec::with_capacity(self.config.tickers.len());
        for ticker in &self.config.tickers {
            outcomes.push(self.scan_ticker(ticker, today).await);
        }

        let report = ScanReport { started_at, outcomes };
        info!(
            analyzed = report.analyzed_count(),
            skipped = report.skipped_count(),
            "Scan finished"
        );
        report
    }

    /// Full pipeline for one ticker
    pub async fn scan_ticker(&self, ticker: &str, today: NaiveDate) -> TickerOutcome {
        match self.analyze(ticker, today).await {
            Ok(report) => {
                info!(
                    ticker,
                    rsi_signal = %report.signals.rsi_signal,
                    breakout = %report.signals.breakout_signal,
                    contracts = report.contracts.len(),
                    "Ticker analyzed"
                );
                TickerOutcome::Analyzed(report)
            }
            Err(error) => {
                warn!(ticker, %error, "Skipping ticker");
                TickerOutcome::Skipped {
                    ticker: ticker.to_string(),
                    error,
                }
            }
        }
    }

    async fn analyze(&self, ticker: &str, today: NaiveDate) -> Result<TickerReport, ScanError> {
        let series = self
            .source
            .fetch_price_series(ticker, &self.config.series_range, &self.config.series_interval)
            .await
            .map_err(|e| ScanError::data_unavailable(&e))?;
        let analyzed_at = Local::now();

        let indicators = compute_indicators(&series, &self.config.indicator);
        let signals = classify(&indicators, &self.config.signals);

        let chain = self
            .fetch_windowed_chain(ticker, today)
            .await
            .map_err(|e| ScanError::options_fetch(&e))?;

        let contracts = match filter_options(&chain, signals.price, &self.config.filter) {
            Ok(contracts) => contracts,
            Err(error) => {
                warn!(ticker, %error, "Option filter rejected reference price");
                Vec::new()
            }
        };

        Ok(TickerReport {
            ticker: ticker.to_string(),
            analyzed_at,
            signals,
            contracts,
        })
    }

    /// All contracts whose expiration falls inside the configured day window.
    /// No expirations in the window is an empty chain, not an error.
    async fn fetch_windowed_chain(&self, ticker: &str, today: NaiveDate) -> Result<Vec<OptionContract>> {
        let expirations = self.source.fetch_expirations(ticker).await?;
        let selected = select_expirations(&expirations, today, self.config.expiry_window_days);

        let mut chain = Vec::new();
        for expiry in selected {
            chain.extend(self.source.fetch_option_chain(ticker, expiry).await?);
        }
        Ok(chain)
    }

    /// Latest traded price for each ticker, in order
    pub async fn latest_prices(&self, tickers: &[String]) -> Vec<PriceQuote> {
        let mut quotes = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            let price = match self.source.fetch_latest_price(ticker).await {
                Ok(price) => Some(price),
                Err(e) => {
                    warn!(ticker = ticker.as_str(), "Could not retrieve data for {}: {:#}", ticker, e);
                    None
                }
            };
            quotes.push(PriceQuote {
                ticker: ticker.clone(),
                price,
            });
        }
        quotes
    }
}
