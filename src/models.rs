use crate::error::ScanError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::fmt;

// -----------------------------------------------
// PRICE DATA
// -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Chronological, non-empty sequence of positive closing prices
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, ScanError> {
        if points.is_empty() {
            return Err(ScanError::DataUnavailable("empty price series".to_string()));
        }
        if let Some(bad) = points.iter().find(|p| !p.price.is_finite() || p.price <= 0.0) {
            return Err(ScanError::DataUnavailable(format!(
                "non-positive price {} at {}",
                bad.price, bad.timestamp
            )));
        }
        if points.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
            return Err(ScanError::DataUnavailable(
                "price series is not chronological".to_string(),
            ));
        }
        Ok(Self { points })
    }

    /// Build a series from bare closes, one bar per `step` starting at `start`
    pub fn from_closes(
        start: DateTime<Utc>,
        step: chrono::Duration,
        closes: &[f64],
    ) -> Result<Self, ScanError> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp: start + step * i as i32,
                price,
            })
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_price(&self) -> f64 {
        // Non-empty by construction
        self.points[self.points.len() - 1].price
    }
}

// -----------------------------------------------
// OPTIONS
// -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionContract {
    pub symbol: String,
    pub underlying: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub last_price: f64,
    pub bid: f64,
    pub ask: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub implied_volatility: f64,
}

// -----------------------------------------------
// SIGNALS
// -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiSignal {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for RsiSignal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RsiSignal::Buy => write!(f, "buy"),
            RsiSignal::Sell => write!(f, "sell"),
            RsiSignal::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakoutSignal {
    Breakout,
    None,
}

impl fmt::Display for BreakoutSignal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BreakoutSignal::Breakout => write!(f, "breakout"),
            BreakoutSignal::None => write!(f, "none"),
        }
    }
}

/// Indicator values for the latest bar of a series.
/// `None` means the series was too short for the value to be defined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicators {
    pub price: f64,
    pub rsi_value: Option<f64>,
    pub return_percent: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalResult {
    pub price: f64,
    pub rsi_value: Option<f64>,
    pub return_percent: Option<f64>,
    pub rsi_signal: RsiSignal,
    pub breakout_signal: BreakoutSignal,
}

// -----------------------------------------------
// YAHOO CHART RESPONSE
// -----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartEnvelope {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ProviderError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderError {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code.as_deref().unwrap_or("Unknown"),
            self.description.as_deref().unwrap_or("no description")
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,

    #[serde(default)]
    pub timestamp: Vec<i64>,

    pub indicators: ChartIndicators,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    pub symbol: Option<String>,

    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

// -----------------------------------------------
// YAHOO OPTIONS RESPONSE
// -----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OptionsResponse {
    #[serde(rename = "optionChain")]
    pub option_chain: OptionsEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionsEnvelope {
    pub result: Option<Vec<OptionsResult>>,
    pub error: Option<ProviderError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionsResult {
    #[serde(rename = "underlyingSymbol")]
    pub underlying_symbol: Option<String>,

    #[serde(rename = "expirationDates", default)]
    pub expiration_dates: Vec<i64>,

    #[serde(default)]
    pub options: Vec<OptionsByExpiry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionsByExpiry {
    #[serde(rename = "expirationDate")]
    pub expiration_date: Option<i64>,

    #[serde(default)]
    pub calls: Vec<RawContract>,

    #[serde(default)]
    pub puts: Vec<RawContract>,
}

/// One call or put as Yahoo sends it; every field may be missing
#[derive(Debug, Clone, Deserialize)]
pub struct RawContract {
    #[serde(rename = "contractSymbol")]
    pub contract_symbol: Option<String>,

    pub strike: Option<f64>,

    #[serde(rename = "lastPrice")]
    pub last_price: Option<f64>,

    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub volume: Option<f64>,

    #[serde(rename = "openInterest")]
    pub open_interest: Option<f64>,

    #[serde(rename = "impliedVolatility")]
    pub implied_volatility: Option<f64>,

    pub expiration: Option<i64>,
}
