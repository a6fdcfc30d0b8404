use std::time::Duration;
use tracing::warn;

// -----------------------------------------------
// YAHOO FINANCE ENDPOINTS
// -----------------------------------------------
pub const YAHOO_QUERY1_URL: &str = "https://query1.finance.yahoo.com";
pub const YAHOO_QUERY2_URL: &str = "https://query2.finance.yahoo.com";
pub const YAHOO_COOKIE_URL: &str = "https://fc.yahoo.com";

pub fn yahoo_crumb_url() -> String {
    format!("{}/v1/test/getcrumb", YAHOO_QUERY1_URL)
}

pub fn yahoo_chart_url(ticker: &str, range: &str, interval: &str) -> String {
    format!(
        "{}/v8/finance/chart/{}?range={}&interval={}&includePrePost=false",
        YAHOO_QUERY1_URL,
        urlencoding::encode(ticker),
        urlencoding::encode(range),
        urlencoding::encode(interval)
    )
}

/// Options endpoint. Without `expiry_epoch` Yahoo returns the nearest
/// expiration plus the full list of expiration dates.
pub fn yahoo_options_url(ticker: &str, crumb: &str, expiry_epoch: Option<i64>) -> String {
    let mut url = format!(
        "{}/v7/finance/options/{}?crumb={}",
        YAHOO_QUERY2_URL,
        urlencoding::encode(ticker),
        urlencoding::encode(crumb)
    );
    if let Some(epoch) = expiry_epoch {
        url.push_str(&format!("&date={}", epoch));
    }
    url
}

// -----------------------------------------------
// TICKERS
// -----------------------------------------------
pub const TECH_TICKERS: &[&str] = &["AAPL", "MSFT", "NVDA", "AMD", "GOOG", "AMZN", "META", "TSLA"];

pub const TOP_10_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "AMZN", "NVDA", "GOOGL", "META", "TSLA", "AVGO", "PEP", "COST",
];

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                               AppleWebKit/537.36 (KHTML, like Gecko) \
                               Chrome/131.0.0.0 Safari/537.36";

pub const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.8",
    "en-CA,en;q=0.9",
];

// Bounded per-call timeout; a failed call is not retried, the next scan retries.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

pub const HEADER_ACCEPT_HTML: &str = "text/html";

// -----------------------------------------------
// PRICE SERIES
// -----------------------------------------------
pub const SERIES_RANGE: &str = "1d";
pub const SERIES_INTERVAL: &str = "5m";

// -----------------------------------------------
// SIGNAL PARAMETERS
// -----------------------------------------------
pub const RSI_PERIOD: usize = 14;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;
pub const BREAKOUT_THRESHOLD: f64 = 0.5; // % change between the last two bars

// -----------------------------------------------
// OPTIONS FILTER THRESHOLDS
// -----------------------------------------------
pub const MIN_VOLUME: u64 = 100;
pub const MIN_OPEN_INTEREST: u64 = 100;
pub const MAX_MONEYNESS: f64 = 0.1; // 10% either side of spot
pub const MIN_IV: f64 = 0.5; // 50% annualized
pub const EXPIRY_WINDOW_DAYS: i64 = 1;

// -----------------------------------------------
// WATCH MODE
// -----------------------------------------------
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 300;
pub const MIN_SCAN_INTERVAL_SECS: u64 = 30;
pub const MAX_SCAN_INTERVAL_SECS: u64 = 3600;

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalThresholds {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub breakout_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterThresholds {
    pub min_volume: u64,
    pub min_open_interest: u64,
    pub max_moneyness: f64,
    pub min_implied_volatility: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self { rsi_period: RSI_PERIOD }
    }
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: RSI_OVERSOLD,
            rsi_overbought: RSI_OVERBOUGHT,
            breakout_percent: BREAKOUT_THRESHOLD,
        }
    }
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            min_volume: MIN_VOLUME,
            min_open_interest: MIN_OPEN_INTEREST,
            max_moneyness: MAX_MONEYNESS,
            min_implied_volatility: MIN_IV,
        }
    }
}

/// Everything a scan needs, built once and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub tickers: Vec<String>,
    pub indicator: IndicatorConfig,
    pub signals: SignalThresholds,
    pub filter: FilterThresholds,
    pub expiry_window_days: i64,
    pub series_range: String,
    pub series_interval: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tickers: TECH_TICKERS.iter().map(|t| t.to_string()).collect(),
            indicator: IndicatorConfig::default(),
            signals: SignalThresholds::default(),
            filter: FilterThresholds::default(),
            expiry_window_days: EXPIRY_WINDOW_DAYS,
            series_range: SERIES_RANGE.to_string(),
            series_interval: SERIES_INTERVAL.to_string(),
        }
    }
}

impl ScanConfig {
    /// Defaults with any `SCANNER_*` environment overrides applied
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(raw) = std::env::var("SCANNER_TICKERS") {
            let tickers = parse_ticker_list(&raw);
            if tickers.is_empty() {
                warn!("SCANNER_TICKERS is empty, keeping default ticker list");
            } else {
                cfg.tickers = tickers;
            }
        }

        cfg.indicator.rsi_period = env_or("SCANNER_RSI_PERIOD", cfg.indicator.rsi_period).max(2);
        cfg.filter.min_volume = env_or("SCANNER_MIN_VOLUME", cfg.filter.min_volume);
        cfg.filter.min_open_interest = env_or("SCANNER_MIN_OPEN_INTEREST", cfg.filter.min_open_interest);
        cfg.filter.max_moneyness = env_or("SCANNER_MAX_MONEYNESS", cfg.filter.max_moneyness);
        cfg.filter.min_implied_volatility = env_or("SCANNER_MIN_IV", cfg.filter.min_implied_volatility);

        cfg
    }
}

/// Split a comma separated ticker list, upper-casing and dropping blanks
pub fn parse_ticker_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy + std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("Invalid value '{}' for {}, using {}", val, key, default);
            default
        }),
        Err(_) => default,
    }
}

/// Get the execution mode from environment or default to a single scan
pub fn get_execution_mode() -> String {
    std::env::var("SCANNER_MODE").unwrap_or_else(|_| "scan".to_string())
}

/// Get the watch-mode scan period, clamped to a sane range
pub fn get_scan_interval() -> Duration {
    let secs = env_or("SCANNER_INTERVAL_SECS", DEFAULT_SCAN_INTERVAL_SECS)
        .clamp(MIN_SCAN_INTERVAL_SECS, MAX_SCAN_INTERVAL_SECS);
    Duration::from_secs(secs)
}
