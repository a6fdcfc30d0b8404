pub mod config;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod models;
pub mod options_filter;
pub mod report;
pub mod scanner;
pub mod signals;
pub mod yahoo_client;

// Re-exports for convenience
pub use config::{FilterThresholds, IndicatorConfig, ScanConfig, SignalThresholds};
pub use error::ScanError;
pub use models::{
    BreakoutSignal, Indicators, OptionContract, OptionType, PricePoint, PriceSeries, RsiSignal,
    SignalResult,
};
pub use scanner::{MarketDataSource, PriceQuote, ScanReport, Scanner, TickerOutcome, TickerReport};
pub use yahoo_client::YahooClient;
