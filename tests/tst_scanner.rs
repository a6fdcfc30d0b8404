use dte_scanner::{
    report::{render_outcome, render_quote},
    MarketDataSource, OptionContract, OptionType, PriceSeries, RsiSignal, ScanConfig, ScanError,
    Scanner, TickerOutcome,
};

use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory market data keyed by ticker; missing entries fail like a provider outage
#[derive(Default)]
struct FakeMarket {
    closes: HashMap<String, Vec<f64>>,
    expirations: HashMap<String, Vec<NaiveDate>>,
    chains: HashMap<(String, NaiveDate), Vec<OptionContract>>,
    calls: RefCell<Vec<String>>,
}

impl FakeMarket {
    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl MarketDataSource for FakeMarket {
    async fn fetch_price_series(&self, ticker: &str, _range: &str, _interval: &str) -> Result<PriceSeries> {
        self.log(format!("series:{}", ticker));
        let closes = self
            .closes
            .get(ticker)
            .ok_or_else(|| anyhow!("connection reset while fetching {}", ticker))?;
        let start = Utc.with_ymd_and_hms(2025, 3, 7, 14, 30, 0).unwrap();
        Ok(PriceSeries::from_closes(start, Duration::minutes(5), closes)?)
    }

    async fn fetch_latest_price(&self, ticker: &str) -> Result<f64> {
        self.closes
            .get(ticker)
            .and_then(|c| c.last().copied())
            .ok_or_else(|| anyhow!("no quote for {}", ticker))
    }

    async fn fetch_expirations(&self, ticker: &str) -> Result<Vec<NaiveDate>> {
        self.log(format!("expirations:{}", ticker));
        Ok(self.expirations.get(ticker).cloned().unwrap_or_default())
    }

    async fn fetch_option_chain(&self, ticker: &str, expiry: NaiveDate) -> Result<Vec<OptionContract>> {
        self.log(format!("chain:{}:{}", ticker, expiry));
        Ok(self
            .chains
            .get(&(ticker.to_string(), expiry))
            .cloned()
            .unwrap_or_default())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 7).unwrap()
}

fn contract(ticker: &str, symbol: &str, strike: f64) -> OptionContract {
    OptionContract {
        symbol: symbol.to_string(),
        underlying: ticker.to_string(),
        option_type: OptionType::Call,
        strike,
        expiration: today(),
        last_price: 1.5,
        bid: 1.4,
        ask: 1.6,
        volume: 300,
        open_interest: 1200,
        implied_volatility: 0.65,
    }
}

fn config(tickers: &[&str]) -> ScanConfig {
    ScanConfig {
        tickers: tickers.iter().map(|t| t.to_string()).collect(),
        ..ScanConfig::default()
    }
}

fn rising() -> Vec<f64> {
    (100..=114).map(|p| p as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_ticker_does_not_interrupt_scan() {
        let mut market = FakeMarket::default();
        market.closes.insert("AAPL".to_string(), rising());
        market.closes.insert("NVDA".to_string(), rising());
        // MSFT has no price data at all

        let scanner = Scanner::new(market, config(&["AAPL", "MSFT", "NVDA"]));
        let scan = scanner.run_scan(today()).await;

        let tickers: Vec<&str> = scan.outcomes.iter().map(|o| o.ticker()).collect();
        assert_eq!(tickers, vec!["AAPL", "MSFT", "NVDA"]);
        assert_eq!(scan.analyzed_count(), 2);
        assert_eq!(scan.skipped_count(), 1);

        assert!(scan.outcomes[0].is_analyzed());
        assert!(matches!(
            &scan.outcomes[1],
            TickerOutcome::Skipped { error: ScanError::DataUnavailable(_), .. }
        ));
        assert!(scan.outcomes[2].is_analyzed());

        let rendered: Vec<String> = scan.outcomes.iter().map(render_outcome).collect();
        assert!(rendered[0].contains(" AAPL: Price=114.00, RSI=100.00, Return=0.88%"));
        assert_eq!(rendered[1], "No data for MSFT");
        assert!(rendered[2].contains(" NVDA: Price=114.00"));
        assert!(rendered[2].ends_with("No options match filter criteria."));
    }

    #[tokio::test]
    async fn test_skipped_ticker_never_fetches_options() {
        let market = FakeMarket::default();
        let scanner = Scanner::new(market, config(&["AMD"]));
        let scan = scanner.run_scan(today()).await;

        assert_eq!(scan.skipped_count(), 1);
        let outcome = &scan.outcomes[0];
        assert_eq!(render_outcome(outcome), "No data for AMD");
    }

    #[tokio::test]
    async fn test_filtered_contracts_reach_the_report() {
        let mut market = FakeMarket::default();
        market.closes.insert("TSLA".to_string(), rising());
        market.expirations.insert(
            "TSLA".to_string(),
            vec![today(), today() + Duration::days(7)],
        );
        market.chains.insert(
            ("TSLA".to_string(), today()),
            vec![
                contract("TSLA", "TSLA250307C00115000", 115.0),
                contract("TSLA", "TSLA250307C00160000", 160.0),
            ],
        );

        let scanner = Scanner::new(market, config(&["TSLA"]));
        let scan = scanner.run_scan(today()).await;

        match &scan.outcomes[0] {
            TickerOutcome::Analyzed(report) => {
                assert_eq!(report.signals.rsi_signal, RsiSignal::Sell);
                assert_eq!(report.contracts.len(), 1);
                assert_eq!(report.contracts[0].symbol, "TSLA250307C00115000");

                let text = render_outcome(&scan.outcomes[0]);
                assert!(text.contains("Filtered 0-1 DTE Options:"));
                assert!(text.contains("TSLA250307C00115000"));
                assert!(!text.contains("TSLA250307C00160000"));
            }
            other => panic!("expected analyzed outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_latest_prices_marks_missing() {
        let mut market = FakeMarket::default();
        market.closes.insert("AAPL".to_string(), vec![227.48]);
        let scanner = Scanner::new(market, config(&[]));

        let quotes = scanner
            .latest_prices(&["AAPL".to_string(), "PEP".to_string()])
            .await;

        let lines: Vec<String> = quotes.iter().map(render_quote).collect();
        assert_eq!(lines, vec!["AAPL: $227.48", "PEP: price not available"]);
    }

    #[tokio::test]
    async fn test_scan_is_sequential_in_ticker_order() {
        let mut market = FakeMarket::default();
        market.closes.insert("A".to_string(), rising());
        market.closes.insert("B".to_string(), rising());

        let scanner = Scanner::new(market, config(&["A", "B"]));
        scanner.run_scan(today()).await;

        let calls = scanner.source().calls.borrow().clone();
        assert_eq!(calls, vec!["series:A", "expirations:A", "series:B", "expirations:B"]);
    }
}
