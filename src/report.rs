use crate::error::ScanError;
use crate::models::{OptionContract, SignalResult};
use crate::scanner::{PriceQuote, TickerOutcome, TickerReport};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const NO_OPTIONS_MESSAGE: &str = "No options match filter criteria.";

const INDENT: &str = "    ";

const TABLE_HEADERS: [&str; 10] = [
    "symbol",
    "type",
    "strike",
    "expiration",
    "last_price",
    "bid",
    "ask",
    "volume",
    "open_interest",
    "implied_volatility",
];

// Columns 2 and 4..=9 hold numbers and are right aligned
const NUMERIC_COLUMNS: [bool; 10] = [false, false, true, false, true, true, true, true, true, true];

pub fn render_scan_header(timestamp: &str) -> String {
    format!("=== Running 0-1 DTE scan at {} ===", timestamp)
}

/// Text block for one ticker outcome, lines joined with '\n'.
/// Analyzed tickers are stamped with their own analysis time.
pub fn render_outcome(outcome: &TickerOutcome) -> String {
    match outcome {
        TickerOutcome::Analyzed(report) => {
            let timestamp = report.analyzed_at.format(TIMESTAMP_FORMAT).to_string();
            render_ticker_report(report, &timestamp)
        }
        TickerOutcome::Skipped { ticker, error } => render_skip(ticker, error),
    }
}

pub fn render_skip(ticker: &str, error: &ScanError) -> String {
    match error {
        ScanError::DataUnavailable(_) => format!("No data for {}", ticker),
        other => format!("Error processing {}: {}", ticker, other),
    }
}

pub fn render_ticker_report(report: &TickerReport, timestamp: &str) -> String {
    let mut lines = vec![
        render_price_line(&report.ticker, &report.signals, timestamp),
        format!("{}{}", INDENT, render_signal_line(&report.signals)),
    ];

    if report.contracts.is_empty() {
        lines.push(format!("{}{}", INDENT, NO_OPTIONS_MESSAGE));
    } else {
        lines.push(format!("{}Filtered 0-1 DTE Options:", INDENT));
        lines.push(render_contract_table(&report.contracts));
    }

    lines.join("\n")
}

pub fn render_price_line(ticker: &str, signals: &SignalResult, timestamp: &str) -> String {
    format!(
        "{} {}: Price={:.2}, RSI={}, Return={}%",
        timestamp,
        ticker,
        signals.price,
        fmt_optional(signals.rsi_value),
        fmt_optional(signals.return_percent)
    )
}

pub fn render_signal_line(signals: &SignalResult) -> String {
    format!(
        "Signals: {}, Breakout: {}",
        signals.rsi_signal, signals.breakout_signal
    )
}

fn fmt_optional(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => "n/a".to_string(),
    }
}

fn contract_row(c: &OptionContract) -> [String; 10] {
    [
        c.symbol.clone(),
        c.option_type.to_string(),
        format!("{:.2}", c.strike),
        c.expiration.format("%Y-%m-%d").to_string(),
        format!("{:.2}", c.last_price),
        format!("{:.2}", c.bid),
        format!("{:.2}", c.ask),
        c.volume.to_string(),
        c.open_interest.to_string(),
        format!("{:.4}", c.implied_volatility),
    ]
}

/// Column-aligned table, header first, one contract per row
pub fn render_contract_table(contracts: &[OptionContract]) -> String {
    let rows: Vec<[String; 10]> = contracts.iter().map(contract_row).collect();

    let mut widths: [usize; 10] = TABLE_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let header: Vec<String> = TABLE_HEADERS.iter().map(|h| h.to_string()).collect();
    let mut lines = vec![format_row(&header, &widths)];
    lines.extend(rows.iter().map(|row| format_row(row, &widths)));
    lines.join("\n")
}

fn format_row(cells: &[String], widths: &[usize; 10]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            if NUMERIC_COLUMNS[i] {
                format!("{:>width$}", cell, width = widths[i])
            } else {
                format!("{:<width$}", cell, width = widths[i])
            }
        })
        .collect();
    format!("{}{}", INDENT, padded.join("  ").trim_end())
}

pub fn render_quote(quote: &PriceQuote) -> String {
    match quote.price {
        Some(price) => format!("{}: ${:.2}", quote.ticker, price),
        None => format!("{}: price not available", quote.ticker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BreakoutSignal, OptionType, RsiSignal};
    use chrono::{Local, NaiveDate, TimeZone};

    fn signals() -> SignalResult {
        SignalResult {
            price: 114.0,
            rsi_value: Some(100.0),
            return_percent: Some(0.884955),
            rsi_signal: RsiSignal::Sell,
            breakout_signal: BreakoutSignal::Breakout,
        }
    }

    fn contract() -> OptionContract {
        OptionContract {
            symbol: "AAPL250307C00225000".to_string(),
            underlying: "AAPL".to_string(),
            option_type: OptionType::Call,
            strike: 225.0,
            expiration: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            last_price: 3.1,
            bid: 3.0,
            ask: 3.2,
            volume: 1520,
            open_interest: 4300,
            implied_volatility: 0.61,
        }
    }

    #[test]
    fn test_price_line_format() {
        let line = render_price_line("AAPL", &signals(), "2025-03-07 10:00:00");
        assert_eq!(line, "2025-03-07 10:00:00 AAPL: Price=114.00, RSI=100.00, Return=0.88%");
    }

    #[test]
    fn test_undefined_indicators_print_na() {
        let mut s = signals();
        s.rsi_value = None;
        s.return_percent = None;
        let line = render_price_line("AAPL", &s, "ts");
        assert_eq!(line, "ts AAPL: Price=114.00, RSI=n/a, Return=n/a%");
    }

    #[test]
    fn test_report_without_contracts() {
        let report = TickerReport {
            ticker: "MSFT".to_string(),
            analyzed_at: Local::now(),
            signals: signals(),
            contracts: vec![],
        };
        let text = render_ticker_report(&report, "ts");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "    Signals: sell, Breakout: breakout");
        assert_eq!(lines[2], "    No options match filter criteria.");
    }

    #[test]
    fn test_contract_table() {
        let table = render_contract_table(&[contract()]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("symbol"));
        assert!(lines[0].ends_with("implied_volatility"));
        assert!(lines[1].contains("AAPL250307C00225000"));
        assert!(lines[1].contains("2025-03-07"));
        assert!(lines[1].ends_with("0.6100"));

        // Columns line up: the strike ends where its header ends
        let header_end = lines[0].find("strike").unwrap() + "strike".len();
        assert_eq!(&lines[1][header_end - 6..header_end], "225.00");
    }

    #[test]
    fn test_skip_lines() {
        let no_data = render_skip("AMD", &ScanError::DataUnavailable("empty".to_string()));
        assert_eq!(no_data, "No data for AMD");

        let failed = render_skip("AMD", &ScanError::OptionsFetch("timeout".to_string()));
        assert_eq!(failed, "Error processing AMD: Options chain fetch failed: timeout");
    }

    #[test]
    fn test_quote_lines() {
        let ok = PriceQuote { ticker: "AAPL".to_string(), price: Some(227.456) };
        let missing = PriceQuote { ticker: "PEP".to_string(), price: None };
        assert_eq!(render_quote(&ok), "AAPL: $227.46");
        assert_eq!(render_quote(&missing), "PEP: price not available");
    }

    #[test]
    fn test_outcome_uses_report_time() {
        let report = TickerReport {
            ticker: "AAPL".to_string(),
            analyzed_at: Local.with_ymd_and_hms(2025, 3, 7, 10, 15, 42).unwrap(),
            signals: signals(),
            contracts: vec![],
        };
        let text = render_outcome(&TickerOutcome::Analyzed(report));
        assert!(text.starts_with("2025-03-07 10:15:42 AAPL: Price=114.00"));
    }
}
