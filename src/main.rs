use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use dte_scanner::{config, logging, report, ScanConfig, ScanReport, Scanner, TickerOutcome, YahooClient};
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

fn banner(title: &str) {
    println!("{}", "=".repeat(60).blue());
    println!("{}", title.green().bold());
    println!("{}", "=".repeat(60).blue());
    println!();
}

fn print_scan(scan: &ScanReport) {
    let timestamp = scan.started_at.format(report::TIMESTAMP_FORMAT).to_string();
    println!();
    println!("{}", report::render_scan_header(&timestamp).cyan());

    for outcome in &scan.outcomes {
        let text = report::render_outcome(outcome);
        match outcome {
            TickerOutcome::Analyzed(_) => println!("{}", text),
            TickerOutcome::Skipped { .. } => println!("{}", text.yellow()),
        }
    }
}

fn print_summary(scan: &ScanReport, elapsed: std::time::Duration) {
    println!();
    println!("{}", "=".repeat(60).blue());
    println!("{}", "Summary".cyan().bold());
    println!("{}", "=".repeat(60).blue());
    println!("{} Analyzed: {}", "✓".green(), scan.analyzed_count());
    println!("{} Skipped: {}", "✗".red(), scan.skipped_count());
    println!("{} Time taken: {:.2}s", "⏱".yellow(), elapsed.as_secs_f64());
}

/// Single pass over the configured tickers
async fn run_scan(scanner: &Scanner<YahooClient>) -> Result<()> {
    let start_time = std::time::Instant::now();
    println!("{} Tickers: {}", "ℹ".blue(), scanner.config().tickers.join(", "));
    let scan = scanner.run_scan(Local::now().date_naive()).await;
    print_scan(&scan);
    print_summary(&scan, start_time.elapsed());
    Ok(())
}

/// Run `on_tick` every `period` until `shutdown` resolves.
///
/// `shutdown` is polled for the whole loop, so a signal that arrives while a
/// tick is running stops the loop before the next one starts.
async fn watch_loop<S, F, Fut>(period: Duration, shutdown: S, mut on_tick: F) -> Result<()>
where
    S: Future,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => return Ok(()),
            _ = ticker.tick() => on_tick().await?,
        }
    }
}

/// Re-scan on a fixed period until Ctrl-C
async fn run_watch(scanner: &Scanner<YahooClient>) -> Result<()> {
    let period = config::get_scan_interval();
    println!("{} Scanning every {}s, Ctrl-C to stop", "ℹ".blue(), period.as_secs());

    watch_loop(period, tokio::signal::ctrl_c(), || run_scan(scanner)).await?;

    info!("Ctrl-C received, stopping watch mode");
    println!("{}", "Stopped.".yellow());
    Ok(())
}

/// Latest price for the top-10 list
async fn run_quotes(scanner: &Scanner<YahooClient>) -> Result<()> {
    let tickers: Vec<String> = config::TOP_10_TICKERS.iter().map(|t| t.to_string()).collect();
    for quote in scanner.latest_prices(&tickers).await {
        let line = report::render_quote(&quote);
        match quote.price {
            Some(_) => println!("{}", line),
            None => println!("{}", line.yellow()),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Logging disabled: {:#}", e);
    }

    let mode = config::get_execution_mode();
    let scan_config = ScanConfig::from_env();
    info!(mode = mode.as_str(), tickers = ?scan_config.tickers, "Configuration loaded");

    let scanner = Scanner::new(YahooClient::new()?, scan_config);

    match mode.as_str() {
        "scan" => {
            banner("Starting 0-1 DTE Options Signal Tool...");
            run_scan(&scanner).await?;
        }
        "watch" => {
            banner("0-1 DTE Options Signal Tool (watch)");
            run_watch(&scanner).await?;
        }
        "quotes" => {
            banner("Latest Prices");
            run_quotes(&scanner).await?;
        }
        other => {
            warn!(mode = other, "Unknown execution mode");
            eprintln!("Invalid mode '{}'. Use 'scan', 'watch' or 'quotes'", other);
            eprintln!("Set SCANNER_MODE environment variable to control execution mode");
            eprintln!("Examples:");
            eprintln!("  SCANNER_MODE=scan cargo run                              # One scan");
            eprintln!("  SCANNER_MODE=watch SCANNER_INTERVAL_SECS=300 cargo run   # Re-scan every 5 minutes");
            eprintln!("  SCANNER_MODE=quotes cargo run                            # Latest prices");
            eprintln!("  SCANNER_TICKERS=AAPL,TSLA SCANNER_MIN_IV=0.3 cargo run   # Custom tickers and IV floor");
            std::process::exit(1);
        }
    }

    Ok(())
}
