use crate::config::IndicatorConfig;
use crate::models::{Indicators, PriceSeries};

/// RSI value reported when a window has neither gains nor losses
pub const FLAT_RSI: f64 = 50.0;

/// Compute the latest-bar indicators for a price series
pub fn compute_indicators(series: &PriceSeries, cfg: &IndicatorConfig) -> Indicators {
    let closes = series.closes();

    Indicators {
        price: series.last_price(),
        rsi_value: calculate_rsi(&closes, cfg.rsi_period),
        return_percent: calculate_return_percent(&closes),
    }
}

/// Wilder's RSI for the last close.
///
/// The first `period` deltas seed simple averages of gains and losses, every
/// later delta is folded in with Wilder smoothing `(avg * (period - 1) + x) / period`.
/// The whole series is walked on every call.
///
/// Returns `None` when fewer than `period + 1` closes are available.
/// A window with no losses is 100, a window with neither gains nor losses is [`FLAT_RSI`].
pub fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let (seed, rest) = deltas.split_at(period);

    let n = period as f64;
    let mut avg_gain = seed.iter().map(|d| d.max(0.0)).sum::<f64>() / n;
    let mut avg_loss = seed.iter().map(|d| (-d).max(0.0)).sum::<f64>() / n;

    for d in rest {
        avg_gain = (avg_gain * (n - 1.0) + d.max(0.0)) / n;
        avg_loss = (avg_loss * (n - 1.0) + (-d).max(0.0)) / n;
    }

    Some(rsi_from_averages(avg_gain, avg_loss))
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return FLAT_RSI;
        }
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// Percent change between the last two closes, `None` with fewer than two
pub fn calculate_return_percent(closes: &[f64]) -> Option<f64> {
    match closes {
        [.., prev, last] if *prev != 0.0 => Some((last - prev) / prev * 100.0),
        _ => None,
    }
}
