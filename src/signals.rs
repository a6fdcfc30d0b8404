use crate::config::SignalThresholds;
use crate::models::{BreakoutSignal, Indicators, RsiSignal, SignalResult};

/// Classify RSI against strict oversold / overbought bounds.
/// An undefined RSI satisfies neither bound and is neutral.
pub fn classify_rsi(rsi_value: Option<f64>, thresholds: &SignalThresholds) -> RsiSignal {
    match rsi_value {
        Some(rsi) if rsi < thresholds.rsi_oversold => RsiSignal::Buy,
        Some(rsi) if rsi > thresholds.rsi_overbought => RsiSignal::Sell,
        _ => RsiSignal::Neutral,
    }
}

/// Breakout when the absolute last-bar return strictly exceeds the threshold
pub fn classify_breakout(return_percent: Option<f64>, thresholds: &SignalThresholds) -> BreakoutSignal {
    match return_percent {
        Some(ret) if ret.abs() > thresholds.breakout_percent => BreakoutSignal::Breakout,
        _ => BreakoutSignal::None,
    }
}

/// Run both classifiers over a set of indicator values
pub fn classify(indicators: &Indicators, thresholds: &SignalThresholds) -> SignalResult {
    SignalResult {
        price: indicators.price,
        rsi_value: indicators.rsi_value,
        return_percent: indicators.return_percent,
        rsi_signal: classify_rsi(indicators.rsi_value, thresholds),
        breakout_signal: classify_breakout(indicators.return_percent, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> SignalThresholds {
        SignalThresholds::default()
    }

    #[test]
    fn test_rsi_bounds_are_strict() {
        let t = thresholds();
        assert_eq!(classify_rsi(Some(30.0), &t), RsiSignal::Neutral);
        assert_eq!(classify_rsi(Some(70.0), &t), RsiSignal::Neutral);
        assert_eq!(classify_rsi(Some(29.999), &t), RsiSignal::Buy);
        assert_eq!(classify_rsi(Some(70.001), &t), RsiSignal::Sell);
        assert_eq!(classify_rsi(Some(50.0), &t), RsiSignal::Neutral);
    }

    #[test]
    fn test_breakout_bound_is_strict() {
        let t = thresholds();
        assert_eq!(classify_breakout(Some(0.5), &t), BreakoutSignal::None);
        assert_eq!(classify_breakout(Some(0.50001), &t), BreakoutSignal::Breakout);
        assert_eq!(classify_breakout(Some(-0.5), &t), BreakoutSignal::None);
        assert_eq!(classify_breakout(Some(-0.7), &t), BreakoutSignal::Breakout);
    }

    #[test]
    fn test_undefined_inputs() {
        let t = thresholds();
        assert_eq!(classify_rsi(None, &t), RsiSignal::Neutral);
        assert_eq!(classify_breakout(None, &t), BreakoutSignal::None);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = SignalThresholds {
            rsi_oversold: 20.0,
            rsi_overbought: 80.0,
            breakout_percent: 2.0,
        };
        assert_eq!(classify_rsi(Some(25.0), &t), RsiSignal::Neutral);
        assert_eq!(classify_rsi(Some(75.0), &t), RsiSignal::Neutral);
        assert_eq!(classify_breakout(Some(1.5), &t), BreakoutSignal::None);
    }

    #[test]
    fn test_classify_carries_values() {
        let indicators = Indicators {
            price: 114.0,
            rsi_value: Some(100.0),
            return_percent: Some(0.885),
        };
        let result = classify(&indicators, &thresholds());
        assert_eq!(result.price, 114.0);
        assert_eq!(result.rsi_signal, RsiSignal::Sell);
        assert_eq!(result.breakout_signal, BreakoutSignal::Breakout);
    }
}
