use crate::config::FilterThresholds;
use crate::error::ScanError;
use crate::models::OptionContract;
use chrono::NaiveDate;

/// Signed calendar days from `today` to `expiry` (0 on expiry day)
pub fn days_to_expiry(expiry: NaiveDate, today: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Keep expirations within `window_days` of today in either direction.
///
/// With a 1-day window this admits yesterday, today and tomorrow. Input order
/// is preserved.
pub fn select_expirations(expirations: &[NaiveDate], today: NaiveDate, window_days: i64) -> Vec<NaiveDate> {
    expirations
        .iter()
        .copied()
        .filter(|&exp| days_to_expiry(exp, today).abs() <= window_days)
        .collect()
}

/// Relative distance of a strike from the reference price
pub fn moneyness(strike: f64, reference_price: f64) -> f64 {
    (strike - reference_price).abs() / reference_price
}

fn passes(contract: &OptionContract, reference_price: f64, thresholds: &FilterThresholds) -> bool {
    contract.volume >= thresholds.min_volume
        && contract.open_interest >= thresholds.min_open_interest
        && contract.implied_volatility >= thresholds.min_implied_volatility
        && moneyness(contract.strike, reference_price) <= thresholds.max_moneyness
}

/// Keep liquid, high-IV contracts near the reference price, in input order.
///
/// A reference price that is not strictly positive leaves moneyness undefined
/// and is rejected before any contract is looked at.
pub fn filter_options(
    contracts: &[OptionContract],
    reference_price: f64,
    thresholds: &FilterThresholds,
) -> Result<Vec<OptionContract>, ScanError> {
    if !reference_price.is_finite() || reference_price <= 0.0 {
        return Err(ScanError::InvalidReferencePrice(reference_price));
    }

    Ok(contracts
        .iter()
        .filter(|c| passes(c, reference_price, thresholds))
        .cloned()
        .collect())
}
