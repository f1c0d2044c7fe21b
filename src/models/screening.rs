//! Structured product screens

use crate::instruments::StructuredProduct;
use crate::models::structured::ProductValuation;
use chrono::{DateTime, Duration, Utc};

/// Products whose spot / barrier ratio is below `proximity`
pub fn near_barrier(products: &[StructuredProduct], proximity: f64) -> Vec<&StructuredProduct> {
    products
        .iter()
        .filter(|product| {
            product
                .barrier_distance()
                .is_some_and(|distance| distance < proximity)
        })
        .collect()
}

/// Products maturing within `days` of the valuation date, including matured ones
pub fn near_maturity(
    products: &[StructuredProduct],
    as_of: DateTime<Utc>,
    days: i64,
) -> Vec<&StructuredProduct> {
    let horizon = as_of + Duration::days(days);
    products
        .iter()
        .filter(|product| product.maturity_date <= horizon)
        .collect()
}

/// Valuations with |gamma| above the threshold
pub fn high_gamma(valuations: &[ProductValuation], threshold: f64) -> Vec<&ProductValuation> {
    valuations
        .iter()
        .filter(|valuation| valuation.greeks.gamma.abs() > threshold)
        .collect()
}
