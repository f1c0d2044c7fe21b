//! Liquidity risk metrics

use crate::error::{ensure_non_negative, ensure_positive, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Share of short-term liabilities assumed to run off in the stress window
const OUTFLOW_RATE: f64 = 0.3;

/// Balance sheet inputs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityInputs {
    pub cash_and_equivalents: f64,
    pub liquid_securities: f64,
    pub total_assets: f64,
    pub short_term_liabilities: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LiquidityRisk {
    Low,
    Medium,
    High,
}

impl fmt::Display for LiquidityRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LiquidityRisk::Low => "LOW",
            LiquidityRisk::Medium => "MEDIUM",
            LiquidityRisk::High => "HIGH",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityMetrics {
    /// (cash + liquid securities) / (30% of short-term liabilities)
    pub liquidity_coverage_ratio: f64,

    /// (total assets - short-term liabilities) / total assets
    pub net_stable_funding_ratio: f64,

    pub liquidity_buffer: f64,
    pub cash_ratio: f64,
    pub quick_ratio: f64,
    pub liquidity_risk: LiquidityRisk,
}

/// Compute liquidity ratios and the resulting risk tier
///
/// HIGH when either the coverage or the quick ratio is below 1, MEDIUM when
/// either is below 1.5, LOW otherwise.
pub fn liquidity_metrics(inputs: &LiquidityInputs) -> Result<LiquidityMetrics> {
    ensure_non_negative("Cash and equivalents", inputs.cash_and_equivalents)?;
    ensure_non_negative("Liquid securities", inputs.liquid_securities)?;
    ensure_positive("Total assets", inputs.total_assets)?;
    ensure_positive("Short-term liabilities", inputs.short_term_liabilities)?;

    let liabilities = inputs.short_term_liabilities;
    let buffer = inputs.cash_and_equivalents + inputs.liquid_securities;

    let lcr = buffer / (liabilities * OUTFLOW_RATE);
    let nsfr = (inputs.total_assets - liabilities) / inputs.total_assets;
    let cash_ratio = inputs.cash_and_equivalents / liabilities;
    let quick_ratio = buffer / liabilities;

    let liquidity_risk = if lcr < 1.0 || quick_ratio < 1.0 {
        LiquidityRisk::High
    } else if lcr < 1.5 || quick_ratio < 1.5 {
        LiquidityRisk::Medium
    } else {
        LiquidityRisk::Low
    };

    debug!(lcr, quick_ratio, risk = %liquidity_risk, "Computed liquidity metrics");

    Ok(LiquidityMetrics {
        liquidity_coverage_ratio: lcr,
        net_stable_funding_ratio: nsfr,
        liquidity_buffer: buffer,
        cash_ratio,
        quick_ratio,
        liquidity_risk,
    })
}
