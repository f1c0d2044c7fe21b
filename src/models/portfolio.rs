//! Portfolio analytics
//!
//! Value-weighted aggregates over the per-asset-class calibration:
//! - Portfolio value, allocation and concentration
//! - Parametric VaR
//! - Beta, expected return, volatility and Sharpe ratio

use crate::config::{AssetClassParams, EngineConfig};
use crate::error::{ensure_confidence, Result};
use crate::instruments::{AssetClass, Position};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Aggregate view of a portfolio's positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub total_value: f64,

    /// Fraction of total value per asset class; empty when the value is zero
    pub allocation: BTreeMap<AssetClass, f64>,

    /// Largest position value / total value
    pub concentration_ratio: f64,

    pub position_count: usize,
}

impl PortfolioSnapshot {
    pub fn from_positions(positions: &[Position]) -> Self {
        let total_value: f64 = positions.iter().map(Position::value).sum();

        if total_value <= 0.0 {
            return Self {
                total_value,
                allocation: BTreeMap::new(),
                concentration_ratio: 0.0,
                position_count: positions.len(),
            };
        }

        let mut allocation: BTreeMap<AssetClass, f64> = BTreeMap::new();
        for position in positions {
            *allocation.entry(position.asset_class.clone()).or_insert(0.0) +=
                position.value() / total_value;
        }

        let largest = positions
            .iter()
            .map(Position::value)
            .fold(0.0_f64, f64::max);

        Self {
            total_value,
            allocation,
            concentration_ratio: largest / total_value,
            position_count: positions.len(),
        }
    }
}

/// Calibration-weighted analytics over one set of positions
pub struct PortfolioAnalyzer<'a> {
    config: &'a EngineConfig,
    total_value: f64,
    weights: DVector<f64>,
    params: Vec<AssetClassParams>,
}

impl<'a> PortfolioAnalyzer<'a> {
    pub fn new(positions: &[Position], config: &'a EngineConfig) -> Self {
        let total_value: f64 = positions.iter().map(Position::value).sum();

        let weights = if total_value > 0.0 {
            DVector::from_iterator(positions.len(), positions.iter().map(|p| p.value() / total_value))
        } else {
            DVector::zeros(positions.len())
        };

        let params = positions
            .iter()
            .map(|p| {
                if !p.asset_class.is_known() {
                    debug!(asset_class = %p.asset_class, "Using fallback calibration");
                }
                *config.asset_classes.params(&p.asset_class)
            })
            .collect();

        Self {
            config,
            total_value,
            weights,
            params,
        }
    }

    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    fn weighted(&self, field: impl Fn(&AssetClassParams) -> f64) -> f64 {
        if self.total_value <= 0.0 {
            return 0.0;
        }
        let values = DVector::from_iterator(self.params.len(), self.params.iter().map(field));
        self.weights.dot(&values)
    }

    /// Value-weighted beta
    pub fn beta(&self) -> f64 {
        self.weighted(|p| p.beta)
    }

    /// Value-weighted expected annual return
    pub fn expected_return(&self) -> f64 {
        self.weighted(|p| p.expected_return)
    }

    /// Value-weighted annual volatility (no diversification benefit)
    pub fn annual_volatility(&self) -> f64 {
        self.weighted(|p| p.volatility)
    }

    pub fn daily_volatility(&self) -> f64 {
        self.annual_volatility() / self.config.trading_days_per_year.sqrt()
    }

    /// (expected return - risk-free rate) / annual volatility; zero when flat
    pub fn sharpe_ratio(&self) -> f64 {
        let volatility = self.annual_volatility();
        if volatility == 0.0 {
            return 0.0;
        }
        (self.expected_return() - self.config.sharpe_risk_free_rate) / volatility
    }

    /// Parametric VaR: value × daily volatility × z
    ///
    /// The z-score comes from the configured table by exact match on the
    /// confidence level, falling back to the default score.
    pub fn parametric_var(&self, confidence_level: f64) -> Result<f64> {
        ensure_confidence(confidence_level)?;
        if self.total_value <= 0.0 {
            return Ok(0.0);
        }

        let z = self.config.z_score(confidence_level);
        let var = self.total_value * self.daily_volatility() * z;
        debug!(confidence_level, z, var, "Parametric VaR");
        Ok(var)
    }
}
