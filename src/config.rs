//! Engine calibration and configuration
//!
//! The calibration tables (per-asset-class return, volatility and beta, the
//! parametric z-score table and the Monte Carlo defaults) are read-only once
//! an engine is built. They are typically loaded from YAML or JSON files.

use crate::error::{RiskError, Result};
use crate::instruments::AssetClass;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Annual calibration for one asset class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetClassParams {
    /// Expected annual return (e.g. 0.10 for 10%)
    pub expected_return: f64,

    /// Annual volatility (e.g. 0.25 for 25%)
    pub volatility: f64,

    /// Beta to the broad market
    pub beta: f64,
}

impl AssetClassParams {
    pub const fn new(expected_return: f64, volatility: f64, beta: f64) -> Self {
        Self {
            expected_return,
            volatility,
            beta,
        }
    }
}

/// Calibration for every supported asset class plus a fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetClassTable {
    pub equity: AssetClassParams,
    pub bond: AssetClassParams,
    pub etf: AssetClassParams,
    pub derivative: AssetClassParams,

    /// Used for any asset class not listed above
    pub fallback: AssetClassParams,
}

impl Default for AssetClassTable {
    fn default() -> Self {
        Self {
            equity: AssetClassParams::new(0.10, 0.25, 1.2),
            bond: AssetClassParams::new(0.04, 0.08, 0.1),
            etf: AssetClassParams::new(0.08, 0.18, 1.0),
            derivative: AssetClassParams::new(0.15, 0.45, 2.0),
            fallback: AssetClassParams::new(0.08, 0.20, 1.0),
        }
    }
}

impl AssetClassTable {
    /// Look up the calibration for an asset class
    pub fn params(&self, asset_class: &AssetClass) -> &AssetClassParams {
        match asset_class {
            AssetClass::Equity => &self.equity,
            AssetClass::Bond => &self.bond,
            AssetClass::Etf => &self.etf,
            AssetClass::Derivative => &self.derivative,
            AssetClass::Other(_) => &self.fallback,
        }
    }
}

/// One row of the parametric VaR z-score table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScore {
    pub confidence: f64,
    pub z: f64,
}

/// Monte Carlo defaults used by the engine facade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDefaults {
    /// Seed for portfolio VaR, expected shortfall and drawdown paths
    pub portfolio_seed: u64,

    /// Seed for the barrier-breach estimator used in structured pricing
    pub barrier_seed: u64,

    /// Draws for Monte Carlo VaR when the caller does not choose
    pub monte_carlo_draws: usize,

    /// Draws for expected shortfall
    pub expected_shortfall_draws: usize,

    /// Terminal-price paths for the barrier-breach estimator
    pub barrier_simulations: usize,

    /// Horizon of the drawdown simulation in the risk report
    pub drawdown_days: u32,
}

impl Default for SimulationDefaults {
    fn default() -> Self {
        Self {
            portfolio_seed: 12345,
            barrier_seed: 12345,
            monte_carlo_draws: 10_000,
            expected_shortfall_draws: 10_000,
            barrier_simulations: 1_000,
            drawdown_days: 252,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub asset_classes: AssetClassTable,

    /// Trading days used to scale annual figures to daily ones
    pub trading_days_per_year: f64,

    /// Fixed rate used for structured-product pricing and barrier paths
    pub structured_risk_free_rate: f64,

    /// Rate subtracted in the Sharpe ratio
    pub sharpe_risk_free_rate: f64,

    /// Exact-match table for parametric VaR
    pub parametric_z_scores: Vec<ZScore>,

    /// z-score used when the confidence level is not in the table
    pub default_z_score: f64,

    pub simulation: SimulationDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_classes: AssetClassTable::default(),
            trading_days_per_year: 252.0,
            structured_risk_free_rate: 0.05,
            sharpe_risk_free_rate: 0.03,
            parametric_z_scores: vec![
                ZScore { confidence: 0.90, z: 1.282 },
                ZScore { confidence: 0.95, z: 1.645 },
                ZScore { confidence: 0.99, z: 2.326 },
            ],
            default_z_score: 1.645,
            simulation: SimulationDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML string
    ///
    /// # Example
    ///
    /// ```
    /// use rv_risk::EngineConfig;
    ///
    /// let yaml = r#"
    /// sharpe_risk_free_rate: 0.02
    /// simulation:
    ///   portfolio_seed: 7
    ///   barrier_seed: 7
    ///   monte_carlo_draws: 5000
    ///   expected_shortfall_draws: 5000
    ///   barrier_simulations: 500
    ///   drawdown_days: 126
    /// "#;
    ///
    /// let config = EngineConfig::from_yaml(yaml).unwrap();
    /// assert_eq!(config.sharpe_risk_free_rate, 0.02);
    /// assert_eq!(config.structured_risk_free_rate, 0.05);
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(yaml)
            .map_err(|e| RiskError::Config(format!("Failed to parse YAML: {}", e)))?;
        config.validate()?;
        info!(z_scores = config.parametric_z_scores.len(), "Loaded engine configuration from YAML");
        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)
            .map_err(|e| RiskError::Config(format!("Failed to parse JSON: {}", e)))?;
        config.validate()?;
        info!(z_scores = config.parametric_z_scores.len(), "Loaded engine configuration from JSON");
        Ok(config)
    }

    /// z-score for a confidence level, falling back to the default
    pub fn z_score(&self, confidence_level: f64) -> f64 {
        self.parametric_z_scores
            .iter()
            .find(|entry| (entry.confidence - confidence_level).abs() < 1e-9)
            .map(|entry| entry.z)
            .unwrap_or(self.default_z_score)
    }

    /// Check the invariants every engine relies on
    pub fn validate(&self) -> Result<()> {
        if !(self.trading_days_per_year > 0.0) {
            return Err(RiskError::Config(format!(
                "trading_days_per_year must be positive, got {}",
                self.trading_days_per_year
            )));
        }

        let table = &self.asset_classes;
        for (name, params) in [
            ("equity", &table.equity),
            ("bond", &table.bond),
            ("etf", &table.etf),
            ("derivative", &table.derivative),
            ("fallback", &table.fallback),
        ] {
            if !(params.volatility >= 0.0) {
                return Err(RiskError::Config(format!(
                    "{} volatility must be non-negative, got {}",
                    name, params.volatility
                )));
            }
        }

        let sim = &self.simulation;
        if sim.monte_carlo_draws == 0
            || sim.expected_shortfall_draws == 0
            || sim.barrier_simulations == 0
        {
            return Err(RiskError::Config(
                "Simulation counts must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_calibration() {
        let config = EngineConfig::default();
        let table = &config.asset_classes;

        assert_eq!(table.params(&AssetClass::Equity).volatility, 0.25);
        assert_eq!(table.params(&AssetClass::Bond).expected_return, 0.04);
        assert_eq!(table.params(&AssetClass::Etf).beta, 1.0);
        assert_eq!(table.params(&AssetClass::Derivative).volatility, 0.45);

        let unknown = AssetClass::Other("Commodity".to_string());
        assert_eq!(table.params(&unknown), &AssetClassParams::new(0.08, 0.20, 1.0));

        assert_eq!(config.simulation.portfolio_seed, 12345);
        assert_eq!(config.simulation.barrier_seed, 12345);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_z_score_lookup() {
        let config = EngineConfig::default();
        assert_eq!(config.z_score(0.90), 1.282);
        assert_eq!(config.z_score(0.95), 1.645);
        assert_eq!(config.z_score(0.99), 2.326);

        // Not in the table
        assert_eq!(config.z_score(0.975), 1.645);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
structured_risk_free_rate: 0.04
asset_classes:
  equity: { expected_return: 0.12, volatility: 0.30, beta: 1.3 }
  bond: { expected_return: 0.04, volatility: 0.08, beta: 0.1 }
  etf: { expected_return: 0.08, volatility: 0.18, beta: 1.0 }
  derivative: { expected_return: 0.15, volatility: 0.45, beta: 2.0 }
  fallback: { expected_return: 0.08, volatility: 0.20, beta: 1.0 }
"#;

        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.structured_risk_free_rate, 0.04);
        assert_eq!(config.asset_classes.equity.volatility, 0.30);
        assert_eq!(config.trading_days_per_year, 252.0);
        assert_eq!(config.simulation, SimulationDefaults::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = EngineConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_yaml() {
        let yaml = "asset_classes: {equity: [broken";
        let result = EngineConfig::from_yaml(yaml);
        assert!(matches!(result, Err(RiskError::Config(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let json = r#"{"trading_days_per_year": 0.0}"#;
        assert!(EngineConfig::from_json(json).is_err());

        let mut config = EngineConfig::default();
        config.simulation.barrier_simulations = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.asset_classes.fallback.volatility = -0.1;
        assert!(config.validate().is_err());
    }
}
