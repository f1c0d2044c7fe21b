//! Stress testing and scenario analysis
//!
//! Three independent stress surfaces:
//! - Narrative scenarios applied to a total portfolio value
//! - Per-asset-class shock tables applied to individual positions
//! - Spot, volatility, rate, barrier and time shocks on a structured product

use crate::error::{ensure_non_negative, Result};
use crate::instruments::{AssetClass, Position, StructuredProduct};
use crate::models::structured::StructuredPricer;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Historical-style scenario expressed on the whole portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeScenario {
    pub name: String,
    pub description: String,

    /// Fractional change in portfolio value (e.g. -0.32)
    pub percentage_change: f64,

    /// Change in 95% VaR, in percent
    pub var95_change: i32,

    /// Peak-to-trough drawdown, in percent
    pub max_drawdown: i32,

    pub recovery_months: u32,
}

impl NarrativeScenario {
    fn new(
        name: &str,
        description: &str,
        percentage_change: f64,
        var95_change: i32,
        max_drawdown: i32,
        recovery_months: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            percentage_change,
            var95_change,
            max_drawdown,
            recovery_months,
        }
    }

    /// The six standard narrative scenarios
    pub fn standard_set() -> Vec<Self> {
        vec![
            Self::new(
                "Market Crash (2008-style)",
                "Severe market downturn with 40% equity decline, 20% bond decline",
                -0.32,
                150,
                42,
                24,
            ),
            Self::new(
                "Interest Rate Shock",
                "300bp sudden interest rate increase affecting bonds and equity",
                -0.23,
                80,
                25,
                18,
            ),
            Self::new(
                "Pandemic Crisis (COVID-19 style)",
                "Global pandemic causing economic shutdown and market volatility",
                -0.35,
                200,
                38,
                12,
            ),
            Self::new(
                "Inflation Spike",
                "Persistent high inflation (8%+) eroding real returns",
                -0.18,
                60,
                22,
                36,
            ),
            Self::new(
                "Geopolitical Crisis",
                "Major geopolitical conflict affecting global markets",
                -0.25,
                120,
                28,
                15,
            ),
            Self::new(
                "Liquidity Crisis",
                "Severe liquidity crunch with credit markets freezing",
                -0.30,
                180,
                35,
                20,
            ),
        ]
    }

    pub fn apply(&self, portfolio_value: f64) -> ScenarioResult {
        let value_change = portfolio_value * self.percentage_change;
        ScenarioResult {
            scenario: self.name.clone(),
            description: self.description.clone(),
            stressed_value: portfolio_value + value_change,
            value_change,
            percentage_change: self.percentage_change * 100.0,
            var95_change: self.var95_change,
            max_drawdown: self.max_drawdown,
            recovery_months: self.recovery_months,
        }
    }
}

/// Outcome of one narrative scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: String,
    pub description: String,
    pub stressed_value: f64,
    pub value_change: f64,

    /// In percent (e.g. -32.0)
    pub percentage_change: f64,

    pub var95_change: i32,
    pub max_drawdown: i32,
    pub recovery_months: u32,
}

/// Apply every standard narrative scenario to a portfolio value
pub fn stress_test(portfolio_value: f64) -> Result<Vec<ScenarioResult>> {
    ensure_non_negative("Portfolio value", portfolio_value)?;
    Ok(NarrativeScenario::standard_set()
        .iter()
        .map(|scenario| scenario.apply(portfolio_value))
        .collect())
}

/// Per-asset-class shock table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShockScenario {
    pub name: String,

    /// Signed fractional shock per asset class (e.g. -0.40 for -40%)
    pub shocks: BTreeMap<AssetClass, f64>,
}

impl ShockScenario {
    pub fn new(name: impl Into<String>, shocks: &[(AssetClass, f64)]) -> Self {
        Self {
            name: name.into(),
            shocks: shocks.iter().cloned().collect(),
        }
    }

    /// Shock for an asset class; classes not in the table are unshocked
    pub fn shock_for(&self, asset_class: &AssetClass) -> f64 {
        match self.shocks.get(asset_class) {
            Some(shock) => *shock,
            None => {
                debug!(scenario = %self.name, asset_class = %asset_class, "No shock for asset class");
                0.0
            }
        }
    }

    /// Loss of a set of positions under this scenario
    ///
    /// Only negative shocks count; a position whose class gains under the
    /// scenario contributes nothing rather than offsetting other losses.
    pub fn loss(&self, positions: &[Position]) -> f64 {
        positions
            .iter()
            .map(|position| {
                let shock = self.shock_for(&position.asset_class);
                if shock < 0.0 {
                    position.value() * shock.abs()
                } else {
                    0.0
                }
            })
            .sum()
    }
}

/// Loss of one position-level scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioLoss {
    pub scenario: String,
    pub loss: f64,
}

/// All scenario losses of a portfolio plus the worst one
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionStressReport {
    pub losses: Vec<ScenarioLoss>,
    pub worst_scenario: Option<String>,
    pub worst_loss: f64,
}

impl PositionStressReport {
    pub fn loss_for(&self, scenario: &str) -> Option<f64> {
        self.losses
            .iter()
            .find(|entry| entry.scenario == scenario)
            .map(|entry| entry.loss)
    }
}

/// Position-level stress testing engine
#[derive(Debug, Clone)]
pub struct PositionStressEngine {
    scenarios: Vec<ShockScenario>,
}

impl PositionStressEngine {
    pub fn new(scenarios: Vec<ShockScenario>) -> Self {
        Self { scenarios }
    }

    /// Market Crash, Interest Rate Shock, Black Swan and Inflation Spike
    pub fn with_standard_scenarios() -> Self {
        use AssetClass::{Bond, Derivative, Equity, Etf};

        Self::new(vec![
            ShockScenario::new(
                "Market Crash",
                &[(Equity, -0.40), (Bond, -0.05), (Etf, -0.35), (Derivative, -0.60)],
            ),
            ShockScenario::new(
                "Interest Rate Shock",
                &[(Equity, -0.15), (Bond, -0.20), (Etf, -0.12), (Derivative, -0.25)],
            ),
            ShockScenario::new(
                "Black Swan",
                &[(Equity, -0.50), (Bond, 0.10), (Etf, -0.45), (Derivative, -0.80)],
            ),
            ShockScenario::new(
                "Inflation Spike",
                &[(Equity, -0.20), (Bond, -0.25), (Etf, -0.18), (Derivative, -0.30)],
            ),
        ])
    }

    pub fn add_scenario(&mut self, scenario: ShockScenario) {
        self.scenarios.push(scenario);
    }

    pub fn scenarios(&self) -> &[ShockScenario] {
        &self.scenarios
    }

    /// Run every scenario; a portfolio without value yields an empty report
    pub fn run(&self, positions: &[Position]) -> PositionStressReport {
        let total_value: f64 = positions.iter().map(Position::value).sum();
        if total_value <= 0.0 {
            return PositionStressReport::default();
        }

        let losses: Vec<ScenarioLoss> = self
            .scenarios
            .iter()
            .map(|scenario| ScenarioLoss {
                scenario: scenario.name.clone(),
                loss: scenario.loss(positions),
            })
            .collect();

        let worst = losses
            .iter()
            .max_by(|a, b| a.loss.total_cmp(&b.loss));
        let worst_scenario = worst.map(|entry| entry.scenario.clone());
        let worst_loss = worst.map(|entry| entry.loss).unwrap_or(0.0);

        debug!(
            scenarios = losses.len(),
            worst = ?worst_scenario,
            worst_loss,
            "Ran position stress tests"
        );

        PositionStressReport {
            losses,
            worst_scenario,
            worst_loss,
        }
    }
}

impl Default for PositionStressEngine {
    fn default() -> Self {
        Self::with_standard_scenarios()
    }
}

const CRASH_SPOT_SHOCK: f64 = -0.20;
const VOLATILITY_SHOCK: f64 = 0.50;
const RATE_SHOCK: f64 = 0.02;
const TIME_DECAY_DAYS: i64 = 30;

/// Structured product scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructuredScenario {
    MarketCrash,
    VolatilitySpike,
    RateRise,
    BarrierBreach,
    TimeDecay,
}

impl StructuredScenario {
    pub fn label(&self) -> &'static str {
        match self {
            StructuredScenario::MarketCrash => "Market Crash (-20%)",
            StructuredScenario::VolatilitySpike => "Volatility Spike (+50%)",
            StructuredScenario::RateRise => "Rate Rise (+200bps)",
            StructuredScenario::BarrierBreach => "Barrier Breach",
            StructuredScenario::TimeDecay => "Time Decay (30d)",
        }
    }
}

impl fmt::Display for StructuredScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Scenario value of a structured product and its change from the current price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructuredStressResult {
    pub scenario: StructuredScenario,
    pub scenario_value: f64,

    /// Scenario value minus current value
    pub change: f64,
}

/// Reprice a structured product under each scenario
///
/// The barrier scenario is only run for products with a barrier. When spot
/// is already below the barrier the product is valued at its conversion
/// value (notional / strike × spot); otherwise at its current price.
pub fn stress_structured_product(
    pricer: &StructuredPricer,
    product: &StructuredProduct,
    as_of: DateTime<Utc>,
) -> Result<Vec<StructuredStressResult>> {
    let current = pricer.price(product, as_of)?;
    let result = |scenario, scenario_value: f64| StructuredStressResult {
        scenario,
        scenario_value,
        change: scenario_value - current,
    };

    let mut results = Vec::with_capacity(5);

    let crashed = product.with_market(
        product.underlying_price * (1.0 + CRASH_SPOT_SHOCK),
        product.implied_volatility,
    );
    results.push(result(StructuredScenario::MarketCrash, pricer.price(&crashed, as_of)?));

    let spiked = product.with_market(
        product.underlying_price,
        product.implied_volatility * (1.0 + VOLATILITY_SHOCK),
    );
    results.push(result(StructuredScenario::VolatilitySpike, pricer.price(&spiked, as_of)?));

    let rate_rise = pricer.price_at_rate(product, as_of, pricer.risk_free_rate() + RATE_SHOCK)?;
    results.push(result(StructuredScenario::RateRise, rate_rise));

    if let Some(barrier) = product.barrier {
        let value = if product.underlying_price < barrier {
            product.notional / product.strike * product.underlying_price
        } else {
            current
        };
        results.push(result(StructuredScenario::BarrierBreach, value));
    }

    let later = as_of + Duration::days(TIME_DECAY_DAYS);
    results.push(result(StructuredScenario::TimeDecay, pricer.price(product, later)?));

    debug!(product = %product.product_code, scenarios = results.len(), "Stressed structured product");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::instruments::fixtures::{product, valuation_date};
    use crate::instruments::ProductType;
    use approx::assert_relative_eq;

    fn positions() -> Vec<Position> {
        vec![
            Position::new("AAPL", "Equity", 100.0, 500.0).unwrap(), // 50_000
            Position::new("TLT", "Bond", 300.0, 100.0).unwrap(),    // 30_000
            Position::new("SPY", "ETF", 40.0, 500.0).unwrap(),      // 20_000
        ]
    }

    #[test]
    fn test_narrative_scenarios() {
        let results = stress_test(1_000_000.0).unwrap();
        assert_eq!(results.len(), 6);

        let crash = &results[0];
        assert_eq!(crash.scenario, "Market Crash (2008-style)");
        assert_relative_eq!(crash.value_change, -320_000.0, epsilon = 1e-6);
        assert_relative_eq!(crash.stressed_value, 680_000.0, epsilon = 1e-6);
        assert_relative_eq!(crash.percentage_change, -32.0, epsilon = 1e-9);
        assert_eq!(crash.var95_change, 150);
        assert_eq!(crash.max_drawdown, 42);
        assert_eq!(crash.recovery_months, 24);

        let liquidity = &results[5];
        assert_eq!(liquidity.scenario, "Liquidity Crisis");
        assert_eq!(liquidity.recovery_months, 20);

        assert!(stress_test(-1.0).is_err());
        assert!(stress_test(0.0).unwrap().iter().all(|r| r.value_change == 0.0));
    }

    #[test]
    fn test_position_losses() {
        let report = PositionStressEngine::with_standard_scenarios().run(&positions());

        assert_relative_eq!(
            report.loss_for("Market Crash").unwrap(),
            50_000.0 * 0.40 + 30_000.0 * 0.05 + 20_000.0 * 0.35,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            report.loss_for("Inflation Spike").unwrap(),
            50_000.0 * 0.20 + 30_000.0 * 0.25 + 20_000.0 * 0.18,
            epsilon = 1e-6
        );
        assert_eq!(report.worst_scenario.as_deref(), Some("Black Swan"));
    }

    #[test]
    fn test_black_swan_bond_gain_excluded() {
        let report = PositionStressEngine::with_standard_scenarios().run(&positions());
        let black_swan = report.loss_for("Black Swan").unwrap();

        // The +10% bond shock neither adds to nor offsets the loss
        assert_relative_eq!(black_swan, 50_000.0 * 0.50 + 20_000.0 * 0.45, epsilon = 1e-6);

        let bonds_only = vec![Position::new("TLT", "Bond", 300.0, 100.0).unwrap()];
        let report = PositionStressEngine::with_standard_scenarios().run(&bonds_only);
        assert_eq!(report.loss_for("Black Swan"), Some(0.0));
    }

    #[test]
    fn test_unknown_class_unshocked() {
        let positions = vec![Position::new("GLD", "Commodity", 10.0, 100.0).unwrap()];
        let report = PositionStressEngine::default().run(&positions);
        assert!(report.losses.iter().all(|entry| entry.loss == 0.0));
    }

    #[test]
    fn test_custom_scenario() {
        let mut engine = PositionStressEngine::new(Vec::new());
        engine.add_scenario(ShockScenario::new(
            "Equity Selloff",
            &[(AssetClass::Equity, -0.10)],
        ));
        assert_eq!(engine.scenarios().len(), 1);

        let report = engine.run(&positions());
        assert_relative_eq!(report.worst_loss, 5_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_portfolio_report() {
        let report = PositionStressEngine::default().run(&[]);
        assert!(report.losses.is_empty());
        assert!(report.worst_scenario.is_none());
        assert_eq!(report.worst_loss, 0.0);
    }

    #[test]
    fn test_structured_product_scenarios() {
        let pricer = StructuredPricer::from_config(&EngineConfig::default());
        let product = product(ProductType::EquityLinkedNote, Some(70.0));
        let results = stress_structured_product(&pricer, &product, valuation_date()).unwrap();

        let scenarios: Vec<_> = results.iter().map(|r| r.scenario).collect();
        assert_eq!(
            scenarios,
            vec![
                StructuredScenario::MarketCrash,
                StructuredScenario::VolatilitySpike,
                StructuredScenario::RateRise,
                StructuredScenario::BarrierBreach,
                StructuredScenario::TimeDecay,
            ]
        );

        let current = 10.450575415435083;
        let change = |s: StructuredScenario| {
            results.iter().find(|r| r.scenario == s).map(|r| r.change).unwrap()
        };

        assert_relative_eq!(change(StructuredScenario::MarketCrash), 1.8594146245008787 - current, epsilon = 1e-9);
        assert_relative_eq!(change(StructuredScenario::VolatilitySpike), 14.231244545520191 - current, epsilon = 1e-9);
        assert_relative_eq!(change(StructuredScenario::RateRise), 11.541472757878921 - current, epsilon = 1e-9);
        assert_relative_eq!(change(StructuredScenario::TimeDecay), 9.916015705385895 - current, epsilon = 1e-9);

        // Spot above the barrier: no conversion
        assert_eq!(change(StructuredScenario::BarrierBreach), 0.0);
    }

    #[test]
    fn test_breached_barrier_converts() {
        let pricer = StructuredPricer::from_config(&EngineConfig::default());
        let mut product = product(ProductType::EquityLinkedNote, Some(90.0));
        product.underlying_price = 85.0;

        let results = stress_structured_product(&pricer, &product, valuation_date()).unwrap();
        let breach = results
            .iter()
            .find(|r| r.scenario == StructuredScenario::BarrierBreach)
            .unwrap();
        assert_relative_eq!(breach.scenario_value, 100_000.0 / 100.0 * 85.0);
    }

    #[test]
    fn test_rate_rise_on_barrier_reverse_convertible() {
        use crate::models::pricing::{price_option, BlackScholesParams};
        use crate::models::simulation::{barrier_breach_probability, SimulationContext};

        let pricer = StructuredPricer::from_config(&EngineConfig::default());
        let mut product = product(ProductType::BarrierReverseConvertible, Some(90.0));
        product.implied_volatility = 0.30;

        let results = stress_structured_product(&pricer, &product, valuation_date()).unwrap();
        let rate_rise = results
            .iter()
            .find(|r| r.scenario == StructuredScenario::RateRise)
            .unwrap();

        // The breach probability is the same in both legs, so only the
        // option base moves
        let call = |rate| {
            price_option(&BlackScholesParams::new(100.0, 100.0, 1.0, rate, 0.30))
                .unwrap()
                .call_price
        };
        assert_relative_eq!(rate_rise.change, call(0.07) - call(0.05), epsilon = 1e-9);

        let ctx = SimulationContext::seeded(12345, 1_000);
        let probability = barrier_breach_probability(100.0, 90.0, 1.0, 0.05, 0.30, &ctx).unwrap();
        assert_relative_eq!(
            rate_rise.scenario_value,
            call(0.07) - probability * 100.0 * 0.5,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_no_barrier_scenario_without_barrier() {
        let pricer = StructuredPricer::from_config(&EngineConfig::default());
        let product = product(ProductType::Autocallable, None);
        let results = stress_structured_product(&pricer, &product, valuation_date()).unwrap();

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.scenario != StructuredScenario::BarrierBreach));
        assert_eq!(StructuredScenario::RateRise.to_string(), "Rate Rise (+200bps)");
    }
}
