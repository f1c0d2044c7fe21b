//! Risk engine facade
//!
//! This module wires the quantitative models to the collaborator traits.
//! Portfolio and product ids are resolved through the data source; every
//! computation is then delegated to the pure functions in [`crate::models`].

use crate::config::EngineConfig;
use crate::error::{RiskError, Result};
use crate::instruments::{AssetClass, Position, RiskStatus, StructuredProduct};
use crate::models::{
    self, BlackScholesParams, CreditAssessment, CreditProfile, LiquidityInputs, LiquidityMetrics,
    OptionQuote, PortfolioAnalyzer, PortfolioReturnModel, PortfolioSnapshot, PositionStressEngine,
    PositionStressReport, ProductGreeks, ProductValuation, ScenarioResult, SimulationContext,
    StructuredPricer, StructuredStressResult,
};
use crate::source::{MarketDataSource, PortfolioId, PositionSource, ProductId, ProductSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Every portfolio metric in one record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioRiskReport {
    pub portfolio_id: PortfolioId,
    pub portfolio_value: f64,
    pub parametric_var_95: f64,
    pub parametric_var_99: f64,
    pub monte_carlo_var_95: f64,
    pub monte_carlo_var_99: f64,
    pub expected_shortfall_95: f64,
    pub expected_shortfall_99: f64,
    pub max_drawdown: f64,
    pub beta: f64,
    pub concentration_ratio: f64,
    pub sharpe_ratio: f64,
    pub stress: PositionStressReport,
    pub allocation: BTreeMap<AssetClass, f64>,
}

/// Risk engine
///
/// Owns a read-only calibration and a data source. Holds no mutable state,
/// so a shared reference can be used from many threads at once.
pub struct RiskEngine<S> {
    config: EngineConfig,
    source: S,
    pricer: StructuredPricer,
    stress: PositionStressEngine,
}

impl<S> RiskEngine<S> {
    /// Create an engine from a validated configuration
    pub fn new(config: EngineConfig, source: S) -> Result<Self> {
        config.validate()?;
        info!(
            structured_rate = config.structured_risk_free_rate,
            portfolio_seed = config.simulation.portfolio_seed,
            barrier_seed = config.simulation.barrier_seed,
            "Created risk engine"
        );

        Ok(Self {
            pricer: StructuredPricer::from_config(&config),
            stress: PositionStressEngine::with_standard_scenarios(),
            config,
            source,
        })
    }

    /// Create an engine with the default calibration
    pub fn with_defaults(source: S) -> Self {
        let config = EngineConfig::default();
        Self {
            pricer: StructuredPricer::from_config(&config),
            stress: PositionStressEngine::with_standard_scenarios(),
            config,
            source,
        }
    }

    /// Load the calibration from a YAML string
    ///
    /// # Example
    ///
    /// ```
    /// use rv_risk::{InMemoryStore, RiskEngine};
    ///
    /// let yaml = r#"
    /// structured_risk_free_rate: 0.04
    /// "#;
    ///
    /// let engine = RiskEngine::from_yaml(yaml, InMemoryStore::new()).unwrap();
    /// assert_eq!(engine.config().structured_risk_free_rate, 0.04);
    /// ```
    pub fn from_yaml(yaml: &str, source: S) -> Result<Self> {
        Self::new(EngineConfig::from_yaml(yaml)?, source)
    }

    /// Load the calibration from a JSON string
    pub fn from_json(json: &str, source: S) -> Result<Self> {
        Self::new(EngineConfig::from_json(json)?, source)
    }

    /// Replace the position-level stress scenarios
    pub fn with_stress_engine(mut self, stress: PositionStressEngine) -> Self {
        self.stress = stress;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Context used by portfolio simulations unless the caller supplies one
    pub fn portfolio_simulation(&self) -> SimulationContext {
        SimulationContext::seeded(
            self.config.simulation.portfolio_seed,
            self.config.simulation.monte_carlo_draws,
        )
    }

    /// Black-Scholes call and put with Greeks at a caller-supplied rate
    pub fn price_option(&self, params: &BlackScholesParams) -> Result<OptionQuote> {
        models::price_option(params)
    }

    pub fn credit_risk(&self, profile: &CreditProfile) -> Result<CreditAssessment> {
        models::assess_credit_risk(profile)
    }

    /// Narrative scenarios on a portfolio value
    pub fn stress_test(&self, portfolio_value: f64) -> Result<Vec<ScenarioResult>> {
        models::stress_test(portfolio_value)
    }

    pub fn liquidity_metrics(&self, inputs: &LiquidityInputs) -> Result<LiquidityMetrics> {
        models::liquidity_metrics(inputs)
    }

    pub fn price_structured_product(
        &self,
        product: &StructuredProduct,
        as_of: DateTime<Utc>,
    ) -> Result<f64> {
        self.pricer.price(product, as_of)
    }

    pub fn compute_greeks(
        &self,
        product: &StructuredProduct,
        as_of: DateTime<Utc>,
    ) -> Result<ProductGreeks> {
        self.pricer.greeks(product, as_of)
    }

    pub fn assess_risk_status(
        &self,
        product: &StructuredProduct,
        as_of: DateTime<Utc>,
    ) -> Result<RiskStatus> {
        self.pricer.assess_risk_status(product, as_of)
    }

    /// Price, Greeks and risk tier in one valuation record
    pub fn value_structured_product(
        &self,
        product: &StructuredProduct,
        as_of: DateTime<Utc>,
    ) -> Result<ProductValuation> {
        self.pricer.value(product, as_of)
    }

    pub fn stress_test_structured_product(
        &self,
        product: &StructuredProduct,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<StructuredStressResult>> {
        models::stress_structured_product(&self.pricer, product, as_of)
    }
}

impl<S: PositionSource> RiskEngine<S> {
    /// Load and validate the positions of a portfolio
    fn positions(&self, portfolio_id: PortfolioId) -> Result<Vec<Position>> {
        let positions = self.source.list_positions(portfolio_id)?;
        for position in &positions {
            position.validate()?;
        }
        debug!(portfolio_id, positions = positions.len(), "Loaded positions");
        Ok(positions)
    }

    fn return_model(&self, positions: &[Position]) -> PortfolioReturnModel {
        PortfolioReturnModel::new(
            positions,
            &self.config.asset_classes,
            self.config.trading_days_per_year,
        )
    }

    pub fn portfolio_value(&self, portfolio_id: PortfolioId) -> Result<f64> {
        Ok(self.positions(portfolio_id)?.iter().map(Position::value).sum())
    }

    pub fn portfolio_snapshot(&self, portfolio_id: PortfolioId) -> Result<PortfolioSnapshot> {
        Ok(PortfolioSnapshot::from_positions(&self.positions(portfolio_id)?))
    }

    /// Fraction of value per asset class; empty for a portfolio without value
    pub fn asset_allocation(&self, portfolio_id: PortfolioId) -> Result<BTreeMap<AssetClass, f64>> {
        Ok(self.portfolio_snapshot(portfolio_id)?.allocation)
    }

    pub fn concentration_ratio(&self, portfolio_id: PortfolioId) -> Result<f64> {
        Ok(self.portfolio_snapshot(portfolio_id)?.concentration_ratio)
    }

    /// Parametric VaR from the calibrated asset-class volatilities
    pub fn portfolio_var(&self, portfolio_id: PortfolioId, confidence_level: f64) -> Result<f64> {
        let positions = self.positions(portfolio_id)?;
        PortfolioAnalyzer::new(&positions, &self.config).parametric_var(confidence_level)
    }

    /// Monte Carlo VaR with the configured portfolio seed
    pub fn monte_carlo_var(
        &self,
        portfolio_id: PortfolioId,
        confidence_level: f64,
        simulations: usize,
    ) -> Result<f64> {
        let ctx = self.portfolio_simulation().with_simulations(simulations);
        self.monte_carlo_var_with(portfolio_id, confidence_level, &ctx)
    }

    /// Monte Carlo VaR with a caller-chosen seed and draw count
    pub fn monte_carlo_var_with(
        &self,
        portfolio_id: PortfolioId,
        confidence_level: f64,
        ctx: &SimulationContext,
    ) -> Result<f64> {
        let positions = self.positions(portfolio_id)?;
        models::monte_carlo_var(&self.return_model(&positions), confidence_level, ctx)
    }

    pub fn expected_shortfall(&self, portfolio_id: PortfolioId, confidence_level: f64) -> Result<f64> {
        let ctx = self
            .portfolio_simulation()
            .with_simulations(self.config.simulation.expected_shortfall_draws);
        self.expected_shortfall_with(portfolio_id, confidence_level, &ctx)
    }

    pub fn expected_shortfall_with(
        &self,
        portfolio_id: PortfolioId,
        confidence_level: f64,
        ctx: &SimulationContext,
    ) -> Result<f64> {
        let positions = self.positions(portfolio_id)?;
        models::expected_shortfall(&self.return_model(&positions), confidence_level, ctx)
    }

    /// Simulated peak-to-trough loss over `days` trading days
    pub fn max_drawdown(&self, portfolio_id: PortfolioId, days: u32) -> Result<f64> {
        self.max_drawdown_with(portfolio_id, days, &self.portfolio_simulation())
    }

    pub fn max_drawdown_with(
        &self,
        portfolio_id: PortfolioId,
        days: u32,
        ctx: &SimulationContext,
    ) -> Result<f64> {
        let positions = self.positions(portfolio_id)?;
        Ok(models::max_drawdown(&self.return_model(&positions), days, ctx))
    }

    pub fn portfolio_beta(&self, portfolio_id: PortfolioId) -> Result<f64> {
        let positions = self.positions(portfolio_id)?;
        Ok(PortfolioAnalyzer::new(&positions, &self.config).beta())
    }

    pub fn expected_return(&self, portfolio_id: PortfolioId) -> Result<f64> {
        let positions = self.positions(portfolio_id)?;
        Ok(PortfolioAnalyzer::new(&positions, &self.config).expected_return())
    }

    pub fn sharpe_ratio(&self, portfolio_id: PortfolioId) -> Result<f64> {
        let positions = self.positions(portfolio_id)?;
        Ok(PortfolioAnalyzer::new(&positions, &self.config).sharpe_ratio())
    }

    /// Position-level scenario losses
    pub fn position_stress(&self, portfolio_id: PortfolioId) -> Result<PositionStressReport> {
        Ok(self.stress.run(&self.positions(portfolio_id)?))
    }

    /// Every portfolio metric computed from a single read of the positions
    pub fn risk_report(&self, portfolio_id: PortfolioId) -> Result<PortfolioRiskReport> {
        let positions = self.positions(portfolio_id)?;
        let snapshot = PortfolioSnapshot::from_positions(&positions);
        let analyzer = PortfolioAnalyzer::new(&positions, &self.config);
        let model = self.return_model(&positions);

        let sim = &self.config.simulation;
        let var_ctx = self.portfolio_simulation();
        let es_ctx = var_ctx.with_simulations(sim.expected_shortfall_draws);

        let report = PortfolioRiskReport {
            portfolio_id,
            portfolio_value: snapshot.total_value,
            parametric_var_95: analyzer.parametric_var(0.95)?,
            parametric_var_99: analyzer.parametric_var(0.99)?,
            monte_carlo_var_95: models::monte_carlo_var(&model, 0.95, &var_ctx)?,
            monte_carlo_var_99: models::monte_carlo_var(&model, 0.99, &var_ctx)?,
            expected_shortfall_95: models::expected_shortfall(&model, 0.95, &es_ctx)?,
            expected_shortfall_99: models::expected_shortfall(&model, 0.99, &es_ctx)?,
            max_drawdown: models::max_drawdown(&model, sim.drawdown_days, &var_ctx),
            beta: analyzer.beta(),
            concentration_ratio: snapshot.concentration_ratio,
            sharpe_ratio: analyzer.sharpe_ratio(),
            stress: self.stress.run(&positions),
            allocation: snapshot.allocation,
        };

        info!(
            portfolio_id,
            value = report.portfolio_value,
            var_95 = report.monte_carlo_var_95,
            "Built portfolio risk report"
        );
        Ok(report)
    }
}

impl<S: ProductSource> RiskEngine<S> {
    /// Look up a structured product, failing when it does not exist
    pub fn structured_product(&self, id: ProductId) -> Result<StructuredProduct> {
        self.source
            .structured_product(id)?
            .ok_or(RiskError::ProductNotFound(id))
    }

    pub fn value_product(&self, id: ProductId, as_of: DateTime<Utc>) -> Result<ProductValuation> {
        let product = self.structured_product(id)?;
        self.pricer.value(&product, as_of)
    }
}

impl<S: MarketDataSource> RiskEngine<S> {
    /// Overlay the latest quotes on a product's market inputs
    ///
    /// A missing quote keeps the product's own value for that input.
    pub fn refresh_market(&self, product: &StructuredProduct) -> StructuredProduct {
        let symbol = product.underlying.as_str();

        let spot = self.source.current_price(symbol).unwrap_or_else(|| {
            warn!(symbol, "No current price, keeping product spot");
            product.underlying_price
        });
        let volatility = self.source.implied_volatility(symbol).unwrap_or_else(|| {
            warn!(symbol, "No implied volatility, keeping product volatility");
            product.implied_volatility
        });

        product.with_market(spot, volatility)
    }
}

impl<S: ProductSource + MarketDataSource> RiskEngine<S> {
    /// Value a stored product at the latest market quotes
    pub fn reprice_with_market(&self, id: ProductId, as_of: DateTime<Utc>) -> Result<ProductValuation> {
        let product = self.refresh_market(&self.structured_product(id)?);
        self.pricer.value(&product, as_of)
    }
}
