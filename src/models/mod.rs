//! # Quantitative Models
//!
//! Pure functions of their inputs and the engine calibration.
//!
//! ## Modules
//!
//! - `stats`: Standard normal CDF, PDF and inverse CDF
//! - `pricing`: Black-Scholes prices and Greeks
//! - `simulation`: Monte Carlo VaR, Expected Shortfall, drawdown, barrier breach
//! - `portfolio`: Snapshot, parametric VaR, beta, Sharpe ratio
//! - `structured`: Structured product pricing and valuation
//! - `classifier`: Structured product risk tiers
//! - `stress`: Narrative, position-level and structured product scenarios
//! - `credit`: PD / LGD / EAD credit model
//! - `liquidity`: Liquidity coverage and funding ratios
//! - `screening`: Barrier, maturity and gamma screens

mod stats;
mod pricing;
mod simulation;
mod portfolio;
mod structured;
mod classifier;
mod stress;
mod credit;
mod liquidity;
mod screening;

pub use stats::{normal_cdf, normal_inverse_cdf, normal_pdf};
pub use pricing::{calculate_greeks, price_option, BlackScholesParams, Greeks, OptionQuote, OptionType};
pub use simulation::{
    barrier_breach_probability, expected_shortfall, max_drawdown, monte_carlo_var,
    PortfolioReturnModel, SimulationContext,
};
pub use portfolio::{PortfolioAnalyzer, PortfolioSnapshot};
pub use structured::{ProductGreeks, ProductValuation, StructuredPricer};
pub use classifier::{classify, risk_score, status_for_score, RiskFactors};
pub use stress::{
    stress_structured_product, stress_test, NarrativeScenario, PositionStressEngine,
    PositionStressReport, ScenarioLoss, ScenarioResult, ShockScenario, StructuredScenario,
    StructuredStressResult,
};
pub use credit::{
    assess_credit_risk, loss_given_default, probability_of_default, CreditAssessment,
    CreditProfile, CreditRating,
};
pub use liquidity::{liquidity_metrics, LiquidityInputs, LiquidityMetrics, LiquidityRisk};
pub use screening::{high_gamma, near_barrier, near_maturity};
