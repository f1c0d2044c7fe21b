//! Monte Carlo risk engine
//!
//! Every routine takes an explicit [`SimulationContext`]; a fixed seed gives
//! bit-identical results across runs, `None` draws a fresh seed from the OS.
//! Each call owns its generator, so nothing is shared between threads.

use crate::config::AssetClassTable;
use crate::error::{ensure_confidence, ensure_non_negative, ensure_positive, RiskError, Result};
use crate::instruments::Position;
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Seed and draw count for one Monte Carlo run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationContext {
    /// Random seed for reproducible runs (None = random)
    pub seed: Option<u64>,

    /// Number of independent draws
    pub simulations: usize,
}

impl SimulationContext {
    pub fn seeded(seed: u64, simulations: usize) -> Self {
        Self {
            seed: Some(seed),
            simulations,
        }
    }

    pub fn unseeded(simulations: usize) -> Self {
        Self {
            seed: None,
            simulations,
        }
    }

    /// Same seed, different draw count
    pub fn with_simulations(self, simulations: usize) -> Self {
        Self {
            simulations,
            ..self
        }
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.simulations == 0 {
            return Err(RiskError::InvalidParameter(
                "Number of simulations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Daily return model of a portfolio
///
/// Each position draws its own standard normal per path:
/// `r_i = μ_i / D + σ_i / √D · Z_i`, where D is the number of trading days,
/// and the portfolio return is the value-weighted sum of the `r_i`.
#[derive(Debug, Clone)]
pub struct PortfolioReturnModel {
    total_value: f64,
    weights: DVector<f64>,
    daily_mean: DVector<f64>,
    daily_volatility: DVector<f64>,
}

impl PortfolioReturnModel {
    pub fn new(positions: &[Position], table: &AssetClassTable, trading_days_per_year: f64) -> Self {
        let values: Vec<f64> = positions.iter().map(Position::value).collect();
        let total_value: f64 = values.iter().sum();

        let weights = if total_value > 0.0 {
            DVector::from_iterator(values.len(), values.iter().map(|v| v / total_value))
        } else {
            DVector::zeros(values.len())
        };

        let scale = trading_days_per_year.sqrt();
        let daily_mean = DVector::from_iterator(
            positions.len(),
            positions
                .iter()
                .map(|p| table.params(&p.asset_class).expected_return / trading_days_per_year),
        );
        let daily_volatility = DVector::from_iterator(
            positions.len(),
            positions
                .iter()
                .map(|p| table.params(&p.asset_class).volatility / scale),
        );

        Self {
            total_value,
            weights,
            daily_mean,
            daily_volatility,
        }
    }

    pub fn total_value(&self) -> f64 {
        self.total_value
    }

    /// No positions or no value: nothing to simulate
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty() || self.total_value <= 0.0
    }

    /// Draw one daily portfolio return
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        let shocks = DVector::from_iterator(
            self.weights.len(),
            (0..self.weights.len()).map(|_| rng.sample::<f64, _>(StandardNormal)),
        );
        let returns = &self.daily_mean + self.daily_volatility.component_mul(&shocks);
        self.weights.dot(&returns)
    }

    /// Draw `ctx.simulations` independent returns, sorted ascending
    pub fn sorted_returns(&self, ctx: &SimulationContext) -> Vec<f64> {
        let mut rng = ctx.rng();
        let mut returns: Vec<f64> = (0..ctx.simulations).map(|_| self.sample(&mut rng)).collect();
        returns.sort_by(f64::total_cmp);
        returns
    }
}

/// Rank of the VaR quantile in an ascending sample
fn var_index(confidence_level: f64, simulations: usize) -> usize {
    let index = ((1.0 - confidence_level) * simulations as f64).floor();
    (index.max(0.0) as usize).min(simulations.saturating_sub(1))
}

/// Monte Carlo Value at Risk
///
/// VaR = portfolio value × |r_(k)| where r_(k) is the simulated return at rank
/// `floor((1 - confidence) · N)`.
pub fn monte_carlo_var(
    model: &PortfolioReturnModel,
    confidence_level: f64,
    ctx: &SimulationContext,
) -> Result<f64> {
    ensure_confidence(confidence_level)?;
    ctx.validate()?;

    if model.is_empty() {
        return Ok(0.0);
    }

    let returns = model.sorted_returns(ctx);
    let index = var_index(confidence_level, returns.len());
    let var = model.total_value() * returns[index].abs();

    debug!(
        confidence_level,
        simulations = ctx.simulations,
        var,
        "Monte Carlo VaR"
    );
    Ok(var)
}

/// Expected Shortfall: mean of the simulated returns below the VaR rank
pub fn expected_shortfall(
    model: &PortfolioReturnModel,
    confidence_level: f64,
    ctx: &SimulationContext,
) -> Result<f64> {
    ensure_confidence(confidence_level)?;
    ctx.validate()?;

    if model.is_empty() {
        return Ok(0.0);
    }

    let returns = model.sorted_returns(ctx);
    let index = var_index(confidence_level, returns.len());
    let tail = &returns[..index];

    if tail.is_empty() {
        return Ok(0.0);
    }

    let average = tail.iter().sum::<f64>() / tail.len() as f64;
    let shortfall = model.total_value() * average.abs();

    debug!(confidence_level, tail = tail.len(), shortfall, "Expected shortfall");
    Ok(shortfall)
}

/// Largest peak-to-trough loss (in currency) along one simulated equity curve
///
/// One path of `days` steps is drawn from the context's generator; its
/// simulation count is not used.
pub fn max_drawdown(model: &PortfolioReturnModel, days: u32, ctx: &SimulationContext) -> f64 {
    if model.is_empty() || days == 0 {
        return 0.0;
    }

    let mut rng = ctx.rng();
    let mut value = model.total_value();
    let mut peak = value;
    let mut max_drawdown = 0.0_f64;

    for _ in 0..days {
        value *= 1.0 + model.sample(&mut rng);
        peak = peak.max(value);
        max_drawdown = max_drawdown.max(peak - value);
    }

    debug!(days, max_drawdown, "Simulated drawdown");
    max_drawdown
}

/// Probability that the terminal price finishes below the barrier
///
/// Terminal prices follow risk-neutral geometric Brownian motion:
/// `S_T = S · exp((r - σ²/2)T + σ√T · Z)`.
pub fn barrier_breach_probability(
    spot: f64,
    barrier: f64,
    time_to_maturity: f64,
    risk_free_rate: f64,
    volatility: f64,
    ctx: &SimulationContext,
) -> Result<f64> {
    ensure_positive("Spot price", spot)?;
    ensure_positive("Barrier level", barrier)?;
    ensure_positive("Volatility", volatility)?;
    ensure_non_negative("Time to maturity", time_to_maturity)?;
    ctx.validate()?;

    let drift = (risk_free_rate - 0.5 * volatility * volatility) * time_to_maturity;
    let diffusion = volatility * time_to_maturity.sqrt();

    let mut rng = ctx.rng();
    let breaches = (0..ctx.simulations)
        .filter(|_| {
            let z: f64 = rng.sample(StandardNormal);
            spot * (drift + diffusion * z).exp() < barrier
        })
        .count();

    let probability = breaches as f64 / ctx.simulations as f64;
    debug!(spot, barrier, probability, "Barrier breach probability");
    Ok(probability)
}
