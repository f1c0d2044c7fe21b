//! Structured product pricing
//!
//! Products are priced as a Black-Scholes call on the underlying at a fixed
//! risk-free rate, then adjusted by product family:
//! - Autocallable: 5% early-redemption discount
//! - Barrier reverse convertible: minus half the spot times the simulated
//!   probability of finishing below the barrier
//! - Equity-linked note and unknown families: unadjusted
//!
//! Valuations are returned as a new [`ProductValuation`]; the product terms
//! passed in are never modified.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::instruments::{ProductType, RiskStatus, StructuredProduct};
use crate::models::classifier::{self, RiskFactors};
use crate::models::pricing::{price_option, BlackScholesParams};
use crate::models::simulation::{barrier_breach_probability, SimulationContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

const AUTOCALL_DISCOUNT: f64 = 0.95;
const BARRIER_LOSS_SHARE: f64 = 0.5;

/// Sensitivities of a structured product
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductGreeks {
    pub delta: f64,
    pub gamma: f64,

    /// Per calendar day
    pub theta: f64,

    /// Per 1 point change in volatility
    pub vega: f64,
}

/// Derived fields of a structured product for one set of market inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductValuation {
    pub product_code: String,
    pub price: f64,
    pub greeks: ProductGreeks,
    pub risk_status: RiskStatus,
    pub risk_score: u32,

    /// Inputs the valuation was computed from
    pub underlying_price: f64,
    pub implied_volatility: f64,
    pub time_to_maturity: f64,
    pub valued_at: DateTime<Utc>,
}

/// Prices structured products at a fixed rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuredPricer {
    risk_free_rate: f64,
    barrier_simulation: SimulationContext,
}

impl StructuredPricer {
    pub fn new(risk_free_rate: f64, barrier_simulation: SimulationContext) -> Self {
        Self {
            risk_free_rate,
            barrier_simulation,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.structured_risk_free_rate,
            SimulationContext::seeded(
                config.simulation.barrier_seed,
                config.simulation.barrier_simulations,
            ),
        )
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Product price at the pricer's rate
    ///
    /// A matured product (no whole days left) is worth its spot.
    pub fn price(&self, product: &StructuredProduct, as_of: DateTime<Utc>) -> Result<f64> {
        self.price_at_rate(product, as_of, self.risk_free_rate)
    }

    /// Product price with an explicit risk-free rate
    ///
    /// Only the option base moves with `risk_free_rate`; the barrier-breach
    /// estimator keeps the pricer's own rate.
    pub fn price_at_rate(
        &self,
        product: &StructuredProduct,
        as_of: DateTime<Utc>,
        risk_free_rate: f64,
    ) -> Result<f64> {
        product.validate()?;

        let t = product.time_to_maturity(as_of);
        if t <= 0.0 {
            return Ok(product.underlying_price);
        }

        let params = self.params(product, t, risk_free_rate);
        let base = price_option(&params)?.call_price;
        let price = self.adjust_for_type(product, t, base)?;

        debug!(
            product = %product.product_code,
            product_type = %product.product_type,
            base,
            price,
            "Priced structured product"
        );
        Ok(price)
    }

    /// Delta, gamma, theta and vega; all zero once matured
    pub fn greeks(&self, product: &StructuredProduct, as_of: DateTime<Utc>) -> Result<ProductGreeks> {
        product.validate()?;

        let t = product.time_to_maturity(as_of);
        if t <= 0.0 {
            return Ok(ProductGreeks::default());
        }

        let greeks = price_option(&self.params(product, t, self.risk_free_rate))?.greeks;
        Ok(ProductGreeks {
            delta: greeks.delta,
            gamma: greeks.gamma,
            theta: greeks.theta,
            vega: greeks.vega,
        })
    }

    /// Price, Greeks and risk tier for the product's current inputs
    pub fn value(&self, product: &StructuredProduct, as_of: DateTime<Utc>) -> Result<ProductValuation> {
        let price = self.price(product, as_of)?;
        let greeks = self.greeks(product, as_of)?;
        let time_to_maturity = product.time_to_maturity(as_of);

        let factors = RiskFactors {
            delta: greeks.delta,
            gamma: greeks.gamma,
            vega: greeks.vega,
            time_to_maturity,
            barrier_distance: product.barrier_distance(),
        };
        let risk_score = classifier::risk_score(&factors);

        Ok(ProductValuation {
            product_code: product.product_code.clone(),
            price,
            greeks,
            risk_status: classifier::status_for_score(risk_score),
            risk_score,
            underlying_price: product.underlying_price,
            implied_volatility: product.implied_volatility,
            time_to_maturity,
            valued_at: as_of,
        })
    }

    /// Risk tier only
    pub fn assess_risk_status(
        &self,
        product: &StructuredProduct,
        as_of: DateTime<Utc>,
    ) -> Result<RiskStatus> {
        let greeks = self.greeks(product, as_of)?;
        Ok(classifier::classify(&RiskFactors {
            delta: greeks.delta,
            gamma: greeks.gamma,
            vega: greeks.vega,
            time_to_maturity: product.time_to_maturity(as_of),
            barrier_distance: product.barrier_distance(),
        }))
    }

    fn params(&self, product: &StructuredProduct, t: f64, risk_free_rate: f64) -> BlackScholesParams {
        BlackScholesParams::new(
            product.underlying_price,
            product.strike,
            t,
            risk_free_rate,
            product.implied_volatility,
        )
    }

    fn adjust_for_type(&self, product: &StructuredProduct, t: f64, base: f64) -> Result<f64> {
        match &product.product_type {
            ProductType::Autocallable => Ok(base * AUTOCALL_DISCOUNT),
            ProductType::BarrierReverseConvertible => match product.barrier {
                Some(barrier) => {
                    // Breach paths always drift at the pricer's rate, even when
                    // the option base is priced at a shocked rate
                    let probability = barrier_breach_probability(
                        product.underlying_price,
                        barrier,
                        t,
                        self.risk_free_rate,
                        product.implied_volatility,
                        &self.barrier_simulation,
                    )?;
                    Ok(base - probability * product.underlying_price * BARRIER_LOSS_SHARE)
                }
                None => Ok(base),
            },
            ProductType::EquityLinkedNote => Ok(base),
            ProductType::Other(name) => {
                debug!(product_type = %name, "No price adjustment for product type");
                Ok(base)
            }
        }
    }
}
