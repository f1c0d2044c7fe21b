//! Black-Scholes option pricing
//!
//! Closed-form European option prices and Greeks with a continuous dividend
//! yield:
//! - Delta (∂V/∂S)
//! - Gamma (∂²V/∂S²)
//! - Theta (∂V/∂t), per calendar day
//! - Vega (∂V/∂σ), per 1 point volatility change
//! - Rho (∂V/∂r), per 1% rate change

use crate::error::{ensure_non_negative, ensure_positive, RiskError, Result};
use crate::models::stats::{normal_cdf, normal_pdf};
use serde::{Deserialize, Serialize};
use tracing::debug;

const DAYS_PER_YEAR: f64 = 365.0;

/// Option type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Call,
    Put,
}

/// Inputs to the Black-Scholes formula
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlackScholesParams {
    /// Spot price of the underlying
    pub spot: f64,

    /// Strike price
    pub strike: f64,

    /// Time to expiry in years
    pub time_to_expiry: f64,

    /// Continuously compounded risk-free rate
    pub risk_free_rate: f64,

    /// Annualised volatility
    pub volatility: f64,

    /// Continuous dividend yield
    #[serde(default)]
    pub dividend_yield: f64,
}

impl BlackScholesParams {
    /// Parameters without a dividend yield
    pub fn new(
        spot: f64,
        strike: f64,
        time_to_expiry: f64,
        risk_free_rate: f64,
        volatility: f64,
    ) -> Self {
        Self {
            spot,
            strike,
            time_to_expiry,
            risk_free_rate,
            volatility,
            dividend_yield: 0.0,
        }
    }

    pub fn with_dividend_yield(mut self, dividend_yield: f64) -> Self {
        self.dividend_yield = dividend_yield;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("Spot price", self.spot)?;
        ensure_positive("Strike price", self.strike)?;
        ensure_positive("Volatility", self.volatility)?;
        ensure_non_negative("Time to expiry", self.time_to_expiry)?;
        if !self.risk_free_rate.is_finite() || !self.dividend_yield.is_finite() {
            return Err(RiskError::InvalidParameter(
                "Rates must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// (d1, d2) for a positive time to expiry
    pub fn d1_d2(&self) -> (f64, f64) {
        let sigma_sqrt_t = self.volatility * self.time_to_expiry.sqrt();
        let d1 = ((self.spot / self.strike).ln()
            + (self.risk_free_rate - self.dividend_yield
                + 0.5 * self.volatility * self.volatility)
                * self.time_to_expiry)
            / sigma_sqrt_t;
        (d1, d1 - sigma_sqrt_t)
    }
}

/// Greeks for a single option
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,

    /// Per calendar day
    pub theta: f64,

    /// Per 1 point change in volatility
    pub vega: f64,

    /// Per 1% change in the risk-free rate
    pub rho: f64,
}

impl Greeks {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Call and put prices with their Greeks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub call_price: f64,
    pub put_price: f64,

    /// Call-side Greeks
    pub greeks: Greeks,

    pub put_greeks: Greeks,

    /// `None` at expiry
    pub d1: Option<f64>,
    pub d2: Option<f64>,
}

/// Price a call and a put and compute their Greeks
///
/// At expiry (`time_to_expiry == 0`) the prices are the intrinsic values and
/// every Greek is zero.
///
/// # Example
///
/// ```
/// use rv_risk::models::{price_option, BlackScholesParams};
///
/// let params = BlackScholesParams::new(100.0, 100.0, 1.0, 0.05, 0.20);
/// let quote = price_option(&params).unwrap();
/// assert!((quote.call_price - 10.4506).abs() < 1e-4);
/// ```
pub fn price_option(params: &BlackScholesParams) -> Result<OptionQuote> {
    params.validate()?;

    let s = params.spot;
    let k = params.strike;
    let t = params.time_to_expiry;

    if t == 0.0 {
        return Ok(OptionQuote {
            call_price: (s - k).max(0.0),
            put_price: (k - s).max(0.0),
            greeks: Greeks::zero(),
            put_greeks: Greeks::zero(),
            d1: None,
            d2: None,
        });
    }

    let (d1, d2) = params.d1_d2();
    let spot_discount = (-params.dividend_yield * t).exp();
    let strike_discount = (-params.risk_free_rate * t).exp();

    let call_price = s * spot_discount * normal_cdf(d1) - k * strike_discount * normal_cdf(d2);
    let put_price = k * strike_discount * normal_cdf(-d2) - s * spot_discount * normal_cdf(-d1);

    let greeks = greeks_from_d(params, d1, d2, OptionType::Call);
    let put_greeks = greeks_from_d(params, d1, d2, OptionType::Put);

    debug!(
        spot = s,
        strike = k,
        time_to_expiry = t,
        d1,
        call_price,
        put_price,
        "Priced option"
    );

    Ok(OptionQuote {
        call_price,
        put_price,
        greeks,
        put_greeks,
        d1: Some(d1),
        d2: Some(d2),
    })
}

/// Greeks for one side of the option
pub fn calculate_greeks(params: &BlackScholesParams, option_type: OptionType) -> Result<Greeks> {
    params.validate()?;
    if params.time_to_expiry == 0.0 {
        return Ok(Greeks::zero());
    }
    let (d1, d2) = params.d1_d2();
    Ok(greeks_from_d(params, d1, d2, option_type))
}

fn greeks_from_d(params: &BlackScholesParams, d1: f64, d2: f64, option_type: OptionType) -> Greeks {
    let s = params.spot;
    let k = params.strike;
    let t = params.time_to_expiry;
    let r = params.risk_free_rate;
    let q = params.dividend_yield;
    let sigma = params.volatility;

    let sqrt_t = t.sqrt();
    let spot_discount = (-q * t).exp();
    let strike_discount = (-r * t).exp();
    let pdf_d1 = normal_pdf(d1);

    // Gamma and vega are the same for calls and puts
    let gamma = spot_discount * pdf_d1 / (s * sigma * sqrt_t);
    let vega = s * spot_discount * pdf_d1 * sqrt_t / 100.0;
    let decay = -s * pdf_d1 * sigma * spot_discount / (2.0 * sqrt_t);

    match option_type {
        OptionType::Call => Greeks {
            delta: spot_discount * normal_cdf(d1),
            gamma,
            theta: (decay - r * k * strike_discount * normal_cdf(d2)
                + q * s * spot_discount * normal_cdf(d1))
                / DAYS_PER_YEAR,
            vega,
            rho: k * t * strike_discount * normal_cdf(d2) / 100.0,
        },
        OptionType::Put => Greeks {
            delta: spot_discount * (normal_cdf(d1) - 1.0),
            gamma,
            theta: (decay + r * k * strike_discount * normal_cdf(-d2)
                - q * s * spot_discount * normal_cdf(-d1))
                / DAYS_PER_YEAR,
            vega,
            rho: -k * t * strike_discount * normal_cdf(-d2) / 100.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn dividend_example() -> BlackScholesParams {
        BlackScholesParams::new(175.0, 180.0, 0.25, 0.05, 0.25).with_dividend_yield(0.02)
    }

    #[test]
    fn test_d1_follows_formula() {
        let (d1, d2) = dividend_example().d1_d2();
        assert_relative_eq!(d1, -0.10286701573357068, epsilon = 1e-12);
        assert_relative_eq!(d2, d1 - 0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_dividend_example_prices_and_greeks() {
        let quote = price_option(&dividend_example()).unwrap();

        assert_relative_eq!(quote.call_price, 7.06933738297576, epsilon = 1e-9);
        assert_relative_eq!(quote.put_price, 10.706157613155042, epsilon = 1e-9);

        let g = quote.greeks;
        assert_relative_eq!(g.delta, 0.456744760274062, epsilon = 1e-9);
        assert_relative_eq!(g.gamma, 0.018050646513697473, epsilon = 1e-9);
        assert_relative_eq!(g.theta, -0.052930071009868684, epsilon = 1e-9);
        assert_relative_eq!(g.vega, 0.34550065592624063, epsilon = 1e-9);
        assert_relative_eq!(g.rho, 0.18215248916246274, epsilon = 1e-9);

        let p = quote.put_greeks;
        assert_relative_eq!(p.delta, -0.5382677189186202, epsilon = 1e-9);
        assert_relative_eq!(p.gamma, g.gamma, epsilon = 1e-15);
        assert_relative_eq!(p.theta, -0.038120053126935685, epsilon = 1e-9);
        assert_relative_eq!(p.rho, -0.26225752105978395, epsilon = 1e-9);
    }

    #[test]
    fn test_at_the_money_call() {
        let params = BlackScholesParams::new(100.0, 100.0, 1.0, 0.05, 0.20);
        let quote = price_option(&params).unwrap();

        assert_relative_eq!(quote.call_price, 10.450575415435083, epsilon = 1e-9);
        assert_relative_eq!(quote.put_price, 5.573517865506496, epsilon = 1e-9);
        assert_relative_eq!(quote.greeks.delta, 0.6368305860070302, epsilon = 1e-9);
        assert_relative_eq!(quote.greeks.vega, 0.3752403469169379, epsilon = 1e-9);
    }

    #[test]
    fn test_expiry_returns_intrinsic() {
        let params = BlackScholesParams::new(110.0, 100.0, 0.0, 0.05, 0.20);
        let quote = price_option(&params).unwrap();

        assert_eq!(quote.call_price, 10.0);
        assert_eq!(quote.put_price, 0.0);
        assert_eq!(quote.greeks, Greeks::zero());
        assert_eq!(quote.put_greeks, Greeks::zero());
        assert!(quote.d1.is_none());
    }

    #[test]
    fn test_invalid_inputs() {
        let base = BlackScholesParams::new(100.0, 100.0, 1.0, 0.05, 0.20);

        let mut params = base;
        params.volatility = 0.0;
        assert!(matches!(price_option(&params), Err(RiskError::InvalidParameter(_))));

        let mut params = base;
        params.time_to_expiry = -0.1;
        assert!(price_option(&params).is_err());

        let mut params = base;
        params.strike = 0.0;
        assert!(price_option(&params).is_err());

        let mut params = base;
        params.spot = -1.0;
        assert!(calculate_greeks(&params, OptionType::Call).is_err());
    }

    #[test]
    fn test_calculate_greeks_matches_quote() {
        let params = dividend_example();
        let quote = price_option(&params).unwrap();
        assert_eq!(calculate_greeks(&params, OptionType::Call).unwrap(), quote.greeks);
        assert_eq!(calculate_greeks(&params, OptionType::Put).unwrap(), quote.put_greeks);
    }

    proptest! {
        #[test]
        fn prop_put_call_parity(
            s in 10.0f64..500.0,
            k in 10.0f64..500.0,
            t in 0.01f64..5.0,
            r in -0.02f64..0.15,
            sigma in 0.05f64..1.5,
            q in 0.0f64..0.08,
        ) {
            let params = BlackScholesParams::new(s, k, t, r, sigma).with_dividend_yield(q);
            let quote = price_option(&params).unwrap();
            let forward = s * (-q * t).exp() - k * (-r * t).exp();
            prop_assert!((quote.call_price - quote.put_price - forward).abs() < 1e-6);
        }

        #[test]
        fn prop_call_delta_in_unit_interval(
            s in 10.0f64..500.0,
            k in 10.0f64..500.0,
            t in 0.01f64..5.0,
            sigma in 0.05f64..1.5,
        ) {
            let params = BlackScholesParams::new(s, k, t, 0.05, sigma);
            let greeks = calculate_greeks(&params, OptionType::Call).unwrap();
            prop_assert!((0.0..=1.0).contains(&greeks.delta));
            prop_assert!(greeks.gamma >= 0.0);
            prop_assert!(greeks.vega >= 0.0);
        }
    }
}
