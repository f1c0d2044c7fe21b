//! Standard normal distribution primitives
//!
//! Every pricing and risk routine in the crate goes through these functions:
//! - `normal_cdf`: Abramowitz-Stegun 7.1.26 error-function approximation
//!   (absolute error below 1.5e-7)
//! - `normal_pdf`: exact density
//! - `normal_inverse_cdf`: Beasley-Springer-Moro style rational approximation

use std::f64::consts::{PI, SQRT_2};

const ERF_P: f64 = 0.3275911;
const ERF_A: [f64; 5] = [
    0.254829592,
    -0.284496736,
    1.421413741,
    -1.453152027,
    1.061405429,
];

// Central region coefficients
const INV_A: [f64; 4] = [2.50662823884, -18.61500062529, 41.39119773534, -25.44106049637];
const INV_B: [f64; 4] = [-8.47351093090, 23.08336743743, -21.06224101826, 3.13082909833];

// Tail coefficients, lowest order first
const INV_C: [f64; 9] = [
    0.3374754822726147,
    0.9761690190917186,
    0.1607979714918209,
    0.0276438810333863,
    0.0038405729373609,
    0.0003951896511919,
    0.0000321767881768,
    0.0000002888167364,
    0.0000003960315187,
];

/// Odd error-function approximation
fn erf(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }

    let sign = x.signum();
    let x = x.abs();

    let t = 1.0 / (1.0 + ERF_P * x);
    let poly = ERF_A.iter().rev().fold(0.0, |acc, &a| acc * t + a) * t;

    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal cumulative distribution function
///
/// # Example
///
/// ```
/// use rv_risk::models::normal_cdf;
///
/// assert_eq!(normal_cdf(0.0), 0.5);
/// assert!((normal_cdf(1.96) - 0.975).abs() < 1e-4);
/// ```
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// Standard normal probability density function
pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Inverse of the standard normal CDF
///
/// Returns negative infinity for `p <= 0` and positive infinity for
/// `p >= 1`. For `|p - 0.5| < 0.42` a rational approximation is used;
/// otherwise a tail polynomial in `sqrt(-ln(min(p, 1 - p)))`, negated
/// for the lower tail.
pub fn normal_inverse_cdf(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    let x = p - 0.5;
    if x.abs() < 0.42 {
        let r = x * x;
        let num = ((INV_A[3] * r + INV_A[2]) * r + INV_A[1]) * r + INV_A[0];
        let den = (((INV_B[3] * r + INV_B[2]) * r + INV_B[1]) * r + INV_B[0]) * r + 1.0;
        return x * num / den;
    }

    let tail = if p < 0.5 { p } else { 1.0 - p };
    let r = (-tail.ln()).sqrt();
    let value = INV_C.iter().rev().fold(0.0, |acc, &c| acc * r + c);

    if p < 0.5 {
        -value
    } else {
        value
    }
}
