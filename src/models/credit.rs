//! Credit risk model
//!
//! Logistic probability of default, a balance-sheet driven loss given
//! default and the resulting loss distribution:
//! - EL = PD · LGD · EAD
//! - UL = √(PD(1 - PD)) · LGD · EAD
//! - Credit VaR = Φ⁻¹(0.99) · UL + EL

use crate::error::{ensure_non_negative, RiskError, Result};
use crate::models::stats::normal_inverse_cdf;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const CREDIT_VAR_CONFIDENCE: f64 = 0.99;

const PD_FLOOR: f64 = 0.001;
const PD_CAP: f64 = 0.999;

const BASE_LGD: f64 = 0.45;
const LGD_FLOOR: f64 = 0.1;
const LGD_CAP: f64 = 0.9;

/// Borrower financials
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    pub credit_score: f64,
    pub debt_to_equity: f64,
    pub current_ratio: f64,
    pub interest_coverage: f64,
    pub industry_risk_score: f64,

    /// Exposure at default
    pub exposure_amount: f64,
}

impl CreditProfile {
    pub fn validate(&self) -> Result<()> {
        let inputs = [
            ("Credit score", self.credit_score),
            ("Debt to equity", self.debt_to_equity),
            ("Current ratio", self.current_ratio),
            ("Interest coverage", self.interest_coverage),
            ("Industry risk score", self.industry_risk_score),
        ];
        for (name, value) in inputs {
            if !value.is_finite() {
                return Err(RiskError::InvalidParameter(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        ensure_non_negative("Exposure amount", self.exposure_amount)
    }
}

/// Letter grade, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreditRating {
    #[serde(rename = "AAA")]
    Aaa,
    #[serde(rename = "AA+")]
    AaPlus,
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AA-")]
    AaMinus,
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "BBB+")]
    BbbPlus,
    #[serde(rename = "BBB")]
    Bbb,
    #[serde(rename = "BBB-")]
    BbbMinus,
    #[serde(rename = "BB+")]
    BbPlus,
    #[serde(rename = "BB")]
    Bb,
    #[serde(rename = "B")]
    B,
}

/// Upper PD bound (exclusive) of each grade
const RATING_LADDER: [(f64, CreditRating); 12] = [
    (0.001, CreditRating::Aaa),
    (0.002, CreditRating::AaPlus),
    (0.005, CreditRating::Aa),
    (0.01, CreditRating::AaMinus),
    (0.02, CreditRating::APlus),
    (0.05, CreditRating::A),
    (0.1, CreditRating::AMinus),
    (0.15, CreditRating::BbbPlus),
    (0.25, CreditRating::Bbb),
    (0.4, CreditRating::BbbMinus),
    (0.6, CreditRating::BbPlus),
    (0.8, CreditRating::Bb),
];

impl CreditRating {
    /// Grade for a probability of default
    pub fn from_probability_of_default(pd: f64) -> Self {
        RATING_LADDER
            .iter()
            .find(|(bound, _)| pd < *bound)
            .map(|(_, rating)| *rating)
            .unwrap_or(CreditRating::B)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CreditRating::Aaa => "AAA",
            CreditRating::AaPlus => "AA+",
            CreditRating::Aa => "AA",
            CreditRating::AaMinus => "AA-",
            CreditRating::APlus => "A+",
            CreditRating::A => "A",
            CreditRating::AMinus => "A-",
            CreditRating::BbbPlus => "BBB+",
            CreditRating::Bbb => "BBB",
            CreditRating::BbbMinus => "BBB-",
            CreditRating::BbPlus => "BB+",
            CreditRating::Bb => "BB",
            CreditRating::B => "B",
        }
    }
}

impl fmt::Display for CreditRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Loss distribution of one credit exposure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditAssessment {
    pub probability_of_default: f64,
    pub loss_given_default: f64,
    pub exposure_at_default: f64,
    pub expected_loss: f64,
    pub unexpected_loss: f64,
    pub credit_var: f64,
    pub rating: CreditRating,
}

/// Logistic PD, clamped to [0.001, 0.999]
pub fn probability_of_default(profile: &CreditProfile) -> f64 {
    let logit = 2.5 - 0.003 * profile.credit_score + 0.15 * profile.debt_to_equity
        - 0.08 * profile.current_ratio
        - 0.02 * profile.interest_coverage
        + 0.05 * profile.industry_risk_score;

    (1.0 / (1.0 + (-logit).exp())).clamp(PD_FLOOR, PD_CAP)
}

/// 45% base, up to +30% for leverage, down to -20% for liquidity, clamped to [0.1, 0.9]
pub fn loss_given_default(profile: &CreditProfile) -> f64 {
    let debt_adjustment = (0.1 * profile.debt_to_equity).min(0.3);
    let liquidity_adjustment = (-0.05 * profile.current_ratio).max(-0.2);
    (BASE_LGD + debt_adjustment + liquidity_adjustment).clamp(LGD_FLOOR, LGD_CAP)
}

/// Full credit assessment of a profile
pub fn assess_credit_risk(profile: &CreditProfile) -> Result<CreditAssessment> {
    profile.validate()?;

    let pd = probability_of_default(profile);
    let lgd = loss_given_default(profile);
    let ead = profile.exposure_amount;

    let expected_loss = pd * lgd * ead;
    let unexpected_loss = (pd * (1.0 - pd)).sqrt() * lgd * ead;
    let credit_var = normal_inverse_cdf(CREDIT_VAR_CONFIDENCE) * unexpected_loss + expected_loss;
    let rating = CreditRating::from_probability_of_default(pd);

    debug!(pd, lgd, expected_loss, credit_var, rating = %rating, "Assessed credit risk");

    Ok(CreditAssessment {
        probability_of_default: pd,
        loss_given_default: lgd,
        exposure_at_default: ead,
        expected_loss,
        unexpected_loss,
        credit_var,
        rating,
    })
}
