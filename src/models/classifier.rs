//! Structured product risk classifier
//!
//! Points are added for each risk factor past its threshold:
//!
//! | factor              | +1     | +2     | +3    |
//! |---------------------|--------|--------|-------|
//! | \|delta\|           | > 0.5  | > 0.7  |       |
//! | gamma               | > 0.005| > 0.01 |       |
//! | \|vega\|            | > 0.05 | > 0.1  |       |
//! | years to maturity   | < 0.5  | < 0.25 |       |
//! | spot / barrier      |        | < 1.20 | < 1.10|
//!
//! A score of 5 or more is RED, 3 or more YELLOW, anything lower GREEN.

use crate::instruments::RiskStatus;
use serde::{Deserialize, Serialize};

const RED_SCORE: u32 = 5;
const YELLOW_SCORE: u32 = 3;

/// Inputs to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub time_to_maturity: f64,

    /// Spot / barrier; `None` for products without a barrier
    pub barrier_distance: Option<f64>,
}

fn tiered(value: f64, high: f64, low: f64) -> u32 {
    if value > high {
        2
    } else if value > low {
        1
    } else {
        0
    }
}

/// Total risk points
pub fn risk_score(factors: &RiskFactors) -> u32 {
    let mut score = tiered(factors.delta.abs(), 0.7, 0.5)
        + tiered(factors.gamma, 0.01, 0.005)
        + tiered(factors.vega.abs(), 0.1, 0.05);

    score += if factors.time_to_maturity < 0.25 {
        2
    } else if factors.time_to_maturity < 0.5 {
        1
    } else {
        0
    };

    if let Some(distance) = factors.barrier_distance {
        score += if distance < 1.10 {
            3
        } else if distance < 1.20 {
            2
        } else {
            0
        };
    }

    score
}

pub fn status_for_score(score: u32) -> RiskStatus {
    if score >= RED_SCORE {
        RiskStatus::Red
    } else if score >= YELLOW_SCORE {
        RiskStatus::Yellow
    } else {
        RiskStatus::Green
    }
}

pub fn classify(factors: &RiskFactors) -> RiskStatus {
    status_for_score(risk_score(factors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn calm() -> RiskFactors {
        RiskFactors {
            delta: 0.3,
            gamma: 0.001,
            vega: 0.01,
            time_to_maturity: 2.0,
            barrier_distance: None,
        }
    }

    #[test]
    fn test_calm_product_is_green() {
        assert_eq!(risk_score(&calm()), 0);
        assert_eq!(classify(&calm()), RiskStatus::Green);
    }

    #[test]
    fn test_each_threshold() {
        let mut f = calm();
        f.delta = -0.6;
        assert_eq!(risk_score(&f), 1);
        f.delta = -0.75;
        assert_eq!(risk_score(&f), 2);

        let mut f = calm();
        f.gamma = 0.006;
        assert_eq!(risk_score(&f), 1);
        f.gamma = 0.02;
        assert_eq!(risk_score(&f), 2);

        let mut f = calm();
        f.vega = 0.07;
        assert_eq!(risk_score(&f), 1);
        f.vega = 0.2;
        assert_eq!(risk_score(&f), 2);

        let mut f = calm();
        f.time_to_maturity = 0.4;
        assert_eq!(risk_score(&f), 1);
        f.time_to_maturity = 0.1;
        assert_eq!(risk_score(&f), 2);

        let mut f = calm();
        f.barrier_distance = Some(1.5);
        assert_eq!(risk_score(&f), 0);
        f.barrier_distance = Some(1.15);
        assert_eq!(risk_score(&f), 2);
        f.barrier_distance = Some(1.05);
        assert_eq!(risk_score(&f), 3);
    }

    #[test]
    fn test_boundaries_are_strict() {
        let mut f = calm();
        f.delta = 0.5;
        f.gamma = 0.005;
        f.vega = 0.05;
        f.time_to_maturity = 0.5;
        f.barrier_distance = Some(1.2);
        assert_eq!(risk_score(&f), 0);
    }

    #[test]
    fn test_tiers() {
        assert_eq!(status_for_score(0), RiskStatus::Green);
        assert_eq!(status_for_score(2), RiskStatus::Green);
        assert_eq!(status_for_score(3), RiskStatus::Yellow);
        assert_eq!(status_for_score(4), RiskStatus::Yellow);
        assert_eq!(status_for_score(5), RiskStatus::Red);
        assert_eq!(status_for_score(11), RiskStatus::Red);
    }

    #[test]
    fn test_barrier_proximity_alone_can_turn_yellow() {
        let mut f = calm();
        f.barrier_distance = Some(1.02);
        assert_eq!(classify(&f), RiskStatus::Yellow);
    }

    fn factors() -> impl Strategy<Value = RiskFactors> {
        (
            -1.0f64..1.0,
            0.0f64..0.05,
            -0.5f64..0.5,
            0.0f64..3.0,
            proptest::option::of(0.5f64..2.0),
        )
            .prop_map(|(delta, gamma, vega, time_to_maturity, barrier_distance)| RiskFactors {
                delta,
                gamma,
                vega,
                time_to_maturity,
                barrier_distance,
            })
    }

    proptest! {
        #[test]
        fn prop_worsening_never_lowers_score(f in factors(), bump in 0.0f64..0.5) {
            let base = risk_score(&f);

            let mut worse = f;
            worse.delta = f.delta.signum() * (f.delta.abs() + bump);
            prop_assert!(risk_score(&worse) >= base);

            let mut worse = f;
            worse.gamma += bump;
            prop_assert!(risk_score(&worse) >= base);

            let mut worse = f;
            worse.vega = f.vega.signum() * (f.vega.abs() + bump);
            prop_assert!(risk_score(&worse) >= base);

            let mut worse = f;
            worse.time_to_maturity = (f.time_to_maturity - bump).max(0.0);
            prop_assert!(risk_score(&worse) >= base);

            prop_assert!(classify(&worse) >= classify(&f));
        }

        #[test]
        fn prop_crossing_a_threshold_raises_score(f in factors()) {
            let mut below = f;
            below.gamma = 0.004;
            let mut above = f;
            above.gamma = 0.011;
            prop_assert_eq!(risk_score(&above), risk_score(&below) + 2);
        }
    }
}
