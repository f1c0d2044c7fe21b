//! Positions and structured products
//!
//! These records are owned by the persistence layer and handed to the engine
//! read-only. Unrecognised asset classes and product types are preserved as
//! `Other` so that aggregate calculations stay total.

use crate::error::{ensure_non_negative, ensure_positive, RiskError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DAYS_PER_YEAR: f64 = 365.0;

/// Asset class of a portfolio position
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetClass {
    Equity,
    Bond,
    Etf,
    Derivative,
    /// Anything else; priced with the fallback calibration
    Other(String),
}

impl AssetClass {
    pub fn as_str(&self) -> &str {
        match self {
            AssetClass::Equity => "Equity",
            AssetClass::Bond => "Bond",
            AssetClass::Etf => "ETF",
            AssetClass::Derivative => "Derivative",
            AssetClass::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AssetClass::Other(_))
    }
}

impl From<&str> for AssetClass {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "equity" => AssetClass::Equity,
            "bond" => AssetClass::Bond,
            "etf" => AssetClass::Etf,
            "derivative" => AssetClass::Derivative,
            _ => AssetClass::Other(value.to_string()),
        }
    }
}

impl From<String> for AssetClass {
    fn from(value: String) -> Self {
        AssetClass::from(value.as_str())
    }
}

impl From<AssetClass> for String {
    fn from(value: AssetClass) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for AssetClass {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(AssetClass::from(s))
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A holding in a portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Ticker or instrument identifier
    pub symbol: String,

    /// Asset class used to look up calibration and stress shocks
    pub asset_class: AssetClass,

    /// Units held (non-negative)
    pub quantity: f64,

    /// Price paid per unit (positive)
    pub purchase_price: f64,
}

impl Position {
    /// Create a validated position
    pub fn new(
        symbol: impl Into<String>,
        asset_class: impl Into<AssetClass>,
        quantity: f64,
        purchase_price: f64,
    ) -> Result<Self> {
        let position = Self {
            symbol: symbol.into(),
            asset_class: asset_class.into(),
            quantity,
            purchase_price,
        };
        position.validate()?;
        Ok(position)
    }

    /// Position value: quantity × purchase price
    pub fn value(&self) -> f64 {
        self.quantity * self.purchase_price
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("Quantity", self.quantity)?;
        ensure_positive("Purchase price", self.purchase_price)
    }
}

/// Structured product family
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
    Autocallable,
    BarrierReverseConvertible,
    EquityLinkedNote,
    /// Unknown product family; priced without a type adjustment
    Other(String),
}

impl ProductType {
    pub fn as_str(&self) -> &str {
        match self {
            ProductType::Autocallable => "AUTOCALLABLE",
            ProductType::BarrierReverseConvertible => "BARRIER_REVERSE_CONVERTIBLE",
            ProductType::EquityLinkedNote => "EQUITY_LINKED_NOTE",
            ProductType::Other(name) => name,
        }
    }
}

impl From<&str> for ProductType {
    fn from(value: &str) -> Self {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "autocallable" => ProductType::Autocallable,
            "barrierreverseconvertible" | "brc" => ProductType::BarrierReverseConvertible,
            "equitylinkednote" | "eln" => ProductType::EquityLinkedNote,
            _ => ProductType::Other(value.to_string()),
        }
    }
}

impl From<String> for ProductType {
    fn from(value: String) -> Self {
        ProductType::from(value.as_str())
    }
}

impl From<ProductType> for String {
    fn from(value: ProductType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discrete risk tier assigned to a structured product
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskStatus {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskStatus::Green => "GREEN",
            RiskStatus::Yellow => "YELLOW",
            RiskStatus::Red => "RED",
        };
        f.write_str(label)
    }
}

/// Contractual terms and current market inputs of a structured product
///
/// Derived values (price, Greeks, risk status) are never stored here; see
/// [`crate::models::ProductValuation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredProduct {
    pub product_code: String,
    pub product_type: ProductType,

    /// Symbol of the underlying, used for market data lookups
    pub underlying: String,

    pub notional: f64,
    pub strike: f64,

    /// Knock-in barrier level, if the product has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barrier: Option<f64>,

    pub coupon_rate: f64,
    pub issue_date: DateTime<Utc>,
    pub maturity_date: DateTime<Utc>,

    /// Current spot of the underlying
    pub underlying_price: f64,

    /// Implied volatility of the underlying (annualised, e.g. 0.25)
    pub implied_volatility: f64,
}

impl StructuredProduct {
    /// Time to maturity in years (whole days / 365), floored at zero
    pub fn time_to_maturity(&self, as_of: DateTime<Utc>) -> f64 {
        if as_of >= self.maturity_date {
            return 0.0;
        }
        let days = (self.maturity_date - as_of).num_days();
        days.max(0) as f64 / DAYS_PER_YEAR
    }

    /// Spot divided by barrier, when a barrier exists
    pub fn barrier_distance(&self) -> Option<f64> {
        self.barrier.map(|barrier| self.underlying_price / barrier)
    }

    /// Copy of this product with the market inputs replaced
    pub fn with_market(&self, underlying_price: f64, implied_volatility: f64) -> Self {
        Self {
            underlying_price,
            implied_volatility,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("Underlying price", self.underlying_price)?;
        ensure_positive("Strike price", self.strike)?;
        ensure_positive("Implied volatility", self.implied_volatility)?;
        ensure_non_negative("Notional", self.notional)?;
        if let Some(barrier) = self.barrier {
            ensure_positive("Barrier level", barrier)?;
        }
        if self.maturity_date < self.issue_date {
            return Err(RiskError::InvalidParameter(format!(
                "Maturity {} precedes issue date {}",
                self.maturity_date, self.issue_date
            )));
        }
        Ok(())
    }
}
