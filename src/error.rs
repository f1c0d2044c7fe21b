//! Error types for the risk engine

use crate::source::ProductId;
use thiserror::Error;

/// Errors that can occur while pricing or measuring risk
///
/// Domain edges (empty portfolios, matured products, missing barriers) are
/// not errors; they resolve to a defined zero or terminal value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid confidence level: {0} (must be between 0 and 1)")]
    InvalidConfidenceLevel(f64),

    #[error("Structured product not found: {0}")]
    ProductNotFound(ProductId),

    /// Raised by `PositionSource` / `ProductSource` implementations when the
    /// backing store fails; the engine passes it through unchanged
    #[error("Data source error: {0}")]
    Source(String),

    #[error("Failed to parse configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RiskError>;

/// Reject anything that is not a finite, strictly positive number
pub(crate) fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RiskError::InvalidParameter(format!(
            "{} must be positive, got {}",
            name, value
        )))
    }
}

/// Reject anything that is not a finite, non-negative number
pub(crate) fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RiskError::InvalidParameter(format!(
            "{} must be non-negative, got {}",
            name, value
        )))
    }
}

pub(crate) fn ensure_confidence(confidence_level: f64) -> Result<()> {
    if confidence_level > 0.0 && confidence_level < 1.0 {
        Ok(())
    } else {
        Err(RiskError::InvalidConfidenceLevel(confidence_level))
    }
}
