//! # rv-risk: Quantitative Risk Engine for Portfolios and Structured Products
//!
//! This library provides the analytics behind a risk dashboard: option
//! pricing, Monte Carlo tail risk, stress testing, credit and liquidity
//! metrics for multi-asset portfolios and structured products.
//!
//! ## Core Components
//!
//! - **RiskEngine**: Facade resolving portfolio and product ids through a data source
//! - **models**: Pure pricing, simulation, stress, credit and liquidity models
//! - **EngineConfig**: YAML/JSON calibration (asset-class table, z-scores, seeds)
//! - **Data sources**: `PositionSource`, `ProductSource` and `MarketDataSource` traits
//!
//! ## Example Usage
//!
//! ```rust
//! use rv_risk::{InMemoryStore, Position, RiskEngine};
//!
//! let mut store = InMemoryStore::new();
//! store.add_position(1, Position::new("AAPL", "Equity", 100.0, 500.0).unwrap());
//! store.add_position(1, Position::new("TLT", "Bond", 500.0, 100.0).unwrap());
//!
//! let engine = RiskEngine::with_defaults(store);
//!
//! let var = engine.monte_carlo_var(1, 0.95, 10_000).unwrap();
//! assert!(var > 0.0);
//!
//! // Same seed, same answer
//! assert_eq!(var, engine.monte_carlo_var(1, 0.95, 10_000).unwrap());
//! ```
//!
//! Pure models can be used without an engine:
//!
//! ```rust
//! use rv_risk::models::{price_option, BlackScholesParams};
//!
//! let params = BlackScholesParams::new(100.0, 100.0, 1.0, 0.05, 0.2);
//! let quote = price_option(&params).unwrap();
//! assert!((quote.call_price - 10.4506).abs() < 1e-4);
//! ```

mod config;
mod engine;
mod error;
mod instruments;
pub mod models;
mod source;

pub use config::{AssetClassParams, AssetClassTable, EngineConfig, SimulationDefaults, ZScore};
pub use engine::{PortfolioRiskReport, RiskEngine};
pub use error::{Result, RiskError};
pub use instruments::{AssetClass, Position, ProductType, RiskStatus, StructuredProduct};
pub use source::{
    InMemoryStore, MarketDataSource, PortfolioId, PositionSource, ProductId, ProductSource,
};
