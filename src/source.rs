//! Collaborator interfaces
//!
//! The engine never loads data itself. Positions, structured products and
//! real-time quotes come from implementations of the traits below, supplied
//! by the persistence and market-data layers.

use crate::error::Result;
use crate::instruments::{Position, StructuredProduct};
use std::collections::HashMap;

pub type PortfolioId = u64;
pub type ProductId = u64;

/// Supplies the positions of a portfolio
pub trait PositionSource {
    /// All positions held in a portfolio; an unknown portfolio has none
    fn list_positions(&self, portfolio_id: PortfolioId) -> Result<Vec<Position>>;
}

/// Supplies structured product terms
pub trait ProductSource {
    fn structured_product(&self, id: ProductId) -> Result<Option<StructuredProduct>>;
}

/// Real-time price and volatility cache
///
/// Reads are point-in-time; staleness is the caller's concern.
pub trait MarketDataSource {
    fn current_price(&self, symbol: &str) -> Option<f64>;
    fn implied_volatility(&self, symbol: &str) -> Option<f64>;
}

/// HashMap-backed store implementing every collaborator trait
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    portfolios: HashMap<PortfolioId, Vec<Position>>,
    products: HashMap<ProductId, StructuredProduct>,
    prices: HashMap<String, f64>,
    volatilities: HashMap<String, f64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a position to a portfolio
    pub fn add_position(&mut self, portfolio_id: PortfolioId, position: Position) {
        self.portfolios.entry(portfolio_id).or_default().push(position);
    }

    /// Replace all positions of a portfolio
    pub fn set_positions(&mut self, portfolio_id: PortfolioId, positions: Vec<Position>) {
        self.portfolios.insert(portfolio_id, positions);
    }

    pub fn insert_product(&mut self, id: ProductId, product: StructuredProduct) {
        self.products.insert(id, product);
    }

    /// Record a quote for a symbol
    pub fn set_quote(&mut self, symbol: impl Into<String>, price: f64, volatility: f64) {
        let symbol = symbol.into();
        self.prices.insert(symbol.clone(), price);
        self.volatilities.insert(symbol, volatility);
    }

    pub fn set_price(&mut self, symbol: impl Into<String>, price: f64) {
        self.prices.insert(symbol.into(), price);
    }
}

impl PositionSource for InMemoryStore {
    fn list_positions(&self, portfolio_id: PortfolioId) -> Result<Vec<Position>> {
        Ok(self
            .portfolios
            .get(&portfolio_id)
            .cloned()
            .unwrap_or_default())
    }
}

impl ProductSource for InMemoryStore {
    fn structured_product(&self, id: ProductId) -> Result<Option<StructuredProduct>> {
        Ok(self.products.get(&id).cloned())
    }
}

impl MarketDataSource for InMemoryStore {
    fn current_price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(symbol).copied()
    }

    fn implied_volatility(&self, symbol: &str) -> Option<f64> {
        self.volatilities.get(symbol).copied()
    }
}
