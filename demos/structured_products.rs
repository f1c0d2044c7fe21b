//! Example: Structured product valuation and stress
//!
//! Values a small book of structured products, overlays live quotes and
//! runs the product-level stress scenarios.
//!
//! Run with: cargo run --example structured_products

use chrono::{Duration, Utc};
use rv_risk::models::{high_gamma, near_barrier, near_maturity};
use rv_risk::{InMemoryStore, ProductType, RiskEngine, StructuredProduct};

fn note(
    code: &str,
    product_type: ProductType,
    underlying: &str,
    barrier: Option<f64>,
    days_to_maturity: i64,
) -> StructuredProduct {
    let now = Utc::now();
    StructuredProduct {
        product_code: code.to_string(),
        product_type,
        underlying: underlying.to_string(),
        notional: 100_000.0,
        strike: 100.0,
        barrier,
        coupon_rate: 0.06,
        issue_date: now - Duration::days(90),
        maturity_date: now + Duration::days(days_to_maturity),
        underlying_price: 100.0,
        implied_volatility: 0.22,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Structured Product Book ===\n");

    let mut store = InMemoryStore::new();
    store.insert_product(1, note("AC-NESN", ProductType::Autocallable, "NESN", Some(70.0), 540));
    store.insert_product(2, note("BRC-ROG", ProductType::BarrierReverseConvertible, "ROG", Some(80.0), 365));
    store.insert_product(3, note("ELN-UBSG", ProductType::EquityLinkedNote, "UBSG", None, 45));

    // Live quotes; ROG has no implied volatility feed
    store.set_quote("NESN", 96.5, 0.18);
    store.set_price("ROG", 86.0);
    store.set_quote("UBSG", 104.0, 0.30);

    let engine = RiskEngine::with_defaults(store);
    let now = Utc::now();

    let mut book = Vec::new();
    let mut valuations = Vec::new();
    for id in 1..=3 {
        let product = engine.refresh_market(&engine.structured_product(id)?);
        let valuation = engine.value_structured_product(&product, now)?;

        println!(
            "{:<10} price {:>8.4}  delta {:>6.3}  gamma {:>7.4}  vega {:>6.3}  {} ({})",
            valuation.product_code,
            valuation.price,
            valuation.greeks.delta,
            valuation.greeks.gamma,
            valuation.greeks.vega,
            valuation.risk_status,
            valuation.risk_score
        );

        book.push(product);
        valuations.push(valuation);
    }

    println!("\n## Screens");
    for product in near_barrier(&book, 1.10) {
        println!("  Near barrier:  {}", product.product_code);
    }
    for product in near_maturity(&book, now, 60) {
        println!("  Near maturity: {}", product.product_code);
    }
    for valuation in high_gamma(&valuations, 0.02) {
        println!("  High gamma:    {}", valuation.product_code);
    }

    println!("\n## Stress: {}", book[1].product_code);
    for result in engine.stress_test_structured_product(&book[1], now)? {
        println!(
            "  {:<18} value {:>10.4}  change {:>+10.4}",
            result.scenario, result.scenario_value, result.change
        );
    }

    Ok(())
}
