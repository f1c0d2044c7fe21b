//! Benchmarks for the risk models
//!
//! Run with: cargo bench

use chrono::{Duration, TimeZone, Utc};
use rv_risk::models::*;
use rv_risk::{EngineConfig, InMemoryStore, Position, ProductType, RiskEngine, StructuredProduct};

fn main() {
    println!("=== Risk Model Performance Benchmarks ===\n");

    benchmark_normal_distribution();
    benchmark_option_pricing();
    benchmark_monte_carlo();
    benchmark_structured_products();
    benchmark_engine_report();
}

fn portfolio(size: usize) -> Vec<Position> {
    let classes = ["Equity", "Bond", "ETF", "Derivative"];
    (0..size)
        .filter_map(|i| {
            Position::new(
                format!("SYM{}", i),
                classes[i % classes.len()],
                10.0 + i as f64,
                50.0 + (i % 7) as f64 * 10.0,
            )
            .ok()
        })
        .collect()
}

fn benchmark_normal_distribution() {
    println!("## Normal Distribution");

    let start = std::time::Instant::now();
    let mut acc = 0.0;
    for i in 0..100_000 {
        acc += normal_cdf(-5.0 + i as f64 * 1e-4);
    }
    let elapsed = start.elapsed();
    println!("  CDF (100,000 evaluations): {:?} (checksum {:.3})", elapsed, acc);

    let start = std::time::Instant::now();
    for i in 1..100_000 {
        acc += normal_inverse_cdf(i as f64 / 100_000.0);
    }
    let elapsed = start.elapsed();
    println!("  Inverse CDF (100,000 evaluations): {:?}", elapsed);

    println!();
}

fn benchmark_option_pricing() {
    println!("## Option Pricing");

    let params = BlackScholesParams::new(100.0, 100.0, 1.0, 0.05, 0.2);

    let start = std::time::Instant::now();
    for _ in 0..10_000 {
        let _ = price_option(&params);
    }
    let elapsed = start.elapsed();
    println!("  Price + Greeks (10,000 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 10_000);

    println!();
}

fn benchmark_monte_carlo() {
    println!("## Monte Carlo");

    let config = EngineConfig::default();
    let positions = portfolio(100);
    let model = PortfolioReturnModel::new(&positions, &config.asset_classes, config.trading_days_per_year);

    let ctx = SimulationContext::seeded(12345, 10_000);
    let start = std::time::Instant::now();
    let _ = monte_carlo_var(&model, 0.99, &ctx);
    let elapsed = start.elapsed();
    println!("  VaR (100 positions, 10,000 simulations): {:?}", elapsed);

    let start = std::time::Instant::now();
    let _ = expected_shortfall(&model, 0.99, &ctx);
    let elapsed = start.elapsed();
    println!("  Expected shortfall (100 positions, 10,000 simulations): {:?}", elapsed);

    let start = std::time::Instant::now();
    for _ in 0..100 {
        let _ = max_drawdown(&model, 252, &ctx);
    }
    let elapsed = start.elapsed();
    println!("  Drawdown (252 days, 100 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 100);

    let barrier_ctx = SimulationContext::seeded(12345, 1_000);
    let start = std::time::Instant::now();
    for _ in 0..1_000 {
        let _ = barrier_breach_probability(100.0, 70.0, 1.0, 0.05, 0.2, &barrier_ctx);
    }
    let elapsed = start.elapsed();
    println!("  Barrier breach (1,000 paths, 1,000 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 1_000);

    println!();
}

fn benchmark_structured_products() {
    println!("## Structured Products");

    let as_of = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).single().unwrap_or_else(Utc::now);
    let product = StructuredProduct {
        product_code: "BRC-BENCH".to_string(),
        product_type: ProductType::BarrierReverseConvertible,
        underlying: "NESN".to_string(),
        notional: 100_000.0,
        strike: 100.0,
        barrier: Some(75.0),
        coupon_rate: 0.07,
        issue_date: as_of - Duration::days(30),
        maturity_date: as_of + Duration::days(365),
        underlying_price: 100.0,
        implied_volatility: 0.2,
    };
    let pricer = StructuredPricer::from_config(&EngineConfig::default());

    let start = std::time::Instant::now();
    for _ in 0..1_000 {
        let _ = pricer.value(&product, as_of);
    }
    let elapsed = start.elapsed();
    println!("  Valuation with barrier paths (1,000 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 1_000);

    let start = std::time::Instant::now();
    for _ in 0..100 {
        let _ = stress_structured_product(&pricer, &product, as_of);
    }
    let elapsed = start.elapsed();
    println!("  Stress scenarios (5 scenarios, 100 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 100);

    println!();
}

fn benchmark_engine_report() {
    println!("## Engine");

    let mut store = InMemoryStore::new();
    store.set_positions(1, portfolio(50));
    let engine = RiskEngine::with_defaults(store);

    let start = std::time::Instant::now();
    for _ in 0..10 {
        let _ = engine.risk_report(1);
    }
    let elapsed = start.elapsed();
    println!("  Full risk report (50 positions, 10 iterations): {:?}", elapsed);
    println!("  Average: {:?}", elapsed / 10);

    println!();
}
