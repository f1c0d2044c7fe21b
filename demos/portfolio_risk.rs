//! Example: Portfolio risk report
//!
//! Builds a small multi-asset portfolio and prints VaR, Expected Shortfall,
//! drawdown, stress losses and credit / liquidity metrics.
//!
//! Run with: RUST_LOG=debug cargo run --example portfolio_risk

use rv_risk::models::{CreditProfile, LiquidityInputs};
use rv_risk::{EngineConfig, InMemoryStore, Position, RiskEngine};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Portfolio Risk Report ===\n");

    let mut store = InMemoryStore::new();
    store.set_positions(
        1,
        vec![
            Position::new("AAPL", "Equity", 500.0, 150.0)?,
            Position::new("NVDA", "Equity", 100.0, 480.0)?,
            Position::new("TLT", "Bond", 800.0, 95.0)?,
            Position::new("SPY", "ETF", 150.0, 450.0)?,
            Position::new("SPX-P", "Derivative", 20.0, 900.0)?,
        ],
    );

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/calibration.yaml");
    let config = EngineConfig::from_yaml(&std::fs::read_to_string(path)?)?;
    let engine = RiskEngine::new(config, store)?;

    let report = engine.risk_report(1)?;

    println!("Portfolio value:        {:>14.2}", report.portfolio_value);
    println!("Beta:                   {:>14.3}", report.beta);
    println!("Sharpe ratio:           {:>14.3}", report.sharpe_ratio);
    println!("Concentration:          {:>14.3}", report.concentration_ratio);
    println!();
    println!("Parametric VaR 95%:     {:>14.2}", report.parametric_var_95);
    println!("Parametric VaR 99%:     {:>14.2}", report.parametric_var_99);
    println!("Monte Carlo VaR 95%:    {:>14.2}", report.monte_carlo_var_95);
    println!("Monte Carlo VaR 99%:    {:>14.2}", report.monte_carlo_var_99);
    println!("Expected Shortfall 95%: {:>14.2}", report.expected_shortfall_95);
    println!("Expected Shortfall 99%: {:>14.2}", report.expected_shortfall_99);
    println!("Max drawdown (1y):      {:>14.2}", report.max_drawdown);

    println!("\n## Allocation");
    for (asset_class, weight) in &report.allocation {
        println!("  {:<12} {:>6.1}%", asset_class, weight * 100.0);
    }

    println!("\n## Position stress");
    for loss in &report.stress.losses {
        println!("  {:<22} {:>12.2}", loss.scenario, loss.loss);
    }
    if let Some(worst) = &report.stress.worst_scenario {
        println!("  Worst: {} ({:.2})", worst, report.stress.worst_loss);
    }

    println!("\n## Narrative scenarios");
    for result in engine.stress_test(report.portfolio_value)? {
        println!(
            "  {:<20} {:>7.1}%  stressed {:>12.2}  recovery {} months",
            result.scenario, result.percentage_change, result.stressed_value, result.recovery_months
        );
    }

    println!("\n## Credit");
    let credit = engine.credit_risk(&CreditProfile {
        credit_score: 720.0,
        debt_to_equity: 1.2,
        current_ratio: 1.6,
        interest_coverage: 5.0,
        industry_risk_score: 4.0,
        exposure_amount: 500_000.0,
    })?;
    println!("  PD {:.4}  LGD {:.3}  EL {:.2}  rating {}",
        credit.probability_of_default,
        credit.loss_given_default,
        credit.expected_loss,
        credit.rating
    );

    println!("\n## Liquidity");
    let liquidity = engine.liquidity_metrics(&LiquidityInputs {
        cash_and_equivalents: 120_000.0,
        liquid_securities: 300_000.0,
        total_assets: 1_200_000.0,
        short_term_liabilities: 250_000.0,
    })?;
    println!(
        "  LCR {:.2}  quick {:.2}  risk {}",
        liquidity.liquidity_coverage_ratio, liquidity.quick_ratio, liquidity.liquidity_risk
    );

    Ok(())
}
