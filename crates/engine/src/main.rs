//! bookrec binary
//!
//! Usage: `bookrec <ratings.json> <user_id> [test_ratio]`
//!
//! Reads a JSON array of `{user_id, item_id, rating}` records, holds out a
//! seeded share of them, trains every model on the rest and prints the
//! ensemble rows and per-model metrics for the user as JSON on stdout.

use anyhow::Context;
use bookrec_engine::{
    init_logging, train_test_split, EngineConfig, EntityId, RatingRecord, RecommendationSession,
};
use tracing::{error, info};

const DEFAULT_TEST_RATIO: f64 = 0.2;

/// Usage line; argv may be empty when exec'd without arguments
fn usage(args: &[String]) -> String {
    let program = args.first().map(String::as_str).unwrap_or("bookrec");
    format!("usage: {} <ratings.json> <user_id> [test_ratio]", program)
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        anyhow::bail!("{}", usage(&args));
    }

    dotenvy::dotenv().ok();

    let config = EngineConfig::load()?;
    init_logging(&config.logging)?;

    let test_ratio = match args.get(3) {
        Some(raw) => raw
            .parse::<f64>()
            .with_context(|| format!("invalid test ratio: {}", raw))?,
        None => DEFAULT_TEST_RATIO,
    };

    // Numeric ids on the command line match integer ids in the data.
    let user_id = match args[2].parse::<i64>() {
        Ok(id) => EntityId::Int(id),
        Err(_) => EntityId::from(args[2].as_str()),
    };

    let raw = std::fs::read_to_string(&args[1])
        .with_context(|| format!("failed to read {}", args[1]))?;
    let records: Vec<RatingRecord> =
        serde_json::from_str(&raw).context("ratings file is not a JSON array of records")?;

    info!(path = %args[1], records = records.len(), "Loaded ratings");

    let split = train_test_split(&records, test_ratio, config.factorization.seed)?;
    let held_out = split.for_user(&user_id);

    let mut session = RecommendationSession::new(config, &split.train)?;
    let tuning = session.train_factors()?;
    info!(
        rank = tuning.best.rank,
        searched = tuning.searched,
        "Latent-factor model ready"
    );

    let test_items: Vec<EntityId> = held_out.iter().map(|r| r.item_id.clone()).collect();
    let ensemble = session.ensemble(&user_id, &test_items)?;

    let report = match session.evaluate_user(&user_id, &held_out) {
        Ok(report) => Some(report),
        Err(e) => {
            error!(user = %user_id, error = %e, "Evaluation skipped");
            None
        }
    };

    if let Some(report) = &report {
        info!("\n{}", report);
    }

    let output = serde_json::json!({
        "user_id": user_id,
        "tuning": tuning,
        "ensemble": ensemble,
        "evaluation": report,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
