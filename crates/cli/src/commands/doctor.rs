//! `storewise doctor`: report which settings are missing.

use std::path::Path;
use storewise_config::{AppConfig, env_keys};

/// What stops working while `key` is unset.
fn affected_feature(key: &str) -> &'static str {
    match key {
        env_keys::DATABRICKS_HOST | env_keys::DATABRICKS_TOKEN => {
            "all workspace access (agents, analytics, policy)"
        }
        env_keys::DATABRICKS_BASE_URL | env_keys::DATABRICKS_MODEL => "the agents' chat model",
        env_keys::DATABRICKS_WAREHOUSE_ID => "the business conduct policy tool",
        env_keys::GENIE_SPACE_STORE_PERFORMANCE_ID => "store performance analytics",
        env_keys::GENIE_SPACE_PRODUCT_INV_ID => "product inventory analytics",
        env_keys::CENSUS_API_KEY => "state census demographics",
        env_keys::PERPLEXITY_API_KEY => "market research",
        _ => "unknown",
    }
}

fn report(config: &AppConfig) -> Vec<String> {
    config
        .missing_keys()
        .into_iter()
        .map(|key| format!("❌ {key} is not set: {} unavailable", affected_feature(key)))
        .collect()
}

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Storewise Doctor: configuration check");
    println!("========================================\n");

    let config = match AppConfig::load(config_path) {
        Ok(config) => {
            println!("  ✅ Configuration loaded and valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            return Err(e.into());
        }
    };

    let issues = report(&config);
    for line in &issues {
        println!("  {line}");
    }

    println!();
    if issues.is_empty() {
        println!("  🎉 All settings present!");
    } else {
        println!("  ⚠️  {} setting(s) missing. Set them in .env, the environment,", issues.len());
        println!("     or storewise.toml (see `databricks`, `genie`, `census`, `research`).");
    }

    Ok(())
}
