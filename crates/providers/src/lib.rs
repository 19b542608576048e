//! LLM provider implementations for Storewise.
//!
//! All providers implement the `storewise_core::Provider` trait. The agent
//! model and the research model are both OpenAI-compatible, so one client
//! covers both; the constructors below pick endpoints and credentials from
//! configuration.

pub mod chat;
pub mod sse;

pub use chat::{ChatCompletionsProvider, DEFAULT_TIMEOUT};

use std::time::Duration;
use storewise_config::AppConfig;

/// Provider for the agents' model, from `DATABRICKS_BASE_URL` + `DATABRICKS_TOKEN`.
pub fn agent_provider(config: &AppConfig) -> storewise_core::Result<ChatCompletionsProvider> {
    let base_url = config.require_model_base_url()?;
    let token = config.require_databricks_token()?;
    let timeout = Duration::from_secs(config.databricks.request_timeout_secs);
    Ok(ChatCompletionsProvider::databricks(base_url, token, timeout)?)
}

/// Provider for the research tool, from `PERPLEXITY_API_KEY`.
pub fn research_provider(config: &AppConfig) -> storewise_core::Result<ChatCompletionsProvider> {
    let api_key = config.require_perplexity_api_key()?;
    Ok(ChatCompletionsProvider::perplexity(
        &config.research.base_url,
        api_key,
        config.research.request_timeout(),
    )?)
}
