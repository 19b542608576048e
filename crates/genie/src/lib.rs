//! # Storewise Genie
//!
//! Client for Databricks Genie, the text-to-SQL service behind the store
//! performance and product inventory tools. A query is asynchronous on the
//! server: start a conversation, poll the message until it completes, then
//! fetch the executed query's result.

pub mod api;
pub mod client;
pub mod error;
pub mod http;

pub use api::{Attachment, GenieApi, GenieMessage, MessageStatus, StartedConversation};
pub use client::{GenieClient, GenieOutcome, GenieSpace, NO_ATTACHMENTS_MESSAGE};
pub use error::GenieError;
pub use http::HttpGenieApi;

use std::sync::Arc;
use std::time::Duration;
use storewise_config::AppConfig;

/// Build the HTTP-backed client from workspace credentials and `[genie]` settings.
pub fn client_from_config(config: &AppConfig) -> storewise_core::Result<GenieClient> {
    let host = config.require_databricks_host()?;
    let token = config.require_databricks_token()?;
    let request_timeout = Duration::from_secs(config.databricks.request_timeout_secs);
    let api = HttpGenieApi::new(host, token, request_timeout).map_err(|e| {
        storewise_core::Error::Config {
            message: e.to_string(),
        }
    })?;

    Ok(GenieClient::new(Arc::new(api))
        .with_poll_interval(config.genie.poll_interval())
        .with_timeout(config.genie.timeout()))
}

/// Space id configured for `space`.
pub fn space_id(config: &AppConfig, space: GenieSpace) -> storewise_core::Result<String> {
    let id = match space {
        GenieSpace::StorePerformance => config.require_store_performance_space()?,
        GenieSpace::ProductInventory => config.require_product_inventory_space()?,
    };
    Ok(id.to_string())
}
