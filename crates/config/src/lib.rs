//! Configuration loading, validation, and management for Storewise.
//!
//! Loads configuration from `./storewise.toml` (or an explicit path), after
//! reading a `.env` file into the process environment, then applies
//! environment variable overrides. Values needed only by one backend are
//! optional here and checked at first use through the `require_*` accessors,
//! so a missing Census key never stops the enterprise agent from working.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "storewise.toml";

/// Environment variables read as overrides.
pub mod env_keys {
    pub const DATABRICKS_HOST: &str = "DATABRICKS_HOST";
    pub const DATABRICKS_TOKEN: &str = "DATABRICKS_TOKEN";
    pub const DATABRICKS_BASE_URL: &str = "DATABRICKS_BASE_URL";
    pub const DATABRICKS_MODEL: &str = "DATABRICKS_MODEL";
    pub const DATABRICKS_WAREHOUSE_ID: &str = "DATABRICKS_WAREHOUSE_ID";
    pub const GENIE_SPACE_STORE_PERFORMANCE_ID: &str = "GENIE_SPACE_STORE_PERFORMANCE_ID";
    pub const GENIE_SPACE_PRODUCT_INV_ID: &str = "GENIE_SPACE_PRODUCT_INV_ID";
    pub const POLICY_FUNCTION_NAME: &str = "POLICY_FUNCTION_NAME";
    pub const CENSUS_API_KEY: &str = "CENSUS_API_KEY";
    pub const PERPLEXITY_API_KEY: &str = "PERPLEXITY_API_KEY";
    pub const MLFLOW_EXPERIMENT_ID: &str = "MLFLOW_EXPERIMENT_ID";
}

/// The root configuration structure.
///
/// Maps directly to `storewise.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Workspace connection and the agent model endpoint
    #[serde(default)]
    pub databricks: DatabricksConfig,

    /// Genie space ids and polling behaviour
    #[serde(default)]
    pub genie: GenieConfig,

    /// Conduct-policy lookup function
    #[serde(default)]
    pub policy: PolicyConfig,

    /// US Census API
    #[serde(default)]
    pub census: CensusConfig,

    /// Web research model
    #[serde(default)]
    pub research: ResearchConfig,

    /// Agent runtime settings
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Web front-end
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Tracing export (recorded only)
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct DatabricksConfig {
    /// Workspace URL, e.g. `https://adb-123.azuredatabricks.net`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Personal access token, used as a bearer token everywhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// OpenAI-compatible serving endpoint base URL for the agent model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Serving endpoint / model name for all three agents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// SQL warehouse that executes the policy function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,

    /// Per-request HTTP timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for DatabricksConfig {
    fn default() -> Self {
        Self {
            host: None,
            token: None,
            base_url: None,
            model: None,
            warehouse_id: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for DatabricksConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabricksConfig")
            .field("host", &self.host)
            .field("token", &redact(&self.token))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("warehouse_id", &self.warehouse_id)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenieConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_performance_space_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_inventory_space_id: Option<String>,

    /// Delay between status polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Give up on a query after this long
    #[serde(default = "default_genie_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}
fn default_genie_timeout_secs() -> u64 {
    60
}

impl Default for GenieConfig {
    fn default() -> Self {
        Self {
            store_performance_space_id: None,
            product_inventory_space_id: None,
            poll_interval_ms: default_poll_interval_ms(),
            timeout_secs: default_genie_timeout_secs(),
        }
    }
}

impl GenieConfig {
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Fully qualified `catalog.schema.function` name
    #[serde(default = "default_policy_function")]
    pub function_name: String,
}

pub const DEFAULT_POLICY_FUNCTION: &str = "juan_dev.genai.retail_club_conduct";

fn default_policy_function() -> String {
    DEFAULT_POLICY_FUNCTION.into()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            function_name: default_policy_function(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CensusConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// ACS5 vintage to query
    #[serde(default = "default_census_year")]
    pub year: u16,

    #[serde(default = "default_census_base_url")]
    pub base_url: String,
}

fn default_census_year() -> u16 {
    2020
}
fn default_census_base_url() -> String {
    "https://api.census.gov/data".into()
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            year: default_census_year(),
            base_url: default_census_base_url(),
        }
    }
}

impl std::fmt::Debug for CensusConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CensusConfig")
            .field("api_key", &redact(&self.api_key))
            .field("year", &self.year)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_research_base_url")]
    pub base_url: String,

    #[serde(default = "default_research_model")]
    pub model: String,

    /// Prefix research queries with today's date
    #[serde(default = "default_true")]
    pub include_date: bool,

    /// Per-request HTTP timeout for research calls
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_research_base_url() -> String {
    "https://api.perplexity.ai".into()
}
fn default_research_model() -> String {
    "sonar-reasoning-pro".into()
}
fn default_true() -> bool {
    true
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_research_base_url(),
            model: default_research_model(),
            include_date: true,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ResearchConfig {
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

impl std::fmt::Debug for ResearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("include_date", &self.include_date)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Model turns allowed per top-level run
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_max_turns() -> u32 {
    10
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8501
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment_id: Option<String>,
}

impl AppConfig {
    /// Load configuration the way the binary does.
    ///
    /// 1. `.env` in the working directory is loaded into the environment
    ///    (existing variables win).
    /// 2. The TOML file at `path`, or `./storewise.toml`, is parsed if present.
    /// 3. Environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(p) => tracing::debug!("Loaded environment from {}", p.display()),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!("Ignoring unreadable .env file: {e}"),
        }

        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        let mut config = Self::read_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply environment overrides. Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        use env_keys::*;

        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(DATABRICKS_HOST) {
            self.databricks.host = Some(v);
        }
        if let Some(v) = get(DATABRICKS_TOKEN) {
            self.databricks.token = Some(v);
        }
        if let Some(v) = get(DATABRICKS_BASE_URL) {
            self.databricks.base_url = Some(v);
        }
        if let Some(v) = get(DATABRICKS_MODEL) {
            self.databricks.model = Some(v);
        }
        if let Some(v) = get(DATABRICKS_WAREHOUSE_ID) {
            self.databricks.warehouse_id = Some(v);
        }
        if let Some(v) = get(GENIE_SPACE_STORE_PERFORMANCE_ID) {
            self.genie.store_performance_space_id = Some(v);
        }
        if let Some(v) = get(GENIE_SPACE_PRODUCT_INV_ID) {
            self.genie.product_inventory_space_id = Some(v);
        }
        if let Some(v) = get(POLICY_FUNCTION_NAME) {
            self.policy.function_name = v;
        }
        if let Some(v) = get(CENSUS_API_KEY) {
            self.census.api_key = Some(v);
        }
        if let Some(v) = get(PERPLEXITY_API_KEY) {
            self.research.api_key = Some(v);
        }
        if let Some(v) = get(MLFLOW_EXPERIMENT_ID) {
            self.telemetry.experiment_id = Some(v);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.genie.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "genie.poll_interval_ms must be > 0".into(),
            ));
        }

        if self.genie.timeout().as_millis() < u128::from(self.genie.poll_interval_ms) {
            return Err(ConfigError::ValidationError(
                "genie.timeout_secs must be at least one poll interval".into(),
            ));
        }

        if !(0.0..=2.0).contains(&self.agents.temperature) {
            return Err(ConfigError::ValidationError(
                "agents.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.agents.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "agents.max_turns must be > 0".into(),
            ));
        }

        if !is_qualified_function_name(&self.policy.function_name) {
            return Err(ConfigError::ValidationError(format!(
                "policy.function_name '{}' must look like catalog.schema.function",
                self.policy.function_name
            )));
        }

        Ok(())
    }

    fn require<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str, ConfigError> {
        value
            .as_deref()
            .ok_or(ConfigError::MissingValue { key })
    }

    pub fn require_databricks_host(&self) -> Result<&str, ConfigError> {
        Self::require(&self.databricks.host, env_keys::DATABRICKS_HOST)
    }

    pub fn require_databricks_token(&self) -> Result<&str, ConfigError> {
        Self::require(&self.databricks.token, env_keys::DATABRICKS_TOKEN)
    }

    pub fn require_model_base_url(&self) -> Result<&str, ConfigError> {
        Self::require(&self.databricks.base_url, env_keys::DATABRICKS_BASE_URL)
    }

    pub fn require_model(&self) -> Result<&str, ConfigError> {
        Self::require(&self.databricks.model, env_keys::DATABRICKS_MODEL)
    }

    pub fn require_warehouse_id(&self) -> Result<&str, ConfigError> {
        Self::require(&self.databricks.warehouse_id, env_keys::DATABRICKS_WAREHOUSE_ID)
    }

    pub fn require_store_performance_space(&self) -> Result<&str, ConfigError> {
        Self::require(
            &self.genie.store_performance_space_id,
            env_keys::GENIE_SPACE_STORE_PERFORMANCE_ID,
        )
    }

    pub fn require_product_inventory_space(&self) -> Result<&str, ConfigError> {
        Self::require(
            &self.genie.product_inventory_space_id,
            env_keys::GENIE_SPACE_PRODUCT_INV_ID,
        )
    }

    pub fn require_census_api_key(&self) -> Result<&str, ConfigError> {
        Self::require(&self.census.api_key, env_keys::CENSUS_API_KEY)
    }

    pub fn require_perplexity_api_key(&self) -> Result<&str, ConfigError> {
        Self::require(&self.research.api_key, env_keys::PERPLEXITY_API_KEY)
    }

    /// Every required key that is currently unset, in a stable order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let checks: [(&'static str, Result<&str, ConfigError>); 9] = [
            (env_keys::DATABRICKS_HOST, self.require_databricks_host()),
            (env_keys::DATABRICKS_TOKEN, self.require_databricks_token()),
            (env_keys::DATABRICKS_BASE_URL, self.require_model_base_url()),
            (env_keys::DATABRICKS_MODEL, self.require_model()),
            (env_keys::DATABRICKS_WAREHOUSE_ID, self.require_warehouse_id()),
            (
                env_keys::GENIE_SPACE_STORE_PERFORMANCE_ID,
                self.require_store_performance_space(),
            ),
            (
                env_keys::GENIE_SPACE_PRODUCT_INV_ID,
                self.require_product_inventory_space(),
            ),
            (env_keys::CENSUS_API_KEY, self.require_census_api_key()),
            (env_keys::PERPLEXITY_API_KEY, self.require_perplexity_api_key()),
        ];
        checks
            .into_iter()
            .filter(|(_, r)| r.is_err())
            .map(|(k, _)| k)
            .collect()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// `catalog.schema.function`, each part an identifier.
fn is_qualified_function_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() == 3
        && parts.iter().all(|p| {
            !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required configuration value: {key}")]
    MissingValue { key: &'static str },
}

impl From<ConfigError> for storewise_core::Error {
    fn from(e: ConfigError) -> Self {
        storewise_core::Error::Config {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.genie.poll_interval_ms, 2_000);
        assert_eq!(config.genie.timeout_secs, 60);
        assert_eq!(config.agents.max_turns, 10);
        assert_eq!(config.policy.function_name, "juan_dev.genai.retail_club_conduct");
        assert_eq!(config.research.model, "sonar-reasoning-pro");
        assert_eq!(config.research.request_timeout().as_secs(), 120);
        assert_eq!(config.census.year, 2020);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.genie.timeout_secs, config.genie.timeout_secs);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.agents.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let mut config = AppConfig::default();
        config.genie.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn timeout_shorter_than_interval_rejected() {
        let mut config = AppConfig::default();
        config.genie.poll_interval_ms = 5_000;
        config.genie.timeout_secs = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_policy_function_rejected() {
        let mut config = AppConfig::default();
        config.policy.function_name = "conduct; DROP TABLE x".into();
        assert!(config.validate().is_err());
        config.policy.function_name = "main.policies.lookup_v2".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/storewise.toml")).unwrap();
        assert_eq!(config.gateway.port, 8501);
    }

    #[test]
    fn file_values_are_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[databricks]
host = "https://adb-1.example.net"
model = "agents-llama"

[genie]
store_performance_space_id = "space-store"
poll_interval_ms = 500
timeout_secs = 10
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.require_databricks_host().unwrap(), "https://adb-1.example.net");
        assert_eq!(config.require_model().unwrap(), "agents-llama");
        assert_eq!(config.require_store_performance_space().unwrap(), "space-store");
        assert_eq!(config.genie.poll_interval(), std::time::Duration::from_millis(500));
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[genie\npoll_interval_ms = ").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AppConfig::default();
        config.databricks.model = Some("from-file".into());
        config.apply_env(env_from(&[
            ("DATABRICKS_MODEL", "from-env"),
            ("GENIE_SPACE_PRODUCT_INV_ID", "space-inv"),
            ("PERPLEXITY_API_KEY", "pplx-123"),
            ("POLICY_FUNCTION_NAME", "main.hr.conduct"),
        ]));
        assert_eq!(config.require_model().unwrap(), "from-env");
        assert_eq!(config.require_product_inventory_space().unwrap(), "space-inv");
        assert_eq!(config.require_perplexity_api_key().unwrap(), "pplx-123");
        assert_eq!(config.policy.function_name, "main.hr.conduct");
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.databricks.host = Some("https://file.example".into());
        config.apply_env(env_from(&[("DATABRICKS_HOST", "  ")]));
        assert_eq!(config.require_databricks_host().unwrap(), "https://file.example");
    }

    #[test]
    fn missing_value_names_the_key() {
        let config = AppConfig::default();
        let err = config.require_census_api_key().unwrap_err();
        assert!(err.to_string().contains("CENSUS_API_KEY"));
        assert!(matches!(err, ConfigError::MissingValue { key: "CENSUS_API_KEY" }));
    }

    #[test]
    fn missing_keys_lists_everything_unset() {
        let mut config = AppConfig::default();
        assert_eq!(config.missing_keys().len(), 9);
        config.apply_env(env_from(&[("DATABRICKS_TOKEN", "dapi-1"), ("CENSUS_API_KEY", "c")]));
        let missing = config.missing_keys();
        assert_eq!(missing.len(), 7);
        assert!(!missing.contains(&"DATABRICKS_TOKEN"));
        assert_eq!(missing[0], "DATABRICKS_HOST");
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let mut config = AppConfig::default();
        config.apply_env(env_from(&[
            ("DATABRICKS_TOKEN", "dapi-secret"),
            ("CENSUS_API_KEY", "census-secret"),
            ("PERPLEXITY_API_KEY", "pplx-secret"),
        ]));
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("8501"));
        assert!(toml_str.contains("retail_club_conduct"));
    }
}
