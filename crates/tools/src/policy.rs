//! Business conduct policy lookup.
//!
//! The policy text lives behind a Unity Catalog table function. The tool
//! validates the search query locally, then asks a [`FunctionRegistry`] to
//! execute the function with it.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use storewise_core::error::ToolError;
use storewise_core::tool::{Tool, ToolResult, required_str};
use tracing::{debug, info, warn};

pub const POLICY_TOOL: &str = "get_business_conduct_policy_info";

/// Executes catalog functions by fully qualified name.
#[async_trait]
pub trait FunctionRegistry: Send + Sync {
    /// Run `function_name` with named `parameters` (a JSON object of strings).
    async fn execute_function(
        &self,
        function_name: &str,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError>;
}

pub struct PolicyTool {
    function_name: String,
    registry: Arc<dyn FunctionRegistry>,
}

impl PolicyTool {
    pub fn new(function_name: impl Into<String>, registry: Arc<dyn FunctionRegistry>) -> Self {
        Self {
            function_name: function_name.into(),
            registry,
        }
    }
}

#[async_trait]
impl Tool for PolicyTool {
    fn name(&self) -> &str {
        POLICY_TOOL
    }

    fn description(&self) -> &str {
        "Get business conduct policy information: employee conduct rules, ethics guidance and store policies."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "search_query": {
                    "type": "string",
                    "description": "What to look up in the conduct policy"
                }
            },
            "required": ["search_query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let search_query = required_str(&arguments, "search_query")?;
        if search_query.trim().is_empty() {
            return Err(ToolError::Validation("Search query cannot be empty".into()));
        }
        info!(function = %self.function_name, "Policy lookup called");

        let value = self
            .registry
            .execute_function(
                &self.function_name,
                serde_json::json!({ "search_query": search_query }),
            )
            .await?;
        Ok(ToolResult::json(value))
    }
}

/// [`FunctionRegistry`] over the SQL Statement Execution API.
///
/// Each call runs `SELECT * FROM fn(p => :p, ...)` on a SQL warehouse with
/// the parameters bound, waiting synchronously for the result.
pub struct SqlFunctionRegistry {
    host: String,
    token: String,
    warehouse_id: String,
    client: reqwest::Client,
}

const STATEMENT_WAIT: &str = "30s";

impl SqlFunctionRegistry {
    pub fn new(
        host: &str,
        token: &str,
        warehouse_id: &str,
        timeout: Duration,
    ) -> Result<Self, ToolError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolError::NotConfigured(format!("HTTP client: {e}")))?;
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            token: token.to_string(),
            warehouse_id: warehouse_id.to_string(),
            client,
        })
    }

    /// Build the statement and its parameter bindings.
    fn statement(
        function_name: &str,
        parameters: &serde_json::Value,
    ) -> Result<(String, Vec<serde_json::Value>), ToolError> {
        if !is_qualified_name(function_name) {
            return Err(ToolError::NotConfigured(format!(
                "invalid function name '{function_name}'"
            )));
        }
        let params = parameters.as_object().ok_or_else(|| {
            ToolError::InvalidArguments("function parameters must be an object".into())
        })?;

        let mut named = Vec::with_capacity(params.len());
        let mut bindings = Vec::with_capacity(params.len());
        for (name, value) in params {
            if !is_identifier(name) {
                return Err(ToolError::InvalidArguments(format!(
                    "invalid parameter name '{name}'"
                )));
            }
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            named.push(format!("{name} => :{name}"));
            bindings.push(serde_json::json!({ "name": name, "value": value, "type": "STRING" }));
        }

        Ok((
            format!("SELECT * FROM {function_name}({})", named.join(", ")),
            bindings,
        ))
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_qualified_name(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| is_identifier(p))
}

#[derive(Debug, Deserialize)]
struct StatementResponse {
    #[serde(default)]
    statement_id: Option<String>,
    status: StatementStatus,
    #[serde(default)]
    manifest: Option<Manifest>,
    #[serde(default)]
    result: Option<StatementResult>,
}

#[derive(Debug, Deserialize)]
struct StatementStatus {
    state: String,
    #[serde(default)]
    error: Option<StatementError>,
}

#[derive(Debug, Deserialize)]
struct StatementError {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    schema: ManifestSchema,
}

#[derive(Debug, Deserialize)]
struct ManifestSchema {
    #[serde(default)]
    columns: Vec<Column>,
}

#[derive(Debug, Deserialize)]
struct Column {
    name: String,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    data_array: Vec<Vec<serde_json::Value>>,
}

impl StatementResponse {
    fn into_value(self, function_name: &str) -> Result<serde_json::Value, ToolError> {
        match self.status.state.as_str() {
            "SUCCEEDED" => {
                let columns: Vec<String> = self
                    .manifest
                    .map(|m| m.schema.columns.into_iter().map(|c| c.name).collect())
                    .unwrap_or_default();
                let rows = self.result.map(|r| r.data_array).unwrap_or_default();
                Ok(serde_json::json!({
                    "function": function_name,
                    "columns": columns,
                    "rows": rows,
                }))
            }
            // the wait timeout cancels the statement server-side
            "PENDING" | "RUNNING" | "CANCELED" => Err(ToolError::Timeout {
                tool_name: POLICY_TOOL.into(),
                timeout_secs: 30,
            }),
            state => Err(ToolError::Request {
                tool_name: POLICY_TOOL.into(),
                reason: format!(
                    "statement {} ended {state}: {}",
                    self.statement_id.as_deref().unwrap_or("?"),
                    self.status
                        .error
                        .and_then(|e| e.message)
                        .unwrap_or_else(|| "no error message".into())
                ),
            }),
        }
    }
}

#[async_trait]
impl FunctionRegistry for SqlFunctionRegistry {
    async fn execute_function(
        &self,
        function_name: &str,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let (statement, bindings) = Self::statement(function_name, &parameters)?;
        debug!(%statement, "Executing catalog function");

        let request_error = |reason: String| ToolError::Request {
            tool_name: POLICY_TOOL.into(),
            reason,
        };

        let response = self
            .client
            .post(format!("{}/api/2.0/sql/statements", self.host))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({
                "warehouse_id": self.warehouse_id,
                "statement": statement,
                "parameters": bindings,
                "wait_timeout": STATEMENT_WAIT,
                "on_wait_timeout": "CANCEL",
                "disposition": "INLINE",
                "format": "JSON_ARRAY",
            }))
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Statement API returned error");
            return Err(request_error(format!("HTTP {status}: {body}")));
        }

        let parsed: StatementResponse = response
            .json()
            .await
            .map_err(|e| request_error(format!("unreadable statement response: {e}")))?;
        parsed.into_value(function_name)
    }
}
