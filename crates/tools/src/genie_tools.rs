//! Store performance and product inventory lookups backed by Genie.
//!
//! One tool type, two parameterizations: each instance is bound to a Genie
//! space and forwards the model's natural-language question to it.

use async_trait::async_trait;
use std::sync::Arc;
use storewise_core::error::ToolError;
use storewise_core::tool::{Tool, ToolResult, required_str};
use storewise_genie::{GenieClient, GenieError, GenieOutcome, GenieSpace};
use tracing::{info, warn};

pub const STORE_PERFORMANCE_TOOL: &str = "get_store_performance_info";
pub const PRODUCT_INVENTORY_TOOL: &str = "get_product_inventory_info";

pub struct GenieTool {
    space: GenieSpace,
    space_id: String,
    client: Arc<GenieClient>,
}

impl GenieTool {
    pub fn new(space: GenieSpace, space_id: impl Into<String>, client: Arc<GenieClient>) -> Self {
        Self {
            space,
            space_id: space_id.into(),
            client,
        }
    }

    pub fn store_performance(space_id: impl Into<String>, client: Arc<GenieClient>) -> Self {
        Self::new(GenieSpace::StorePerformance, space_id, client)
    }

    pub fn product_inventory(space_id: impl Into<String>, client: Arc<GenieClient>) -> Self {
        Self::new(GenieSpace::ProductInventory, space_id, client)
    }

    fn to_tool_error(&self, err: GenieError) -> ToolError {
        match err {
            GenieError::Timeout(after) => ToolError::Timeout {
                tool_name: self.name().to_string(),
                timeout_secs: after.as_secs(),
            },
            other => ToolError::Request {
                tool_name: self.name().to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl Tool for GenieTool {
    fn name(&self) -> &str {
        match self.space {
            GenieSpace::StorePerformance => STORE_PERFORMANCE_TOOL,
            GenieSpace::ProductInventory => PRODUCT_INVENTORY_TOOL,
        }
    }

    fn description(&self) -> &str {
        match self.space {
            GenieSpace::StorePerformance => {
                "Get information about store locations, store performance, returns, and BOPIS (buy online, pick up in store)."
            }
            GenieSpace::ProductInventory => {
                "Get information about products and the current inventory snapshot across stores."
            }
        }
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user_query": {
                    "type": "string",
                    "description": "The question to answer, in natural language"
                }
            },
            "required": ["user_query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = required_str(&arguments, "user_query")?;
        info!(tool = self.name(), space = self.space.label(), "Genie tool called");

        match self.client.query_space(&self.space_id, query).await {
            Ok(GenieOutcome::Completed(response)) => Ok(ToolResult::json(response)),
            Ok(outcome @ GenieOutcome::NoAttachments) => {
                warn!(tool = self.name(), "Genie answered without a query result");
                let data = outcome.to_json();
                Ok(ToolResult {
                    output: data.to_string(),
                    data: Some(data),
                    ..ToolResult::failed("")
                })
            }
            Err(e) => Err(self.to_tool_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use storewise_genie::{
        Attachment, GenieApi, GenieMessage, MessageStatus, StartedConversation,
    };

    struct OnePollGenie {
        status: MessageStatus,
        attachments: Vec<&'static str>,
        spaces: Mutex<Vec<String>>,
    }

    impl OnePollGenie {
        fn new(status: MessageStatus, attachments: Vec<&'static str>) -> Self {
            Self {
                status,
                attachments,
                spaces: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenieApi for OnePollGenie {
        async fn start_conversation(
            &self,
            space_id: &str,
            _query: &str,
        ) -> Result<StartedConversation, GenieError> {
            self.spaces.lock().unwrap().push(space_id.to_string());
            Ok(StartedConversation {
                conversation_id: "c".into(),
                message_id: "m".into(),
            })
        }

        async fn get_message(&self, _: &str, _: &str, _: &str) -> Result<GenieMessage, GenieError> {
            Ok(GenieMessage {
                status: self.status.clone(),
                attachments: self
                    .attachments
                    .iter()
                    .map(|a| Attachment {
                        attachment_id: a.to_string(),
                    })
                    .collect(),
            })
        }

        async fn get_query_result(
            &self,
            _: &str,
            _: &str,
            _: &str,
            _: &str,
        ) -> Result<serde_json::Value, GenieError> {
            Ok(serde_json::json!({"result": {"data_array": [["110", "1250.00"]]}}))
        }
    }

    fn client(api: Arc<OnePollGenie>) -> Arc<GenieClient> {
        Arc::new(
            GenieClient::new(api)
                .with_poll_interval(Duration::from_secs(1))
                .with_timeout(Duration::from_secs(3)),
        )
    }

    #[tokio::test]
    async fn completed_query_returns_statement_response() {
        let api = Arc::new(OnePollGenie::new(MessageStatus::Completed, vec!["a1"]));
        let tool = GenieTool::store_performance("space-store", client(api.clone()));

        let result = tool
            .execute(serde_json::json!({"user_query": "sales for store 110"}))
            .await
            .unwrap();

        assert!(result.success);
        assert!(result.output.contains("1250.00"));
        assert_eq!(*api.spaces.lock().unwrap(), vec!["space-store".to_string()]);
    }

    #[tokio::test]
    async fn no_attachments_is_soft_failure() {
        let api = Arc::new(OnePollGenie::new(MessageStatus::Completed, vec![]));
        let tool = GenieTool::product_inventory("space-inv", client(api));

        let result = tool
            .execute(serde_json::json!({"user_query": "stock of SKU 9"}))
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.output, r#"{"error":"No attachments found in message."}"#);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_maps_to_tool_timeout() {
        let api = Arc::new(OnePollGenie::new(MessageStatus::ExecutingQuery, vec![]));
        let tool = GenieTool::store_performance("space-store", client(api));

        let err = tool
            .execute(serde_json::json!({"user_query": "q"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Timeout { timeout_secs: 3, .. }));
    }

    #[tokio::test]
    async fn failed_job_maps_to_request_error() {
        let api = Arc::new(OnePollGenie::new(MessageStatus::Failed, vec![]));
        let tool = GenieTool::store_performance("space-store", client(api));

        let err = tool
            .execute(serde_json::json!({"user_query": "q"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Request { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn names_match_space() {
        let api = Arc::new(OnePollGenie::new(MessageStatus::Completed, vec![]));
        let store = GenieTool::store_performance("s", client(api.clone()));
        let inventory = GenieTool::product_inventory("s", client(api));
        assert_eq!(store.to_definition().name, "get_store_performance_info");
        assert_eq!(inventory.to_definition().name, "get_product_inventory_info");
        assert_eq!(store.parameters_schema()["required"][0], "user_query");
    }
}
