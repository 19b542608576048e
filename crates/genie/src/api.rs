//! The three Genie REST operations, behind a trait so the poll loop can be
//! driven by a scripted backend in tests.

use crate::error::GenieError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Ids returned when a conversation is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartedConversation {
    pub conversation_id: String,
    pub message_id: String,
}

/// Lifecycle status of a Genie message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Submitted,
    FetchingMetadata,
    FilteringContext,
    AskingAi,
    PendingWarehouse,
    ExecutingQuery,
    Completed,
    Failed,
    Cancelled,
    QueryResultExpired,
    #[serde(other)]
    Unknown,
}

impl MessageStatus {
    /// Statuses after which the message can never complete.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            MessageStatus::Failed | MessageStatus::Cancelled | MessageStatus::QueryResultExpired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Submitted => "SUBMITTED",
            MessageStatus::FetchingMetadata => "FETCHING_METADATA",
            MessageStatus::FilteringContext => "FILTERING_CONTEXT",
            MessageStatus::AskingAi => "ASKING_AI",
            MessageStatus::PendingWarehouse => "PENDING_WAREHOUSE",
            MessageStatus::ExecutingQuery => "EXECUTING_QUERY",
            MessageStatus::Completed => "COMPLETED",
            MessageStatus::Failed => "FAILED",
            MessageStatus::Cancelled => "CANCELLED",
            MessageStatus::QueryResultExpired => "QUERY_RESULT_EXPIRED",
            MessageStatus::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub attachment_id: String,
}

/// One poll of a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenieMessage {
    #[serde(default = "unknown_status")]
    pub status: MessageStatus,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

fn unknown_status() -> MessageStatus {
    MessageStatus::Unknown
}

#[async_trait]
pub trait GenieApi: Send + Sync {
    /// Ask `query` in a fresh conversation in `space_id`.
    async fn start_conversation(
        &self,
        space_id: &str,
        query: &str,
    ) -> Result<StartedConversation, GenieError>;

    async fn get_message(
        &self,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<GenieMessage, GenieError>;

    /// The `statement_response` of an attachment's executed query.
    async fn get_query_result(
        &self,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<serde_json::Value, GenieError>;
}
