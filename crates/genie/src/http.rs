//! [`GenieApi`] over the workspace REST API.

use crate::api::{GenieApi, GenieMessage, StartedConversation};
use crate::error::GenieError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;

pub struct HttpGenieApi {
    host: String,
    token: String,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl HttpGenieApi {
    pub fn new(host: &str, token: &str, timeout: Duration) -> Result<Self, GenieError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenieError::Request(format!("HTTP client: {e}")))?;
        Ok(Self {
            host: host.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
            request_timeout: timeout,
        })
    }

    fn space_url(&self, space_id: &str) -> String {
        format!("{}/api/2.0/genie/spaces/{space_id}", self.host)
    }

    fn message_url(&self, space_id: &str, conversation_id: &str, message_id: &str) -> String {
        format!(
            "{}/conversations/{conversation_id}/messages/{message_id}",
            self.space_url(space_id)
        )
    }

    fn transport_error(&self, e: reqwest::Error) -> GenieError {
        if e.is_timeout() {
            warn!(timeout_secs = self.request_timeout.as_secs(), "Genie request timed out");
            GenieError::Timeout(self.request_timeout)
        } else {
            GenieError::Request(e.to_string())
        }
    }

    async fn read<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GenieError> {
        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Genie API returned error");
            return Err(GenieError::Request(format!("HTTP {status}: {body}")));
        }

        response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                GenieError::MalformedResponse(e.to_string())
            }
        })
    }
}

#[derive(serde::Deserialize)]
struct QueryResultEnvelope {
    statement_response: Option<serde_json::Value>,
}

#[async_trait]
impl GenieApi for HttpGenieApi {
    async fn start_conversation(
        &self,
        space_id: &str,
        query: &str,
    ) -> Result<StartedConversation, GenieError> {
        let url = format!("{}/start-conversation", self.space_url(space_id));
        self.read(
            self.client
                .post(url)
                .bearer_auth(&self.token)
                .json(&serde_json::json!({ "content": query })),
        )
        .await
    }

    async fn get_message(
        &self,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<GenieMessage, GenieError> {
        let url = self.message_url(space_id, conversation_id, message_id);
        self.read(self.client.get(url).bearer_auth(&self.token)).await
    }

    async fn get_query_result(
        &self,
        space_id: &str,
        conversation_id: &str,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<serde_json::Value, GenieError> {
        let url = format!(
            "{}/attachments/{attachment_id}/query-result",
            self.message_url(space_id, conversation_id, message_id)
        );
        let envelope: QueryResultEnvelope =
            self.read(self.client.get(url).bearer_auth(&self.token)).await?;
        envelope.statement_response.ok_or_else(|| {
            GenieError::MalformedResponse("query result has no statement_response".into())
        })
    }
}
