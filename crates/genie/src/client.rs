//! Submit-then-poll query client.

use crate::api::{GenieApi, MessageStatus};
use crate::error::GenieError;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Rendered in place of a result when a completed message carries nothing.
pub const NO_ATTACHMENTS_MESSAGE: &str = "No attachments found in message.";

/// Result of a query that reached `COMPLETED`.
#[derive(Debug, Clone, PartialEq)]
pub enum GenieOutcome {
    /// The `statement_response` of the first attachment.
    Completed(serde_json::Value),
    /// The message completed without any attachment (e.g. a clarifying
    /// question from Genie). Not an error.
    NoAttachments,
}

impl GenieOutcome {
    /// JSON handed back to the model.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            GenieOutcome::Completed(v) => v.clone(),
            GenieOutcome::NoAttachments => json!({ "error": NO_ATTACHMENTS_MESSAGE }),
        }
    }
}

/// The two analytics spaces the enterprise agent can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenieSpace {
    StorePerformance,
    ProductInventory,
}

impl GenieSpace {
    pub fn label(self) -> &'static str {
        match self {
            GenieSpace::StorePerformance => "store performance",
            GenieSpace::ProductInventory => "product inventory",
        }
    }
}

pub struct GenieClient {
    api: Arc<dyn GenieApi>,
    poll_interval: Duration,
    timeout: Duration,
}

impl GenieClient {
    pub fn new(api: Arc<dyn GenieApi>) -> Self {
        Self {
            api,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask `query` in `space_id` and wait for the answer.
    ///
    /// Polls immediately after submitting, then once per poll interval. The
    /// deadline is checked after each non-terminal poll, so the last poll
    /// can land up to one interval past the timeout. Every backend call is
    /// cut off at the deadline, or one poll interval after it starts if it
    /// starts later than that. Dropping the returned future stops polling
    /// but does not cancel the job server-side.
    pub async fn query_space(
        &self,
        space_id: &str,
        query: &str,
    ) -> Result<GenieOutcome, GenieError> {
        info!(space_id, query, "Querying Genie space");
        let deadline = Instant::now() + self.timeout;

        let started = self
            .bounded(deadline, self.api.start_conversation(space_id, query))
            .await?;
        let conversation_id = started.conversation_id.as_str();
        let message_id = started.message_id.as_str();

        loop {
            let message = self
                .bounded(deadline, self.api.get_message(space_id, conversation_id, message_id))
                .await?;
            debug!(space_id, message_id, status = message.status.as_str(), "Polled Genie message");

            if message.status == MessageStatus::Completed {
                let Some(first) = message.attachments.first() else {
                    return Ok(GenieOutcome::NoAttachments);
                };
                let result = self
                    .bounded(
                        deadline,
                        self.api.get_query_result(
                            space_id,
                            conversation_id,
                            message_id,
                            &first.attachment_id,
                        ),
                    )
                    .await?;
                return Ok(GenieOutcome::Completed(result));
            }

            if message.status.is_failure() {
                return Err(GenieError::JobFailed {
                    status: message.status.as_str().to_string(),
                });
            }

            if Instant::now() > deadline {
                return Err(GenieError::Timeout(self.timeout));
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn bounded<T>(
        &self,
        deadline: Instant,
        call: impl Future<Output = Result<T, GenieError>>,
    ) -> Result<T, GenieError> {
        let cutoff = deadline.max(Instant::now() + self.poll_interval);
        match tokio::time::timeout_at(cutoff, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Genie call outlived the query deadline");
                Err(GenieError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Attachment, GenieMessage, StartedConversation};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend that replays a fixed list of poll results, repeating the last.
    struct ScriptedGenie {
        polls: Vec<GenieMessage>,
        poll_count: Mutex<usize>,
        fetched: Mutex<Vec<String>>,
        fail_start: bool,
    }

    impl ScriptedGenie {
        fn new(polls: Vec<GenieMessage>) -> Self {
            Self {
                polls,
                poll_count: Mutex::new(0),
                fetched: Mutex::new(Vec::new()),
                fail_start: false,
            }
        }

        fn polls(&self) -> usize {
            *self.poll_count.lock().unwrap()
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    fn message(status: MessageStatus, attachments: &[&str]) -> GenieMessage {
        GenieMessage {
            status,
            attachments: attachments
                .iter()
                .map(|id| Attachment {
                    attachment_id: id.to_string(),
                })
                .collect(),
        }
    }

    #[async_trait]
    impl GenieApi for ScriptedGenie {
        async fn start_conversation(
            &self,
            _space_id: &str,
            _query: &str,
        ) -> Result<StartedConversation, GenieError> {
            if self.fail_start {
                return Err(GenieError::Request("HTTP 403 Forbidden".into()));
            }
            Ok(StartedConversation {
                conversation_id: "conv-1".into(),
                message_id: "msg-1".into(),
            })
        }

        async fn get_message(
            &self,
            _space_id: &str,
            _conversation_id: &str,
            _message_id: &str,
        ) -> Result<GenieMessage, GenieError> {
            let mut count = self.poll_count.lock().unwrap();
            let idx = (*count).min(self.polls.len() - 1);
            *count += 1;
            Ok(self.polls[idx].clone())
        }

        async fn get_query_result(
            &self,
            _space_id: &str,
            _conversation_id: &str,
            _message_id: &str,
            attachment_id: &str,
        ) -> Result<serde_json::Value, GenieError> {
            self.fetched.lock().unwrap().push(attachment_id.to_string());
            Ok(json!({ "attachment": attachment_id, "rows": [["110", "42"]] }))
        }
    }

    fn client(api: Arc<ScriptedGenie>) -> GenieClient {
        GenieClient::new(api)
            .with_poll_interval(Duration::from_secs(2))
            .with_timeout(Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn completes_after_n_polls() {
        let api = Arc::new(ScriptedGenie::new(vec![
            message(MessageStatus::Submitted, &[]),
            message(MessageStatus::ExecutingQuery, &[]),
            message(MessageStatus::Completed, &["att-1"]),
        ]));
        let started = Instant::now();

        let outcome = client(api.clone()).query_space("space", "store 110").await.unwrap();

        assert_eq!(api.polls(), 3);
        assert_eq!(started.elapsed().as_secs(), 4);
        match outcome {
            GenieOutcome::Completed(v) => assert_eq!(v["attachment"], "att-1"),
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_first_attachment_is_fetched() {
        let api = Arc::new(ScriptedGenie::new(vec![message(
            MessageStatus::Completed,
            &["first", "second", "third"],
        )]));

        client(api.clone()).query_space("space", "q").await.unwrap();

        assert_eq!(api.fetched(), vec!["first".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_without_attachments_is_soft_failure() {
        let api = Arc::new(ScriptedGenie::new(vec![message(MessageStatus::Completed, &[])]));

        let outcome = client(api.clone()).query_space("space", "q").await.unwrap();

        assert_eq!(outcome, GenieOutcome::NoAttachments);
        assert_eq!(
            outcome.to_json(),
            json!({"error": "No attachments found in message."})
        );
        assert!(api.fetched().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_after_deadline() {
        let api = Arc::new(ScriptedGenie::new(vec![message(
            MessageStatus::ExecutingQuery,
            &[],
        )]));

        let err = client(api.clone()).query_space("space", "q").await.unwrap_err();

        assert!(err.is_timeout());
        // polls at t=0,2,4,6; 6 > 5 ends the loop
        assert_eq!(api.polls(), 4);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(api.polls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_stops_polling() {
        let api = Arc::new(ScriptedGenie::new(vec![
            message(MessageStatus::ExecutingQuery, &[]),
            message(MessageStatus::Failed, &[]),
        ]));

        let err = client(api.clone()).query_space("space", "q").await.unwrap_err();

        assert!(matches!(err, GenieError::JobFailed { ref status } if status == "FAILED"));
        assert_eq!(api.polls(), 2);
    }

    #[tokio::test]
    async fn start_failure_is_not_retried() {
        let mut api = ScriptedGenie::new(vec![message(MessageStatus::Completed, &[])]);
        api.fail_start = true;
        let api = Arc::new(api);

        let err = client(api.clone()).query_space("space", "q").await.unwrap_err();

        assert!(matches!(err, GenieError::Request(_)));
        assert_eq!(api.polls(), 0);
    }

    #[test]
    fn defaults() {
        let api = Arc::new(ScriptedGenie::new(vec![message(MessageStatus::Completed, &[])]));
        let client = GenieClient::new(api);
        assert_eq!(client.poll_interval, Duration::from_secs(2));
        assert_eq!(client.timeout(), Duration::from_secs(60));
    }

    /// Backend that accepts the query and then never answers a poll.
    struct HangingGenie;

    #[async_trait]
    impl GenieApi for HangingGenie {
        async fn start_conversation(
            &self,
            _space_id: &str,
            _query: &str,
        ) -> Result<StartedConversation, GenieError> {
            Ok(StartedConversation {
                conversation_id: "conv-1".into(),
                message_id: "msg-1".into(),
            })
        }

        async fn get_message(
            &self,
            _space_id: &str,
            _conversation_id: &str,
            _message_id: &str,
        ) -> Result<GenieMessage, GenieError> {
            std::future::pending().await
        }

        async fn get_query_result(
            &self,
            _space_id: &str,
            _conversation_id: &str,
            _message_id: &str,
            _attachment_id: &str,
        ) -> Result<serde_json::Value, GenieError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_poll_ends_at_the_deadline() {
        let client = GenieClient::new(Arc::new(HangingGenie))
            .with_poll_interval(Duration::from_secs(2))
            .with_timeout(Duration::from_secs(5));
        let started = Instant::now();

        let err = client.query_space("space", "q").await.unwrap_err();

        assert!(err.is_timeout());
        assert!(matches!(err, GenieError::Timeout(d) if d == Duration::from_secs(5)));
        assert_eq!(started.elapsed().as_secs(), 5);
    }
}
