//! The per-query entry point used by every chat surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use storewise_config::AppConfig;
use storewise_core::agent::{AgentDisplay, AgentRole};
use storewise_core::error::Error;
use storewise_core::event::{EventBus, SessionEvent};
use storewise_core::provider::Provider;
use storewise_core::session::{ConversationEntry, SessionDebugView, SharedSessionState};
use storewise_tools::Toolkit;
use tracing::{info, warn};

use crate::factory::AgentSystem;
use crate::runner::{RunOptions, Runner};

/// Role recorded for user turns in the conversation log.
pub const USER_ROLE: &str = "User";

const SUMMARY_PHRASES: [&str; 4] = [
    "summarize",
    "summary",
    "what have we discussed",
    "our conversation",
];

/// Case-insensitive match against the recap phrases.
pub fn is_summarization_request(text: &str) -> bool {
    let lower = text.to_lowercase();
    SUMMARY_PHRASES.iter().any(|p| lower.contains(p))
}

pub fn summarization_input(text: &str, history: &str) -> String {
    format!("{text}\n\nHere is the conversation history to summarize:\n{history}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryReply {
    pub final_text: String,
    /// Display name of the agent that answered, or "Assistant".
    pub agent_label: String,
    pub agent: Option<AgentRole>,
    pub summarization: bool,
}

/// Runs queries through the agent graph and keeps the conversation log.
///
/// Cheap to clone; clones share the agent graph, the provider and the event
/// bus. Each clone carries its own session id for event tagging.
#[derive(Clone)]
pub struct SessionDriver {
    system: Arc<AgentSystem>,
    runner: Arc<Runner>,
    session_id: String,
}

impl SessionDriver {
    pub fn new(system: AgentSystem, runner: Runner) -> Self {
        Self {
            system: Arc::new(system),
            runner: Arc::new(runner),
            session_id: "default".into(),
        }
    }

    /// Wire the production graph: the configured agent model and the
    /// HTTP-backed toolkit.
    pub fn from_config(config: &AppConfig, events: EventBus) -> storewise_core::Result<Self> {
        let provider = storewise_providers::agent_provider(config)?;
        let model = config.require_model()?;
        Ok(Self::with_provider(config, model, Arc::new(provider), events))
    }

    /// Like [`Self::from_config`] with a caller-supplied provider.
    pub fn with_provider(
        config: &AppConfig,
        model: &str,
        provider: Arc<dyn Provider>,
        events: EventBus,
    ) -> Self {
        let toolkit = Toolkit::from_config(config);
        let runner = Runner::new(provider, events)
            .with_max_turns(config.agents.max_turns)
            .with_temperature(config.agents.temperature)
            .with_max_tokens(config.agents.max_tokens);
        Self::new(AgentSystem::build(model, &toolkit), runner)
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn events(&self) -> &EventBus {
        self.runner.events()
    }

    pub fn system(&self) -> &AgentSystem {
        &self.system
    }

    fn publish(&self, event: SessionEvent) {
        self.runner.events().publish(event);
    }

    /// Process one user query against `state`.
    ///
    /// The user turn is logged first. On success the reply is logged under
    /// the answering agent's display name; on failure nothing else is logged
    /// and the session stays usable.
    pub async fn process_query(
        &self,
        text: &str,
        state: &mut SharedSessionState,
    ) -> storewise_core::Result<QueryReply> {
        if text.trim().is_empty() {
            return Err(Error::Validation("query cannot be empty".into()));
        }
        info!(session_id = %self.session_id, "Processing query");
        self.publish(SessionEvent::QueryStarted {
            session_id: self.session_id.clone(),
            query: text.to_string(),
            timestamp: chrono::Utc::now(),
        });

        state.add_message(USER_ROLE, text);

        let summarization = is_summarization_request(text);
        let (input, options) = if summarization {
            info!(session_id = %self.session_id, "Summarization request detected");
            self.publish(SessionEvent::SummarizationDetected {
                session_id: self.session_id.clone(),
            });
            (
                summarization_input(text, &state.formatted_history()),
                RunOptions {
                    allow_handoffs: false,
                },
            )
        } else {
            (text.to_string(), RunOptions::default())
        };

        let output = match self
            .runner
            .run(&self.system.triage, &input, state, &self.session_id, options)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                warn!(session_id = %self.session_id, error = %e, "Query failed");
                self.publish(SessionEvent::QueryFailed {
                    session_id: self.session_id.clone(),
                    error: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                return Err(e);
            }
        };

        let agent = state.current_agent();
        let label = AgentDisplay::for_agent(agent).name;
        state.add_message(label, output.final_text.clone());

        info!(session_id = %self.session_id, agent = label, "Query completed");
        self.publish(SessionEvent::QueryCompleted {
            session_id: self.session_id.clone(),
            agent_label: label.to_string(),
            timestamp: chrono::Utc::now(),
        });

        Ok(QueryReply {
            final_text: output.final_text,
            agent_label: label.to_string(),
            agent,
            summarization,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Already processing a query, please wait...")]
    Busy,

    #[error(transparent)]
    Query(#[from] Error),
}

/// Clears the busy flag when a submission finishes, however it finishes.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A session for surfaces that can submit while a query is in flight.
///
/// A second submission during a query is rejected, not queued.
pub struct GuardedSession {
    driver: SessionDriver,
    state: tokio::sync::Mutex<SharedSessionState>,
    busy: AtomicBool,
}

impl GuardedSession {
    pub fn new(driver: SessionDriver) -> Self {
        Self {
            driver,
            state: tokio::sync::Mutex::new(SharedSessionState::new()),
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn driver(&self) -> &SessionDriver {
        &self.driver
    }

    pub async fn submit(&self, text: &str) -> Result<QueryReply, SessionError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(session_id = %self.driver.session_id(), "Rejected query while busy");
            return Err(SessionError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let mut state = self.state.lock().await;
        Ok(self.driver.process_query(text, &mut state).await?)
    }

    pub async fn clear(&self) {
        self.state.lock().await.clear();
    }

    pub async fn debug_view(&self) -> SessionDebugView {
        self.state.lock().await.debug_view()
    }

    pub async fn history(&self) -> Vec<ConversationEntry> {
        self.state.lock().await.entries().to_vec()
    }
}
