//! Mock provider and state builders for gateway tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use tokio::sync::Notify;

use storewise_agent::SessionDriver;
use storewise_config::AppConfig;
use storewise_core::error::ProviderError;
use storewise_core::message::{Message, MessageToolCall};
use storewise_core::provider::{Provider, ProviderRequest, ProviderResponse};

use crate::{GatewayState, SharedState};

/// Plays scripted responses in order, then repeats a fallback reply.
///
/// A gated provider parks every call until [`MockProvider::release`] is
/// notified, announcing itself on [`MockProvider::entered`] first.
pub struct MockProvider {
    script: Mutex<VecDeque<ProviderResponse>>,
    fallback: String,
    gated: bool,
    pub entered: Notify,
    pub release: Notify,
}

impl MockProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::scripted(vec![], text)
    }

    pub fn scripted(script: Vec<ProviderResponse>, fallback: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback: fallback.to_string(),
            gated: false,
            entered: Notify::new(),
            release: Notify::new(),
        })
    }

    pub fn gated(text: &str) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(VecDeque::new()),
            fallback: text.to_string(),
            gated: true,
            entered: Notify::new(),
            release: Notify::new(),
        })
    }
}

pub fn response(message: Message) -> ProviderResponse {
    ProviderResponse {
        message,
        usage: None,
        model: "mock-model".into(),
    }
}

pub fn tool_call(name: &str) -> ProviderResponse {
    let mut message = Message::assistant("");
    message.tool_calls = vec![MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: r#"{"user_query":"store 110"}"#.into(),
    }];
    response(message)
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        let next = self.script.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| response(Message::assistant(self.fallback.clone()))))
    }
}

pub fn test_state(provider: Arc<MockProvider>) -> SharedState {
    let driver = SessionDriver::with_provider(
        &AppConfig::default(),
        "mock-model",
        provider,
        Default::default(),
    );
    Arc::new(GatewayState::new(driver))
}
