//! Web research through a reasoning chat model.
//!
//! The research model (Perplexity `sonar-reasoning-pro` by default) searches
//! the web and answers with its reasoning inline in `<think>` tags. Answers
//! are streamed and concatenated before being handed back to the agent.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use storewise_core::error::{ProviderError, ToolError};
use storewise_core::message::Message;
use storewise_core::provider::{Provider, ProviderRequest};
use storewise_core::tool::{Tool, ToolResult, required_str};
use tracing::info;

pub const RESEARCH_TOOL: &str = "do_research_and_reason";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an artificial intelligence assistant and you need to \
engage in a helpful, detailed, polite conversation with a user.";

const MARKET_ANALYST_PROMPT: &str = "You are a market research analyst. Provide detailed, data-driven \
insights about market trends with recent statistics and analysis.";

const DEMOGRAPHER_PROMPT: &str = "You are a demographic researcher. Provide comprehensive demographic \
analysis with recent census data, population statistics, and trends.";

const COMPETITIVE_ANALYST_PROMPT: &str = "You are a business analyst specializing in competitive intelligence. \
Provide thorough competitive analysis with market insights and strategic recommendations.";

/// Per-call overrides for [`ResearchClient::research_and_reason`].
#[derive(Debug, Clone, Default)]
pub struct ResearchOptions<'a> {
    /// Replaces [`DEFAULT_SYSTEM_PROMPT`].
    pub system_prompt: Option<&'a str>,
    /// Ask for one complete response instead of a stream.
    pub non_streaming: bool,
}

pub struct ResearchClient {
    provider: Arc<dyn Provider>,
    model: String,
    include_date: bool,
    timeout: Duration,
}

/// `today is 5 March 2025 + {query}`
pub fn dated_query(query: &str, today: NaiveDate) -> String {
    format!("today is {} + {query}", today.format("%-d %B %Y"))
}

impl ResearchClient {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            include_date: true,
            timeout: storewise_providers::DEFAULT_TIMEOUT,
        }
    }

    /// The provider's per-request timeout, reported when a call times out.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_include_date(mut self, include_date: bool) -> Self {
        self.include_date = include_date;
        self
    }

    fn to_tool_error(&self, err: ProviderError) -> ToolError {
        match err {
            ProviderError::Timeout(_) => ToolError::Timeout {
                tool_name: RESEARCH_TOOL.into(),
                timeout_secs: self.timeout.as_secs(),
            },
            ProviderError::NotConfigured(reason) => ToolError::NotConfigured(reason),
            other => ToolError::Request {
                tool_name: RESEARCH_TOOL.into(),
                reason: other.to_string(),
            },
        }
    }

    fn user_content(&self, query: &str) -> String {
        if self.include_date {
            dated_query(query, chrono::Local::now().date_naive())
        } else {
            query.to_string()
        }
    }

    /// Ask the research model and return its full answer.
    ///
    /// In streaming mode the text deltas are concatenated in arrival order;
    /// a stream that carries no text yields an empty string.
    pub async fn research_and_reason(
        &self,
        query: &str,
        options: ResearchOptions<'_>,
    ) -> Result<String, ToolError> {
        info!(model = %self.model, "Researching with {}", self.provider.name());

        let messages = vec![
            Message::system(options.system_prompt.unwrap_or(DEFAULT_SYSTEM_PROMPT)),
            Message::user(self.user_content(query)),
        ];
        let mut request = ProviderRequest::new(self.model.clone(), messages);

        if options.non_streaming {
            let response = self.provider.complete(request).await.map_err(|e| self.to_tool_error(e))?;
            return Ok(response.message.content);
        }

        request.stream = true;
        let mut rx = self.provider.stream(request).await.map_err(|e| self.to_tool_error(e))?;
        let mut answer = String::new();
        while let Some(chunk) = rx.recv().await {
            let chunk = chunk.map_err(|e| self.to_tool_error(e))?;
            if let Some(text) = chunk.content {
                answer.push_str(&text);
            }
            if chunk.done {
                break;
            }
        }
        Ok(answer)
    }

    pub async fn research_market_trends(
        &self,
        topic: &str,
        region: Option<&str>,
    ) -> Result<String, ToolError> {
        let mut query = format!("What are the current market trends for {topic}");
        if let Some(region) = region {
            query.push_str(&format!(" in {region}"));
        }
        query.push_str("? Include recent data and analysis.");
        self.research_and_reason(
            &query,
            ResearchOptions {
                system_prompt: Some(MARKET_ANALYST_PROMPT),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn research_demographics(
        &self,
        location: &str,
        aspects: &[&str],
    ) -> Result<String, ToolError> {
        let mut query = format!("What are the key demographic characteristics of {location}");
        if !aspects.is_empty() {
            query.push_str(&format!(", specifically focusing on {}", aspects.join(", ")));
        }
        query.push_str("? Include recent census data and trends.");
        self.research_and_reason(
            &query,
            ResearchOptions {
                system_prompt: Some(DEMOGRAPHER_PROMPT),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn research_competitor_analysis(
        &self,
        company: &str,
        industry: &str,
    ) -> Result<String, ToolError> {
        let query = format!(
            "Provide a competitive analysis for {company} in the {industry} industry. \
             Include market positioning, key competitors, strengths, and challenges."
        );
        self.research_and_reason(
            &query,
            ResearchOptions {
                system_prompt: Some(COMPETITIVE_ANALYST_PROMPT),
                ..Default::default()
            },
        )
        .await
    }
}

pub struct ResearchTool {
    client: Arc<ResearchClient>,
}

impl ResearchTool {
    pub fn new(client: Arc<ResearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ResearchTool {
    fn name(&self) -> &str {
        RESEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Research a question on the web and reason about it. The answer includes the model's \
         thinking process inside <think></think> tags."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "user_query": {
                    "type": "string",
                    "description": "The user's question or request"
                }
            },
            "required": ["user_query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = required_str(&arguments, "user_query")?;
        let answer = self
            .client
            .research_and_reason(query, ResearchOptions::default())
            .await?;
        Ok(ToolResult::ok(answer))
    }
}
