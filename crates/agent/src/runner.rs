//! The agent turn runner.
//!
//! Drives one agent through **LLM call → tool calls → loop** until it answers
//! with text only. Two kinds of tool call get special treatment:
//!
//! - **Handoffs** switch the active descriptor in place: the system prompt is
//!   replaced, the transcript is kept, and control never returns to the
//!   agent that handed off.
//! - **Agent tools** run another agent to completion on a fresh transcript
//!   and feed its final text back as the tool output.
//!
//! Tool calls are awaited one at a time, in the order the model issued them.

use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Instant;
use storewise_core::agent::AgentRole;
use storewise_core::error::{AgentError, Error, ToolError};
use storewise_core::event::{EventBus, SessionEvent};
use storewise_core::message::{Message, MessageToolCall};
use storewise_core::provider::{Provider, ProviderRequest};
use storewise_core::session::SharedSessionState;
use storewise_core::tool::{ToolResult, required_str};
use tracing::{debug, info, warn};

use crate::descriptor::{AgentDescriptor, AgentTool, ToolBinding};

pub const DEFAULT_MAX_TURNS: u32 = 10;

/// Tool message for calls issued after a handoff in the same response.
const HANDOFF_SKIPPED: &str = "Skipped: control was transferred to another agent.";

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Offer and honor the entry agent's handoffs.
    pub allow_handoffs: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            allow_handoffs: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub final_text: String,
    /// The agent that produced `final_text`.
    pub last_agent: AgentRole,
}

#[derive(Clone, Copy)]
struct RunScope<'a> {
    session_id: &'a str,
    nested: bool,
    allow_handoffs: bool,
}

pub struct Runner {
    provider: Arc<dyn Provider>,
    events: EventBus,
    max_turns: u32,
    temperature: f32,
    max_tokens: Option<u32>,
}

fn parse_arguments(raw: &str) -> Result<serde_json::Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(raw)
        .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {e}")))
}

impl Runner {
    pub fn new(provider: Arc<dyn Provider>, events: EventBus) -> Self {
        Self {
            provider,
            events,
            max_turns: DEFAULT_MAX_TURNS,
            temperature: 0.7,
            max_tokens: None,
        }
    }

    /// Model calls allowed per agent run. Nested runs get their own budget.
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Run `entry` on `input` until some agent produces final text.
    pub async fn run(
        &self,
        entry: &Arc<AgentDescriptor>,
        input: &str,
        state: &mut SharedSessionState,
        session_id: &str,
        options: RunOptions,
    ) -> Result<RunOutput, Error> {
        let scope = RunScope {
            session_id,
            nested: false,
            allow_handoffs: options.allow_handoffs,
        };
        self.run_agent(entry.clone(), input.to_string(), state, scope)
            .await
    }

    fn agent_started(
        &self,
        agent: &AgentDescriptor,
        state: &mut SharedSessionState,
        scope: RunScope<'_>,
    ) {
        // nested agents work on behalf of the top-level one
        if !scope.nested {
            state.set_current_agent(agent.role);
        }
        self.events.publish(SessionEvent::AgentStarted {
            session_id: scope.session_id.to_string(),
            agent: agent.role,
            nested: scope.nested,
        });
    }

    fn agent_ended(&self, agent: &AgentDescriptor, started: Instant, scope: RunScope<'_>) {
        self.events.publish(SessionEvent::AgentEnded {
            session_id: scope.session_id.to_string(),
            agent: agent.role,
            duration_ms: started.elapsed().as_millis() as u64,
        });
    }

    fn run_agent<'a>(
        &'a self,
        entry: Arc<AgentDescriptor>,
        input: String,
        state: &'a mut SharedSessionState,
        scope: RunScope<'a>,
    ) -> BoxFuture<'a, Result<RunOutput, Error>> {
        Box::pin(async move {
            let mut agent = entry;
            self.agent_started(&agent, state, scope);
            let mut started = Instant::now();
            let mut messages = vec![
                Message::system(agent.instructions.clone()),
                Message::user(input),
            ];

            for turn in 1..=self.max_turns {
                debug!(agent = %agent.name, turn, nested = scope.nested, "Agent turn");

                let request = ProviderRequest {
                    model: agent.model.clone(),
                    messages: messages.clone(),
                    temperature: self.temperature,
                    max_tokens: self.max_tokens,
                    tools: agent.tool_definitions(scope.allow_handoffs),
                    stream: false,
                };
                let response = self.provider.complete(request).await?;

                if response.message.tool_calls.is_empty() {
                    self.agent_ended(&agent, started, scope);
                    return Ok(RunOutput {
                        final_text: response.message.content,
                        last_agent: agent.role,
                    });
                }

                let tool_calls = response.message.tool_calls.clone();
                messages.push(response.message);

                let mut next: Option<Arc<AgentDescriptor>> = None;
                for call in &tool_calls {
                    if next.is_some() {
                        messages.push(Message::tool_result(&call.id, HANDOFF_SKIPPED));
                        continue;
                    }

                    if let Some(handoff) = agent.handoff(&call.name) {
                        if scope.allow_handoffs {
                            let ack = serde_json::json!({ "assistant": handoff.agent.name });
                            messages.push(Message::tool_result(&call.id, ack.to_string()));
                            next = Some(handoff.agent.clone());
                        } else {
                            let refused = AgentError::UnknownHandoff(call.name.clone());
                            warn!(agent = %agent.name, error = %refused, "Handoff refused");
                            messages.push(Message::tool_result(&call.id, format!("Error: {refused}")));
                        }
                        continue;
                    }

                    let output = self.call_tool(&agent, call, state, scope).await?;
                    messages.push(Message::tool_result(&call.id, output));
                }

                if let Some(target) = next {
                    info!(from = %agent.name, to = %target.name, "Handoff");
                    self.agent_ended(&agent, started, scope);
                    self.events.publish(SessionEvent::Handoff {
                        session_id: scope.session_id.to_string(),
                        from: agent.role,
                        to: target.role,
                    });
                    messages[0] = Message::system(target.instructions.clone());
                    agent = target;
                    self.agent_started(&agent, state, scope);
                    started = Instant::now();
                }
            }

            warn!(agent = %agent.name, max_turns = self.max_turns, "Max turns reached");
            Err(AgentError::MaxTurnsExceeded {
                agent: agent.name.clone(),
                max_turns: self.max_turns,
            }
            .into())
        })
    }

    /// Execute one tool call and render its outcome as a tool message.
    ///
    /// Recoverable errors become the message text so the model can retry;
    /// everything else aborts the run.
    async fn call_tool(
        &self,
        agent: &AgentDescriptor,
        call: &MessageToolCall,
        state: &mut SharedSessionState,
        scope: RunScope<'_>,
    ) -> Result<String, Error> {
        state.set_current_tool(call.name.clone());
        self.events.publish(SessionEvent::ToolStarted {
            session_id: scope.session_id.to_string(),
            tool: call.name.clone(),
        });
        let started = Instant::now();

        let result: Result<ToolResult, Error> = match agent.tool(&call.name) {
            None => Err(ToolError::NotFound(call.name.clone()).into()),
            Some(binding) => match parse_arguments(&call.arguments) {
                Err(e) => Err(e.into()),
                Ok(arguments) => match binding {
                    ToolBinding::Function(tool) => tool.execute(arguments).await.map_err(Error::from),
                    ToolBinding::Agent(agent_tool) => self
                        .call_agent(agent_tool, &arguments, state, scope)
                        .await
                        .map(ToolResult::ok),
                },
            },
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        let ended = |success: bool| SessionEvent::ToolEnded {
            session_id: scope.session_id.to_string(),
            tool: call.name.clone(),
            success,
            duration_ms,
        };

        match result {
            Ok(tool_result) => {
                debug!(tool = %call.name, success = tool_result.success, duration_ms, "Tool finished");
                self.events.publish(ended(tool_result.success));
                Ok(tool_result.output)
            }
            Err(Error::Tool(e)) if e.is_recoverable() => {
                warn!(tool = %call.name, error = %e, "Tool call rejected, reporting to model");
                self.events.publish(ended(false));
                Ok(format!("Error: {e}"))
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                self.events.publish(ended(false));
                Err(e)
            }
        }
    }

    async fn call_agent(
        &self,
        agent_tool: &AgentTool,
        arguments: &serde_json::Value,
        state: &mut SharedSessionState,
        scope: RunScope<'_>,
    ) -> Result<String, Error> {
        let input = required_str(arguments, "input")?;
        info!(tool = %agent_tool.tool_name, agent = %agent_tool.agent.name, "Calling agent as tool");

        let nested = RunScope {
            nested: true,
            allow_handoffs: false,
            ..scope
        };
        match self
            .run_agent(agent_tool.agent.clone(), input.to_string(), state, nested)
            .await
        {
            Ok(output) => Ok(output.final_text),
            Err(Error::Agent(e)) => Err(AgentError::NestedRunFailed {
                tool_name: agent_tool.tool_name.clone(),
                reason: e.to_string(),
            }
            .into()),
            Err(e) => Err(e),
        }
    }
}
