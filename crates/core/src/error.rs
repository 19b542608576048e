//! Error types for the Storewise domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; [`Error`] aggregates them
//! for the session driver, which is the single catch-all per query.

use thiserror::Error;

/// The top-level error type for all Storewise operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Agent runtime errors ---
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    // --- Caller precondition ---
    #[error("Validation error: {0}")]
    Validation(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the failure was a deadline on a long-running backend call.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Tool(ToolError::Timeout { .. }) | Error::Provider(ProviderError::Timeout(_))
        )
    }

    /// Message suitable for showing to an end user in a chat surface.
    pub fn user_message(&self) -> String {
        if self.is_timeout() {
            return "The analytics query took too long to finish. Please try again.".into();
        }
        match self {
            Error::Config { message } | Error::Tool(ToolError::NotConfigured(message)) => {
                format!("The assistant is not fully configured: {message}")
            }
            Error::Validation(msg) => format!("Invalid request: {msg}"),
            other => format!("Error processing query: {other}"),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Request to {tool_name} backend failed: {reason}")]
    Request { tool_name: String, reason: String },

    #[error("Tool not configured: {0}")]
    NotConfigured(String),
}

impl ToolError {
    /// Errors the model can recover from by re-phrasing its call.
    ///
    /// These are reported back to the model as a tool message; everything
    /// else aborts the run and surfaces to the session driver.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ToolError::NotFound(_) | ToolError::InvalidArguments(_) | ToolError::Validation(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Max turns ({max_turns}) exceeded by {agent}")]
    MaxTurnsExceeded { agent: String, max_turns: u32 },

    #[error("Handoff target not found: {0}")]
    UnknownHandoff(String),

    #[error("Nested agent call failed in {tool_name}: {reason}")]
    NestedRunFailed { tool_name: String, reason: String },
}
