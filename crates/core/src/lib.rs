//! # Storewise Core
//!
//! Domain types, traits, and error definitions for the Storewise multi-agent
//! assistant. This crate has **no framework dependencies**; it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here (`Provider`, `Tool`).
//! Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod agent;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentDisplay, AgentRole};
pub use error::{Error, Result};
pub use event::{EventBus, SessionEvent};
pub use message::{Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, ToolDefinition};
pub use session::{ConversationEntry, SessionDebugView, SharedSessionState};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry};
