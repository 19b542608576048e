//! The Storewise agent graph.
//!
//! A query flows **triage → specialist → tools**:
//!
//! 1. The **triage** agent reads the query and hands off to a specialist
//! 2. The **specialist** (Enterprise or Market Intelligence) calls its data tools
//! 3. For compound questions a specialist calls the *other* specialist as a tool
//! 4. Whichever agent answers with plain text ends the query
//!
//! [`SessionDriver`] wraps the graph with the conversation log, summarization
//! handling and lifecycle events; [`GuardedSession`] adds the busy flag the
//! web surface needs.

pub mod descriptor;
pub mod driver;
pub mod factory;
pub mod prompts;
pub mod runner;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use descriptor::{AgentDescriptor, AgentTool, Generation, Handoff, ToolBinding};
pub use driver::{GuardedSession, QueryReply, SessionDriver, SessionError, is_summarization_request};
pub use factory::AgentSystem;
pub use runner::{RunOptions, RunOutput, Runner};
