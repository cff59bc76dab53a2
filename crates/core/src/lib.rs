//! Core logic including the agent loop, tool call extraction and dispatch,
//! and the conversation transcript.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
pub mod conversation;
mod error;
mod model_client;
pub mod tool;

pub use agent::{
    Agent, AgentBuilder, AgentEvent, AgentStage, DEFAULT_MAX_TOOL_ROUNDS,
    DEFAULT_SYSTEM_PROMPT, Reply,
};
pub use error::Error;
