//! An abstraction layer for chat-completion models.
//!
//! This crate establishes the protocol the agent uses to talk to a model
//! provider, so that the agent loop never depends on a concrete HTTP API.
//! A provider receives the whole conversation and answers with exactly one
//! assistant message; any tool call the model wants to make is embedded in
//! the text of that message and is extracted by the agent, not here.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod message;
mod provider;
mod request;

pub use error::*;
pub use message::*;
pub use provider::*;
pub use request::*;
