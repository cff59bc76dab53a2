//! An out-of-the-box agent that pairs the GLM model provider with local
//! file and shell tools.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library to bring agent functionality into your own host apps.

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

pub mod config;
#[cfg(feature = "cli")]
pub mod logging;
mod session;
pub mod tools;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`simple_agent_core`] crate.
pub mod core {
    pub use simple_agent_core::*;
}
