//! Runtime configuration read from the environment.

use std::env;
use std::fmt::{self, Debug};
use std::path::PathBuf;
use std::time::Duration;

use simple_agent_core::DEFAULT_MAX_TOOL_ROUNDS;
use simple_agent_zhipu_model::{ZhipuConfig, ZhipuConfigBuilder};
use thiserror::Error;

use crate::tools::DEFAULT_SHELL_TIMEOUT;

const API_KEY_VAR: &str = "ZHIPU_API_KEY";
const BASE_URL_VAR: &str = "ZHIPU_BASE_URL";
const MODEL_VAR: &str = "ZHIPU_MODEL";
const MAX_TOOL_ROUNDS_VAR: &str = "SIMPLE_AGENT_MAX_TOOL_ROUNDS";
const SHELL_TIMEOUT_VAR: &str = "SIMPLE_AGENT_SHELL_TIMEOUT_SECS";
const LOG_FILE_VAR: &str = "SIMPLE_AGENT_LOG_FILE";

const DEFAULT_LOG_FILE: &str = "simple-agent.log";

/// Errors from reading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} environment variable is not set")]
    Missing(&'static str),
    /// A numeric variable does not hold a positive integer.
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber {
        /// The variable name.
        name: &'static str,
        /// The offending value.
        value: String,
    },
}

/// Settings of a CLI session.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// The bearer token for the model API.
    pub api_key: String,
    /// A custom API base URL.
    pub base_url: Option<String>,
    /// A custom model identifier.
    pub model: Option<String>,
    /// The tool round budget of a user turn.
    pub max_tool_rounds: usize,
    /// How long a shell command may run.
    pub shell_timeout: Duration,
    /// Where the JSON log is appended.
    pub log_file: PathBuf,
}

impl Config {
    /// Reads the configuration from the process environment.
    #[inline]
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let max_tool_rounds = match get(MAX_TOOL_ROUNDS_VAR) {
            Some(value) => parse_number(MAX_TOOL_ROUNDS_VAR, value)?,
            None => DEFAULT_MAX_TOOL_ROUNDS,
        };
        let shell_timeout = match get(SHELL_TIMEOUT_VAR) {
            Some(value) => {
                Duration::from_secs(parse_number(SHELL_TIMEOUT_VAR, value)?)
            }
            None => DEFAULT_SHELL_TIMEOUT,
        };

        Ok(Self {
            api_key,
            base_url: get(BASE_URL_VAR),
            model: get(MODEL_VAR),
            max_tool_rounds,
            shell_timeout,
            log_file: get(LOG_FILE_VAR)
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_owned())
                .into(),
        })
    }

    /// Builds the model provider configuration.
    pub fn zhipu_config(&self) -> ZhipuConfig {
        let mut builder = ZhipuConfigBuilder::with_api_key(&self.api_key);
        if let Some(base_url) = &self.base_url {
            builder = builder.with_base_url(base_url);
        }
        if let Some(model) = &self.model {
            builder = builder.with_model(model);
        }
        builder.build()
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<deducted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .field("shell_timeout", &self.shell_timeout)
            .field("log_file", &self.log_file)
            .finish()
    }
}

fn parse_number<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialEq,
{
    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(number) if number != T::default() => Ok(number),
        _ => Err(ConfigError::InvalidNumber { name, value }),
    }
}
