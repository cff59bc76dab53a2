//! The built-in tools that models can use.

mod file;
mod shell;

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use simple_agent_core::tool::{
    Error as ToolError, ToolDefinition, ToolExecutor, ToolInvocation,
    ToolResult,
};
use tokio_util::sync::CancellationToken;

pub use file::{FileOperations, MAX_READ_BYTES};
pub use shell::{DEFAULT_SHELL_TIMEOUT, DENYLIST, ShellCommand};

/// Executes tool invocations on the local machine.
#[derive(Clone, Debug)]
pub struct LocalToolExecutor {
    files: FileOperations,
    shell: ShellCommand,
}

impl LocalToolExecutor {
    /// Creates an executor whose file operations are confined to `root`.
    ///
    /// Cancelling `cancel` kills any running shell command.
    pub fn new<P: Into<PathBuf>>(root: P, cancel: CancellationToken) -> Self {
        Self {
            files: FileOperations::new(root),
            shell: ShellCommand::new(cancel),
        }
    }

    /// Sets how long a shell command may run.
    #[inline]
    pub fn with_shell_timeout(mut self, timeout: Duration) -> Self {
        self.shell = self.shell.with_timeout(timeout);
        self
    }

    /// Describes every operation this executor supports.
    pub fn definitions() -> Vec<ToolDefinition> {
        let mut definitions = FileOperations::definitions();
        definitions.extend(ShellCommand::definitions());
        definitions
    }
}

#[async_trait]
impl ToolExecutor for LocalToolExecutor {
    async fn file_operation(&self, invocation: &ToolInvocation) -> ToolResult {
        self.files.execute(invocation).await.into()
    }

    async fn shell_command(&self, invocation: &ToolInvocation) -> ToolResult {
        self.shell.execute(invocation).await
    }
}

/// Decodes the arguments of `invocation` into the parameter type of the
/// operation.
fn parse_args<T: DeserializeOwned>(
    invocation: &ToolInvocation,
) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(invocation.args.clone())).map_err(
        |err| {
            ToolError::invalid_input().with_reason(format!(
                "invalid arguments for {invocation}: {err}"
            ))
        },
    )
}
