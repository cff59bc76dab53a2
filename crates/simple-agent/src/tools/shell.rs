use std::process::Stdio;
use std::time::Duration;

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use simple_agent_core::tool::{
    Error as ToolError, ToolDefinition, ToolInvocation, ToolKind, ToolResult,
};
use tokio::process::Command;
use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use super::parse_args;

/// How long a command may run unless configured otherwise.
pub const DEFAULT_SHELL_TIMEOUT: Duration = Duration::from_secs(30);

/// Substrings that block a command, matched against its lower-cased text.
///
/// This is a textual heuristic that catches careless commands. It is not a
/// security boundary.
pub const DENYLIST: [&str; 6] =
    ["rm -rf", "sudo", "su", "chmod 777", "dd if=", "> /dev/"];

#[derive(Deserialize, JsonSchema)]
struct ExecuteParameters {
    #[schemars(description = "The command line to run with `sh -c`.")]
    command: String,
}

/// Runs commands through the system shell.
#[derive(Clone, Debug)]
pub struct ShellCommand {
    timeout: Duration,
    cancel: CancellationToken,
}

impl ShellCommand {
    /// Creates a shell tool that stops running commands once `cancel` is
    /// cancelled.
    #[inline]
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            timeout: DEFAULT_SHELL_TIMEOUT,
            cancel,
        }
    }

    /// Sets how long a command may run before it is killed.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Describes the supported operations.
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            kind: ToolKind::ShellCommand,
            name: "execute".to_owned(),
            description: "Runs a command line and returns its combined stdout \
                          and stderr. Commands are killed after a timeout."
                .to_owned(),
            parameters: schema_for!(ExecuteParameters).to_value(),
        }]
    }

    /// Performs the operation named by `invocation`.
    ///
    /// A command that exits unsuccessfully yields both its output and an
    /// error.
    pub async fn execute(&self, invocation: &ToolInvocation) -> ToolResult {
        if invocation.name != "execute" {
            return ToolResult::failure(format!(
                "unknown shell operation: {}",
                invocation.name
            ));
        }
        let params: ExecuteParameters = match parse_args(invocation) {
            Ok(params) => params,
            Err(err) => return ToolResult::failure(err),
        };
        if let Some(pattern) = denied_pattern(&params.command) {
            warn!(command = %params.command, pattern, "command rejected");
            return ToolResult::failure(ToolError::permission_denied().with_reason(
                format!(
                    "command rejected, it contains \"{pattern}\": {}",
                    params.command
                ),
            ));
        }
        self.run(&params.command).await
    }

    async fn run(&self, command: &str) -> ToolResult {
        info!(command, "running shell command");
        // Merge stderr into stdout so the output keeps its interleaving.
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(format!("exec 2>&1\n{command}"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        // Losing the race drops the `output` future, which kills the child.
        select! {
            output = cmd.output() => match output {
                Ok(output) => {
                    let text = String::from_utf8_lossy(&output.stdout).into_owned();
                    if output.status.success() {
                        ToolResult::success(text)
                    } else {
                        debug!(status = %output.status, "command failed");
                        ToolResult::partial(
                            text,
                            format!("command failed with {}", output.status),
                        )
                    }
                }
                Err(err) => ToolResult::failure(
                    ToolError::execution_error()
                        .with_reason(format!("failed to run command: {err}")),
                ),
            },
            _ = sleep(self.timeout) => {
                warn!(timeout = ?self.timeout, "command timed out");
                ToolResult::failure(
                    ToolError::timed_out().with_reason("command execution timed out"),
                )
            }
            _ = self.cancel.cancelled() => {
                warn!("command cancelled");
                ToolResult::failure("command execution cancelled")
            }
        }
    }
}

fn denied_pattern(command: &str) -> Option<&'static str> {
    let command = command.to_lowercase();
    DENYLIST
        .into_iter()
        .find(|pattern| command.contains(pattern))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn execute(command: &str) -> ToolInvocation {
        ToolInvocation::new(
            "shell_command",
            "execute",
            json!({"command": command})
                .as_object()
                .cloned()
                .unwrap_or_default(),
        )
    }

    #[test]
    fn test_denylist() {
        assert_eq!(denied_pattern("SUDO ls"), Some("sudo"));
        assert_eq!(denied_pattern("Rm -Rf /"), Some("rm -rf"));
        assert_eq!(denied_pattern("echo x > /dev/sda"), Some("> /dev/"));
        assert_eq!(denied_pattern("ls -la"), None);
    }

    #[tokio::test]
    async fn test_rejected_command_is_not_run() {
        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("ran");
        let shell = ShellCommand::new(CancellationToken::new());

        let result = shell
            .execute(&execute(&format!("touch {} && SuDo true", marker.display())))
            .await;
        assert!(result.error.unwrap().contains("\"sudo\""));
        assert!(result.result.is_empty());
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_merged_output() {
        let shell = ShellCommand::new(CancellationToken::new());
        let result = shell.execute(&execute("echo one; echo two 1>&2")).await;
        assert_eq!(result, ToolResult::success("one\ntwo\n"));
    }

    #[tokio::test]
    async fn test_failed_command_keeps_output() {
        let shell = ShellCommand::new(CancellationToken::new());
        let result = shell.execute(&execute("echo partial; exit 3")).await;
        assert_eq!(result.result, "partial\n");
        assert!(result.error.unwrap().contains("exit status: 3"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let shell = ShellCommand::new(CancellationToken::new())
            .with_timeout(Duration::from_millis(100));
        let result = shell.execute(&execute("sleep 5")).await;
        assert_eq!(result.error.as_deref(), Some("command execution timed out"));
        assert!(result.result.is_empty());
    }

    #[tokio::test]
    async fn test_cancel() {
        let cancel = CancellationToken::new();
        let shell = ShellCommand::new(cancel.clone());
        cancel.cancel();
        let result = shell.execute(&execute("sleep 5")).await;
        assert_eq!(result.error.as_deref(), Some("command execution cancelled"));
    }

    #[tokio::test]
    async fn test_bad_invocations() {
        let shell = ShellCommand::new(CancellationToken::new());

        let mut invocation = execute("ls");
        invocation.name = "spawn".to_owned();
        let result = shell.execute(&invocation).await;
        assert_eq!(result.error.as_deref(), Some("unknown shell operation: spawn"));

        invocation.name = "execute".to_owned();
        invocation.args.clear();
        let result = shell.execute(&invocation).await;
        assert!(result.error.unwrap().contains("missing field `command`"));
    }
}
