use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use simple_agent_core::tool::{ToolDefinition, ToolResult};
use simple_agent_core::{
    Agent, AgentBuilder, AgentEvent, Error, Reply, conversation::Transcript,
};
use simple_agent_model::ModelProvider;
use tokio_util::sync::CancellationToken;

use crate::tools::LocalToolExecutor;

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("./system_prompt.md");

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    system_prompt: Option<String>,
    workspace_root: PathBuf,
    shell_timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider);
        Self {
            agent_builder,
            system_prompt: None,
            workspace_root: PathBuf::from("."),
            shell_timeout: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the default system prompt, which describes the host and the
    /// built-in tools.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the directory that file operations are confined to. Defaults to
    /// the current directory.
    #[inline]
    pub fn with_workspace_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.workspace_root = root.into();
        self
    }

    /// Sets how long a shell command may run.
    #[inline]
    pub fn with_shell_timeout(mut self, timeout: Duration) -> Self {
        self.shell_timeout = Some(timeout);
        self
    }

    /// Sets the token that kills running shell commands when cancelled.
    #[inline]
    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets how many tool rounds a single user turn may take.
    #[inline]
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.agent_builder = self.agent_builder.with_max_tool_rounds(rounds);
        self
    }

    /// Attaches a callback to be invoked on agent events.
    #[inline]
    pub fn on_event(
        mut self,
        on_event: impl Fn(AgentEvent) + Send + Sync + 'static,
    ) -> Self {
        self.agent_builder = self.agent_builder.on_event(on_event);
        self
    }

    /// Builds a new session.
    pub fn build(self) -> Session {
        let mut executor = LocalToolExecutor::new(self.workspace_root, self.cancel);
        if let Some(timeout) = self.shell_timeout {
            executor = executor.with_shell_timeout(timeout);
        }
        let system_prompt = self.system_prompt.unwrap_or_else(|| {
            render_system_prompt(host_os(), &LocalToolExecutor::definitions())
        });

        let agent = self
            .agent_builder
            .with_system_prompt(system_prompt)
            .with_tool_executor(executor)
            .build();

        Session { agent }
    }
}

/// A chat session, like a window that displays messages and has a input box.
///
/// The session holds a fully configured agent that you can use directly, and it
/// is basically a wrapper around [`Agent`].
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Sends a message to the session and waits for the final reply.
    #[inline]
    pub async fn send_message(&mut self, message: &str) -> Result<Reply, Error> {
        self.agent.process_input(message).await
    }

    /// Runs a `/tool` command line without involving the model.
    #[inline]
    pub async fn run_tool_command(&self, line: &str) -> Result<ToolResult, Error> {
        self.agent.run_tool_command(line).await
    }

    /// Returns the conversation so far.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        self.agent.transcript()
    }
}

fn render_system_prompt(host_os: &str, tools: &[ToolDefinition]) -> String {
    let mut catalogue = String::new();
    for tool in tools {
        let parameters = serde_json::to_string_pretty(&tool.parameters)
            .unwrap_or_else(|_| tool.parameters.to_string());
        let _ = write!(
            catalogue,
            "## `{}` / `{}`\n\n{}\n\nArguments schema:\n\n```json\n{parameters}\n```\n\n",
            tool.kind, tool.name, tool.description
        );
    }
    SYSTEM_PROMPT_TEMPLATE
        .replace("{{HOST_OS}}", host_os)
        .replace("{{TOOLS}}", catalogue.trim_end())
}

#[inline]
fn host_os() -> &'static str {
    let os = std::env::consts::OS;
    match os {
        "linux" => "Linux",
        "macos" => "macOS",
        "windows" => "Windows",
        _ => "some other OS",
    }
}
