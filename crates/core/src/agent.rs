mod builder;
mod state;
#[cfg(test)]
mod tests;

use crate::conversation::Transcript;
use crate::error::Error;
use crate::model_client::ModelClient;
use crate::tool::{
    ToolExecutor, ToolInvocation, ToolResult, dispatch, parse_tool_command,
};
pub use builder::{AgentBuilder, DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_SYSTEM_PROMPT};
pub use state::AgentStage;

type EventCallback = Box<dyn Fn(AgentEvent) + Send + Sync>;

/// Notifications emitted while the agent processes a turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentEvent {
    /// The agent moved to another stage.
    StageChanged(AgentStage),
    /// A tool invocation requested by the model is about to run.
    ToolCall {
        /// The invocation.
        invocation: ToolInvocation,
    },
    /// A tool invocation has completed.
    ToolResult {
        /// The invocation.
        invocation: ToolInvocation,
        /// Its outcome.
        result: ToolResult,
    },
    /// The model kept requesting tools after the round budget was spent,
    /// its last reply is taken as the final answer.
    ToolRoundLimitReached {
        /// The number of tool rounds executed in this turn.
        rounds: usize,
    },
}

/// The outcome of a user turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// The final assistant text.
    pub content: String,
    /// How many tool rounds the turn took.
    pub tool_rounds: usize,
    /// `true` if the turn was cut short by the round budget.
    pub round_limit_reached: bool,
}

/// An agent instance, which owns the conversation, a model client, and a
/// tool executor.
///
/// A turn runs to completion before the next one starts: user input,
/// model inference, and any tool rounds the model requests are strictly
/// sequential.
pub struct Agent {
    model_client: ModelClient,
    tool_executor: Box<dyn ToolExecutor>,
    transcript: Transcript,
    current_stage: AgentStage,
    max_tool_rounds: usize,
    on_event: Option<EventCallback>,
}

impl Agent {
    /// Processes one user input and returns the final reply.
    ///
    /// Tool calls found in model replies are executed and their results
    /// are fed back to the model until it answers without requesting a
    /// tool, or the round budget is spent. Only the final reply is recorded
    /// as an assistant message.
    ///
    /// On error the transcript keeps everything appended before the
    /// failure, and the agent is ready for the next input.
    pub async fn process_input<S: Into<String>>(
        &mut self,
        input: S,
    ) -> Result<Reply, Error> {
        let result = self.run_turn(input.into()).await;
        if let Err(err) = &result {
            error!("turn aborted: {err}");
        }
        self.set_stage(AgentStage::Idle);
        result
    }

    /// Parses a `/tool` command line and executes it directly.
    ///
    /// The model is not involved and the transcript is left untouched.
    pub async fn run_tool_command(&self, line: &str) -> Result<ToolResult, Error> {
        let invocation = parse_tool_command(line)?;
        info!(%invocation, "running tool command");
        Ok(dispatch(self.tool_executor.as_ref(), &invocation).await)
    }

    /// Returns the conversation so far.
    #[inline]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the current stage.
    #[inline]
    pub fn stage(&self) -> AgentStage {
        self.current_stage
    }

    /// Returns the per-turn tool round budget.
    #[inline]
    pub fn max_tool_rounds(&self) -> usize {
        self.max_tool_rounds
    }

    fn from_builder(builder: AgentBuilder) -> Self {
        let AgentBuilder {
            model_client,
            system_prompt,
            tool_executor,
            max_tool_rounds,
            on_event,
        } = builder;

        Self {
            model_client,
            tool_executor,
            transcript: Transcript::with_system_prompt(system_prompt),
            current_stage: AgentStage::default(),
            max_tool_rounds,
            on_event,
        }
    }

    #[inline]
    fn emit(&self, event: AgentEvent) {
        if let Some(on_event) = &self.on_event {
            on_event(event);
        }
    }
}
