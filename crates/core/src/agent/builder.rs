use simple_agent_model::ModelProvider;

use super::{Agent, AgentEvent, EventCallback};
use crate::model_client::ModelClient;
use crate::tool::{DisabledToolExecutor, ToolExecutor};

/// The system prompt used when none is given.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// The tool round budget used when none is given.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 16;

/// [`Agent`] builder.
pub struct AgentBuilder {
    pub(crate) model_client: ModelClient,
    pub(crate) system_prompt: String,
    pub(crate) tool_executor: Box<dyn ToolExecutor>,
    pub(crate) max_tool_rounds: usize,
    pub(crate) on_event: Option<EventCallback>,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            tool_executor: Box::new(DisabledToolExecutor),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            on_event: None,
        }
    }

    /// Sets the system prompt that opens the conversation.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the executor that performs tool invocations.
    #[inline]
    pub fn with_tool_executor<E: ToolExecutor + 'static>(
        mut self,
        executor: E,
    ) -> Self {
        self.tool_executor = Box::new(executor);
        self
    }

    /// Sets how many tool rounds a single user turn may take.
    #[inline]
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Attaches a callback to be invoked on agent events.
    ///
    /// The callback runs on the task driving the agent, so it should
    /// return quickly.
    #[inline]
    pub fn on_event(
        mut self,
        on_event: impl Fn(AgentEvent) + Send + Sync + 'static,
    ) -> Self {
        self.on_event = Some(Box::new(on_event));
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        Agent::from_builder(self)
    }
}
