use simple_agent_model::{Message, ModelRequest};

use super::{Agent, AgentEvent, Reply};
use crate::error::Error;
use crate::tool::{
    Progress, ToolInvocation, ToolResult, dispatch_all, extract_invocations,
    format_tool_results,
};

/// What the agent is currently doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AgentStage {
    /// Waiting for user input.
    #[default]
    Idle,
    /// Waiting for the model to reply.
    ModelThinking,
    /// Executing the tools requested by the model.
    RunningTools,
}

impl Agent {
    pub(super) async fn run_turn(&mut self, input: String) -> Result<Reply, Error> {
        self.transcript.push(Message::user(input));

        let mut reply = self.infer().await?;
        let mut tool_rounds = 0;
        let mut round_limit_reached = false;

        while let Some(invocations) = extract_invocations(&reply.content) {
            if tool_rounds >= self.max_tool_rounds {
                warn!(
                    rounds = tool_rounds,
                    "tool round budget spent, taking the reply as final"
                );
                self.emit(AgentEvent::ToolRoundLimitReached {
                    rounds: tool_rounds,
                });
                round_limit_reached = true;
                break;
            }

            tool_rounds += 1;
            info!(
                round = tool_rounds,
                count = invocations.len(),
                "running tool round"
            );
            let results = self.run_tools(&invocations).await;
            self.transcript
                .push(Message::tool(format_tool_results(&results)));

            reply = self.infer().await?;
        }

        let content = reply.content.clone();
        self.transcript.push(reply);
        Ok(Reply {
            content,
            tool_rounds,
            round_limit_reached,
        })
    }

    async fn infer(&mut self) -> Result<Message, Error> {
        self.set_stage(AgentStage::ModelThinking);
        let request = ModelRequest {
            messages: self.transcript.messages().to_vec(),
        };
        let reply = self.model_client.send_request(request).await?;
        debug!(len = reply.content.len(), "model replied");
        Ok(reply)
    }

    async fn run_tools(
        &mut self,
        invocations: &[ToolInvocation],
    ) -> Vec<ToolResult> {
        self.set_stage(AgentStage::RunningTools);
        let this = &*self;
        dispatch_all(this.tool_executor.as_ref(), invocations, |progress| {
            let event = match progress {
                Progress::Started(invocation) => AgentEvent::ToolCall {
                    invocation: invocation.clone(),
                },
                Progress::Finished(invocation, result) => AgentEvent::ToolResult {
                    invocation: invocation.clone(),
                    result: result.clone(),
                },
            };
            this.emit(event);
        })
        .await
    }

    pub(super) fn set_stage(&mut self, stage: AgentStage) {
        if self.current_stage == stage {
            return;
        }
        trace!(from = ?self.current_stage, to = ?stage, "stage changed");
        self.current_stage = stage;
        self.emit(AgentEvent::StageChanged(stage));
    }
}
