use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use simple_agent_model::{ErrorKind, Message, Role};
use simple_agent_test_model::{PresetResponse, TestModelProvider};

use crate::tool::{CommandError, ToolExecutor, ToolInvocation, ToolResult};
use crate::{AgentBuilder, AgentEvent, AgentStage, Error};

const LIST_CALL: &str = r#"Let me check.
```json
{"type": "file_operation", "name": "list", "args": {"path": "."}, "thought": "see what is here"}
```"#;

/// Answers file operations with a canned listing and echoes shell commands.
#[derive(Clone, Default)]
struct MockExecutor {
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExecutor {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolExecutor for MockExecutor {
    async fn file_operation(&self, invocation: &ToolInvocation) -> ToolResult {
        self.calls.lock().unwrap().push(invocation.to_string());
        match invocation.name.as_str() {
            "list" => ToolResult::success(format!(
                "Contents of directory {}:\nREADME.md\tfile\t12 bytes",
                invocation.str_arg("path").unwrap_or(".")
            )),
            other => ToolResult::failure(format!("unknown file operation: {other}")),
        }
    }

    async fn shell_command(&self, invocation: &ToolInvocation) -> ToolResult {
        self.calls.lock().unwrap().push(invocation.to_string());
        ToolResult::success(invocation.str_arg("command").unwrap_or_default())
    }
}

fn collect_events() -> (
    Arc<Mutex<Vec<AgentEvent>>>,
    impl Fn(AgentEvent) + Send + Sync + 'static,
) {
    let events = Arc::new(Mutex::new(vec![]));
    let sink = Arc::clone(&events);
    (events, move |event| sink.lock().unwrap().push(event))
}

fn roles(messages: &[Message]) -> Vec<Role> {
    messages.iter().map(|m| m.role).collect()
}

#[tokio::test]
async fn test_simple_message() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_reply_step("Hi, what can I do for you?");

    let mut agent = AgentBuilder::with_model_provider(model_provider.clone())
        .with_system_prompt("be brief")
        .build();
    let reply = agent.process_input("Hello").await.unwrap();

    assert_eq!(reply.content, "Hi, what can I do for you?");
    assert_eq!(reply.tool_rounds, 0);
    assert!(!reply.round_limit_reached);
    assert_eq!(
        agent.transcript().messages(),
        [
            Message::system("be brief"),
            Message::user("Hello"),
            Message::assistant("Hi, what can I do for you?"),
        ]
    );
    assert_eq!(agent.stage(), AgentStage::Idle);
    assert_eq!(model_provider.requests().len(), 1);
}

#[tokio::test]
async fn test_tool_round() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_reply_step(LIST_CALL);
    model_provider.add_reply_step("There is a README.");

    let executor = MockExecutor::default();
    let mut agent = AgentBuilder::with_model_provider(model_provider.clone())
        .with_tool_executor(executor.clone())
        .build();
    let reply = agent.process_input("What is in this directory?").await.unwrap();

    assert_eq!(reply.content, "There is a README.");
    assert_eq!(reply.tool_rounds, 1);
    assert_eq!(executor.calls(), ["file_operation/list"]);

    let messages = agent.transcript().messages();
    assert_eq!(
        roles(messages),
        [Role::System, Role::User, Role::Tool, Role::Assistant]
    );
    assert_eq!(
        messages[2].content,
        "Tool execution results:\n==============\n\n\
         Tool call 1:\nStatus: success\nResult:\n\
         Contents of directory .:\nREADME.md\tfile\t12 bytes\n\n"
    );

    // The second inference sees the tool results, not the request itself.
    let requests = model_provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        roles(&requests[1].messages),
        [Role::System, Role::User, Role::Tool]
    );
}

#[tokio::test]
async fn test_results_keep_invocation_order() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_reply_step(
        r#"```json
[
  {"type": "shell_command", "name": "execute", "args": {"command": "echo one"}},
  {"type": "browser", "name": "open", "args": {}},
  {"type": "file_operation", "name": "list"}
]
```"#,
    );
    model_provider.add_reply_step("Done.");

    let executor = MockExecutor::default();
    let (events, on_event) = collect_events();
    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool_executor(executor.clone())
        .on_event(on_event)
        .build();
    agent.process_input("go").await.unwrap();

    assert_eq!(executor.calls(), ["shell_command/execute", "file_operation/list"]);

    let tool_message = &agent.transcript().messages()[2];
    let text = &tool_message.content;
    let first = text.find("Tool call 1:\nStatus: success\nResult:\necho one").unwrap();
    let second = text
        .find("Tool call 2:\nStatus: failure\nError: unknown tool type: browser")
        .unwrap();
    let third = text.find("Tool call 3:\nStatus: success").unwrap();
    assert!(first < second && second < third);

    let tool_events: Vec<_> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            AgentEvent::ToolCall { invocation } => {
                Some(format!("call {invocation}"))
            }
            AgentEvent::ToolResult { invocation, result } => Some(format!(
                "result {invocation} {}",
                result.is_success()
            )),
            _ => None,
        })
        .collect();
    assert_eq!(
        tool_events,
        [
            "call shell_command/execute",
            "result shell_command/execute true",
            "call browser/open",
            "result browser/open false",
            "call file_operation/list",
            "result file_operation/list true",
        ]
    );
}

#[tokio::test]
async fn test_stage_changes() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_reply_step(LIST_CALL);
    model_provider.add_reply_step("ok");

    let (events, on_event) = collect_events();
    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool_executor(MockExecutor::default())
        .on_event(on_event)
        .build();
    agent.process_input("hi").await.unwrap();

    let stages: Vec<_> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|event| match event {
            AgentEvent::StageChanged(stage) => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        [
            AgentStage::ModelThinking,
            AgentStage::RunningTools,
            AgentStage::ModelThinking,
            AgentStage::Idle,
        ]
    );
}

#[tokio::test]
async fn test_round_limit() {
    let mut model_provider = TestModelProvider::default();
    for _ in 0..3 {
        model_provider.add_reply_step(LIST_CALL);
    }

    let executor = MockExecutor::default();
    let (events, on_event) = collect_events();
    let mut agent = AgentBuilder::with_model_provider(model_provider.clone())
        .with_tool_executor(executor.clone())
        .with_max_tool_rounds(2)
        .on_event(on_event)
        .build();
    let reply = agent.process_input("loop forever").await.unwrap();

    assert!(reply.round_limit_reached);
    assert_eq!(reply.tool_rounds, 2);
    assert_eq!(reply.content, LIST_CALL);
    assert_eq!(executor.calls().len(), 2);
    assert_eq!(model_provider.remaining_steps(), 0);
    assert_eq!(
        roles(agent.transcript().messages()),
        [Role::System, Role::User, Role::Tool, Role::Tool, Role::Assistant]
    );
    assert!(
        events
            .lock()
            .unwrap()
            .contains(&AgentEvent::ToolRoundLimitReached { rounds: 2 })
    );
}

#[tokio::test]
async fn test_inference_error() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_response_step(PresetResponse::failure(ErrorKind::Status));
    model_provider.add_reply_step("Back online.");

    let mut agent = AgentBuilder::with_model_provider(model_provider).build();
    let err = agent.process_input("first").await.unwrap_err();
    assert!(matches!(
        err,
        Error::Model {
            kind: ErrorKind::Status,
            ..
        }
    ));
    assert_eq!(agent.stage(), AgentStage::Idle);
    assert_eq!(
        roles(agent.transcript().messages()),
        [Role::System, Role::User]
    );

    // The session goes on after a failed turn.
    let reply = agent.process_input("second").await.unwrap();
    assert_eq!(reply.content, "Back online.");
    assert_eq!(
        roles(agent.transcript().messages()),
        [Role::System, Role::User, Role::User, Role::Assistant]
    );
}

#[tokio::test]
async fn test_inference_error_after_tool_round() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_reply_step(LIST_CALL);
    model_provider.add_response_step(PresetResponse::failure(ErrorKind::Transport));

    let mut agent = AgentBuilder::with_model_provider(model_provider)
        .with_tool_executor(MockExecutor::default())
        .build();
    agent.process_input("list").await.unwrap_err();
    assert_eq!(
        roles(agent.transcript().messages()),
        [Role::System, Role::User, Role::Tool]
    );
}

#[tokio::test]
async fn test_without_executor() {
    let mut model_provider = TestModelProvider::default();
    model_provider.add_reply_step(LIST_CALL);
    model_provider.add_reply_step("I cannot list files.");

    let mut agent = AgentBuilder::with_model_provider(model_provider).build();
    agent.process_input("list").await.unwrap();
    assert!(
        agent.transcript().messages()[2]
            .content
            .contains("Error: tool file_operation/list is not available")
    );
}

#[tokio::test]
async fn test_tool_command() {
    let model_provider = TestModelProvider::default();
    let executor = MockExecutor::default();
    let agent = AgentBuilder::with_model_provider(model_provider.clone())
        .with_tool_executor(executor.clone())
        .build();

    let result = agent
        .run_tool_command(r#"/tool shell_command execute {"command": "echo hi"}"#)
        .await
        .unwrap();
    assert_eq!(result, ToolResult::success("echo hi"));
    assert_eq!(executor.calls(), ["shell_command/execute"]);
    assert_eq!(agent.transcript().len(), 1);
    assert!(model_provider.requests().is_empty());

    let err = agent.run_tool_command("/tool shell_command").await.unwrap_err();
    assert!(matches!(err, Error::Command(CommandError::Usage)));
}
