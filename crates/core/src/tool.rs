//! Tool call supports.
//!
//! Models request tools by embedding a JSON payload in the text of their
//! reply. [`extract_invocations`] finds and decodes that payload,
//! [`dispatch`] routes each [`ToolInvocation`] to a [`ToolExecutor`], and
//! [`format_tool_results`] renders the outcomes into the text the model
//! sees on its next turn.

mod command;
mod dispatch;
mod error;
mod extract;
mod format;

use std::fmt::{self, Display};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub use command::{CommandError, is_tool_command, parse_tool_command};
pub use dispatch::{Progress, dispatch, dispatch_all};
pub use error::{Error, ErrorKind};
pub use extract::extract_invocations;
pub use format::format_tool_results;

/// The type of tool an invocation asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Listing, reading and writing files.
    FileOperation,
    /// Running a command through the system shell.
    ShellCommand,
}

impl ToolKind {
    /// Parses the `type` field of an invocation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "file_operation" => Some(ToolKind::FileOperation),
            "shell_command" => Some(ToolKind::ShellCommand),
            _ => None,
        }
    }

    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::FileOperation => "file_operation",
            ToolKind::ShellCommand => "shell_command",
        }
    }
}

impl Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured request, embedded in model output, to perform a local
/// action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// The tool type, e.g. `file_operation`. Kept as a string so that
    /// unknown types can be reported back to the model.
    #[serde(rename = "type")]
    pub kind: String,
    /// The operation within the tool, e.g. `read`.
    pub name: String,
    /// Named arguments of the operation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub args: Map<String, Value>,
    /// The model's rationale. Not used for execution.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub thought: String,
}

impl ToolInvocation {
    /// Creates an invocation without a rationale.
    pub fn new<K, N>(kind: K, name: N, args: Map<String, Value>) -> Self
    where
        K: Into<String>,
        N: Into<String>,
    {
        Self {
            kind: kind.into(),
            name: name.into(),
            args,
            thought: String::new(),
        }
    }

    /// Returns the string argument `key`, if present and a string.
    #[inline]
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).and_then(Value::as_str)
    }
}

impl Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The outcome of one tool invocation.
///
/// Usually exactly one of `result` and `error` carries content. Shell
/// commands that fail after producing output are the exception: both are
/// set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The output of the tool.
    pub result: String,
    /// Why the tool failed, if it did.
    pub error: Option<String>,
}

impl ToolResult {
    /// Creates a successful result.
    #[inline]
    pub fn success<S: Into<String>>(result: S) -> Self {
        Self {
            result: result.into(),
            error: None,
        }
    }

    /// Creates a failed result without output.
    #[inline]
    pub fn failure<E: Display>(error: E) -> Self {
        Self {
            result: String::new(),
            error: Some(error.to_string()),
        }
    }

    /// Creates a failed result that still carries output.
    #[inline]
    pub fn partial<S: Into<String>, E: Display>(result: S, error: E) -> Self {
        Self {
            result: result.into(),
            error: Some(error.to_string()),
        }
    }

    /// Returns `true` if the tool did not report an error.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<String, Error>> for ToolResult {
    #[inline]
    fn from(result: Result<String, Error>) -> Self {
        match result {
            Ok(output) => ToolResult::success(output),
            Err(err) => ToolResult::failure(err),
        }
    }
}

/// Describes a tool operation so it can be advertised to the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolDefinition {
    /// The tool type.
    #[serde(rename = "type")]
    pub kind: ToolKind,
    /// The operation name.
    pub name: String,
    /// What the operation does.
    pub description: String,
    /// JSON schema of the `args` object.
    pub parameters: Value,
}

impl Serialize for ToolKind {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The capability that actually performs tool invocations.
///
/// The dispatcher only depends on this trait, so alternative executors
/// (sandboxed ones, or mocks in tests) can be substituted. Implementations
/// never fail past this boundary: every failure is reported through
/// [`ToolResult::error`].
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Performs a `file_operation` invocation.
    async fn file_operation(&self, invocation: &ToolInvocation) -> ToolResult;

    /// Performs a `shell_command` invocation.
    async fn shell_command(&self, invocation: &ToolInvocation) -> ToolResult;
}

/// An executor that refuses every invocation.
///
/// Agents built without an executor use this one.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledToolExecutor;

#[async_trait]
impl ToolExecutor for DisabledToolExecutor {
    async fn file_operation(&self, invocation: &ToolInvocation) -> ToolResult {
        ToolResult::failure(format!("tool {invocation} is not available"))
    }

    async fn shell_command(&self, invocation: &ToolInvocation) -> ToolResult {
        ToolResult::failure(format!("tool {invocation} is not available"))
    }
}
