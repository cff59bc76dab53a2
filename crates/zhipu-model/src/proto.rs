use std::fmt::{self, Display};

use mime::Mime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use simple_agent_model::{ErrorKind, Message, ModelRequest};

use crate::{Error, ZhipuConfig};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

/// The reply message. `reasoning_content` and `tool_calls` that some models
/// attach are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<Value>,
}

impl Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match &self.code {
            Some(Value::String(code)) => code.clone(),
            Some(code) => code.to_string(),
            None => String::new(),
        };
        write!(
            f,
            "{} (type: {}, code: {})",
            self.message,
            self.kind.as_deref().unwrap_or(""),
            code
        )
    }
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
struct Thinking {
    r#type: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    thinking: Thinking,
    stream: bool,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &ZhipuConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.clone(),
        thinking: Thinking {
            r#type: if config.thinking { "enabled" } else { "disabled" },
        },
        stream: false,
    }
}

/// Interprets a complete HTTP response from the chat-completions endpoint.
pub fn parse_response(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<Message, Error> {
    if status != 200 {
        return Err(Error::new(
            format!("API returned status {status}: {body}"),
            ErrorKind::Status,
        ));
    }

    let is_json = content_type
        .map(|v| {
            v.parse::<Mime>()
                .map(|m| m.subtype() == mime::JSON)
                .unwrap_or(false)
        })
        .unwrap_or(true);
    if !is_json {
        return Err(Error::new(
            format!("unexpected content type: {content_type:?}"),
            ErrorKind::Decode,
        ));
    }

    let resp: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|err| {
            Error::new(
                format!("failed to decode response: {err}, raw response: {body}"),
                ErrorKind::Decode,
            )
        })?;

    if let Some(api_error) = resp.error.filter(|e| !e.message.is_empty()) {
        return Err(Error::new(
            format!("API error: {api_error}"),
            ErrorKind::Provider,
        ));
    }

    let Some(choice) = resp.choices.into_iter().next() else {
        return Err(Error::new("API returned an empty reply", ErrorKind::EmptyReply));
    };
    Ok(Message::assistant(choice.message.content.unwrap_or_default()))
}
