//! A model provider for the Zhipu GLM chat-completions API.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;

use reqwest::{Client, header};
use simple_agent_model::{
    ErrorKind, Message, ModelProvider, ModelProviderError, ModelRequest,
};

pub use config::{ZhipuConfig, ZhipuConfigBuilder};

/// Error type for [`ZhipuProvider`].
#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// GLM chat-completions model provider.
///
/// Every request is a single, non-streaming POST carrying the whole
/// conversation.
#[derive(Clone, Debug)]
pub struct ZhipuProvider {
    client: Client,
    config: Arc<ZhipuConfig>,
}

impl ZhipuProvider {
    /// Creates a new `ZhipuProvider` with the given configuration.
    #[inline]
    pub fn new(config: ZhipuConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration of this provider.
    #[inline]
    pub fn config(&self) -> &ZhipuConfig {
        &self.config
    }
}

impl ModelProvider for ZhipuProvider {
    type Error = Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Message, Self::Error>> + Send + 'static
    {
        let body = proto::create_request(req, &self.config);
        let message_count = req.messages.len();
        let resp_fut = self
            .client
            .post(self.config.endpoint())
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send();

        async move {
            debug!("sending a request with {message_count} messages");
            let resp = resp_fut.await.map_err(|err| {
                error!("request failed: {err}");
                Error::new(format!("request failed: {err}"), ErrorKind::Transport)
            })?;

            let status = resp.status().as_u16();
            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned);
            let body = resp.text().await.map_err(|err| {
                error!("failed to read response body: {err}");
                Error::new(
                    format!("failed to read response body: {err}"),
                    ErrorKind::Transport,
                )
            })?;
            info!(status, body_len = body.len(), "got a response");

            proto::parse_response(status, content_type.as_deref(), &body)
                .inspect_err(|err| error!(kind = %err.kind, "{err}"))
        }
    }
}
