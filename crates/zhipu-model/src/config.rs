use std::fmt::Debug;

const DEFAULT_MODEL: &str = "glm-4.5";
const DEFAULT_BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";

/// Builder for [`ZhipuConfig`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ZhipuConfigBuilder {
    api_key: String,
    model: Option<String>,
    base_url: Option<String>,
    thinking: Option<bool>,
}

impl ZhipuConfigBuilder {
    /// Creates a builder with the given API key.
    #[inline]
    pub fn with_api_key<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            base_url: None,
            thinking: None,
        }
    }

    /// Sets the model to use.
    #[inline]
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets a custom base URL.
    #[inline]
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Enables or disables the "thinking" mode of the model. It is enabled
    /// unless turned off here.
    #[inline]
    pub fn with_thinking(mut self, enabled: bool) -> Self {
        self.thinking = Some(enabled);
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> ZhipuConfig {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        ZhipuConfig {
            api_key: self.api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.trim_end_matches('/').to_owned(),
            thinking: self.thinking.unwrap_or(true),
        }
    }
}

impl Debug for ZhipuConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZhipuConfigBuilder")
            .field("api_key", &"<deducted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("thinking", &self.thinking)
            .finish()
    }
}

/// Configuration for the GLM chat-completions provider.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ZhipuConfig {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) thinking: bool,
}

impl ZhipuConfig {
    /// Returns the model identifier sent with every request.
    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the full URL of the chat-completions endpoint.
    #[inline]
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl Debug for ZhipuConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZhipuConfig")
            .field("api_key", &"<deducted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("thinking", &self.thinking)
            .finish()
    }
}
