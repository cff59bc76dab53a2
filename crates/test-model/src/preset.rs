use simple_agent_model::ErrorKind;

/// The preset response for an assistant step.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PresetResponse {
    /// The model replies with this text.
    Reply(String),
    /// The request fails with an error of this kind.
    Failure(ErrorKind),
}

impl PresetResponse {
    /// Creates a `PresetResponse` that replies with the given text.
    #[inline]
    pub fn reply<S: Into<String>>(content: S) -> Self {
        Self::Reply(content.into())
    }

    /// Creates a `PresetResponse` that fails with the given kind.
    #[inline]
    pub fn failure(kind: ErrorKind) -> Self {
        Self::Failure(kind)
    }
}
