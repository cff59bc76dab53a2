use crate::Message;

/// A request to be sent to the model provider.
///
/// The provider adds its own model selection and flags; the request only
/// carries the conversation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModelRequest {
    /// The whole conversation so far, system prompt first.
    pub messages: Vec<Message>,
}
