//! Conversation-related types.

use simple_agent_model::{Message, Role};

/// The ordered message history exchanged with the model.
///
/// A transcript starts with exactly one system message and only ever
/// grows. Messages cannot be modified once appended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates a transcript seeded with the given system prompt.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(prompt: S) -> Self {
        Self {
            messages: vec![Message::system(prompt)],
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, msg: Message) {
        trace!(role = %msg.role, len = msg.content.len(), "append message");
        self.messages.push(msg);
    }

    /// Returns all messages, oldest first.
    #[inline]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the most recent message.
    #[inline]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Returns the number of messages, including the system prompt.
    #[inline]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns `true` if the transcript holds no message at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Counts the messages written by `role`.
    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_with_system_prompt() {
        let mut transcript = Transcript::with_system_prompt("be nice");
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.messages()[0], Message::system("be nice"));

        transcript.push(Message::user("hi"));
        transcript.push(Message::assistant("hello"));
        assert_eq!(transcript.last(), Some(&Message::assistant("hello")));
        assert_eq!(transcript.count_role(Role::User), 1);
        assert_eq!(transcript.count_role(Role::Tool), 0);
    }
}
