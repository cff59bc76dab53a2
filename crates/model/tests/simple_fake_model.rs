use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

use simple_agent_model::{
    ErrorKind, Message, ModelProvider, ModelProviderError, ModelRequest, Role,
};
use tokio::time::sleep;

#[derive(Debug)]
struct FakeModelProviderError(ErrorKind);

impl Display for FakeModelProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeModelProviderError {}

impl ModelProviderError for FakeModelProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes the last user message back after a short delay.
struct FakeModelProvider;

impl ModelProvider for FakeModelProvider {
    type Error = FakeModelProviderError;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Message, Self::Error>> + Send + 'static
    {
        let last_user = req
            .messages
            .iter()
            .rev()
            .find(|msg| msg.role == Role::User)
            .map(|msg| msg.content.clone());
        async move {
            sleep(Duration::from_millis(1)).await;
            let Some(content) = last_user else {
                return Err(FakeModelProviderError(ErrorKind::EmptyReply));
            };
            Ok(Message::assistant(format!("You said {content}")))
        }
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completion() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![
                Message::system("Be brief."),
                Message::user("Good morning"),
            ],
        };
        let reply = provider.send_request(&req).await.unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "You said Good morning");
    }

    #[tokio::test]
    async fn test_error() {
        let provider = FakeModelProvider;
        let req = ModelRequest {
            messages: vec![Message::system("Be brief.")],
        };
        let result = provider.send_request(&req).await;
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyReply);
    }
}
