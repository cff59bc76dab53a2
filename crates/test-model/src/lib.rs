//! A local fake model for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use simple_agent_model::{
    ErrorKind, Message, ModelProvider, ModelProviderError, ModelRequest,
};
use tokio::time::sleep;

pub use preset::*;

const REPLY_DELAY: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Default)]
struct Script {
    responses: VecDeque<PresetResponse>,
    requests: Vec<ModelRequest>,
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to setup the script, which is how the
/// model should respond to each request, in order. Every request consumes
/// one step, and if there are no enough steps in the script, an error will
/// be returned.
///
/// Clones share the same script, so a test can hand one clone to the agent
/// and keep another to inspect the requests it received.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Arc<Mutex<Script>>,
}

impl TestModelProvider {
    /// Appends a step that replies with the given text.
    #[inline]
    pub fn add_reply_step<S: Into<String>>(&mut self, content: S) {
        self.add_response_step(PresetResponse::reply(content));
    }

    /// Appends a step with a preset response.
    #[inline]
    pub fn add_response_step(&mut self, preset: PresetResponse) {
        self.lock().responses.push_back(preset);
    }

    /// Returns all requests received so far.
    #[inline]
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.lock().requests.clone()
    }

    /// Returns the number of steps that have not been consumed yet.
    #[inline]
    pub fn remaining_steps(&self) -> usize {
        self.lock().responses.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        // A panicking test may poison the lock, the script is still usable.
        self.script.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl Debug for TestModelProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestModelProvider")
            .field("remaining_steps", &self.remaining_steps())
            .finish()
    }
}

impl ModelProvider for TestModelProvider {
    type Error = crate::Error;

    fn send_request(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<Message, Self::Error>> + Send + 'static
    {
        let step = {
            let mut script = self.lock();
            script.requests.push(req.clone());
            script.responses.pop_front()
        };

        async move {
            sleep(REPLY_DELAY).await;
            match step {
                Some(PresetResponse::Reply(content)) => {
                    Ok(Message::assistant(content))
                }
                Some(PresetResponse::Failure(kind)) => Err(Error {
                    message: "preset failure",
                    kind,
                }),
                None => Err(Error {
                    message: "no enough steps",
                    kind: ErrorKind::Other,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use simple_agent_model::Role;

    use super::*;

    #[tokio::test]
    async fn test_send_request() {
        let mut provider = TestModelProvider::default();
        provider.add_reply_step("Hello, world!");
        provider.add_response_step(PresetResponse::failure(ErrorKind::Status));

        let mut req = ModelRequest {
            messages: vec![Message::user("Hi")],
        };
        let reply = provider.send_request(&req).await.unwrap();
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "Hello, world!");

        req.messages.push(reply);
        req.messages.push(Message::user("Again"));
        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Status);

        let err = provider.send_request(&req).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);

        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[1].messages.len(), 3);
    }

    #[tokio::test]
    async fn test_clones_share_script() {
        let mut provider = TestModelProvider::default();
        let observer = provider.clone();
        provider.add_reply_step("ok");

        let req = ModelRequest {
            messages: vec![Message::user("Hi")],
        };
        provider.send_request(&req).await.unwrap();
        assert_eq!(observer.requests(), vec![req]);
        assert_eq!(observer.remaining_steps(), 0);
    }
}
