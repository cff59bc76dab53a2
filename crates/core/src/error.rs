use simple_agent_model::{ErrorKind, ModelProviderError};
use thiserror::Error;

use crate::tool::CommandError;

/// Errors that abort an agent operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The model provider failed to produce a reply.
    #[error("inference failed ({kind}): {message}")]
    Model {
        /// The kind reported by the provider.
        kind: ErrorKind,
        /// The provider's description of the failure.
        message: String,
    },
    /// A `/tool` command line could not be parsed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl From<Box<dyn ModelProviderError>> for Error {
    fn from(err: Box<dyn ModelProviderError>) -> Self {
        Error::Model {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
