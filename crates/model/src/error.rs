use std::fmt::{self, Display};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never got a response (network, TLS, timeout).
    Transport,
    /// The server answered with a non-success status code.
    Status,
    /// The response body could not be decoded.
    Decode,
    /// The provider reported an error object in the response body.
    Provider,
    /// The provider answered without any choice to pick.
    EmptyReply,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Transport => "transport error",
            ErrorKind::Status => "unexpected status",
            ErrorKind::Decode => "malformed response",
            ErrorKind::Provider => "provider error",
            ErrorKind::EmptyReply => "empty reply",
            ErrorKind::Other => "other error",
        };
        f.write_str(s)
    }
}
