//! Unified error type.

use std::fmt;

use tokio::task::JoinError;

/// The error type returned by moor's fallible operations.
///
/// Application-level failures are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding the endpoint, accepting connections, or
/// the serving task dying outright.
#[derive(Debug)]
pub enum Error {
    /// Binding the endpoint or running the accept loop failed.
    Io(std::io::Error),
    /// The serving task panicked or was aborted before it could report back.
    Task(JoinError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Task(e) => write!(f, "serving task: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Task(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
