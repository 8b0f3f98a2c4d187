//! Standard error type for softcl.

use crate::core::{Error as CoreError, Status};
use crate::standard::BufferCmdError;

/// Standard result type.
pub type Result<T> = ::std::result::Result<T, Error>;

/// An enum containing either a core error or one of the standard-interface
/// error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("softcl-core error: {0}")]
    Core(#[from] CoreError),
    #[error("buffer command error: {0}")]
    BufferCmd(#[from] BufferCmdError),
    #[error("the future's value has already been taken")]
    ValueTaken,
}

impl Error {
    /// Returns the error status code for synchronous API failures.
    pub fn api_status(&self) -> Option<Status> {
        match *self {
            Error::Core(ref err) => err.api_status(),
            _ => None,
        }
    }

    /// Returns the device status code of the failed operation, if this
    /// error was surfaced by waiting upon one or more events.
    pub fn event_status(&self) -> Option<Status> {
        match *self {
            Error::Core(ref err) => err.event_status(),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for Error {
    fn from(desc: &'a str) -> Self {
        Error::Core(CoreError::from(desc))
    }
}

impl From<String> for Error {
    fn from(desc: String) -> Self {
        Error::Core(CoreError::from(desc))
    }
}
