//! Standard error type for softcl-core.

use std::fmt;

use crate::{CommandType, Status};

/// Core result type.
pub type Result<T> = ::std::result::Result<T, Error>;

/// A failure reported by a device API function call.
///
/// Carries the status code, the name of the failing function, and optional
/// call-site information.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiError {
    status: Status,
    fn_name: &'static str,
    fn_info: Option<String>,
}

impl ApiError {
    pub fn new<S: Into<String>>(status: Status, fn_name: &'static str, fn_info: Option<S>) -> ApiError {
        ApiError {
            status,
            fn_name,
            fn_info: fn_info.map(|s| s.into()),
        }
    }

    /// The status code reported by the device API.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The name of the failing function.
    pub fn fn_name(&self) -> &'static str {
        self.fn_name
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.fn_info {
            Some(ref info) => write!(
                f,
                "error executing function: {} (\"{}\"): {}",
                self.fn_name, info, self.status
            ),
            None => write!(f, "error executing function: {}: {}", self.fn_name, self.status),
        }
    }
}

impl fmt::Debug for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl ::std::error::Error for ApiError {}

/// An asynchronous device operation reported failure.
///
/// Surfaced when waiting upon an event whose command reached the `Error`
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventError {
    /// The device status code the operation failed with.
    pub status: Status,
    /// The kind of command that failed.
    pub command: CommandType,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} command failed with {}", self.command, self.status)
    }
}

impl ::std::error::Error for EventError {}

/// One failed operation within a waited-upon event list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitListFailure {
    /// Position of the failed event within the list passed to the wait call.
    pub index: usize,
    /// The kind of command that failed.
    pub command: CommandType,
    /// The device status code the operation failed with.
    pub status: Status,
}

/// One or more operations in a waited-upon event list failed.
///
/// Every event in the list has still been waited upon; `failures` identifies
/// each operation which reached the `Error` terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitListError {
    failures: Vec<WaitListFailure>,
}

impl WaitListError {
    pub(crate) fn new(failures: Vec<WaitListFailure>) -> WaitListError {
        debug_assert!(!failures.is_empty());
        WaitListError { failures }
    }

    /// Every failed operation, in list order.
    pub fn failures(&self) -> &[WaitListFailure] {
        &self.failures
    }

    /// The first failed operation in list order.
    pub fn first(&self) -> &WaitListFailure {
        &self.failures[0]
    }
}

impl fmt::Display for WaitListError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let first = self.first();
        write!(
            f,
            "{} event(s) in wait list failed; first: {} command at index {} failed with {}",
            self.failures.len(),
            first.command,
            first.index,
            first.status
        )
    }
}

impl ::std::error::Error for WaitListError {}

/// An enum containing one of several error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // String: An arbitrary error. Refrain from creating new instances of
    // this by converting strings to `Error`; use a dedicated variant.
    #[error("{0}")]
    String(String),
    // Api: A device API function call failed synchronously:
    #[error("{0}")]
    Api(#[from] ApiError),
    // Event: A waited-upon operation failed:
    #[error("{0}")]
    Event(#[from] EventError),
    // WaitList: One or more operations in a waited-upon list failed:
    #[error("{0}")]
    WaitList(#[from] WaitListError),
}

impl Error {
    /// Returns the error status code for `Api` variants.
    pub fn api_status(&self) -> Option<Status> {
        match *self {
            Error::Api(ref err) => Some(err.status()),
            _ => None,
        }
    }

    /// Returns the device status code of the failed operation for `Event`
    /// variants, or of the first failed operation for `WaitList` variants.
    pub fn event_status(&self) -> Option<Status> {
        match *self {
            Error::Event(ref err) => Some(err.status),
            Error::WaitList(ref err) => Some(err.first().status),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for Error {
    fn from(desc: &'a str) -> Self {
        Error::String(String::from(desc))
    }
}

impl From<String> for Error {
    fn from(desc: String) -> Self {
        Error::String(desc)
    }
}
