//! Status and information enums for the software device API.

use std::fmt;

/// A device API status code.
///
/// The numeric values follow the accelerator-API convention of negative
/// error codes so that logs and error messages remain familiar to anyone
/// used to reading driver output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    DeviceNotAvailable = -2,
    MemObjectAllocationFailure = -4,
    OutOfResources = -5,
    ProfilingInfoNotAvailable = -7,
    MemCopyOverlap = -8,
    ExecStatusErrorForEventsInWaitList = -14,
    InvalidValue = -30,
    InvalidHostPtr = -37,
    InvalidEvent = -58,
    InvalidOperation = -59,
    InvalidBufferSize = -61,
}

impl Status {
    /// Converts a raw status code into a `Status`.
    pub fn from_i32(code: i32) -> Option<Status> {
        match code {
            -2 => Some(Status::DeviceNotAvailable),
            -4 => Some(Status::MemObjectAllocationFailure),
            -5 => Some(Status::OutOfResources),
            -7 => Some(Status::ProfilingInfoNotAvailable),
            -8 => Some(Status::MemCopyOverlap),
            -14 => Some(Status::ExecStatusErrorForEventsInWaitList),
            -30 => Some(Status::InvalidValue),
            -37 => Some(Status::InvalidHostPtr),
            -58 => Some(Status::InvalidEvent),
            -59 => Some(Status::InvalidOperation),
            -61 => Some(Status::InvalidBufferSize),
            _ => None,
        }
    }

    /// Returns the raw status code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.as_i32())
    }
}

/// The execution status of a command associated with an event.
///
/// Commands move through `Queued` → `Submitted` → `Running` and finish in
/// one of the two terminal states, `Complete` or `Error`. User events are
/// created in the `Submitted` state and are moved to a terminal state by
/// the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandExecutionStatus {
    /// The command has been enqueued but not yet handed to the scheduler.
    Queued,
    /// The command has been picked up by the device scheduler.
    Submitted,
    /// The command is executing on the device.
    Running,
    /// The command completed successfully.
    Complete,
    /// The command failed with a device status code.
    Error(Status),
}

impl CommandExecutionStatus {
    /// Returns true if this status can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CommandExecutionStatus::Complete | CommandExecutionStatus::Error(_)
        )
    }

    /// Returns true if the command completed successfully.
    pub fn is_complete(self) -> bool {
        self == CommandExecutionStatus::Complete
    }

    /// Returns the error status code if the command failed.
    pub fn err_status(self) -> Option<Status> {
        match self {
            CommandExecutionStatus::Error(status) => Some(status),
            _ => None,
        }
    }
}

impl fmt::Display for CommandExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CommandExecutionStatus::Error(status) => write!(f, "Error({})", status),
            ref other => write!(f, "{:?}", other),
        }
    }
}

/// The kind of command an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    User,
    Marker,
    WriteBuffer,
    ReadBuffer,
    CopyBuffer,
    FillBuffer,
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Profiling timestamps recorded for an event.
///
/// Values are reported as nanoseconds relative to the moment the command
/// was enqueued, which keeps them meaningful without a device clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingInfo {
    /// The command was enqueued by the host.
    Queued,
    /// The command was handed to the scheduler.
    Submit,
    /// Execution began.
    Start,
    /// Execution finished.
    End,
}
