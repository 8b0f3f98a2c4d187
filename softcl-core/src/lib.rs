//! A low-level software accelerator device API.
//!
//! `softcl-core` provides the driver level of the `softcl` crate pair: an
//! in-process accelerator ("software device") with command queues, device
//! memory objects, and events, exposed as a flat function API. Each queue
//! runs one in-order worker thread; submitted commands execute against
//! byte-addressed memory objects and drive the completion status of their
//! events, which the host observes and waits upon.
//!
//! For the high-level interface types (`Buffer`, `EventList`,
//! `FutureValue`, command builders) see the `softcl` crate.

pub mod error;
mod functions;
mod types;
pub mod util;

#[cfg(test)]
mod tests;

pub use crate::error::{ApiError, Error, EventError, Result, WaitListError, WaitListFailure};
pub use crate::functions::{
    create_buffer, create_command_queue, create_context, create_user_event, enqueue_copy_buffer,
    enqueue_fill_buffer, enqueue_marker_with_wait_list, enqueue_read_buffer,
    enqueue_read_buffer_to_vec, enqueue_write_buffer, event_is_complete, event_status, finish,
    flush, set_event_callback, set_user_event_status, wait_for_event, wait_for_events,
};
pub use crate::types::abs::{
    CommandQueue, Context, Event, EventCallback, Mem, Prm, ReadStaging, WaitListRef,
};
pub use crate::types::enums::{CommandExecutionStatus, CommandType, ProfilingInfo, Status};
pub use crate::types::flags::{CommandQueueProperties, MemFlags};
