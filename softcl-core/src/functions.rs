//! The flat device API: context, queue, and buffer creation plus the
//! enqueue and event functions.
//!
//! This is the level the standard interface types are built upon. All
//! offsets and lengths are in elements of `T`, converted to bytes
//! internally.

use std::mem;

use crate::error::{ApiError, Result as CoreResult, WaitListError, WaitListFailure};
use crate::types::abs::{
    CommandKind, CommandQueue, Context, Event, EventCallback, Mem, Prm, ReadStaging, WaitListRef,
};
use crate::types::enums::{CommandExecutionStatus, CommandType, Status};
use crate::types::flags::{CommandQueueProperties, MemFlags};
use crate::util;

fn wait_list_events<Ewl: WaitListRef>(ewait: Option<&Ewl>) -> Vec<Event> {
    match ewait {
        Some(list) => list.events().to_vec(),
        None => Vec::new(),
    }
}

//============================================================================
//======================= Context and Queue APIs =============================
//============================================================================

/// Creates a new device context.
pub fn create_context() -> Context {
    Context::new()
}

/// Creates a new command queue with an in-order worker.
pub fn create_command_queue(
    context: &Context,
    properties: Option<CommandQueueProperties>,
) -> CoreResult<CommandQueue> {
    CommandQueue::new(context.clone(), properties.unwrap_or_default())
}

/// Issues all previously queued commands to the device.
///
/// Submission is eager in the software device, so this is a no-op kept for
/// API symmetry.
pub fn flush(_queue: &CommandQueue) -> CoreResult<()> {
    Ok(())
}

/// Blocks until all commands previously enqueued on `queue` have finished.
pub fn finish(queue: &CommandQueue) -> CoreResult<()> {
    let marker = queue.submit(CommandType::Marker, CommandKind::Marker, Vec::new())?;
    // A finish barrier does not re-report command failures; it only
    // guarantees quiescence.
    marker.wait_until_terminal();
    Ok(())
}

//============================================================================
//========================= Memory Object APIs ===============================
//============================================================================

/// Creates a new buffer of `len` elements of `T`.
///
/// If `flags` contains `COPY_HOST_PTR`, `host_data` must be a slice of
/// exactly `len` elements used to initialize the buffer; otherwise the
/// buffer is zeroed.
pub fn create_buffer<T: Prm>(
    _context: &Context,
    flags: MemFlags,
    len: usize,
    host_data: Option<&[T]>,
) -> CoreResult<Mem> {
    if len == 0 {
        return Err(ApiError::new(
            Status::InvalidBufferSize,
            "create_buffer",
            Some("buffer length must be non-zero"),
        )
        .into());
    }
    let size = len * mem::size_of::<T>();
    let bytes = match (flags.contains(MemFlags::COPY_HOST_PTR), host_data) {
        (true, Some(data)) if data.len() == len => util::as_bytes(data).to_vec(),
        (true, _) => {
            return Err(ApiError::new(
                Status::InvalidHostPtr,
                "create_buffer",
                Some("COPY_HOST_PTR requires a host slice of exactly `len` elements"),
            )
            .into());
        }
        (false, Some(_)) => {
            return Err(ApiError::new(
                Status::InvalidHostPtr,
                "create_buffer",
                Some("host data supplied without COPY_HOST_PTR"),
            )
            .into());
        }
        (false, None) => vec![0u8; size],
    };
    Ok(Mem::new(flags, bytes))
}

//============================================================================
//============================ Enqueue APIs ==================================
//============================================================================

/// Enqueues a write from host memory to a buffer.
///
/// The host slice is copied at enqueue time and may be reused immediately
/// after this function returns; `block` controls whether the call also
/// waits for the device-side application of the write.
pub fn enqueue_write_buffer<T: Prm, Ewl: WaitListRef>(
    queue: &CommandQueue,
    buffer: &Mem,
    block: bool,
    offset: usize,
    data: &[T],
    ewait: Option<&Ewl>,
) -> CoreResult<Event> {
    if data.is_empty() {
        return Err(ApiError::new(
            Status::InvalidValue,
            "enqueue_write_buffer",
            Some("source slice is empty"),
        )
        .into());
    }
    let event = queue.submit(
        CommandType::WriteBuffer,
        CommandKind::WriteBuffer {
            mem: buffer.clone(),
            offset: offset * mem::size_of::<T>(),
            data: util::as_bytes(data).to_vec(),
        },
        wait_list_events(ewait),
    )?;
    if block {
        event.wait_for()?;
    }
    Ok(event)
}

/// Enqueues a read from a buffer into host memory and blocks until the
/// data has landed in `data`.
///
/// Reads into borrowed host memory are always blocking; use
/// [`enqueue_read_buffer_to_vec`] for an asynchronous read.
pub fn enqueue_read_buffer<T: Prm, Ewl: WaitListRef>(
    queue: &CommandQueue,
    buffer: &Mem,
    offset: usize,
    data: &mut [T],
    ewait: Option<&Ewl>,
) -> CoreResult<Event> {
    let (event, staging) =
        enqueue_read_buffer_to_vec::<T, Ewl>(queue, buffer, offset, data.len(), ewait)?;
    event.wait_for()?;
    util::copy_to_slice(&staging.take()?, data);
    Ok(event)
}

/// Enqueues an asynchronous read of `len` elements into a driver-owned
/// staging cell.
///
/// The returned staging cell is filled before the returned event reaches
/// the `Complete` state; take the bytes after waiting upon it.
pub fn enqueue_read_buffer_to_vec<T: Prm, Ewl: WaitListRef>(
    queue: &CommandQueue,
    buffer: &Mem,
    offset: usize,
    len: usize,
    ewait: Option<&Ewl>,
) -> CoreResult<(Event, ReadStaging)> {
    if len == 0 {
        return Err(ApiError::new(
            Status::InvalidValue,
            "enqueue_read_buffer_to_vec",
            Some("read length must be non-zero"),
        )
        .into());
    }
    let staging = ReadStaging::new();
    let event = queue.submit(
        CommandType::ReadBuffer,
        CommandKind::ReadBuffer {
            mem: buffer.clone(),
            offset: offset * mem::size_of::<T>(),
            len: len * mem::size_of::<T>(),
            dst: staging.clone(),
        },
        wait_list_events(ewait),
    )?;
    Ok((event, staging))
}

/// Enqueues a copy of `len` elements between two buffers.
pub fn enqueue_copy_buffer<T: Prm, Ewl: WaitListRef>(
    queue: &CommandQueue,
    src: &Mem,
    dst: &Mem,
    src_offset: usize,
    dst_offset: usize,
    len: usize,
    ewait: Option<&Ewl>,
) -> CoreResult<Event> {
    if len == 0 {
        return Err(ApiError::new(
            Status::InvalidValue,
            "enqueue_copy_buffer",
            Some("copy length must be non-zero"),
        )
        .into());
    }
    let elem = mem::size_of::<T>();
    queue.submit(
        CommandType::CopyBuffer,
        CommandKind::CopyBuffer {
            src: src.clone(),
            dst: dst.clone(),
            src_offset: src_offset * elem,
            dst_offset: dst_offset * elem,
            len: len * elem,
        },
        wait_list_events(ewait),
    )
}

/// Enqueues a fill of `len` elements of `pattern` starting at `offset`.
pub fn enqueue_fill_buffer<T: Prm, Ewl: WaitListRef>(
    queue: &CommandQueue,
    buffer: &Mem,
    pattern: T,
    offset: usize,
    len: usize,
    ewait: Option<&Ewl>,
) -> CoreResult<Event> {
    if len == 0 {
        return Err(ApiError::new(
            Status::InvalidValue,
            "enqueue_fill_buffer",
            Some("fill length must be non-zero"),
        )
        .into());
    }
    let elem = mem::size_of::<T>();
    queue.submit(
        CommandType::FillBuffer,
        CommandKind::FillBuffer {
            mem: buffer.clone(),
            pattern: util::as_bytes(slice_of_one(&pattern)).to_vec(),
            offset: offset * elem,
            len: len * elem,
        },
        wait_list_events(ewait),
    )
}

fn slice_of_one<T>(val: &T) -> &[T] {
    ::std::slice::from_ref(val)
}

/// Enqueues a marker command which completes once every event in `ewait`
/// has reached a terminal state, or immediately after all previously
/// enqueued commands when no wait list is given.
pub fn enqueue_marker_with_wait_list<Ewl: WaitListRef>(
    queue: &CommandQueue,
    ewait: Option<&Ewl>,
) -> CoreResult<Event> {
    queue.submit(
        CommandType::Marker,
        CommandKind::Marker,
        wait_list_events(ewait),
    )
}

//============================================================================
//========================== Event Object APIs ===============================
//============================================================================

/// Blocks until the first `num_events` events in `event_list` are complete.
///
/// Exactly one batched wait: every event is driven to a terminal state
/// before this function returns, and if one or more reached the `Error`
/// state the call fails with a [`WaitListError`] identifying each of them.
pub fn wait_for_events<Ewl: WaitListRef>(num_events: u32, event_list: &Ewl) -> CoreResult<()> {
    assert!(event_list.count() >= num_events);

    let mut failures = Vec::new();
    for (index, event) in event_list.events()[..num_events as usize].iter().enumerate() {
        if let Some(status) = event.wait_until_terminal().err_status() {
            failures.push(WaitListFailure {
                index,
                command: event.command_type(),
                status,
            });
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(WaitListError::new(failures).into())
    }
}

/// Blocks until an event is complete.
pub fn wait_for_event(event: &Event) -> CoreResult<()> {
    event.wait_for()
}

/// Returns the status of `event`.
pub fn event_status(event: &Event) -> CoreResult<CommandExecutionStatus> {
    Ok(event.status())
}

/// Returns true if an event is complete, false if not complete.
pub fn event_is_complete(event: &Event) -> CoreResult<bool> {
    event.is_complete()
}

/// Creates an event not already associated with any command.
pub fn create_user_event(_context: &Context) -> CoreResult<Event> {
    Ok(Event::new_user())
}

/// Updates a user event's status.
///
/// Setting the status to `Complete` (or to `Error(..)`) will cause
/// commands waiting upon this event to proceed (or fail). Returns an
/// error if the event is not a user event (created with
/// [`create_user_event`]) or if the requested status is not terminal.
pub fn set_user_event_status(event: &Event, status: CommandExecutionStatus) -> CoreResult<()> {
    if !event.is_user() {
        return Err(ApiError::new(
            Status::InvalidEvent,
            "set_user_event_status",
            Some("not a user event"),
        )
        .into());
    }
    match status {
        CommandExecutionStatus::Complete => {
            event.complete();
            Ok(())
        }
        CommandExecutionStatus::Error(code) => {
            event.fail(code);
            Ok(())
        }
        _ => Err(ApiError::new(
            Status::InvalidValue,
            "set_user_event_status",
            Some(format!("{} is not a terminal status", status)),
        )
        .into()),
    }
}

/// Registers a callback which runs as soon as `event` reaches a terminal
/// state. If the event is already terminal the callback runs immediately
/// on the calling thread.
pub fn set_event_callback(event: &Event, callback: EventCallback) {
    event.set_callback(callback);
}
