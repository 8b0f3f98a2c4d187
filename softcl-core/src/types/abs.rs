//! Abstract handle types for the software device: contexts, command queues,
//! memory objects, events, and the scheduler which drives them.
//!
//! Every handle is a shared-ownership (`Arc`) wrapper; the underlying
//! resource is released when the last clone anywhere is dropped. Status
//! records are only ever mutated by the scheduler (or, for user events, by
//! [`set_user_event_status`][crate::set_user_event_status]); everything
//! else observes.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::slice;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, trace};

use crate::error::{ApiError, EventError, Result as CoreResult};
use crate::types::enums::{CommandExecutionStatus, CommandType, ProfilingInfo, Status};
use crate::types::flags::{CommandQueueProperties, MemFlags};

/// Plain-old-data types which may be stored in device memory.
///
/// ## Safety
///
/// Implementors must be valid for raw byte-wise copies: no pointers, no
/// drop glue, no niche invariants. All initialized bit patterns produced by
/// another value of the same type must be valid.
pub unsafe trait Prm: Copy + Default + PartialEq + Send + Sync + fmt::Debug + 'static {}

macro_rules! impl_prm {
    ($( $ty:ty ),*) => ($( unsafe impl Prm for $ty {} )*);
}

impl_prm!(u8, i8, u16, i16, u32, i32, u64, i64, usize, isize, f32, f64);

/// Types which can be viewed as a contiguous slice of event handles
/// suitable for a single batched wait call.
pub trait WaitListRef {
    /// The contiguous slice of event handles to wait upon.
    fn events(&self) -> &[Event];

    /// The number of events in the list.
    fn count(&self) -> u32 {
        self.events().len() as u32
    }
}

impl WaitListRef for Event {
    fn events(&self) -> &[Event] {
        slice::from_ref(self)
    }
}

impl WaitListRef for [Event] {
    fn events(&self) -> &[Event] {
        self
    }
}

impl WaitListRef for Vec<Event> {
    fn events(&self) -> &[Event] {
        self
    }
}

impl<'a, W> WaitListRef for &'a W
where
    W: WaitListRef + ?Sized,
{
    fn events(&self) -> &[Event] {
        W::events(self)
    }
}

/// A completion callback, invoked exactly once when the event reaches a
/// terminal state.
pub type EventCallback = Box<dyn FnOnce(CommandExecutionStatus) + Send + 'static>;

struct EventState {
    status: CommandExecutionStatus,
    callbacks: Vec<EventCallback>,
    submit_at: Option<Instant>,
    start_at: Option<Instant>,
    end_at: Option<Instant>,
}

struct EventInner {
    command: CommandType,
    is_user: bool,
    profiling: bool,
    queued_at: Instant,
    queue: Weak<QueueInner>,
    state: Mutex<EventState>,
    cvar: Condvar,
}

/// An event representing a command or user created event.
///
/// Cloning an `Event` shares the same underlying operation; two events
/// compare equal iff they refer to the same operation.
#[derive(Clone)]
pub struct Event(Arc<EventInner>);

impl Event {
    fn new(
        command: CommandType,
        is_user: bool,
        profiling: bool,
        queue: Weak<QueueInner>,
        status: CommandExecutionStatus,
    ) -> Event {
        Event(Arc::new(EventInner {
            command,
            is_user,
            profiling,
            queued_at: Instant::now(),
            queue,
            state: Mutex::new(EventState {
                status,
                callbacks: Vec::new(),
                submit_at: None,
                start_at: None,
                end_at: None,
            }),
            cvar: Condvar::new(),
        }))
    }

    pub(crate) fn new_command(command: CommandType, queue: &CommandQueue) -> Event {
        Event::new(
            command,
            false,
            queue.profiling_enabled(),
            Arc::downgrade(&queue.0),
            CommandExecutionStatus::Queued,
        )
    }

    pub(crate) fn new_user() -> Event {
        // User events start out submitted; the host drives them to a
        // terminal state.
        Event::new(
            CommandType::User,
            true,
            false,
            Weak::new(),
            CommandExecutionStatus::Submitted,
        )
    }

    fn lock_state(&self) -> MutexGuard<EventState> {
        self.0.state.lock().expect("event state lock poisoned")
    }

    /// The current execution status. Non-blocking and side-effect free.
    pub fn status(&self) -> CommandExecutionStatus {
        self.lock_state().status
    }

    /// The kind of command this event belongs to.
    pub fn command_type(&self) -> CommandType {
        self.0.command
    }

    /// Returns true if this is a user created event.
    pub fn is_user(&self) -> bool {
        self.0.is_user
    }

    /// The queue this event's command was submitted to, if it is a command
    /// event and the queue is still alive. For diagnostics.
    pub fn queue(&self) -> Option<CommandQueue> {
        self.0.queue.upgrade().map(CommandQueue)
    }

    /// Returns true if the command completed successfully, false if it is
    /// still in flight.
    ///
    /// Fails with the device error if the command reached the `Error`
    /// terminal state.
    pub fn is_complete(&self) -> CoreResult<bool> {
        match self.status() {
            CommandExecutionStatus::Complete => Ok(true),
            CommandExecutionStatus::Error(status) => Err(self.err(status).into()),
            _ => Ok(false),
        }
    }

    /// Blocks the calling thread until this event reaches a terminal state.
    ///
    /// Idempotent: calling it again after completion returns immediately.
    /// Fails with the device error if the terminal state is `Error`.
    pub fn wait_for(&self) -> CoreResult<()> {
        match self.wait_until_terminal() {
            CommandExecutionStatus::Error(status) => Err(self.err(status).into()),
            _ => Ok(()),
        }
    }

    /// Blocks until terminal and returns the terminal status without
    /// converting errors.
    pub(crate) fn wait_until_terminal(&self) -> CommandExecutionStatus {
        let mut state = self.lock_state();
        while !state.status.is_terminal() {
            state = self.0.cvar.wait(state).expect("event state lock poisoned");
        }
        state.status
    }

    /// Registers `callback` to run when this event reaches a terminal
    /// state. If the event is already terminal the callback runs on the
    /// calling thread before this function returns.
    pub fn set_callback(&self, callback: EventCallback) {
        let mut state = self.lock_state();
        if state.status.is_terminal() {
            let status = state.status;
            drop(state);
            callback(status);
        } else {
            state.callbacks.push(callback);
        }
    }

    /// Returns the profiling timestamp for `info`, in nanoseconds relative
    /// to the moment the command was enqueued.
    ///
    /// Fails with `ProfilingInfoNotAvailable` if the owning queue was not
    /// created with `PROFILING_ENABLE`, for user events, or if the command
    /// has not yet reached the requested stage.
    pub fn profiling_info(&self, info: ProfilingInfo) -> CoreResult<u64> {
        if !self.0.profiling {
            return Err(ApiError::new(
                Status::ProfilingInfoNotAvailable,
                "event_profiling_info",
                None::<String>,
            )
            .into());
        }
        let state = self.lock_state();
        let at = match info {
            ProfilingInfo::Queued => Some(self.0.queued_at),
            ProfilingInfo::Submit => state.submit_at,
            ProfilingInfo::Start => state.start_at,
            ProfilingInfo::End => state.end_at,
        };
        match at {
            Some(at) => Ok(at.duration_since(self.0.queued_at).as_nanos() as u64),
            None => Err(ApiError::new(
                Status::ProfilingInfoNotAvailable,
                "event_profiling_info",
                Some(format!("{:?} not yet reached", info)),
            )
            .into()),
        }
    }

    fn err(&self, status: Status) -> EventError {
        EventError {
            status,
            command: self.0.command,
        }
    }

    // ---- Scheduler-side transitions. ----

    pub(crate) fn mark_submitted(&self) {
        let mut state = self.lock_state();
        if state.status == CommandExecutionStatus::Queued {
            state.status = CommandExecutionStatus::Submitted;
            state.submit_at = Some(Instant::now());
        }
    }

    pub(crate) fn mark_running(&self) {
        let mut state = self.lock_state();
        if !state.status.is_terminal() {
            state.status = CommandExecutionStatus::Running;
            state.start_at = Some(Instant::now());
        }
    }

    pub(crate) fn complete(&self) {
        self.finish_with(CommandExecutionStatus::Complete);
    }

    pub(crate) fn fail(&self, status: Status) {
        self.finish_with(CommandExecutionStatus::Error(status));
    }

    fn finish_with(&self, status: CommandExecutionStatus) {
        debug_assert!(status.is_terminal());
        let callbacks = {
            let mut state = self.lock_state();
            if state.status.is_terminal() {
                return;
            }
            state.status = status;
            state.end_at = Some(Instant::now());
            self.0.cvar.notify_all();
            mem::take(&mut state.callbacks)
        };
        // Run callbacks outside the state lock; a callback may itself
        // query this event.
        for callback in callbacks {
            callback(status);
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Event) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Event")
            .field("command", &self.0.command)
            .field("status", &self.status())
            .finish()
    }
}

/// The destination cell of an asynchronous device-to-host read.
///
/// Filled by the scheduler before the associated event is marked complete;
/// the bytes may be taken exactly once after waiting upon that event.
#[derive(Debug, Clone)]
pub struct ReadStaging(Arc<Mutex<Option<Vec<u8>>>>);

impl ReadStaging {
    pub(crate) fn new() -> ReadStaging {
        ReadStaging(Arc::new(Mutex::new(None)))
    }

    pub(crate) fn fill(&self, bytes: Vec<u8>) {
        *self.0.lock().expect("read staging lock poisoned") = Some(bytes);
    }

    /// Takes the read bytes out of the cell.
    ///
    /// Fails with `InvalidOperation` if the cell has not been filled (the
    /// read has not completed) or if the bytes have already been taken.
    pub fn take(&self) -> CoreResult<Vec<u8>> {
        self.0
            .lock()
            .expect("read staging lock poisoned")
            .take()
            .ok_or_else(|| {
                ApiError::new(
                    Status::InvalidOperation,
                    "ReadStaging::take",
                    Some("staging cell is empty (read not complete or bytes already taken)"),
                )
                .into()
            })
    }
}

struct MemInner {
    flags: MemFlags,
    size: usize,
    bytes: Mutex<Vec<u8>>,
}

/// A device memory object. Byte addressed; shared ownership.
#[derive(Clone)]
pub struct Mem(Arc<MemInner>);

impl Mem {
    pub(crate) fn new(flags: MemFlags, bytes: Vec<u8>) -> Mem {
        let size = bytes.len();
        Mem(Arc::new(MemInner {
            flags,
            size,
            bytes: Mutex::new(bytes),
        }))
    }

    /// The size of this memory object in bytes.
    pub fn size(&self) -> usize {
        self.0.size
    }

    /// The flags this memory object was created with.
    pub fn flags(&self) -> MemFlags {
        self.0.flags
    }

    fn lock_bytes(&self) -> MutexGuard<Vec<u8>> {
        self.0.bytes.lock().expect("device memory lock poisoned")
    }

    fn check_region(&self, offset: usize, len: usize) -> Result<(), Status> {
        match offset.checked_add(len) {
            Some(end) if end <= self.0.size => Ok(()),
            _ => Err(Status::InvalidBufferSize),
        }
    }

    pub(crate) fn write_bytes(&self, offset: usize, data: &[u8]) -> Result<(), Status> {
        self.check_region(offset, data.len())?;
        self.lock_bytes()[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    pub(crate) fn read_bytes(&self, offset: usize, len: usize) -> Result<Vec<u8>, Status> {
        self.check_region(offset, len)?;
        Ok(self.lock_bytes()[offset..offset + len].to_vec())
    }

    pub(crate) fn fill_bytes(
        &self,
        offset: usize,
        pattern: &[u8],
        len: usize,
    ) -> Result<(), Status> {
        if pattern.is_empty() || len % pattern.len() != 0 {
            return Err(Status::InvalidValue);
        }
        self.check_region(offset, len)?;
        let mut bytes = self.lock_bytes();
        for chunk in bytes[offset..offset + len].chunks_mut(pattern.len()) {
            chunk.copy_from_slice(pattern);
        }
        Ok(())
    }

    pub(crate) fn copy_bytes_to(
        &self,
        dst: &Mem,
        src_offset: usize,
        dst_offset: usize,
        len: usize,
    ) -> Result<(), Status> {
        self.check_region(src_offset, len)?;
        dst.check_region(dst_offset, len)?;

        if Arc::ptr_eq(&self.0, &dst.0) {
            let src_end = src_offset + len;
            let dst_end = dst_offset + len;
            if src_offset < dst_end && dst_offset < src_end {
                return Err(Status::MemCopyOverlap);
            }
            let mut bytes = self.lock_bytes();
            bytes.copy_within(src_offset..src_end, dst_offset);
            return Ok(());
        }

        // Lock in address order so two opposing copies cannot deadlock.
        let (first, second) = if Arc::as_ptr(&self.0) < Arc::as_ptr(&dst.0) {
            (self, dst)
        } else {
            (dst, self)
        };
        let first_guard = first.lock_bytes();
        let second_guard = second.lock_bytes();
        let (src_guard, mut dst_guard) = if Arc::ptr_eq(&first.0, &self.0) {
            (first_guard, second_guard)
        } else {
            (second_guard, first_guard)
        };
        dst_guard[dst_offset..dst_offset + len]
            .copy_from_slice(&src_guard[src_offset..src_offset + len]);
        Ok(())
    }
}

impl PartialEq for Mem {
    fn eq(&self, other: &Mem) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Mem {}

impl fmt::Debug for Mem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Mem")
            .field("size", &self.0.size)
            .field("flags", &self.0.flags)
            .finish()
    }
}

struct ContextInner {
    _priv: (),
}

/// A device context. Groups queues, memory objects, and user events.
///
/// The software device carries no per-context configuration; the handle
/// exists for identity and as the creation point for resources.
#[derive(Clone)]
pub struct Context(Arc<ContextInner>);

impl Context {
    pub(crate) fn new() -> Context {
        Context(Arc::new(ContextInner { _priv: () }))
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Context {}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &(Arc::as_ptr(&self.0) as usize))
            .finish()
    }
}

pub(crate) enum CommandKind {
    WriteBuffer {
        mem: Mem,
        offset: usize,
        data: Vec<u8>,
    },
    ReadBuffer {
        mem: Mem,
        offset: usize,
        len: usize,
        dst: ReadStaging,
    },
    CopyBuffer {
        src: Mem,
        dst: Mem,
        src_offset: usize,
        dst_offset: usize,
        len: usize,
    },
    FillBuffer {
        mem: Mem,
        pattern: Vec<u8>,
        offset: usize,
        len: usize,
    },
    Marker,
}

pub(crate) struct Command {
    kind: CommandKind,
    event: Event,
    wait_list: Vec<Event>,
}

struct QueueInner {
    context: Context,
    properties: CommandQueueProperties,
    tx: Option<Sender<Command>>,
    worker: Option<JoinHandle<()>>,
}

/// A command queue for the software device.
///
/// Each queue owns one in-order worker thread; commands execute in
/// submission order, each gated on its prerequisite wait list. Dropping
/// the last handle to a queue drains already-submitted commands before the
/// worker exits, so no event is left stranded in a non-terminal state.
#[derive(Clone)]
pub struct CommandQueue(Arc<QueueInner>);

impl CommandQueue {
    pub(crate) fn new(
        context: Context,
        properties: CommandQueueProperties,
    ) -> CoreResult<CommandQueue> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker = thread::Builder::new()
            .name("softcl-queue".to_owned())
            .spawn(move || run_queue(rx))
            .map_err(|err| {
                ApiError::new(
                    Status::OutOfResources,
                    "create_command_queue",
                    Some(format!("failed to spawn queue worker: {}", err)),
                )
            })?;
        Ok(CommandQueue(Arc::new(QueueInner {
            context,
            properties,
            tx: Some(tx),
            worker: Some(worker),
        })))
    }

    /// The context this queue belongs to.
    pub fn context(&self) -> Context {
        self.0.context.clone()
    }

    /// The properties this queue was created with.
    pub fn properties(&self) -> CommandQueueProperties {
        self.0.properties
    }

    /// Returns true if this queue records profiling timestamps.
    pub fn profiling_enabled(&self) -> bool {
        self.0
            .properties
            .contains(CommandQueueProperties::PROFILING_ENABLE)
    }

    pub(crate) fn submit(
        &self,
        command_type: CommandType,
        kind: CommandKind,
        wait_list: Vec<Event>,
    ) -> CoreResult<Event> {
        let event = Event::new_command(command_type, self);
        trace!("submitting {} command to queue", command_type);
        let command = Command {
            kind,
            event: event.clone(),
            wait_list,
        };
        let sent = match self.0.tx.as_ref() {
            Some(tx) => tx.send(command).is_ok(),
            None => false,
        };
        if sent {
            Ok(event)
        } else {
            Err(ApiError::new(
                Status::DeviceNotAvailable,
                "enqueue",
                Some(format!("queue worker is gone ({} command)", command_type)),
            )
            .into())
        }
    }
}

impl PartialEq for CommandQueue {
    fn eq(&self, other: &CommandQueue) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CommandQueue {}

impl fmt::Debug for CommandQueue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CommandQueue")
            .field("context", &self.0.context)
            .field("properties", &self.0.properties)
            .finish()
    }
}

impl Drop for QueueInner {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain outstanding commands
        // and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_queue(rx: Receiver<Command>) {
    debug!("queue worker started");
    for command in rx.iter() {
        execute_command(command);
    }
    debug!("queue worker shutting down");
}

fn execute_command(command: Command) {
    let Command {
        kind,
        event,
        wait_list,
    } = command;

    event.mark_submitted();

    // Hold the command until every prerequisite is terminal. All
    // prerequisites are waited upon even if one fails.
    let mut prerequisite_failed = false;
    for prerequisite in &wait_list {
        if prerequisite.wait_until_terminal().err_status().is_some() {
            prerequisite_failed = true;
        }
    }
    if prerequisite_failed {
        trace!(
            "{} command not executed: event in wait list failed",
            event.command_type()
        );
        event.fail(Status::ExecStatusErrorForEventsInWaitList);
        return;
    }

    event.mark_running();
    let result = match kind {
        CommandKind::WriteBuffer { mem, offset, data } => mem.write_bytes(offset, &data),
        CommandKind::ReadBuffer {
            mem,
            offset,
            len,
            dst,
        } => mem.read_bytes(offset, len).map(|bytes| dst.fill(bytes)),
        CommandKind::CopyBuffer {
            src,
            dst,
            src_offset,
            dst_offset,
            len,
        } => src.copy_bytes_to(&dst, src_offset, dst_offset, len),
        CommandKind::FillBuffer {
            mem,
            pattern,
            offset,
            len,
        } => mem.fill_bytes(offset, &pattern, len),
        CommandKind::Marker => Ok(()),
    };

    match result {
        Ok(()) => event.complete(),
        Err(status) => {
            trace!("{} command failed: {}", event.command_type(), status);
            event.fail(status);
        }
    }
}
