//! An event representing an asynchronous device operation, and lists
//! thereof.

use std::ops::{Deref, DerefMut};
use std::slice;

#[cfg(not(feature = "async_block"))]
use futures::task;
use futures::{Async, Future, Poll};

use crate::core::{
    self, CommandExecutionStatus, CommandType, Event as EventCore, ProfilingInfo, Status,
    WaitListRef,
};
use crate::error::{Error, Result as OclResult};
use crate::r#async::FutureValue;
use crate::standard::{Context, Queue};

/// An event representing a command or user created event.
///
/// Cloning an `Event` shares the underlying operation handle rather than
/// duplicating the operation; two events compare equal iff they refer to
/// the same operation. The handle's native resources are released when the
/// last clone anywhere (including those held by an [`EventList`] or a
/// [`FutureValue`]) is dropped.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
#[must_use = "futures do nothing unless polled"]
pub struct Event(EventCore);

impl Event {
    /// Creates a new user event, not associated with any command.
    ///
    /// The host drives it to a terminal state with [`Event::set_complete`]
    /// or [`Event::set_error`]; commands whose wait lists contain it are
    /// held until then.
    pub fn user(context: &Context) -> OclResult<Event> {
        core::create_user_event(context.as_core())
            .map(Event)
            .map_err(Error::from)
    }

    /// The current execution status of the associated command.
    ///
    /// Purely observational; never blocks and has no effect on the
    /// underlying operation.
    #[inline]
    pub fn status(&self) -> CommandExecutionStatus {
        self.0.status()
    }

    /// Returns true if the command completed successfully, false if it is
    /// still in flight. Fails with the device error if the command failed.
    #[inline]
    pub fn is_complete(&self) -> OclResult<bool> {
        self.0.is_complete().map_err(Error::from)
    }

    /// Blocks the calling thread until this operation reaches a terminal
    /// state.
    ///
    /// Idempotent: calling it again after completion returns immediately.
    /// Fails with the underlying device error if the terminal state is an
    /// error.
    pub fn wait_for(&self) -> OclResult<()> {
        self.0.wait_for().map_err(Error::from)
    }

    /// The kind of command this event belongs to.
    #[inline]
    pub fn command_type(&self) -> CommandType {
        self.0.command_type()
    }

    /// This event's associated command queue, if it is a command event and
    /// the queue is still alive. For diagnostics.
    pub fn queue(&self) -> Option<Queue> {
        self.0.queue().map(Queue::from_core)
    }

    /// The profiling timestamp for `info` in nanoseconds, if the owning
    /// queue records profiling information.
    pub fn profiling_info(&self, info: ProfilingInfo) -> OclResult<u64> {
        self.0.profiling_info(info).map_err(Error::from)
    }

    /// Sets a user event's status to complete, releasing any commands
    /// waiting upon it. Fails if this is not a user event.
    pub fn set_complete(&self) -> OclResult<()> {
        core::set_user_event_status(&self.0, CommandExecutionStatus::Complete)
            .map_err(Error::from)
    }

    /// Sets a user event's status to the given error, failing any commands
    /// waiting upon it. Fails if this is not a user event.
    pub fn set_error(&self, status: Status) -> OclResult<()> {
        core::set_user_event_status(&self.0, CommandExecutionStatus::Error(status))
            .map_err(Error::from)
    }

    /// Registers a callback which will notify the current task upon
    /// completion of this event.
    ///
    /// To be used within the context of a futures task.
    #[cfg(not(feature = "async_block"))]
    pub fn set_unpark_callback(&self) -> OclResult<()> {
        let task = task::current();
        core::set_event_callback(&self.0, Box::new(move |_status| task.notify()));
        Ok(())
    }

    /// Returns a reference to the core event, usable by functions in the
    /// `core` module.
    #[inline]
    pub fn as_core(&self) -> &EventCore {
        &self.0
    }

    /// Consumes the `Event`, returning the wrapped core event.
    #[inline]
    pub fn into_core(self) -> EventCore {
        self.0
    }
}

impl From<EventCore> for Event {
    #[inline]
    fn from(ev: EventCore) -> Event {
        Event(ev)
    }
}

impl From<Event> for EventCore {
    #[inline]
    fn from(ev: Event) -> EventCore {
        ev.0
    }
}

impl Deref for Event {
    type Target = EventCore;

    fn deref(&self) -> &EventCore {
        &self.0
    }
}

impl DerefMut for Event {
    fn deref_mut(&mut self) -> &mut EventCore {
        &mut self.0
    }
}

impl AsRef<EventCore> for Event {
    fn as_ref(&self) -> &EventCore {
        &self.0
    }
}

impl WaitListRef for Event {
    #[inline]
    fn events(&self) -> &[EventCore] {
        slice::from_ref(&self.0)
    }
}

impl Future for Event {
    type Item = ();
    type Error = Error;

    #[cfg(not(feature = "async_block"))]
    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        match self.is_complete() {
            Ok(true) => Ok(Async::Ready(())),
            Ok(false) => {
                self.set_unpark_callback()?;
                Ok(Async::NotReady)
            }
            Err(err) => Err(err),
        }
    }

    // Blocking implementation (yuk).
    #[cfg(feature = "async_block")]
    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        self.wait_for()?;
        Ok(Async::Ready(()))
    }
}

/// Views a slice of standard events as a slice of core events.
//
// Sound: `Event` is a `#[repr(transparent)]` wrapper over `EventCore`.
pub(crate) fn core_events(events: &[Event]) -> &[EventCore] {
    unsafe { slice::from_raw_parts(events.as_ptr() as *const EventCore, events.len()) }
}

/// Polls events for `EventList`.
fn poll_events(events: &[Event]) -> Poll<(), Error> {
    for event in events.iter() {
        if cfg!(feature = "async_block") {
            event.wait_for()?;
        } else if !event.is_complete()? {
            #[cfg(not(feature = "async_block"))]
            event.set_unpark_callback()?;
            return Ok(Async::NotReady);
        }
    }
    Ok(Async::Ready(()))
}

/// An ordered list of events used to wait upon many operations with a
/// single batched blocking call.
///
/// Events are kept in insertion order and are never deduplicated. Pushing
/// an event shares ownership of its handle, so the list keeps the
/// operation's native resources alive even if every other handle is
/// dropped. Mutation requires `&mut self`; a single list must not be
/// mutated from multiple threads without external synchronization, which
/// the borrow rules enforce.
///
/// [`wait_for`][EventList::wait_for] on a non-empty list issues exactly
/// one batched driver-level wait call covering every contained handle,
/// never one wait per event.
#[derive(Debug, Clone, Default)]
#[must_use = "futures do nothing unless polled"]
pub struct EventList {
    events: Vec<Event>,
}

impl EventList {
    /// Returns a new, empty `EventList`.
    #[inline]
    pub fn new() -> EventList {
        EventList { events: Vec::new() }
    }

    /// Returns a new, empty `EventList` with an initial capacity of `cap`.
    #[inline]
    pub fn with_capacity(cap: usize) -> EventList {
        EventList {
            events: Vec::with_capacity(cap),
        }
    }

    /// Appends an event to the list, preserving insertion order.
    #[inline]
    pub fn push<E: Into<Event>>(&mut self, event: E) {
        self.events.push(event.into());
    }

    /// Appends a future's underlying event to the list.
    ///
    /// The future's result slot is not touched; only the completion handle
    /// is shared.
    #[inline]
    pub fn push_future<T>(&mut self, future: &FutureValue<T>) {
        self.push(future.event().clone());
    }

    /// Removes the last event from the list and returns it.
    #[inline]
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop()
    }

    /// Clears all events from the list whether or not they have completed,
    /// releasing this list's references to them. Events retained elsewhere
    /// are unaffected. A no-op on an empty list.
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Clears events which have already completed.
    ///
    /// Fails with the first device error encountered; events whose
    /// operations failed remain in the list.
    pub fn clear_completed(&mut self) -> OclResult<()> {
        let mut first_err = None;
        self.events.retain(|event| match event.is_complete() {
            Ok(complete) => !complete,
            Err(err) => {
                if first_err.is_none() {
                    first_err = Some(err);
                }
                true
            }
        });
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Blocks the host thread until every event in this list has reached a
    /// terminal state.
    ///
    /// An empty list returns immediately and successfully. A non-empty
    /// list is waited upon with a single batched driver call; if one or
    /// more operations failed, the call fails with an aggregate error
    /// identifying each of them, and every other event has still been
    /// fully waited upon. Idempotent once all events are terminal.
    pub fn wait_for(&self) -> OclResult<()> {
        if self.events.is_empty() {
            return Ok(());
        }
        core::wait_for_events(self.events.len() as u32, self).map_err(Error::from)
    }

    /// Enqueues a marker command on `queue` representing the completion of
    /// each and every event in this list.
    pub fn enqueue_marker(&self, queue: &Queue) -> OclResult<Event> {
        if self.events.is_empty() {
            return Err("EventList::enqueue_marker: list is empty".into());
        }
        queue.enqueue_marker(Some(self))
    }

    /// The number of events in this list.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if this list contains no events.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the contiguous slice of contained events, i.e. the handle
    /// array passed to the batched wait call. Empty iff the list is empty.
    #[inline]
    pub fn as_slice(&self) -> &[Event] {
        &self.events
    }

    /// Returns a mutable slice of the contained events.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Event] {
        &mut self.events
    }
}

impl WaitListRef for EventList {
    #[inline]
    fn events(&self) -> &[EventCore] {
        core_events(&self.events)
    }
}

impl Deref for EventList {
    type Target = [Event];

    #[inline]
    fn deref(&self) -> &[Event] {
        self.as_slice()
    }
}

impl DerefMut for EventList {
    #[inline]
    fn deref_mut(&mut self) -> &mut [Event] {
        self.as_mut_slice()
    }
}

impl From<Event> for EventList {
    #[inline]
    fn from(event: Event) -> EventList {
        EventList {
            events: vec![event],
        }
    }
}

impl<'a> From<&'a Event> for EventList {
    #[inline]
    fn from(event: &Event) -> EventList {
        EventList {
            events: vec![event.clone()],
        }
    }
}

impl From<EventCore> for EventList {
    #[inline]
    fn from(event: EventCore) -> EventList {
        EventList {
            events: vec![event.into()],
        }
    }
}

impl From<Vec<Event>> for EventList {
    #[inline]
    fn from(events: Vec<Event>) -> EventList {
        EventList { events }
    }
}

impl<'a, E> From<&'a [E]> for EventList
where
    E: Into<Event> + Clone,
{
    fn from(events: &[E]) -> EventList {
        EventList {
            events: events.iter().map(|e| e.clone().into()).collect(),
        }
    }
}

// Fixed-size-array conversions: semantically identical to pushing each
// element left to right.
macro_rules! impl_event_list_from_arrays {
    ($( $len:expr ),*) => ($(
        impl<E> From<[E; $len]> for EventList where E: Into<Event> {
            fn from(events: [E; $len]) -> EventList {
                let mut el = EventList::with_capacity(events.len());
                for event in events {
                    el.push(event.into());
                }
                el
            }
        }
    )*);
}

impl_event_list_from_arrays!(1, 2, 3, 4, 5, 6, 7, 8);

impl Extend<Event> for EventList {
    fn extend<I: IntoIterator<Item = Event>>(&mut self, iter: I) {
        self.events.extend(iter);
    }
}

impl IntoIterator for EventList {
    type Item = Event;
    type IntoIter = ::std::vec::IntoIter<Event>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a EventList {
    type Item = &'a Event;
    type IntoIter = slice::Iter<'a, Event>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl Future for EventList {
    type Item = ();
    type Error = Error;

    /// Polls each event from this list.
    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        poll_events(self.as_slice())
    }
}
