//! A future pairing an event with a deferred result value.

use std::fmt;

use futures::{Async, Future, Poll};

use crate::core::{util, Prm, ReadStaging};
use crate::error::{Error, Result as OclResult};
use crate::standard::Event;

enum Deferred<T> {
    /// The value was materialized at enqueue time (completion-only
    /// operations resolve to `()` this way).
    Ready(T),
    /// The value lives in a driver-filled staging cell until the event
    /// completes.
    Staged(ReadStaging, fn(&[u8]) -> T),
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Deferred::Ready(..) => f.write_str("Deferred::Ready(..)"),
            Deferred::Staged(ref staging, _) => {
                f.debug_tuple("Deferred::Staged").field(staging).finish()
            }
        }
    }
}

/// An event paired with a deferred result of type `T`.
///
/// The value is not valid for reading until the event reaches a terminal
/// state; every read is routed through [`wait`][FutureValue::wait] /
/// [`get`][FutureValue::get], so an early read cannot be expressed. On a
/// failed operation `get` returns the device error, never a default value.
///
/// The underlying event is exposed explicitly via
/// [`event`][FutureValue::event] / [`into_event`][FutureValue::into_event]
/// (for example, to push it into an [`EventList`][crate::EventList]);
/// there is no implicit conversion.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct FutureValue<T> {
    event: Event,
    value: Option<Deferred<T>>,
}

impl<T> FutureValue<T> {
    /// Pairs `event` with an already-materialized value, readable once the
    /// event completes.
    pub fn with_value(event: Event, value: T) -> FutureValue<T> {
        FutureValue {
            event,
            value: Some(Deferred::Ready(value)),
        }
    }

    /// Blocks the calling thread until the underlying event reaches a
    /// terminal state.
    ///
    /// Delegates to [`Event::wait_for`]; fails with the device error if the
    /// operation failed. Does not consume the deferred value.
    pub fn wait(&self) -> OclResult<()> {
        self.event.wait_for()
    }

    /// Blocks until the operation completes, then returns the deferred
    /// value.
    ///
    /// Fails with the device error if the operation failed.
    pub fn get(mut self) -> OclResult<T> {
        self.event.wait_for()?;
        self.take_value()
    }

    /// The underlying event.
    #[inline]
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Consumes this future, returning the underlying event and discarding
    /// the deferred value.
    #[inline]
    pub fn into_event(self) -> Event {
        self.event
    }

    fn take_value(&mut self) -> OclResult<T> {
        match self.value.take() {
            Some(Deferred::Ready(value)) => Ok(value),
            Some(Deferred::Staged(staging, convert)) => Ok(convert(&staging.take()?)),
            None => Err(Error::ValueTaken),
        }
    }
}

impl FutureValue<()> {
    /// Wraps a completion-only operation as a future resolving to unit.
    pub fn from_event(event: Event) -> FutureValue<()> {
        FutureValue::with_value(event, ())
    }
}

impl<T: Prm> FutureValue<Vec<T>> {
    pub(crate) fn staged(event: Event, staging: ReadStaging) -> FutureValue<Vec<T>> {
        FutureValue {
            event,
            value: Some(Deferred::Staged(staging, util::vec_from_bytes::<T>)),
        }
    }
}

impl<T> Future for FutureValue<T> {
    type Item = T;
    type Error = Error;

    #[cfg(not(feature = "async_block"))]
    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        match self.event.is_complete() {
            Ok(true) => self.take_value().map(Async::Ready),
            Ok(false) => {
                self.event.set_unpark_callback()?;
                Ok(Async::NotReady)
            }
            Err(err) => Err(err),
        }
    }

    // Blocking implementation (yuk).
    #[cfg(feature = "async_block")]
    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        self.event.wait_for()?;
        self.take_value().map(Async::Ready)
    }
}
