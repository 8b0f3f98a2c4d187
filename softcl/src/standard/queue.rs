//! A command queue for the software device.

use std::ops::Deref;

use crate::core::{self, CommandQueue as CommandQueueCore, CommandQueueProperties};
use crate::error::{Error, Result as OclResult};
use crate::standard::{Context, Event, WaitListEnum};

/// A command queue which manages all actions taken on buffers.
///
/// Each queue owns one in-order device worker; commands submitted to the
/// same queue execute in submission order. Ordering across queues is only
/// established through event wait lists.
#[derive(Clone, Debug, PartialEq)]
pub struct Queue {
    obj_core: CommandQueueCore,
}

impl Queue {
    /// Returns a new queue within `context`.
    pub fn new(context: &Context, properties: Option<CommandQueueProperties>) -> OclResult<Queue> {
        core::create_command_queue(context.as_core(), properties)
            .map(|obj_core| Queue { obj_core })
            .map_err(Error::from)
    }

    pub(crate) fn from_core(obj_core: CommandQueueCore) -> Queue {
        Queue { obj_core }
    }

    /// Issues all previously queued commands to the device.
    pub fn flush(&self) -> OclResult<()> {
        core::flush(&self.obj_core).map_err(Error::from)
    }

    /// Blocks until all commands in this queue have completed before
    /// returning.
    pub fn finish(&self) -> OclResult<()> {
        core::finish(&self.obj_core).map_err(Error::from)
    }

    /// Enqueues a marker command which waits for either a list of events
    /// to complete, or all previously enqueued commands to complete.
    pub fn enqueue_marker<'e, Ewl>(&self, ewait: Option<Ewl>) -> OclResult<Event>
    where
        Ewl: Into<WaitListEnum<'e>>,
    {
        let ewait = ewait.map(Into::into);
        core::enqueue_marker_with_wait_list(&self.obj_core, ewait.as_ref())
            .map(Event::from)
            .map_err(Error::from)
    }

    /// Returns a copy of the context associated with this queue.
    pub fn context(&self) -> Context {
        Context::from(self.obj_core.context())
    }

    /// The properties this queue was created with.
    pub fn properties(&self) -> CommandQueueProperties {
        self.obj_core.properties()
    }

    /// Returns a reference to the core queue, usable by functions in the
    /// `core` module.
    #[inline]
    pub fn as_core(&self) -> &CommandQueueCore {
        &self.obj_core
    }
}

impl AsRef<Queue> for Queue {
    fn as_ref(&self) -> &Queue {
        self
    }
}

impl AsRef<CommandQueueCore> for Queue {
    fn as_ref(&self) -> &CommandQueueCore {
        &self.obj_core
    }
}

impl Deref for Queue {
    type Target = CommandQueueCore;

    fn deref(&self) -> &CommandQueueCore {
        &self.obj_core
    }
}
