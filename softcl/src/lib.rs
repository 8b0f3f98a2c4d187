//! High-level interfaces for coordinating asynchronous operations on a
//! software accelerator device.
//!
//! Host code submits writes, reads, copies, and fills to a command
//! [`Queue`]; every asynchronous submission returns an [`Event`] tracking
//! that operation's completion. Events aggregate into an [`EventList`],
//! which blocks on all of them with a single batched wait call, and
//! operations which produce a value return a [`FutureValue`] pairing the
//! event with the deferred result.
//!
//! ```rust
//! use softcl::{Buffer, Context, EventList, Queue};
//!
//! fn main() -> softcl::Result<()> {
//!     let context = Context::new();
//!     let queue = Queue::new(&context, None)?;
//!     let buffer = Buffer::<i32>::builder().queue(queue.clone()).len(8).build()?;
//!
//!     // Two independent asynchronous writes:
//!     let first = buffer.write(&[1, 2, 3, 4]).enq_async()?;
//!     let second = buffer.write(&[5, 6, 7, 8]).offset(4).enq_async()?;
//!
//!     // One batched wait for both:
//!     let mut events = EventList::new();
//!     events.push(first);
//!     events.push(second);
//!     events.wait_for()?;
//!
//!     let mut read = vec![0i32; 8];
//!     buffer.read(&mut read).enq()?;
//!     assert_eq!(read, vec![1, 2, 3, 4, 5, 6, 7, 8]);
//!     Ok(())
//! }
//! ```
//!
//! ## Foundations
//!
//! For the driver level (the in-process device scheduler and the flat
//! function API) see the `softcl-core` crate, re-exported here as
//! [`core`].

pub use softcl_core as core;

#[cfg(test)]
mod tests;

mod standard;
pub mod error;
pub mod r#async;

pub use self::r#async::FutureValue;
pub use self::standard::{
    Buffer, BufferBuilder, BufferCmd, BufferCmdError, BufferCmdKind, BufferReadAsyncCmd,
    BufferReadCmd, BufferWriteCmd, Context, Event, EventList, Queue, WaitListEnum,
};

pub use crate::error::{Error, Result};

#[doc(no_inline)]
pub use crate::core::{
    CommandExecutionStatus, CommandQueueProperties, CommandType, Error as CoreError, MemFlags,
    ProfilingInfo, Status,
};

pub mod traits {
    //! Commonly used traits.

    pub use crate::core::{Prm, WaitListRef};
}

pub mod flags {
    //! Bitflags for various parameter types.

    pub use crate::core::{CommandQueueProperties, MemFlags};
}
