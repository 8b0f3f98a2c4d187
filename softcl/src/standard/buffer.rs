//! A typed device buffer and its command builders.

use std::marker::PhantomData;

use crate::core::{self, Mem as MemCore, MemFlags, Prm};
use crate::error::{Error, Result as OclResult};
use crate::r#async::FutureValue;
use crate::standard::{Context, Event, Queue, WaitListEnum};

/// A buffer command error.
#[derive(Debug, thiserror::Error)]
pub enum BufferCmdError {
    #[error("no queue specified")]
    NoQueue,
    #[error("command operation kind not specified; use `::copy` or `::fill`")]
    UnspecifiedKind,
}

/// The type of operation to be performed by a command.
pub enum BufferCmdKind<'c, T> {
    Unspecified,
    Copy {
        dst_buffer: &'c MemCore,
        dst_offset: Option<usize>,
        len: Option<usize>,
    },
    Fill {
        pattern: T,
        len: Option<usize>,
    },
}

impl<'c, T> BufferCmdKind<'c, T> {
    fn is_unspec(&self) -> bool {
        matches!(*self, BufferCmdKind::Unspecified)
    }
}

/// A buffer command builder used to enqueue copies and fills.
///
/// Create one with [`Buffer::cmd`], or jump straight to a read or write
/// with the [`Buffer::read`] and [`Buffer::write`] shortcuts.
///
/// ## Examples
///
/// ```rust,ignore
/// // Copies one buffer to another:
/// src_buffer.cmd().copy(&dst_buffer, None, None).enq()?;
///
/// // Writes from a slice to a buffer, waiting on an event:
/// buffer.write(&src_vec).ewait(&event).enq()?;
///
/// // Asynchronously writes a pair of values at an offset:
/// let event = buffer.write(&two_vals).offset(6).enq_async()?;
/// ```
#[must_use = "commands do nothing unless enqueued"]
pub struct BufferCmd<'c, T: Prm> {
    buffer: &'c Buffer<T>,
    queue: Option<&'c Queue>,
    kind: BufferCmdKind<'c, T>,
    offset: usize,
    ewait: Option<WaitListEnum<'c>>,
}

impl<'c, T: Prm> BufferCmd<'c, T> {
    fn new(buffer: &'c Buffer<T>) -> BufferCmd<'c, T> {
        BufferCmd {
            buffer,
            queue: buffer.queue.as_ref(),
            kind: BufferCmdKind::Unspecified,
            offset: 0,
            ewait: None,
        }
    }

    /// Specifies a queue to use for this call only.
    pub fn queue(mut self, queue: &'c Queue) -> BufferCmd<'c, T> {
        self.queue = Some(queue);
        self
    }

    /// Sets the linear offset for this command, in elements.
    pub fn offset(mut self, offset: usize) -> BufferCmd<'c, T> {
        self.offset = offset;
        self
    }

    /// Specifies an event or list of events to wait on before the command
    /// will run.
    pub fn ewait<Ewl>(mut self, ewait: Ewl) -> BufferCmd<'c, T>
    where
        Ewl: Into<WaitListEnum<'c>>,
    {
        self.ewait = Some(ewait.into());
        self
    }

    /// Specifies that this command will be a copy operation.
    ///
    /// If `dst_offset` is unspecified it defaults to zero; if `len` is
    /// unspecified it defaults to the remainder of this buffer past the
    /// source offset.
    ///
    /// ## Panics
    ///
    /// The command operation kind must not have already been specified.
    pub fn copy(
        mut self,
        dst_buffer: &'c Buffer<T>,
        dst_offset: Option<usize>,
        len: Option<usize>,
    ) -> BufferCmd<'c, T> {
        assert!(
            self.kind.is_unspec(),
            "BufferCmd::copy: operation kind already set for this command"
        );
        self.kind = BufferCmdKind::Copy {
            dst_buffer: dst_buffer.as_core(),
            dst_offset,
            len,
        };
        self
    }

    /// Specifies that this command will be a fill operation, writing
    /// `pattern` to `len` elements (or to the remainder of the buffer past
    /// the offset when unspecified).
    ///
    /// ## Panics
    ///
    /// The command operation kind must not have already been specified.
    pub fn fill(mut self, pattern: T, len: Option<usize>) -> BufferCmd<'c, T> {
        assert!(
            self.kind.is_unspec(),
            "BufferCmd::fill: operation kind already set for this command"
        );
        self.kind = BufferCmdKind::Fill { pattern, len };
        self
    }

    /// Turns this command into a read into `dst`.
    ///
    /// ## Panics
    ///
    /// The command operation kind must not have already been specified.
    pub fn read<'d>(self, dst: &'d mut [T]) -> BufferReadCmd<'c, 'd, T> {
        assert!(
            self.kind.is_unspec(),
            "BufferCmd::read: operation kind already set for this command"
        );
        BufferReadCmd {
            buffer: self.buffer,
            queue: self.queue,
            offset: self.offset,
            ewait: self.ewait,
            dst,
        }
    }

    /// Turns this command into a write from `src`.
    ///
    /// ## Panics
    ///
    /// The command operation kind must not have already been specified.
    pub fn write<'d>(self, src: &'d [T]) -> BufferWriteCmd<'c, 'd, T> {
        assert!(
            self.kind.is_unspec(),
            "BufferCmd::write: operation kind already set for this command"
        );
        BufferWriteCmd {
            buffer: self.buffer,
            queue: self.queue,
            offset: self.offset,
            ewait: self.ewait,
            src,
            block: true,
        }
    }

    /// Turns this command into an asynchronous read resolving to a vector.
    ///
    /// ## Panics
    ///
    /// The command operation kind must not have already been specified.
    pub fn read_async(self) -> BufferReadAsyncCmd<'c, T> {
        assert!(
            self.kind.is_unspec(),
            "BufferCmd::read_async: operation kind already set for this command"
        );
        BufferReadAsyncCmd {
            buffer: self.buffer,
            queue: self.queue,
            offset: self.offset,
            len: None,
            ewait: self.ewait,
        }
    }

    fn resolve_queue(&self) -> OclResult<&'c Queue> {
        self.queue.ok_or_else(|| BufferCmdError::NoQueue.into())
    }

    /// Enqueues this command, discarding its event.
    ///
    /// Copies and fills are device-side operations: this call returns once
    /// the command is submitted, and in-queue ordering makes its effects
    /// visible to subsequently enqueued commands.
    pub fn enq(self) -> OclResult<()> {
        self.enq_async().map(|_| ())
    }

    /// Enqueues this command, returning its event.
    pub fn enq_async(self) -> OclResult<Event> {
        let queue = self.resolve_queue()?;
        let remainder = self.buffer.len().saturating_sub(self.offset);
        match self.kind {
            BufferCmdKind::Copy {
                dst_buffer,
                dst_offset,
                len,
            } => core::enqueue_copy_buffer::<T, WaitListEnum>(
                queue.as_core(),
                self.buffer.as_core(),
                dst_buffer,
                self.offset,
                dst_offset.unwrap_or(0),
                len.unwrap_or(remainder),
                self.ewait.as_ref(),
            )
            .map(Event::from)
            .map_err(Error::from),
            BufferCmdKind::Fill { pattern, len } => core::enqueue_fill_buffer::<T, WaitListEnum>(
                queue.as_core(),
                self.buffer.as_core(),
                pattern,
                self.offset,
                len.unwrap_or(remainder),
                self.ewait.as_ref(),
            )
            .map(Event::from)
            .map_err(Error::from),
            BufferCmdKind::Unspecified => Err(BufferCmdError::UnspecifiedKind.into()),
        }
    }
}

/// A buffer command builder used to enqueue reads into a host slice.
///
/// Reads into borrowed host memory are always blocking; see
/// [`BufferReadAsyncCmd`] for the asynchronous form.
#[must_use = "commands do nothing unless enqueued"]
pub struct BufferReadCmd<'c, 'd, T: Prm> {
    buffer: &'c Buffer<T>,
    queue: Option<&'c Queue>,
    offset: usize,
    ewait: Option<WaitListEnum<'c>>,
    dst: &'d mut [T],
}

impl<'c, 'd, T: Prm> BufferReadCmd<'c, 'd, T> {
    /// Specifies a queue to use for this call only.
    pub fn queue(mut self, queue: &'c Queue) -> BufferReadCmd<'c, 'd, T> {
        self.queue = Some(queue);
        self
    }

    /// Sets the linear offset for this command, in elements.
    pub fn offset(mut self, offset: usize) -> BufferReadCmd<'c, 'd, T> {
        self.offset = offset;
        self
    }

    /// Specifies an event or list of events to wait on before the command
    /// will run.
    pub fn ewait<Ewl>(mut self, ewait: Ewl) -> BufferReadCmd<'c, 'd, T>
    where
        Ewl: Into<WaitListEnum<'c>>,
    {
        self.ewait = Some(ewait.into());
        self
    }

    /// Enqueues this command and blocks until the destination slice has
    /// been filled. The number of elements read equals the slice length.
    pub fn enq(self) -> OclResult<()> {
        let queue = self.queue.ok_or(BufferCmdError::NoQueue)?;
        core::enqueue_read_buffer::<T, WaitListEnum>(
            queue.as_core(),
            self.buffer.as_core(),
            self.offset,
            self.dst,
            self.ewait.as_ref(),
        )
        .map(|_| ())
        .map_err(Error::from)
    }
}

/// A buffer command builder used to enqueue writes from a host slice.
///
/// The source slice is copied at enqueue time and may be reused as soon as
/// the enqueue call returns, whether or not the command is blocking.
#[must_use = "commands do nothing unless enqueued"]
pub struct BufferWriteCmd<'c, 'd, T: Prm> {
    buffer: &'c Buffer<T>,
    queue: Option<&'c Queue>,
    offset: usize,
    ewait: Option<WaitListEnum<'c>>,
    src: &'d [T],
    block: bool,
}

impl<'c, 'd, T: Prm> BufferWriteCmd<'c, 'd, T> {
    /// Specifies a queue to use for this call only.
    pub fn queue(mut self, queue: &'c Queue) -> BufferWriteCmd<'c, 'd, T> {
        self.queue = Some(queue);
        self
    }

    /// Sets the linear offset for this command, in elements.
    pub fn offset(mut self, offset: usize) -> BufferWriteCmd<'c, 'd, T> {
        self.offset = offset;
        self
    }

    /// Specifies whether the enqueue call should also wait for the
    /// device-side application of the write (default: true).
    pub fn block(mut self, block: bool) -> BufferWriteCmd<'c, 'd, T> {
        self.block = block;
        self
    }

    /// Specifies an event or list of events to wait on before the command
    /// will run.
    pub fn ewait<Ewl>(mut self, ewait: Ewl) -> BufferWriteCmd<'c, 'd, T>
    where
        Ewl: Into<WaitListEnum<'c>>,
    {
        self.ewait = Some(ewait.into());
        self
    }

    /// Enqueues this command, discarding its event.
    pub fn enq(self) -> OclResult<()> {
        let queue = self.queue.ok_or(BufferCmdError::NoQueue)?;
        core::enqueue_write_buffer::<T, WaitListEnum>(
            queue.as_core(),
            self.buffer.as_core(),
            self.block,
            self.offset,
            self.src,
            self.ewait.as_ref(),
        )
        .map(|_| ())
        .map_err(Error::from)
    }

    /// Enqueues this command without blocking, returning its event.
    pub fn enq_async(self) -> OclResult<Event> {
        let queue = self.queue.ok_or(BufferCmdError::NoQueue)?;
        core::enqueue_write_buffer::<T, WaitListEnum>(
            queue.as_core(),
            self.buffer.as_core(),
            false,
            self.offset,
            self.src,
            self.ewait.as_ref(),
        )
        .map(Event::from)
        .map_err(Error::from)
    }
}

/// A buffer command builder used to enqueue an asynchronous read which
/// resolves to a vector of the read values.
#[must_use = "commands do nothing unless enqueued"]
pub struct BufferReadAsyncCmd<'c, T: Prm> {
    buffer: &'c Buffer<T>,
    queue: Option<&'c Queue>,
    offset: usize,
    len: Option<usize>,
    ewait: Option<WaitListEnum<'c>>,
}

impl<'c, T: Prm> BufferReadAsyncCmd<'c, T> {
    /// Specifies a queue to use for this call only.
    pub fn queue(mut self, queue: &'c Queue) -> BufferReadAsyncCmd<'c, T> {
        self.queue = Some(queue);
        self
    }

    /// Sets the linear offset for this command, in elements.
    pub fn offset(mut self, offset: usize) -> BufferReadAsyncCmd<'c, T> {
        self.offset = offset;
        self
    }

    /// Sets the number of elements to read (default: the remainder of the
    /// buffer past the offset).
    pub fn len(mut self, len: usize) -> BufferReadAsyncCmd<'c, T> {
        self.len = Some(len);
        self
    }

    /// Specifies an event or list of events to wait on before the command
    /// will run.
    pub fn ewait<Ewl>(mut self, ewait: Ewl) -> BufferReadAsyncCmd<'c, T>
    where
        Ewl: Into<WaitListEnum<'c>>,
    {
        self.ewait = Some(ewait.into());
        self
    }

    /// Enqueues this command, returning a future which resolves to the
    /// read values once the read completes.
    pub fn enq_async(self) -> OclResult<FutureValue<Vec<T>>> {
        let queue = self.queue.ok_or(BufferCmdError::NoQueue)?;
        let len = self
            .len
            .unwrap_or_else(|| self.buffer.len().saturating_sub(self.offset));
        let (event, staging) = core::enqueue_read_buffer_to_vec::<T, WaitListEnum>(
            queue.as_core(),
            self.buffer.as_core(),
            self.offset,
            len,
            self.ewait.as_ref(),
        )?;
        Ok(FutureValue::staged(Event::from(event), staging))
    }
}

/// A typed buffer of device memory.
///
/// Shared ownership: cloning a `Buffer` shares the same device memory
/// object, which is released when the last handle anywhere is dropped.
#[derive(Debug, Clone)]
pub struct Buffer<T: Prm> {
    obj_core: MemCore,
    len: usize,
    queue: Option<Queue>,
    _pd: PhantomData<T>,
}

impl<T: Prm> Buffer<T> {
    /// Returns a new buffer builder.
    pub fn builder<'a>() -> BufferBuilder<'a, T> {
        BufferBuilder::new()
    }

    /// The length of this buffer, in elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if this buffer has a length of zero. Always false:
    /// zero-length buffers cannot be created.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The flags this buffer was created with.
    pub fn flags(&self) -> MemFlags {
        self.obj_core.flags()
    }

    /// The default queue used by commands created from this buffer when no
    /// per-command queue is given.
    pub fn default_queue(&self) -> Option<&Queue> {
        self.queue.as_ref()
    }

    /// Changes the default queue used by commands created from this
    /// buffer.
    pub fn set_default_queue(&mut self, queue: Queue) -> &mut Buffer<T> {
        self.queue = Some(queue);
        self
    }

    /// Returns a command builder used to copy or fill.
    pub fn cmd(&self) -> BufferCmd<T> {
        BufferCmd::new(self)
    }

    /// Returns a command builder used to read into `dst`.
    pub fn read<'c, 'd>(&'c self, dst: &'d mut [T]) -> BufferReadCmd<'c, 'd, T> {
        self.cmd().read(dst)
    }

    /// Returns a command builder used to write from `src`.
    pub fn write<'c, 'd>(&'c self, src: &'d [T]) -> BufferWriteCmd<'c, 'd, T> {
        self.cmd().write(src)
    }

    /// Returns a command builder used to asynchronously read this buffer
    /// into a vector.
    pub fn read_async(&self) -> BufferReadAsyncCmd<T> {
        self.cmd().read_async()
    }

    /// Returns a reference to the core memory object, usable by functions
    /// in the `core` module.
    #[inline]
    pub fn as_core(&self) -> &MemCore {
        &self.obj_core
    }
}

impl<T: Prm> AsRef<MemCore> for Buffer<T> {
    fn as_ref(&self) -> &MemCore {
        &self.obj_core
    }
}

/// A buffer builder.
pub struct BufferBuilder<'a, T: Prm> {
    queue: Option<Queue>,
    context: Option<Context>,
    flags: MemFlags,
    len: usize,
    fill_val: Option<T>,
    host_slice: Option<&'a [T]>,
}

impl<'a, T: Prm> BufferBuilder<'a, T> {
    fn new() -> BufferBuilder<'a, T> {
        BufferBuilder {
            queue: None,
            context: None,
            flags: MemFlags::default(),
            len: 0,
            fill_val: None,
            host_slice: None,
        }
    }

    /// Sets the default queue, which also supplies the context the buffer
    /// is created in.
    ///
    /// Either a queue or a context is required.
    pub fn queue(mut self, queue: Queue) -> BufferBuilder<'a, T> {
        self.queue = Some(queue);
        self
    }

    /// Sets the context to create the buffer in without associating a
    /// default queue; commands created from the buffer must then specify a
    /// queue per call.
    ///
    /// Either a queue or a context is required.
    pub fn context(mut self, context: Context) -> BufferBuilder<'a, T> {
        self.context = Some(context);
        self
    }

    /// Sets the memory object creation flags (default: `READ_WRITE`).
    pub fn flags(mut self, flags: MemFlags) -> BufferBuilder<'a, T> {
        self.flags = flags;
        self
    }

    /// Sets the length of the buffer, in elements. Required and non-zero.
    pub fn len(mut self, len: usize) -> BufferBuilder<'a, T> {
        self.len = len;
        self
    }

    /// Fills the buffer with `val` immediately after creation.
    ///
    /// ## Panics
    ///
    /// A host slice to copy from must not already be specified.
    pub fn fill_val(mut self, val: T) -> BufferBuilder<'a, T> {
        assert!(
            self.host_slice.is_none(),
            "BufferBuilder::fill_val: cannot set both a fill value and a host slice"
        );
        self.fill_val = Some(val);
        self
    }

    /// Initializes the buffer by copying from `slice` at creation.
    ///
    /// The slice length must equal the buffer length.
    ///
    /// ## Panics
    ///
    /// A fill value must not already be specified.
    pub fn copy_host_slice(mut self, slice: &'a [T]) -> BufferBuilder<'a, T> {
        assert!(
            self.fill_val.is_none(),
            "BufferBuilder::copy_host_slice: cannot set both a host slice and a fill value"
        );
        self.host_slice = Some(slice);
        self
    }

    /// Creates the buffer.
    ///
    /// ## Panics
    ///
    /// The length must have been set (non-zero).
    pub fn build(self) -> OclResult<Buffer<T>> {
        let (context, queue) = match (self.queue, self.context) {
            (Some(queue), _) => (queue.context(), Some(queue)),
            (None, Some(context)) => (context, None),
            (None, None) => return Err(BufferCmdError::NoQueue.into()),
        };
        assert!(
            self.len > 0,
            "BufferBuilder::build: the buffer length must be set (non-zero)"
        );
        let flags = if self.host_slice.is_some() {
            self.flags | MemFlags::COPY_HOST_PTR
        } else {
            self.flags
        };
        let obj_core = core::create_buffer(context.as_core(), flags, self.len, self.host_slice)?;
        let buffer = Buffer {
            obj_core,
            len: self.len,
            queue,
            _pd: PhantomData,
        };
        if let Some(val) = self.fill_val {
            buffer.cmd().fill(val, None).enq_async()?.wait_for()?;
        }
        Ok(buffer)
    }
}
