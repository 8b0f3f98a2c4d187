//! A device context.

use crate::core::{self, Context as ContextCore};

/// A context for the software device.
///
/// Queues, buffers, and user events are created within a context. The
/// software device carries no per-context configuration, so construction
/// cannot fail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Context(ContextCore);

impl Context {
    /// Returns a new context.
    pub fn new() -> Context {
        Context(core::create_context())
    }

    /// Returns a reference to the core context, usable by functions in the
    /// `core` module.
    #[inline]
    pub fn as_core(&self) -> &ContextCore {
        &self.0
    }
}

impl Default for Context {
    fn default() -> Context {
        Context::new()
    }
}

impl From<ContextCore> for Context {
    fn from(core: ContextCore) -> Context {
        Context(core)
    }
}

impl AsRef<ContextCore> for Context {
    fn as_ref(&self) -> &ContextCore {
        &self.0
    }
}
