//! Bitflag parameter types.

use bitflags::bitflags;

bitflags! {
    /// Memory object creation flags.
    pub struct MemFlags: u64 {
        const READ_WRITE = 1 << 0;
        const WRITE_ONLY = 1 << 1;
        const READ_ONLY = 1 << 2;
        /// Initialize the buffer by copying from a host slice at creation.
        const COPY_HOST_PTR = 1 << 5;
    }
}

impl MemFlags {
    /// Returns a new, empty flag set.
    pub fn new() -> MemFlags {
        MemFlags::empty()
    }

    pub fn read_write(self) -> MemFlags {
        self | MemFlags::READ_WRITE
    }

    pub fn write_only(self) -> MemFlags {
        self | MemFlags::WRITE_ONLY
    }

    pub fn read_only(self) -> MemFlags {
        self | MemFlags::READ_ONLY
    }

    pub fn copy_host_ptr(self) -> MemFlags {
        self | MemFlags::COPY_HOST_PTR
    }
}

impl Default for MemFlags {
    fn default() -> MemFlags {
        MemFlags::READ_WRITE
    }
}

bitflags! {
    /// Command queue creation properties.
    pub struct CommandQueueProperties: u64 {
        /// Record profiling timestamps on every event produced by the queue.
        const PROFILING_ENABLE = 1 << 1;
    }
}

impl CommandQueueProperties {
    /// Returns a new, empty property set.
    pub fn new() -> CommandQueueProperties {
        CommandQueueProperties::empty()
    }

    pub fn profiling(self) -> CommandQueueProperties {
        self | CommandQueueProperties::PROFILING_ENABLE
    }
}

impl Default for CommandQueueProperties {
    fn default() -> CommandQueueProperties {
        CommandQueueProperties::empty()
    }
}
