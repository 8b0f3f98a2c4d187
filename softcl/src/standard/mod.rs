//! `softcl` standard types.

mod buffer;
mod context;
mod event;
mod queue;

pub use self::buffer::{
    Buffer, BufferBuilder, BufferCmd, BufferCmdError, BufferCmdKind, BufferReadAsyncCmd,
    BufferReadCmd, BufferWriteCmd,
};
pub use self::context::Context;
pub use self::event::{Event, EventList};
pub use self::queue::Queue;
pub use self::types::WaitListEnum;

pub(crate) use self::event::core_events;

mod types {
    use crate::core::{Event as EventCore, WaitListRef};
    use crate::standard::{core_events, Event, EventList};

    /// An enum which can represent several different ways of referencing
    /// an event wait list at an enqueue call site.
    #[derive(Debug)]
    pub enum WaitListEnum<'a> {
        Null,
        EventOwned(Event),
        Event(&'a Event),
        EventList(&'a EventList),
        Slice(&'a [Event]),
    }

    impl WaitListRef for WaitListEnum<'_> {
        fn events(&self) -> &[EventCore] {
            match *self {
                WaitListEnum::Null => &[],
                WaitListEnum::EventOwned(ref e) => e.events(),
                WaitListEnum::Event(e) => e.events(),
                WaitListEnum::EventList(el) => el.events(),
                WaitListEnum::Slice(s) => core_events(s),
            }
        }
    }

    impl<'a> From<Event> for WaitListEnum<'a> {
        fn from(e: Event) -> WaitListEnum<'a> {
            WaitListEnum::EventOwned(e)
        }
    }

    impl<'a> From<&'a Event> for WaitListEnum<'a> {
        fn from(e: &'a Event) -> WaitListEnum<'a> {
            WaitListEnum::Event(e)
        }
    }

    impl<'a> From<&'a EventList> for WaitListEnum<'a> {
        fn from(el: &'a EventList) -> WaitListEnum<'a> {
            WaitListEnum::EventList(el)
        }
    }

    impl<'a> From<&'a [Event]> for WaitListEnum<'a> {
        fn from(es: &'a [Event]) -> WaitListEnum<'a> {
            WaitListEnum::Slice(es)
        }
    }

    impl<'a> From<()> for WaitListEnum<'a> {
        fn from(_: ()) -> WaitListEnum<'a> {
            WaitListEnum::Null
        }
    }

    impl<'a, Ewl> From<Option<Ewl>> for WaitListEnum<'a>
    where
        Ewl: Into<WaitListEnum<'a>>,
    {
        fn from(e: Option<Ewl>) -> WaitListEnum<'a> {
            match e {
                Some(e) => e.into(),
                None => WaitListEnum::Null,
            }
        }
    }
}
