use crate::{Buffer, Context, Event, EventList, Queue, Status};

#[test]
fn clear_completed_keeps_pending_events() {
    let queue = Queue::new(&Context::new(), None).unwrap();
    let context = queue.context();
    let buffer = Buffer::<u32>::builder()
        .queue(queue.clone())
        .len(4)
        .build()
        .unwrap();

    let done = buffer.write(&[1u32; 4]).enq_async().unwrap();
    done.wait_for().unwrap();
    let gate = Event::user(&context).unwrap();

    let mut events = EventList::new();
    events.push(done);
    events.push(gate.clone());
    assert_eq!(events.len(), 2);

    events.clear_completed().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(&events.as_slice()[0], &gate);

    gate.set_complete().unwrap();
    events.clear_completed().unwrap();
    assert!(events.is_empty());
}

#[test]
fn clear_completed_reports_failed_events() {
    let context = Context::new();
    let failed = Event::user(&context).unwrap();
    failed.set_error(Status::OutOfResources).unwrap();

    let mut events = EventList::new();
    events.push(failed);

    // The failed event is reported and retained.
    let err = events.clear_completed().unwrap_err();
    assert_eq!(err.event_status(), Some(Status::OutOfResources));
    assert_eq!(events.len(), 1);
}
