use crate::core::Error as CoreError;
use crate::{Buffer, Context, Error, Event, EventList, FutureValue, Queue, Status};

fn fresh_queue() -> Queue {
    Queue::new(&Context::new(), None).unwrap()
}

#[test]
fn create_wait_list() {
    let events = EventList::new();
    assert_eq!(events.len(), 0);
    assert!(events.is_empty());
    assert!(events.as_slice().is_empty());
}

#[test]
fn push_preserves_count_and_order() {
    let context = Context::new();
    let mut events = EventList::new();
    let mut sources = Vec::new();

    for n in 0..5 {
        let event = Event::user(&context).unwrap();
        sources.push(event.clone());
        events.push(event);
        assert_eq!(events.len(), n + 1);
    }

    for (held, source) in events.as_slice().iter().zip(&sources) {
        assert_eq!(held, source);
    }

    for event in &sources {
        event.set_complete().unwrap();
    }
    events.wait_for().unwrap();
}

#[test]
fn wait_on_empty_list_is_trivially_successful() {
    let events = EventList::new();
    events.wait_for().unwrap();
}

#[test]
fn clear_resets_the_list() {
    let context = Context::new();
    let mut events = EventList::new();

    // A no-op on an already-empty list.
    events.clear();
    assert!(events.is_empty());

    for _ in 0..3 {
        let event = Event::user(&context).unwrap();
        event.set_complete().unwrap();
        events.push(event);
    }
    assert_eq!(events.len(), 3);

    events.clear();
    assert_eq!(events.len(), 0);
    assert!(events.as_slice().is_empty());
    events.wait_for().unwrap();
}

#[test]
fn slice_accessor_tracks_contents() {
    let context = Context::new();
    let mut events = EventList::new();
    assert!(events.as_slice().is_empty());

    let event = Event::user(&context).unwrap();
    event.set_complete().unwrap();
    events.push(event);
    assert!(!events.as_slice().is_empty());
    assert_eq!(events.as_slice().len(), events.len());

    events.clear();
    assert!(events.as_slice().is_empty());
}

#[test]
fn array_insert() {
    let queue = fresh_queue();
    let data = [1i32, 2, 3, 4, 5, 6, 7, 8];
    let buffer = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(8)
        .build()
        .unwrap();

    // Write each pair of values independently and asynchronously.
    let copy1 = buffer.write(&data[0..2]).offset(0).enq_async().unwrap();
    let copy2 = buffer.write(&data[2..4]).offset(2).enq_async().unwrap();
    let copy3 = buffer.write(&data[4..6]).offset(4).enq_async().unwrap();
    let copy4 = buffer.write(&data[6..8]).offset(6).enq_async().unwrap();

    // Add all events to the wait list in one conversion.
    let events = EventList::from([copy1, copy2, copy3, copy4]);
    assert_eq!(events.len(), 4);

    // Block until all events complete.
    events.wait_for().unwrap();

    let mut read = vec![0i32; 8];
    buffer.read(&mut read).enq().unwrap();
    assert_eq!(read, data);
}

#[test]
fn insert_future() {
    let queue = fresh_queue();
    let host_vec = vec![7i32; 4];
    let buffer = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(4)
        .build()
        .unwrap();

    // Copy values to the device, wrapped as a future.
    let event = buffer.write(&host_vec).enq_async().unwrap();
    let future = FutureValue::from_event(event);

    // Add the future's event to the wait list.
    let mut events = EventList::new();
    events.push_future(&future);
    assert_eq!(events.len(), 1);
    assert!(!events.as_slice().is_empty());

    // Wait for the copy to complete.
    events.wait_for().unwrap();

    let mut read = vec![0i32; 4];
    buffer.read(&mut read).enq().unwrap();
    assert_eq!(read, vec![7i32; 4]);

    // Clear the event list.
    events.clear();
    assert_eq!(events.len(), 0);

    // The future itself is still valid.
    future.wait().unwrap();
    future.get().unwrap();
}

#[test]
fn failed_operation_is_identified() {
    let queue = fresh_queue();
    let buffer = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(4)
        .build()
        .unwrap();

    let good = buffer.write(&[1i32, 2, 3, 4]).enq_async().unwrap();
    // Four elements at offset 2 overrun the buffer; the failure surfaces
    // on the event, not at enqueue.
    let bad = buffer.write(&[9i32, 9, 9, 9]).offset(2).enq_async().unwrap();

    let mut events = EventList::new();
    events.push(good.clone());
    events.push(bad.clone());

    let err = events.wait_for().unwrap_err();
    match err {
        Error::Core(CoreError::WaitList(ref e)) => {
            assert_eq!(e.failures().len(), 1);
            assert_eq!(e.first().index, 1);
            assert_eq!(e.first().status, Status::InvalidBufferSize);
        }
        other => panic!("unexpected error variant: {}", other),
    }

    // The other operation succeeded independently and was waited upon.
    assert!(good.is_complete().unwrap());
    assert!(bad.status().is_terminal());
}

#[test]
fn waiting_is_idempotent() {
    let queue = fresh_queue();
    let buffer = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(4)
        .build()
        .unwrap();

    let event = buffer.write(&[4i32; 4]).enq_async().unwrap();
    event.wait_for().unwrap();
    event.wait_for().unwrap();

    let events = EventList::from(event);
    events.wait_for().unwrap();
    events.wait_for().unwrap();
}

#[test]
fn marker_represents_whole_list() {
    let queue = fresh_queue();
    let context = queue.context();
    let gate_a = Event::user(&context).unwrap();
    let gate_b = Event::user(&context).unwrap();

    let mut events = EventList::new();
    events.push(gate_a.clone());
    events.push(gate_b.clone());

    let marker = events.enqueue_marker(&queue).unwrap();
    assert!(!marker.status().is_terminal());

    gate_a.set_complete().unwrap();
    gate_b.set_complete().unwrap();
    marker.wait_for().unwrap();

    // A marker may not be enqueued for an empty list.
    assert!(EventList::new().enqueue_marker(&queue).is_err());
}
