use std::thread;
use std::time::Duration;

use futures::Future;

use crate::{Buffer, Context, Event, EventList, FutureValue, Queue, Status};

fn fresh_queue() -> Queue {
    Queue::new(&Context::new(), None).unwrap()
}

#[test]
fn read_async_resolves_to_values() {
    let queue = fresh_queue();
    let buffer = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(8)
        .fill_val(5)
        .build()
        .unwrap();
    buffer.write(&[9i32, 9]).offset(3).enq().unwrap();

    let future = buffer.read_async().offset(2).len(4).enq_async().unwrap();
    let vals = future.get().unwrap();
    assert_eq!(vals, vec![5, 9, 9, 5]);
}

#[test]
fn get_surfaces_the_device_error() {
    let queue = fresh_queue();
    let buffer = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(4)
        .build()
        .unwrap();

    // A four-element read at offset two overruns the buffer.
    let future = buffer.read_async().offset(2).len(4).enq_async().unwrap();
    let err = future.get().unwrap_err();
    assert_eq!(err.event_status(), Some(Status::InvalidBufferSize));
}

#[test]
fn wait_then_get() {
    let queue = fresh_queue();
    let buffer = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(4)
        .build()
        .unwrap();

    let event = buffer.write(&[7i32; 4]).enq_async().unwrap();
    let future = FutureValue::from_event(event);

    // `wait` does not consume the deferred value; repeated waits return
    // immediately.
    FutureValue::wait(&future).unwrap();
    FutureValue::wait(&future).unwrap();
    future.get().unwrap();
}

#[test]
fn event_extraction_for_wait_lists() {
    let queue = fresh_queue();
    let vals: Vec<u32> = (0..16).collect();
    let buffer = Buffer::<u32>::builder()
        .queue(queue.clone())
        .len(16)
        .copy_host_slice(&vals)
        .build()
        .unwrap();

    let future = buffer.read_async().enq_async().unwrap();

    let mut events = EventList::new();
    events.push_future(&future);
    events.wait_for().unwrap();

    assert!(future.event().is_complete().unwrap());
    assert_eq!(future.get().unwrap(), vals);
}

#[test]
fn polls_like_a_future() {
    let queue = fresh_queue();
    let vals = vec![3u8; 6];
    let buffer = Buffer::<u8>::builder()
        .queue(queue.clone())
        .len(6)
        .copy_host_slice(&vals)
        .build()
        .unwrap();

    let future = buffer.read_async().enq_async().unwrap();
    let read = Future::wait(future).unwrap();
    assert_eq!(read, vals);
}

#[test]
fn with_value_defers_until_completion() {
    let context = Context::new();
    let gate = Event::user(&context).unwrap();
    let future = FutureValue::with_value(gate.clone(), 42u32);

    let completer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        gate.set_complete().unwrap();
    });

    assert_eq!(Future::wait(future).unwrap(), 42);
    completer.join().unwrap();
}

#[test]
fn event_list_polls_to_completion() {
    let queue = fresh_queue();
    let buffer = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(8)
        .build()
        .unwrap();

    let first = buffer.write(&[1i32; 4]).enq_async().unwrap();
    let second = buffer.write(&[2i32; 4]).offset(4).enq_async().unwrap();
    let events = EventList::from([first, second]);

    Future::wait(events).unwrap();

    let mut read = vec![0i32; 8];
    buffer.read(&mut read).enq().unwrap();
    assert_eq!(read, vec![1, 1, 1, 1, 2, 2, 2, 2]);
}
