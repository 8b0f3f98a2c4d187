use std::sync::Arc;
use std::thread;

use rand::Rng;

use crate::{Buffer, Context, Event, EventList, Queue};

const THREADS: usize = 4;
const CHUNK: usize = 16;

#[test]
fn concurrent_writes_from_multiple_threads() {
    let queue = Queue::new(&Context::new(), None).unwrap();
    let buffer = Buffer::<u32>::builder()
        .queue(queue.clone())
        .len(THREADS * CHUNK)
        .build()
        .unwrap();

    let mut rng = rand::thread_rng();
    let vals: Arc<Vec<u32>> = Arc::new((0..THREADS * CHUNK).map(|_| rng.gen()).collect());

    let mut handles = Vec::new();
    for chunk in 0..THREADS {
        let buffer = buffer.clone();
        let vals = Arc::clone(&vals);
        handles.push(thread::spawn(move || {
            let offset = chunk * CHUNK;
            buffer
                .write(&vals[offset..offset + CHUNK])
                .offset(offset)
                .enq_async()
                .unwrap()
        }));
    }

    let mut events = EventList::new();
    for handle in handles {
        events.push(handle.join().unwrap());
    }
    assert_eq!(events.len(), THREADS);
    events.wait_for().unwrap();

    let mut read = vec![0u32; THREADS * CHUNK];
    buffer.read(&mut read).enq().unwrap();
    assert_eq!(&read, &*vals);
}

#[test]
fn events_are_shareable_across_threads() {
    let context = Context::new();
    let gate = Event::user(&context).unwrap();

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let gate = gate.clone();
            thread::spawn(move || gate.wait_for())
        })
        .collect();

    gate.set_complete().unwrap();
    for waiter in waiters {
        waiter.join().unwrap().unwrap();
    }
}

#[test]
fn cross_queue_ordering_via_wait_list() {
    let context = Context::new();
    let queue_a = Queue::new(&context, None).unwrap();
    let queue_b = Queue::new(&context, None).unwrap();
    let buffer = Buffer::<i32>::builder()
        .queue(queue_a.clone())
        .len(8)
        .build()
        .unwrap();

    let gate = Event::user(&context).unwrap();
    let write = buffer
        .write(&[3i32; 8])
        .ewait(&gate)
        .enq_async()
        .unwrap();
    gate.set_complete().unwrap();

    // The read on queue B is ordered after the write on queue A only
    // through the wait list.
    let mut read = vec![0i32; 8];
    buffer
        .read(&mut read)
        .queue(&queue_b)
        .ewait(&write)
        .enq()
        .unwrap();
    assert_eq!(read, vec![3i32; 8]);
}
