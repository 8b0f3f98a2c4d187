use crate::{Buffer, BufferCmdError, Context, Error, Event, Queue, Status};

fn fresh_queue() -> Queue {
    Queue::new(&Context::new(), None).unwrap()
}

#[test]
fn builder_fill_val() {
    let queue = fresh_queue();
    let buffer = Buffer::<f32>::builder()
        .queue(queue.clone())
        .len(16)
        .fill_val(1.25)
        .build()
        .unwrap();

    let mut read = vec![0.0f32; 16];
    buffer.read(&mut read).enq().unwrap();
    assert!(read.iter().all(|&v| v == 1.25));
}

#[test]
fn builder_copy_host_slice() {
    let queue = fresh_queue();
    let vals: Vec<u64> = (0..32).map(|v| v * v).collect();
    let buffer = Buffer::<u64>::builder()
        .queue(queue.clone())
        .len(32)
        .copy_host_slice(&vals)
        .build()
        .unwrap();

    let mut read = vec![0u64; 32];
    buffer.read(&mut read).enq().unwrap();
    assert_eq!(read, vals);
}

#[test]
fn copy_between_buffers() {
    let queue = fresh_queue();
    let src_vals: Vec<i32> = (0..16).map(|v| v - 8).collect();
    let src = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(16)
        .copy_host_slice(&src_vals)
        .build()
        .unwrap();
    let dst = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(16)
        .fill_val(0)
        .build()
        .unwrap();

    // Copy the upper half of `src` into the lower half of `dst`. In-queue
    // ordering makes the copy visible to the subsequent read.
    src.cmd().copy(&dst, Some(0), Some(8)).offset(8).enq().unwrap();

    let mut read = vec![0i32; 16];
    dst.read(&mut read).enq().unwrap();
    assert_eq!(&read[..8], &src_vals[8..]);
    assert!(read[8..].iter().all(|&v| v == 0));
}

#[test]
fn fill_region() {
    let queue = fresh_queue();
    let buffer = Buffer::<u8>::builder()
        .queue(queue.clone())
        .len(10)
        .fill_val(0)
        .build()
        .unwrap();

    buffer.cmd().fill(0xAB, Some(4)).offset(3).enq().unwrap();

    let mut read = vec![0u8; 10];
    buffer.read(&mut read).enq().unwrap();
    assert_eq!(read, vec![0, 0, 0, 0xAB, 0xAB, 0xAB, 0xAB, 0, 0, 0]);
}

#[test]
fn read_at_offset() {
    let queue = fresh_queue();
    let vals: Vec<u16> = (0..12).collect();
    let buffer = Buffer::<u16>::builder()
        .queue(queue.clone())
        .len(12)
        .copy_host_slice(&vals)
        .build()
        .unwrap();

    let mut read = vec![0u16; 4];
    buffer.read(&mut read).offset(6).enq().unwrap();
    assert_eq!(read, vec![6, 7, 8, 9]);
}

#[test]
fn write_gated_on_user_event() {
    let queue = fresh_queue();
    let context = queue.context();
    let buffer = Buffer::<i32>::builder()
        .queue(queue.clone())
        .len(4)
        .fill_val(0)
        .build()
        .unwrap();

    let gate = Event::user(&context).unwrap();
    let write = buffer
        .write(&[6i32; 4])
        .ewait(&gate)
        .enq_async()
        .unwrap();

    // The write cannot run before the gate completes.
    assert!(!write.status().is_terminal());

    gate.set_complete().unwrap();
    write.wait_for().unwrap();

    let mut read = vec![0i32; 4];
    buffer.read(&mut read).enq().unwrap();
    assert_eq!(read, vec![6i32; 4]);
}

#[test]
fn device_side_bounds_check_fails_the_event() {
    let queue = fresh_queue();
    let buffer = Buffer::<u32>::builder()
        .queue(queue.clone())
        .len(4)
        .build()
        .unwrap();

    let event = buffer.cmd().fill(1, Some(8)).enq_async().unwrap();
    let err = event.wait_for().unwrap_err();
    assert_eq!(err.event_status(), Some(Status::InvalidBufferSize));
}

#[test]
fn commands_require_a_queue() {
    let context = Context::new();
    let queue = Queue::new(&context, None).unwrap();
    let buffer = Buffer::<u32>::builder()
        .context(context)
        .len(4)
        .build()
        .unwrap();
    assert!(buffer.default_queue().is_none());

    let err = buffer.write(&[1u32; 4]).enq().unwrap_err();
    assert!(matches!(err, Error::BufferCmd(BufferCmdError::NoQueue)));

    // Specifying a queue per call works.
    buffer.write(&[1u32; 4]).queue(&queue).enq().unwrap();
    let mut read = vec![0u32; 4];
    buffer.read(&mut read).queue(&queue).enq().unwrap();
    assert_eq!(read, vec![1u32; 4]);
}

#[test]
fn unspecified_command_kind_is_an_error() {
    let queue = fresh_queue();
    let buffer = Buffer::<u32>::builder()
        .queue(queue.clone())
        .len(4)
        .build()
        .unwrap();

    let err = buffer.cmd().enq().unwrap_err();
    assert!(matches!(
        err,
        Error::BufferCmd(BufferCmdError::UnspecifiedKind)
    ));
}
