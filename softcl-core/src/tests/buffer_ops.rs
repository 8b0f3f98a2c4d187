use crate::{
    create_buffer, create_command_queue, create_context, enqueue_copy_buffer, enqueue_fill_buffer,
    enqueue_read_buffer, enqueue_write_buffer, finish, wait_for_event, Error, Event, MemFlags,
    Status,
};

#[test]
fn write_read_round_trip() {
    let context = create_context();
    let queue = create_command_queue(&context, None).unwrap();
    let buffer = create_buffer::<u32>(&context, MemFlags::default(), 8, None).unwrap();

    let src: Vec<u32> = (100..108).collect();
    enqueue_write_buffer(&queue, &buffer, true, 0, &src, None::<&Event>).unwrap();

    let mut dst = vec![0u32; 8];
    enqueue_read_buffer(&queue, &buffer, 0, &mut dst, None::<&Event>).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn write_at_offset() {
    let context = create_context();
    let queue = create_command_queue(&context, None).unwrap();
    let buffer = create_buffer::<i32>(&context, MemFlags::default(), 8, None).unwrap();

    enqueue_write_buffer(&queue, &buffer, true, 6, &[7i32, 9], None::<&Event>).unwrap();

    let mut dst = vec![0i32; 8];
    enqueue_read_buffer(&queue, &buffer, 0, &mut dst, None::<&Event>).unwrap();
    assert_eq!(dst, vec![0, 0, 0, 0, 0, 0, 7, 9]);
}

#[test]
fn copy_between_buffers() {
    let context = create_context();
    let queue = create_command_queue(&context, None).unwrap();
    let src_vals: Vec<u64> = (0..16).map(|v| v * 3).collect();
    let src = create_buffer(
        &context,
        MemFlags::default().copy_host_ptr(),
        16,
        Some(&src_vals[..]),
    )
    .unwrap();
    let dst = create_buffer::<u64>(&context, MemFlags::default(), 16, None).unwrap();

    enqueue_copy_buffer::<u64, Event>(&queue, &src, &dst, 4, 0, 8, None).unwrap();
    finish(&queue).unwrap();

    let mut read = vec![0u64; 16];
    enqueue_read_buffer(&queue, &dst, 0, &mut read, None::<&Event>).unwrap();
    assert_eq!(&read[..8], &src_vals[4..12]);
    assert!(read[8..].iter().all(|&v| v == 0));
}

#[test]
fn fill_region() {
    let context = create_context();
    let queue = create_command_queue(&context, None).unwrap();
    let buffer = create_buffer::<f32>(&context, MemFlags::default(), 12, None).unwrap();

    enqueue_fill_buffer(&queue, &buffer, 2.5f32, 2, 8, None::<&Event>).unwrap();
    finish(&queue).unwrap();

    let mut read = vec![0.0f32; 12];
    enqueue_read_buffer(&queue, &buffer, 0, &mut read, None::<&Event>).unwrap();
    assert!(read[..2].iter().all(|&v| v == 0.0));
    assert!(read[2..10].iter().all(|&v| v == 2.5));
    assert!(read[10..].iter().all(|&v| v == 0.0));
}

#[test]
fn out_of_range_write_fails_asynchronously() {
    let context = create_context();
    let queue = create_command_queue(&context, None).unwrap();
    let buffer = create_buffer::<u32>(&context, MemFlags::default(), 8, None).unwrap();

    // Enqueue succeeds; the device-side bounds check fails the event.
    let event =
        enqueue_write_buffer(&queue, &buffer, false, 6, &[1u32, 2, 3, 4], None::<&Event>).unwrap();

    let err = wait_for_event(&event).unwrap_err();
    match err {
        Error::Event(ref e) => assert_eq!(e.status, Status::InvalidBufferSize),
        other => panic!("unexpected error variant: {}", other),
    }
    assert_eq!(event.status().err_status(), Some(Status::InvalidBufferSize));
}

#[test]
fn overlapping_self_copy_fails() {
    let context = create_context();
    let queue = create_command_queue(&context, None).unwrap();
    let vals = vec![1u8; 16];
    let buffer = create_buffer(
        &context,
        MemFlags::default().copy_host_ptr(),
        16,
        Some(&vals[..]),
    )
    .unwrap();

    let event = enqueue_copy_buffer::<u8, Event>(&queue, &buffer, &buffer, 0, 4, 8, None).unwrap();
    let err = wait_for_event(&event).unwrap_err();
    assert_eq!(err.event_status(), Some(Status::MemCopyOverlap));
}

#[test]
fn self_copy_without_overlap() {
    let context = create_context();
    let queue = create_command_queue(&context, None).unwrap();
    let vals: Vec<u8> = (0..16).collect();
    let buffer = create_buffer(
        &context,
        MemFlags::default().copy_host_ptr(),
        16,
        Some(&vals[..]),
    )
    .unwrap();

    enqueue_copy_buffer::<u8, Event>(&queue, &buffer, &buffer, 0, 8, 8, None).unwrap();
    finish(&queue).unwrap();

    let mut read = vec![0u8; 16];
    enqueue_read_buffer(&queue, &buffer, 0, &mut read, None::<&Event>).unwrap();
    assert_eq!(&read[8..], &vals[..8]);
}

#[test]
fn zero_len_buffer_is_rejected() {
    let context = create_context();
    let err = create_buffer::<u32>(&context, MemFlags::default(), 0, None).unwrap_err();
    assert_eq!(err.api_status(), Some(Status::InvalidBufferSize));
}

#[test]
fn host_data_without_flag_is_rejected() {
    let context = create_context();
    let vals = [1u32, 2];
    let err = create_buffer(&context, MemFlags::default(), 2, Some(&vals[..])).unwrap_err();
    assert_eq!(err.api_status(), Some(Status::InvalidHostPtr));
}
