mod buffer_ops;
mod clear_completed;
mod concurrent;
mod future_value;
mod wait_list;
