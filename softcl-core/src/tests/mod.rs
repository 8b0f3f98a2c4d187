mod buffer_ops;
