// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod input_source;
pub mod output_device;
pub mod posix_terminal;
pub mod stdin_reader_thread;
pub mod terminal_control;

// Re-export.
pub use input_source::*;
pub use output_device::*;
pub use posix_terminal::*;
pub use stdin_reader_thread::*;
pub use terminal_control::*;
