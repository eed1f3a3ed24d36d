// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fixtures to drive a line editing session without a real terminal: capture what is
//! rendered, script what is typed, and observe raw mode transitions.

// Attach.
pub mod input_source_ext;
pub mod mock_terminal;
pub mod output_device_ext;
pub mod stdout_mock;

// Re-export.
pub use input_source_ext::*;
pub use mock_terminal::*;
pub use output_device_ext::*;
pub use stdout_mock::*;
