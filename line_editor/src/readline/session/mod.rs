// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod input_task;
pub mod key_dispatcher;
pub mod raw_mode_guard;
pub mod readline_session;

// Re-export.
pub use input_task::*;
pub use key_dispatcher::*;
pub use raw_mode_guard::*;
pub use readline_session::*;
