// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod edit_action;
pub mod editor_hooks;
pub mod escape_decoder;
pub mod line_buffer;
pub mod line_result;
pub mod readline_config;
pub mod readline_error;
pub mod session;

// Re-export.
pub use edit_action::*;
pub use editor_hooks::*;
pub use escape_decoder::*;
pub use line_buffer::*;
pub use line_result::*;
pub use readline_config::*;
pub use readline_error::*;
pub use session::*;
