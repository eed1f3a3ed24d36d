// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach.
pub mod edit_ops;
pub mod line_buffer_struct;
pub mod queries;
pub mod render_ops;

// Re-export.
pub use line_buffer_struct::*;
pub use render_ops::*;

#[cfg(test)]
mod tests;
