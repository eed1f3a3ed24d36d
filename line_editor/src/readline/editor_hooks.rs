// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::LineBuffer;
use std::fmt::Debug;

/// Extension points for the keys that the line editor binds but doesn't implement
/// itself: history (`Ctrl+P` / `Ctrl+N`, up / down arrows), incremental search
/// (`Ctrl+R` / `Ctrl+S`), paging (`PageUp` / `PageDown`) and completion (`Tab`).
///
/// Every method has a no-op default. Hooks run on the background input task while no
/// lock is held, so they are free to call any [`LineBuffer`] operation (eg:
/// [`LineBuffer::set_text`] to recall a history entry).
///
/// ```
/// use r3bl_line_editor::{EditorHooks, LineBuffer};
///
/// #[derive(Debug)]
/// struct CompleteToHello;
///
/// impl EditorHooks for CompleteToHello {
///     fn complete(&self, line_buffer: &LineBuffer) -> bool {
///         line_buffer.set_text("hello".chars().collect());
///         true
///     }
/// }
/// ```
pub trait EditorHooks: Send + Sync + Debug {
    /// Returns whether anything was completed. `false` rings the bell.
    fn complete(&self, _line_buffer: &LineBuffer) -> bool { false }

    fn history_prev(&self, _line_buffer: &LineBuffer) {}

    fn history_next(&self, _line_buffer: &LineBuffer) {}

    fn search_backward(&self, _line_buffer: &LineBuffer) {}

    fn search_forward(&self, _line_buffer: &LineBuffer) {}

    fn page_up(&self, _line_buffer: &LineBuffer) {}

    fn page_down(&self, _line_buffer: &LineBuffer) {}

    /// Called with every finished line right before it is handed to the reader. This is
    /// where a history implementation records entries.
    fn on_line(&self, _line: &[u8]) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEditorHooks;

impl EditorHooks for NoopEditorHooks {}
