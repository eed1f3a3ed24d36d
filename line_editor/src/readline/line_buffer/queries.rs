// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{LineBuffer, LineBufferState};

impl LineBufferState {
    /// Up to `count` codepoints starting at `anchor` (the cursor when `None`), or when
    /// `count` is negative, up to `-count` codepoints ending at it. The anchor is
    /// clamped to the text.
    #[must_use]
    pub fn chars_at(&self, anchor: Option<usize>, count: isize) -> &[char] {
        let anchor = anchor.unwrap_or(self.cursor).min(self.text.len());
        let span = count.unsigned_abs();
        if count >= 0 {
            let end = anchor.saturating_add(span).min(self.text.len());
            &self.text[anchor..end]
        } else {
            &self.text[anchor.saturating_sub(span)..anchor]
        }
    }
}

/// Read only accessors. Each one takes the internal lock, so they are safe to call from
/// any thread while keystrokes are being applied.
impl LineBuffer {
    #[must_use]
    pub fn len(&self) -> usize { self.lock_state().text.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.lock_state().text.is_empty() }

    #[must_use]
    pub fn cursor(&self) -> usize { self.lock_state().cursor }

    #[must_use]
    pub fn text(&self) -> String { self.lock_state().text.iter().collect() }

    #[must_use]
    pub fn chars(&self) -> Vec<char> { self.lock_state().text.clone() }

    /// UTF-8 encoding of the text.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> { self.text().into_bytes() }

    /// Text and cursor read under one lock, so they are consistent with each other.
    #[must_use]
    pub fn text_and_cursor(&self) -> (String, usize) {
        let state = self.lock_state();
        (state.text.iter().collect(), state.cursor)
    }

    /// A copy of everything behind the lock.
    #[must_use]
    pub fn snapshot(&self) -> LineBufferState { self.lock_state().clone() }

    /// Display columns taken by the text (the prompt is not included).
    #[must_use]
    pub fn display_width(&self) -> usize {
        self.width_model.str_width(&self.lock_state().text)
    }

    /// See [`LineBufferState::chars_at`].
    #[must_use]
    pub fn chars_at(&self, anchor: Option<usize>, count: isize) -> Vec<char> {
        self.lock_state().chars_at(anchor, count).to_vec()
    }

    /// Display columns taken by [`Self::chars_at`].
    #[must_use]
    pub fn width_at(&self, anchor: Option<usize>, count: isize) -> usize {
        self.width_model
            .str_width(self.lock_state().chars_at(anchor, count))
    }

    #[must_use]
    pub fn prompt(&self) -> String { self.lock_state().prompt.clone() }

    #[must_use]
    pub fn mask(&self) -> Option<char> { self.lock_state().mask }

    #[must_use]
    pub fn screen_width(&self) -> usize { self.lock_state().screen_width }

    #[must_use]
    pub fn prompt_width(&self) -> usize { self.lock_state().prompt_width }

    #[must_use]
    pub fn is_interactive(&self) -> bool { self.lock_state().interactive }

    /// The display line (counting from the prompt's) that the cursor is on.
    #[must_use]
    pub fn idx_line(&self) -> usize { self.lock_state().idx_line(&*self.width_model) }

    /// Display lines taken by the prompt and text. Zero when both are empty.
    #[must_use]
    pub fn line_count(&self) -> usize {
        let state = self.lock_state();
        let total_width = state.prompt_width + self.width_model.str_width(&state.text);
        self.width_model.line_count(state.screen_width, total_width)
    }

    /// Display lines from the cursor's line to the last one.
    #[must_use]
    pub fn cursor_line_count(&self) -> usize {
        let idx_line = self.idx_line();
        self.line_count().saturating_sub(idx_line)
    }

    #[must_use]
    pub fn is_cursor_at_end(&self) -> bool {
        let state = self.lock_state();
        state.cursor == state.text.len()
    }

    #[must_use]
    pub fn kill_slot(&self) -> Vec<char> { self.lock_state().kill_slot.clone() }
}
