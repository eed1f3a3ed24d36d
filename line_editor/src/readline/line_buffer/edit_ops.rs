// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Editing operations. The logic lives on [`LineBufferState`] so it can be tested
//! without any rendering. [`LineBuffer`] wraps each one in a scoped redraw.
//!
//! Operations that can fail return `false` (the caller rings the bell). None of them
//! panic, except [`LineBuffer::set_style`] on a reversed range.

use super::{LineBuffer, LineBufferState};
use crate::{TAB_WIDTH, WidthModel};

impl LineBufferState {
    /// Overtype: replace codepoints from the cursor on, extending the text only by what
    /// runs past its end.
    pub fn write(&mut self, chars: &[char]) {
        let overtype_end = (self.cursor + chars.len()).min(self.text.len());
        self.text.splice(self.cursor..overtype_end, chars.iter().copied());
        self.cursor += chars.len();
    }

    pub fn insert(&mut self, chars: &[char]) {
        self.text.splice(self.cursor..self.cursor, chars.iter().copied());
        self.cursor += chars.len();
    }

    pub fn move_line_start(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor = 0;
        true
    }

    pub fn move_line_end(&mut self) -> bool {
        if self.cursor == self.text.len() {
            return false;
        }
        self.cursor = self.text.len();
        true
    }

    pub fn move_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_forward(&mut self) -> bool {
        if self.cursor == self.text.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Index of the first word start (a non-break codepoint right after a break one)
    /// in `range`, scanning in the range's order.
    fn find_word_start(
        &self,
        model: &dyn WidthModel,
        mut range: impl Iterator<Item = usize>,
    ) -> Option<usize> {
        range.find(|&i| {
            i > 0 && !model.is_word_break(self.text[i]) && model.is_word_break(self.text[i - 1])
        })
    }

    pub fn move_to_prev_word(&mut self, model: &dyn WidthModel) -> bool {
        self.cursor = self
            .find_word_start(model, (1..self.cursor).rev())
            .unwrap_or(0);
        true
    }

    pub fn move_to_next_word(&mut self, model: &dyn WidthModel) -> bool {
        let len = self.text.len();
        self.cursor = self
            .find_word_start(model, (self.cursor + 1)..len)
            .unwrap_or(len);
        true
    }

    /// Land on the last codepoint of the current word, or of the next one when the
    /// cursor already is on a word's last codepoint.
    pub fn move_to_end_word(&mut self, model: &dyn WidthModel) -> bool {
        let len = self.text.len();
        if self.cursor >= len {
            return false;
        }
        let is_break = |i: usize| model.is_word_break(self.text[i]);

        let mut start = self.cursor;
        if start + 1 < len && !is_break(start) && is_break(start + 1) {
            start += 1;
        }
        self.cursor = ((start + 1)..len)
            .find(|&i| is_break(i) && !is_break(i - 1))
            .map_or(len, |i| i - 1);
        true
    }

    /// Jump to the next occurrence of `ch` (`reverse` searches backward). With
    /// `before`, stop one short of it.
    pub fn move_to(&mut self, ch: char, before: bool, reverse: bool) -> bool {
        let found = if reverse {
            (0..self.cursor).rev().find(|&i| self.text[i] == ch)
        } else {
            ((self.cursor + 1)..self.text.len()).find(|&i| self.text[i] == ch)
        };
        let Some(index) = found else {
            return false;
        };
        self.cursor = match (before, reverse) {
            (true, true) => index + 1,
            (true, false) => index - 1,
            (false, _) => index,
        };
        true
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.text.remove(self.cursor);
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        self.kill_slot = vec![self.text.remove(self.cursor)];
        true
    }

    pub fn kill(&mut self) -> bool {
        if self.cursor >= self.text.len() {
            return false;
        }
        self.kill_slot = self.text.split_off(self.cursor);
        true
    }

    pub fn kill_front(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.kill_slot = self.text.drain(..self.cursor).collect();
        self.cursor = 0;
        true
    }

    /// Kill up to the next word, leaving one separator in front of it.
    pub fn kill_word(&mut self, model: &dyn WidthModel) -> bool {
        let len = self.text.len();
        if self.cursor >= len {
            return false;
        }
        let mut first_word_char = self.cursor;
        while first_word_char < len && model.is_word_break(self.text[first_word_char]) {
            first_word_char += 1;
        }
        let end = self
            .find_word_start(model, (first_word_char + 1)..len)
            .map_or(len, |i| i - 1);
        self.kill_slot = self.text.drain(self.cursor..end).collect();
        true
    }

    pub fn kill_word_front(&mut self, model: &dyn WidthModel) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = self
            .find_word_start(model, (1..self.cursor).rev())
            .unwrap_or(0);
        self.kill_slot = self.text.drain(start..self.cursor).collect();
        self.cursor = start;
        true
    }

    pub fn yank(&mut self) -> bool {
        if self.kill_slot.is_empty() {
            return false;
        }
        let kill_slot = self.kill_slot.clone();
        self.insert(&kill_slot);
        true
    }

    pub fn transpose(&mut self) -> bool {
        if self.text.len() < 2 || self.cursor == 0 {
            return false;
        }
        self.cursor = self.cursor.min(self.text.len() - 1);
        self.text.swap(self.cursor - 1, self.cursor);
        self.cursor += 1;
        true
    }

    /// Clear the text into the kill slot.
    pub fn erase(&mut self) -> bool {
        if self.text.is_empty() {
            return false;
        }
        self.kill_slot = std::mem::take(&mut self.text);
        self.cursor = 0;
        true
    }

    pub fn reset(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn set(&mut self, cursor: usize, chars: Vec<char>) {
        self.text = chars;
        self.cursor = cursor.min(self.text.len());
    }

    pub fn backup(&mut self) { self.backup = Some((self.text.clone(), self.cursor)); }

    pub fn restore(&mut self) {
        if let Some((text, cursor)) = self.backup.clone() {
            self.set(cursor, text);
        }
    }
}

/// Every method here is a scoped redraw around the [`LineBufferState`] method of the
/// same name.
impl LineBuffer {
    pub fn write(&self, chars: &[char]) { self.refresh_with(|state| state.write(chars)); }

    pub fn insert(&self, chars: &[char]) { self.refresh_with(|state| state.insert(chars)); }

    pub fn move_line_start(&self) -> bool { self.refresh_with(LineBufferState::move_line_start) }

    pub fn move_line_end(&self) -> bool { self.refresh_with(LineBufferState::move_line_end) }

    pub fn move_backward(&self) -> bool { self.refresh_with(LineBufferState::move_backward) }

    pub fn move_forward(&self) -> bool { self.refresh_with(LineBufferState::move_forward) }

    pub fn move_to_prev_word(&self) -> bool {
        let model = &*self.width_model;
        self.refresh_with(|state| state.move_to_prev_word(model))
    }

    pub fn move_to_next_word(&self) -> bool {
        let model = &*self.width_model;
        self.refresh_with(|state| state.move_to_next_word(model))
    }

    pub fn move_to_end_word(&self) -> bool {
        let model = &*self.width_model;
        self.refresh_with(|state| state.move_to_end_word(model))
    }

    pub fn move_to(&self, ch: char, before: bool, reverse: bool) -> bool {
        self.refresh_with(|state| state.move_to(ch, before, reverse))
    }

    pub fn backspace(&self) -> bool { self.refresh_with(LineBufferState::backspace) }

    pub fn delete(&self) -> bool { self.refresh_with(LineBufferState::delete) }

    pub fn kill(&self) -> bool { self.refresh_with(LineBufferState::kill) }

    pub fn kill_front(&self) -> bool { self.refresh_with(LineBufferState::kill_front) }

    pub fn kill_word(&self) -> bool {
        let model = &*self.width_model;
        self.refresh_with(|state| state.kill_word(model))
    }

    pub fn kill_word_front(&self) -> bool {
        let model = &*self.width_model;
        self.refresh_with(|state| state.kill_word_front(model))
    }

    /// An empty kill slot fails without touching the screen.
    pub fn yank(&self) -> bool {
        if self.lock_state().kill_slot.is_empty() {
            return false;
        }
        self.refresh_with(LineBufferState::yank)
    }

    pub fn transpose(&self) -> bool { self.refresh_with(LineBufferState::transpose) }

    pub fn erase(&self) -> bool { self.refresh_with(LineBufferState::erase) }

    pub fn reset(&self) { self.refresh_with(LineBufferState::reset); }

    /// Clear the text without drawing. Used after a line is submitted, when the screen
    /// already moved past it.
    pub fn reset_without_redraw(&self) { self.lock_state().reset(); }

    /// Replace the text and put the cursor at its end.
    pub fn set_text(&self, chars: Vec<char>) {
        self.refresh_with(|state| {
            let cursor = chars.len();
            state.set(cursor, chars);
        });
    }

    /// Replace the text and cursor. The cursor is clamped to the new text.
    pub fn set(&self, cursor: usize, chars: Vec<char>) {
        self.refresh_with(|state| state.set(cursor, chars));
    }

    pub fn backup(&self) { self.lock_state().backup(); }

    /// Without a prior [`Self::backup`] this is just a redraw.
    pub fn restore(&self) { self.refresh_with(LineBufferState::restore); }

    /// Draw `[start, end)` wrapped in `ESC[{style}m` ... `ESC[0m`, on top of what is
    /// already on screen, and put the terminal cursor back where it was. The text
    /// itself is not modified. Indices past the end are clamped. Tabs are drawn as
    /// spaces, the same as a full redraw.
    ///
    /// # Panics
    ///
    /// Panics if `end < start`.
    pub fn set_style(&self, start: usize, end: usize, style: &str) {
        assert!(start <= end, "set_style: end ({end}) is before start ({start})");

        let state = self.lock_state();
        if !state.interactive {
            return;
        }
        let len = state.text.len();
        let (start, end) = (start.min(len), end.min(len));
        let cursor = state.cursor;
        let model = &*self.width_model;
        let visible = |range: std::ops::Range<usize>| -> String {
            match state.mask {
                Some(mask) => std::iter::repeat_n(mask, range.len()).collect(),
                None => state.text[range]
                    .iter()
                    .map(|&ch| match ch {
                        '\t' => " ".repeat(TAB_WIDTH),
                        _ => ch.to_string(),
                    })
                    .collect(),
            }
        };
        let backspaces = |range: std::ops::Range<usize>| -> String {
            let columns = match state.mask {
                Some(mask) => model.char_width(mask) * range.len(),
                None => model.str_width(&state.text[range]),
            };
            "\x08".repeat(columns)
        };

        let mut out = String::new();
        if start >= cursor {
            out.push_str(&visible(cursor..start));
        } else {
            out.push_str(&backspaces(start..cursor));
        }
        out.push_str(&format!("\x1b[{style}m{}\x1b[0m", visible(start..end)));
        if end >= cursor {
            out.push_str(&backspaces(cursor..end));
        } else {
            out.push_str(&visible(end..cursor));
        }
        drop(state);
        self.emit(out.as_bytes());
    }
}
