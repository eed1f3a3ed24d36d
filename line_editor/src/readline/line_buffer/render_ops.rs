// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The clean / print halves of a scoped redraw. Both append to a byte buffer instead of
//! writing, so that a whole redraw reaches the terminal in one write.
//!
//! Terminal columns are tracked linearly: column `n` of the rendered output (prompt
//! included) lives on display line `n / screen_width`, at `n % screen_width`.

use super::LineBufferState;
use crate::{TAB_WIDTH, WidthModel};
use std::io::Write;

/// `ESC[J`: erase from the cursor to the end of the screen.
pub const ERASE_TO_END_OF_SCREEN: &[u8] = b"\x1b[J";
/// `ESC[2K` `\r` `ESC[A`: erase a display line and move up to the previous one.
pub const ERASE_LINE_AND_MOVE_UP: &[u8] = b"\x1b[2K\r\x1b[A";
/// `ESC[2K` `\r`: erase the display line the cursor is on.
pub const ERASE_LINE: &[u8] = b"\x1b[2K\r";

impl LineBufferState {
    /// What a codepoint looks like on screen: the mask (if any) except for a trailing
    /// newline, which is always printed literally.
    fn rendered_chars(&self, end: usize) -> Vec<char> {
        let text = &self.text[..end];
        match self.mask {
            None => text.to_vec(),
            Some(mask) => {
                let mut acc = vec![mask; text.len()];
                if self.text.last() == Some(&'\n') && end == self.text.len() {
                    if let Some(last) = acc.last_mut() {
                        *last = '\n';
                    }
                }
                acc
            }
        }
    }

    /// Linear column of the rendered output (prompt included) right after
    /// `text[..end]`.
    fn column_at(&self, model: &dyn WidthModel, end: usize) -> usize {
        self.prompt_width + model.str_width(&self.rendered_chars(end))
    }

    /// Index of the display line the cursor is on, counting from the line where the
    /// prompt starts. A prompt wider than the screen fills lines of its own.
    pub fn idx_line(&self, model: &dyn WidthModel) -> usize {
        self.column_at(model, self.cursor) / self.screen_width
    }

    /// Whether the rendered output (the prompt alone when the text is empty) ends
    /// exactly at the right edge of the screen. A terminal leaves the cursor on the last
    /// column in that case (pending wrap), so the print forces the wrap by writing a
    /// space and backing over it.
    fn is_in_line_edge(&self, model: &dyn WidthModel) -> bool {
        let end_column = self.column_at(model, self.text.len());
        end_column > 0 && end_column % self.screen_width == 0
    }

    /// Erase everything this buffer has drawn, leaving the terminal cursor at column 0
    /// of the prompt's first display line. Does nothing when a clean is already pending
    /// a print.
    pub fn render_clean(&mut self, model: &dyn WidthModel, out: &mut Vec<u8>) {
        if self.dirty_drawn {
            return;
        }
        self.dirty_drawn = true;

        out.extend_from_slice(ERASE_TO_END_OF_SCREEN);
        for _ in 0..self.idx_line(model) {
            out.extend_from_slice(ERASE_LINE_AND_MOVE_UP);
        }
        out.extend_from_slice(ERASE_LINE);
    }

    /// Draw the prompt and text, then walk the terminal cursor back from the end of the
    /// text to the logical cursor.
    pub fn render_print(&mut self, model: &dyn WidthModel, out: &mut Vec<u8>) {
        self.dirty_drawn = false;

        out.extend_from_slice(self.prompt.as_bytes());
        let mut char_buf = [0; 4];
        for ch in self.rendered_chars(self.text.len()) {
            if ch == '\t' {
                out.extend(std::iter::repeat_n(b' ', TAB_WIDTH));
            } else {
                out.extend_from_slice(ch.encode_utf8(&mut char_buf).as_bytes());
            }
        }
        if self.is_in_line_edge(model) {
            out.extend_from_slice(b" \x08");
        }
        if self.cursor < self.text.len() {
            self.render_backspace_sequence(model, out);
        }
    }

    /// Each step back from column 0 of a display line goes up a line and to its right
    /// edge (the terminal clamps `ESC[{n}C` at the margin). Every other step is a
    /// backspace.
    fn render_backspace_sequence(&self, model: &dyn WidthModel, out: &mut Vec<u8>) {
        let screen_width = self.screen_width;
        let end_column = self.column_at(model, self.text.len());
        let cursor_column = self.column_at(model, self.cursor);

        for column in ((cursor_column + 1)..=end_column).rev() {
            if column % screen_width == 0 {
                // Writing to a Vec can't fail.
                let _ = write!(out, "\x1b[A\r\x1b[{screen_width}C");
            } else {
                out.push(b'\x08');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnicodeWidthModel;
    use pretty_assertions::assert_eq;

    fn state(prompt: &str, text: &str, cursor: usize, screen_width: usize) -> LineBufferState {
        LineBufferState {
            text: text.chars().collect(),
            cursor,
            prompt: prompt.to_string(),
            prompt_width: UnicodeWidthModel.prompt_width(prompt),
            interactive: true,
            screen_width,
            ..Default::default()
        }
    }

    fn print(state: &mut LineBufferState) -> String {
        let mut out = vec![];
        state.render_print(&UnicodeWidthModel, &mut out);
        String::from_utf8(out).unwrap()
    }

    fn clean(state: &mut LineBufferState) -> String {
        let mut out = vec![];
        state.render_clean(&UnicodeWidthModel, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_print_cursor_at_end() {
        let mut state = state("> ", "ab", 2, 80);
        assert_eq!(print(&mut state), "> ab");
    }

    #[test]
    fn test_print_backspaces_within_a_line() {
        let mut state = state("> ", "abc", 1, 80);
        assert_eq!(print(&mut state), "> abc\x08\x08");
    }

    #[test]
    fn test_print_backspaces_across_a_wrap() {
        // "> abc" fills the first line, "def" is on the second.
        let mut state = state("> ", "abcdef", 2, 5);
        assert_eq!(print(&mut state), "> abcdef\x08\x08\x08\x1b[A\r\x1b[5C");
    }

    #[test]
    fn test_print_forces_wrap_at_edge() {
        let mut state = state("> ", "abc", 3, 5);
        assert_eq!(print(&mut state), "> abc \x08");
        assert_eq!(state.idx_line(&UnicodeWidthModel), 1);
    }

    #[test]
    fn test_print_empty_text_has_no_edge() {
        let mut state = state("> ", "", 0, 80);
        assert_eq!(print(&mut state), "> ");
    }

    #[test]
    fn test_print_expands_tabs() {
        let mut state = state("", "a\tb", 3, 80);
        assert_eq!(print(&mut state), "a    b");
    }

    #[test]
    fn test_print_mask_keeps_trailing_newline() {
        let mut state = state("pw: ", "abc", 1, 80);
        state.mask = Some('*');
        assert_eq!(print(&mut state), "pw: ***\x08\x08");

        let mut state = state.clone();
        state.text.push('\n');
        state.cursor = state.text.len();
        assert_eq!(print(&mut state), "pw: ***\n");
    }

    #[test]
    fn test_prompt_styling_is_not_measured() {
        let mut state = state("\x1b[1m>\x1b[0m ", "abcdef", 2, 5);
        assert_eq!(state.prompt_width, 2);
        assert!(print(&mut state).ends_with("\x08\x08\x08\x1b[A\r\x1b[5C"));
    }

    #[test]
    fn test_clean_erases_lines_above_cursor() {
        let mut state = state("> ", "abcdef", 6, 5);
        assert_eq!(
            clean(&mut state),
            "\x1b[J\x1b[2K\r\x1b[A\x1b[2K\r"
        );
        assert!(state.dirty_drawn);
    }

    #[test]
    fn test_clean_twice_without_print_emits_once() {
        let mut state = state("> ", "ab", 2, 80);
        assert_eq!(clean(&mut state), "\x1b[J\x1b[2K\r");
        assert_eq!(clean(&mut state), "");
        print(&mut state);
        assert!(!state.dirty_drawn);
        assert_eq!(clean(&mut state), "\x1b[J\x1b[2K\r");
    }

    #[test]
    fn test_prompt_wider_than_screen_cursor_at_start() {
        // "abcdefg" fills line 0 and spills onto line 1, where "xy" follows.
        let mut state = state("abcdefg", "xy", 0, 5);
        assert_eq!(state.idx_line(&UnicodeWidthModel), 1);
        assert_eq!(clean(&mut state), "\x1b[J\x1b[2K\r\x1b[A\x1b[2K\r");
        assert_eq!(print(&mut state), "abcdefgxy\x08\x08");
    }

    #[test]
    fn test_prompt_wider_than_screen_cursor_at_end() {
        // Column 13 is on line 2.
        let mut state = state("abcdefghijkl", "xy", 1, 5);
        assert_eq!(state.idx_line(&UnicodeWidthModel), 2);
        state.cursor = 2;
        assert_eq!(state.idx_line(&UnicodeWidthModel), 2);
        assert_eq!(
            clean(&mut state),
            "\x1b[J\x1b[2K\r\x1b[A\x1b[2K\r\x1b[A\x1b[2K\r"
        );
    }

    #[test]
    fn test_prompt_exactly_at_edge_with_empty_text() {
        let mut state = state("abcde", "", 0, 5);
        assert_eq!(print(&mut state), "abcde \x08");
        assert_eq!(state.idx_line(&UnicodeWidthModel), 1);
        assert_eq!(clean(&mut state), "\x1b[J\x1b[2K\r\x1b[A\x1b[2K\r");
    }

    #[test]
    fn test_wide_chars_count_two_columns() {
        let mut state = state("", "日本", 0, 80);
        assert_eq!(print(&mut state), "日本\x08\x08\x08\x08");
    }
}
