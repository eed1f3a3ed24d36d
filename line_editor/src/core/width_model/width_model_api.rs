// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::Debug;

/// Number of spaces a tab expands to, both when measuring and when rendering.
pub const TAB_WIDTH: usize = 4;

/// How wide things are on screen. The line buffer measures the prompt and its text
/// exclusively through this trait, so the rules for wide (CJK, emoji) and zero width
/// (combining, control) codepoints live in one place.
///
/// Only [`Self::char_width`], [`Self::strip_ansi`] and [`Self::is_word_break`] have to
/// be provided; the layout functions are derived from them.
pub trait WidthModel: Send + Sync + Debug {
    /// Display columns taken by `ch`: 0, 1 or 2 (or [`TAB_WIDTH`] for a tab).
    fn char_width(&self, ch: char) -> usize;

    /// Remove ANSI styling (SGR and other escape sequences) from `text`.
    fn strip_ansi(&self, text: &str) -> String;

    /// Word motions and word kills stop at transitions from a break codepoint to a
    /// non-break codepoint.
    fn is_word_break(&self, ch: char) -> bool;

    fn str_width(&self, chars: &[char]) -> usize {
        chars.iter().map(|ch| self.char_width(*ch)).sum()
    }

    /// Display width of `prompt` once its styling is removed.
    fn prompt_width(&self, prompt: &str) -> usize {
        let plain: Vec<char> = self.strip_ansi(prompt).chars().collect();
        self.str_width(&plain)
    }

    /// Split `chars` into the display lines they occupy when the first line already has
    /// `start` columns used (by the prompt) and lines wrap at `screen_width`.
    ///
    /// A line is closed as soon as its width reaches `screen_width`, so text that ends
    /// exactly at the screen edge produces a trailing empty line. That empty line is
    /// where the terminal cursor sits after the wrap.
    ///
    /// ```
    /// use r3bl_line_editor::{UnicodeWidthModel, WidthModel};
    ///
    /// let model = UnicodeWidthModel;
    /// let chars: Vec<char> = "abcdef".chars().collect();
    /// let lines = model.split_by_line(2, 4, &chars);
    /// assert_eq!(lines, vec![vec!['a', 'b'], vec!['c', 'd', 'e', 'f'], vec![]]);
    /// ```
    fn split_by_line(
        &self,
        start: usize,
        screen_width: usize,
        chars: &[char],
    ) -> Vec<Vec<char>> {
        let mut acc = vec![];
        let mut current_line = vec![];
        let mut current_width = start;
        for &ch in chars {
            current_width += self.char_width(ch);
            current_line.push(ch);
            if current_width >= screen_width {
                acc.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
        }
        acc.push(current_line);
        acc
    }

    /// Number of screen lines needed to show `total_width` columns. Zero columns take
    /// zero lines.
    fn line_count(&self, screen_width: usize, total_width: usize) -> usize {
        if screen_width == 0 {
            return 0;
        }
        total_width.div_ceil(screen_width)
    }
}
