// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{TAB_WIDTH, WidthModel};
use unicode_width::UnicodeWidthChar;

/// [`WidthModel`] backed by the [`unicode_width`] tables. Control codepoints take no
/// columns, tabs take [`TAB_WIDTH`], and every codepoint that isn't alphanumeric (in
/// any script) is a word break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnicodeWidthModel;

impl WidthModel for UnicodeWidthModel {
    fn char_width(&self, ch: char) -> usize {
        if ch == '\t' {
            return TAB_WIDTH;
        }
        if ch.is_control() {
            return 0;
        }
        ch.width().unwrap_or(0)
    }

    fn strip_ansi(&self, text: &str) -> String { strip_ansi_escapes::strip_str(text) }

    fn is_word_break(&self, ch: char) -> bool { !ch.is_alphanumeric() }
}
