// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{DEFAULT_READ_BUFFER_SIZE, EditorHooks, NoopEditorHooks};
use std::sync::Arc;

/// Used when the width of the terminal can't be queried (eg: output is piped).
pub const DEFAULT_FALLBACK_SCREEN_WIDTH: u16 = 80;

/// Everything needed to start a [`crate::ReadlineSession`].
///
/// ```
/// use r3bl_line_editor::ReadlineConfig;
///
/// let config = ReadlineConfig::new("password: ").with_mask('*');
/// assert_eq!(config.mask, Some('*'));
/// ```
#[derive(Debug, Clone)]
pub struct ReadlineConfig {
    /// May contain ANSI styling, which is ignored when measuring its width.
    pub prompt: String,
    /// Render every codepoint as this one (password entry).
    pub mask: Option<char>,
    /// Render even when stdin is not a terminal.
    pub force_interactive: bool,
    pub fallback_screen_width: u16,
    /// How many bytes are requested from the input per read.
    pub input_buffer_size: usize,
    /// History, search, paging and completion.
    pub hooks: Arc<dyn EditorHooks>,
}

impl Default for ReadlineConfig {
    fn default() -> Self {
        Self {
            prompt: String::from("> "),
            mask: None,
            force_interactive: false,
            fallback_screen_width: DEFAULT_FALLBACK_SCREEN_WIDTH,
            input_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            hooks: Arc::new(NoopEditorHooks),
        }
    }
}

impl ReadlineConfig {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = Some(mask);
        self
    }

    #[must_use]
    pub fn with_force_interactive(mut self, force_interactive: bool) -> Self {
        self.force_interactive = force_interactive;
        self
    }

    #[must_use]
    pub fn with_hooks(mut self, hooks: Arc<dyn EditorHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    #[must_use]
    pub fn with_fallback_screen_width(mut self, fallback_screen_width: u16) -> Self {
        self.fallback_screen_width = fallback_screen_width;
        self
    }
}
