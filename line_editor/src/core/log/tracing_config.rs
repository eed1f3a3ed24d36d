// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::OutputDevice;
use std::fmt::{Debug, Formatter};
use tracing_core::LevelFilter;

/// Default log file, relative to the current working directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "line_editor_debug.log";

/// Configure where tracing output goes and at what level. Pass it to [`crate::init`].
///
/// While a line is being edited the terminal is in raw mode and the prompt is redrawn
/// in place, so logging to the same terminal garbles the display. Prefer
/// [`WriterConfig::File`] for interactive programs.
#[derive(Debug)]
pub struct TracingConfig {
    pub writer_config: WriterConfig,
    pub level: tracing::Level,
    pub scope: TracingScope,
}

/// Whether [`crate::init`] installs the subscriber for the whole process or just the
/// current thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingScope {
    /// Can only be set once. Suits binaries.
    #[default]
    Global,
    /// Reverted when the returned guard is dropped. Suits tests.
    ThreadLocal,
}

/// Where to write. The `String` is the log file path.
#[derive(Debug, Clone)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(String),
    DisplayAndFile(DisplayPreference, String),
}

#[derive(Clone)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
    /// Share the line editor's own output device, so log lines and prompt redraws
    /// don't interleave mid escape sequence.
    OutputDevice(OutputDevice),
}

impl Debug for DisplayPreference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayPreference::Stdout => write!(f, "Stdout"),
            DisplayPreference::Stderr => write!(f, "Stderr"),
            DisplayPreference::OutputDevice(_) => write!(f, "OutputDevice"),
        }
    }
}

impl TracingConfig {
    #[must_use]
    pub fn new_file(filename: Option<String>) -> Self {
        Self {
            writer_config: WriterConfig::File(
                filename.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string()),
            ),
            level: tracing::Level::DEBUG,
            scope: TracingScope::Global,
        }
    }

    #[must_use]
    pub fn new_display(preferred_display: DisplayPreference) -> Self {
        Self {
            writer_config: WriterConfig::Display(preferred_display),
            level: tracing::Level::DEBUG,
            scope: TracingScope::Global,
        }
    }

    #[must_use]
    pub fn new_file_and_display(
        filename: Option<String>,
        preferred_display: DisplayPreference,
    ) -> Self {
        Self {
            writer_config: WriterConfig::DisplayAndFile(
                preferred_display,
                filename.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string()),
            ),
            level: tracing::Level::DEBUG,
            scope: TracingScope::Global,
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_scope(mut self, scope: TracingScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { LevelFilter::from_level(self.level) }
}
