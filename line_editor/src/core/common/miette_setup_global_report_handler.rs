// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Install a global [`miette`] report handler that sizes its output to the terminal.
//!
//! The [`miette::ErrorHook`] is lazily evaluated, so the terminal width is only queried
//! when a report is actually rendered (typically when `main() -> miette::Result<_>`
//! returns an error).

use crate::{PosixTerminal, TerminalControl, TerminalStream};
use miette::MietteHandlerOpts;
use tracing::debug;

/// Used when neither stdout nor stderr is a terminal.
pub const DEFAULT_REPORT_WIDTH: usize = 80;

pub fn setup_default_miette_global_report_handler(issues_url: &'static str) {
    miette::set_hook(Box::new(|_report| {
        let terminal_width = {
            let terminal = PosixTerminal::default();
            let it = [TerminalStream::Stderr, TerminalStream::Stdout]
                .into_iter()
                .find_map(|stream| terminal.size(stream).ok())
                .map_or(DEFAULT_REPORT_WIDTH, |size| usize::from(size.cols));
            debug!("miette::set_hook -> terminal_width: {}", it);
            it
        };
        Box::new(
            MietteHandlerOpts::new()
                .width(terminal_width)
                .wrap_lines(true)
                .unicode(true)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .with_cause_chain()
                .footer(issues_url.to_string())
                .build(),
        )
    }))
    .ok();
}
