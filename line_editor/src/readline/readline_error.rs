// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::Diagnostic;
use std::{io, sync::Arc};

/// Everything that can go wrong while reading a line. The type is [`Clone`] because the
/// background input task caches its fatal error and hands a copy to every later read.
#[derive(Debug, Clone, thiserror::Error, Diagnostic)]
pub enum ReadlineError {
    #[error("terminal is already in raw mode")]
    #[diagnostic(
        code(r3bl_line_editor::already_in_raw_mode),
        help("Only one line can be read at a time; wait for the pending read to finish.")
    )]
    AlreadyInRawMode,

    #[error("terminal is not in raw mode")]
    #[diagnostic(
        code(r3bl_line_editor::not_in_raw_mode),
        help("exit_raw_mode() must be paired with a prior enter_raw_mode().")
    )]
    NotInRawMode,

    #[error("invalid screen width: {0}")]
    #[diagnostic(
        code(r3bl_line_editor::invalid_screen_width),
        help("The screen width must be at least one column.")
    )]
    InvalidScreenWidth(i32),

    /// The user pressed `Ctrl+C`.
    #[error("interrupted")]
    #[diagnostic(code(r3bl_line_editor::interrupted))]
    Interrupted,

    /// Input reached its end, or the user pressed `Ctrl+D` on an empty line.
    #[error("end of input")]
    #[diagnostic(code(r3bl_line_editor::end_of_input))]
    EndOfInput,

    /// The caller's cancellation future (or timeout) completed first.
    #[error("read cancelled")]
    #[diagnostic(code(r3bl_line_editor::cancelled))]
    Cancelled,

    #[error("failed to read input")]
    #[diagnostic(
        code(r3bl_line_editor::input_failed),
        help("The input stream is unusable; create a new session to keep reading.")
    )]
    InputFailed(#[source] Arc<io::Error>),

    #[error("terminal operation failed")]
    #[diagnostic(code(r3bl_line_editor::terminal))]
    Terminal(#[source] Arc<io::Error>),
}

impl ReadlineError {
    #[must_use]
    pub fn input_failed(error: io::Error) -> Self { Self::InputFailed(Arc::new(error)) }

    #[must_use]
    pub fn terminal(error: io::Error) -> Self { Self::Terminal(Arc::new(error)) }

    /// Errors after which no more lines can be read from the session.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Interrupted | Self::EndOfInput | Self::InputFailed(_)
        )
    }
}

/// Equality by variant (and width), since [`io::Error`] itself isn't comparable.
impl PartialEq for ReadlineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidScreenWidth(lhs), Self::InvalidScreenWidth(rhs)) => lhs == rhs,
            (Self::InputFailed(lhs), Self::InputFailed(rhs))
            | (Self::Terminal(lhs), Self::Terminal(rhs)) => lhs.kind() == rhs.kind(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

/// For convenience, convert [`miette::Report`] to [`ReadlineError`], so that setup code
/// returning [`miette::Result`] composes with `?`.
impl From<miette::Report> for ReadlineError {
    fn from(report: miette::Report) -> Self {
        Self::terminal(io::Error::other(format!("{report}")))
    }
}

/// A read that was interrupted by a signal (`EINTR`) is retried instead of being
/// surfaced.
#[must_use]
pub fn is_transient_read_error(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::Interrupted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display() {
        assert_eq!(
            ReadlineError::InvalidScreenWidth(-3).to_string(),
            "invalid screen width: -3"
        );
        assert_eq!(ReadlineError::EndOfInput.to_string(), "end of input");
    }

    #[test]
    fn test_diagnostic_code() {
        let code = ReadlineError::AlreadyInRawMode.code().unwrap().to_string();
        assert_eq!(code, "r3bl_line_editor::already_in_raw_mode");
    }

    #[test]
    fn test_source_is_kept() {
        let error = ReadlineError::input_failed(io::Error::other("boom"));
        let source = std::error::Error::source(&error).unwrap();
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn test_equality_and_fatal() {
        assert_eq!(
            ReadlineError::input_failed(io::Error::from(io::ErrorKind::BrokenPipe)),
            ReadlineError::input_failed(io::Error::from(io::ErrorKind::BrokenPipe)),
        );
        assert_ne!(
            ReadlineError::InvalidScreenWidth(0),
            ReadlineError::InvalidScreenWidth(-1)
        );
        assert!(ReadlineError::Interrupted.is_fatal());
        assert!(!ReadlineError::Cancelled.is_fatal());
    }

    #[test]
    fn test_from_miette_report() {
        let error: ReadlineError = miette::miette!("no tty").into();
        assert!(matches!(error, ReadlineError::Terminal(_)));
    }

    #[test]
    fn test_is_transient_read_error() {
        assert!(is_transient_read_error(&io::Error::from(
            io::ErrorKind::Interrupted
        )));
        assert!(!is_transient_read_error(&io::Error::from(
            io::ErrorKind::UnexpectedEof
        )));
    }
}
