// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::Debug, io};

/// The standard streams that terminal geometry can be queried on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TerminalStream {
    Stdin,
    Stdout,
    Stderr,
}

/// Terminal geometry in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalSize {
    pub cols: u16,
    pub rows: u16,
}

/// The platform side of raw mode and size queries. The line editor never calls into the
/// OS directly, it goes through this trait, so tests can swap in
/// [`crate::MockTerminal`].
///
/// Implementations keep whatever state they need to restore the terminal (eg: the
/// original termios). Bookkeeping of "are we currently in raw mode" is done by the
/// caller ([`crate::ReadlineSession`]), which turns misuse into
/// [`crate::ReadlineError::AlreadyInRawMode`] and
/// [`crate::ReadlineError::NotInRawMode`].
pub trait TerminalControl: Send + Sync + Debug {
    /// Switch the controlling terminal to raw mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes can't be read or written.
    fn enable_raw_mode(&self) -> io::Result<()>;

    /// Restore the attributes saved by [`Self::enable_raw_mode`].
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes can't be written.
    fn disable_raw_mode(&self) -> io::Result<()>;

    /// Geometry of the terminal attached to `stream`.
    ///
    /// # Errors
    ///
    /// Returns an error if `stream` is not attached to a terminal.
    fn size(&self, stream: TerminalStream) -> io::Result<TerminalSize>;

    fn is_terminal(&self, stream: TerminalStream) -> bool;
}
