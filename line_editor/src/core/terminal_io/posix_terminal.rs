// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words tcgetattr tcsetattr tcgetwinsize cfmakeraw isatty

//! Unix/Linux/macOS implementation of [`TerminalControl`] using rustix's safe termios
//! API. On other platforms every operation reports [`io::ErrorKind::Unsupported`].

use crate::{StdMutex, TerminalControl, TerminalSize, TerminalStream, lock_ignore_poison};
use std::io;

#[cfg(unix)]
use rustix::{fd::{AsFd, BorrowedFd},
             termios::{self, OptionalActions, Termios}};
#[cfg(unix)]
use std::fs::File;

/// The real terminal. The original terminal attributes are saved by the first
/// [`TerminalControl::enable_raw_mode`] call and restored (and forgotten) by
/// [`TerminalControl::disable_raw_mode`].
#[derive(Debug, Default)]
pub struct PosixTerminal {
    #[cfg(unix)]
    original_termios: StdMutex<Option<Termios>>,
    #[cfg(not(unix))]
    original_termios: StdMutex<Option<()>>,
}

/// Represents either stdin or `/dev/tty` for terminal operations.
///
/// This enum allows us to handle both cases where stdin is a tty (normal terminal usage)
/// and where stdin is redirected (e.g., piped input), requiring us to use `/dev/tty`.
#[cfg(unix)]
enum TerminalFd {
    Stdin(io::Stdin),
    DevTty(File),
}

#[cfg(unix)]
impl AsFd for TerminalFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            TerminalFd::Stdin(stdin) => stdin.as_fd(),
            TerminalFd::DevTty(file) => file.as_fd(),
        }
    }
}

/// Checks if stdin is a tty and uses it if so; otherwise opens `/dev/tty`.
#[cfg(unix)]
fn get_terminal_fd() -> io::Result<TerminalFd> {
    let stdin = io::stdin();
    if termios::isatty(&stdin) {
        Ok(TerminalFd::Stdin(stdin))
    } else {
        let file = File::options().read(true).write(true).open("/dev/tty")?;
        Ok(TerminalFd::DevTty(file))
    }
}

#[cfg(unix)]
impl TerminalControl for PosixTerminal {
    fn enable_raw_mode(&self) -> io::Result<()> {
        let fd = get_terminal_fd()?;
        let mut termios = termios::tcgetattr(&fd)?;

        {
            let mut original = lock_ignore_poison(&self.original_termios);
            if original.is_none() {
                *original = Some(termios.clone());
            }
        }

        // Same as cfmakeraw: no canonical mode, no echo, no signal generation, no output
        // post processing, VMIN=1 and VTIME=0.
        termios.make_raw();
        termios::tcsetattr(&fd, OptionalActions::Now, &termios)?;
        Ok(())
    }

    fn disable_raw_mode(&self) -> io::Result<()> {
        let maybe_original = lock_ignore_poison(&self.original_termios).take();
        if let Some(original) = maybe_original {
            let fd = get_terminal_fd()?;
            termios::tcsetattr(&fd, OptionalActions::Now, &original)?;
        }
        Ok(())
    }

    fn size(&self, stream: TerminalStream) -> io::Result<TerminalSize> {
        let winsize = match stream {
            TerminalStream::Stdin => termios::tcgetwinsize(io::stdin())?,
            TerminalStream::Stdout => termios::tcgetwinsize(io::stdout())?,
            TerminalStream::Stderr => termios::tcgetwinsize(io::stderr())?,
        };
        if winsize.ws_col == 0 {
            return Err(io::Error::other(format!("{stream} reports a zero width")));
        }
        Ok(TerminalSize {
            cols: winsize.ws_col,
            rows: winsize.ws_row,
        })
    }

    fn is_terminal(&self, stream: TerminalStream) -> bool {
        match stream {
            TerminalStream::Stdin => termios::isatty(io::stdin()),
            TerminalStream::Stdout => termios::isatty(io::stdout()),
            TerminalStream::Stderr => termios::isatty(io::stderr()),
        }
    }
}

#[cfg(not(unix))]
impl TerminalControl for PosixTerminal {
    fn enable_raw_mode(&self) -> io::Result<()> { Err(unsupported()) }

    fn disable_raw_mode(&self) -> io::Result<()> { Err(unsupported()) }

    fn size(&self, _stream: TerminalStream) -> io::Result<TerminalSize> {
        Err(unsupported())
    }

    fn is_terminal(&self, _stream: TerminalStream) -> bool { false }
}

#[cfg(not(unix))]
fn unsupported() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "platform not supported")
}
