// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{StdMutex, TerminalControl, TerminalSize, TerminalStream, lock_ignore_poison};
use std::{io,
          sync::atomic::{AtomicBool, AtomicUsize, Ordering}};

/// In memory [`TerminalControl`]. Counts raw mode transitions and reports whatever size
/// and interactivity the test configures. All setters take `&self` so a test can keep an
/// `Arc<MockTerminal>` and change the "terminal" while a session uses it.
#[derive(Debug)]
pub struct MockTerminal {
    enable_raw_mode_count: AtomicUsize,
    disable_raw_mode_count: AtomicUsize,
    size: StdMutex<Option<TerminalSize>>,
    is_terminal: AtomicBool,
}

impl Default for MockTerminal {
    fn default() -> Self { Self::new(80, 24) }
}

impl MockTerminal {
    #[must_use]
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            enable_raw_mode_count: AtomicUsize::new(0),
            disable_raw_mode_count: AtomicUsize::new(0),
            size: StdMutex::new(Some(TerminalSize { cols, rows })),
            is_terminal: AtomicBool::new(true),
        }
    }

    /// A "terminal" whose size can't be queried, like a pipe.
    #[must_use]
    pub fn new_without_size() -> Self {
        let it = Self::default();
        it.set_size(None);
        it.set_is_terminal(false);
        it
    }

    pub fn set_size(&self, size: Option<TerminalSize>) {
        *lock_ignore_poison(&self.size) = size;
    }

    pub fn set_is_terminal(&self, is_terminal: bool) {
        self.is_terminal.store(is_terminal, Ordering::SeqCst);
    }

    #[must_use]
    pub fn enable_raw_mode_count(&self) -> usize {
        self.enable_raw_mode_count.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn disable_raw_mode_count(&self) -> usize {
        self.disable_raw_mode_count.load(Ordering::SeqCst)
    }

    /// More enables than disables.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        self.enable_raw_mode_count() > self.disable_raw_mode_count()
    }
}

impl TerminalControl for MockTerminal {
    fn enable_raw_mode(&self) -> io::Result<()> {
        self.enable_raw_mode_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn disable_raw_mode(&self) -> io::Result<()> {
        self.disable_raw_mode_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn size(&self, stream: TerminalStream) -> io::Result<TerminalSize> {
        lock_ignore_poison(&self.size).ok_or_else(|| {
            io::Error::other(format!("{stream} is not attached to a terminal"))
        })
    }

    fn is_terminal(&self, _stream: TerminalStream) -> bool {
        self.is_terminal.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counts_raw_mode_transitions() {
        let terminal = MockTerminal::default();
        terminal.enable_raw_mode().unwrap();
        assert!(terminal.is_raw());
        terminal.disable_raw_mode().unwrap();
        assert!(!terminal.is_raw());
        assert_eq!(terminal.enable_raw_mode_count(), 1);
        assert_eq!(terminal.disable_raw_mode_count(), 1);
    }

    #[test]
    fn test_size_can_change_and_disappear() {
        let terminal = MockTerminal::new(100, 40);
        assert_eq!(
            terminal.size(TerminalStream::Stdout).unwrap(),
            TerminalSize {
                cols: 100,
                rows: 40
            }
        );
        terminal.set_size(None);
        assert!(terminal.size(TerminalStream::Stdout).is_err());

        let pipe = MockTerminal::new_without_size();
        assert!(!pipe.is_terminal(TerminalStream::Stdin));
    }
}
