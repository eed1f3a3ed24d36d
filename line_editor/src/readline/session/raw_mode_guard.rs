// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{LineResult, ReadlineError, TerminalControl, ok};
use std::ops::{Deref, DerefMut};
use tokio::sync::{MutexGuard, mpsc};

/// What the session lock protects: the receiving end of the result mailbox, and whether
/// this session put the terminal in raw mode.
#[derive(Debug)]
pub struct SessionSlot {
    pub result_receiver: mpsc::Receiver<LineResult>,
    pub raw_mode_active: bool,
}

/// # Errors
///
/// - [`ReadlineError::AlreadyInRawMode`] if `slot` says raw mode is already on.
/// - [`ReadlineError::Terminal`] if the terminal refuses.
pub fn enter_raw_mode(
    terminal: &dyn TerminalControl,
    slot: &mut SessionSlot,
) -> Result<(), ReadlineError> {
    if slot.raw_mode_active {
        return Err(ReadlineError::AlreadyInRawMode);
    }
    terminal.enable_raw_mode().map_err(ReadlineError::terminal)?;
    slot.raw_mode_active = true;
    ok!()
}

/// If the terminal refuses, `slot` keeps saying raw mode is on, so that the restore can
/// be retried.
///
/// # Errors
///
/// - [`ReadlineError::NotInRawMode`] if `slot` says raw mode is off.
/// - [`ReadlineError::Terminal`] if the terminal refuses.
pub fn exit_raw_mode(
    terminal: &dyn TerminalControl,
    slot: &mut SessionSlot,
) -> Result<(), ReadlineError> {
    if !slot.raw_mode_active {
        return Err(ReadlineError::NotInRawMode);
    }
    terminal.disable_raw_mode().map_err(ReadlineError::terminal)?;
    slot.raw_mode_active = false;
    ok!()
}

/// Holds the session lock and keeps the terminal in raw mode for as long as it lives.
/// Dropping it (on return, on cancellation, or when the read future itself is dropped)
/// restores the terminal and then releases the lock.
#[derive(Debug)]
pub struct RawModeGuard<'a> {
    terminal: &'a dyn TerminalControl,
    slot: MutexGuard<'a, SessionSlot>,
}

impl<'a> RawModeGuard<'a> {
    /// # Errors
    ///
    /// See [`enter_raw_mode`]. On error the lock is released.
    pub fn try_new(
        terminal: &'a dyn TerminalControl,
        mut slot: MutexGuard<'a, SessionSlot>,
    ) -> Result<Self, ReadlineError> {
        enter_raw_mode(terminal, &mut slot)?;
        ok!(Self { terminal, slot })
    }
}

impl Deref for RawModeGuard<'_> {
    type Target = SessionSlot;

    fn deref(&self) -> &Self::Target { &self.slot }
}

impl DerefMut for RawModeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.slot }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = exit_raw_mode(self.terminal, &mut self.slot) {
            tracing::warn!(message = "Failed to restore terminal", error = ?err);
        }
    }
}
