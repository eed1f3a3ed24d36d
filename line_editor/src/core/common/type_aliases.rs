// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use smallvec::SmallVec;
use std::sync::{Arc, MutexGuard, PoisonError};

/// Disambiguate the type of `StdMutex` from stdlib and tokio to avoid conflicts.
pub type StdMutex<T> = std::sync::Mutex<T>;

/// Disambiguate the type of `TokioMutex` from stdlib and tokio to avoid conflicts.
pub type TokioMutex<T> = tokio::sync::Mutex<T>;

/// Type alias for a `Send`-able output device (raw terminal, mock, etc).
pub type SendRawTerminal = dyn std::io::Write + Send;

/// Type alias for a `Send`-able raw terminal wrapped in an `Arc<StdMutex>`.
pub type SafeRawTerminal = Arc<StdMutex<SendRawTerminal>>;

/// Stack allocated storage for the bytes of a single keystroke. A UTF-8 codepoint is at
/// most 4 bytes.
pub type KeystrokeBytes = SmallVec<[u8; 4]>;

/// Lock a [`StdMutex`], recovering the guard if another thread panicked while holding
/// it. The data guarded in this crate (line buffer state, raw mode bookkeeping) stays
/// consistent across a panic because every mutation is completed before the guard is
/// released.
pub fn lock_ignore_poison<T: ?Sized>(mutex: &StdMutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
