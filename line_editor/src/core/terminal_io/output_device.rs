// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{SafeRawTerminal, SendRawTerminal, StdMutex, lock_ignore_poison};
use std::{io::{self, Write},
          sync::Arc};

pub type LockedOutputDevice<'a> = &'a mut dyn std::io::Write;

/// Macro to simplify locking and getting a mutable reference to the output device.
/// Don't call this again in the same scope, it will deadlock! A safe approach is
/// to use this macro in a separate block scope.
///
/// Usage example:
/// ```
/// use r3bl_line_editor::{lock_output_device_as_mut, OutputDevice, LockedOutputDevice};
/// let device = OutputDevice::new_stdout();
/// { // Start a new block scope to avoid deadlock.
///     let mut_ref: LockedOutputDevice<'_> = lock_output_device_as_mut!(device);
///     let _ = mut_ref.write_all(b"Hello, world!\n");
/// } // The lock is released here.
/// ```
#[macro_export]
macro_rules! lock_output_device_as_mut {
    ($device:expr) => {
        &mut *$device.lock()
    };
}

/// The byte sink that receives the prompt, echoed input, bell bytes and cursor control
/// sequences.
/// - It is safe to clone, all clones share the same underlying writer.
/// - To write to it, see [`Self::lock()`], [`Self::write_and_flush()`] or the
///   [`lock_output_device_as_mut`] macro.
#[derive(Clone)]
pub struct OutputDevice {
    pub resource: SafeRawTerminal,
}

impl std::fmt::Debug for OutputDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputDevice").finish_non_exhaustive()
    }
}

impl Default for OutputDevice {
    fn default() -> Self { Self::new_stdout() }
}

impl OutputDevice {
    #[must_use]
    pub fn new_stdout() -> Self {
        Self {
            resource: Arc::new(StdMutex::new(std::io::stdout())),
        }
    }

    #[must_use]
    pub fn new_stderr() -> Self {
        Self {
            resource: Arc::new(StdMutex::new(std::io::stderr())),
        }
    }

    /// Wrap any writer, eg: a file or a socket.
    pub fn new_from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            resource: Arc::new(StdMutex::new(writer)),
        }
    }
}

impl OutputDevice {
    /// Locks the output device for writing.
    ///
    /// ```
    /// use r3bl_line_editor::{OutputDevice, LockedOutputDevice};
    ///
    /// let device = OutputDevice::new_stdout();
    /// let mut_ref: LockedOutputDevice<'_> = &mut *device.lock();
    /// let _ = mut_ref.write_all(b"Hello, world!\n");
    /// ```
    ///
    /// A poisoned mutex is recovered, since a half written escape sequence is no worse
    /// than the terminal state that caused the panic.
    pub fn lock(&self) -> std::sync::MutexGuard<'_, SendRawTerminal> {
        lock_ignore_poison(&self.resource)
    }

    /// Write all the bytes and flush, holding the lock for both so that the bytes are
    /// not interleaved with output from another clone.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn write_and_flush(&self, bytes: &[u8]) -> io::Result<()> {
        let term = lock_output_device_as_mut!(self);
        term.write_all(bytes)?;
        term.flush()
    }
}

/// Each call locks the device, so concurrent writers can interleave between calls but
/// never inside one.
impl Write for OutputDevice {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.lock().write(buf) }

    fn flush(&mut self) -> io::Result<()> { self.lock().flush() }
}
