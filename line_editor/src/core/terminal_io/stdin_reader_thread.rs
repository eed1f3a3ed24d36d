// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A dedicated thread that owns [`std::io::stdin()`] for the lifetime of the process.
//!
//! [`tokio::io::stdin()`] runs its blocking reads on the tokio blocking pool. When such a
//! read loses a race inside [`tokio::select!`] the blocking read keeps going, and
//! creating a fresh handle afterwards makes the bytes it already pulled from the kernel
//! unreachable. Typed ahead keys are dropped between two consecutive line editing
//! sessions.
//!
//! Instead, a single thread does blocking reads and forwards them over a
//! [`tokio::sync::mpsc`] channel, and receiving from a channel is cancel safe. The
//! receiver is checked out by the [`crate::InputSource`] that reads stdin and checked
//! back in when that source is dropped, so the next session picks up exactly where the
//! previous one left off.
//!
//! ```text
//! ┌──────────────────────┐        ┌───────────────────────────────┐
//! │ "stdin-reader"       │        │ session input task            │
//! │ loop {               │  mpsc  │ select! {                     │
//! │   stdin.read()       │───────▶│   bytes = rx.recv() => ...    │
//! │   tx.send(bytes)     │        │   signal = hub.recv() => ...  │
//! │ }                    │        │ }                             │
//! └──────────────────────┘        └───────────────────────────────┘
//! ```

use crate::{StdMutex, lock_ignore_poison};
use std::io;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// How much is pulled from the kernel per read syscall.
const STDIN_READ_BUFFER_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdinReadResult {
    Data(Vec<u8>),
    Eof,
    Error(io::ErrorKind),
}

pub type StdinSender = UnboundedSender<StdinReadResult>;
pub type StdinReceiver = UnboundedReceiver<StdinReadResult>;

#[derive(Debug)]
enum StdinSlot {
    NotStarted,
    Available(StdinReceiver),
    CheckedOut,
}

static STDIN_SLOT: StdMutex<StdinSlot> = StdMutex::new(StdinSlot::NotStarted);

/// Take ownership of the receiving end of the stdin channel, spawning the reader thread
/// on first use.
///
/// # Errors
///
/// - [`io::ErrorKind::ResourceBusy`] if another [`crate::InputSource`] currently owns
///   stdin.
/// - The error from [`std::thread::Builder::spawn`] if the thread can't be started.
pub fn checkout_stdin_receiver() -> io::Result<StdinReceiver> {
    let mut slot = lock_ignore_poison(&STDIN_SLOT);
    match std::mem::replace(&mut *slot, StdinSlot::CheckedOut) {
        StdinSlot::Available(receiver) => Ok(receiver),
        StdinSlot::NotStarted => spawn_stdin_reader_thread().inspect_err(|_| {
            *slot = StdinSlot::NotStarted;
        }),
        StdinSlot::CheckedOut => Err(io::Error::new(
            io::ErrorKind::ResourceBusy,
            "stdin is already owned by another input source",
        )),
    }
}

/// Give the receiver back so the next [`crate::InputSource`] gets any bytes that were
/// read but not consumed.
pub fn checkin_stdin_receiver(receiver: StdinReceiver) {
    *lock_ignore_poison(&STDIN_SLOT) = StdinSlot::Available(receiver);
}

fn spawn_stdin_reader_thread() -> io::Result<StdinReceiver> {
    let (sender, receiver) = unbounded_channel();
    std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || stdin_reader_loop(io::stdin().lock(), &sender))?;
    Ok(receiver)
}

/// Runs until end of input, a read error, or the receiver is dropped for good. An
/// interrupted read is forwarded (so the input task can drop a partial escape sequence)
/// and reading carries on.
fn stdin_reader_loop(mut source: impl io::Read, sender: &StdinSender) {
    let mut buffer = [0u8; STDIN_READ_BUFFER_SIZE];

    loop {
        match source.read(&mut buffer) {
            Ok(0) => {
                tracing::debug!(message = "stdin-reader: end of input");
                drop(sender.send(StdinReadResult::Eof));
                break;
            }
            Ok(count) => {
                if sender
                    .send(StdinReadResult::Data(buffer[..count].to_vec()))
                    .is_err()
                {
                    tracing::debug!(message = "stdin-reader: receiver dropped, exiting");
                    break;
                }
            }
            Err(ref error) if error.kind() == io::ErrorKind::Interrupted => {
                tracing::debug!(message = "stdin-reader: interrupted, retrying");
                if sender
                    .send(StdinReadResult::Error(io::ErrorKind::Interrupted))
                    .is_err()
                {
                    break;
                }
            }
            Err(error) => {
                tracing::debug!(message = "stdin-reader: error", ?error);
                drop(sender.send(StdinReadResult::Error(error.kind())));
                break;
            }
        }
    }
}
