// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words readline termios

//! # r3bl_line_editor
//!
//! An async line editor for terminal programs. It puts the terminal in raw mode, renders
//! a prompt, decodes raw keystrokes (multi-byte UTF-8 and ANSI escape sequences), keeps
//! an editable buffer with a single slot kill ring, and redraws only the region it owns
//! using wrap aware cursor repositioning.
//!
//! # Mental model
//!
//! ```text
//! ┌──────────────┐  bytes   ┌──────────────────┐  ops   ┌──────────────┐  ANSI  ┌──────────┐
//! │ InputSource  ├─────────►│ background task  ├───────►│  LineBuffer  ├───────►│ Output   │
//! │ (+ prefill)  │          │ EscapeDecoder +  │        │ (std Mutex)  │        │ Device   │
//! └──────────────┘          │ KeyDispatcher    │        └──────────────┘        └──────────┘
//!                           └────────┬─────────┘
//!                                    │ LineResult (single slot mailbox)
//!                           ┌────────▼─────────┐
//!                           │ ReadlineSession  │◄──── read_line() / read_line_cancellable()
//!                           │ (session lock +  │
//!                           │  raw mode guard) │
//!                           └──────────────────┘
//! ```
//!
//! 1. Exactly one background task consumes input for the lifetime of a
//!    [`ReadlineSession`]. It is the only writer of keystroke driven [`LineBuffer`]
//!    mutations.
//! 2. Each completed line (or fatal input condition) is published as a [`LineResult`]
//!    into a mailbox with room for exactly one value. If nobody claimed the previous
//!    value, the new one is dropped.
//! 3. Callers of [`ReadlineSession::read_line()`] are serialized by a session lock.
//!    Holding it puts the terminal in raw mode, and releasing it (even by dropping the
//!    future) restores the terminal.
//!
//! # Example
//!
//! ```no_run
//! use r3bl_line_editor::{ReadlineConfig, ReadlineError, ReadlineSession};
//!
//! # async fn run() -> miette::Result<()> {
//! let session = ReadlineSession::try_new_stdio(ReadlineConfig::new("> "))?;
//! loop {
//!     match session.read_line().await {
//!         Ok(line) => session.print_above(format!("you typed: {line}\r\n").as_bytes())?,
//!         Err(ReadlineError::Interrupted | ReadlineError::EndOfInput) => break,
//!         Err(err) => return Err(err.into()),
//!     }
//! }
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

// Enforce strict error handling in production library code only. Tests and examples are
// allowed to use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules.
pub mod core;
pub mod readline;

// Re-export.
#[allow(ambiguous_glob_reexports)]
pub use core::*;
#[allow(ambiguous_glob_reexports)]
pub use readline::*;
