// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::KeyDispatcher;
use crate::{ControlFlowLimited, InputSource, LineResult, ReadlineError, StdMutex, TerminalControl,
            TerminalSignal, TerminalSize, TerminalStream, is_transient_read_error,
            lock_ignore_poison};
use std::{io, sync::Arc};
use tokio::{sync::{broadcast, mpsc},
            task::JoinHandle};

/// The error that stopped the input task. Once set it never changes, and every later
/// read returns a copy of it.
pub type CachedError = Arc<StdMutex<Option<ReadlineError>>>;

/// Stdout first, since that's where the line is drawn.
pub fn query_terminal_size(terminal: &dyn TerminalControl) -> Option<TerminalSize> {
    terminal
        .size(TerminalStream::Stdout)
        .or_else(|_| terminal.size(TerminalStream::Stderr))
        .ok()
}

/// The single background task that owns the input for the whole life of a session.
#[derive(Debug)]
pub struct InputTask {
    pub input_source: InputSource,
    pub dispatcher: KeyDispatcher,
    pub signal_receiver: mpsc::Receiver<TerminalSignal>,
    pub terminal: Arc<dyn TerminalControl>,
    pub shutdown_receiver: broadcast::Receiver<()>,
    pub cached_error: CachedError,
}

enum LoopEvent {
    Shutdown,
    Signal(TerminalSignal),
    Read(io::Result<usize>),
}

impl InputTask {
    pub fn spawn(self) -> JoinHandle<()> { tokio::spawn(self.run()) }

    /// Runs until the input ends, fails, a keystroke stops it (`Ctrl+C`, `Ctrl+D`), or
    /// shutdown is requested. The reason is published as the final result and cached.
    pub async fn run(mut self) {
        tracing::debug!(message = "input task started");

        let error = loop {
            if let ControlFlowLimited::ReturnError(error) = self.drain_pending() {
                break error;
            }

            let event = tokio::select! {
                biased;

                _ = self.shutdown_receiver.recv() => LoopEvent::Shutdown,
                Some(signal) = self.signal_receiver.recv() => LoopEvent::Signal(signal),
                result = self.input_source.fill() => LoopEvent::Read(result),
            };

            match event {
                LoopEvent::Shutdown => {
                    tracing::debug!(message = "input task shutdown requested");
                    break self.stop(ReadlineError::EndOfInput);
                }
                LoopEvent::Signal(signal) => self.handle_signal(signal),
                LoopEvent::Read(Ok(0)) => break self.stop(ReadlineError::EndOfInput),
                LoopEvent::Read(Ok(_)) => {}
                LoopEvent::Read(Err(err)) if is_transient_read_error(&err) => {
                    tracing::debug!(message = "read interrupted, retrying");
                    self.dispatcher.reset_escape();
                }
                LoopEvent::Read(Err(err)) => {
                    tracing::error!(message = "input failed", error = ?err);
                    break self.stop(ReadlineError::input_failed(err));
                }
            }
        };

        tracing::debug!(message = "input task stopped", reason = %error);
        lock_ignore_poison(&self.cached_error).get_or_insert(error);
    }

    fn stop(&self, error: ReadlineError) -> ReadlineError {
        self.dispatcher.publish(LineResult::Failed(error.clone()));
        error
    }

    /// Dispatch every complete keystroke that has already arrived.
    fn drain_pending(&mut self) -> ControlFlowLimited<ReadlineError> {
        while let Some(keystroke) = self.input_source.next_chunk() {
            let control_flow = self.dispatcher.dispatch_keystroke(&keystroke);
            if !control_flow.is_continue() {
                return control_flow;
            }
        }
        ControlFlowLimited::Continue
    }

    fn handle_signal(&self, signal: TerminalSignal) {
        tracing::debug!(message = "terminal signal", %signal);
        let line_buffer = &self.dispatcher.line_buffer;
        match signal {
            TerminalSignal::Resized => {
                let Some(size) = query_terminal_size(&*self.terminal) else {
                    tracing::warn!(message = "resized, but the terminal size is unavailable");
                    return;
                };
                if let Err(err) = line_buffer.set_screen_width(i32::from(size.cols)) {
                    tracing::warn!(message = "Ignoring terminal size", error = ?err);
                }
            }
            TerminalSignal::BrokenPipe => line_buffer.set_interactive(false),
        }
    }
}
