// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{CachedError, InputTask, KeyDispatcher, RawModeGuard, SessionSlot,
            enter_raw_mode, exit_raw_mode, query_terminal_size};
use crate::{InputSource, LineBuffer, OutputDevice, PosixTerminal, PrefillWriter,
            ReadlineConfig, ReadlineError, StdMutex, SubscriptionId, TerminalControl,
            TerminalSignalHub, TerminalSize, TerminalStream, TokioMutex,
            UnicodeWidthModel, lock_ignore_poison, ok, spawn_os_signal_forwarder};
use std::{future::Future,
          io,
          pin::pin,
          sync::{Arc,
                 atomic::{AtomicBool, Ordering}},
          time::Duration};
use tokio::{sync::{broadcast, mpsc},
            task::JoinHandle};

/// Room for exactly one unclaimed result.
pub const RESULT_MAILBOX_CAPACITY: usize = 1;

/// A line editing session on a terminal.
///
/// Creating a session spawns the background input task, which reads keystrokes and edits
/// the [`LineBuffer`] for as long as the session lives, whether or not anybody is
/// waiting for a line. Reads ([`Self::read_line`] and friends) are serialized: each one
/// takes the session lock, puts the terminal in raw mode, draws the prompt and waits for
/// the next finished line. The terminal is restored however the read ends, including
/// when its future is dropped.
///
/// Once the input task stops (end of input, `Ctrl+C`, `Ctrl+D` on an empty line, or a
/// read error) every later read fails with the same error.
///
/// Call [`Self::close`] when done. Dropping the session without closing it stops the
/// input task and restores the terminal, but can't wait for the task to finish.
#[derive(Debug)]
pub struct ReadlineSession {
    config: ReadlineConfig,
    line_buffer: Arc<LineBuffer>,
    output_device: OutputDevice,
    terminal: Arc<dyn TerminalControl>,
    slot: TokioMutex<SessionSlot>,
    cached_error: CachedError,
    prefill_writer: PrefillWriter,
    shutdown_sender: broadcast::Sender<()>,
    input_task_handle: StdMutex<Option<JoinHandle<()>>>,
    signal_hub: TerminalSignalHub,
    subscription_id: SubscriptionId,
    os_signal_forwarder: StdMutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl ReadlineSession {
    /// Start a session on the process's stdin and stdout, listening to `SIGWINCH` and
    /// `SIGPIPE`. Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::Terminal`] if stdin is already owned by another session, or if
    ///   the signal handlers can't be registered.
    /// - [`ReadlineError::InvalidScreenWidth`] if the terminal width is unavailable and
    ///   the configured fallback is 0.
    pub fn try_new_stdio(config: ReadlineConfig) -> Result<Self, ReadlineError> {
        let input = InputSource::new_stdin().map_err(ReadlineError::terminal)?;
        let signal_hub = TerminalSignalHub::new();
        let os_signal_forwarder =
            spawn_os_signal_forwarder(signal_hub.clone()).map_err(ReadlineError::terminal)?;

        match Self::try_new(
            config,
            input,
            OutputDevice::new_stdout(),
            Arc::new(PosixTerminal::default()),
            signal_hub,
        ) {
            Ok(session) => {
                *lock_ignore_poison(&session.os_signal_forwarder) = Some(os_signal_forwarder);
                ok!(session)
            }
            Err(err) => {
                os_signal_forwarder.abort();
                Err(err)
            }
        }
    }

    /// Start a session that reads keystrokes from `reader`.
    ///
    /// # Errors
    ///
    /// See [`Self::try_new`].
    pub fn try_new_from_reader(
        config: ReadlineConfig,
        reader: impl tokio::io::AsyncRead + Send + 'static,
        output_device: OutputDevice,
        terminal: Arc<dyn TerminalControl>,
        signal_hub: TerminalSignalHub,
    ) -> Result<Self, ReadlineError> {
        let input = InputSource::new_with_read_buffer_size(reader, config.input_buffer_size);
        Self::try_new(config, input, output_device, terminal, signal_hub)
    }

    /// Start a session with every dependency injected. Must be called from within a tokio
    /// runtime, since it spawns the input task.
    ///
    /// The screen width comes from the terminal (stdout, then stderr), falling back to
    /// [`ReadlineConfig::fallback_screen_width`]. Rendering is on when stdin is a
    /// terminal or [`ReadlineConfig::force_interactive`] is set.
    ///
    /// # Errors
    ///
    /// Returns [`ReadlineError::InvalidScreenWidth`] if the resolved width is 0.
    pub fn try_new(
        config: ReadlineConfig,
        input: (InputSource, PrefillWriter),
        output_device: OutputDevice,
        terminal: Arc<dyn TerminalControl>,
        signal_hub: TerminalSignalHub,
    ) -> Result<Self, ReadlineError> {
        let (input_source, prefill_writer) = input;

        let screen_width = query_terminal_size(&*terminal)
            .map_or(config.fallback_screen_width, |size| size.cols);
        let interactive = config.force_interactive || terminal.is_terminal(TerminalStream::Stdin);
        let line_buffer = Arc::new(LineBuffer::try_new(
            &config.prompt,
            config.mask,
            interactive,
            i32::from(screen_width),
            output_device.clone(),
            Arc::new(UnicodeWidthModel),
        )?);

        let (result_sender, result_receiver) = mpsc::channel(RESULT_MAILBOX_CAPACITY);
        let (shutdown_sender, shutdown_receiver) = broadcast::channel(1);
        let cached_error = CachedError::default();
        let subscription = signal_hub.subscribe();

        let input_task = InputTask {
            input_source,
            dispatcher: KeyDispatcher::new(
                line_buffer.clone(),
                output_device.clone(),
                config.hooks.clone(),
                result_sender,
            ),
            signal_receiver: subscription.receiver,
            terminal: terminal.clone(),
            shutdown_receiver,
            cached_error: cached_error.clone(),
        };
        let input_task_handle = input_task.spawn();

        tracing::debug!(
            message = "readline session started",
            screen_width,
            interactive,
            prompt = %config.prompt
        );

        ok!(Self {
            config,
            line_buffer,
            output_device,
            terminal,
            slot: TokioMutex::new(SessionSlot {
                result_receiver,
                raw_mode_active: false,
            }),
            cached_error,
            prefill_writer,
            shutdown_sender,
            input_task_handle: StdMutex::new(Some(input_task_handle)),
            signal_hub,
            subscription_id: subscription.id,
            os_signal_forwarder: StdMutex::new(None),
            closed: AtomicBool::new(false),
        })
    }

    /// Shared with the input task. Queries and edits are safe from any thread.
    #[must_use]
    pub fn line_buffer(&self) -> &Arc<LineBuffer> { &self.line_buffer }

    #[must_use]
    pub fn config(&self) -> &ReadlineConfig { &self.config }

    /// Queue `bytes` ahead of live input; they are edited exactly as if typed.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::BrokenPipe`] once the input task has stopped.
    pub fn prefill(&self, bytes: &[u8]) -> io::Result<()> { self.prefill_writer.prefill(bytes) }

    #[must_use]
    pub fn prefill_writer(&self) -> PrefillWriter { self.prefill_writer.clone() }

    /// Write `bytes` to the output untouched, ignoring the prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ReadlineError::Terminal`] if the output device fails.
    pub fn write(&self, bytes: &[u8]) -> Result<(), ReadlineError> {
        self.output_device
            .write_and_flush(bytes)
            .map_err(ReadlineError::terminal)
    }

    /// Print `bytes` above the prompt (see [`LineBuffer::print_above`]).
    ///
    /// # Errors
    ///
    /// Returns [`ReadlineError::Terminal`] if the output device fails.
    pub fn print_above(&self, bytes: &[u8]) -> Result<(), ReadlineError> {
        self.line_buffer
            .print_above(bytes)
            .map_err(ReadlineError::terminal)
    }

    /// Put the terminal in raw mode outside of a read. Waits for a pending read to
    /// finish first.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::AlreadyInRawMode`] if raw mode is already on.
    /// - [`ReadlineError::Terminal`] if the terminal refuses.
    pub async fn enter_raw_mode(&self) -> Result<(), ReadlineError> {
        enter_raw_mode(&*self.terminal, &mut *self.slot.lock().await)
    }

    /// # Errors
    ///
    /// - [`ReadlineError::NotInRawMode`] if raw mode is off.
    /// - [`ReadlineError::Terminal`] if the terminal refuses.
    pub async fn exit_raw_mode(&self) -> Result<(), ReadlineError> {
        exit_raw_mode(&*self.terminal, &mut *self.slot.lock().await)
    }

    #[must_use]
    pub fn terminal_size(&self) -> Option<TerminalSize> { query_terminal_size(&*self.terminal) }

    #[must_use]
    pub fn width(&self) -> Option<u16> { self.terminal_size().map(|it| it.cols) }

    #[must_use]
    pub fn height(&self) -> Option<u16> { self.terminal_size().map(|it| it.rows) }

    /// Whether the input task has stopped (and no more lines will be produced).
    #[must_use]
    pub fn is_input_task_finished(&self) -> bool {
        lock_ignore_poison(&self.input_task_handle)
            .as_ref()
            .is_none_or(JoinHandle::is_finished)
    }

    fn cached_error(&self) -> Option<ReadlineError> {
        lock_ignore_poison(&self.cached_error).clone()
    }

    /// Wait for the next line, or until `cancel` completes.
    ///
    /// A line that was finished while nobody was reading is returned right away, even if
    /// the input task has stopped since.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::Cancelled`] if `cancel` completes first. Input typed so far stays
    ///   in the buffer.
    /// - The error that stopped the input task ([`ReadlineError::Interrupted`],
    ///   [`ReadlineError::EndOfInput`], [`ReadlineError::InputFailed`]).
    /// - [`ReadlineError::AlreadyInRawMode`] if raw mode was entered with
    ///   [`Self::enter_raw_mode`] and not exited.
    /// - [`ReadlineError::Terminal`] if the terminal refuses raw mode.
    pub async fn read_bytes_cancellable(
        &self,
        cancel: impl Future,
    ) -> Result<Vec<u8>, ReadlineError> {
        let mut cancel = pin!(cancel);

        let mut slot = tokio::select! {
            biased;
            slot = self.slot.lock() => slot,
            _ = &mut cancel => return Err(ReadlineError::Cancelled),
        };

        if let Ok(result) = slot.result_receiver.try_recv() {
            return result.into_result();
        }
        if let Some(error) = self.cached_error() {
            return Err(error);
        }

        let mut guard = RawModeGuard::try_new(&*self.terminal, slot)?;
        self.line_buffer.refresh();

        let maybe_result = tokio::select! {
            biased;
            it = guard.result_receiver.recv() => it,
            _ = &mut cancel => {
                tracing::debug!(message = "read cancelled");
                return Err(ReadlineError::Cancelled);
            }
        };

        match maybe_result {
            Some(result) => result.into_result(),
            None => Err(self.cached_error().unwrap_or(ReadlineError::EndOfInput)),
        }
    }

    /// # Errors
    ///
    /// See [`Self::read_bytes_cancellable`].
    pub async fn read_bytes(&self) -> Result<Vec<u8>, ReadlineError> {
        self.read_bytes_cancellable(std::future::pending::<()>()).await
    }

    /// # Errors
    ///
    /// [`ReadlineError::Cancelled`] when `timeout` elapses, otherwise see
    /// [`Self::read_bytes_cancellable`].
    pub async fn read_bytes_timeout(&self, timeout: Duration) -> Result<Vec<u8>, ReadlineError> {
        self.read_bytes_cancellable(tokio::time::sleep(timeout)).await
    }

    /// Like [`Self::read_bytes_cancellable`], with invalid UTF-8 replaced by `U+FFFD`.
    ///
    /// # Errors
    ///
    /// See [`Self::read_bytes_cancellable`].
    pub async fn read_string_cancellable(
        &self,
        cancel: impl Future,
    ) -> Result<String, ReadlineError> {
        let bytes = self.read_bytes_cancellable(cancel).await?;
        ok!(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// # Errors
    ///
    /// See [`Self::read_bytes_cancellable`].
    pub async fn read_string(&self) -> Result<String, ReadlineError> {
        self.read_string_cancellable(std::future::pending::<()>()).await
    }

    /// # Errors
    ///
    /// See [`Self::read_bytes_timeout`].
    pub async fn read_string_timeout(&self, timeout: Duration) -> Result<String, ReadlineError> {
        self.read_string_cancellable(tokio::time::sleep(timeout)).await
    }

    /// Same as [`Self::read_string_cancellable`].
    ///
    /// # Errors
    ///
    /// See [`Self::read_bytes_cancellable`].
    pub async fn read_line_cancellable(
        &self,
        cancel: impl Future,
    ) -> Result<String, ReadlineError> {
        self.read_string_cancellable(cancel).await
    }

    /// Same as [`Self::read_string`].
    ///
    /// # Errors
    ///
    /// See [`Self::read_bytes_cancellable`].
    pub async fn read_line(&self) -> Result<String, ReadlineError> { self.read_string().await }

    /// Same as [`Self::read_string_timeout`].
    ///
    /// # Errors
    ///
    /// See [`Self::read_bytes_timeout`].
    pub async fn read_line_timeout(&self, timeout: Duration) -> Result<String, ReadlineError> {
        self.read_string_timeout(timeout).await
    }

    /// Stop the input task and wait for it, stop listening for terminal signals, and
    /// leave raw mode if it is still on. Only the first call does anything.
    ///
    /// # Errors
    ///
    /// Returns [`ReadlineError::Terminal`] if the terminal can't be restored.
    pub async fn close(&self) -> Result<(), ReadlineError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return ok!();
        }
        tracing::debug!(message = "closing readline session");

        // Fails only if the task already stopped and dropped its receiver.
        let _ = self.shutdown_sender.send(());
        let maybe_handle = lock_ignore_poison(&self.input_task_handle).take();
        if let Some(handle) = maybe_handle
            && let Err(err) = handle.await
        {
            tracing::warn!(message = "input task did not finish cleanly", error = ?err);
        }

        self.signal_hub.unsubscribe(self.subscription_id);
        if let Some(forwarder) = lock_ignore_poison(&self.os_signal_forwarder).take() {
            forwarder.abort();
        }

        match exit_raw_mode(&*self.terminal, &mut *self.slot.lock().await) {
            Ok(()) | Err(ReadlineError::NotInRawMode) => ok!(),
            Err(err) => Err(err),
        }
    }
}

impl Drop for ReadlineSession {
    fn drop(&mut self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.shutdown_sender.send(());
            if let Some(handle) = lock_ignore_poison(&self.input_task_handle).take() {
                handle.abort();
            }
            self.signal_hub.unsubscribe(self.subscription_id);
            if let Some(forwarder) = lock_ignore_poison(&self.os_signal_forwarder).take() {
                forwarder.abort();
            }
        }

        let slot = self.slot.get_mut();
        if slot.raw_mode_active
            && let Err(err) = self.terminal.disable_raw_mode()
        {
            tracing::warn!(message = "Failed to restore terminal on drop", error = ?err);
        }
        slot.raw_mode_active = false;
    }
}
