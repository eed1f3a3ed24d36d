// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words SIGWINCH SIGPIPE

use crate::{TerminalSignal, TerminalSignalHub};
use std::io;
use tokio::task::JoinHandle;

/// Spawn a task that publishes `SIGWINCH` as [`TerminalSignal::Resized`] and `SIGPIPE` as
/// [`TerminalSignal::BrokenPipe`] into `hub`. The task runs until it is aborted or the
/// runtime shuts down. Must be called from within a tokio runtime.
///
/// On platforms without unix signals the task does nothing.
///
/// # Errors
///
/// Returns an error if the signal handlers can't be registered.
#[cfg(unix)]
pub fn spawn_os_signal_forwarder(hub: TerminalSignalHub) -> io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigwinch = signal(SignalKind::window_change())?;
    let mut sigpipe = signal(SignalKind::pipe())?;

    Ok(tokio::spawn(async move {
        loop {
            let terminal_signal = tokio::select! {
                it = sigwinch.recv() => match it {
                    Some(()) => TerminalSignal::Resized,
                    None => break,
                },
                it = sigpipe.recv() => match it {
                    Some(()) => TerminalSignal::BrokenPipe,
                    None => break,
                },
            };
            tracing::debug!(message = "os signal forwarded", %terminal_signal);
            hub.publish(terminal_signal);
        }
    }))
}

#[cfg(not(unix))]
pub fn spawn_os_signal_forwarder(hub: TerminalSignalHub) -> io::Result<JoinHandle<()>> {
    drop(hub);
    Ok(tokio::spawn(async {}))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forwarder_can_be_spawned_and_aborted() {
        let hub = TerminalSignalHub::new();
        let handle = spawn_os_signal_forwarder(hub).unwrap();
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}
