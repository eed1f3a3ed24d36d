// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fan out of process wide terminal notifications (window resized, output pipe closed) to
//! every live line editing session.
//!
//! The hub is a plain value that is passed to each session, so tests can create their
//! own hub and [`TerminalSignalHub::publish`] signals into it directly. In a real program
//! [`crate::spawn_os_signal_forwarder`] connects the hub to `SIGWINCH` and `SIGPIPE`.
//!
//! Every subscriber gets a channel with room for a single notification. Publishing into
//! a full channel is a no-op: a session that hasn't handled the last resize yet will
//! re-query the terminal size anyway, so nothing is lost by coalescing.

use crate::{StdMutex, lock_ignore_poison};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

pub const SIGNAL_CHANNEL_CAPACITY: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TerminalSignal {
    Resized,
    BrokenPipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug)]
pub struct SignalSubscription {
    pub id: SubscriptionId,
    pub receiver: mpsc::Receiver<TerminalSignal>,
}

#[derive(Debug, Clone, Default)]
pub struct TerminalSignalHub {
    inner: Arc<StdMutex<HubState>>,
}

#[derive(Debug, Default)]
struct HubState {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, mpsc::Sender<TerminalSignal>)>,
}

impl TerminalSignalHub {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    pub fn subscribe(&self) -> SignalSubscription {
        let (sender, receiver) = mpsc::channel(SIGNAL_CHANNEL_CAPACITY);
        let mut state = lock_ignore_poison(&self.inner);
        let id = SubscriptionId(state.next_id);
        state.next_id += 1;
        state.subscribers.push((id, sender));
        SignalSubscription { id, receiver }
    }

    /// Unknown ids are ignored, so this is safe to call more than once.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        lock_ignore_poison(&self.inner)
            .subscribers
            .retain(|(it, _)| *it != id);
    }

    /// Deliver `signal` to every subscriber. Subscribers whose receiver was dropped are
    /// pruned.
    pub fn publish(&self, signal: TerminalSignal) {
        lock_ignore_poison(&self.inner).subscribers.retain(|(id, sender)| {
            match sender.try_send(signal) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    tracing::trace!(message = "signal coalesced", ?id, %signal);
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            }
        });
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock_ignore_poison(&self.inner).subscribers.len()
    }
}
