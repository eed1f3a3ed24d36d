// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Internal control flow for loops that either keep going or stop with an error. This is
/// used primarily to make testing of the input loop easier, since a single keystroke can
/// be fed to the dispatcher and the outcome inspected.
#[derive(Debug, PartialEq, Clone)]
pub enum ControlFlowLimited<E> {
    ReturnError(E),
    Continue,
}

impl<E> ControlFlowLimited<E> {
    #[must_use]
    pub fn is_continue(&self) -> bool { matches!(self, ControlFlowLimited::Continue) }
}
