// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{OutputDevice, ReadlineError, StdMutex, WidthModel, lock_ignore_poison};
use std::{fmt::{Debug, Formatter},
          io,
          sync::{Arc, MutexGuard}};

/// Everything the [`LineBuffer`] mutex protects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineBufferState {
    pub text: Vec<char>,
    /// Invariant: `cursor <= text.len()`.
    pub cursor: usize,
    pub prompt: String,
    /// Display width of [`Self::prompt`] with its ANSI styling removed.
    pub prompt_width: usize,
    pub mask: Option<char>,
    pub interactive: bool,
    /// Invariant: `screen_width > 0`.
    pub screen_width: usize,
    /// Single slot kill ring.
    pub kill_slot: Vec<char>,
    /// Set by a clean, cleared by the next print.
    pub dirty_drawn: bool,
    pub backup: Option<(Vec<char>, usize)>,
}

/// The editable line: text, cursor, prompt, kill slot and screen geometry, plus the
/// rendering protocol that keeps the terminal in sync with them.
///
/// Every method takes `&self` and locks an internal [`StdMutex`], so a [`LineBuffer`]
/// is shared as an `Arc` between the background input task (which applies keystrokes)
/// and any caller (which queries it, or drives it from an [`crate::EditorHooks`]
/// implementation).
///
/// # Scoped redraw
///
/// When the buffer is interactive every mutation is wrapped like this, under the lock,
/// and the resulting bytes are sent to the [`OutputDevice`] in a single write:
///
/// 1. clean: erase the region of the screen currently showing the prompt and text.
/// 2. mutate.
/// 3. print: draw the prompt and text again, then move the terminal cursor back to the
///    logical cursor.
///
/// When it is not interactive, only step 2 happens.
pub struct LineBuffer {
    pub(crate) inner: StdMutex<LineBufferState>,
    pub(crate) output_device: OutputDevice,
    pub(crate) width_model: Arc<dyn WidthModel>,
}

impl Debug for LineBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineBuffer")
            .field("state", &*self.lock_state())
            .field("width_model", &self.width_model)
            .finish_non_exhaustive()
    }
}

/// Screen widths arrive as `i32` from terminal reports and callers; only positive
/// values are usable.
///
/// # Errors
///
/// Returns [`ReadlineError::InvalidScreenWidth`] for zero or negative widths.
pub fn validate_screen_width(screen_width: i32) -> Result<usize, ReadlineError> {
    usize::try_from(screen_width)
        .ok()
        .filter(|it| *it > 0)
        .ok_or(ReadlineError::InvalidScreenWidth(screen_width))
}

impl LineBuffer {
    /// # Errors
    ///
    /// Returns [`ReadlineError::InvalidScreenWidth`] if `screen_width` is not positive.
    pub fn try_new(
        prompt: &str,
        mask: Option<char>,
        interactive: bool,
        screen_width: i32,
        output_device: OutputDevice,
        width_model: Arc<dyn WidthModel>,
    ) -> Result<Self, ReadlineError> {
        let screen_width = validate_screen_width(screen_width)?;
        let state = LineBufferState {
            prompt: prompt.to_string(),
            prompt_width: width_model.prompt_width(prompt),
            mask,
            interactive,
            screen_width,
            ..Default::default()
        };
        Ok(Self {
            inner: StdMutex::new(state),
            output_device,
            width_model,
        })
    }

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, LineBufferState> {
        lock_ignore_poison(&self.inner)
    }

    /// Run `mutation` inside a scoped redraw (see the type level docs) and return its
    /// result.
    pub(crate) fn refresh_with<R>(
        &self,
        mutation: impl FnOnce(&mut LineBufferState) -> R,
    ) -> R {
        let mut state = self.lock_state();
        if !state.interactive {
            return mutation(&mut state);
        }
        let model = &*self.width_model;
        let mut out = vec![];
        state.render_clean(model, &mut out);
        let result = mutation(&mut state);
        state.render_print(model, &mut out);
        self.emit(&out);
        result
    }

    /// Send `bytes` to the output device. Rendering errors are not fatal to editing, so
    /// they are logged and dropped.
    pub(crate) fn emit(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if let Err(err) = self.output_device.write_and_flush(bytes) {
            tracing::warn!(message = "Failed to render line buffer", error = ?err);
        }
    }

    /// Redraw without mutating anything.
    pub fn refresh(&self) { self.refresh_with(|_| ()); }

    /// Erase the drawn region without drawing it again. The next redraw skips its own
    /// erase.
    pub fn clean(&self) {
        let mut state = self.lock_state();
        if !state.interactive {
            return;
        }
        let mut out = vec![];
        state.render_clean(&*self.width_model, &mut out);
        self.emit(&out);
    }

    /// Erase the prompt, write `bytes` where it was, and draw the prompt again below
    /// them. All of it happens under the lock, so a keystroke can't be rendered in the
    /// middle.
    ///
    /// # Errors
    ///
    /// Returns the error of the output device. Unlike a redraw, this output belongs to
    /// the caller, so it isn't swallowed.
    pub fn print_above(&self, bytes: &[u8]) -> io::Result<()> {
        let mut state = self.lock_state();
        if !state.interactive {
            drop(state);
            return self.output_device.write_and_flush(bytes);
        }
        let model = &*self.width_model;
        let mut out = vec![];
        state.render_clean(model, &mut out);
        out.extend_from_slice(bytes);
        state.render_print(model, &mut out);
        self.output_device.write_and_flush(&out)
    }

    /// Move the terminal cursor home (`ESC[H`) and redraw, which leaves the prompt at
    /// the top of a cleared screen.
    pub fn clear_screen(&self) {
        let mut state = self.lock_state();
        if !state.interactive {
            return;
        }
        let model = &*self.width_model;
        let mut out = b"\x1b[H".to_vec();
        state.render_clean(model, &mut out);
        state.render_print(model, &mut out);
        self.emit(&out);
    }

    pub fn set_prompt(&self, prompt: &str) {
        let prompt_width = self.width_model.prompt_width(prompt);
        self.refresh_with(|state| {
            state.prompt = prompt.to_string();
            state.prompt_width = prompt_width;
        });
    }

    pub fn set_mask(&self, mask: Option<char>) {
        self.refresh_with(|state| state.mask = mask);
    }

    /// Turning rendering back on draws the line, turning it off draws nothing.
    pub fn set_interactive(&self, interactive: bool) {
        self.lock_state().interactive = interactive;
        self.refresh();
    }

    /// # Errors
    ///
    /// Returns [`ReadlineError::InvalidScreenWidth`] if `screen_width` is not positive,
    /// in which case nothing changes and nothing is redrawn.
    pub fn set_screen_width(&self, screen_width: i32) -> Result<(), ReadlineError> {
        let screen_width = validate_screen_width(screen_width)?;
        self.refresh_with(|state| state.screen_width = screen_width);
        Ok(())
    }
}
