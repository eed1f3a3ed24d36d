// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{EscapeKeyEvent, EscapeKind};
use crate::{control_bytes::ESC, utf8_sequence_len};
use smallvec::SmallVec;

/// How many bytes after ESC are buffered before giving up on decoding them.
pub const ESCAPE_BUFFER_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum DecoderState {
    #[default]
    Normal,
    /// ESC received, nothing after it yet.
    EscapeSeen,
    EscapeAccumulating,
}

/// Result of trying to decode the bytes buffered after ESC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscapeDecode {
    Incomplete,
    Complete(EscapeKeyEvent),
}

/// Result of feeding one keystroke to an active [`EscapeDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscapeStep {
    /// More bytes are needed.
    Pending,
    Decoded(EscapeKeyEvent),
    /// The buffer filled up without a decode. These are the ESC byte and everything
    /// after it, to be treated as typed text.
    Overflow(Vec<u8>),
}

/// Incremental decoder for the bytes that follow an ESC byte. Keystrokes are fed one at
/// a time; the decoder goes back to [`DecoderState::Normal`] after a decode, an
/// overflow, or a [`Self::reset`].
///
/// ```
/// use r3bl_line_editor::{EscapeDecoder, EscapeKind, EscapeStep};
///
/// let mut decoder = EscapeDecoder::default();
/// decoder.begin();
/// assert_eq!(decoder.feed(b"["), EscapeStep::Pending);
/// let EscapeStep::Decoded(event) = decoder.feed(b"A") else { panic!() };
/// assert_eq!(event.kind, EscapeKind::ArrowOrFunction('A'));
/// assert!(!decoder.is_active());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EscapeDecoder {
    state: DecoderState,
    buffer: SmallVec<[u8; ESCAPE_BUFFER_CAPACITY]>,
}

impl EscapeDecoder {
    #[must_use]
    pub fn state(&self) -> DecoderState { self.state }

    /// Whether keystrokes should be fed to [`Self::feed`] instead of being handled as
    /// regular input.
    #[must_use]
    pub fn is_active(&self) -> bool { self.state != DecoderState::Normal }

    /// Call when an ESC byte arrives in [`DecoderState::Normal`].
    pub fn begin(&mut self) {
        self.buffer.clear();
        self.state = DecoderState::EscapeSeen;
    }

    pub fn feed(&mut self, keystroke: &[u8]) -> EscapeStep {
        self.buffer.extend_from_slice(keystroke);
        self.state = DecoderState::EscapeAccumulating;

        match decode_escape_sequence(&self.buffer) {
            EscapeDecode::Complete(event) => {
                self.reset();
                EscapeStep::Decoded(event)
            }
            EscapeDecode::Incomplete if self.buffer.len() < ESCAPE_BUFFER_CAPACITY => {
                EscapeStep::Pending
            }
            EscapeDecode::Incomplete => {
                let mut literal = Vec::with_capacity(self.buffer.len() + 1);
                literal.push(ESC);
                literal.extend_from_slice(&self.buffer);
                self.reset();
                tracing::debug!(
                    message = "Escape sequence overflowed",
                    literal = ?String::from_utf8_lossy(&literal)
                );
                EscapeStep::Overflow(literal)
            }
        }
    }

    /// Drop any partially received sequence.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = DecoderState::Normal;
    }
}

/// Decode the bytes received after ESC.
#[must_use]
pub fn decode_escape_sequence(bytes: &[u8]) -> EscapeDecode {
    let Some(&lead) = bytes.first() else {
        return EscapeDecode::Incomplete;
    };
    if lead == b'[' || lead == b'O' {
        return decode_control_sequence(&bytes[1..]);
    }

    let len = utf8_sequence_len(lead).max(1);
    if bytes.len() < len {
        return EscapeDecode::Incomplete;
    }
    let key = std::str::from_utf8(&bytes[..len])
        .ok()
        .and_then(|it| it.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER);
    let mut event = EscapeKeyEvent::new(EscapeKind::Meta(key));
    event.remainder = bytes[len..].to_vec();
    EscapeDecode::Complete(event)
}

/// `[digits] [; [digits]] final`, the part after `ESC [` or `ESC O`.
fn decode_control_sequence(bytes: &[u8]) -> EscapeDecode {
    let (attribute, mut index) = parse_number(bytes, 0);
    let mut attribute2 = None;
    if bytes.get(index) == Some(&b';') {
        (attribute2, index) = parse_number(bytes, index + 1);
    }
    let Some(&final_byte) = bytes.get(index) else {
        return EscapeDecode::Incomplete;
    };

    let kind = match final_byte {
        b'~' => EscapeKind::TildeSequence,
        b'R' => EscapeKind::ResizeReport,
        other => EscapeKind::ArrowOrFunction(char::from(other)),
    };
    let mut event = EscapeKeyEvent::new(kind).with_attributes(attribute, attribute2);
    event.remainder = bytes[index + 1..].to_vec();
    EscapeDecode::Complete(event)
}

/// Parse the decimal digits starting at `start`, saturating on overflow. Returns the
/// value (`None` if there were no digits) and the index of the first non digit.
fn parse_number(bytes: &[u8], start: usize) -> (Option<u32>, usize) {
    let start = start.min(bytes.len());
    let digits = bytes[start..]
        .iter()
        .take_while(|it| it.is_ascii_digit())
        .count();
    let value = bytes[start..start + digits].iter().fold(None, |acc: Option<u32>, &digit| {
        Some(
            acc.unwrap_or(0)
                .saturating_mul(10)
                .saturating_add(u32::from(digit - b'0')),
        )
    });
    (value, start + digits)
}
