// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// ASCII codes of the keys that are bound to an [`EditAction`].
pub mod control_bytes {
    pub const CTRL_A: u8 = 0x01;
    pub const CTRL_B: u8 = 0x02;
    pub const CTRL_C: u8 = 0x03;
    pub const CTRL_D: u8 = 0x04;
    pub const CTRL_E: u8 = 0x05;
    pub const CTRL_F: u8 = 0x06;
    pub const CTRL_G: u8 = 0x07;
    pub const CTRL_H: u8 = 0x08;
    pub const TAB: u8 = 0x09;
    pub const LINE_FEED: u8 = 0x0A;
    pub const CTRL_K: u8 = 0x0B;
    pub const CTRL_L: u8 = 0x0C;
    pub const CARRIAGE_RETURN: u8 = 0x0D;
    pub const CTRL_N: u8 = 0x0E;
    pub const CTRL_P: u8 = 0x10;
    pub const CTRL_R: u8 = 0x12;
    pub const CTRL_S: u8 = 0x13;
    pub const CTRL_T: u8 = 0x14;
    pub const CTRL_U: u8 = 0x15;
    pub const CTRL_W: u8 = 0x17;
    pub const CTRL_Y: u8 = 0x19;
    pub const ESC: u8 = 0x1B;
    pub const BACKSPACE: u8 = 0x7F;
}

/// Written to the output on failed edits and unbound keys.
pub const BELL: u8 = control_bytes::CTRL_G;

/// Editing operations bound to single control bytes (the classic emacs style
/// bindings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum EditAction {
    MoveLineStart,
    MoveBackward,
    Interrupt,
    /// Delete forward, or end of input when the buffer is empty.
    DeleteOrEndOfInput,
    MoveLineEnd,
    MoveForward,
    Bell,
    Backspace,
    Complete,
    Enter,
    Kill,
    ClearScreen,
    HistoryNext,
    HistoryPrev,
    SearchBackward,
    SearchForward,
    Transpose,
    KillFront,
    KillWordFront,
    Yank,
}

impl EditAction {
    /// Control bytes without a binding (and every non control byte) return `None`.
    #[must_use]
    pub fn from_control_byte(byte: u8) -> Option<Self> {
        use control_bytes::*;
        let action = match byte {
            CTRL_A => Self::MoveLineStart,
            CTRL_B => Self::MoveBackward,
            CTRL_C => Self::Interrupt,
            CTRL_D => Self::DeleteOrEndOfInput,
            CTRL_E => Self::MoveLineEnd,
            CTRL_F => Self::MoveForward,
            CTRL_G => Self::Bell,
            CTRL_H | BACKSPACE => Self::Backspace,
            TAB => Self::Complete,
            LINE_FEED | CARRIAGE_RETURN => Self::Enter,
            CTRL_K => Self::Kill,
            CTRL_L => Self::ClearScreen,
            CTRL_N => Self::HistoryNext,
            CTRL_P => Self::HistoryPrev,
            CTRL_R => Self::SearchBackward,
            CTRL_S => Self::SearchForward,
            CTRL_T => Self::Transpose,
            CTRL_U => Self::KillFront,
            CTRL_W => Self::KillWordFront,
            CTRL_Y => Self::Yank,
            _ => return None,
        };
        Some(action)
    }
}

/// C0 controls plus DEL.
#[must_use]
pub fn is_control_byte(byte: u8) -> bool { byte < 0x20 || byte == control_bytes::BACKSPACE }

/// Render control bytes in caret notation (`0x1B` becomes `^[`), leaving every other
/// byte alone. Used when an unfinished escape sequence is flushed as literal text.
#[must_use]
pub fn encode_control_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut acc = Vec::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        if is_control_byte(byte) {
            acc.push(b'^');
            acc.push(byte ^ 0x40);
        } else {
            acc.push(byte);
        }
    }
    acc
}
