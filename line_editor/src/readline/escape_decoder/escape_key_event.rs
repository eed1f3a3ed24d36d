// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::Display;

/// What follows the ESC byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EscapeKind {
    /// ESC followed by a single key, which is how terminals send `Alt+key`.
    Meta(char),
    /// `ESC [` or `ESC O`, optional numeric parameters, then a final byte other than
    /// `~` or `R`. Arrow keys, `Home`, `End`, and their modified forms.
    ArrowOrFunction(char),
    /// `ESC [ n ~`: `Home`, `Insert`, `Delete`, `End`, `PageUp`, `PageDown`.
    TildeSequence,
    /// `ESC [ rows ; cols R`: a cursor position report, which the line editor treats as
    /// a screen size report.
    ResizeReport,
}

/// A fully decoded escape sequence.
///
/// Absent numeric parameters are `None`, so `ESC [ A` and `ESC [ 0 A` can be told
/// apart if needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeKeyEvent {
    pub kind: EscapeKind,
    pub attribute: Option<u32>,
    pub attribute2: Option<u32>,
    /// Bytes that arrived after the end of the sequence. They belong to the next
    /// keystroke.
    pub remainder: Vec<u8>,
}

impl EscapeKeyEvent {
    #[must_use]
    pub fn new(kind: EscapeKind) -> Self {
        Self {
            kind,
            attribute: None,
            attribute2: None,
            remainder: vec![],
        }
    }

    #[must_use]
    pub fn with_attributes(mut self, attribute: Option<u32>, attribute2: Option<u32>) -> Self {
        self.attribute = attribute;
        self.attribute2 = attribute2;
        self
    }

    /// No modifier and no meaningful first parameter (`ESC [ A` or `ESC [ 0 A`).
    #[must_use]
    pub fn is_unmodified(&self) -> bool {
        matches!(self.attribute, None | Some(0)) && self.attribute2.is_none()
    }

    /// The `n` of `ESC [ n ~`.
    #[must_use]
    pub fn tilde_code(&self) -> Option<u32> {
        match self.kind {
            EscapeKind::TildeSequence => self.attribute,
            _ => None,
        }
    }

    /// `(rows, cols)` of `ESC [ rows ; cols R`, when both are present.
    #[must_use]
    pub fn resize_report(&self) -> Option<(u32, u32)> {
        match self.kind {
            EscapeKind::ResizeReport => self.attribute.zip(self.attribute2),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_accessors_only_answer_for_their_kind() {
        let tilde = EscapeKeyEvent::new(EscapeKind::TildeSequence).with_attributes(Some(3), None);
        assert_eq!(tilde.tilde_code(), Some(3));
        assert_eq!(tilde.resize_report(), None);

        let resize =
            EscapeKeyEvent::new(EscapeKind::ResizeReport).with_attributes(Some(24), Some(80));
        assert_eq!(resize.resize_report(), Some((24, 80)));
        assert_eq!(resize.tilde_code(), None);

        let partial = EscapeKeyEvent::new(EscapeKind::ResizeReport).with_attributes(Some(24), None);
        assert_eq!(partial.resize_report(), None);
    }

    #[test]
    fn test_is_unmodified() {
        let arrow = EscapeKind::ArrowOrFunction('A');
        assert!(EscapeKeyEvent::new(arrow).is_unmodified());
        assert!(EscapeKeyEvent::new(arrow).with_attributes(Some(0), None).is_unmodified());
        assert!(!EscapeKeyEvent::new(arrow).with_attributes(Some(1), Some(5)).is_unmodified());
    }
}
