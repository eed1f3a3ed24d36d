// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{BELL, ControlFlowLimited, EditAction, EditorHooks, EscapeDecoder,
            EscapeKeyEvent, EscapeKind, EscapeStep, LineBuffer, LineResult,
            OutputDevice, ReadlineError,
            control_bytes::ESC, encode_control_bytes, is_control_byte};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// `attribute2` values of a modified arrow key (`ESC [ 1 ; n C`).
const MODIFIER_ALT: u32 = 3;
const MODIFIER_CTRL: u32 = 5;

/// Turns keystrokes into [`LineBuffer`] operations. Owned by the background input task;
/// it is the only place where keystrokes mutate the buffer.
///
/// Each call to [`Self::dispatch_keystroke`] handles one keystroke chunk (see
/// [`crate::InputSource::next_chunk`]) and returns
/// [`ControlFlowLimited::ReturnError`] when the input loop has to stop. By then the
/// error has already been published to the result mailbox.
#[derive(Debug)]
pub struct KeyDispatcher {
    pub line_buffer: Arc<LineBuffer>,
    pub output_device: OutputDevice,
    pub hooks: Arc<dyn EditorHooks>,
    pub result_sender: mpsc::Sender<LineResult>,
    pub decoder: EscapeDecoder,
    /// Literal input shifts the text right instead of overwriting it.
    pub insert_mode: bool,
}

impl KeyDispatcher {
    #[must_use]
    pub fn new(
        line_buffer: Arc<LineBuffer>,
        output_device: OutputDevice,
        hooks: Arc<dyn EditorHooks>,
        result_sender: mpsc::Sender<LineResult>,
    ) -> Self {
        Self {
            line_buffer,
            output_device,
            hooks,
            result_sender,
            decoder: EscapeDecoder::default(),
            insert_mode: false,
        }
    }

    pub fn dispatch_keystroke(&mut self, keystroke: &[u8]) -> ControlFlowLimited<ReadlineError> {
        tracing::trace!(
            message = "keystroke",
            keystroke = ?keystroke,
            decoder_state = %self.decoder.state()
        );

        if self.decoder.is_active() {
            return match self.decoder.feed(keystroke) {
                EscapeStep::Pending => ControlFlowLimited::Continue,
                EscapeStep::Decoded(event) => self.dispatch_escape_event(event),
                EscapeStep::Overflow(literal) => {
                    self.write_literal(&encode_control_bytes(&literal), false);
                    ControlFlowLimited::Continue
                }
            };
        }

        match keystroke {
            [] => ControlFlowLimited::Continue,
            [ESC] => {
                self.decoder.begin();
                ControlFlowLimited::Continue
            }
            [byte] if is_control_byte(*byte) => match EditAction::from_control_byte(*byte) {
                Some(action) => self.apply_action(action),
                None => {
                    self.bell();
                    ControlFlowLimited::Continue
                }
            },
            literal => {
                self.write_literal(literal, self.insert_mode);
                ControlFlowLimited::Continue
            }
        }
    }

    /// Drop a partially received escape sequence (eg: the read was interrupted).
    pub fn reset_escape(&mut self) { self.decoder.reset(); }

    /// Hand `result` to the reader. If the previous result was never claimed, this one is
    /// dropped.
    pub fn publish(&self, result: LineResult) {
        match self.result_sender.try_send(result) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::debug!(message = "Result mailbox full, dropping result", ?dropped);
            }
            Err(TrySendError::Closed(dropped)) => {
                tracing::debug!(message = "Result mailbox closed, dropping result", ?dropped);
            }
        }
    }

    /// Publish `error` as the final result and tell the input loop to stop.
    pub fn fail(&self, error: ReadlineError) -> ControlFlowLimited<ReadlineError> {
        self.publish(LineResult::Failed(error.clone()));
        ControlFlowLimited::ReturnError(error)
    }

    pub fn bell(&self) {
        if let Err(err) = self.output_device.write_and_flush(&[BELL]) {
            tracing::warn!(message = "Failed to ring bell", error = ?err);
        }
    }

    fn bell_unless(&self, succeeded: bool) {
        if !succeeded {
            self.bell();
        }
    }

    fn enter(&self) {
        let line_buffer = &self.line_buffer;
        line_buffer.move_line_end();
        line_buffer.write(&['\n']);
        let mut bytes = line_buffer.to_bytes();
        bytes.pop();
        self.hooks.on_line(&bytes);
        self.publish(LineResult::Line(bytes));
        line_buffer.reset_without_redraw();
    }

    pub fn apply_action(&self, action: EditAction) -> ControlFlowLimited<ReadlineError> {
        let line_buffer = &*self.line_buffer;
        let hooks = &*self.hooks;
        match action {
            EditAction::MoveLineStart => self.bell_unless(line_buffer.move_line_start()),
            EditAction::MoveBackward => self.bell_unless(line_buffer.move_backward()),
            EditAction::MoveLineEnd => self.bell_unless(line_buffer.move_line_end()),
            EditAction::MoveForward => self.bell_unless(line_buffer.move_forward()),
            EditAction::Interrupt => return self.fail(ReadlineError::Interrupted),
            EditAction::DeleteOrEndOfInput => {
                if line_buffer.is_empty() {
                    return self.fail(ReadlineError::EndOfInput);
                }
                self.bell_unless(line_buffer.delete());
            }
            EditAction::Bell => self.bell(),
            EditAction::Backspace => self.bell_unless(line_buffer.backspace()),
            EditAction::Complete => self.bell_unless(hooks.complete(line_buffer)),
            EditAction::Enter => self.enter(),
            EditAction::Kill => self.bell_unless(line_buffer.kill()),
            EditAction::ClearScreen => line_buffer.clear_screen(),
            EditAction::HistoryNext => hooks.history_next(line_buffer),
            EditAction::HistoryPrev => hooks.history_prev(line_buffer),
            EditAction::SearchBackward => hooks.search_backward(line_buffer),
            EditAction::SearchForward => hooks.search_forward(line_buffer),
            EditAction::Transpose => self.bell_unless(line_buffer.transpose()),
            EditAction::KillFront => self.bell_unless(line_buffer.kill_front()),
            EditAction::KillWordFront => self.bell_unless(line_buffer.kill_word_front()),
            EditAction::Yank => self.bell_unless(line_buffer.yank()),
        }
        ControlFlowLimited::Continue
    }

    fn dispatch_escape_event(&mut self, event: EscapeKeyEvent) -> ControlFlowLimited<ReadlineError> {
        tracing::trace!(message = "escape sequence", ?event);
        let line_buffer = &*self.line_buffer;
        match event.kind {
            EscapeKind::Meta(key) => match key {
                '\x7f' | '\x08' => self.bell_unless(line_buffer.kill_word_front()),
                '\x14' => self.bell_unless(line_buffer.transpose()),
                '\x1b' => {}
                'b' => self.bell_unless(line_buffer.move_to_prev_word()),
                'd' => self.bell_unless(line_buffer.kill_word()),
                'f' => self.bell_unless(line_buffer.move_to_next_word()),
                'e' => self.bell_unless(line_buffer.move_to_end_word()),
                _ => self.bell(),
            },
            EscapeKind::ArrowOrFunction(key) if event.is_unmodified() => match key {
                'A' => self.hooks.history_prev(line_buffer),
                'B' => self.hooks.history_next(line_buffer),
                'C' => self.bell_unless(line_buffer.move_forward()),
                'D' => self.bell_unless(line_buffer.move_backward()),
                'F' => self.bell_unless(line_buffer.move_line_end()),
                'H' => self.bell_unless(line_buffer.move_line_start()),
                _ => self.bell(),
            },
            EscapeKind::ArrowOrFunction(key) => {
                let is_word_modifier = event.attribute == Some(1)
                    && matches!(event.attribute2, Some(MODIFIER_ALT | MODIFIER_CTRL));
                match key {
                    'C' if is_word_modifier => {
                        self.bell_unless(line_buffer.move_to_next_word());
                    }
                    'D' if is_word_modifier => {
                        self.bell_unless(line_buffer.move_to_prev_word());
                    }
                    _ => self.bell(),
                }
            }
            EscapeKind::TildeSequence if event.attribute2.is_none() => {
                match event.tilde_code() {
                    Some(1 | 7) => self.bell_unless(line_buffer.move_line_start()),
                    Some(2) => {
                        self.insert_mode = !self.insert_mode;
                        tracing::debug!(message = "insert mode toggled", insert_mode = self.insert_mode);
                    }
                    Some(3) => self.bell_unless(line_buffer.delete()),
                    Some(4 | 8) => self.bell_unless(line_buffer.move_line_end()),
                    Some(5) => self.hooks.page_up(line_buffer),
                    Some(6) => self.hooks.page_down(line_buffer),
                    _ => self.bell(),
                }
            }
            EscapeKind::TildeSequence => self.bell(),
            EscapeKind::ResizeReport => match event.resize_report() {
                Some((_rows, cols)) => {
                    let cols = i32::try_from(cols).unwrap_or(i32::MAX);
                    if let Err(err) = line_buffer.set_screen_width(cols) {
                        tracing::warn!(message = "Ignoring resize report", error = ?err);
                        self.bell();
                    }
                }
                None => self.bell(),
            },
        }

        self.dispatch_bytes(&event.remainder)
    }

    /// Bytes that arrived glued to the end of an escape sequence. A leading control byte
    /// is dispatched on its own (the rest is dropped), anything else is typed text.
    fn dispatch_bytes(&mut self, bytes: &[u8]) -> ControlFlowLimited<ReadlineError> {
        match bytes {
            [] => ControlFlowLimited::Continue,
            [first, ..] if is_control_byte(*first) => self.dispatch_keystroke(&[*first]),
            literal => {
                self.write_literal(literal, self.insert_mode);
                ControlFlowLimited::Continue
            }
        }
    }

    fn write_literal(&self, bytes: &[u8], insert: bool) {
        let chars: Vec<char> = String::from_utf8_lossy(bytes).chars().collect();
        if insert {
            self.line_buffer.insert(&chars);
        } else {
            self.line_buffer.write(&chars);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LineBufferState, OutputDeviceExt, StdoutMock, UnicodeWidthModel};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use test_case::test_case;

    struct Fixture {
        dispatcher: KeyDispatcher,
        receiver: mpsc::Receiver<LineResult>,
        stdout_mock: StdoutMock,
    }

    fn fixture_with_hooks(hooks: Arc<dyn EditorHooks>) -> Fixture {
        let (output_device, stdout_mock) = OutputDevice::new_mock();
        let line_buffer = LineBuffer::try_new(
            "> ",
            None,
            false,
            80,
            output_device.clone(),
            Arc::new(UnicodeWidthModel),
        )
        .unwrap();
        let (sender, receiver) = mpsc::channel(1);
        Fixture {
            dispatcher: KeyDispatcher::new(Arc::new(line_buffer), output_device, hooks, sender),
            receiver,
            stdout_mock,
        }
    }

    fn fixture() -> Fixture { fixture_with_hooks(Arc::new(crate::NoopEditorHooks)) }

    /// Feed `bytes` one byte at a time (all test input is ASCII) and return the first
    /// error that stops the loop.
    fn feed(dispatcher: &mut KeyDispatcher, bytes: &[u8]) -> Option<ReadlineError> {
        bytes.iter().find_map(|byte| match dispatcher.dispatch_keystroke(&[*byte]) {
            ControlFlowLimited::ReturnError(err) => Some(err),
            ControlFlowLimited::Continue => None,
        })
    }

    fn text_and_cursor(dispatcher: &KeyDispatcher) -> (String, usize) {
        dispatcher.line_buffer.text_and_cursor()
    }

    #[test]
    fn test_overtype_is_the_default() {
        let mut it = fixture();
        assert_eq!(feed(&mut it.dispatcher, b"ab\x02c"), None);
        assert_eq!(text_and_cursor(&it.dispatcher), ("ac".to_string(), 2));

        assert_eq!(feed(&mut it.dispatcher, b"\r"), None);
        assert_eq!(it.receiver.try_recv().unwrap(), LineResult::Line(b"ac".to_vec()));
        assert_eq!(text_and_cursor(&it.dispatcher), (String::new(), 0));
    }

    #[test]
    fn test_insert_key_toggles_insert_mode() {
        let mut it = fixture();
        feed(&mut it.dispatcher, b"\x1b[2~ab\x02c");
        assert!(it.dispatcher.insert_mode);
        assert_eq!(text_and_cursor(&it.dispatcher), ("acb".to_string(), 2));

        feed(&mut it.dispatcher, b"\x1b[2~\x02x");
        assert!(!it.dispatcher.insert_mode);
        assert_eq!(text_and_cursor(&it.dispatcher), ("axb".to_string(), 2));
    }

    #[test]
    fn test_multi_byte_keystroke_is_one_codepoint() {
        let mut it = fixture();
        it.dispatcher.dispatch_keystroke("é".as_bytes());
        it.dispatcher.dispatch_keystroke("日".as_bytes());
        assert_eq!(text_and_cursor(&it.dispatcher), ("é日".to_string(), 2));
    }

    #[test]
    fn test_interrupt_is_published_and_stops() {
        let mut it = fixture();
        assert_eq!(feed(&mut it.dispatcher, b"ab\x03"), Some(ReadlineError::Interrupted));
        assert_eq!(
            it.receiver.try_recv().unwrap(),
            LineResult::Failed(ReadlineError::Interrupted)
        );
    }

    #[test]
    fn test_ctrl_d_deletes_or_ends_input() {
        let mut it = fixture();
        assert_eq!(feed(&mut it.dispatcher, b"ab\x01\x04"), None);
        assert_eq!(text_and_cursor(&it.dispatcher), ("b".to_string(), 0));

        assert_eq!(feed(&mut it.dispatcher, b"\x04\x04"), Some(ReadlineError::EndOfInput));
        assert_eq!(
            it.receiver.try_recv().unwrap(),
            LineResult::Failed(ReadlineError::EndOfInput)
        );
    }

    #[test]
    fn test_full_mailbox_drops_new_result() {
        let mut it = fixture();
        feed(&mut it.dispatcher, b"one\rtwo\r");
        assert_eq!(it.receiver.try_recv().unwrap(), LineResult::Line(b"one".to_vec()));
        assert!(it.receiver.try_recv().is_err());
    }

    #[test_case(b"\x02" ; "backward at start")]
    #[test_case(b"\x06" ; "forward at end")]
    #[test_case(b"\x08" ; "backspace on empty")]
    #[test_case(b"\x07" ; "ctrl g")]
    #[test_case(b"\x19" ; "yank with empty kill slot")]
    #[test_case(b"\x01" ; "ctrl a on empty line")]
    #[test_case(b"\x1a" ; "unbound ctrl z")]
    #[test_case(b"\t" ; "unhandled completion")]
    #[test_case(b"\x1bz" ; "unbound meta")]
    #[test_case(b"\x1b[Z" ; "unbound arrow")]
    #[test_case(b"\x1b[1;2C" ; "shift right")]
    #[test_case(b"\x1b[9~" ; "unknown tilde")]
    #[test_case(b"\x1b[3;5~" ; "modified tilde")]
    #[test_case(b"\x1b[24R" ; "resize without cols")]
    #[test_case(b"\x1b[24;0R" ; "resize to zero")]
    fn test_rings_bell_once(input: &[u8]) {
        let mut it = fixture();
        assert_eq!(feed(&mut it.dispatcher, input), None);
        assert_eq!(it.stdout_mock.count_bells(), 1);
    }

    #[test_case(b"foo bar\x1bb", ("foo bar", 4) ; "meta b")]
    #[test_case(b"foo bar\x01\x1bf", ("foo bar", 4) ; "meta f")]
    #[test_case(b"foo bar\x01\x1be", ("foo bar", 2) ; "meta e")]
    #[test_case(b"foo bar\x01\x1bd", (" bar", 0) ; "meta d")]
    #[test_case(b"foo bar\x1b\x7f", ("foo ", 4) ; "meta backspace")]
    #[test_case(b"foo bar\x1b[1;5D", ("foo bar", 4) ; "ctrl left")]
    #[test_case(b"foo bar\x01\x1b[1;3C", ("foo bar", 4) ; "alt right")]
    #[test_case(b"abc\x1b[D\x1b[D", ("abc", 1) ; "left arrow")]
    #[test_case(b"abc\x1b[H\x1b[C", ("abc", 1) ; "home then right")]
    #[test_case(b"abc\x1bOH\x1b[F", ("abc", 3) ; "ss3 home then end")]
    #[test_case(b"abc\x1b[1~\x1b[3~", ("bc", 0) ; "tilde home and delete")]
    #[test_case(b"abc\x1b[7~\x1b[8~", ("abc", 3) ; "tilde 7 and 8")]
    #[test_case(b"ab\x14", ("ba", 2) ; "transpose")]
    #[test_case(b"foo bar\x17", ("foo ", 4) ; "kill word front")]
    #[test_case(b"foo bar\x02\x02\x0b\x19", ("foo bar", 7) ; "kill and yank")]
    #[test_case(b"foo bar\x02\x02\x15", ("ar", 0) ; "kill front")]
    fn test_bindings(input: &[u8], expected: (&str, usize)) {
        let mut it = fixture();
        assert_eq!(feed(&mut it.dispatcher, input), None);
        assert_eq!(
            text_and_cursor(&it.dispatcher),
            (expected.0.to_string(), expected.1)
        );
        assert_eq!(it.stdout_mock.count_bells(), 0);
    }

    #[test]
    fn test_resize_report_sets_width() {
        let mut it = fixture();
        feed(&mut it.dispatcher, b"\x1b[24;132R");
        assert_eq!(it.dispatcher.line_buffer.screen_width(), 132);
    }

    #[test]
    fn test_remainder_is_typed_text() {
        let mut it = fixture();
        it.dispatcher.dispatch_keystroke(&[ESC]);
        it.dispatcher.dispatch_keystroke(b"[Cxy");
        assert_eq!(text_and_cursor(&it.dispatcher), ("xy".to_string(), 2));
    }

    #[test]
    fn test_remainder_control_byte_is_dispatched_alone() {
        let mut it = fixture();
        feed(&mut it.dispatcher, b"abc");
        it.dispatcher.dispatch_keystroke(&[ESC]);
        it.dispatcher.dispatch_keystroke(b"[D\x01zz");
        assert_eq!(text_and_cursor(&it.dispatcher), ("abc".to_string(), 0));
    }

    #[test]
    fn test_overflowed_escape_is_typed_in_caret_notation() {
        let mut it = fixture();
        let mut input = b"\x1b[".to_vec();
        input.extend(std::iter::repeat_n(b'1', 15));
        assert_eq!(feed(&mut it.dispatcher, &input), None);
        assert_eq!(
            text_and_cursor(&it.dispatcher),
            ("^[[111111111111111".to_string(), 18)
        );
        assert!(!it.dispatcher.decoder.is_active());
    }

    #[test]
    fn test_reset_escape_drops_partial_sequence() {
        let mut it = fixture();
        feed(&mut it.dispatcher, b"\x1b[");
        it.dispatcher.reset_escape();
        feed(&mut it.dispatcher, b"A");
        assert_eq!(text_and_cursor(&it.dispatcher), ("A".to_string(), 1));
    }

    #[derive(Debug, Default)]
    struct RecordingHooks {
        calls: Mutex<Vec<&'static str>>,
        lines: Mutex<Vec<Vec<u8>>>,
    }

    impl RecordingHooks {
        fn record(&self, call: &'static str) { self.calls.lock().unwrap().push(call); }
    }

    impl EditorHooks for RecordingHooks {
        fn complete(&self, line_buffer: &LineBuffer) -> bool {
            self.record("complete");
            line_buffer.set_text("completed".chars().collect());
            true
        }

        fn history_prev(&self, _: &LineBuffer) { self.record("history_prev"); }

        fn history_next(&self, _: &LineBuffer) { self.record("history_next"); }

        fn search_backward(&self, _: &LineBuffer) { self.record("search_backward"); }

        fn search_forward(&self, _: &LineBuffer) { self.record("search_forward"); }

        fn page_up(&self, _: &LineBuffer) { self.record("page_up"); }

        fn page_down(&self, _: &LineBuffer) { self.record("page_down"); }

        fn on_line(&self, line: &[u8]) { self.lines.lock().unwrap().push(line.to_vec()); }
    }

    #[test]
    fn test_hooks_are_called() {
        let hooks = Arc::new(RecordingHooks::default());
        let mut it = fixture_with_hooks(hooks.clone());
        feed(
            &mut it.dispatcher,
            b"\x10\x0e\x12\x13\x1b[A\x1b[B\x1b[5~\x1b[6~\t\r",
        );
        assert_eq!(
            *hooks.calls.lock().unwrap(),
            vec![
                "history_prev",
                "history_next",
                "search_backward",
                "search_forward",
                "history_prev",
                "history_next",
                "page_up",
                "page_down",
                "complete",
            ]
        );
        assert_eq!(*hooks.lines.lock().unwrap(), vec![b"completed".to_vec()]);
        assert_eq!(it.stdout_mock.count_bells(), 0);
    }

    #[test]
    fn test_enter_renders_newline_when_interactive() {
        let mut it = fixture();
        it.dispatcher.line_buffer.set_interactive(true);
        feed(&mut it.dispatcher, b"hi");
        it.stdout_mock.clear();
        feed(&mut it.dispatcher, b"\r");
        assert!(it.stdout_mock.get_copy_of_buffer_as_string().ends_with("> hi\n"));
        assert_eq!(it.dispatcher.line_buffer.snapshot(), LineBufferState {
            prompt: "> ".to_string(),
            prompt_width: 2,
            interactive: true,
            screen_width: 80,
            ..Default::default()
        });
    }
}
