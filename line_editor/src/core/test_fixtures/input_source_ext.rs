// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{InputSource, PrefillWriter};
use tokio::io::DuplexStream;

pub trait InputSourceExt {
    /// Input that yields `bytes` and then end of input.
    fn new_mock(bytes: &[u8]) -> (InputSource, PrefillWriter);

    /// Input that stays open until the returned [`DuplexStream`] is dropped, so a test
    /// can "type" while a session is running.
    fn new_mock_live() -> (InputSource, PrefillWriter, DuplexStream);
}

/// Buffer size of the in memory pipe behind [`InputSourceExt::new_mock_live`].
pub const MOCK_LIVE_PIPE_SIZE: usize = 1024;

impl InputSourceExt for InputSource {
    fn new_mock(bytes: &[u8]) -> (InputSource, PrefillWriter) {
        InputSource::new(std::io::Cursor::new(bytes.to_vec()))
    }

    fn new_mock_live() -> (InputSource, PrefillWriter, DuplexStream) {
        let (keyboard, reader) = tokio::io::duplex(MOCK_LIVE_PIPE_SIZE);
        let (input_source, prefill_writer) = InputSource::new(reader);
        (input_source, prefill_writer, keyboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_new_mock_yields_bytes_then_eof() {
        let (mut input_source, _prefill) = InputSource::new_mock(b"hi");
        assert_eq!(input_source.fill().await.unwrap(), 2);
        assert_eq!(input_source.fill().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_new_mock_live_eof_when_keyboard_dropped() {
        let (mut input_source, _prefill, mut keyboard) = InputSource::new_mock_live();
        keyboard.write_all(b"x").await.unwrap();
        assert_eq!(input_source.fill().await.unwrap(), 1);
        drop(keyboard);
        assert_eq!(input_source.fill().await.unwrap(), 0);
    }
}
