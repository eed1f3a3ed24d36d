// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{KeystrokeBytes, StdinReadResult, StdinReceiver, checkin_stdin_receiver,
            checkout_stdin_receiver};
use std::{collections::VecDeque,
          fmt::{Debug, Formatter},
          io::{self, Write},
          pin::Pin};
use tokio::{io::{AsyncRead, AsyncReadExt},
            select,
            sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel}};

/// Size of the buffer handed to the underlying reader on each read.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// The raw byte stream that keystrokes come from (usually `stdin`), plus a side channel
/// that lets the program inject bytes ahead of live input. Injected bytes are consumed
/// exactly as if the user had typed them.
///
/// Bytes are handed out one keystroke chunk at a time by [`Self::next_chunk()`]: a single
/// byte for ASCII, or the complete UTF-8 encoding of a codepoint.
pub struct InputSource {
    byte_source: ByteSource,
    prefill_receiver: UnboundedReceiver<Vec<u8>>,
    pending: VecDeque<u8>,
    read_buffer: Vec<u8>,
}

enum ByteSource {
    Reader(Pin<Box<dyn AsyncRead + Send>>),
    /// Fed by the dedicated stdin reader thread. Only [`None`] while being dropped.
    Stdin(Option<StdinReceiver>),
}

impl Drop for InputSource {
    fn drop(&mut self) {
        if let ByteSource::Stdin(maybe_receiver) = &mut self.byte_source
            && let Some(receiver) = maybe_receiver.take()
        {
            checkin_stdin_receiver(receiver);
        }
    }
}

impl Debug for InputSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputSource")
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

/// Write end of the prefill channel of an [`InputSource`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PrefillWriter {
    sender: UnboundedSender<Vec<u8>>,
}

impl PrefillWriter {
    /// Queue `bytes` ahead of live input. Empty writes are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::BrokenPipe`] if the [`InputSource`] was dropped (the
    /// session that owned it has shut down).
    pub fn prefill(&self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.sender
            .send(bytes.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "input source closed"))
    }
}

impl Write for PrefillWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.prefill(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl InputSource {
    pub fn new(reader: impl AsyncRead + Send + 'static) -> (Self, PrefillWriter) {
        Self::new_with_read_buffer_size(reader, DEFAULT_READ_BUFFER_SIZE)
    }

    pub fn new_with_read_buffer_size(
        reader: impl AsyncRead + Send + 'static,
        read_buffer_size: usize,
    ) -> (Self, PrefillWriter) {
        Self::new_from_byte_source(
            ByteSource::Reader(Box::pin(reader)),
            read_buffer_size,
        )
    }

    /// Read the process's stdin through the dedicated reader thread (see
    /// [`crate::checkout_stdin_receiver`]).
    ///
    /// # Errors
    ///
    /// Returns an error if another [`InputSource`] already reads stdin, or if the
    /// reader thread can't be spawned.
    pub fn new_stdin() -> io::Result<(Self, PrefillWriter)> {
        let receiver = checkout_stdin_receiver()?;
        Ok(Self::new_from_byte_source(
            ByteSource::Stdin(Some(receiver)),
            DEFAULT_READ_BUFFER_SIZE,
        ))
    }

    fn new_from_byte_source(
        byte_source: ByteSource,
        read_buffer_size: usize,
    ) -> (Self, PrefillWriter) {
        let (sender, prefill_receiver) = unbounded_channel();
        let this = Self {
            byte_source,
            prefill_receiver,
            pending: VecDeque::new(),
            read_buffer: vec![0; read_buffer_size.max(1)],
        };
        (this, PrefillWriter { sender })
    }

    /// Wait until more bytes are available, and return how many were added. Prefilled
    /// bytes take priority over the reader. `Ok(0)` means the reader reached end of
    /// input.
    ///
    /// This is cancel safe: [`UnboundedReceiver::recv`] and [`AsyncReadExt::read`] both
    /// guarantee that no data is lost if the future is dropped before it completes, so
    /// it can be raced against a shutdown signal in `tokio::select!`.
    ///
    /// # Errors
    ///
    /// Returns the error of the underlying reader.
    pub async fn fill(&mut self) -> io::Result<usize> {
        let mut count = 0;
        while let Ok(bytes) = self.prefill_receiver.try_recv() {
            count += bytes.len();
            self.pending.extend(bytes);
        }
        if count > 0 {
            return Ok(count);
        }

        let Self {
            byte_source,
            prefill_receiver,
            pending,
            read_buffer,
            ..
        } = self;

        select! {
            biased;

            Some(bytes) = prefill_receiver.recv() => {
                let count = bytes.len();
                pending.extend(bytes);
                Ok(count)
            }

            result = read_from_byte_source(byte_source, read_buffer) => {
                let bytes = result?;
                pending.extend(bytes);
                Ok(bytes.len())
            }
        }
    }

    /// Pop the bytes of the next keystroke, if they have all arrived.
    ///
    /// - ASCII: one byte.
    /// - A multi-byte UTF-8 sequence: all of its bytes, or [`None`] if only a prefix has
    ///   been received so far.
    /// - Bytes that can't start (or continue) a UTF-8 sequence: one byte, which will
    ///   decode to `U+FFFD`.
    pub fn next_chunk(&mut self) -> Option<KeystrokeBytes> {
        let &lead = self.pending.front()?;
        let expected_len = utf8_sequence_len(lead);
        if expected_len <= 1 {
            return self.take(1);
        }

        let available = self.pending.len().min(expected_len);
        let is_valid_so_far = self
            .pending
            .iter()
            .take(available)
            .skip(1)
            .all(|byte| is_utf8_continuation(*byte));

        if !is_valid_so_far {
            return self.take(1);
        }
        if available < expected_len {
            return None;
        }
        self.take(expected_len)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool { !self.pending.is_empty() }

    fn take(&mut self, count: usize) -> Option<KeystrokeBytes> {
        Some(self.pending.drain(..count).collect())
    }
}

/// Returns the slice of newly read bytes, empty at end of input.
async fn read_from_byte_source<'a>(
    byte_source: &mut ByteSource,
    read_buffer: &'a mut Vec<u8>,
) -> io::Result<&'a [u8]> {
    match byte_source {
        ByteSource::Reader(reader) => {
            let count = reader.read(read_buffer).await?;
            Ok(&read_buffer[..count])
        }
        ByteSource::Stdin(None) => Ok(&[]),
        ByteSource::Stdin(Some(receiver)) => match receiver.recv().await {
            Some(StdinReadResult::Data(data)) => {
                read_buffer.clear();
                read_buffer.extend_from_slice(&data);
                Ok(read_buffer.as_slice())
            }
            Some(StdinReadResult::Eof) | None => Ok(&[]),
            Some(StdinReadResult::Error(kind)) => Err(io::Error::from(kind)),
        },
    }
}

/// Length of the UTF-8 sequence introduced by `lead`. Returns 0 for bytes that can't
/// start a sequence (continuation bytes and `0xF8..=0xFF`).
#[must_use]
pub fn utf8_sequence_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

#[must_use]
pub fn is_utf8_continuation(byte: u8) -> bool { byte & 0b1100_0000 == 0b1000_0000 }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputSourceExt;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;
    use tokio::io::AsyncWriteExt;

    async fn drain_all_chunks(input_source: &mut InputSource) -> Vec<KeystrokeBytes> {
        let mut acc = vec![];
        loop {
            while let Some(chunk) = input_source.next_chunk() {
                acc.push(chunk);
            }
            if input_source.fill().await.unwrap() == 0 {
                break;
            }
        }
        acc
    }

    #[tokio::test]
    async fn test_ascii_is_chunked_one_byte_at_a_time() {
        let (mut input_source, _prefill) = InputSource::new_mock(b"ab\r");
        let chunks = drain_all_chunks(&mut input_source).await;
        let expected: Vec<KeystrokeBytes> =
            vec![smallvec![b'a'], smallvec![b'b'], smallvec![b'\r']];
        assert_eq!(chunks, expected);
    }

    #[tokio::test]
    async fn test_multi_byte_codepoints_stay_together() {
        let (mut input_source, _prefill) = InputSource::new_mock("é😀".as_bytes());
        let chunks = drain_all_chunks(&mut input_source).await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_slice(), "é".as_bytes());
        assert_eq!(chunks[1].as_slice(), "😀".as_bytes());
    }

    #[tokio::test]
    async fn test_invalid_lead_and_broken_sequence_are_single_bytes() {
        // Stray continuation byte, then a 3 byte lead followed by ASCII.
        let (mut input_source, _prefill) = InputSource::new_mock(&[0x80, 0xE2, b'x']);
        let chunks = drain_all_chunks(&mut input_source).await;
        let expected: Vec<KeystrokeBytes> =
            vec![smallvec![0x80], smallvec![0xE2], smallvec![b'x']];
        assert_eq!(chunks, expected);
    }

    #[tokio::test]
    async fn test_partial_sequence_waits_for_the_rest() {
        let (client, server) = tokio::io::duplex(16);
        let (mut input_source, _prefill) = InputSource::new(server);
        let mut client = client;
        let bytes = "é".as_bytes();

        client.write_all(&bytes[..1]).await.unwrap();
        assert_eq!(input_source.fill().await.unwrap(), 1);
        assert_eq!(input_source.next_chunk(), None);
        assert!(input_source.has_pending());

        client.write_all(&bytes[1..]).await.unwrap();
        assert_eq!(input_source.fill().await.unwrap(), 1);
        assert_eq!(input_source.next_chunk().unwrap().as_slice(), bytes);
    }

    #[tokio::test]
    async fn test_prefill_is_consumed_before_live_input() {
        let (mut input_source, prefill) = InputSource::new_mock(b"live");
        prefill.prefill(b"pre").unwrap();
        let chunks = drain_all_chunks(&mut input_source).await;
        let text: Vec<u8> = chunks.into_iter().flatten().collect();
        assert_eq!(text, b"prelive");
    }

    #[tokio::test]
    async fn test_prefill_writer_implements_write() {
        let (mut input_source, mut prefill) = InputSource::new_mock(b"");
        write!(prefill, "hi").unwrap();
        prefill.write_all(b"").unwrap();
        assert_eq!(input_source.fill().await.unwrap(), 2);
        assert_eq!(input_source.fill().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_prefill_after_source_dropped_is_broken_pipe() {
        let (input_source, prefill) = InputSource::new_mock(b"");
        drop(input_source);
        let err = prefill.prefill(b"x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_utf8_sequence_len() {
        assert_eq!(utf8_sequence_len(b'a'), 1);
        assert_eq!(utf8_sequence_len(0xC3), 2);
        assert_eq!(utf8_sequence_len(0xE2), 3);
        assert_eq!(utf8_sequence_len(0xF0), 4);
        assert_eq!(utf8_sequence_len(0x80), 0);
        assert_eq!(utf8_sequence_len(0xFF), 0);
    }
}
