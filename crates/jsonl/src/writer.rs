//! Sequential write-only handle.
//!
//! This module provides a buffered handle over any [`Write`] sink that
//! cannot seek or be read back, such as standard output or a pipe.

use crate::handle::{unsupported, Handle};
use std::io::{self, BufWriter, Write};

/// Buffered, write-only, sequential handle.
///
/// Records appended through a stream are collected in a [`BufWriter`] and
/// reach the sink on [`flush`](Handle::flush), on close, or when the buffer
/// fills up.
///
/// # Examples
///
/// ```
/// use jsonl::{Stream, WriteHandle};
/// use serde_json::json;
///
/// let mut stream = Stream::new(WriteHandle::new(Vec::new()));
/// stream.append(&json!({"a": 1}))?.append(&json!({"b": 2}))?;
/// stream.flush()?;
///
/// let sink = stream.into_inner().unwrap().into_inner()?;
/// assert_eq!(sink, b"{\"a\":1}\n{\"b\":2}\n");
/// # Ok::<(), jsonl::Error>(())
/// ```
#[derive(Debug)]
pub struct WriteHandle<W: Write> {
    /// Buffered writer wrapping the underlying sink.
    writer: BufWriter<W>,
}

impl<W: Write> WriteHandle<W> {
    /// Creates a new `WriteHandle` wrapping the given writer.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    /// Creates a new `WriteHandle` with a custom buffer capacity.
    ///
    /// # Arguments
    ///
    /// * `writer` - The underlying writer to wrap.
    /// * `capacity` - The initial buffer capacity in bytes.
    #[must_use]
    pub fn with_capacity(writer: W, capacity: usize) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, writer),
        }
    }

    /// Returns a reference to the underlying buffered writer.
    #[must_use]
    pub fn get_ref(&self) -> &BufWriter<W> {
        &self.writer
    }

    /// Returns a mutable reference to the underlying buffered writer.
    ///
    /// Use with caution: writing directly to the buffer may produce
    /// malformed JSONL output.
    pub fn get_mut(&mut self) -> &mut BufWriter<W> {
        &mut self.writer
    }

    /// Flushes the buffer and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Fails when the buffered bytes cannot be written.
    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(io::IntoInnerError::into_error)
    }
}

impl<W: Write> Handle for WriteHandle<W> {
    fn read_line(&mut self, _buf: &mut Vec<u8>) -> io::Result<usize> {
        Err(unsupported("read"))
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn is_eof(&mut self) -> io::Result<bool> {
        Err(unsupported("end-of-input query"))
    }
}

impl<W: Write + Default> Default for WriteHandle<W> {
    fn default() -> Self {
        Self::new(W::default())
    }
}
