//! Sequential read-only handle.
//!
//! This module provides a buffered handle over any [`Read`] source that
//! cannot seek: standard input, pipes, sockets, child process output.

use crate::handle::{unsupported, Handle};
use std::io::{self, BufRead, BufReader, Read};

/// Buffered, read-only, sequential handle.
///
/// `ReadHandle` wraps a reader in a [`BufReader`] so a stream can pull one
/// line at a time. Nothing beyond the current buffer is read ahead, which
/// keeps it usable on inputs that grow while they are being consumed.
///
/// # Type Parameters
///
/// * `R` - The underlying reader type.
///
/// # Examples
///
/// ```
/// use jsonl::{ReadHandle, Stream};
/// use serde_json::Value;
///
/// let input: &[u8] = b"{\"id\":1}\n{\"id\":2}\n";
/// let mut stream = Stream::new(ReadHandle::new(input));
/// let ids: Vec<Value> = stream.iter().collect::<jsonl::Result<_>>()?;
/// assert_eq!(ids.len(), 2);
/// # Ok::<(), jsonl::Error>(())
/// ```
#[derive(Debug)]
pub struct ReadHandle<R> {
    /// Buffered reader wrapping the underlying source.
    reader: BufReader<R>,
}

impl<R: Read> ReadHandle<R> {
    /// Creates a new `ReadHandle` wrapping the given reader.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
        }
    }

    /// Creates a new `ReadHandle` with a custom buffer capacity.
    ///
    /// Useful when typical lines are much longer than the default buffer.
    ///
    /// # Arguments
    ///
    /// * `reader` - The underlying reader to wrap.
    /// * `capacity` - The initial buffer capacity in bytes.
    #[must_use]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
        }
    }

    /// Returns a reference to the underlying buffered reader.
    #[must_use]
    pub fn get_ref(&self) -> &BufReader<R> {
        &self.reader
    }

    /// Returns a mutable reference to the underlying buffered reader.
    ///
    /// Use with caution: reading directly from the buffer skips records
    /// without the stream noticing.
    pub fn get_mut(&mut self) -> &mut BufReader<R> {
        &mut self.reader
    }

    /// Consumes the handle, returning the underlying buffered reader.
    #[must_use]
    pub fn into_inner(self) -> BufReader<R> {
        self.reader
    }
}

impl<R: Read> Handle for ReadHandle<R> {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.reader.read_until(b'\n', buf)
    }

    fn write_all(&mut self, _bytes: &[u8]) -> io::Result<()> {
        Err(unsupported("write"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn is_eof(&mut self) -> io::Result<bool> {
        Ok(self.reader.fill_buf()?.is_empty())
    }
}

impl<R: Read + Default> Default for ReadHandle<R> {
    fn default() -> Self {
        Self::new(R::default())
    }
}
