//! Record streams over a byte handle.
//!
//! A [`Stream`] owns one [`Handle`] and turns it into a sequence of JSON
//! records: reading decodes one line per record on demand, appending encodes
//! one record per line. The stream keeps no index of records; its position is
//! whatever the handle reports.
//!
//! # Examples
//!
//! ```
//! use jsonl::Stream;
//! use serde_json::{json, Value};
//!
//! let mut stream = Stream::memory();
//! stream.append(&json!({"a": 1}))?.append(&json!({"b": 2}))?;
//! assert_eq!(stream.get_ref().unwrap().as_str(), Some("{\"a\":1}\n{\"b\":2}\n"));
//!
//! stream.rewind()?;
//! let records: Vec<Value> = stream.iter().collect::<jsonl::Result<_>>()?;
//! assert_eq!(records, vec![json!({"a": 1}), json!({"b": 2})]);
//! # Ok::<(), jsonl::Error>(())
//! ```

use crate::decode::decode_bytes;
use crate::encode::encode_into;
use crate::error::{Error, Result};
use crate::handle::{FileHandle, Handle, MemoryHandle};
use crate::options::{DecodeOptions, EncodeOptions, OpenMode, OpenOptions};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::SeekFrom;
use std::marker::PhantomData;
use std::path::Path;

/// A JSONL reader/writer over a single handle.
///
/// Dropping a stream releases its handle. [`close`](Self::close) does the
/// same explicitly and reports flush errors; it is idempotent.
#[derive(Debug)]
pub struct Stream<H: Handle> {
    handle: Option<H>,
    encode: EncodeOptions,
    decode: DecodeOptions,
    /// Lines consumed through this stream, for error reporting only.
    lines_read: usize,
    line: Vec<u8>,
    scratch: Vec<u8>,
}

impl<H: Handle> Stream<H> {
    /// Wraps an open handle. Performs no I/O.
    #[must_use]
    pub fn new(handle: H) -> Self {
        Self {
            handle: Some(handle),
            encode: EncodeOptions::default(),
            decode: DecodeOptions::default(),
            lines_read: 0,
            line: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Sets the encoder used by [`append`](Self::append).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] if `options` asks for indentation,
    /// which would spread one record over several lines.
    pub fn with_encode_options(mut self, options: EncodeOptions) -> Result<Self> {
        options.ensure_single_line()?;
        self.encode = options;
        Ok(self)
    }

    /// Sets the decoder used when reading records.
    #[must_use]
    pub fn with_decode_options(mut self, options: DecodeOptions) -> Self {
        self.decode = options;
        self
    }

    fn handle(&mut self) -> Result<&mut H> {
        self.handle.as_mut().ok_or(Error::Closed)
    }

    /// Fails unless the handle is open and its mode allows `operation`.
    fn check_mode(&self, allowed: fn(OpenMode) -> bool, operation: &str) -> Result<()> {
        let handle = self.handle.as_ref().ok_or(Error::Closed)?;
        match handle.mode() {
            Some(mode) if !allowed(mode) => Err(Error::InvalidOption(format!(
                "cannot {operation} a stream opened in mode {mode}"
            ))),
            _ => Ok(()),
        }
    }

    /// Reads and decodes the record on the next line.
    ///
    /// Returns `Ok(None)` once the handle reports end of input. Blank lines
    /// skipped by the decode options are consumed transparently.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] for a malformed or non-UTF-8 line (the line is
    /// consumed and counted), [`Error::InvalidOption`] on a file opened
    /// write-only, [`Error::Io`] for handle failures, [`Error::Closed`] after
    /// release.
    pub fn read_record<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        self.check_mode(OpenMode::is_readable, "read from")?;
        loop {
            let handle = self.handle.as_mut().ok_or(Error::Closed)?;
            self.line.clear();
            if handle.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.lines_read += 1;
            if let Some(record) = decode_bytes(&self.line, self.lines_read, &self.decode)? {
                return Ok(Some(record));
            }
        }
    }

    /// Returns a lazy iterator over the records from the current position.
    ///
    /// The iterator stops for good after yielding its first error. Calling
    /// `iter` again resumes from wherever the handle's cursor now is; it
    /// never rewinds.
    pub fn iter<T: DeserializeOwned>(&mut self) -> Records<'_, H, T> {
        Records {
            stream: self,
            broken: false,
            _marker: PhantomData,
        }
    }

    /// Consumes the stream into an iterator over its remaining records.
    ///
    /// The handle is released when the iterator is dropped.
    pub fn into_records<T: DeserializeOwned>(self) -> IntoRecords<H, T> {
        IntoRecords {
            stream: self,
            broken: false,
            _marker: PhantomData,
        }
    }

    /// Calls `f` with each remaining record, in order.
    ///
    /// Returns how many records were delivered.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first read or decode error; records before
    /// it have already been passed to `f`.
    pub fn each<T, F>(&mut self, mut f: F) -> Result<usize>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        let mut delivered = 0;
        while let Some(record) = self.read_record()? {
            f(record);
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Encodes `record` as one line and writes it, newline included.
    ///
    /// The line is assembled in memory first, so either the whole line is
    /// handed to the handle or nothing is. Returns the stream for chaining.
    ///
    /// Unlike [`generate`](crate::generate), every record is terminated,
    /// including the last one.
    ///
    /// # Errors
    ///
    /// [`Error::Encode`] when `record` has no JSON form (nothing is written),
    /// [`Error::InvalidOption`] on a file opened read-only, [`Error::Io`] for
    /// handle failures, [`Error::Closed`] after release.
    pub fn append<T: Serialize + ?Sized>(&mut self, record: &T) -> Result<&mut Self> {
        self.check_mode(OpenMode::is_writable, "append to")?;
        self.scratch.clear();
        encode_into(record, &self.encode, &mut self.scratch)?;
        self.scratch.push(b'\n');
        let handle = self.handle.as_mut().ok_or(Error::Closed)?;
        handle.write_all(&self.scratch)?;
        Ok(self)
    }

    /// Appends every record of `records` in order.
    ///
    /// # Errors
    ///
    /// Stops at the first failure; earlier records stay written.
    pub fn append_all<I>(&mut self, records: I) -> Result<&mut Self>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        for record in records {
            self.append(&record)?;
        }
        Ok(self)
    }

    /// Number of lines read through this stream since it was created.
    ///
    /// Seeking does not reset it.
    #[must_use]
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Byte offset of the handle's cursor.
    ///
    /// # Errors
    ///
    /// Fails on sequential handles and after release.
    pub fn position(&mut self) -> Result<u64> {
        Ok(self.handle()?.position()?)
    }

    /// Moves the handle's cursor.
    ///
    /// # Errors
    ///
    /// Fails on sequential handles and after release.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        Ok(self.handle()?.seek(pos)?)
    }

    /// Moves the cursor back to the start.
    ///
    /// # Errors
    ///
    /// Fails on sequential handles and after release.
    pub fn rewind(&mut self) -> Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Flushes buffered writes.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors and after release.
    pub fn flush(&mut self) -> Result<()> {
        Ok(self.handle()?.flush()?)
    }

    /// Flushes and makes written records durable.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors and after release.
    pub fn sync(&mut self) -> Result<()> {
        Ok(self.handle()?.sync()?)
    }

    /// Resizes the backend to `len` bytes.
    ///
    /// # Errors
    ///
    /// Fails on sequential handles and after release.
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        Ok(self.handle()?.truncate(len)?)
    }

    /// Whether the cursor is at end of input.
    ///
    /// # Errors
    ///
    /// Fails on write-only handles and after release.
    pub fn is_eof(&mut self) -> Result<bool> {
        Ok(self.handle()?.is_eof()?)
    }

    /// Whether the handle has been released.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    /// Path of the backend, if any. `None` after release.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.handle.as_ref().and_then(|handle| handle.path())
    }

    /// OS descriptor of the backend, if any. `None` after release.
    #[must_use]
    pub fn descriptor(&self) -> Option<i64> {
        self.handle.as_ref().and_then(|handle| handle.descriptor())
    }

    /// Returns a reference to the handle, or `None` after release.
    #[must_use]
    pub fn get_ref(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    /// Returns a mutable reference to the handle, or `None` after release.
    ///
    /// Reading through the handle directly skips records without the
    /// stream's line count noticing.
    pub fn get_mut(&mut self) -> Option<&mut H> {
        self.handle.as_mut()
    }

    /// Consumes the stream and hands back the handle without closing it.
    #[must_use]
    pub fn into_inner(mut self) -> Option<H> {
        self.handle.take()
    }

    /// Releases the handle, flushing pending writes first.
    ///
    /// Calling it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the flush/close failure. The handle is released regardless.
    pub fn close(&mut self) -> Result<()> {
        match self.handle.take() {
            Some(mut handle) => {
                let result = handle.close();
                tracing::debug!(path = ?handle.path(), "closed JSONL stream");
                Ok(result?)
            }
            None => Ok(()),
        }
    }

    /// Runs `f` with this stream, then releases it on every exit path.
    ///
    /// `f`'s outcome is returned unchanged. If `f` succeeds but releasing
    /// fails, the release error is returned instead. If both fail, `f`'s
    /// error wins and the release failure is logged. A panic in `f` still
    /// releases the handle when the stream is dropped during unwinding.
    ///
    /// # Errors
    ///
    /// Whatever `f` returns, or the release error converted into `E`.
    pub fn scope<R, E, F>(mut self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        let outcome = f(&mut self);
        let released = self.close();
        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(E::from(err)),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(release_err)) => {
                tracing::warn!(error = %release_err, "failed to release JSONL stream after error");
                Err(err)
            }
        }
    }
}

impl Stream<MemoryHandle> {
    /// Creates a stream over an empty in-memory buffer.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(MemoryHandle::new())
    }

    /// Creates a stream over an in-memory buffer holding `text`.
    ///
    /// The cursor starts at the beginning: reading yields the records in
    /// `text`, appending overwrites it.
    #[must_use]
    pub fn from_string(text: impl Into<String>) -> Self {
        Self::new(MemoryHandle::from_string(text))
    }
}

impl Stream<FileHandle> {
    /// Opens `path` and wraps it in a stream.
    ///
    /// The caller owns the stream; dropping or [`close`](Self::close)-ing it
    /// releases the file.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOption`] for invalid options, [`Error::Open`] when the
    /// file cannot be opened. No handle is left behind on failure.
    pub fn open(path: impl AsRef<Path>, options: &OpenOptions) -> Result<Self> {
        FileHandle::open(path, options).map(Self::new)
    }

    /// Opens `path`, runs `f` with the stream, and releases the file on every
    /// exit path.
    ///
    /// See [`scope`](Self::scope) for how the outcome is reported.
    ///
    /// # Errors
    ///
    /// Open errors (converted into `E`), whatever `f` returns, or the
    /// release error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use jsonl::{OpenOptions, Stream};
    /// use serde_json::json;
    ///
    /// Stream::open_with("events.jsonl", &OpenOptions::append(), |stream| {
    ///     stream.append(&json!({"event": "start"}))?;
    ///     Ok::<_, jsonl::Error>(())
    /// })?;
    /// # Ok::<(), jsonl::Error>(())
    /// ```
    pub fn open_with<R, E, F>(
        path: impl AsRef<Path>,
        options: &OpenOptions,
        f: F,
    ) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        Self::open(path, options)?.scope(f)
    }
}

impl<H: Handle> Drop for Stream<H> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(error = %err, "failed to release JSONL stream on drop");
        }
    }
}

/// Lazy iterator over a stream's records. See [`Stream::iter`].
#[derive(Debug)]
pub struct Records<'a, H: Handle, T> {
    stream: &'a mut Stream<H>,
    broken: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<H: Handle, T: DeserializeOwned> Iterator for Records<'_, H, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        next_record(self.stream, &mut self.broken)
    }
}

/// Owning iterator over a stream's records. See [`Stream::into_records`].
#[derive(Debug)]
pub struct IntoRecords<H: Handle, T> {
    stream: Stream<H>,
    broken: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<H: Handle, T> IntoRecords<H, T> {
    /// Returns the stream being iterated.
    pub fn stream(&mut self) -> &mut Stream<H> {
        &mut self.stream
    }
}

impl<H: Handle, T: DeserializeOwned> Iterator for IntoRecords<H, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        next_record(&mut self.stream, &mut self.broken)
    }
}

fn next_record<H, T>(stream: &mut Stream<H>, broken: &mut bool) -> Option<Result<T>>
where
    H: Handle,
    T: DeserializeOwned,
{
    if *broken {
        return None;
    }
    match stream.read_record() {
        Ok(record) => record.map(Ok),
        Err(err) => {
            *broken = true;
            Some(Err(err))
        }
    }
}
