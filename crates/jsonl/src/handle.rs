//! Byte handles a [`Stream`](crate::Stream) can sit on.
//!
//! [`Handle`] names exactly the operations a stream needs from its backend.
//! Random-access backends ([`FileHandle`], [`MemoryHandle`]) implement all of
//! them; sequential ones ([`ReadHandle`](crate::ReadHandle),
//! [`WriteHandle`](crate::WriteHandle)) keep the default bodies, which fail
//! with [`io::ErrorKind::Unsupported`].

use crate::error::{Error, Result};
use crate::options::{OpenMode, OpenOptions};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Cursor, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub(crate) fn unsupported(operation: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{operation} is not supported by this handle"),
    )
}

/// Byte-oriented I/O backend for a stream.
pub trait Handle {
    /// Appends bytes up to and including the next `\n` to `buf`.
    ///
    /// Returns the number of bytes read; zero means end of input. The bytes
    /// are not checked for UTF-8; a line is consumed whatever it holds.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors.
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize>;

    /// Writes all of `bytes` at the current write position.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors.
    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Pushes buffered writes to the backend.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors.
    fn flush(&mut self) -> io::Result<()>;

    /// Moves the cursor.
    ///
    /// # Errors
    ///
    /// Unsupported on sequential backends.
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Err(unsupported("seek"))
    }

    /// Reports the cursor as a byte offset.
    ///
    /// # Errors
    ///
    /// Unsupported on sequential backends.
    fn position(&mut self) -> io::Result<u64> {
        Err(unsupported("position"))
    }

    /// Flushes and makes written data durable.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors.
    fn sync(&mut self) -> io::Result<()> {
        self.flush()
    }

    /// Shrinks or extends the backend to `len` bytes without moving the cursor.
    ///
    /// # Errors
    ///
    /// Unsupported on sequential backends.
    fn truncate(&mut self, _len: u64) -> io::Result<()> {
        Err(unsupported("truncate"))
    }

    /// Whether the read cursor is at end of input.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors, or when the backend cannot be read.
    fn is_eof(&mut self) -> io::Result<bool>;

    /// Releases backend resources. Called once by the owning stream.
    ///
    /// # Errors
    ///
    /// Fails when pending writes cannot be flushed.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }

    /// Filesystem path of the backend, if it has one.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// Operating-system descriptor of the backend, if it has one.
    fn descriptor(&self) -> Option<i64> {
        None
    }

    /// Mode the backend was opened in, if it was opened from a path.
    fn mode(&self) -> Option<OpenMode> {
        None
    }
}

/// A file opened for JSONL access.
///
/// Reads go through a [`BufReader`]. Before each write, read-ahead is
/// discarded so the bytes land at the logical cursor rather than wherever the
/// buffer left the OS offset.
#[derive(Debug)]
pub struct FileHandle {
    inner: BufReader<File>,
    path: Option<PathBuf>,
    mode: Option<OpenMode>,
}

impl FileHandle {
    /// Opens `path` according to `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for invalid options (checked before
    /// the filesystem is touched) and [`Error::Open`] when the file cannot be
    /// opened.
    pub fn open(path: impl AsRef<Path>, options: &OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        options.validate()?;
        let file = options.to_std().open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            mode: options.mode,
            source,
        })?;
        tracing::debug!(path = %path.display(), mode = %options.mode, "opened JSONL file");
        Ok(Self {
            inner: BufReader::with_capacity(options.buffer_capacity, file),
            path: Some(path.to_path_buf()),
            mode: Some(options.mode),
        })
    }

    /// Wraps an already open file. The handle has no known path or mode.
    #[must_use]
    pub fn from_file(file: File) -> Self {
        Self {
            inner: BufReader::new(file),
            path: None,
            mode: None,
        }
    }

    /// Returns a reference to the underlying file.
    #[must_use]
    pub fn get_ref(&self) -> &File {
        self.inner.get_ref()
    }

    /// Consumes the handle, returning the underlying file.
    ///
    /// Unread buffered bytes are lost.
    #[must_use]
    pub fn into_inner(self) -> File {
        self.inner.into_inner()
    }

    /// Puts the OS offset back at the logical cursor, dropping read-ahead.
    fn settle(&mut self) -> io::Result<()> {
        if !self.inner.buffer().is_empty() {
            self.inner.seek(SeekFrom::Current(0))?;
        }
        Ok(())
    }
}

impl Handle for FileHandle {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.inner.read_until(b'\n', buf)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.settle()?;
        self.inner.get_mut().write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.get_mut().flush()
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.inner.stream_position()
    }

    fn sync(&mut self) -> io::Result<()> {
        self.flush()?;
        self.inner.get_ref().sync_all()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.settle()?;
        self.inner.get_ref().set_len(len)
    }

    fn is_eof(&mut self) -> io::Result<bool> {
        Ok(self.inner.fill_buf()?.is_empty())
    }

    fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[cfg(unix)]
    fn descriptor(&self) -> Option<i64> {
        use std::os::fd::AsRawFd;
        Some(i64::from(self.inner.get_ref().as_raw_fd()))
    }

    fn mode(&self) -> Option<OpenMode> {
        self.mode
    }
}

/// An in-memory, readable and writable buffer.
///
/// A buffer built from text starts with the cursor at the beginning, so
/// reading yields the text and writing overwrites it.
#[derive(Debug, Default, Clone)]
pub struct MemoryHandle {
    inner: Cursor<Vec<u8>>,
}

impl MemoryHandle {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer holding `text`, cursor at the start.
    #[must_use]
    pub fn from_string(text: impl Into<String>) -> Self {
        Self {
            inner: Cursor::new(text.into().into_bytes()),
        }
    }

    /// The whole buffer, regardless of the cursor.
    #[must_use]
    pub fn contents(&self) -> &[u8] {
        self.inner.get_ref()
    }

    /// The whole buffer as text, if it is valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.contents()).ok()
    }

    /// Consumes the handle, returning the buffer.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.inner.into_inner()
    }
}

impl Handle for MemoryHandle {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        self.inner.read_until(b'\n', buf)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        Write::write_all(&mut self.inner, bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.inner.position())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length exceeds memory"))?;
        self.inner.get_mut().resize(len, 0);
        Ok(())
    }

    fn is_eof(&mut self) -> io::Result<bool> {
        Ok(self.inner.position() >= self.inner.get_ref().len() as u64)
    }
}

/// Lets a stream pick its backend at runtime, e.g. `Stream<Box<dyn Handle>>`.
impl<H: Handle + ?Sized> Handle for Box<H> {
    fn read_line(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        (**self).read_line(buf)
    }

    fn write_all(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        (**self).seek(pos)
    }

    fn position(&mut self) -> io::Result<u64> {
        (**self).position()
    }

    fn sync(&mut self) -> io::Result<()> {
        (**self).sync()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        (**self).truncate(len)
    }

    fn is_eof(&mut self) -> io::Result<bool> {
        (**self).is_eof()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }

    fn path(&self) -> Option<&Path> {
        (**self).path()
    }

    fn descriptor(&self) -> Option<i64> {
        (**self).descriptor()
    }

    fn mode(&self) -> Option<OpenMode> {
        (**self).mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn memory_handle_reads_lines_in_order() {
        let mut handle = MemoryHandle::from_string("a\nb\nc");
        let mut line = Vec::new();

        assert_eq!(handle.read_line(&mut line).unwrap(), 2);
        assert_eq!(line, b"a\n");
        line.clear();
        handle.read_line(&mut line).unwrap();
        assert_eq!(line, b"b\n");
        line.clear();
        handle.read_line(&mut line).unwrap();
        assert_eq!(line, b"c");
        assert!(handle.is_eof().unwrap());
        line.clear();
        assert_eq!(handle.read_line(&mut line).unwrap(), 0);
    }

    #[test]
    fn memory_handle_from_string_overwrites_at_cursor() {
        let mut handle = MemoryHandle::from_string("xxxx");
        handle.write_all(b"ab").unwrap();
        assert_eq!(handle.as_str(), Some("abxx"));
        assert_eq!(handle.position().unwrap(), 2);
    }

    #[test]
    fn memory_handle_truncate_shrinks_and_zero_extends() {
        let mut handle = MemoryHandle::from_string("abcdef");
        handle.truncate(3).unwrap();
        assert_eq!(handle.contents(), b"abc");
        handle.truncate(5).unwrap();
        assert_eq!(handle.contents(), b"abc\0\0");
    }

    #[test]
    fn memory_handle_seek_then_read() {
        let mut handle = MemoryHandle::from_string("one\ntwo\n");
        handle.seek(SeekFrom::Start(4)).unwrap();
        let mut line = Vec::new();
        handle.read_line(&mut line).unwrap();
        assert_eq!(line, b"two\n");
    }

    #[test]
    fn memory_handle_has_no_identity() {
        let handle = MemoryHandle::new();
        assert!(handle.path().is_none());
        assert!(handle.descriptor().is_none());
        assert!(handle.mode().is_none());
    }

    #[test]
    fn read_line_passes_invalid_utf8_through() {
        let mut handle = MemoryHandle::new();
        handle.write_all(b"\xff\xfe\n1\n").unwrap();
        handle.seek(SeekFrom::Start(0)).unwrap();

        let mut line = Vec::new();
        assert_eq!(handle.read_line(&mut line).unwrap(), 3);
        assert_eq!(line, b"\xff\xfe\n");
        line.clear();
        handle.read_line(&mut line).unwrap();
        assert_eq!(line, b"1\n");
    }

    #[test]
    fn boxed_handle_delegates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("boxed.jsonl");
        std::fs::write(&path, "1\n").unwrap();

        let mut handle: Box<dyn Handle> =
            Box::new(FileHandle::open(&path, &OpenOptions::read()).unwrap());
        assert_eq!(handle.path(), Some(path.as_path()));
        assert_eq!(handle.mode(), Some(OpenMode::Read));

        let mut line = Vec::new();
        assert_eq!(handle.read_line(&mut line).unwrap(), 2);
        assert!(handle.is_eof().unwrap());
        assert_eq!(handle.position().unwrap(), 2);
    }

    #[test]
    fn file_handle_open_missing_file_is_open_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.jsonl");
        let err = FileHandle::open(&path, &OpenOptions::read()).unwrap_err();
        match err {
            Error::Open {
                path: failed, mode, ..
            } => {
                assert_eq!(failed, path);
                assert_eq!(mode, OpenMode::Read);
            }
            other => panic!("expected open error, got {other:?}"),
        }
    }

    #[test]
    fn file_handle_invalid_options_do_not_touch_filesystem() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never.jsonl");
        let options = OpenOptions::write().buffer_capacity(0);
        let err = FileHandle::open(&path, &options).unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
        assert!(!path.exists());
    }

    #[test]
    fn file_handle_write_after_read_lands_at_cursor() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.jsonl");
        std::fs::write(&path, "first\nsecond\n").unwrap();

        let mut handle = FileHandle::open(&path, &OpenOptions::read_write()).unwrap();
        let mut line = Vec::new();
        handle.read_line(&mut line).unwrap();
        assert_eq!(line, b"first\n");
        assert_eq!(handle.position().unwrap(), 6);

        handle.write_all(b"SECOND\n").unwrap();
        handle.flush().unwrap();
        drop(handle);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nSECOND\n");
    }

    #[test]
    fn file_handle_truncate_keeps_cursor() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.jsonl");
        std::fs::write(&path, "0123456789").unwrap();

        let mut handle = FileHandle::open(&path, &OpenOptions::read_write()).unwrap();
        handle.seek(SeekFrom::Start(2)).unwrap();
        handle.truncate(4).unwrap();
        assert_eq!(handle.position().unwrap(), 2);
        drop(handle);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0123");
    }

    #[test]
    fn file_handle_reports_path_and_eof() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.jsonl");
        std::fs::write(&path, "").unwrap();

        let mut handle = FileHandle::open(&path, &OpenOptions::read()).unwrap();
        assert_eq!(handle.path(), Some(path.as_path()));
        assert!(handle.is_eof().unwrap());
        #[cfg(unix)]
        assert!(handle.descriptor().is_some());
    }

    #[test]
    fn file_handle_from_file_has_no_path() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"x\n").unwrap();
        file.rewind().unwrap();

        let mut handle = FileHandle::from_file(file);
        assert!(handle.path().is_none());
        assert!(handle.mode().is_none());
        let mut line = Vec::new();
        handle.read_line(&mut line).unwrap();
        assert_eq!(line, b"x\n");

        let mut rest = String::new();
        handle.into_inner().read_to_string(&mut rest).unwrap();
        assert!(rest.is_empty());
    }
}
