//! Configuration for opening, encoding and decoding JSONL data.
//!
//! Every option is a named field on a plain struct. The structs derive serde
//! traits with `#[serde(default)]` so callers can load them from a config file
//! and only spell out what differs from the defaults.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default read buffer size for file-backed streams.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// How a file is opened, mirroring the conventional `r`/`w`/`a`/`r+` modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpenMode {
    /// Read only, the file must exist (`r`).
    #[default]
    Read,
    /// Write only, created if missing and truncated if present (`w`).
    Write,
    /// Write only, created if missing, every write goes to the end (`a`).
    Append,
    /// Read and write an existing file without truncating it (`r+`).
    ReadWrite,
}

impl OpenMode {
    /// Returns the conventional mode string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
            Self::Append => "a",
            Self::ReadWrite => "r+",
        }
    }

    /// Whether records can be read in this mode.
    #[must_use]
    pub fn is_readable(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    /// Whether records can be appended in this mode.
    #[must_use]
    pub fn is_writable(self) -> bool {
        !matches!(self, Self::Read)
    }

    pub(crate) fn to_std(self) -> std::fs::OpenOptions {
        let mut options = std::fs::OpenOptions::new();
        match self {
            Self::Read => options.read(true),
            Self::Write => options.write(true).create(true).truncate(true),
            Self::Append => options.append(true).create(true),
            Self::ReadWrite => options.read(true).write(true),
        };
        options
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" | "read" => Ok(Self::Read),
            "w" | "write" => Ok(Self::Write),
            "a" | "append" => Ok(Self::Append),
            "r+" | "read-write" => Ok(Self::ReadWrite),
            other => Err(Error::InvalidOption(format!("unknown open mode {other:?}"))),
        }
    }
}

/// Options for opening a file-backed stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
    /// Access mode.
    pub mode: OpenMode,
    /// Fail if the file already exists. Only meaningful for modes that create files.
    pub create_new: bool,
    /// Size of the read buffer in bytes.
    pub buffer_capacity: usize,
}

impl OpenOptions {
    /// Options for the given mode with every other field at its default.
    #[must_use]
    pub fn new(mode: OpenMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Shorthand for [`OpenMode::Read`].
    #[must_use]
    pub fn read() -> Self {
        Self::new(OpenMode::Read)
    }

    /// Shorthand for [`OpenMode::Write`].
    #[must_use]
    pub fn write() -> Self {
        Self::new(OpenMode::Write)
    }

    /// Shorthand for [`OpenMode::Append`].
    #[must_use]
    pub fn append() -> Self {
        Self::new(OpenMode::Append)
    }

    /// Shorthand for [`OpenMode::ReadWrite`].
    #[must_use]
    pub fn read_write() -> Self {
        Self::new(OpenMode::ReadWrite)
    }

    /// Sets [`create_new`](Self::create_new).
    #[must_use]
    pub fn create_new(mut self, create_new: bool) -> Self {
        self.create_new = create_new;
        self
    }

    /// Sets [`buffer_capacity`](Self::buffer_capacity).
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Checks the combination of fields without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] when `create_new` is combined with a
    /// mode that never creates files, or when the buffer capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.create_new && !matches!(self.mode, OpenMode::Write | OpenMode::Append) {
            return Err(Error::InvalidOption(format!(
                "create_new requires mode w or a, got {}",
                self.mode
            )));
        }
        if self.buffer_capacity == 0 {
            return Err(Error::InvalidOption(
                "buffer_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn to_std(&self) -> std::fs::OpenOptions {
        let mut options = self.mode.to_std();
        if self.create_new {
            options.create_new(true);
        }
        options
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            mode: OpenMode::default(),
            create_new: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Encoder configuration shared by streams and the bulk codec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeOptions {
    /// Pretty-print with this indent string.
    ///
    /// Pretty output spans several lines, so only the bulk codec accepts it.
    pub indent: Option<String>,
    /// Escape every non-ASCII character as `\uXXXX`.
    pub ascii_only: bool,
    /// Emit object keys in lexicographic order, recursively.
    pub sort_keys: bool,
}

impl EncodeOptions {
    /// Sets [`indent`](Self::indent).
    #[must_use]
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    /// Sets [`ascii_only`](Self::ascii_only).
    #[must_use]
    pub fn ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }

    /// Sets [`sort_keys`](Self::sort_keys).
    #[must_use]
    pub fn sort_keys(mut self, sort_keys: bool) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    /// Rejects options that would spread one record over several lines.
    pub(crate) fn ensure_single_line(&self) -> Result<()> {
        match &self.indent {
            Some(_) => Err(Error::InvalidOption(
                "indent is not allowed when writing one record per line".to_string(),
            )),
            None => Ok(()),
        }
    }
}

/// What to do with empty or whitespace-only lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlankLines {
    /// Treat them as malformed records.
    #[default]
    Reject,
    /// Ignore them.
    Skip,
}

/// Decoder configuration shared by streams and the bulk codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    /// Blank line policy.
    pub blank_lines: BlankLines,
}

impl DecodeOptions {
    /// Sets [`blank_lines`](Self::blank_lines).
    #[must_use]
    pub fn blank_lines(mut self, policy: BlankLines) -> Self {
        self.blank_lines = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::r("r", OpenMode::Read)]
    #[case::w("w", OpenMode::Write)]
    #[case::a("a", OpenMode::Append)]
    #[case::r_plus("r+", OpenMode::ReadWrite)]
    #[case::read_word("read", OpenMode::Read)]
    #[case::read_write_word("read-write", OpenMode::ReadWrite)]
    fn open_mode_parses_conventional_strings(#[case] input: &str, #[case] expected: OpenMode) {
        assert_eq!(input.parse::<OpenMode>().unwrap(), expected);
    }

    #[rstest]
    #[case::w_plus("w+")]
    #[case::binary("rb")]
    #[case::empty("")]
    fn open_mode_rejects_unknown_strings(#[case] input: &str) {
        let err = input.parse::<OpenMode>().unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
    }

    #[test]
    fn open_mode_display_matches_as_str() {
        assert_eq!(OpenMode::ReadWrite.to_string(), "r+");
        assert_eq!(OpenMode::Append.to_string(), "a");
    }

    #[test]
    fn only_read_mode_is_not_writable() {
        assert!(!OpenMode::Read.is_writable());
        assert!(OpenMode::Write.is_writable());
        assert!(OpenMode::ReadWrite.is_readable());
        assert!(!OpenMode::Append.is_readable());
    }

    #[rstest]
    #[case::read(OpenMode::Read)]
    #[case::read_write(OpenMode::ReadWrite)]
    fn create_new_requires_creating_mode(#[case] mode: OpenMode) {
        let err = OpenOptions::new(mode).create_new(true).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
    }

    #[test]
    fn zero_buffer_capacity_is_rejected() {
        let err = OpenOptions::read().buffer_capacity(0).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
    }

    #[test]
    fn default_open_options_are_valid() {
        let options = OpenOptions::default();
        assert_eq!(options.mode, OpenMode::Read);
        assert_eq!(options.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        options.validate().unwrap();
        OpenOptions::append().create_new(true).validate().unwrap();
    }

    #[test]
    fn indent_is_not_single_line() {
        EncodeOptions::default().ensure_single_line().unwrap();
        let err = EncodeOptions::default()
            .indent("  ")
            .ensure_single_line()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOption(_)));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let encode: EncodeOptions = serde_json::from_str(r#"{"sort_keys":true}"#).unwrap();
        assert_eq!(encode, EncodeOptions::default().sort_keys(true));

        let decode: DecodeOptions = serde_json::from_str(r#"{"blank_lines":"skip"}"#).unwrap();
        assert_eq!(decode.blank_lines, BlankLines::Skip);

        let open: OpenOptions = serde_json::from_str(r#"{"mode":"read-write"}"#).unwrap();
        assert_eq!(open, OpenOptions::read_write());
    }
}
