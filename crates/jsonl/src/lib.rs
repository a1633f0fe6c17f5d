//! Line-delimited JSON (JSONL) for Rust.
//!
//! Two ways in:
//!
//! - [`Stream`] wraps a byte handle (a file, an in-memory buffer, a pipe) and
//!   reads or appends one record per line, lazily.
//! - [`generate`] and [`parse`] convert a whole in-memory sequence to and
//!   from JSONL text.
//!
//! ```
//! use serde_json::{json, Value};
//!
//! let text = jsonl::generate(&[json!({"a": 1}), json!({"b": 2})])?;
//! let back: Vec<Value> = jsonl::parse(&text)?;
//! assert_eq!(back.len(), 2);
//! # Ok::<(), jsonl::Error>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod codec;
mod decode;
mod encode;
pub mod error;
pub mod handle;
pub mod options;
pub mod reader;
pub mod stream;
pub mod writer;

pub use atomic::write_atomic;
pub use codec::{generate, generate_with, parse, parse_with};
pub use error::{Error, Result};
pub use handle::{FileHandle, Handle, MemoryHandle};
pub use options::{BlankLines, DecodeOptions, EncodeOptions, OpenMode, OpenOptions};
pub use reader::ReadHandle;
pub use stream::{IntoRecords, Records, Stream};
pub use writer::WriteHandle;
