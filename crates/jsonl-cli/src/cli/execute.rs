//! Command execution logic.
//!
//! Each command takes its input and output explicitly so it can run against
//! stdin/stdout in the binary and against buffers in tests.

use anyhow::{Context, Result};
use jsonl::{
    generate_with, parse_with, write_atomic, DecodeOptions, EncodeOptions, FileHandle, Handle,
    OpenOptions, ReadHandle, Stream, WriteHandle,
};
use serde::de::IgnoredAny;
use serde_json::Value;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::Error;

/// Path that stands for standard input.
pub const STDIN: &str = "-";

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN
}

/// Open `path` (or stdin for `-`) as a record stream.
pub fn open_input(path: &Path, decode: DecodeOptions) -> Result<Stream<Box<dyn Handle>>> {
    let handle: Box<dyn Handle> = if is_stdin(path) {
        Box::new(ReadHandle::new(io::stdin().lock()))
    } else {
        Box::new(FileHandle::open(path, &OpenOptions::read())?)
    };
    Ok(Stream::new(handle).with_decode_options(decode))
}

/// Read all of `path` (or stdin for `-`) as text.
pub fn read_text(path: &Path) -> Result<String> {
    if is_stdin(path) {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        Ok(text)
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Execute the cat command
///
/// Re-encodes every record of `input` onto `output`, one line each.
pub fn execute_cat<H: Handle, W: Write>(
    input: &mut Stream<H>,
    output: W,
    encode: &EncodeOptions,
) -> Result<usize> {
    let written = Stream::new(WriteHandle::new(output))
        .with_encode_options(encode.clone())?
        .scope(|sink| {
            let mut written = 0;
            for record in input.iter::<Value>() {
                sink.append(&record?)?;
                written += 1;
            }
            Ok::<_, jsonl::Error>(written)
        })?;
    tracing::debug!(records = written, "re-encoded records");
    Ok(written)
}

/// Execute the count command
pub fn execute_count<H: Handle>(input: &mut Stream<H>) -> Result<usize> {
    Ok(input.each(|_: IgnoredAny| {})?)
}

/// Execute the append command
///
/// All values are parsed before the file is opened, so a bad value leaves
/// the file untouched.
pub fn execute_append(path: &Path, values: &[String], encode: &EncodeOptions) -> Result<usize> {
    let records = values
        .iter()
        .map(|value| {
            serde_json::from_str::<Value>(value).map_err(|source| Error::InvalidValue {
                value: value.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Stream::open(path, &OpenOptions::append())?
        .with_encode_options(encode.clone())?
        .scope(|stream| {
            stream.append_all(&records)?;
            Ok::<_, jsonl::Error>(())
        })?;

    tracing::info!(path = %path.display(), records = records.len(), "appended records");
    Ok(records.len())
}

/// Execute the from-json command
///
/// `text` must hold a JSON array. With `target`, the records replace that
/// file atomically; otherwise they go to `output` followed by a newline.
pub fn execute_from_json<W: Write>(
    text: &str,
    target: Option<&Path>,
    mut output: W,
    encode: &EncodeOptions,
) -> Result<()> {
    let document: Value = serde_json::from_str(text).context("input is not a JSON document")?;

    if let (Value::Array(records), Some(path)) = (&document, target) {
        write_atomic(path, records, encode)?;
        tracing::info!(path = %path.display(), records = records.len(), "wrote JSONL file");
        return Ok(());
    }

    // Anything but an array is rejected here with the offending type.
    let lines = generate_with(&document, encode)?;
    if !lines.is_empty() {
        writeln!(output, "{lines}")?;
    }
    Ok(())
}

/// Execute the to-json command
pub fn execute_to_json<W: Write>(
    text: &str,
    mut output: W,
    decode: &DecodeOptions,
    pretty: bool,
) -> Result<()> {
    let records: Vec<Value> = parse_with(text, decode)?;
    if pretty {
        serde_json::to_writer_pretty(&mut output, &records)?;
    } else {
        serde_json::to_writer(&mut output, &records)?;
    }
    writeln!(output)?;
    Ok(())
}
