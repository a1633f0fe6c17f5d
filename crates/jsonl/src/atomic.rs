//! Whole-file replacement that survives crashes.
//!
//! Records go to a sibling file named `<target>.tmp`, which is synced to
//! disk and then renamed over the target. A rename within one filesystem is
//! atomic on POSIX, so readers see either the old file or the complete new
//! one, never a half-written mix.
//!
//! ```no_run
//! use jsonl::{write_atomic, EncodeOptions};
//! use serde_json::json;
//!
//! let snapshot = [json!({"sensor": "a", "reading": 21.5}), json!({"sensor": "b", "reading": 19.0})];
//! write_atomic("snapshot.jsonl", &snapshot, &EncodeOptions::default())?;
//! # Ok::<(), jsonl::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::options::{EncodeOptions, OpenOptions};
use crate::stream::Stream;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Replaces `path` with one terminated line per record.
///
/// Lines are written exactly as [`Stream::append`] writes them.
///
/// # Errors
///
/// - [`Error::InvalidOption`](crate::Error::InvalidOption) when `options`
///   sets an indent; checked before anything touches the filesystem.
/// - [`Error::Open`](crate::Error::Open) when the temporary file cannot be
///   created.
/// - [`Error::Encode`](crate::Error::Encode) for a record with no JSON form.
/// - [`Error::Io`](crate::Error::Io) for write, sync or rename failures.
///
/// In every case the target keeps its previous contents and the temporary
/// file is removed if possible.
pub fn write_atomic<P, I>(path: P, records: I, options: &EncodeOptions) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator,
    I::Item: Serialize,
{
    options.ensure_single_line()?;
    let target = path.as_ref();
    let staging = staging_path(target);

    let written = Stream::open(&staging, &OpenOptions::write())?
        .with_encode_options(options.clone())?
        .scope(|stream| {
            stream.append_all(records)?;
            stream.sync()
        });

    if let Err(err) = written.and_then(|()| fs::rename(&staging, target).map_err(Error::from)) {
        if let Err(cleanup) = fs::remove_file(&staging) {
            tracing::debug!(path = %staging.display(), error = %cleanup, "staging file not removed");
        }
        return Err(err);
    }

    tracing::debug!(path = %target.display(), "atomically replaced JSONL file");
    Ok(())
}

/// `<target>.tmp`, next to the target.
fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
