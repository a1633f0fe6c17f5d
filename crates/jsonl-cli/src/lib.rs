//! Library half of the `jsonl` command-line tool.
//!
//! The binary is a thin wrapper around [`cli::Cli`]; commands live here so
//! they can be exercised against in-memory readers and writers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
