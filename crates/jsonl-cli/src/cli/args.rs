//! CLI argument structs for all commands.
//!
//! Input paths default to `-`, which reads standard input.

use clap::Parser;
use std::path::PathBuf;

/// Arguments for the `cat` command
#[derive(Parser, Debug, Clone)]
pub struct CatArgs {
    /// JSONL file to read (`-` for stdin)
    #[arg(default_value = "-")]
    pub input: PathBuf,
}

/// Arguments for the `count` command
#[derive(Parser, Debug, Clone)]
pub struct CountArgs {
    /// JSONL file to read (`-` for stdin)
    #[arg(default_value = "-")]
    pub input: PathBuf,
}

/// Arguments for the `append` command
#[derive(Parser, Debug, Clone)]
pub struct AppendArgs {
    /// JSONL file to append to; created if missing
    pub path: PathBuf,

    /// JSON values to append, one record each
    ///
    /// Every value is validated before the file is opened.
    #[arg(required = true)]
    pub values: Vec<String>,
}

/// Arguments for the `from-json` command
#[derive(Parser, Debug, Clone)]
pub struct FromJsonArgs {
    /// JSON file holding an array (`-` for stdin)
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Atomically write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `to-json` command
#[derive(Parser, Debug, Clone)]
pub struct ToJsonArgs {
    /// JSONL file to read (`-` for stdin)
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Pretty-print the resulting array
    #[arg(long)]
    pub pretty: bool,
}
