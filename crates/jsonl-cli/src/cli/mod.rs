//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `cat`: Re-emit every record, normalised to one compact line each
//! - `count`: Print the number of records
//! - `append`: Append JSON values to a file
//! - `from-json`: Turn a JSON array into JSONL
//! - `to-json`: Collect JSONL records into a JSON array
//!
//! # Global Flags
//!
//! - `--ascii`: Escape non-ASCII characters in output
//! - `--sort-keys`: Sort object keys in output
//! - `--skip-blank`: Ignore blank input lines instead of failing
//! - `--config`: YAML file with `encode:`/`decode:` sections
//!
//! # Example
//!
//! ```bash
//! jsonl append events.jsonl '{"event":"start"}' '{"event":"stop"}'
//! jsonl count events.jsonl
//! cat export.json | jsonl from-json -o export.jsonl
//! jsonl --skip-blank to-json --pretty events.jsonl
//! ```

mod args;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

pub use args::{AppendArgs, CatArgs, CountArgs, FromJsonArgs, ToJsonArgs};
pub use execute::{
    execute_append, execute_cat, execute_count, execute_from_json, execute_to_json, open_input,
    read_text, STDIN,
};

use crate::config::{Config, Overrides};

/// jsonl - inspect and convert line-delimited JSON
///
/// Every input path accepts `-` for standard input. Diagnostics go to stderr
/// and are controlled with `RUST_LOG`.
#[derive(Parser, Debug)]
#[command(name = "jsonl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Escape every non-ASCII character as \uXXXX in output
    #[arg(long, global = true)]
    pub ascii: bool,

    /// Emit object keys in sorted order
    #[arg(long, global = true)]
    pub sort_keys: bool,

    /// Skip blank input lines instead of rejecting them
    #[arg(long, global = true)]
    pub skip_blank: bool,

    /// YAML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Re-emit every record on its own compact line
    ///
    /// Useful for normalising whitespace, or with --ascii/--sort-keys for
    /// canonicalising a file.
    Cat(CatArgs),

    /// Print the number of records
    Count(CountArgs),

    /// Append JSON values to a JSONL file
    ///
    /// The file is created if missing. Nothing is written unless every value
    /// parses.
    Append(AppendArgs),

    /// Convert a JSON array into JSONL
    ///
    /// The input must be a single JSON array; each element becomes a line.
    FromJson(FromJsonArgs),

    /// Convert JSONL into a JSON array
    ToJson(ToJsonArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Flags that override the configuration file.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            ascii_only: self.ascii,
            sort_keys: self.sort_keys,
            skip_blank: self.skip_blank,
        }
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Configuration, I/O, encode and decode failures of the command.
    pub fn execute(&self) -> Result<()> {
        let config = Config::resolve(self.config.as_deref(), self.overrides())?;
        let stdout = io::stdout();
        let mut out = stdout.lock();

        match &self.command {
            Commands::Cat(args) => {
                let mut input = open_input(&args.input, config.decode)?;
                execute_cat(&mut input, &mut out, &config.encode)?;
            }
            Commands::Count(args) => {
                let mut input = open_input(&args.input, config.decode)?;
                let count = execute_count(&mut input)?;
                writeln!(out, "{count}")?;
            }
            Commands::Append(args) => {
                execute_append(&args.path, &args.values, &config.encode)?;
            }
            Commands::FromJson(args) => {
                let text = read_text(&args.input)?;
                execute_from_json(&text, args.output.as_deref(), &mut out, &config.encode)?;
            }
            Commands::ToJson(args) => {
                let text = read_text(&args.input)?;
                execute_to_json(&text, &mut out, &config.decode, args.pretty)?;
            }
        }

        out.flush()?;
        Ok(())
    }
}
