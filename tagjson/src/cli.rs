//! # CLI
//!
//! This module defines the command-line interface of `tagjson` using `clap`.
//!
//! Every command reads a single payload, either from the positional argument, from `--file`, or
//! from stdin when neither is given.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tagjson",
    version,
    about = "Inspect and produce tagged JSON payloads"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode plain JSON as a compact tagged payload
    ///
    /// Objects whose only key collides with a tag key are escaped, so that decoding the output
    /// gives back exactly the input.
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// tagjson encode '{" t": [1, 2, 3]}'
    /// {" di":{" t__":[1,2,3]}}
    /// ```
    Encode {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Decode a tagged payload and show the typed values in it
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// tagjson decode '{"x":{" t":[1,2]},"id":{" u":"12345678123412341234123456789012"}}'
    /// ```
    Decode {
        #[command(flatten)]
        input: InputArgs,

        /// Print the decoded value as plain JSON instead of a typed view
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct InputArgs {
    /// The payload. Read from --file or stdin when omitted
    #[arg(conflicts_with = "file")]
    pub payload: Option<String>,

    /// Read the payload from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}
