//! # Tagjson CLI Entry Point
//!
//! The main executable for the tagjson tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and installs the log
//!    subscriber (filtered by `RUST_LOG`, written to stderr).
//! 2. **Input**: Reads the payload from the command line, a file, or stdin.
//! 3. **Execution**: Encodes or decodes it with a default `TaggedJsonSerializer`.
//! 4. **Presentation**: Formats and prints the result to standard output, or the error to
//!    standard error.

mod cli;
mod formatter;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, InputArgs};
use formatter::{FormattedString, GenericError, PlainJson};
use std::{io::Read, process};
use tagjson_core::{TaggedJsonSerializer, Value};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Cli::parse();
    init_tracing();

    let serializer = TaggedJsonSerializer::new();

    match args.command {
        Commands::Encode { input } => encode(&serializer, &input),
        Commands::Decode { input, json } => decode(&serializer, &input, json),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_or_exit(input: &InputArgs) -> String {
    match read_input(input) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

fn read_input(input: &InputArgs) -> anyhow::Result<String> {
    let text = match (&input.payload, &input.file) {
        (Some(payload), _) => payload.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Could not read '{}'", path.display()))?,
        (None, None) => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Could not read stdin")?;
            buf
        }
    };

    tracing::debug!(bytes = text.len(), "read payload");
    Ok(text)
}

fn encode(serializer: &TaggedJsonSerializer, input: &InputArgs) {
    let text = read_or_exit(input);

    let json: serde_json::Value = match serde_json::from_str(&text) {
        Ok(json) => json,
        Err(err) => {
            eprintln!(
                "{}",
                FormattedString::from(GenericError("Invalid JSON", err))
            );
            process::exit(1);
        }
    };

    match serializer.dumps(&Value::from_json(json)) {
        Ok(payload) => println!("{payload}"),
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}

fn decode(serializer: &TaggedJsonSerializer, input: &InputArgs, json: bool) {
    let text = read_or_exit(input);

    match serializer.loads(&text) {
        Ok(value) if json => print!("{}", FormattedString::from(PlainJson(value))),
        Ok(value) => print!("{}", FormattedString::from(value)),
        Err(err) => {
            eprintln!("{}", FormattedString::from(err));
            process::exit(1);
        }
    }
}
