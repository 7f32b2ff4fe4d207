//! JSON payload resolution.
//!
//! Every payload-taking subcommand shares the same source set: a `--file`
//! flag, a `--data` flag, a bare positional JSON argument, or piped stdin.
//! The first source present wins; later sources are never consulted.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde_json::Value;
use std::io::{IsTerminal, Read};
use std::path::PathBuf;

/// Payload sources shared by the payload-taking subcommands.
#[derive(Debug, Clone, Args)]
pub struct PayloadArgs {
    /// Inline JSON payload
    #[arg(value_name = "JSON")]
    pub json: Option<String>,

    /// Read the JSON payload from a file
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Inline JSON payload (flag form)
    #[arg(long, value_name = "JSON")]
    pub data: Option<String>,
}

impl PayloadArgs {
    /// Resolve the payload from the first available source.
    pub fn resolve(&self) -> Result<Value> {
        self.resolve_with(std::io::stdin().is_terminal(), || {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        })
    }

    /// True when a JSON payload is available from some source: a flag, a
    /// positional argument that looks like an object, or piped stdin.
    pub fn has_json_source(&self, stdin_is_tty: bool) -> bool {
        self.file.is_some()
            || self.data.is_some()
            || self
                .json
                .as_deref()
                .is_some_and(|arg| arg.trim().starts_with('{'))
            || !stdin_is_tty
    }

    /// Resolution with an injected stdin, so tests can drive every branch.
    fn resolve_with<F>(&self, stdin_is_tty: bool, read_stdin: F) -> Result<Value>
    where
        F: FnOnce() -> std::io::Result<String>,
    {
        let sources: [fn(&Self) -> Option<Result<Value>>; 3] =
            [Self::from_file, Self::from_data, Self::from_arg];

        for source in sources {
            if let Some(payload) = source(self) {
                return payload;
            }
        }

        if stdin_is_tty {
            return Err(anyhow!(
                "No payload provided (pass JSON arg, --data, --file, or pipe via stdin)"
            ));
        }

        let input = read_stdin().context("failed to read stdin")?;
        if input.trim().is_empty() {
            return Err(anyhow!("Empty stdin payload"));
        }
        parse_json(&input)
    }

    fn from_file(&self) -> Option<Result<Value>> {
        self.file.as_ref().map(|path| {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_json(&content)
        })
    }

    fn from_data(&self) -> Option<Result<Value>> {
        self.data.as_deref().map(parse_json)
    }

    fn from_arg(&self) -> Option<Result<Value>> {
        self.json.as_deref().map(parse_json)
    }
}

/// Parse a JSON document, surfacing the parser's message on failure.
fn parse_json(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| anyhow!("invalid JSON payload: {e}"))
}
