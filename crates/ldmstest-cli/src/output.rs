//! Output formatting utilities for CLI commands.

use anyhow::Context;
use serde::Serialize;

use crate::cli::{CommandContext, OutputFormat};

/// Trait for types that can be formatted for output
pub trait FormattedOutput {
    fn format_text(&self) -> String;

    fn format_json(&self) -> Result<String, serde_json::Error>
    where
        Self: Serialize,
    {
        serde_json::to_string_pretty(self)
    }
}

/// Print formatted output to stdout
pub fn print_output<T>(ctx: &CommandContext, value: &T) -> anyhow::Result<()>
where
    T: FormattedOutput + Serialize,
{
    let output = match ctx.format {
        OutputFormat::Text => value.format_text(),
        OutputFormat::Json => value.format_json().context("JSON serialization failed")?,
    };

    let output = output.trim_end_matches('\n');
    println!("{output}");
    Ok(())
}
