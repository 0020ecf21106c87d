//! `ldmstest parse-ls`

use std::fmt::Write;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueHint};
use ldmstest_ls::{LsParser, LsSets};
use serde::Serialize;

use crate::cli::CommandContext;
use crate::output::{print_output, FormattedOutput};

/// Parse `ldms_ls -l` output into sets
#[derive(Debug, Args)]
pub struct ParseLsCommand {
    /// Listing file, `-` for stdin
    #[arg(default_value = "-", value_hint = ValueHint::FilePath)]
    pub input: PathBuf,
}

impl ParseLsCommand {
    pub fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let text = self.read_input()?;
        let sets = LsParser::new().parse(&text)?;
        print_output(ctx, &Listing { sets })
    }

    fn read_input(&self) -> anyhow::Result<String> {
        if self.input.as_os_str() == "-" {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading listing from stdin")?;
            return Ok(text);
        }
        std::fs::read_to_string(&self.input)
            .with_context(|| format!("reading {}", self.input.display()))
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct Listing {
    sets: LsSets,
}

impl FormattedOutput for Listing {
    fn format_text(&self) -> String {
        let mut out = String::new();
        for (name, set) in &self.sets {
            let _ = write!(out, "{name}: {} metrics", set.data.len());
            if let Some(meta) = &set.meta {
                let _ = write!(out, ", schema {}, flags {}", meta.schema, meta.flags);
            }
            if let Some(ts) = &set.ts {
                let _ = write!(out, ", last update {ts}");
            }
            out.push('\n');
        }
        out
    }
}
