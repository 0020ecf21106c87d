//! `ldmstest resolve`

use std::path::PathBuf;

use clap::{Args, ValueHint};
use ldmstest_spec::Spec;
use tracing::info;

use crate::cli::CommandContext;

/// Print the concrete spec: templates expanded, variables substituted
#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Spec file; `.yaml`/`.yml` is read as YAML, anything else as JSON
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Emit YAML instead of JSON
    #[arg(long)]
    pub yaml: bool,
}

impl ResolveCommand {
    pub fn execute(&self, _ctx: &CommandContext) -> anyhow::Result<()> {
        let spec = Spec::from_path(&self.file)?;
        info!(file = %self.file.display(), nodes = spec.nodes().len(), "resolved spec");

        let text = if self.yaml {
            spec.to_yaml()?
        } else {
            spec.to_json_pretty()?
        };
        println!("{}", text.trim_end());
        Ok(())
    }
}
