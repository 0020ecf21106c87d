//! `ldmstest plan`

use std::path::PathBuf;

use clap::{Args, ValueHint};
use ldmstest_ldmsd::ClusterPlan;
use ldmstest_spec::Spec;

use crate::cli::CommandContext;

/// Print the container plan of a spec as JSON
#[derive(Debug, Args)]
pub struct PlanCommand {
    /// Spec file
    #[arg(value_hint = ValueHint::FilePath)]
    pub spec: PathBuf,
}

impl PlanCommand {
    pub fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let config = ctx.harness_config()?;
        let spec = Spec::from_path(&self.spec)?;
        let plan = ClusterPlan::from_spec(&spec, &config)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        Ok(())
    }
}
