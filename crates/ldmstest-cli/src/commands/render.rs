//! `ldmstest render-config`

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Args, ValueHint};
use ldmstest_ldmsd::{command_line, render_config, DaemonSpec, LdmsdVersion};
use ldmstest_spec::Spec;
use serde::Serialize;

use crate::cli::CommandContext;
use crate::output::{print_output, FormattedOutput};

/// Render the ldmsd configuration file and command line of one host
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Spec file
    #[arg(value_hint = ValueHint::FilePath)]
    pub spec: PathBuf,

    /// Hostname of the node running the daemon
    #[arg(long)]
    pub host: String,

    /// Target ldmsd version, selects the sampler start syntax
    #[arg(long, default_value_t = LdmsdVersion::default())]
    pub ldmsd_version: LdmsdVersion,
}

impl RenderCommand {
    pub fn execute(&self, ctx: &CommandContext) -> anyhow::Result<()> {
        let spec = Spec::from_path(&self.spec)?;
        let daemon = DaemonSpec::for_host(&spec, &self.host)?
            .ok_or_else(|| anyhow!("host `{}` runs no ldmsd", self.host))?;

        let rendered = Rendered {
            host: self.host.clone(),
            version: self.ldmsd_version.to_string(),
            command: command_line(&daemon),
            config: render_config(&daemon, self.ldmsd_version)?,
        };
        print_output(ctx, &rendered)
    }
}

#[derive(Debug, Serialize)]
struct Rendered {
    host: String,
    version: String,
    command: String,
    config: String,
}

impl FormattedOutput for Rendered {
    fn format_text(&self) -> String {
        format!("# {}\n{}", self.command, self.config)
    }
}
