//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use ldmstest_common_config::{ConfigLoader, Environment, HarnessConfig};
use tracing::debug;

use crate::commands::{ParseLsCommand, PlanCommand, RenderCommand, ResolveCommand};

/// ldmstest - LDMS cluster spec and telemetry tool
///
/// Resolves cluster specs, parses `ldms_ls` listings and renders ldmsd
/// configuration without starting a cluster.
#[derive(Debug, Parser)]
#[command(
    name = "ldmstest",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to the harness configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "LDMSTEST_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Expand templates and substitute variables of a spec
    Resolve(ResolveCommand),

    /// Parse an `ldms_ls -l` listing
    #[command(name = "parse-ls")]
    ParseLs(ParseLsCommand),

    /// Render the ldmsd configuration of one host
    #[command(name = "render-config")]
    RenderConfig(RenderCommand),

    /// Show the container plan of a spec
    Plan(PlanCommand),
}

/// Context shared by every command.
#[derive(Debug)]
pub struct CommandContext {
    pub format: OutputFormat,
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    /// Harness config from `--config`, else `.ldmstest/config.yaml` under
    /// the working directory. `.env` files there are loaded first.
    pub fn harness_config(&self) -> anyhow::Result<HarnessConfig> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        for path in Environment::load_dotenv(&cwd)? {
            debug!(path = %path.display(), "loaded environment file");
        }
        let loader = ConfigLoader::new(&cwd);
        let config = match &self.config_path {
            Some(path) => loader.load_file(path),
            None => loader.load(),
        };
        config.with_context(|| format!("loading config from {}", self.describe_config(&loader)))
    }

    fn describe_config(&self, loader: &ConfigLoader) -> String {
        self.config_path
            .as_deref()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| loader.config_path())
            .display()
            .to_string()
    }
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        let ctx = CommandContext {
            format: self.format,
            config_path: self.config,
        };
        match self.command {
            Command::Resolve(cmd) => cmd.execute(&ctx),
            Command::ParseLs(cmd) => cmd.execute(&ctx),
            Command::RenderConfig(cmd) => cmd.execute(&ctx),
            Command::Plan(cmd) => cmd.execute(&ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["ldmstest", "-vv", "--format", "json", "resolve", "spec.json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Resolve(_)));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["ldmstest", "-q", "-v", "plan", "spec.json"]).is_err());
    }
}
