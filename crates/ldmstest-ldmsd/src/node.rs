//! The command channel into a cluster node, and ldmsd helpers over it.

use indexmap::IndexMap;
use ldmstest_ls::{LsParser, LsSets};
use tracing::{debug, info};

use crate::daemon::DaemonSpec;
use crate::error::{DaemonError, DaemonResult};
use crate::render::{command_line, render_config};
use crate::version::LdmsdVersion;

/// Exit status and combined output of a command run on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutput {
    pub status: i32,
    pub output: String,
}

impl ExecOutput {
    pub fn new(status: i32, output: impl Into<String>) -> Self {
        Self {
            status,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// A node of a running cluster, as provided by the container platform.
pub trait ClusterNode {
    fn hostname(&self) -> &str;

    /// Run a shell command with `env` added to the node's environment.
    fn exec(&self, command: &str, env: &IndexMap<String, String>) -> DaemonResult<ExecOutput>;

    fn write_file(&self, path: &str, content: &str) -> DaemonResult<()>;
}

/// `pgrep -c PROG`.
pub fn pgrep_count(node: &dyn ClusterNode, prog: &str) -> DaemonResult<u32> {
    let command = format!("pgrep -c {prog}");
    let out = node.exec(&command, &IndexMap::new())?;
    out.output.trim().parse().map_err(|_| DaemonError::CommandFailed {
        host: node.hostname().to_string(),
        command,
        status: out.status,
        output: out.output.clone(),
    })
}

/// Whether an ldmsd process is running on `node`.
pub fn check_ldmsd(node: &dyn ClusterNode) -> DaemonResult<bool> {
    Ok(node.exec("pgrep -c ldmsd", &IndexMap::new())?.success())
}

/// Write the daemon's config file and launch it, unless one is running.
///
/// Returns whether a daemon was started.
pub fn start_ldmsd(
    node: &dyn ClusterNode,
    daemon: &DaemonSpec,
    version: LdmsdVersion,
) -> DaemonResult<bool> {
    if check_ldmsd(node)? {
        debug!(host = node.hostname(), "ldmsd already running");
        return Ok(false);
    }

    let config = render_config(daemon, version)?;
    node.write_file(&daemon.config_file(), &config)?;

    let command = command_line(daemon);
    let out = node.exec(&command, daemon.env())?;
    if !out.success() {
        return Err(command_failed(node, command, out));
    }
    info!(host = node.hostname(), %command, "started ldmsd");
    Ok(true)
}

pub fn kill_ldmsd(node: &dyn ClusterNode) -> DaemonResult<()> {
    node.exec("pkill ldmsd", &IndexMap::new())?;
    Ok(())
}

/// Run `ldms_ls ARGS` on `node` and parse its listing.
pub fn ldms_ls<S: AsRef<str>>(node: &dyn ClusterNode, args: &[S]) -> DaemonResult<LsSets> {
    let mut command = String::from("ldms_ls");
    for arg in args {
        command.push(' ');
        command.push_str(arg.as_ref());
    }

    let out = node.exec(&command, &IndexMap::new())?;
    if !out.success() {
        return Err(command_failed(node, command, out));
    }
    Ok(LsParser::new().parse(&out.output)?)
}

/// Version reported by `ldmsd -V` on `node`.
pub fn ldmsd_version(node: &dyn ClusterNode) -> DaemonResult<LdmsdVersion> {
    let out = node.exec("ldmsd -V", &IndexMap::new())?;
    LdmsdVersion::from_output(&out.output)
}

fn command_failed(node: &dyn ClusterNode, command: String, out: ExecOutput) -> DaemonError {
    DaemonError::CommandFailed {
        host: node.hostname().to_string(),
        command,
        status: out.status,
        output: out.output,
    }
}
