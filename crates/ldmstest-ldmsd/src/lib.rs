//! ldmsd support for LDMS test clusters.
//!
//! Turns resolved cluster specs into daemon descriptions, renders their
//! configuration files and command lines, plans the container layout of a
//! cluster, and drives daemons on nodes through the [`ClusterNode`] seam.

pub mod cluster;
pub mod console;
pub mod daemon;
pub mod env;
pub mod error;
pub mod node;
pub mod render;
pub mod version;

pub use cluster::{ovis_env, python_path, ClusterPlan, OVIS_MOUNT, SPEC_LABEL};
pub use console::{read_message, read_messages, strip_control_sequences, Message};
pub use daemon::DaemonSpec;
pub use env::{env_dict, env_dict_opt};
pub use error::{DaemonError, DaemonResult, MessageError};
pub use node::{
    check_ldmsd, kill_ldmsd, ldms_ls, ldmsd_version, pgrep_count, start_ldmsd, ClusterNode,
    ExecOutput,
};
pub use render::{command_line, controller_command, controller_input, render_config};
pub use version::LdmsdVersion;
