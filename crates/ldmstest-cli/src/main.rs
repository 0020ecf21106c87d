//! ldmstest - LDMS cluster spec and telemetry tool
//!
//! Main entry point for the `ldmstest` binary.

use std::process::ExitCode;

use clap::Parser;
use ldmstest_common_core::{Classify, ErrorKind};
use ldmstest_common_log::{LogConfig, LogLevel};
use tracing::debug;

mod cli;
mod commands;
mod output;

use cli::Cli;

/// Application exit codes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
    ConfigError = 2,
    IoError = 3,
    SpecError = 4,
    TelemetryError = 5,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

impl From<ErrorKind> for Exit {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::MalformedSpec | ErrorKind::UnknownTemplate => Exit::SpecError,
            ErrorKind::MalformedTelemetry | ErrorKind::UnsupportedType => Exit::TelemetryError,
            ErrorKind::Config => Exit::ConfigError,
            ErrorKind::Io => Exit::IoError,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log = LogConfig::from_env().with_level(LogLevel::from_verbosity(cli.verbose, cli.quiet));
    if let Err(e) = ldmstest_common_log::init(log) {
        eprintln!("{e}");
    }

    match cli.execute() {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            debug!(error = ?e, "command failed");
            eprintln!("error: {e:#}");
            exit_for(&e).into()
        }
    }
}

/// Exit code for the first classified error in the chain.
fn exit_for(err: &anyhow::Error) -> Exit {
    for cause in err.chain() {
        let kind = if let Some(e) = cause.downcast_ref::<ldmstest_spec::SpecError>() {
            e.kind()
        } else if let Some(e) = cause.downcast_ref::<ldmstest_ls::LsError>() {
            e.kind()
        } else if let Some(e) = cause.downcast_ref::<ldmstest_ldmsd::DaemonError>() {
            e.kind()
        } else if let Some(e) = cause.downcast_ref::<ldmstest_common_core::Error>() {
            e.kind()
        } else if cause.is::<ldmstest_common_config::ConfigError>() {
            ErrorKind::Config
        } else if cause.is::<std::io::Error>() {
            ErrorKind::Io
        } else {
            continue;
        };
        return kind.into();
    }
    Exit::GeneralError
}
