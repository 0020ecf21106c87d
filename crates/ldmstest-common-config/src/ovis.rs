//! Lookups against an OVIS installation prefix on the host.

use std::path::{Path, PathBuf};

use crate::env::{vars, Environment};

/// Prefix assumed when no `ldmsd` is found on `PATH`.
pub const DEFAULT_PREFIX: &str = "/opt/ovis";

/// Commit id reported when the installation carries no pedigree.
pub const UNKNOWN_COMMIT: &str = "NONE";

/// Commit id of the installation under `prefix`, read from `bin/ldms-pedigree`.
pub fn ovis_commit_id(prefix: &Path) -> String {
    std::fs::read_to_string(prefix.join("bin/ldms-pedigree"))
        .ok()
        .and_then(|text| parse_pedigree(&text))
        .unwrap_or_else(|| UNKNOWN_COMMIT.to_string())
}

fn parse_pedigree(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.strip_prefix("echo commit-id: "))
        .and_then(|rest| rest.split_whitespace().next())
        .map(str::to_string)
}

/// Guess the prefix from the `ldmsd` found on `PATH` (`PREFIX/sbin/ldmsd`).
pub fn guess_ovis_prefix() -> PathBuf {
    Environment::get(vars::PATH)
        .and_then(|path| {
            std::env::split_paths(&path)
                .map(|dir| dir.join("ldmsd"))
                .find(|candidate| candidate.is_file())
        })
        .and_then(|ldmsd| ldmsd.parent()?.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PREFIX))
}
