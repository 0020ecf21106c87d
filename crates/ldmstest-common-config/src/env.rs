//! Process environment lookups and `.env` files.

use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to load {}: {source}", path.display())]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

/// Variables the harness reads.
pub mod vars {
    pub const USER: &str = "USER";
    pub const PATH: &str = "PATH";

    /// Explicit harness config file, read by the CLI.
    pub const LDMSTEST_CONFIG: &str = "LDMSTEST_CONFIG";

    // Overrides applied on top of `.ldmstest/config.yaml`
    pub const LDMSTEST_CLUSTERNAME: &str = "LDMSTEST_CLUSTERNAME";
    pub const LDMSTEST_USER: &str = "LDMSTEST_USER";
    pub const LDMSTEST_PREFIX: &str = "LDMSTEST_PREFIX";
    pub const LDMSTEST_IMAGE: &str = "LDMSTEST_IMAGE";
    pub const LDMSTEST_TADA_ADDR: &str = "LDMSTEST_TADA_ADDR";
    pub const LDMSTEST_DEBUG: &str = "LDMSTEST_DEBUG";
}

/// Namespace for environment access.
pub struct Environment;

impl Environment {
    /// Load `.env` then `.env.local` from `dir` into the process
    /// environment. Variables already set are kept. Returns the files read.
    pub fn load_dotenv(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, EnvError> {
        let mut loaded = Vec::new();
        for name in [".env", ".env.local"] {
            let path = dir.as_ref().join(name);
            if !path.is_file() {
                continue;
            }
            dotenvy::from_path(&path).map_err(|source| EnvError::Dotenv {
                path: path.clone(),
                source,
            })?;
            loaded.push(path);
        }
        Ok(loaded)
    }

    /// A set, non-empty variable.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }

    pub fn get_or(var: &str, default: &str) -> String {
        Self::get(var).unwrap_or_else(|| default.to_string())
    }

    /// `true`/`1`/`yes`/`on` are true, anything else false.
    pub fn get_bool(var: &str) -> Option<bool> {
        Self::get(var).map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
    }
}
