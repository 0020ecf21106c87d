//! Configuration file loading and parsing.

use crate::env::{vars, Environment};
use crate::types::{HarnessConfig, TadaAddr};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

static ENV_VAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("valid env var pattern"));

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the project configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.base_path.join(".ldmstest/config.yaml")
    }

    /// Load configuration from `.ldmstest/config.yaml`, then apply
    /// `LDMSTEST_*` environment overrides.
    pub fn load(&self) -> Result<HarnessConfig, ConfigError> {
        let config_path = self.config_path();

        let mut config = if config_path.exists() {
            self.load_file(&config_path)?
        } else {
            HarnessConfig::default()
        };

        self.apply_env_overrides(&mut config)?;
        self.validate(&config)?;
        Ok(config)
    }

    /// Load an explicit configuration file; a missing file is an error.
    pub fn load_file(&self, path: &Path) -> Result<HarnessConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let expanded = self.expand_env_vars(&contents)?;

        serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut missing = None;
        let expanded = ENV_VAR_RE.replace_all(content, |cap: &regex::Captures| {
            let var_name = &cap[1];
            match (Environment::get(var_name), cap.get(2)) {
                (Some(v), _) => v,
                (None, Some(default)) => default.as_str().to_string(),
                (None, None) => {
                    missing.get_or_insert_with(|| var_name.to_string());
                    String::new()
                }
            }
        });

        match missing {
            Some(var) => Err(ConfigError::EnvVarNotFound { var }),
            None => Ok(expanded.into_owned()),
        }
    }

    fn apply_env_overrides(&self, config: &mut HarnessConfig) -> Result<(), ConfigError> {
        if let Some(name) = Environment::get(vars::LDMSTEST_CLUSTERNAME) {
            config.clustername = Some(name);
        }
        if let Some(user) = Environment::get(vars::LDMSTEST_USER) {
            config.user = user;
        }
        if let Some(image) = Environment::get(vars::LDMSTEST_IMAGE) {
            config.image = image;
        }
        if let Some(prefix) = Environment::get(vars::LDMSTEST_PREFIX) {
            config.prefix = PathBuf::from(prefix);
        }
        if let Some(addr) = Environment::get(vars::LDMSTEST_TADA_ADDR) {
            config.tada_addr = addr
                .parse::<TadaAddr>()
                .map_err(|e| ConfigError::ValidationError {
                    message: e.to_string(),
                })?;
        }
        if let Some(debug) = Environment::get_bool(vars::LDMSTEST_DEBUG) {
            config.debug = debug;
        }
        Ok(())
    }

    /// Validate configuration values.
    fn validate(&self, config: &HarnessConfig) -> Result<(), ConfigError> {
        if config.user.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "user must not be empty".to_string(),
            });
        }

        if !config.prefix.is_absolute() {
            return Err(ConfigError::ValidationError {
                message: format!("prefix must be an absolute path: {}", config.prefix.display()),
            });
        }

        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, config: &HarnessConfig) -> Result<(), ConfigError> {
        let config_dir = self.base_path.join(".ldmstest");
        std::fs::create_dir_all(&config_dir)?;

        let yaml = serde_yaml::to_string(config).map_err(|e| ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        })?;

        std::fs::write(self.config_path(), yaml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_defaults_when_no_file() {
        let dir = tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path());
        let config = loader.load().unwrap();
        assert_eq!(config.image, "ovis-centos-build");
    }

    #[test]
    fn test_load_config_from_yaml_file() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".ldmstest")).unwrap();

        let config_content = r#"
clustername: agg-cluster
user: alice
prefix: /opt/ovis-4.4
tada_addr: tada.example.com
mounts:
  - /data:/data
image: ovis-rocky
"#;
        fs::write(dir.path().join(".ldmstest/config.yaml"), config_content).unwrap();

        let loader = ConfigLoader::new(dir.path());
        let config = loader.load_file(&loader.config_path()).unwrap();

        assert_eq!(config.clustername.as_deref(), Some("agg-cluster"));
        assert_eq!(config.user, "alice");
        assert_eq!(config.prefix, PathBuf::from("/opt/ovis-4.4"));
        assert_eq!(config.tada_addr.to_string(), "tada.example.com:9862");
        assert_eq!(config.mounts[0].to_string(), "/data:/data:rw");
        assert_eq!(config.image, "ovis-rocky");
        assert!(!config.debug);
    }

    #[test]
    fn test_env_var_expansion() {
        std::env::set_var("LDMSTEST_TEST_VAR", "test_value");
        let loader = ConfigLoader::new(".");
        let result = loader.expand_env_vars("key: ${LDMSTEST_TEST_VAR}").unwrap();
        assert_eq!(result, "key: test_value");
        std::env::remove_var("LDMSTEST_TEST_VAR");
    }

    #[test]
    fn test_env_var_default() {
        let loader = ConfigLoader::new(".");
        let result = loader
            .expand_env_vars("key: ${LDMSTEST_NONEXISTENT:-default}")
            .unwrap();
        assert_eq!(result, "key: default");
    }

    #[test]
    fn test_env_var_missing_error() {
        let loader = ConfigLoader::new(".");
        match loader.expand_env_vars("key: ${LDMSTEST_MISSING_VAR}") {
            Err(ConfigError::EnvVarNotFound { var }) => assert_eq!(var, "LDMSTEST_MISSING_VAR"),
            other => panic!("Expected EnvVarNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_errors() {
        let loader = ConfigLoader::new(".");

        let mut config = HarnessConfig::default();
        config.prefix = PathBuf::from("relative/ovis");
        match loader.validate(&config) {
            Err(ConfigError::ValidationError { message }) => assert!(message.contains("prefix")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }

        let mut config = HarnessConfig::default();
        config.user = "  ".into();
        assert!(loader.validate(&config).is_err());
    }

    #[test]
    fn test_parse_error_with_line_number() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".ldmstest")).unwrap();
        fs::write(
            dir.path().join(".ldmstest/config.yaml"),
            "user: alice\nmounts: [unclosed\n",
        )
        .unwrap();

        let loader = ConfigLoader::new(dir.path());
        match loader.load_file(&loader.config_path()) {
            Err(ConfigError::ParseError { line, .. }) => assert!(line.is_some()),
            other => panic!("Expected ParseError with line number, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_mount_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("harness.yaml");
        fs::write(&path, "mounts:\n  - nocolon\n").unwrap();

        let loader = ConfigLoader::new(dir.path());
        assert!(matches!(
            loader.load_file(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path());
        assert!(matches!(
            loader.load_file(&dir.path().join("nope.yaml")),
            Err(ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_save_config() {
        let dir = tempdir().unwrap();
        let loader = ConfigLoader::new(dir.path());

        let mut config = HarnessConfig::default();
        config.user = "carol".to_string();
        config.mounts.push("/x:/y:ro".parse().unwrap());

        loader.save(&config).unwrap();
        assert!(loader.config_path().exists());

        let loaded = loader.load_file(&loader.config_path()).unwrap();
        assert_eq!(loaded.user, "carol");
        assert_eq!(loaded.mounts, config.mounts);
    }
}
