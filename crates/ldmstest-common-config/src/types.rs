//! Configuration types.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::env::{vars, Environment};

/// Default port of the test automation (TADA) server.
pub const DEFAULT_TADA_PORT: u16 = 9862;

/// Errors from parsing address and mount arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgError {
    #[error("bad address format: {0}")]
    BadAddress(String),

    #[error("bad mount format: {0} (expected SRC:DST[:MODE])")]
    BadMount(String),

    #[error("bad mount mode `{0}` (expected ro or rw)")]
    BadMountMode(String),
}

/// Root configuration of a cluster test run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Virtual cluster name; derived from user, test and commit when unset.
    pub clustername: Option<String>,
    /// User running the test.
    pub user: String,
    /// OVIS installation on the host, mounted at `/opt/ovis` in containers.
    pub prefix: PathBuf,
    /// OVIS source tree (for gdb); not mounted when unset.
    pub src: Option<PathBuf>,
    /// Host directory for test databases.
    pub data_root: Option<PathBuf>,
    /// Test automation server.
    pub tada_addr: TadaAddr,
    /// Debug mode flag.
    pub debug: bool,
    /// Additional mount points for every container.
    pub mounts: Vec<MountSpec>,
    /// Container image used when the cluster spec does not name one.
    pub image: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            clustername: None,
            user: Environment::get_or(vars::USER, "root"),
            prefix: PathBuf::from(crate::ovis::DEFAULT_PREFIX),
            src: None,
            data_root: None,
            tada_addr: TadaAddr::default(),
            debug: false,
            mounts: Vec::new(),
            image: "ovis-centos-build".to_string(),
        }
    }
}

impl HarnessConfig {
    /// Cluster name: the configured one, or `{user}-{test}-{commit:.7}`.
    pub fn cluster_name(&self, test_name: &str, commit_id: &str) -> String {
        if let Some(name) = &self.clustername {
            return name.clone();
        }
        let test = test_name
            .strip_suffix(".py")
            .or_else(|| test_name.strip_suffix(".rs"))
            .unwrap_or(test_name);
        let commit: String = commit_id.chars().take(7).collect();
        format!("{}-{}-{}", self.user, test, commit)
    }

    /// Data root: the configured one, or `/home/{user}/db/{clustername}`.
    pub fn data_root_or_default(&self, clustername: &str) -> PathBuf {
        match &self.data_root {
            Some(root) => root.clone(),
            None => Path::new("/home")
                .join(&self.user)
                .join("db")
                .join(clustername),
        }
    }
}

/// `host:port` address of the test automation server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TadaAddr {
    pub host: String,
    pub port: u16,
}

impl Default for TadaAddr {
    fn default() -> Self {
        Self {
            host: "tada-host".to_string(),
            port: DEFAULT_TADA_PORT,
        }
    }
}

impl FromStr for TadaAddr {
    type Err = ArgError;

    /// Accepts `host` or `host:port`; the port defaults to 9862.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ArgError::BadAddress(s.to_string());
        let (host, port) = match s.split_once(':') {
            Some((host, port)) => {
                if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(bad());
                }
                (host, port.parse().map_err(|_| bad())?)
            }
            None => (s, DEFAULT_TADA_PORT),
        };
        if host.is_empty() {
            return Err(bad());
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

impl TryFrom<String> for TadaAddr {
    type Error = ArgError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TadaAddr> for String {
    fn from(addr: TadaAddr) -> Self {
        addr.to_string()
    }
}

impl fmt::Display for TadaAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Access mode of a bind mount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MountMode {
    #[default]
    ReadWrite,
    ReadOnly,
}

impl MountMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MountMode::ReadWrite => "rw",
            MountMode::ReadOnly => "ro",
        }
    }
}

/// A `SRC:DST[:MODE]` bind mount from the host into every container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MountSpec {
    /// Path on the host.
    pub src: PathBuf,
    /// Path in the container.
    pub dst: PathBuf,
    pub mode: MountMode,
}

impl FromStr for MountSpec {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (src, dst, mode) = match parts.as_slice() {
            [src, dst] => (*src, *dst, MountMode::ReadWrite),
            [src, dst, "rw"] => (*src, *dst, MountMode::ReadWrite),
            [src, dst, "ro"] => (*src, *dst, MountMode::ReadOnly),
            [_, _, other] => return Err(ArgError::BadMountMode(other.to_string())),
            _ => return Err(ArgError::BadMount(s.to_string())),
        };
        if src.is_empty() || dst.is_empty() {
            return Err(ArgError::BadMount(s.to_string()));
        }
        Ok(Self {
            src: PathBuf::from(src),
            dst: PathBuf::from(dst),
            mode,
        })
    }
}

impl TryFrom<String> for MountSpec {
    type Error = ArgError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MountSpec> for String {
    fn from(mount: MountSpec) -> Self {
        mount.to_string()
    }
}

impl fmt::Display for MountSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.src.display(),
            self.dst.display(),
            self.mode.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("tada-host", "tada-host:9862" ; "default port")]
    #[test_case("10.0.0.1:4000", "10.0.0.1:4000" ; "explicit port")]
    fn test_tada_addr_parse(input: &str, expected: &str) {
        let addr: TadaAddr = input.parse().unwrap();
        assert_eq!(addr.to_string(), expected);
    }

    #[test_case("" ; "empty")]
    #[test_case(":9000" ; "no host")]
    #[test_case("host:" ; "empty port")]
    #[test_case("host:http" ; "named port")]
    #[test_case("host:99999" ; "port out of range")]
    fn test_tada_addr_rejects(input: &str) {
        assert!(input.parse::<TadaAddr>().is_err());
    }

    #[test]
    fn test_mount_spec_parse() {
        let m: MountSpec = "/mnt/abc:/home:ro".parse().unwrap();
        assert_eq!(m.src, PathBuf::from("/mnt/abc"));
        assert_eq!(m.dst, PathBuf::from("/home"));
        assert_eq!(m.mode, MountMode::ReadOnly);

        let m: MountSpec = "/a:/b".parse().unwrap();
        assert_eq!(m.mode, MountMode::ReadWrite);
        assert_eq!(m.to_string(), "/a:/b:rw");
    }

    #[test]
    fn test_mount_spec_rejects() {
        assert_eq!(
            "/a:/b:rx".parse::<MountSpec>(),
            Err(ArgError::BadMountMode("rx".into()))
        );
        assert!("/only-one".parse::<MountSpec>().is_err());
        assert!("/a:/b:ro:extra".parse::<MountSpec>().is_err());
    }

    #[test]
    fn test_cluster_name_derivation() {
        let config = HarnessConfig {
            user: "bob".into(),
            ..Default::default()
        };
        assert_eq!(
            config.cluster_name("agg_test.py", "0123456789abcdef"),
            "bob-agg_test-0123456"
        );
        assert_eq!(config.cluster_name("smoke", "NONE"), "bob-smoke-NONE");

        let named = HarnessConfig {
            clustername: Some("fixed".into()),
            ..config
        };
        assert_eq!(named.cluster_name("smoke", "NONE"), "fixed");
    }

    #[test]
    fn test_data_root_default() {
        let config = HarnessConfig {
            user: "bob".into(),
            ..Default::default()
        };
        assert_eq!(
            config.data_root_or_default("c1"),
            PathBuf::from("/home/bob/db/c1")
        );
    }
}
