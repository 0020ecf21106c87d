//! The ldmsd entry of a node spec.

use indexmap::IndexMap;
use ldmstest_spec::{Mapping, Spec, SpecNode};
use serde::Serialize;

use crate::env::{env_dict, env_dict_opt};
use crate::error::{DaemonError, DaemonResult};

pub const DEFAULT_LOG_FILE: &str = "/var/log/ldmsd.log";
pub const DEFAULT_LOG_LEVEL: &str = "INFO";
pub const DEFAULT_LISTEN_AUTH: &str = "none";
pub const DEFAULT_CONFIG_FILE: &str = "/etc/ldmsd.conf";

/// `type` of the daemons entries handled here.
pub const LDMSD_TYPE: &str = "ldmsd";

/// Resolved ldmsd attributes of one node.
///
/// `env` is the cluster environment overlaid by the daemon's own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaemonSpec {
    attrs: Mapping,
    env: IndexMap<String, String>,
}

impl DaemonSpec {
    /// Build from a daemon mapping, filling in the defaults.
    pub fn from_mapping(daemon: &Mapping, cluster_env: Option<&SpecNode>) -> DaemonResult<Self> {
        let mut env = env_dict_opt(cluster_env)?;
        env.extend(env_dict_opt(daemon.get("env"))?);

        let mut attrs = daemon.clone();
        attrs.shift_remove("env");
        for (key, default) in [
            ("log_file", DEFAULT_LOG_FILE),
            ("log_level", DEFAULT_LOG_LEVEL),
            ("listen_auth", DEFAULT_LISTEN_AUTH),
            ("config_file", DEFAULT_CONFIG_FILE),
        ] {
            attrs
                .entry(key.to_string())
                .or_insert_with(|| SpecNode::from(default));
        }
        Ok(Self { attrs, env })
    }

    /// The first `ldmsd` daemon of `node`, if any.
    pub fn from_node(node: &SpecNode, spec: &Spec) -> DaemonResult<Option<Self>> {
        let Some(daemons) = node.get("daemons") else {
            return Ok(None);
        };
        let daemons = daemons
            .as_sequence()
            .ok_or_else(|| DaemonError::invalid_spec("daemons", "expected a list"))?;

        daemons
            .iter()
            .filter_map(SpecNode::as_mapping)
            .find(|d| d.get("type").and_then(SpecNode::as_str) == Some(LDMSD_TYPE))
            .map(|d| Self::from_mapping(d, spec.get("env")))
            .transpose()
    }

    /// The ldmsd of the node named `hostname`.
    pub fn for_host(spec: &Spec, hostname: &str) -> DaemonResult<Option<Self>> {
        match spec.node(hostname) {
            Some(node) => Self::from_node(node, spec),
            None => Ok(None),
        }
    }

    /// Overlay `overrides` on the attributes; an `env` entry is merged.
    pub fn with_overrides(mut self, overrides: &Mapping) -> DaemonResult<Self> {
        for (key, value) in overrides {
            if key == "env" {
                self.env.extend(env_dict(value)?);
            } else {
                self.attrs.insert(key.clone(), value.clone());
            }
        }
        Ok(self)
    }

    pub fn attrs(&self) -> &Mapping {
        &self.attrs
    }

    pub fn get(&self, key: &str) -> Option<&SpecNode> {
        self.attrs.get(key)
    }

    /// A scalar attribute as text.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key)?.as_scalar().map(ToString::to_string)
    }

    pub fn env(&self) -> &IndexMap<String, String> {
        &self.env
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(SpecNode::as_str)
    }

    pub fn config_file(&self) -> String {
        self.text("config_file").unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string())
    }

    pub fn log_file(&self) -> String {
        self.text("log_file").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
    }

    pub fn log_level(&self) -> String {
        self.text("log_level").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
    }

    /// Entries of a list attribute such as `samplers`; absent means empty.
    pub(crate) fn section(&self, key: &str) -> DaemonResult<&[SpecNode]> {
        match self.get(key) {
            None => Ok(&[]),
            Some(node) => node
                .as_sequence()
                .ok_or_else(|| DaemonError::invalid_spec(key, "expected a list")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(value: serde_json::Value) -> Spec {
        Spec::resolve(&SpecNode::try_from(value).unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_and_env_overlay() {
        let spec = spec(json!({
            "env": {"A": "cluster", "B": "cluster"},
            "nodes": [{
                "hostname": "n1",
                "daemons": [
                    {"name": "sshd", "type": "sshd"},
                    {"name": "sampler", "type": "ldmsd", "env": ["B=daemon"], "log_level": "DEBUG"}
                ]
            }]
        }));
        let daemon = DaemonSpec::for_host(&spec, "n1").unwrap().unwrap();

        assert_eq!(daemon.name(), Some("sampler"));
        assert_eq!(daemon.log_level(), "DEBUG");
        assert_eq!(daemon.log_file(), DEFAULT_LOG_FILE);
        assert_eq!(daemon.config_file(), DEFAULT_CONFIG_FILE);
        assert_eq!(daemon.text("listen_auth").as_deref(), Some("none"));
        assert_eq!(daemon.env()["A"], "cluster");
        assert_eq!(daemon.env()["B"], "daemon");
        assert!(daemon.get("env").is_none());
    }

    #[test]
    fn test_node_without_ldmsd() {
        let spec = spec(json!({"nodes": [
            {"hostname": "n1", "daemons": [{"type": "sshd"}]},
            {"hostname": "n2"}
        ]}));
        assert!(DaemonSpec::for_host(&spec, "n1").unwrap().is_none());
        assert!(DaemonSpec::for_host(&spec, "n2").unwrap().is_none());
        assert!(DaemonSpec::for_host(&spec, "n3").unwrap().is_none());
    }

    #[test]
    fn test_overrides() {
        let spec = spec(json!({"nodes": [
            {"hostname": "n1", "daemons": [{"type": "ldmsd", "listen_port": 10000}]}
        ]}));
        let overrides = SpecNode::try_from(json!({"listen_port": 411, "env": {"X": "1"}})).unwrap();
        let daemon = DaemonSpec::for_host(&spec, "n1")
            .unwrap()
            .unwrap()
            .with_overrides(overrides.as_mapping().unwrap())
            .unwrap();
        assert_eq!(daemon.text("listen_port").as_deref(), Some("411"));
        assert_eq!(daemon.env()["X"], "1");
    }

    #[test]
    fn test_daemons_must_be_list() {
        let spec = spec(json!({"nodes": [{"hostname": "n1", "daemons": {"type": "ldmsd"}}]}));
        assert!(matches!(
            DaemonSpec::for_host(&spec, "n1"),
            Err(DaemonError::InvalidSpec { .. })
        ));
    }
}
