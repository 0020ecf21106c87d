//! Container cluster plan derived from a spec.

use std::path::Path;

use indexmap::IndexMap;
use ldmstest_common_config::HarnessConfig;
use ldmstest_spec::{Spec, SpecNode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::env::env_dict_opt;
use crate::error::{DaemonError, DaemonResult};

/// Label carrying the JSON spec on the cluster.
pub const SPEC_LABEL: &str = "LDMSDCluster.spec";

/// Where the OVIS prefix is mounted inside containers.
pub const OVIS_MOUNT: &str = "/opt/ovis";

const FALLBACK_PYTHONPATH: &str =
    "/opt/ovis/lib/python3.6/site-packages:/opt/ovis/lib64/python3.6/site-packages";

/// Everything the container platform needs to create the cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterPlan {
    pub name: String,
    pub image: String,
    /// `SRC:DST[:MODE]` bind mounts for every container.
    pub mounts: Vec<String>,
    /// Hostnames, one container each.
    pub nodes: Vec<String>,
    pub env: IndexMap<String, String>,
    pub labels: IndexMap<String, String>,
    pub node_aliases: IndexMap<String, Vec<String>>,
    pub host_binds: IndexMap<String, serde_json::Value>,
    pub cap_add: Vec<String>,
    pub cap_drop: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
}

impl ClusterPlan {
    pub fn from_spec(spec: &Spec, config: &HarnessConfig) -> DaemonResult<Self> {
        let name = spec
            .name()
            .map(str::to_string)
            .or_else(|| config.clustername.clone())
            .ok_or_else(|| DaemonError::missing("spec", "name"))?;

        let prefix = match spec.get("ovis_prefix").and_then(SpecNode::as_str) {
            Some(prefix) => Path::new(prefix).to_path_buf(),
            None => config.prefix.clone(),
        };

        let mut mounts = vec![format!("{}:{OVIS_MOUNT}:ro", prefix.display())];
        mounts.extend(string_list(spec.get("mounts"), "mounts")?);
        mounts.extend(config.mounts.iter().map(ToString::to_string));

        let mut nodes = Vec::new();
        let mut node_aliases = IndexMap::new();
        let mut host_binds = IndexMap::new();
        for (i, node) in spec.nodes().iter().enumerate() {
            let hostname = node
                .get("hostname")
                .and_then(SpecNode::as_str)
                .ok_or_else(|| DaemonError::missing(format!("nodes[{i}]"), "hostname"))?
                .to_string();

            let aliases = string_list(node.get("aliases"), &format!("nodes[{i}].aliases"))?;
            if !aliases.is_empty() {
                node_aliases.insert(hostname.clone(), aliases);
            }
            if let Some(binds) = node.get("binds").filter(|b| b.is_truthy()) {
                host_binds.insert(hostname.clone(), binds.to_value());
            }
            nodes.push(hostname);
        }

        let mut env = ovis_env(&prefix);
        env.extend(env_dict_opt(spec.get("env"))?);

        let spec_json = serde_json::to_string(spec.root())
            .map_err(|e| DaemonError::invalid_spec("$", e.to_string()))?;
        let labels = IndexMap::from([(SPEC_LABEL.to_string(), spec_json)]);

        let plan = Self {
            name,
            image: spec
                .get("image")
                .and_then(SpecNode::as_str)
                .map_or_else(|| config.image.clone(), str::to_string),
            mounts,
            nodes,
            env,
            labels,
            node_aliases,
            host_binds,
            cap_add: string_list(spec.get("cap_add"), "cap_add")?,
            cap_drop: string_list(spec.get("cap_drop"), "cap_drop")?,
            subnet: spec
                .get("subnet")
                .and_then(SpecNode::as_scalar)
                .map(ToString::to_string),
        };
        debug!(cluster = %plan.name, nodes = plan.nodes.len(), "planned cluster");
        Ok(plan)
    }
}

/// Environment pointing every OVIS search path at the mounted prefix.
pub fn ovis_env(prefix: &Path) -> IndexMap<String, String> {
    let path = [
        "/opt/ovis/bin",
        "/opt/ovis/sbin",
        "/usr/local/bin",
        "/usr/local/sbin",
        "/usr/bin",
        "/usr/sbin",
        "/bin",
        "/sbin",
    ]
    .join(":");

    IndexMap::from([
        ("PATH".to_string(), path),
        ("LD_LIBRARY_PATH".to_string(), "/opt/ovis/lib:/opt/ovis/lib64".to_string()),
        (
            "ZAP_LIBPATH".to_string(),
            "/opt/ovis/lib/ovis-ldms:/opt/ovis/lib64/ovis-ldms:/opt/ovis/lib/ovis-lib:/opt/ovis/lib64/ovis-lib"
                .to_string(),
        ),
        (
            "LDMSD_PLUGIN_LIBPATH".to_string(),
            "/opt/ovis/lib/ovis-ldms:/opt/ovis/lib64/ovis-ldms".to_string(),
        ),
        ("PYTHONPATH".to_string(), python_path(prefix)),
    ])
}

/// Host `site-packages` directories under `prefix`, as seen in a container.
pub fn python_path(prefix: &Path) -> String {
    let prefix_text = prefix.display().to_string();
    let pattern = format!("{prefix_text}/lib*/python*/site-packages");
    let found: Vec<String> = match glob::glob(&pattern) {
        Ok(paths) => paths
            .filter_map(Result::ok)
            .map(|p| p.display().to_string().replacen(&prefix_text, OVIS_MOUNT, 1))
            .collect(),
        Err(err) => {
            warn!(%pattern, error = %err, "cannot search for python site-packages");
            Vec::new()
        }
    };

    if found.is_empty() {
        FALLBACK_PYTHONPATH.to_string()
    } else {
        found.join(":")
    }
}

fn string_list(node: Option<&SpecNode>, path: &str) -> DaemonResult<Vec<String>> {
    let Some(node) = node else {
        return Ok(Vec::new());
    };
    node.as_sequence()
        .ok_or_else(|| DaemonError::invalid_spec(path, "expected a list"))?
        .iter()
        .map(|item| {
            item.as_scalar()
                .map(ToString::to_string)
                .ok_or_else(|| DaemonError::invalid_spec(path, "expected a list of strings"))
        })
        .collect()
}
