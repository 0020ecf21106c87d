//! Environment blocks in specs.

use indexmap::IndexMap;
use ldmstest_spec::SpecNode;

use crate::error::{DaemonError, DaemonResult};

/// Normalise an `env` node into `NAME -> VALUE`.
///
/// Accepts either `["NAME=VALUE", ...]` or `{NAME: VALUE}`. Scalar values
/// are stringified; a list entry without `=` binds the empty string.
pub fn env_dict(env: &SpecNode) -> DaemonResult<IndexMap<String, String>> {
    let invalid = || DaemonError::InvalidEnv {
        found: env.kind_name().to_string(),
    };

    match env {
        SpecNode::Mapping(map) => map
            .iter()
            .map(|(name, value)| {
                let value = value.as_scalar().ok_or_else(|| DaemonError::InvalidEnv {
                    found: format!("{} value for `{name}`", value.kind_name()),
                })?;
                Ok((name.clone(), value.to_string()))
            })
            .collect(),
        SpecNode::Sequence(items) => items
            .iter()
            .map(|item| {
                let entry = item.as_str().ok_or_else(|| DaemonError::InvalidEnv {
                    found: format!("{} list entry", item.kind_name()),
                })?;
                let (name, value) = entry.split_once('=').unwrap_or((entry, ""));
                Ok((name.to_string(), value.to_string()))
            })
            .collect(),
        SpecNode::Scalar(_) => Err(invalid()),
    }
}

/// `env_dict` of an optional node; absent means empty.
pub fn env_dict_opt(env: Option<&SpecNode>) -> DaemonResult<IndexMap<String, String>> {
    env.map_or_else(|| Ok(IndexMap::new()), env_dict)
}
