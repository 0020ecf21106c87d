//! A resolved cluster spec with typed accessors.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{SpecError, SpecResult};
use crate::node::{Mapping, SpecNode};
use crate::resolver::resolve;
use crate::TEMPLATES_KEY;

/// A fully expanded and substituted spec tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Spec {
    root: SpecNode,
}

impl Spec {
    /// Resolve a raw tree.
    pub fn resolve(raw: &SpecNode) -> SpecResult<Self> {
        Ok(Self { root: resolve(raw)? })
    }

    pub fn from_json_str(text: &str) -> SpecResult<Self> {
        Self::resolve(&SpecNode::from_json_str(text)?)
    }

    pub fn from_yaml_str(text: &str) -> SpecResult<Self> {
        Self::resolve(&SpecNode::from_yaml_str(text)?)
    }

    /// Load and resolve a spec file. `.yaml`/`.yml` files are read as YAML,
    /// anything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> SpecResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SpecError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::from_yaml_str(&text),
            _ => Self::from_json_str(&text),
        }
    }

    pub fn root(&self) -> &SpecNode {
        &self.root
    }

    pub fn into_inner(self) -> SpecNode {
        self.root
    }

    pub fn get(&self, key: &str) -> Option<&SpecNode> {
        self.root.get(key)
    }

    /// The cluster `name`, if the spec sets one.
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(SpecNode::as_str)
    }

    /// The unresolved template registry as written.
    pub fn templates(&self) -> Option<&Mapping> {
        self.get(TEMPLATES_KEY).and_then(SpecNode::as_mapping)
    }

    /// Entries of the `nodes` sequence.
    pub fn nodes(&self) -> &[SpecNode] {
        self.get("nodes").and_then(SpecNode::as_sequence).unwrap_or(&[])
    }

    /// The node whose `hostname` is `hostname`.
    pub fn node(&self, hostname: &str) -> Option<&SpecNode> {
        self.nodes()
            .iter()
            .find(|node| node.get("hostname").and_then(SpecNode::as_str) == Some(hostname))
    }

    pub fn hostnames(&self) -> Vec<&str> {
        self.nodes()
            .iter()
            .filter_map(|node| node.get("hostname").and_then(SpecNode::as_str))
            .collect()
    }

    pub fn to_json_pretty(&self) -> SpecResult<String> {
        serde_json::to_string_pretty(&self.root).map_err(|e| SpecError::Parse(e.to_string()))
    }

    pub fn to_yaml(&self) -> SpecResult<String> {
        serde_yaml::to_string(&self.root).map_err(|e| SpecError::Parse(e.to_string()))
    }
}

impl AsRef<SpecNode> for Spec {
    fn as_ref(&self) -> &SpecNode {
        &self.root
    }
}
