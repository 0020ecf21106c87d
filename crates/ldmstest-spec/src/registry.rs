//! Named template fragments.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{key_path, SpecError, SpecResult, ROOT_PATH};
use crate::node::{Mapping, Scalar, SpecNode};
use crate::{EXTENDS_KEY, MAX_DEPTH, TEMPLATES_KEY};

/// Templates available to `!extends`, keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateRegistry {
    templates: IndexMap<String, Mapping>,
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the root's `templates` mapping.
    ///
    /// A root without `templates` (or a non-mapping root) yields an empty
    /// registry. Every template must itself be a mapping.
    pub fn from_root(root: &SpecNode) -> SpecResult<Self> {
        let Some(node) = root.get(TEMPLATES_KEY) else {
            return Ok(Self::default());
        };
        let entries = node.as_mapping().ok_or_else(|| SpecError::UnsupportedNode {
            path: key_path(ROOT_PATH, TEMPLATES_KEY),
            found: node.kind_name(),
        })?;

        let mut registry = Self::default();
        for (name, template) in entries {
            registry.insert(name.clone(), template)?;
        }
        Ok(registry)
    }

    /// Register one template, replacing any previous one of that name.
    pub fn insert(&mut self, name: impl Into<String>, template: &SpecNode) -> SpecResult<()> {
        let name = name.into();
        match template {
            SpecNode::Mapping(map) => {
                self.templates.insert(name, map.clone());
                Ok(())
            }
            _ => Err(SpecError::InvalidTemplate { name }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Mapping> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Template names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Follow `!extends` from `name`, nearest template first.
    ///
    /// `path` is where the chain was referenced, used in errors. The walk
    /// stops at a template without `!extends` (or with an empty one).
    pub fn chain(&self, name: &str, path: &str) -> SpecResult<Vec<&Mapping>> {
        let mut visited: Vec<&str> = Vec::new();
        let mut chain = Vec::new();
        let mut current = name;

        loop {
            if visited.contains(&current) {
                let mut names: Vec<String> = visited.iter().map(|s| s.to_string()).collect();
                names.push(current.to_string());
                return Err(SpecError::TemplateCycle { chain: names });
            }
            if chain.len() >= MAX_DEPTH {
                return Err(SpecError::DepthExceeded {
                    path: path.to_string(),
                    max: MAX_DEPTH,
                });
            }

            let template = self
                .templates
                .get(current)
                .ok_or_else(|| SpecError::UnknownTemplate {
                    name: current.to_string(),
                    path: path.to_string(),
                })?;
            visited.push(current);
            chain.push(template);

            match template.get(EXTENDS_KEY) {
                None => break,
                Some(SpecNode::Scalar(Scalar::Str(next))) if next.is_empty() => break,
                Some(SpecNode::Scalar(Scalar::Str(next))) => current = next,
                Some(_) => {
                    let at = key_path(&key_path(ROOT_PATH, TEMPLATES_KEY), current);
                    return Err(SpecError::InvalidExtends {
                        path: key_path(&at, EXTENDS_KEY),
                    });
                }
            }
        }

        debug!(template = name, chain = ?visited, "resolved template chain");
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(json: &str) -> TemplateRegistry {
        let root = SpecNode::from_json_str(json).unwrap();
        TemplateRegistry::from_root(&root).unwrap()
    }

    #[test]
    fn test_missing_templates_is_empty() {
        assert!(registry(r#"{"nodes": []}"#).is_empty());
    }

    #[test]
    fn test_chain_nearest_first() {
        let reg = registry(
            r#"{"templates": {
                "a": {"x": 1},
                "b": {"!extends": "a", "y": 2},
                "c": {"!extends": "b", "z": 3}
            }}"#,
        );
        let chain = reg.chain("c", "$.n").unwrap();
        let firsts: Vec<&str> = chain
            .iter()
            .map(|m| m.keys().last().unwrap().as_str())
            .collect();
        assert_eq!(firsts, ["z", "y", "x"]);
        assert_eq!(reg.names().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn test_unknown_template_names_reference() {
        let reg = registry(r#"{"templates": {"a": {"!extends": "gone"}}}"#);
        assert_eq!(
            reg.chain("a", "$.nodes[0]").unwrap_err(),
            SpecError::UnknownTemplate {
                name: "gone".into(),
                path: "$.nodes[0]".into(),
            }
        );
    }

    #[test]
    fn test_cycle_fails_fast() {
        let reg = registry(
            r#"{"templates": {"a": {"!extends": "b"}, "b": {"!extends": "a"}}}"#,
        );
        let err = reg.chain("a", "$.x").unwrap_err();
        assert_eq!(
            err,
            SpecError::TemplateCycle {
                chain: vec!["a".into(), "b".into(), "a".into()],
            }
        );
        assert_eq!(err.to_string(), "template cycle: a -> b -> a");
    }

    #[test]
    fn test_self_extension_is_cycle() {
        let reg = registry(r#"{"templates": {"a": {"!extends": "a"}}}"#);
        assert!(matches!(
            reg.chain("a", "$").unwrap_err(),
            SpecError::TemplateCycle { .. }
        ));
    }

    #[test]
    fn test_long_chain_exceeds_depth() {
        let mut templates = serde_json::Map::new();
        for i in 0..=MAX_DEPTH {
            templates.insert(
                format!("t{i}"),
                serde_json::json!({ "!extends": format!("t{}", i + 1) }),
            );
        }
        templates.insert(format!("t{}", MAX_DEPTH + 1), serde_json::json!({}));
        let root = SpecNode::try_from(serde_json::json!({ "templates": templates })).unwrap();
        let reg = TemplateRegistry::from_root(&root).unwrap();

        assert!(matches!(
            reg.chain("t0", "$").unwrap_err(),
            SpecError::DepthExceeded { max: MAX_DEPTH, .. }
        ));
    }

    #[test]
    fn test_non_mapping_template_rejected() {
        let root = SpecNode::from_json_str(r#"{"templates": {"bad": [1, 2]}}"#).unwrap();
        assert_eq!(
            TemplateRegistry::from_root(&root).unwrap_err(),
            SpecError::InvalidTemplate { name: "bad".into() }
        );
    }

    #[test]
    fn test_non_string_extends_in_template() {
        let reg = registry(r#"{"templates": {"a": {"!extends": 3}}}"#);
        assert_eq!(
            reg.chain("a", "$").unwrap_err(),
            SpecError::InvalidExtends {
                path: "$.templates.a.!extends".into(),
            }
        );
    }
}
