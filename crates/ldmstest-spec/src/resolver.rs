//! The two resolution passes: `!extends` expansion, then `%NAME%` substitution.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::error::{index_path, key_path, SpecError, SpecResult, ROOT_PATH};
use crate::node::{Mapping, Scalar, SpecNode};
use crate::registry::TemplateRegistry;
use crate::scope::Scope;
use crate::{EXTENDS_KEY, MAX_DEPTH, TEMPLATES_KEY};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%([^%]+)%").expect("valid placeholder regex"));

/// Resolve `root` against its own `templates`.
pub fn resolve(root: &SpecNode) -> SpecResult<SpecNode> {
    SpecResolver::new(root)?.resolve(root)
}

/// Turns a raw spec tree into a concrete one.
///
/// Both passes are pure: they borrow the input and build a new tree, so a
/// failure leaves nothing half-resolved behind.
#[derive(Debug, Clone, Default)]
pub struct SpecResolver {
    registry: TemplateRegistry,
}

impl SpecResolver {
    /// A resolver over the templates declared in `root`.
    pub fn new(root: &SpecNode) -> SpecResult<Self> {
        Ok(Self::with_registry(TemplateRegistry::from_root(root)?))
    }

    pub fn with_registry(registry: TemplateRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Expand, then substitute.
    pub fn resolve(&self, root: &SpecNode) -> SpecResult<SpecNode> {
        debug!(templates = self.registry.len(), "resolving spec");
        let expanded = self.expand(root)?;
        self.substitute(&expanded)
    }

    /// Flatten every `!extends` chain. The root `templates` entry is kept as is.
    pub fn expand(&self, root: &SpecNode) -> SpecResult<SpecNode> {
        self.expand_node(root, ROOT_PATH, 0)
    }

    /// Replace `%NAME%` placeholders using the nearest enclosing binding.
    pub fn substitute(&self, root: &SpecNode) -> SpecResult<SpecNode> {
        self.substitute_node(root, &Scope::root(), None, ROOT_PATH, 0)
    }

    fn expand_node(&self, node: &SpecNode, path: &str, depth: usize) -> SpecResult<SpecNode> {
        check_depth(path, depth)?;
        match node {
            SpecNode::Scalar(_) => Ok(node.clone()),
            SpecNode::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.expand_node(item, &index_path(path, i), depth + 1))
                .collect::<SpecResult<Vec<_>>>()
                .map(SpecNode::Sequence),
            SpecNode::Mapping(map) => {
                let merged = self.merge_chain(map, path)?;
                let mut out = Mapping::with_capacity(merged.len());
                for (key, value) in merged {
                    if depth == 0 && key == TEMPLATES_KEY {
                        out.insert(key, value);
                        continue;
                    }
                    let child = self.expand_node(&value, &key_path(path, &key), depth + 1)?;
                    out.insert(key, child);
                }
                Ok(SpecNode::Mapping(out))
            }
        }
    }

    /// Layer `map` over its template chain, base first.
    fn merge_chain(&self, map: &Mapping, path: &str) -> SpecResult<Mapping> {
        let mut layers = match map.get(EXTENDS_KEY) {
            None => Vec::new(),
            Some(SpecNode::Scalar(Scalar::Str(name))) if name.is_empty() => Vec::new(),
            Some(SpecNode::Scalar(Scalar::Str(name))) => self.registry.chain(name, path)?,
            Some(_) => {
                return Err(SpecError::InvalidExtends {
                    path: key_path(path, EXTENDS_KEY),
                })
            }
        };
        layers.reverse();
        layers.push(map);

        let mut merged = Mapping::with_capacity(map.len());
        for layer in layers {
            for (key, value) in layer {
                if key == EXTENDS_KEY {
                    continue;
                }
                let value = match merged.get(key) {
                    Some(inherited) => override_value(key, value, inherited),
                    None => value.clone(),
                };
                merged.insert(key.clone(), value);
            }
        }
        Ok(merged)
    }

    fn substitute_node(
        &self,
        node: &SpecNode,
        scope: &Scope<'_>,
        own_key: Option<&str>,
        path: &str,
        depth: usize,
    ) -> SpecResult<SpecNode> {
        check_depth(path, depth)?;
        match node {
            SpecNode::Mapping(map) => {
                let frame = scope.child(map);
                let mut out = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    let child = if depth == 0 && key == TEMPLATES_KEY {
                        value.clone()
                    } else {
                        let child_path = key_path(path, key);
                        self.substitute_node(value, &frame, Some(key.as_str()), &child_path, depth + 1)?
                    };
                    out.insert(key.clone(), child);
                }
                Ok(SpecNode::Mapping(out))
            }
            SpecNode::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    self.substitute_node(item, scope, None, &index_path(path, i), depth + 1)
                })
                .collect::<SpecResult<Vec<_>>>()
                .map(SpecNode::Sequence),
            SpecNode::Scalar(Scalar::Str(text)) => {
                substitute_str(text, scope, own_key, path).map(SpecNode::from)
            }
            SpecNode::Scalar(_) => Ok(node.clone()),
        }
    }
}

fn check_depth(path: &str, depth: usize) -> SpecResult<()> {
    if depth > MAX_DEPTH {
        return Err(SpecError::DepthExceeded {
            path: path.to_string(),
            max: MAX_DEPTH,
        });
    }
    Ok(())
}

/// `%KEY%` in an overriding value of `KEY` stands for the inherited value.
fn override_value(key: &str, value: &SpecNode, inherited: &SpecNode) -> SpecNode {
    let (SpecNode::Scalar(Scalar::Str(text)), SpecNode::Scalar(old)) = (value, inherited) else {
        return value.clone();
    };
    let replaced = PLACEHOLDER_RE.replace_all(text, |caps: &Captures<'_>| {
        if &caps[1] == key {
            old.to_string()
        } else {
            caps[0].to_string()
        }
    });
    SpecNode::Scalar(Scalar::Str(replaced.into_owned()))
}

fn substitute_str(
    text: &str,
    scope: &Scope<'_>,
    own_key: Option<&str>,
    path: &str,
) -> SpecResult<String> {
    if !text.contains('%') {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(text) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let name = name.as_str();
        // A value never refers to itself.
        let value = if own_key == Some(name) {
            scope.parent().and_then(|outer| outer.lookup(name))
        } else {
            scope.lookup(name)
        };
        let value = value.ok_or_else(|| SpecError::UndefinedVariable {
            name: name.to_string(),
            path: path.to_string(),
        })?;
        trace!(%path, variable = name, %value, "substituted placeholder");

        out.push_str(&text[last..whole.start()]);
        out.push_str(&value.to_string());
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> SpecNode {
        SpecNode::try_from(value).unwrap()
    }

    fn resolved(value: serde_json::Value) -> serde_json::Value {
        resolve(&tree(value)).unwrap().to_value()
    }

    #[test]
    fn test_local_keys_override_template() {
        let out = resolved(json!({
            "templates": {"base": {"a": 1, "b": 2}},
            "obj": {"!extends": "base", "b": 3}
        }));
        assert_eq!(out["obj"], json!({"a": 1, "b": 3}));
    }

    #[test]
    fn test_chain_merges_base_first() {
        let out = resolved(json!({
            "templates": {
                "t1": {"a": "t1", "b": "t1", "c": "t1"},
                "t2": {"!extends": "t1", "b": "t2", "c": "t2"}
            },
            "obj": {"!extends": "t2", "c": "local"}
        }));
        assert_eq!(out["obj"], json!({"a": "t1", "b": "t2", "c": "local"}));
    }

    #[test]
    fn test_empty_extends_is_ignored() {
        let out = resolved(json!({"obj": {"!extends": "", "a": 1}}));
        assert_eq!(out["obj"], json!({"a": 1}));
    }

    #[test]
    fn test_non_string_extends_rejected() {
        let err = resolve(&tree(json!({"obj": {"!extends": ["a"]}}))).unwrap_err();
        assert_eq!(
            err,
            SpecError::InvalidExtends {
                path: "$.obj.!extends".into()
            }
        );
    }

    #[test]
    fn test_templates_pass_through_untouched() {
        let input = json!({
            "templates": {"base": {"!extends": "", "p": "%missing%"}},
            "x": 1
        });
        let out = resolved(input.clone());
        assert_eq!(out["templates"], input["templates"]);
    }

    #[test]
    fn test_nested_extends_inside_template_body() {
        let out = resolved(json!({
            "templates": {
                "leaf": {"kind": "leaf"},
                "outer": {"child": {"!extends": "leaf", "n": 1}}
            },
            "obj": {"!extends": "outer"}
        }));
        assert_eq!(out["obj"], json!({"child": {"kind": "leaf", "n": 1}}));
    }

    #[test]
    fn test_scope_nesting_and_sibling_isolation() {
        let root = tree(json!({
            "A": "x",
            "child": {"B": "y", "s": "%A%-%B%"},
            "sibling": {"s": "%B%"}
        }));
        let resolver = SpecResolver::new(&root).unwrap();
        let err = resolver.substitute(&root).unwrap_err();
        assert_eq!(
            err,
            SpecError::UndefinedVariable {
                name: "B".into(),
                path: "$.sibling.s".into()
            }
        );

        let root = tree(json!({"A": "x", "child": {"B": "y", "s": "%A%-%B%"}}));
        let out = resolver.substitute(&root).unwrap().to_value();
        assert_eq!(out["child"]["s"], "x-y");
    }

    #[test]
    fn test_sequence_elements_see_enclosing_scope() {
        let out = resolved(json!({"v": 7, "list": ["%v%", {"w": "%v%"}]}));
        assert_eq!(out["list"], json!(["7", {"w": "7"}]));
    }

    #[test]
    fn test_substitution_is_single_pass() {
        let out = resolved(json!({"a": "%b%", "b": "1", "s": "%a%"}));
        assert_eq!(out["s"], "%b%");
        assert_eq!(out["a"], "1");
    }

    #[test]
    fn test_stringifies_non_string_scalars() {
        let out = resolved(json!({"i": 42, "f": 2.0, "b": true, "s": "%i% %f% %b%"}));
        assert_eq!(out["s"], "42 2.0 true");
        assert_eq!(out["i"], 42);
    }

    #[test]
    fn test_self_reference_uses_inherited_value() {
        let out = resolved(json!({
            "templates": {"base": {"path": "/bin"}},
            "obj": {"!extends": "base", "path": "%path%/ls"}
        }));
        assert_eq!(out["obj"]["path"], "/bin/ls");
    }

    #[test]
    fn test_self_reference_uses_enclosing_scope() {
        let out = resolved(json!({"port": 1, "child": {"port": "%port%"}}));
        assert_eq!(out["child"]["port"], "1");

        let err = resolve(&tree(json!({"port": "%port%"}))).unwrap_err();
        assert!(matches!(err, SpecError::UndefinedVariable { .. }));
    }

    #[test]
    fn test_deep_nesting_exceeds_depth() {
        let mut value = json!("leaf");
        for _ in 0..=MAX_DEPTH {
            value = json!({ "k": value });
        }
        let err = resolve(&tree(value)).unwrap_err();
        assert!(matches!(err, SpecError::DepthExceeded { max: MAX_DEPTH, .. }));
    }

    #[test]
    fn test_nesting_at_limit_is_fine() {
        let mut value = json!("leaf");
        for _ in 0..MAX_DEPTH {
            value = json!({ "k": value });
        }
        assert!(resolve(&tree(value)).is_ok());
    }

    #[test]
    fn test_recursive_template_body_exceeds_depth() {
        let err = resolve(&tree(json!({
            "templates": {"loop": {"sub": {"!extends": "loop"}}},
            "obj": {"!extends": "loop"}
        })))
        .unwrap_err();
        assert!(matches!(err, SpecError::DepthExceeded { .. }));
    }
}
