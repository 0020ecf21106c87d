//! Spec tree nodes.

use std::fmt;
use std::ops::Index;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{index_path, key_path, SpecError, SpecResult, ROOT_PATH};

/// Key-ordered mapping node body.
pub type Mapping = IndexMap<String, SpecNode>;

/// A node of a spec tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SpecNode {
    Mapping(Mapping),
    Sequence(Vec<SpecNode>),
    Scalar(Scalar),
}

/// A primitive leaf value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Scalar {
    /// The text a `%NAME%` placeholder is replaced with.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{x:.1}")
            }
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

impl SpecNode {
    /// Parse a JSON document into a spec tree.
    pub fn from_json_str(text: &str) -> SpecResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| SpecError::Parse(e.to_string()))?;
        Self::from_value(value, ROOT_PATH)
    }

    /// Parse a YAML document into a spec tree.
    pub fn from_yaml_str(text: &str) -> SpecResult<Self> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| SpecError::Parse(e.to_string()))?;
        Self::from_value(value, ROOT_PATH)
    }

    fn from_value(value: Value, path: &str) -> SpecResult<Self> {
        let node = match value {
            Value::Null => {
                return Err(SpecError::UnsupportedNode {
                    path: path.to_string(),
                    found: "null",
                })
            }
            Value::Bool(b) => SpecNode::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match (n.as_i64(), n.is_u64()) {
                (Some(i), _) => SpecNode::Scalar(Scalar::Int(i)),
                (None, true) => {
                    return Err(SpecError::UnsupportedNode {
                        path: path.to_string(),
                        found: "integer out of i64 range",
                    })
                }
                (None, false) => SpecNode::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(s) => SpecNode::Scalar(Scalar::Str(s)),
            Value::Array(items) => SpecNode::Sequence(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| Self::from_value(v, &index_path(path, i)))
                    .collect::<SpecResult<_>>()?,
            ),
            Value::Object(map) => SpecNode::Mapping(
                map.into_iter()
                    .map(|(k, v)| {
                        let child = Self::from_value(v, &key_path(path, &k))?;
                        Ok((k, child))
                    })
                    .collect::<SpecResult<_>>()?,
            ),
        };
        Ok(node)
    }

    /// Render as a JSON value.
    pub fn to_value(&self) -> Value {
        // Serializing a tree of strings, numbers and maps cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Short name of the node kind, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            SpecNode::Mapping(_) => "mapping",
            SpecNode::Sequence(_) => "sequence",
            SpecNode::Scalar(Scalar::Bool(_)) => "boolean",
            SpecNode::Scalar(Scalar::Int(_)) => "integer",
            SpecNode::Scalar(Scalar::Float(_)) => "float",
            SpecNode::Scalar(Scalar::Str(_)) => "string",
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            SpecNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[SpecNode]> {
        match self {
            SpecNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            SpecNode::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SpecNode::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SpecNode::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SpecNode::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Child of a mapping node.
    pub fn get(&self, key: &str) -> Option<&SpecNode> {
        self.as_mapping()?.get(key)
    }

    /// Python-style truthiness: false, 0, 0.0, "", [] and {} are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            SpecNode::Mapping(map) => !map.is_empty(),
            SpecNode::Sequence(items) => !items.is_empty(),
            SpecNode::Scalar(Scalar::Bool(b)) => *b,
            SpecNode::Scalar(Scalar::Int(i)) => *i != 0,
            SpecNode::Scalar(Scalar::Float(x)) => *x != 0.0,
            SpecNode::Scalar(Scalar::Str(s)) => !s.is_empty(),
        }
    }
}

impl TryFrom<Value> for SpecNode {
    type Error = SpecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value, ROOT_PATH)
    }
}

impl<'de> Deserialize<'de> for SpecNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        SpecNode::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl Index<&str> for SpecNode {
    type Output = SpecNode;

    /// Panics when `self` is not a mapping or has no such key.
    fn index(&self, key: &str) -> &SpecNode {
        match self.get(key) {
            Some(node) => node,
            None => panic!("no key `{key}` in {} node", self.kind_name()),
        }
    }
}

impl Index<usize> for SpecNode {
    type Output = SpecNode;

    /// Panics when `self` is not a sequence or is too short.
    fn index(&self, index: usize) -> &SpecNode {
        match self.as_sequence().and_then(|items| items.get(index)) {
            Some(node) => node,
            None => panic!("no index {index} in {} node", self.kind_name()),
        }
    }
}

impl From<Scalar> for SpecNode {
    fn from(s: Scalar) -> Self {
        SpecNode::Scalar(s)
    }
}

impl From<&str> for SpecNode {
    fn from(s: &str) -> Self {
        SpecNode::Scalar(Scalar::Str(s.to_string()))
    }
}

impl From<String> for SpecNode {
    fn from(s: String) -> Self {
        SpecNode::Scalar(Scalar::Str(s))
    }
}

impl From<i64> for SpecNode {
    fn from(i: i64) -> Self {
        SpecNode::Scalar(Scalar::Int(i))
    }
}

impl From<f64> for SpecNode {
    fn from(x: f64) -> Self {
        SpecNode::Scalar(Scalar::Float(x))
    }
}

impl From<bool> for SpecNode {
    fn from(b: bool) -> Self {
        SpecNode::Scalar(Scalar::Bool(b))
    }
}

impl From<Mapping> for SpecNode {
    fn from(map: Mapping) -> Self {
        SpecNode::Mapping(map)
    }
}

impl From<Vec<SpecNode>> for SpecNode {
    fn from(items: Vec<SpecNode>) -> Self {
        SpecNode::Sequence(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn test_json_keeps_key_order() {
        let node = SpecNode::from_json_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let keys: Vec<&str> = node.as_mapping().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_null_is_unsupported() {
        let err = SpecNode::try_from(json!({"nodes": [{"hostname": null}]})).unwrap_err();
        assert_eq!(
            err,
            SpecError::UnsupportedNode {
                path: "$.nodes[0].hostname".into(),
                found: "null",
            }
        );
    }

    #[test]
    fn test_u64_beyond_i64_is_unsupported() {
        let err = SpecNode::from_json_str("[18446744073709551615]").unwrap_err();
        assert!(matches!(err, SpecError::UnsupportedNode { .. }));
    }

    #[test]
    fn test_yaml_input() {
        let node = SpecNode::from_yaml_str("name: c1\nnodes:\n  - hostname: n1\n    port: 411\n").unwrap();
        assert_eq!(node["name"].as_str(), Some("c1"));
        assert_eq!(node["nodes"][0]["port"].as_i64(), Some(411));
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            SpecNode::from_json_str("{\"a\": "),
            Err(SpecError::Parse(_))
        ));
    }

    #[test_case(Scalar::Int(10000), "10000")]
    #[test_case(Scalar::Int(-3), "-3")]
    #[test_case(Scalar::Float(2.0), "2.0")]
    #[test_case(Scalar::Float(0.25), "0.25")]
    #[test_case(Scalar::Bool(true), "true")]
    #[test_case(Scalar::Str("x y".into()), "x y")]
    fn test_scalar_display(scalar: Scalar, expected: &str) {
        assert_eq!(scalar.to_string(), expected);
    }

    #[test]
    fn test_serializes_back_to_json() {
        let input = json!({"a": [1, 2.5, "x", true], "b": {"c": "d"}});
        let node = SpecNode::try_from(input.clone()).unwrap();
        assert_eq!(node.to_value(), input);
    }

    #[test]
    fn test_truthiness() {
        assert!(!SpecNode::from(false).is_truthy());
        assert!(!SpecNode::from("").is_truthy());
        assert!(!SpecNode::from(0i64).is_truthy());
        assert!(SpecNode::from("yes").is_truthy());
        assert!(SpecNode::from(1i64).is_truthy());
    }
}
