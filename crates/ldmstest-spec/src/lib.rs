//! Resolver for declarative cluster specs.
//!
//! A spec is a JSON/YAML tree with two reserved keys: a top-level
//! `"templates"` mapping of named mapping fragments, and `"!extends"` on any
//! mapping naming the template it inherits from. Resolution runs two passes:
//! expansion flattens every `!extends` chain (local keys win), then
//! substitution replaces `%NAME%` in strings with the nearest enclosing
//! scalar attribute called `NAME`.
//!
//! ```
//! use ldmstest_spec::{resolve, SpecNode};
//!
//! let raw = SpecNode::from_json_str(r#"{
//!     "templates": { "base": { "listen_port": 10000 } },
//!     "nodes": [ { "hostname": "node-1", "!extends": "base", "port": "%listen_port%" } ]
//! }"#).unwrap();
//!
//! let concrete = resolve(&raw).unwrap();
//! let node = &concrete["nodes"][0];
//! assert_eq!(node["port"].as_str(), Some("10000"));
//! ```

pub mod error;
pub mod node;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod spec;

pub use error::{SpecError, SpecResult};
pub use node::{Mapping, Scalar, SpecNode};
pub use registry::TemplateRegistry;
pub use resolver::{resolve, SpecResolver};
pub use scope::Scope;
pub use spec::Spec;

/// Reserved top-level key holding the template registry.
pub const TEMPLATES_KEY: &str = "templates";

/// Reserved mapping key naming the template to inherit from.
pub const EXTENDS_KEY: &str = "!extends";

/// Bound on nesting depth and on template chain length.
pub const MAX_DEPTH: usize = 64;
