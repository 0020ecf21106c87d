//! Lexical variable scopes for `%NAME%` substitution.

use indexmap::IndexMap;

use crate::node::{Mapping, Scalar};

/// A chain of variable bindings, innermost first.
///
/// Each mapping entered during substitution pushes one frame binding its
/// scalar-valued keys. Lookups walk outward through the parents, so the
/// nearest enclosing binding wins and sibling subtrees never see each
/// other's frames.
#[derive(Debug, Default)]
pub struct Scope<'a> {
    bindings: IndexMap<&'a str, &'a Scalar>,
    parent: Option<&'a Scope<'a>>,
}

impl<'a> Scope<'a> {
    /// The empty outermost scope.
    pub fn root() -> Self {
        Self::default()
    }

    /// A new frame binding each scalar key of `mapping`.
    pub fn child(&'a self, mapping: &'a Mapping) -> Scope<'a> {
        let bindings = mapping
            .iter()
            .filter_map(|(key, value)| value.as_scalar().map(|s| (key.as_str(), s)))
            .collect();
        Scope {
            bindings,
            parent: Some(self),
        }
    }

    /// Nearest binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&'a Scalar> {
        let mut frame = Some(self);
        while let Some(scope) = frame {
            if let Some(value) = scope.bindings.get(name) {
                return Some(*value);
            }
            frame = scope.parent;
        }
        None
    }

    /// The enclosing scope, `None` at the root.
    pub fn parent(&self) -> Option<&'a Scope<'a>> {
        self.parent
    }

    /// Number of frames including this one.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut frame = Some(self);
        while let Some(scope) = frame {
            depth += 1;
            frame = scope.parent;
        }
        depth
    }
}
