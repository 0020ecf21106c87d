//! In-memory cluster node for driving the ldmsd helpers.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use ldmstest_ldmsd::{ClusterNode, DaemonResult, ExecOutput};

/// Recorded node operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOperation {
    Exec {
        command: String,
        env: IndexMap<String, String>,
    },
    WriteFile {
        path: String,
        content: String,
    },
}

/// A node answering commands from canned responses.
///
/// Responses are matched by command prefix, first registered wins. Commands
/// without a match get the default response (status 0, empty output).
#[derive(Debug, Clone)]
pub struct MockNode {
    hostname: String,
    responses: Arc<RwLock<Vec<(String, ExecOutput)>>>,
    default: Arc<RwLock<ExecOutput>>,
    files: Arc<RwLock<IndexMap<String, String>>>,
    /// Track all operations for verification
    operations: Arc<RwLock<Vec<NodeOperation>>>,
}

impl MockNode {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            responses: Arc::default(),
            default: Arc::new(RwLock::new(ExecOutput::new(0, ""))),
            files: Arc::default(),
            operations: Arc::default(),
        }
    }

    /// Answer commands starting with `prefix`.
    pub fn respond(self, prefix: impl Into<String>, status: i32, output: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .push((prefix.into(), ExecOutput::new(status, output)));
        self
    }

    pub fn with_default(self, status: i32, output: impl Into<String>) -> Self {
        *self.default.write().unwrap() = ExecOutput::new(status, output);
        self
    }

    /// Content written to `path`, if any.
    pub fn file(&self, path: &str) -> Option<String> {
        self.files.read().unwrap().get(path).cloned()
    }

    pub fn operations(&self) -> Vec<NodeOperation> {
        self.operations.read().unwrap().clone()
    }

    /// Commands run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.operations
            .read()
            .unwrap()
            .iter()
            .filter_map(|op| match op {
                NodeOperation::Exec { command, .. } => Some(command.clone()),
                NodeOperation::WriteFile { .. } => None,
            })
            .collect()
    }

    pub fn clear_operations(&self) {
        self.operations.write().unwrap().clear();
    }

    fn record(&self, op: NodeOperation) {
        self.operations.write().unwrap().push(op);
    }
}

impl ClusterNode for MockNode {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn exec(&self, command: &str, env: &IndexMap<String, String>) -> DaemonResult<ExecOutput> {
        self.record(NodeOperation::Exec {
            command: command.to_string(),
            env: env.clone(),
        });
        let responses = self.responses.read().unwrap();
        let out = responses
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_else(|| self.default.read().unwrap().clone());
        Ok(out)
    }

    fn write_file(&self, path: &str, content: &str) -> DaemonResult<()> {
        self.record(NodeOperation::WriteFile {
            path: path.to_string(),
            content: content.to_string(),
        });
        self.files
            .write()
            .unwrap()
            .insert(path.to_string(), content.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_response() {
        let node = MockNode::new("node-1").respond("pgrep", 1, "0\n");
        let env = IndexMap::new();
        assert_eq!(node.exec("pgrep -c ldmsd", &env).unwrap(), ExecOutput::new(1, "0\n"));
        assert_eq!(node.exec("true", &env).unwrap(), ExecOutput::new(0, ""));
        assert_eq!(node.commands(), ["pgrep -c ldmsd", "true"]);
    }

    #[test]
    fn test_write_file_is_recorded() {
        let node = MockNode::new("node-1");
        node.write_file("/etc/ldmsd.conf", "load name=meminfo\n").unwrap();
        assert_eq!(node.file("/etc/ldmsd.conf").as_deref(), Some("load name=meminfo\n"));
        assert_eq!(node.operations().len(), 1);
        node.clear_operations();
        assert!(node.operations().is_empty());
    }
}
