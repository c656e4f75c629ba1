//! The project-reference graph and its build order.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use refbuild_common::path;
use refbuild_config::{load_config, ConfigError, ProjectConfig};
use refbuild_diagnostics::messages::{CANNOT_READ_FILE, FAILED_TO_PARSE_FILE, INVALID_PATTERN};
use refbuild_diagnostics::Diagnostic;
use refbuild_vfs::Vfs;

use crate::error::GraphError;

/// A project in the graph.
#[derive(Debug, Clone)]
pub enum ProjectNode {
    /// A config that loaded.
    Loaded(ProjectConfig),
    /// A config that could not be read or parsed. It stays in the graph so
    /// that its dependents can be skipped.
    Invalid {
        /// Absolute config path.
        path: String,
        /// The diagnostic explaining the failure.
        diagnostic: Diagnostic,
    },
}

impl ProjectNode {
    /// Returns the config path identifying this project.
    pub fn path(&self) -> &str {
        match self {
            ProjectNode::Loaded(config) => &config.path,
            ProjectNode::Invalid { path, .. } => path,
        }
    }

    /// Returns the loaded config, if any.
    pub fn config(&self) -> Option<&ProjectConfig> {
        match self {
            ProjectNode::Loaded(config) => Some(config),
            ProjectNode::Invalid { .. } => None,
        }
    }
}

/// Converts a config failure into the diagnostic reported for it.
pub fn config_error_diagnostic(err: &ConfigError) -> Diagnostic {
    match err {
        ConfigError::Read { path, .. } => CANNOT_READ_FILE.diagnostic(&[path]),
        ConfigError::Parse { path, reason } => FAILED_TO_PARSE_FILE.diagnostic(&[path, reason]),
        ConfigError::InvalidPattern { pattern, reason } => {
            INVALID_PATTERN.diagnostic(&[pattern, reason])
        }
    }
}

/// Projects reachable from the build roots, with an edge from each project
/// to every project it references.
#[derive(Debug)]
pub struct ProjectGraph {
    graph: DiGraph<ProjectNode, ()>,
    index: HashMap<String, NodeIndex>,
    roots: Vec<NodeIndex>,
    case_sensitive: bool,
}

impl ProjectGraph {
    /// Loads `root_configs` (absolute config paths) and everything they
    /// reference, transitively.
    pub fn load(fs: &Vfs, root_configs: &[String]) -> Self {
        let mut graph = Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
            roots: Vec::new(),
            case_sensitive: fs.is_case_sensitive(),
        };
        for root in root_configs {
            let node = graph.ensure(fs, root);
            if !graph.roots.contains(&node) {
                graph.roots.push(node);
            }
        }
        tracing::debug!(projects = graph.graph.node_count(), "loaded project graph");
        graph
    }

    fn ensure(&mut self, fs: &Vfs, config_path: &str) -> NodeIndex {
        let key = path::key(config_path, self.case_sensitive);
        if let Some(&node) = self.index.get(&key) {
            return node;
        }
        let project = match load_config(fs, config_path) {
            Ok(config) => ProjectNode::Loaded(config),
            Err(e) => {
                tracing::debug!(config = config_path, error = %e, "invalid project");
                ProjectNode::Invalid {
                    path: path::normalize(config_path),
                    diagnostic: config_error_diagnostic(&e),
                }
            }
        };
        let references: Vec<String> = project
            .config()
            .map(|c| c.references.iter().map(|r| r.path.clone()).collect())
            .unwrap_or_default();
        let node = self.graph.add_node(project);
        self.index.insert(key, node);
        for reference in references {
            let target = self.ensure(fs, &reference);
            self.graph.add_edge(node, target, ());
        }
        node
    }

    /// Returns the number of projects.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns `true` if the graph holds no project.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the project at `node`.
    pub fn node(&self, node: NodeIndex) -> &ProjectNode {
        &self.graph[node]
    }

    /// Looks up a project by config path.
    pub fn find(&self, config_path: &str) -> Option<NodeIndex> {
        self.index
            .get(&path::key(config_path, self.case_sensitive))
            .copied()
    }

    /// Returns the projects `node` references, in declaration order.
    pub fn references(&self, node: NodeIndex) -> Vec<NodeIndex> {
        match &self.graph[node] {
            ProjectNode::Loaded(config) => config
                .references
                .iter()
                .filter_map(|r| self.find(&r.path))
                .collect(),
            ProjectNode::Invalid { .. } => Vec::new(),
        }
    }

    /// Returns the projects that reference `node` directly.
    pub fn dependents(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut dependents: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .collect();
        dependents.sort();
        dependents.dedup();
        dependents
    }

    /// Returns every project in build order: each after all its references,
    /// references visited depth-first in declaration order, roots in the
    /// order given.
    pub fn build_order(&self) -> Result<Vec<NodeIndex>, GraphError> {
        let mut order = Vec::with_capacity(self.len());
        let mut done = HashSet::new();
        let mut stack = Vec::new();
        for &root in &self.roots {
            self.visit(root, &mut stack, &mut done, &mut order)?;
        }
        Ok(order)
    }

    fn visit(
        &self,
        node: NodeIndex,
        stack: &mut Vec<NodeIndex>,
        done: &mut HashSet<NodeIndex>,
        order: &mut Vec<NodeIndex>,
    ) -> Result<(), GraphError> {
        if done.contains(&node) {
            return Ok(());
        }
        if let Some(pos) = stack.iter().position(|&n| n == node) {
            let mut cycle: Vec<String> = stack[pos..]
                .iter()
                .map(|&n| self.graph[n].path().to_string())
                .collect();
            cycle.push(self.graph[node].path().to_string());
            return Err(GraphError::CycleDetected { cycle });
        }
        stack.push(node);
        for reference in self.references(node) {
            self.visit(reference, stack, done, order)?;
        }
        stack.pop();
        done.insert(node);
        order.push(node);
        Ok(())
    }
}
