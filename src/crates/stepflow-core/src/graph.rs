//! Graph structure: nodes, edges, entry point and structural validation
//!
//! A [`Graph`] is the static description of a workflow. Nodes are async
//! functions from a state snapshot to a partial state (the delta); edges
//! decide which node runs next:
//!
//! - [`Edge::Direct`] always continues to the same target.
//! - [`Edge::Conditional`] calls a router on the merged state and looks the
//!   returned route key up in its target map.
//!
//! A target is either a declared node or [`END`]. Each node has exactly one
//! outgoing edge. Cycles are allowed; the engine bounds them with a step
//! limit.
//!
//! Most code builds graphs through [`StateGraph`](crate::StateGraph), which
//! validates the structure when compiling.

use crate::error::NodeError;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Node identifier type
pub type NodeId = String;

/// Pseudo-node used with [`StateGraph::add_edge`](crate::StateGraph::add_edge)
/// to declare the entry point
pub const START: &str = "__start__";

/// Terminal marker: routing here ends the run
pub const END: &str = "__end__";

/// Future returned by a node body
pub type NodeFuture = Pin<Box<dyn Future<Output = Result<Value, NodeError>> + Send>>;

/// Node body: receives a snapshot of the current state, returns a delta
pub type NodeExecutor = Arc<dyn Fn(Value) -> NodeFuture + Send + Sync>;

/// Conditional edge router: maps the merged state to a route key
pub type Router = Arc<dyn Fn(&Value) -> String + Send + Sync>;

/// Outgoing transition of a node
#[derive(Clone)]
pub enum Edge {
    /// Unconditional edge to a node or [`END`]
    Direct(NodeId),

    /// Data-dependent edge
    Conditional {
        /// Router evaluated on the state after the source node's delta is merged
        router: Router,
        /// Route key to target (node or [`END`])
        branches: HashMap<String, NodeId>,
    },
}

impl Edge {
    /// Every target this edge may resolve to
    pub fn targets(&self) -> Vec<&NodeId> {
        match self {
            Edge::Direct(to) => vec![to],
            Edge::Conditional { branches, .. } => branches.values().collect(),
        }
    }
}

impl std::fmt::Debug for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Direct(node_id) => f.debug_tuple("Direct").field(node_id).finish(),
            Edge::Conditional { branches, .. } => f
                .debug_struct("Conditional")
                .field("router", &"<function>")
                .field("branches", branches)
                .finish(),
        }
    }
}

/// Node specification
#[derive(Clone)]
pub struct NodeSpec {
    /// Node name, unique within the graph
    pub name: String,
    /// Async body
    pub executor: NodeExecutor,
}

impl std::fmt::Debug for NodeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSpec")
            .field("name", &self.name)
            .field("executor", &"<function>")
            .finish()
    }
}

/// Core graph structure containing nodes, edges and the entry point
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// All nodes in the graph mapped by their unique IDs
    pub nodes: HashMap<NodeId, NodeSpec>,

    /// Outgoing edges per source node
    ///
    /// Stored as a list so that validation can report a node declared with
    /// more than one outgoing edge.
    pub edges: HashMap<NodeId, Vec<Edge>>,

    /// Node where every run begins
    pub entry: Option<NodeId>,

    /// Names passed to `add_node` more than once
    pub duplicates: Vec<NodeId>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, remembering the name if it was already taken
    pub fn add_node(&mut self, id: NodeId, spec: NodeSpec) {
        if self.nodes.insert(id.clone(), spec).is_some() {
            self.duplicates.push(id);
        }
    }

    /// Add an unconditional edge
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.edges.entry(from).or_default().push(Edge::Direct(to));
    }

    /// Add a conditional edge
    pub fn add_conditional_edge(
        &mut self,
        from: NodeId,
        router: Router,
        branches: HashMap<String, NodeId>,
    ) {
        self.edges
            .entry(from)
            .or_default()
            .push(Edge::Conditional { router, branches });
    }

    /// Set the entry point
    pub fn set_entry(&mut self, node: NodeId) {
        self.entry = Some(node);
    }

    /// The single outgoing edge of a node
    pub fn edge_from(&self, node: &str) -> Option<&Edge> {
        self.edges.get(node).and_then(|edges| edges.first())
    }

    /// Node names in sorted order
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Validate the graph structure
    ///
    /// # Errors
    ///
    /// Returns a message naming the offending node or edge if:
    /// - the graph has no nodes, or a node name is duplicated or reserved
    /// - no entry point is set, or it is not a declared node
    /// - an edge starts at an undeclared node
    /// - an edge target is neither a declared node nor [`END`]
    /// - a conditional edge has an empty target map
    /// - a node has no outgoing edge, or more than one
    /// - a node cannot be reached from the entry
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Graph has no nodes".to_string());
        }

        if let Some(dup) = self.duplicates.first() {
            return Err(format!("Duplicate node name '{dup}'"));
        }

        for name in self.node_names() {
            if name == START || name == END {
                return Err(format!("Node name '{name}' is reserved"));
            }
        }

        let entry = self
            .entry
            .as_ref()
            .ok_or_else(|| "No entry point set".to_string())?;
        if !self.nodes.contains_key(entry) {
            return Err(format!("Entry point '{entry}' does not exist"));
        }

        let mut sources: Vec<&NodeId> = self.edges.keys().collect();
        sources.sort();
        for from in sources {
            if !self.nodes.contains_key(from) {
                return Err(format!("Edge source '{from}' does not exist"));
            }

            for edge in &self.edges[from] {
                if let Edge::Conditional { branches, .. } = edge {
                    if branches.is_empty() {
                        return Err(format!("Conditional edge from '{from}' has no targets"));
                    }
                }

                let mut targets = edge.targets();
                targets.sort();
                for to in targets {
                    if to != END && !self.nodes.contains_key(to) {
                        return Err(format!("Edge target '{to}' (from '{from}') does not exist"));
                    }
                }
            }
        }

        for name in self.node_names() {
            match self.edges.get(name).map(Vec::len).unwrap_or(0) {
                0 => return Err(format!("Node '{name}' has no outgoing edge")),
                1 => {}
                _ => return Err(format!("Node '{name}' has more than one outgoing edge")),
            }
        }

        let reachable = self.reachable_from(entry);
        if let Some(orphan) = self
            .node_names()
            .into_iter()
            .find(|name| !reachable.contains(*name))
        {
            return Err(format!("Node '{orphan}' is not reachable from entry '{entry}'"));
        }

        Ok(())
    }

    fn reachable_from<'a>(&'a self, entry: &'a str) -> HashSet<&'a str> {
        let mut seen = HashSet::from([entry]);
        let mut queue = VecDeque::from([entry]);

        while let Some(node) = queue.pop_front() {
            for edge in self.edges.get(node).into_iter().flatten() {
                for to in edge.targets() {
                    if to != END && seen.insert(to.as_str()) {
                        queue.push_back(to.as_str());
                    }
                }
            }
        }

        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop(name: &str) -> NodeSpec {
        NodeSpec {
            name: name.to_string(),
            executor: Arc::new(|_| Box::pin(async { Ok(json!({})) })),
        }
    }

    fn graph(nodes: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for name in nodes {
            graph.add_node(name.to_string(), noop(name));
        }
        graph
    }

    fn router(key: &'static str) -> Router {
        Arc::new(move |_| key.to_string())
    }

    #[test]
    fn test_linear_graph_is_valid() {
        let mut g = graph(&["a", "b"]);
        g.set_entry("a".into());
        g.add_edge("a".into(), "b".into());
        g.add_edge("b".into(), END.into());
        assert!(g.validate().is_ok());
    }

    #[test]
    fn test_cycle_is_valid() {
        let mut g = graph(&["draft", "confirm"]);
        g.set_entry("draft".into());
        g.add_edge("draft".into(), "confirm".into());
        g.add_conditional_edge(
            "confirm".into(),
            router("yes"),
            HashMap::from([("yes".into(), END.into()), ("no".into(), "draft".into())]),
        );
        assert!(g.validate().is_ok());
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(Graph::new().validate().unwrap_err(), "Graph has no nodes");
    }

    #[test]
    fn test_duplicate_node() {
        let mut g = graph(&["a", "a"]);
        g.set_entry("a".into());
        g.add_edge("a".into(), END.into());
        assert_eq!(g.validate().unwrap_err(), "Duplicate node name 'a'");
    }

    #[test]
    fn test_reserved_name() {
        let mut g = graph(&[END]);
        g.set_entry(END.into());
        assert!(g.validate().unwrap_err().contains("reserved"));
    }

    #[test]
    fn test_missing_entry() {
        let mut g = graph(&["a"]);
        g.add_edge("a".into(), END.into());
        assert_eq!(g.validate().unwrap_err(), "No entry point set");

        g.set_entry("zzz".into());
        assert_eq!(g.validate().unwrap_err(), "Entry point 'zzz' does not exist");
    }

    #[test]
    fn test_dangling_target() {
        let mut g = graph(&["a"]);
        g.set_entry("a".into());
        g.add_edge("a".into(), "ghost".into());
        assert_eq!(
            g.validate().unwrap_err(),
            "Edge target 'ghost' (from 'a') does not exist"
        );
    }

    #[test]
    fn test_dangling_branch_target() {
        let mut g = graph(&["a"]);
        g.set_entry("a".into());
        g.add_conditional_edge(
            "a".into(),
            router("x"),
            HashMap::from([("x".into(), "ghost".into())]),
        );
        assert!(g.validate().unwrap_err().contains("'ghost'"));
    }

    #[test]
    fn test_undeclared_source() {
        let mut g = graph(&["a"]);
        g.set_entry("a".into());
        g.add_edge("a".into(), END.into());
        g.add_edge("nope".into(), END.into());
        assert_eq!(g.validate().unwrap_err(), "Edge source 'nope' does not exist");
    }

    #[test]
    fn test_node_without_outgoing_edge() {
        let mut g = graph(&["a", "b"]);
        g.set_entry("a".into());
        g.add_edge("a".into(), "b".into());
        assert_eq!(g.validate().unwrap_err(), "Node 'b' has no outgoing edge");
    }

    #[test]
    fn test_node_with_two_edges() {
        let mut g = graph(&["a", "b"]);
        g.set_entry("a".into());
        g.add_edge("a".into(), "b".into());
        g.add_edge("a".into(), END.into());
        g.add_edge("b".into(), END.into());
        assert_eq!(
            g.validate().unwrap_err(),
            "Node 'a' has more than one outgoing edge"
        );
    }

    #[test]
    fn test_empty_branch_map() {
        let mut g = graph(&["a"]);
        g.set_entry("a".into());
        g.add_conditional_edge("a".into(), router("x"), HashMap::new());
        assert_eq!(
            g.validate().unwrap_err(),
            "Conditional edge from 'a' has no targets"
        );
    }

    #[test]
    fn test_unreachable_node() {
        let mut g = graph(&["a", "island"]);
        g.set_entry("a".into());
        g.add_edge("a".into(), END.into());
        g.add_edge("island".into(), END.into());
        assert_eq!(
            g.validate().unwrap_err(),
            "Node 'island' is not reachable from entry 'a'"
        );
    }

    #[test]
    fn test_edge_debug_hides_router() {
        let edge = Edge::Conditional {
            router: router("x"),
            branches: HashMap::new(),
        };
        assert!(format!("{edge:?}").contains("<function>"));
    }
}
