//! Component graph extracted from a diagram document
//! Nodes are classified shapes, edges are the connectors drawn between them

use crate::diagram::taxonomy::ServiceKind;
use petgraph::algo::connected_components;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Title used when the document does not name its diagram
pub const UNKNOWN_TITLE: &str = "Unknown";

/// Bounding box of a shape as drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A labelled shape in the diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: String,
    pub label: String,
    /// Raw style string, only a weak hint for classification
    pub style: String,
    pub position: Option<Position>,
    pub kind: ServiceKind,
    pub security_relevant: bool,
}

impl DiagramNode {
    /// Build a node and derive its security flag from the kind
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: ServiceKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            style: String::new(),
            position: None,
            kind,
            security_relevant: kind.is_security_relevant(),
        }
    }
}

/// A directed connector between two cell ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
}

impl DiagramEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }
}

/// Where a component sits in the traffic flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRole {
    /// Only outgoing connections
    Entry,
    /// Only incoming connections
    Endpoint,
    Intermediate,
    /// Not connected at all
    Isolated,
}

/// Parsed diagram. Edges may reference ids that are not nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramGraph {
    pub title: String,
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
    /// Number of `diagram` pages in the document
    pub pages: usize,
    /// Number of raw cells seen, diagnostic only
    pub raw_elements: usize,
}

impl Default for DiagramGraph {
    fn default() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            nodes: Vec::new(),
            edges: Vec::new(),
            pages: 0,
            raw_elements: 0,
        }
    }
}

impl DiagramGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_title(&self) -> bool {
        !self.title.is_empty() && self.title != UNKNOWN_TITLE
    }

    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn has_kind(&self, kind: ServiceKind) -> bool {
        self.nodes.iter().any(|n| n.kind == kind)
    }

    pub fn count_kind(&self, kind: ServiceKind) -> usize {
        self.nodes.iter().filter(|n| n.kind == kind).count()
    }

    /// Node count per kind, in order of first appearance
    pub fn kind_counts(&self) -> Vec<(ServiceKind, usize)> {
        let mut counts: Vec<(ServiceKind, usize)> = Vec::new();
        for node in &self.nodes {
            match counts.iter_mut().find(|(kind, _)| *kind == node.kind) {
                Some((_, count)) => *count += 1,
                None => counts.push((node.kind, 1)),
            }
        }
        counts
    }

    /// Whether at least one edge joins two extracted components
    pub fn has_internal_edges(&self) -> bool {
        self.edges
            .iter()
            .any(|e| self.node(&e.source).is_some() && self.node(&e.target).is_some())
    }

    /// Petgraph view over the components. Edges touching unknown ids are
    /// skipped, so degrees taken here undercount dangling connectors.
    pub fn to_digraph(&self) -> DiGraph<&DiagramNode, Option<&str>> {
        let mut graph = DiGraph::new();
        let index_of: HashMap<&str, NodeIndex> = self
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), graph.add_node(node)))
            .collect();

        for edge in &self.edges {
            if let (Some(&from), Some(&to)) = (
                index_of.get(edge.source.as_str()),
                index_of.get(edge.target.as_str()),
            ) {
                graph.add_edge(from, to, edge.label.as_deref());
            }
        }

        graph
    }

    /// Number of weakly connected clusters of components
    pub fn cluster_count(&self) -> usize {
        connected_components(&self.to_digraph())
    }

    /// Flow role of every node, in node order. Degrees count every edge naming
    /// the node, whether or not the other end is a component.
    pub fn flow_roles(&self) -> Vec<(&DiagramNode, FlowRole)> {
        let mut incoming: HashMap<&str, usize> = HashMap::new();
        let mut outgoing: HashMap<&str, usize> = HashMap::new();
        for edge in &self.edges {
            *outgoing.entry(edge.source.as_str()).or_default() += 1;
            *incoming.entry(edge.target.as_str()).or_default() += 1;
        }

        self.nodes
            .iter()
            .map(|node| {
                let id = node.id.as_str();
                let role = match (
                    incoming.get(id).copied().unwrap_or(0),
                    outgoing.get(id).copied().unwrap_or(0),
                ) {
                    (0, 0) => FlowRole::Isolated,
                    (0, _) => FlowRole::Entry,
                    (_, 0) => FlowRole::Endpoint,
                    _ => FlowRole::Intermediate,
                };
                (node, role)
            })
            .collect()
    }

    /// Counts handed back to API clients next to the analysis
    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            security_relevant_count: self.nodes.iter().filter(|n| n.security_relevant).count(),
            kinds: self
                .kind_counts()
                .into_iter()
                .map(|(kind, count)| KindCount { kind, count })
                .collect(),
        }
    }
}

/// Summary statistics for a diagram graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub node_count: usize,
    pub edge_count: usize,
    pub security_relevant_count: usize,
    /// Per-kind counts, first-seen order
    pub kinds: Vec<KindCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindCount {
    pub kind: ServiceKind,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> DiagramGraph {
        DiagramGraph {
            nodes: vec![
                DiagramNode::new("lb", "ALB", ServiceKind::LoadBalancer),
                DiagramNode::new("web", "Web", ServiceKind::Compute),
                DiagramNode::new("db", "RDS", ServiceKind::RelationalDb),
                DiagramNode::new("ops", "CloudWatch", ServiceKind::Monitoring),
            ],
            edges: vec![
                DiagramEdge::new("lb", "web"),
                DiagramEdge::new("web", "db"),
                DiagramEdge::new("web", "ghost"),
            ],
            ..DiagramGraph::default()
        }
    }

    #[test]
    fn test_flow_roles() {
        let graph = chain();
        let roles: Vec<FlowRole> = graph.flow_roles().into_iter().map(|(_, r)| r).collect();
        assert_eq!(
            roles,
            vec![
                FlowRole::Entry,
                FlowRole::Intermediate,
                FlowRole::Endpoint,
                FlowRole::Isolated
            ]
        );
    }

    #[test]
    fn test_digraph_skips_dangling_edges() {
        let graph = chain();
        let digraph = graph.to_digraph();
        assert_eq!(digraph.node_count(), 4);
        assert_eq!(digraph.edge_count(), 2);
    }

    #[test]
    fn test_dangling_edge_still_counts_toward_roles() {
        let graph = DiagramGraph {
            nodes: vec![
                DiagramNode::new("fn", "Lambda", ServiceKind::FunctionCompute),
                DiagramNode::new("web", "EC2", ServiceKind::Compute),
            ],
            edges: vec![DiagramEdge::new("fn", "nowhere"), DiagramEdge::new("ghost", "web")],
            ..DiagramGraph::default()
        };
        let roles: Vec<FlowRole> = graph.flow_roles().into_iter().map(|(_, r)| r).collect();
        assert_eq!(roles, vec![FlowRole::Entry, FlowRole::Endpoint]);
    }

    #[test]
    fn test_cluster_count() {
        // lb-web-db joined, ops alone
        assert_eq!(chain().cluster_count(), 2);
        assert_eq!(DiagramGraph::default().cluster_count(), 0);
    }

    #[test]
    fn test_kind_counts_keep_first_seen_order() {
        let mut graph = chain();
        graph.nodes.push(DiagramNode::new("web2", "Web 2", ServiceKind::Compute));
        assert_eq!(
            graph.kind_counts(),
            vec![
                (ServiceKind::LoadBalancer, 1),
                (ServiceKind::Compute, 2),
                (ServiceKind::RelationalDb, 1),
                (ServiceKind::Monitoring, 1),
            ]
        );
    }

    #[test]
    fn test_summary() {
        let summary = chain().summary();
        assert_eq!(summary.node_count, 4);
        assert_eq!(summary.edge_count, 3);
        assert_eq!(summary.security_relevant_count, 1);
        assert_eq!(
            summary.kinds[1],
            KindCount {
                kind: ServiceKind::Compute,
                count: 1
            }
        );
    }

    #[test]
    fn test_internal_edges() {
        let mut graph = chain();
        assert!(graph.has_internal_edges());
        graph.edges.retain(|e| e.target == "ghost");
        assert!(!graph.has_internal_edges());
    }

    #[test]
    fn test_default_graph_has_no_title() {
        let graph = DiagramGraph::default();
        assert!(graph.is_empty());
        assert!(!graph.has_title());
    }
}
