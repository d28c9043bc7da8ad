//! Architecture narrative generation
//! Turns a diagram graph into prose: counts, service breakdown, detected
//! patterns, traffic flow and security highlights

use crate::diagram::graph::{DiagramGraph, FlowRole};
use crate::diagram::taxonomy::ServiceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NO_SERVICES_SENTENCE: &str = "No AWS services were detected in the uploaded diagram. \
Please ensure your diagram contains AWS service components with recognizable labels.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    NoServices,
    Title,
    Summary,
    Breakdown,
    Patterns,
    DataFlow,
    SecurityHighlights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionSection {
    pub kind: SectionKind,
    pub text: String,
}

/// Ordered prose sections. Sections whose precondition fails are left out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureDescription {
    pub sections: Vec<DescriptionSection>,
}

impl ArchitectureDescription {
    pub fn section(&self, kind: SectionKind) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.kind == kind)
            .map(|s| s.text.as_str())
    }

    /// Sections joined by blank lines
    pub fn to_text(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl fmt::Display for ArchitectureDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[derive(Debug)]
enum PatternCondition {
    /// Every listed kind is present
    AllOf(&'static [ServiceKind]),
    /// At least one listed kind is present
    AnyOf(&'static [ServiceKind]),
    /// More than `n` nodes of the kind
    MoreThan(ServiceKind, usize),
}

impl PatternCondition {
    fn holds(&self, graph: &DiagramGraph) -> bool {
        match self {
            PatternCondition::AllOf(kinds) => kinds.iter().all(|k| graph.has_kind(*k)),
            PatternCondition::AnyOf(kinds) => kinds.iter().any(|k| graph.has_kind(*k)),
            PatternCondition::MoreThan(kind, n) => graph.count_kind(*kind) > *n,
        }
    }
}

/// Every matching pattern is reported, in this order
const PATTERNS: &[(PatternCondition, &str)] = &[
    (
        PatternCondition::AllOf(&[ServiceKind::LoadBalancer, ServiceKind::Compute]),
        "Load-balanced web application",
    ),
    (
        PatternCondition::AllOf(&[ServiceKind::FunctionCompute, ServiceKind::ApiGateway]),
        "Serverless API",
    ),
    (
        PatternCondition::MoreThan(ServiceKind::FunctionCompute, 2),
        "Microservices architecture",
    ),
    (
        PatternCondition::AnyOf(&[ServiceKind::Stream, ServiceKind::Queue]),
        "Event-driven processing",
    ),
    (
        PatternCondition::AnyOf(&[ServiceKind::Cdn]),
        "Content delivery network",
    ),
    (
        PatternCondition::AnyOf(&[
            ServiceKind::RelationalDb,
            ServiceKind::DocumentDb,
            ServiceKind::Search,
            ServiceKind::Warehouse,
        ]),
        "Multi-tier data storage",
    ),
];

const SECURITY_CAPABILITIES: &[(ServiceKind, &str)] = &[
    (ServiceKind::Identity, "IAM access control"),
    (ServiceKind::EdgeFirewall, "WAF web protection"),
    (ServiceKind::KeyManagement, "KMS encryption"),
    (ServiceKind::Secrets, "Secrets Manager secret storage"),
    (ServiceKind::DdosProtection, "Shield DDoS protection"),
    (ServiceKind::NetworkIsolation, "VPC network isolation"),
    (ServiceKind::Monitoring, "CloudWatch monitoring"),
];

/// Describe a diagram graph in prose. Total: every graph gets a description.
pub fn describe(graph: &DiagramGraph) -> ArchitectureDescription {
    if graph.is_empty() {
        return ArchitectureDescription {
            sections: vec![section(SectionKind::NoServices, NO_SERVICES_SENTENCE.to_string())],
        };
    }

    let mut sections = Vec::new();

    if graph.has_title() {
        sections.push(section(SectionKind::Title, format!("**{}**", graph.title)));
    }

    sections.push(section(
        SectionKind::Summary,
        format!(
            "This architecture diagram contains **{}** with **{}** between components.",
            counted(graph.nodes.len(), "component", "components"),
            counted(graph.edges.len(), "connection", "connections"),
        ),
    ));

    sections.push(section(
        SectionKind::Breakdown,
        format!("The architecture includes: {}.", breakdown(graph)),
    ));

    let patterns = detect_patterns(graph);
    if !patterns.is_empty() {
        sections.push(section(
            SectionKind::Patterns,
            format!("**Architecture Patterns Detected:** {}", patterns.join(", ")),
        ));
    }

    sections.push(section(
        SectionKind::DataFlow,
        format!("**Data Flow:** {}", describe_flow(graph)),
    ));

    let capabilities = security_capabilities(graph);
    if !capabilities.is_empty() {
        sections.push(section(
            SectionKind::SecurityHighlights,
            format!("**Security Aspects:** Includes {}.", join_with_and(&capabilities)),
        ));
    }

    ArchitectureDescription { sections }
}

/// Names of all architecture patterns the graph matches
pub fn detect_patterns(graph: &DiagramGraph) -> Vec<&'static str> {
    PATTERNS
        .iter()
        .filter(|(condition, _)| condition.holds(graph))
        .map(|(_, name)| *name)
        .collect()
}

/// Traffic narrative from in/out degrees of each component
pub fn describe_flow(graph: &DiagramGraph) -> String {
    if graph.edges.is_empty() {
        return "No explicit connections are defined between services.".to_string();
    }

    let mut entries: Vec<&str> = Vec::new();
    let mut endpoints: Vec<&str> = Vec::new();
    for (node, role) in graph.flow_roles() {
        let name = node.kind.display_name();
        let bucket = match role {
            FlowRole::Entry => &mut entries,
            FlowRole::Endpoint => &mut endpoints,
            FlowRole::Intermediate | FlowRole::Isolated => continue,
        };
        if !bucket.contains(&name) {
            bucket.push(name);
        }
    }

    match (entries.is_empty(), endpoints.is_empty()) {
        (false, false) => format!(
            "Traffic enters through {} and flows to {}.",
            join_with_and(&entries),
            join_with_and(&endpoints)
        ),
        (false, true) => format!("Traffic enters through {}.", join_with_and(&entries)),
        (true, false) => format!("Traffic flows to {}.", join_with_and(&endpoints)),
        (true, true) => format!(
            "Complex interconnected architecture with {} between services.",
            counted(graph.edges.len(), "connection", "connections")
        ),
    }
}

fn breakdown(graph: &DiagramGraph) -> String {
    let items: Vec<String> = graph
        .kind_counts()
        .into_iter()
        .map(|(kind, count)| match count {
            1 => format!("1 {}", kind.display_name()),
            n => format!("{} {}", n, kind.plural_name()),
        })
        .collect();
    join_with_and(&items)
}

fn security_capabilities(graph: &DiagramGraph) -> Vec<&'static str> {
    SECURITY_CAPABILITIES
        .iter()
        .filter(|(kind, _)| graph.has_kind(*kind))
        .map(|(_, phrase)| *phrase)
        .collect()
}

fn section(kind: SectionKind, text: String) -> DescriptionSection {
    DescriptionSection { kind, text }
}

fn counted(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("1 {singular}")
    } else {
        format!("{n} {plural}")
    }
}

/// "a", "a and b", "a, b, and c"
fn join_with_and<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(|s| s.as_ref()).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::graph::{DiagramEdge, DiagramNode};
    use crate::diagram::taxonomy::classify;

    fn graph_of(labels: &[&str], edges: &[(usize, usize)]) -> DiagramGraph {
        DiagramGraph {
            nodes: labels
                .iter()
                .enumerate()
                .map(|(i, label)| DiagramNode::new(format!("n{i}"), *label, classify(label, "")))
                .collect(),
            edges: edges
                .iter()
                .map(|(from, to)| DiagramEdge::new(format!("n{from}"), format!("n{to}")))
                .collect(),
            ..DiagramGraph::default()
        }
    }

    #[test]
    fn test_empty_graph_single_sentence() {
        let description = describe(&DiagramGraph::default());
        assert_eq!(description.sections.len(), 1);
        assert_eq!(description.to_text(), NO_SERVICES_SENTENCE);
    }

    #[test]
    fn test_join_with_and() {
        assert_eq!(join_with_and::<&str>(&[]), "");
        assert_eq!(join_with_and(&["a"]), "a");
        assert_eq!(join_with_and(&["a", "b"]), "a and b");
        assert_eq!(join_with_and(&["a", "b", "c"]), "a, b, and c");
    }

    #[test]
    fn test_breakdown_singular_and_plural() {
        let graph = graph_of(&["EC2 Instance", "S3 Bucket", "EC2 web server"], &[]);
        let description = describe(&graph);
        assert_eq!(
            description.section(SectionKind::Breakdown),
            Some("The architecture includes: 2 EC2 instances and 1 S3 bucket.")
        );
    }

    #[test]
    fn test_summary_counts() {
        let graph = graph_of(&["EC2 Instance", "RDS Database"], &[(0, 1)]);
        let summary = describe(&graph).section(SectionKind::Summary).unwrap().to_string();
        assert!(summary.contains("**2 components**"));
        assert!(summary.contains("**1 connection**"));
    }

    #[test]
    fn test_title_only_when_known() {
        let mut graph = graph_of(&["EC2 Instance"], &[]);
        assert!(describe(&graph).section(SectionKind::Title).is_none());
        graph.title = "Checkout".to_string();
        assert_eq!(describe(&graph).section(SectionKind::Title), Some("**Checkout**"));
    }

    #[test]
    fn test_all_matching_patterns_are_reported() {
        let graph = graph_of(
            &[
                "API Gateway",
                "Lambda A",
                "Lambda B",
                "Lambda C",
                "SQS",
                "CloudFront",
                "DynamoDB",
            ],
            &[],
        );
        assert_eq!(
            detect_patterns(&graph),
            vec![
                "Serverless API",
                "Microservices architecture",
                "Event-driven processing",
                "Content delivery network",
                "Multi-tier data storage",
            ]
        );
    }

    #[test]
    fn test_no_patterns_section_when_none_match() {
        let graph = graph_of(&["Route 53"], &[]);
        assert!(describe(&graph).section(SectionKind::Patterns).is_none());
    }

    #[test]
    fn test_flow_without_edges() {
        let graph = graph_of(&["EC2 Instance"], &[]);
        assert_eq!(
            describe_flow(&graph),
            "No explicit connections are defined between services."
        );
    }

    #[test]
    fn test_flow_entry_and_endpoint() {
        let graph = graph_of(
            &["CloudFront", "ALB", "EC2 Instance", "RDS Database", "S3 Bucket"],
            &[(0, 1), (1, 2), (2, 3), (2, 4)],
        );
        assert_eq!(
            describe_flow(&graph),
            "Traffic enters through CloudFront distribution and flows to RDS database and S3 bucket."
        );
    }

    #[test]
    fn test_flow_counts_edges_to_missing_components() {
        let mut graph = graph_of(&["Lambda", "EC2 Instance"], &[]);
        graph.edges.push(DiagramEdge::new("n0", "nowhere"));
        assert_eq!(describe_flow(&graph), "Traffic enters through Lambda function.");
    }

    #[test]
    fn test_flow_cycle_has_no_clean_roles() {
        let graph = graph_of(&["EC2 Instance", "RDS Database"], &[(0, 1), (1, 0)]);
        assert_eq!(
            describe_flow(&graph),
            "Complex interconnected architecture with 2 connections between services."
        );
    }

    #[test]
    fn test_flow_entry_names_are_deduplicated() {
        let graph = graph_of(
            &["EC2 A", "EC2 B", "RDS Database"],
            &[(0, 2), (1, 2)],
        );
        assert_eq!(
            describe_flow(&graph),
            "Traffic enters through EC2 instance and flows to RDS database."
        );
    }

    #[test]
    fn test_security_highlights() {
        let graph = graph_of(&["IAM Role", "AWS KMS", "EC2 Instance"], &[]);
        assert_eq!(
            describe(&graph).section(SectionKind::SecurityHighlights),
            Some("**Security Aspects:** Includes IAM access control and KMS encryption.")
        );

        let plain = graph_of(&["EC2 Instance"], &[]);
        assert!(describe(&plain).section(SectionKind::SecurityHighlights).is_none());
    }

    #[test]
    fn test_section_order() {
        let mut graph = graph_of(&["ALB", "EC2 Instance", "IAM Role"], &[(0, 1)]);
        graph.title = "Shop".to_string();
        let kinds: Vec<SectionKind> = describe(&graph).sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SectionKind::Title,
                SectionKind::Summary,
                SectionKind::Breakdown,
                SectionKind::Patterns,
                SectionKind::DataFlow,
                SectionKind::SecurityHighlights,
            ]
        );
    }
}
