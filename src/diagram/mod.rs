//! Diagram inventory and architecture inference
//! Parse a draw.io document once, then derive the security review and narrative from the graph

pub mod assessment;
pub mod drawio;
pub mod error;
pub mod graph;
pub mod narrative;
pub mod security;
pub mod taxonomy;

pub use assessment::{assess, Assessment};
pub use drawio::parse;
pub use error::{DiagramError, Result};
pub use graph::{DiagramEdge, DiagramGraph, DiagramNode, GraphSummary, Position};
pub use narrative::{describe, ArchitectureDescription};
pub use security::{analyze, SecurityFinding, SecurityReport, Severity};
pub use taxonomy::{classify, ServiceKind};

/// Everything derived from one document
#[derive(Debug, Clone)]
pub struct DiagramAnalysis {
    pub graph: DiagramGraph,
    pub security: SecurityReport,
    pub description: ArchitectureDescription,
    pub assessment: Assessment,
}

/// Parse a document, then run the security review, the narrator and the roll-ups on it
pub fn analyze_document(document: &str) -> Result<DiagramAnalysis> {
    let graph = parse(document)?;
    let security = analyze(&graph);
    let description = describe(&graph);
    let assessment = assess(&graph, &security);

    Ok(DiagramAnalysis {
        graph,
        security,
        description,
        assessment,
    })
}
