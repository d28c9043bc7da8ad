//! draw.io document extraction
//! Reads the mxGraph XML export and builds a classified component graph

use crate::diagram::error::Result;
use crate::diagram::graph::{DiagramEdge, DiagramGraph, DiagramNode, Position, UNKNOWN_TITLE};
use crate::diagram::taxonomy;
use roxmltree::{Document, Node};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Ids of the two root containers every mxGraph model starts with
pub const RESERVED_CELL_IDS: [&str; 2] = ["0", "1"];

const CELL_TAG: &str = "mxCell";
const GEOMETRY_TAG: &str = "mxGeometry";
const DIAGRAM_TAG: &str = "diagram";

/// What a raw cell turned out to be, decided from its attributes alone
#[derive(Debug)]
enum Cell<'a> {
    Root,
    Component(Shape<'a>),
    Edge(Link<'a>),
    /// A connector that also carries a label: yields both a node and an edge
    LabeledEdge(Shape<'a>, Link<'a>),
    Unrecognized,
}

#[derive(Debug)]
struct Shape<'a> {
    id: &'a str,
    label: &'a str,
    style: &'a str,
    position: Option<Position>,
}

#[derive(Debug)]
struct Link<'a> {
    id: Option<&'a str>,
    source: &'a str,
    target: &'a str,
    label: Option<&'a str>,
}

pub struct DrawioParser;

impl DrawioParser {
    /// Parse a draw.io document into a diagram graph
    pub fn parse(document: &str) -> Result<DiagramGraph> {
        let doc = Document::parse(document)?;

        let diagrams: Vec<Node> = doc
            .descendants()
            .filter(|n| n.has_tag_name(DIAGRAM_TAG))
            .collect();
        let title = diagrams
            .first()
            .and_then(|d| d.attribute("name"))
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_TITLE)
            .to_string();

        let mut graph = DiagramGraph {
            title,
            pages: diagrams.len(),
            ..DiagramGraph::default()
        };
        let mut seen_ids: HashSet<&str> = HashSet::new();

        for element in doc.descendants().filter(|n| n.has_tag_name(CELL_TAG)) {
            graph.raw_elements += 1;

            match Self::read_cell(element) {
                Cell::Root | Cell::Unrecognized => {}
                Cell::Component(shape) => Self::push_node(&mut graph, &mut seen_ids, shape),
                Cell::Edge(link) => graph.edges.push(Self::to_edge(link)),
                Cell::LabeledEdge(shape, link) => {
                    Self::push_node(&mut graph, &mut seen_ids, shape);
                    graph.edges.push(Self::to_edge(link));
                }
            }
        }

        debug!(
            "Extracted {} components and {} connections from {} cells",
            graph.nodes.len(),
            graph.edges.len(),
            graph.raw_elements
        );

        Ok(graph)
    }

    /// Sort a cell by structure: a label makes it a component, source and target make it an edge
    fn read_cell<'a>(element: Node<'a, '_>) -> Cell<'a> {
        let id = element.attribute("id");
        let reserved = id.map_or(false, |id| RESERVED_CELL_IDS.contains(&id));
        let label = element.attribute("value").map(str::trim).unwrap_or("");

        let shape = match id {
            Some(id) if !label.is_empty() && !reserved => Some(Shape {
                id,
                label,
                style: element.attribute("style").unwrap_or(""),
                position: Self::read_geometry(element),
            }),
            _ => None,
        };

        let link = match (element.attribute("source"), element.attribute("target")) {
            (Some(source), Some(target)) => Some(Link {
                id,
                source,
                target,
                label: Some(label).filter(|l| !l.is_empty()),
            }),
            _ => None,
        };

        match (shape, link) {
            (Some(shape), Some(link)) => Cell::LabeledEdge(shape, link),
            (Some(shape), None) => Cell::Component(shape),
            (None, Some(link)) => Cell::Edge(link),
            (None, None) if reserved => Cell::Root,
            (None, None) => Cell::Unrecognized,
        }
    }

    fn read_geometry(element: Node) -> Option<Position> {
        let geometry = element.children().find(|c| c.has_tag_name(GEOMETRY_TAG))?;
        let number = |name: &str| {
            geometry
                .attribute(name)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .unwrap_or(0.0)
        };

        Some(Position {
            x: number("x"),
            y: number("y"),
            width: number("width"),
            height: number("height"),
        })
    }

    fn push_node<'a>(graph: &mut DiagramGraph, seen_ids: &mut HashSet<&'a str>, shape: Shape<'a>) {
        if !seen_ids.insert(shape.id) {
            warn!("Skipping duplicate cell id {}", shape.id);
            return;
        }

        let kind = taxonomy::classify(shape.label, shape.style);
        graph.nodes.push(DiagramNode {
            id: shape.id.to_string(),
            label: shape.label.to_string(),
            style: shape.style.to_string(),
            position: shape.position,
            kind,
            security_relevant: kind.is_security_relevant(),
        });
    }

    fn to_edge(link: Link) -> DiagramEdge {
        DiagramEdge {
            id: link.id.map(str::to_string),
            source: link.source.to_string(),
            target: link.target.to_string(),
            label: link.label.map(str::to_string),
        }
    }
}

/// Parse a draw.io document. See [`DrawioParser::parse`].
pub fn parse(document: &str) -> Result<DiagramGraph> {
    DrawioParser::parse(document)
}
