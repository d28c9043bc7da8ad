//! Roll-ups derived from a graph and its security review: an executive
//! summary, a remediation roadmap bucketed by urgency, and an architecture
//! profile. Pure functions of their inputs.

use crate::diagram::graph::DiagramGraph;
use crate::diagram::security::{SecurityReport, Severity};
use crate::diagram::taxonomy::ServiceKind;
use serde::{Deserialize, Serialize};

/// HIGH findings above this make the architecture non-compliant
const NON_COMPLIANT_HIGH_FINDINGS: usize = 2;
const MAX_PRIORITY_ACTIONS: usize = 3;

const DEFAULT_PRIORITY_ACTIONS: &[&str] = &[
    "Review and implement encryption for all data stores",
    "Establish comprehensive security monitoring",
    "Implement automated security controls and compliance checking",
];

/// Kinds whose compromise exposes data or workloads directly
const CRITICAL_KINDS: &[ServiceKind] = &[
    ServiceKind::RelationalDb,
    ServiceKind::StorageObject,
    ServiceKind::FunctionCompute,
    ServiceKind::ApiGateway,
    ServiceKind::Compute,
    ServiceKind::DocumentDb,
];

const DATA_STORE_KINDS: &[ServiceKind] = &[
    ServiceKind::RelationalDb,
    ServiceKind::DocumentDb,
    ServiceKind::StorageObject,
];

const LOW_COMPLEXITY_MAX_EDGES: usize = 5;
const MEDIUM_COMPLEXITY_MAX_EDGES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    #[serde(rename = "Non-compliant - critical gaps identified")]
    NonCompliant,
    #[serde(rename = "Partially compliant - gaps require attention")]
    PartiallyCompliant,
    #[serde(rename = "Generally compliant - minor improvements needed")]
    GenerallyCompliant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub posture: String,
    pub high_findings: usize,
    pub medium_findings: usize,
    pub low_findings: usize,
    pub compliance_status: ComplianceStatus,
    pub priority_actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationAction {
    pub action: String,
    pub component: String,
    pub impact: Impact,
}

/// Findings bucketed by urgency: HIGH now, MEDIUM next, LOW later
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemediationRoadmap {
    pub immediate: Vec<RemediationAction>,
    pub short_term: Vec<RemediationAction>,
    pub long_term: Vec<RemediationAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataClassification {
    #[serde(rename = "Confidential/PII Likely")]
    Confidential,
    #[serde(rename = "Public/Internal")]
    PublicInternal,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkComplexity {
    Low,
    Medium,
    High,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureSummary {
    pub total_services: usize,
    /// Distinct critical kinds, first-seen order
    pub critical_services: Vec<ServiceKind>,
    pub data_classification: DataClassification,
    pub network_complexity: NetworkComplexity,
    /// Groups of components with no connection between them
    pub clusters: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub executive_summary: ExecutiveSummary,
    pub remediation_roadmap: RemediationRoadmap,
    pub architecture_summary: ArchitectureSummary,
}

pub fn assess(graph: &DiagramGraph, report: &SecurityReport) -> Assessment {
    Assessment {
        executive_summary: executive_summary(report),
        remediation_roadmap: remediation_roadmap(report),
        architecture_summary: architecture_summary(graph),
    }
}

pub fn executive_summary(report: &SecurityReport) -> ExecutiveSummary {
    let high_findings = report.count(Severity::High);
    let compliance_status = match high_findings {
        0 => ComplianceStatus::GenerallyCompliant,
        n if n > NON_COMPLIANT_HIGH_FINDINGS => ComplianceStatus::NonCompliant,
        _ => ComplianceStatus::PartiallyCompliant,
    };

    // urgent fixes first, topped up with the standing actions
    let mut priority_actions: Vec<String> = Vec::new();
    let urgent = report
        .findings
        .iter()
        .filter(|f| f.severity == Severity::High)
        .map(|f| f.recommendation.as_str());
    for action in urgent.chain(DEFAULT_PRIORITY_ACTIONS.iter().copied()) {
        if priority_actions.len() == MAX_PRIORITY_ACTIONS {
            break;
        }
        if !priority_actions.iter().any(|a| a == action) {
            priority_actions.push(action.to_string());
        }
    }

    ExecutiveSummary {
        posture: report.posture().to_string(),
        high_findings,
        medium_findings: report.count(Severity::Medium),
        low_findings: report.count(Severity::Low),
        compliance_status,
        priority_actions,
    }
}

pub fn remediation_roadmap(report: &SecurityReport) -> RemediationRoadmap {
    let mut roadmap = RemediationRoadmap::default();

    for finding in &report.findings {
        let (bucket, impact) = match finding.severity {
            Severity::High => (&mut roadmap.immediate, Impact::High),
            Severity::Medium => (&mut roadmap.short_term, Impact::Medium),
            Severity::Low => (&mut roadmap.long_term, Impact::Medium),
        };
        bucket.push(RemediationAction {
            action: finding.recommendation.clone(),
            component: finding.component.clone(),
            impact,
        });
    }

    roadmap
}

pub fn architecture_summary(graph: &DiagramGraph) -> ArchitectureSummary {
    let summary = graph.summary();
    if summary.node_count == 0 {
        return ArchitectureSummary {
            total_services: 0,
            critical_services: Vec::new(),
            data_classification: DataClassification::Unknown,
            network_complexity: NetworkComplexity::Unknown,
            clusters: 0,
        };
    }

    let critical_services = summary
        .kinds
        .iter()
        .map(|k| k.kind)
        .filter(|kind| CRITICAL_KINDS.contains(kind))
        .collect();

    let data_classification = if DATA_STORE_KINDS.iter().any(|k| graph.has_kind(*k)) {
        DataClassification::Confidential
    } else {
        DataClassification::PublicInternal
    };

    let network_complexity = match summary.edge_count {
        n if n <= LOW_COMPLEXITY_MAX_EDGES => NetworkComplexity::Low,
        n if n <= MEDIUM_COMPLEXITY_MAX_EDGES => NetworkComplexity::Medium,
        _ => NetworkComplexity::High,
    };

    ArchitectureSummary {
        total_services: summary.node_count,
        critical_services,
        data_classification,
        network_complexity,
        clusters: graph.cluster_count(),
    }
}
