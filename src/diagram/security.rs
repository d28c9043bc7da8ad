//! Heuristic security review of a diagram graph
//! Scores the drawn architecture and lists findings from label and kind rules.
//! The output is guidance derived from the drawing, not a scan of live infrastructure.

use crate::diagram::graph::{DiagramGraph, DiagramNode};
use crate::diagram::taxonomy::ServiceKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Score for a diagram with no recognised components
pub const EMPTY_DIAGRAM_SCORE: f64 = 1.0;
/// Score for a diagram too small to judge
pub const SPARSE_DIAGRAM_SCORE: f64 = 3.0;
/// Largest component count still treated as sparse
pub const SPARSE_COMPONENT_LIMIT: usize = 2;

const BASE_SCORE: f64 = 8.0;
const PUBLIC_PENALTY: f64 = 0.5;
const MAX_PUBLIC_PENALTY: f64 = 2.0;
const UNENCRYPTED_PENALTY: f64 = 0.3;
const MAX_UNENCRYPTED_PENALTY: f64 = 1.5;
const SECURITY_KIND_BONUS: f64 = 0.2;
const MAX_SECURITY_KIND_BONUS: f64 = 1.0;

pub const MAX_RECOMMENDATIONS: usize = 6;

const PUBLIC_MARKERS: &[&str] = &["public", "internet", "external"];
const PROTECTED_STORAGE_MARKERS: &[&str] = &["private", "encrypted"];

/// Finding urgency. Sorts most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityFinding {
    pub severity: Severity,
    /// Offending node label, or the area of the architecture concerned
    pub component: String,
    pub issue: String,
    pub recommendation: String,
    pub service: Option<String>,
}

impl SecurityFinding {
    fn new(
        severity: Severity,
        component: &str,
        issue: &str,
        recommendation: &str,
        service: Option<&str>,
    ) -> Self {
        Self {
            severity,
            component: component.to_string(),
            issue: issue.to_string(),
            recommendation: recommendation.to_string(),
            service: service.map(str::to_string),
        }
    }
}

/// Result of the heuristic review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    /// 0 to 10, higher is better
    pub score: f64,
    pub findings: Vec<SecurityFinding>,
    pub recommendations: Vec<String>,
}

impl SecurityReport {
    /// Verbal band for the score
    pub fn posture(&self) -> &'static str {
        match self.score {
            s if s >= 9.0 => "Excellent - well-secured architecture",
            s if s >= 7.0 => "Good - minor improvements needed",
            s if s >= 5.0 => "Moderate - requires attention",
            s if s >= 3.0 => "Poor - significant issues identified",
            _ => "Critical - immediate action required",
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }
}

/// Graph condition under which a rule fires
#[derive(Debug)]
enum Trigger {
    /// Any of the kinds is present
    AnyOf(&'static [ServiceKind]),
    /// The kind is nowhere in the graph
    Missing(ServiceKind),
    /// Any of the kinds is present while the other kind is missing
    AnyOfWithout(&'static [ServiceKind], ServiceKind),
    /// The graph has connections but the kind is missing
    ConnectedWithout(ServiceKind),
}

impl Trigger {
    fn fires(&self, graph: &DiagramGraph) -> bool {
        let any_of = |kinds: &[ServiceKind]| kinds.iter().any(|k| graph.has_kind(*k));
        match self {
            Trigger::AnyOf(kinds) => any_of(*kinds),
            Trigger::Missing(kind) => !graph.has_kind(*kind),
            Trigger::AnyOfWithout(kinds, missing) => any_of(*kinds) && !graph.has_kind(*missing),
            Trigger::ConnectedWithout(missing) => {
                !graph.edges.is_empty() && !graph.has_kind(*missing)
            }
        }
    }
}

#[derive(Debug)]
struct FindingRule {
    trigger: Trigger,
    severity: Severity,
    component: &'static str,
    issue: &'static str,
    recommendation: &'static str,
    service: &'static str,
}

/// Kind-level rules. Each one is checked on its own; several can fire together.
const FINDING_RULES: &[FindingRule] = &[
    FindingRule {
        trigger: Trigger::AnyOf(&[ServiceKind::LoadBalancer]),
        severity: Severity::Medium,
        component: "Application Load Balancer",
        issue: "Load balancer should enforce HTTPS and implement proper security headers",
        recommendation: "Configure SSL/TLS termination, enable security headers, and implement WAF",
        service: "ALB",
    },
    FindingRule {
        trigger: Trigger::AnyOf(&[ServiceKind::Compute]),
        severity: Severity::High,
        component: "EC2 Instances",
        issue: "EC2 instances may lack proper security group configuration and access controls",
        recommendation: "Implement least privilege security groups, enable Systems Manager Session Manager, and ensure regular patching",
        service: "EC2",
    },
    FindingRule {
        trigger: Trigger::AnyOf(&[ServiceKind::FunctionCompute]),
        severity: Severity::Medium,
        component: "Lambda Functions",
        issue: "Function execution roles may grant broader permissions than required",
        recommendation: "Scope each execution role to the resources the function uses and enable function-level monitoring",
        service: "Lambda",
    },
    FindingRule {
        trigger: Trigger::AnyOf(&[ServiceKind::RelationalDb, ServiceKind::DocumentDb]),
        severity: Severity::Medium,
        component: "Database Services",
        issue: "Database security configuration should be reviewed",
        recommendation: "Enable encryption at rest and in transit, implement proper backup strategy, and configure security groups",
        service: "RDS/DynamoDB",
    },
    FindingRule {
        trigger: Trigger::AnyOf(&[ServiceKind::StorageObject]),
        severity: Severity::Medium,
        component: "S3 Storage",
        issue: "S3 bucket security and access policies need review",
        recommendation: "Implement bucket policies, enable versioning, configure access logging, and ensure encryption",
        service: "S3",
    },
    FindingRule {
        trigger: Trigger::AnyOfWithout(
            &[ServiceKind::ApiGateway, ServiceKind::LoadBalancer],
            ServiceKind::EdgeFirewall,
        ),
        severity: Severity::Low,
        component: "Web Services",
        issue: "Web-facing services without WAF protection",
        recommendation: "Consider implementing AWS WAF for web application protection",
        service: "WAF",
    },
    FindingRule {
        trigger: Trigger::Missing(ServiceKind::Identity),
        severity: Severity::Medium,
        component: "Architecture",
        issue: "No IAM service explicitly shown in diagram",
        recommendation: "Ensure proper IAM roles and policies are configured for all services",
        service: "IAM",
    },
    FindingRule {
        trigger: Trigger::Missing(ServiceKind::Monitoring),
        severity: Severity::Low,
        component: "Observability",
        issue: "No monitoring or audit logging service shown in diagram",
        recommendation: "Enable AWS CloudTrail and CloudWatch for audit logging and alerting",
        service: "CloudWatch",
    },
    FindingRule {
        trigger: Trigger::ConnectedWithout(ServiceKind::NetworkIsolation),
        severity: Severity::Low,
        component: "Network Architecture",
        issue: "Network security and segmentation should be reviewed",
        recommendation: "Implement proper VPC design, security groups, and NACLs",
        service: "VPC",
    },
];

const BASELINE_RECOMMENDATIONS: &[&str] = &[
    "Implement AWS WAF for application-layer protection",
    "Enable AWS CloudTrail for comprehensive audit logging",
    "Configure VPC Flow Logs for network monitoring",
    "Use AWS Config for compliance monitoring and drift detection",
];

/// Extra recommendations appended after the baseline, in this order
const EXTRA_RECOMMENDATIONS: &[(Trigger, &str)] = &[
    (
        Trigger::AnyOf(&[ServiceKind::RelationalDb, ServiceKind::DocumentDb]),
        "Enable automated database backups and point-in-time recovery",
    ),
    (
        Trigger::AnyOf(&[ServiceKind::StorageObject]),
        "Implement S3 bucket lifecycle policies and cross-region replication",
    ),
    (
        Trigger::AnyOf(&[ServiceKind::LoadBalancer]),
        "Configure load balancer access logs and implement health checks",
    ),
    (
        Trigger::AnyOf(&[ServiceKind::Compute]),
        "Use AWS Systems Manager for secure instance management",
    ),
    (
        Trigger::AnyOf(&[ServiceKind::ApiGateway]),
        "Enable API Gateway throttling and request validation",
    ),
];

const EMPTY_DIAGRAM_RECOMMENDATIONS: &[&str] = &[
    "Include AWS service icons or clear service names in your diagram",
    "Add connections between services to show data flow",
    "Consider using AWS architecture icons for better recognition",
    "Review AWS Well-Architected Framework for architecture guidance",
];

const SPARSE_DIAGRAM_RECOMMENDATIONS: &[&str] = &[
    "Add more AWS services to represent complete architecture",
    "Include security services (IAM, VPC, Security Groups)",
    "Show connections between services",
    "Consider adding monitoring and logging services",
];

/// Review a diagram graph. Never fails; small graphs get fixed guidance instead of a score.
pub fn analyze(graph: &DiagramGraph) -> SecurityReport {
    let report = match graph.nodes.len() {
        0 => empty_diagram_report(),
        n if n <= SPARSE_COMPONENT_LIMIT => sparse_diagram_report(graph),
        _ => full_report(graph),
    };

    debug!(
        "Security review scored {:.1} with {} findings",
        report.score,
        report.findings.len()
    );

    report
}

fn empty_diagram_report() -> SecurityReport {
    SecurityReport {
        score: EMPTY_DIAGRAM_SCORE,
        findings: vec![
            SecurityFinding::new(
                Severity::High,
                "Architecture",
                "No AWS services detected in diagram",
                "Add AWS services with proper labels (e.g., 'EC2 Instance', 'S3 Bucket', 'RDS Database')",
                Some("General"),
            ),
            SecurityFinding::new(
                Severity::Medium,
                "Diagram Detail",
                "Diagram does not contain enough detail for a security assessment",
                "Label each component with its service name and draw the connections between them",
                Some("General"),
            ),
        ],
        recommendations: to_strings(EMPTY_DIAGRAM_RECOMMENDATIONS),
    }
}

fn sparse_diagram_report(graph: &DiagramGraph) -> SecurityReport {
    let mut findings = vec![SecurityFinding::new(
        Severity::Medium,
        "Architecture Completeness",
        "Limited services detected - may not represent complete architecture",
        "Consider adding security services like IAM, VPC, CloudWatch for comprehensive analysis",
        Some("Architecture"),
    )];

    if !graph.has_internal_edges() {
        findings.push(SecurityFinding::new(
            Severity::Medium,
            "Service Connections",
            "No connections drawn between the detected services",
            "Connect the services to show how requests and data flow between them",
            Some("Architecture"),
        ));
    }

    SecurityReport {
        score: SPARSE_DIAGRAM_SCORE,
        findings,
        recommendations: to_strings(SPARSE_DIAGRAM_RECOMMENDATIONS),
    }
}

fn full_report(graph: &DiagramGraph) -> SecurityReport {
    let public: Vec<&DiagramNode> = graph.nodes.iter().filter(|n| is_public(n)).collect();
    let unencrypted: Vec<&DiagramNode> = graph
        .nodes
        .iter()
        .filter(|n| is_unprotected_storage(n))
        .collect();

    let mut findings: Vec<SecurityFinding> = public
        .iter()
        .map(|node| {
            SecurityFinding::new(
                Severity::High,
                &node.label,
                "Service appears to be publicly accessible",
                "Review public access requirements and implement appropriate security controls",
                Some(node.kind.service_tag()),
            )
        })
        .collect();

    findings.extend(unencrypted.iter().map(|node| {
        SecurityFinding::new(
            Severity::Medium,
            &node.label,
            "Service may not have encryption configured",
            "Enable encryption at rest and in transit for all data stores",
            Some(node.kind.service_tag()),
        )
    }));

    findings.extend(
        FINDING_RULES
            .iter()
            .filter(|rule| rule.trigger.fires(graph))
            .map(|rule| {
                SecurityFinding::new(
                    rule.severity,
                    rule.component,
                    rule.issue,
                    rule.recommendation,
                    Some(rule.service),
                )
            }),
    );

    if findings.is_empty() {
        findings.push(SecurityFinding::new(
            Severity::Low,
            "General Architecture",
            "Architecture requires comprehensive security review",
            "Implement AWS security best practices and enable comprehensive monitoring",
            Some("General"),
        ));
    }

    SecurityReport {
        score: score(graph, public.len(), unencrypted.len()),
        findings,
        recommendations: recommendations(graph),
    }
}

/// Point model: start high, deduct for exposure and unprotected storage, credit security kinds
fn score(graph: &DiagramGraph, public: usize, unencrypted: usize) -> f64 {
    let security_kinds: HashSet<ServiceKind> = graph
        .nodes
        .iter()
        .filter(|n| n.security_relevant)
        .map(|n| n.kind)
        .collect();

    let mut score = BASE_SCORE;
    score -= (public as f64 * PUBLIC_PENALTY).min(MAX_PUBLIC_PENALTY);
    score -= (unencrypted as f64 * UNENCRYPTED_PENALTY).min(MAX_UNENCRYPTED_PENALTY);
    score += (security_kinds.len() as f64 * SECURITY_KIND_BONUS).min(MAX_SECURITY_KIND_BONUS);

    round_score(score.clamp(0.0, 10.0))
}

fn recommendations(graph: &DiagramGraph) -> Vec<String> {
    BASELINE_RECOMMENDATIONS
        .iter()
        .copied()
        .chain(
            EXTRA_RECOMMENDATIONS
                .iter()
                .filter(|(trigger, _)| trigger.fires(graph))
                .map(|(_, text)| *text),
        )
        .take(MAX_RECOMMENDATIONS)
        .map(str::to_string)
        .collect()
}

fn is_public(node: &DiagramNode) -> bool {
    let label = node.label.to_lowercase();
    PUBLIC_MARKERS.iter().any(|m| label.contains(m))
}

fn is_unprotected_storage(node: &DiagramNode) -> bool {
    if node.kind != ServiceKind::StorageObject {
        return false;
    }
    let label = node.label.to_lowercase();
    !PROTECTED_STORAGE_MARKERS.iter().any(|m| label.contains(m))
}

/// Two decimals, so accumulated float error never shows up in reports
fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
