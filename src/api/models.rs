use crate::diagram::{
    assessment::{ArchitectureSummary, ExecutiveSummary, RemediationRoadmap},
    GraphSummary, SecurityFinding,
};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub file_name: String,
    pub xml_content: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub description: String,
    pub results: AnalysisResults,
    pub metadata: AnalysisMetadata,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResults {
    pub overall_score: f64,
    pub security: SecurityAnalysis,
    pub executive_summary: ExecutiveSummary,
    pub remediation_roadmap: RemediationRoadmap,
    pub architecture_summary: ArchitectureSummary,
}

#[derive(Debug, Serialize)]
pub struct SecurityAnalysis {
    pub score: f64,
    pub posture: String,
    pub issues: Vec<SecurityFinding>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisMetadata {
    pub file_name: String,
    pub title: String,
    pub node_count: usize,
    pub edge_count: usize,
    /// Per-kind component counts
    pub components: GraphSummary,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub code: Option<String>,
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
}

impl ApiError {
    fn with_status(status: StatusCode, message: &str) -> Self {
        Self {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: message.to_string(),
            code: Some(status.as_u16().to_string()),
            request_id: None,
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }

    pub fn payload_too_large(message: &str) -> Self {
        Self::with_status(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn unprocessable_entity(message: &str) -> Self {
        Self::with_status(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}
