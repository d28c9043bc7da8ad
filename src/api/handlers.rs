use crate::{
    api::models::{
        AnalysisMetadata, AnalysisResults, AnalyzeRequest, AnalyzeResponse, ApiError,
        HealthResponse, SecurityAnalysis,
    },
    config::ServerConfig,
    diagram,
};
use axum::{extract::State, http::StatusCode, response::Json};
use tracing::{error, info, warn};

type HandlerError = (StatusCode, Json<ApiError>);

pub async fn analyze_handler(
    State(config): State<ServerConfig>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, HandlerError> {
    info!("Processing analysis request: {}", request.file_name);

    if request.xml_content.trim().is_empty() {
        warn!("Rejecting empty document for {}", request.file_name);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request("xml_content must not be empty")),
        ));
    }

    if request.xml_content.len() > config.max_document_bytes {
        warn!(
            "Rejecting {} byte document for {}",
            request.xml_content.len(),
            request.file_name
        );
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ApiError::payload_too_large(&format!(
                "Document exceeds the {} byte limit",
                config.max_document_bytes
            ))),
        ));
    }

    let analysis = diagram::analyze_document(&request.xml_content).map_err(|e| {
        error!("Failed to parse diagram {}: {}", request.file_name, e);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiError::unprocessable_entity(&format!(
                "Failed to parse diagram: {}",
                e
            ))),
        )
    })?;

    info!(
        "Analyzed {} components and {} connections, security score {}",
        analysis.graph.nodes.len(),
        analysis.graph.edges.len(),
        analysis.security.score
    );

    let score = analysis.security.score;
    let posture = analysis.security.posture().to_string();
    let components = analysis.graph.summary();
    let assessment = analysis.assessment;

    Ok(Json(AnalyzeResponse {
        description: analysis.description.to_text(),
        results: AnalysisResults {
            overall_score: score,
            security: SecurityAnalysis {
                score,
                posture,
                issues: analysis.security.findings,
                recommendations: analysis.security.recommendations,
            },
            executive_summary: assessment.executive_summary,
            remediation_roadmap: assessment.remediation_roadmap,
            architecture_summary: assessment.architecture_summary,
        },
        metadata: AnalysisMetadata {
            file_name: request.file_name,
            title: analysis.graph.title,
            node_count: components.node_count,
            edge_count: components.edge_count,
            components,
            generated_at: chrono::Utc::now().to_rfc3339(),
        },
    }))
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
