use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::ApiError;
use super::session::AuthenticatedUser;
use crate::analysis::RawAnalysis;
use crate::db::models::StyleFeatureInsert;
use crate::state::AppState;
use crate::style::{display_tags, normalize, StyleAnalysis};
use crate::utils::timing::{complete_request_timer, start_request_timer};

#[derive(Debug, Deserialize)]
pub struct AnalyzeReferenceRequest {
    #[serde(default)]
    pub reference_image_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeReferenceResponse {
    pub success: bool,
    pub style_feature_id: String,
    pub display_tags: Vec<String>,
    pub analysis: StyleAnalysis,
}

async fn analyze_with_deadline(state: &AppState, image_url: &str) -> Option<RawAnalysis> {
    let call = state.analyzer.analyze(image_url);
    match state.analysis_timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Reference analysis for {} exceeded {:?}; using default style values",
                    image_url, limit
                );
                None
            }
        },
        None => call.await,
    }
}

/// Ownership check, analysis, normalization, tagging and persistence for one
/// reference image. An unavailable analysis still succeeds with defaults;
/// only lookup and persistence failures are errors.
pub async fn run_reference_analysis(
    state: &AppState,
    user_id: &str,
    reference_image_id: &str,
) -> Result<AnalyzeReferenceResponse, ApiError> {
    let image = state
        .db
        .fetch_reference_image(reference_image_id, user_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::ReferenceImageNotFound)?;

    info!("Analyzing reference image {} ({})", image.id, image.image_url);
    let raw = analyze_with_deadline(state, &image.image_url).await;
    let analysis = normalize(raw.as_ref().map(|raw| &raw.fields));
    let tags = display_tags(&analysis);

    let record = state
        .db
        .insert_style_feature(StyleFeatureInsert {
            reference_image_id: image.id.clone(),
            analysis,
            display_tags: tags.clone(),
            raw_analysis: raw.map(|raw| raw.raw_output),
        })
        .await
        .map_err(ApiError::Persistence)?;

    info!("Reference image {} analyzed: {:?}", image.id, tags);

    Ok(AnalyzeReferenceResponse {
        success: true,
        style_feature_id: record.id,
        display_tags: tags,
        analysis,
    })
}

pub async fn analyze_reference_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<AnalyzeReferenceRequest>,
) -> Result<Json<AnalyzeReferenceResponse>, ApiError> {
    let reference_image_id = request
        .reference_image_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("reference_image_id가 필요합니다.".to_string()))?;

    let mut timer = start_request_timer(
        "analyze_reference",
        Some(&user.user_id),
        Some(&reference_image_id),
    );
    let result = run_reference_analysis(&state, &user.user_id, &reference_image_id).await;
    match &result {
        Ok(response) => complete_request_timer(
            &mut timer,
            "success",
            Some(response.display_tags.join(",")),
        ),
        Err(err) => complete_request_timer(&mut timer, "error", Some(err.to_string())),
    }

    result.map(Json)
}
