use axum::extract::{Path, State};
use axum::Json;

use super::error::ApiError;
use super::session::AuthenticatedUser;
use crate::db::models::StyleFeatureRecord;
use crate::state::AppState;

/// Most recent analysis of an owned reference image.
pub async fn latest_style_features_handler(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(reference_image_id): Path<String>,
) -> Result<Json<StyleFeatureRecord>, ApiError> {
    let image = state
        .db
        .fetch_reference_image(&reference_image_id, &user.user_id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::ReferenceImageNotFound)?;

    let record = state
        .db
        .latest_style_feature(&image.id)
        .await
        .map_err(ApiError::Internal)?
        .ok_or(ApiError::StyleFeaturesNotFound)?;

    Ok(Json(record))
}
