use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("인증이 필요합니다.")]
    Unauthenticated,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("레퍼런스 이미지를 찾을 수 없습니다.")]
    ReferenceImageNotFound,
    #[error("스타일 분석 결과가 없습니다.")]
    StyleFeaturesNotFound,
    #[error("분석 결과를 저장하지 못했습니다.")]
    Persistence(anyhow::Error),
    #[error("분석 중 오류가 발생했습니다.")]
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ReferenceImageNotFound | ApiError::StyleFeaturesNotFound => {
                StatusCode::NOT_FOUND
            }
            ApiError::Persistence(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Persistence(err) => error!("Style feature insert failed: {err:#}"),
            ApiError::Internal(err) => error!("Request failed: {err:#}"),
            _ => {}
        }
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::InvalidRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::ReferenceImageNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Persistence(anyhow!("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_stay_out_of_the_message() {
        let err = ApiError::Persistence(anyhow!("UNIQUE constraint failed"));
        assert_eq!(err.to_string(), "분석 결과를 저장하지 못했습니다.");
    }
}
