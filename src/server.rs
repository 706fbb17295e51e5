use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::handlers::analyze_reference::analyze_reference_handler;
use crate::handlers::style_features::latest_style_features_handler;
use crate::state::AppState;

async fn health(State(state): State<AppState>) -> Response {
    match state.db.health_check().await {
        Ok(()) => Json(json!({ "status": "ok" })).into_response(),
        Err(err) => {
            warn!("Health check failed: {err:#}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/analyze-reference", post(analyze_reference_handler))
        .route(
            "/api/reference-images/{id}/style-features",
            get(latest_style_features_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

pub async fn serve(state: AppState, bind_address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{reference_image, test_state, MockAnalyzer};
    use axum::body::Body;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    const STUDIO_LOOK: [&str; 6] = ["close", "diagonal", "product_only", "studio", "bright", "white"];

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    fn analyze_request(token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/analyze-reference")
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn missing_session_is_unauthorized() {
        let analyzer = MockAnalyzer::returning(STUDIO_LOOK);
        let state = test_state(analyzer.clone(), None).await;
        let image = reference_image(&state, "user-a").await;

        let (status, body) = send(
            build_router(state),
            analyze_request(None, json!({ "reference_image_id": image.id })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "인증이 필요합니다.");
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_session_is_unauthorized() {
        let analyzer = MockAnalyzer::returning(STUDIO_LOOK);
        let state = test_state(analyzer.clone(), None).await;

        let (status, _) = send(
            build_router(state),
            analyze_request(Some("forged"), json!({ "reference_image_id": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn bearer_session_analyzes_owned_image() {
        let analyzer = MockAnalyzer::returning(STUDIO_LOOK);
        let state = test_state(analyzer.clone(), None).await;
        let image = reference_image(&state, "user-a").await;
        let token = state.db.create_session("user-a", Some(1)).await.unwrap();

        let (status, body) = send(
            build_router(state),
            analyze_request(Some(&token), json!({ "reference_image_id": image.id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["display_tags"], json!(["밝은 톤", "대각선 컷", "스튜디오 조명"]));
        assert_eq!(body["analysis"]["crop_type"], "product_only");
        assert!(body["style_feature_id"].as_str().is_some());
        assert_eq!(analyzer.calls(), 1);
    }

    #[tokio::test]
    async fn foreign_image_is_not_found() {
        let analyzer = MockAnalyzer::returning(STUDIO_LOOK);
        let state = test_state(analyzer.clone(), None).await;
        let image = reference_image(&state, "user-b").await;
        let token = state.db.create_session("user-a", None).await.unwrap();

        let (status, body) = send(
            build_router(state),
            analyze_request(Some(&token), json!({ "reference_image_id": image.id })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "레퍼런스 이미지를 찾을 수 없습니다.");
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn blank_reference_id_is_a_bad_request() {
        let analyzer = MockAnalyzer::returning(STUDIO_LOOK);
        let state = test_state(analyzer.clone(), None).await;
        let token = state.db.create_session("user-a", None).await.unwrap();

        let (status, body) = send(
            build_router(state.clone()),
            analyze_request(Some(&token), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "reference_image_id가 필요합니다.");

        let (status, _) = send(
            build_router(state),
            analyze_request(Some(&token), json!({ "reference_image_id": "  " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn persistence_failure_returns_server_error() {
        let analyzer = MockAnalyzer::returning(STUDIO_LOOK);
        let state = test_state(analyzer, None).await;
        let image = reference_image(&state, "user-a").await;
        let token = state.db.create_session("user-a", None).await.unwrap();
        sqlx::query("DROP TABLE reference_style_features")
            .execute(state.db.pool())
            .await
            .unwrap();

        let (status, body) = send(
            build_router(state),
            analyze_request(Some(&token), json!({ "reference_image_id": image.id })),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "분석 결과를 저장하지 못했습니다.");
    }

    #[tokio::test]
    async fn latest_style_features_follow_analysis() {
        let analyzer = MockAnalyzer::unavailable();
        let state = test_state(analyzer, None).await;
        let image = reference_image(&state, "user-a").await;
        let token = state.db.create_session("user-a", None).await.unwrap();
        let uri = format!("/api/reference-images/{}/style-features", image.id);
        let cookie = format!("session_token={token}");

        let read = |uri: &str, cookie: &str| {
            Request::builder()
                .uri(uri)
                .header(COOKIE, cookie)
                .body(Body::empty())
                .unwrap()
        };

        let (status, _) = send(build_router(state.clone()), read(&uri, &cookie)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            build_router(state.clone()),
            analyze_request(Some(&token), json!({ "reference_image_id": image.id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(build_router(state.clone()), read(&uri, &cookie)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reference_image_id"], image.id.as_str());
        assert_eq!(body["display_tags"], json!(["내추럴 톤", "정면 컷"]));
        assert_eq!(body["analysis"]["background_type"], "white");
        assert_eq!(body["labels"]["background_type"], "화이트 배경");
        assert_eq!(body["labels"]["camera_distance"], "미디엄샷");
        assert_eq!(body["labels"]["crop_type"], "상반신 컷");
        assert!(body.get("raw_analysis").is_none());

        let other_token = state.db.create_session("user-b", None).await.unwrap();
        let (status, _) = send(
            build_router(state),
            read(&uri, &format!("session_token={other_token}")),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let state = test_state(MockAnalyzer::unavailable(), None).await;
        let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let (status, body) = send(build_router(state), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
