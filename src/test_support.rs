use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::analysis::{RawAnalysis, StyleAnalyzer};
use crate::db::database::Database;
use crate::db::models::{ReferenceImageInsert, ReferenceImageRow};
use crate::state::AppState;
use crate::style::RawAnalysisResult;

pub struct MockAnalyzer {
    response: Option<RawAnalysis>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockAnalyzer {
    fn build(fields: [&str; 6], delay: Option<Duration>) -> Self {
        let fields = RawAnalysisResult {
            camera_distance: Some(fields[0].to_string()),
            camera_angle: Some(fields[1].to_string()),
            crop_type: Some(fields[2].to_string()),
            light_type: Some(fields[3].to_string()),
            tone_level: Some(fields[4].to_string()),
            background_type: Some(fields[5].to_string()),
        };
        let raw_output = serde_json::json!({
            "camera_distance": fields.camera_distance,
            "camera_angle": fields.camera_angle,
            "crop_type": fields.crop_type,
            "light_type": fields.light_type,
            "tone_level": fields.tone_level,
            "background_type": fields.background_type,
        })
        .to_string();
        MockAnalyzer {
            response: Some(RawAnalysis { fields, raw_output }),
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(fields: [&str; 6]) -> Arc<Self> {
        Arc::new(Self::build(fields, None))
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(MockAnalyzer {
            response: None,
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(fields: [&str; 6], delay: Duration) -> Arc<Self> {
        Arc::new(Self::build(fields, Some(delay)))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StyleAnalyzer for MockAnalyzer {
    async fn analyze(&self, _image_url: &str) -> Option<RawAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.response.clone()
    }
}

pub async fn test_state(analyzer: Arc<MockAnalyzer>, timeout: Option<Duration>) -> AppState {
    let db = Database::init("sqlite::memory:").await.expect("memory db");
    AppState::new(db, analyzer, timeout, "session_token")
}

pub async fn reference_image(state: &AppState, user_id: &str) -> ReferenceImageRow {
    state
        .db
        .insert_reference_image(ReferenceImageInsert {
            user_id: user_id.to_string(),
            image_url: format!("https://storage.example.com/reference-images/{user_id}/look.jpg"),
            file_name: "look.jpg".to_string(),
            file_size: 4096,
        })
        .await
        .expect("insert reference image")
}
