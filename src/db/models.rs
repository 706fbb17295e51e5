use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::style::{normalize, RawAnalysisResult, StyleAnalysis, StyleLabels};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReferenceImageRow {
    pub id: String,
    pub user_id: String,
    pub image_url: String,
    pub file_name: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ReferenceImageInsert {
    pub user_id: String,
    pub image_url: String,
    pub file_name: String,
    pub file_size: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct StyleFeatureRow {
    pub id: String,
    pub reference_image_id: String,
    pub camera_distance: String,
    pub camera_angle: String,
    pub crop_type: String,
    pub light_type: String,
    pub tone_level: String,
    pub background_type: String,
    pub display_tags: String,
    pub raw_analysis: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StyleFeatureInsert {
    pub reference_image_id: String,
    pub analysis: StyleAnalysis,
    pub display_tags: Vec<String>,
    pub raw_analysis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleFeatureRecord {
    pub id: String,
    pub reference_image_id: String,
    pub analysis: StyleAnalysis,
    pub labels: StyleLabels,
    pub display_tags: Vec<String>,
    #[serde(skip)]
    pub raw_analysis: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StyleFeatureRow {
    pub fn into_record(self) -> Result<StyleFeatureRecord> {
        let display_tags: Vec<String> = serde_json::from_str(&self.display_tags)
            .with_context(|| format!("Corrupt display_tags on style feature {}", self.id))?;
        let stored = RawAnalysisResult {
            camera_distance: Some(self.camera_distance),
            camera_angle: Some(self.camera_angle),
            crop_type: Some(self.crop_type),
            light_type: Some(self.light_type),
            tone_level: Some(self.tone_level),
            background_type: Some(self.background_type),
        };

        let analysis = normalize(Some(&stored));
        Ok(StyleFeatureRecord {
            id: self.id,
            reference_image_id: self.reference_image_id,
            analysis,
            labels: analysis.labels(),
            display_tags,
            raw_analysis: self.raw_analysis,
            created_at: self.created_at,
        })
    }
}
