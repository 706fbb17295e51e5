use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::vocabulary::{
    BackgroundType, CameraAngle, CameraDistance, CropType, LightType, ToneLevel,
};

/// Fields as the model reported them. Nothing here has been checked
/// against the vocabulary yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAnalysisResult {
    pub camera_distance: Option<String>,
    pub camera_angle: Option<String>,
    pub crop_type: Option<String>,
    pub light_type: Option<String>,
    pub tone_level: Option<String>,
    pub background_type: Option<String>,
}

impl RawAnalysisResult {
    /// Reads each field independently from a JSON object. A non-string value
    /// only blanks its own field. Returns `None` when `value` is not an object.
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .map(|value| value.to_string())
        };

        Some(RawAnalysisResult {
            camera_distance: field(CameraDistance::FIELD),
            camera_angle: field(CameraAngle::FIELD),
            crop_type: field(CropType::FIELD),
            light_type: field(LightType::FIELD),
            tone_level: field(ToneLevel::FIELD),
            background_type: field(BackgroundType::FIELD),
        })
    }
}

/// Every field is a vocabulary member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleAnalysis {
    pub camera_distance: CameraDistance,
    pub camera_angle: CameraAngle,
    pub crop_type: CropType,
    pub light_type: LightType,
    pub tone_level: ToneLevel,
    pub background_type: BackgroundType,
}

/// Display labels for every category, in the same shape as [`StyleAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleLabels {
    pub camera_distance: &'static str,
    pub camera_angle: &'static str,
    pub crop_type: &'static str,
    pub light_type: &'static str,
    pub tone_level: &'static str,
    pub background_type: &'static str,
}

impl StyleAnalysis {
    pub fn labels(&self) -> StyleLabels {
        StyleLabels {
            camera_distance: self.camera_distance.display_label(),
            camera_angle: self.camera_angle.display_label(),
            crop_type: self.crop_type.display_label(),
            light_type: self.light_type.display_label(),
            tone_level: self.tone_level.display_label(),
            background_type: self.background_type.display_label(),
        }
    }
}

fn pick<T: Default>(raw: Option<&str>, lookup: fn(&str) -> Option<T>) -> T {
    raw.and_then(lookup).unwrap_or_default()
}

/// Total: `None` (the analysis produced nothing) yields the default table,
/// otherwise each field keeps its value only if it is in vocabulary.
pub fn normalize(raw: Option<&RawAnalysisResult>) -> StyleAnalysis {
    let Some(raw) = raw else {
        return StyleAnalysis::default();
    };

    StyleAnalysis {
        camera_distance: pick(raw.camera_distance.as_deref(), CameraDistance::from_token),
        camera_angle: pick(raw.camera_angle.as_deref(), CameraAngle::from_token),
        crop_type: pick(raw.crop_type.as_deref(), CropType::from_token),
        light_type: pick(raw.light_type.as_deref(), LightType::from_token),
        tone_level: pick(raw.tone_level.as_deref(), ToneLevel::from_token),
        background_type: pick(raw.background_type.as_deref(), BackgroundType::from_token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(values: [&str; 6]) -> RawAnalysisResult {
        RawAnalysisResult {
            camera_distance: Some(values[0].to_string()),
            camera_angle: Some(values[1].to_string()),
            crop_type: Some(values[2].to_string()),
            light_type: Some(values[3].to_string()),
            tone_level: Some(values[4].to_string()),
            background_type: Some(values[5].to_string()),
        }
    }

    #[test]
    fn total_failure_yields_default_table() {
        let analysis = normalize(None);
        assert_eq!(analysis.camera_distance, CameraDistance::Medium);
        assert_eq!(analysis.camera_angle, CameraAngle::Front);
        assert_eq!(analysis.crop_type, CropType::UpperBody);
        assert_eq!(analysis.light_type, LightType::Natural);
        assert_eq!(analysis.tone_level, ToneLevel::Natural);
        assert_eq!(analysis.background_type, BackgroundType::White);
    }

    #[test]
    fn empty_result_yields_default_table() {
        assert_eq!(
            normalize(Some(&RawAnalysisResult::default())),
            StyleAnalysis::default()
        );
    }

    #[test]
    fn out_of_vocabulary_angle_falls_back_alone() {
        let input = raw(["far", "diagonal-ish", "full_body", "dramatic", "cool", "outdoor"]);
        let analysis = normalize(Some(&input));
        assert_eq!(analysis.camera_angle, CameraAngle::Front);
        assert_eq!(analysis.camera_distance, CameraDistance::Far);
        assert_eq!(analysis.crop_type, CropType::FullBody);
        assert_eq!(analysis.light_type, LightType::Dramatic);
        assert_eq!(analysis.tone_level, ToneLevel::Cool);
        assert_eq!(analysis.background_type, BackgroundType::Outdoor);
    }

    #[test]
    fn valid_result_passes_through() {
        let input = raw(["close", "top", "product_only", "soft", "warm", "lifestyle"]);
        let analysis = normalize(Some(&input));
        assert_eq!(
            analysis,
            StyleAnalysis {
                camera_distance: CameraDistance::Close,
                camera_angle: CameraAngle::Top,
                crop_type: CropType::ProductOnly,
                light_type: LightType::Soft,
                tone_level: ToneLevel::Warm,
                background_type: BackgroundType::Lifestyle,
            }
        );
    }

    #[test]
    fn json_fields_are_read_independently() {
        let value = json!({
            "camera_distance": 3,
            "camera_angle": "side",
            "tone_level": null,
            "light_type": "studio",
            "extra": "ignored"
        });
        let parsed = RawAnalysisResult::from_json(&value).unwrap();
        assert_eq!(parsed.camera_distance, None);
        assert_eq!(parsed.camera_angle.as_deref(), Some("side"));
        assert_eq!(parsed.tone_level, None);
        assert_eq!(parsed.crop_type, None);

        let analysis = normalize(Some(&parsed));
        assert_eq!(analysis.camera_distance, CameraDistance::Medium);
        assert_eq!(analysis.camera_angle, CameraAngle::Side);
        assert_eq!(analysis.light_type, LightType::Studio);
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(RawAnalysisResult::from_json(&json!(["front"])).is_none());
        assert!(RawAnalysisResult::from_json(&json!("front")).is_none());
    }

    #[test]
    fn labels_follow_each_field() {
        let analysis =
            normalize(Some(&raw(["far", "top", "product_only", "soft", "dark", "outdoor"])));
        let labels = analysis.labels();
        assert_eq!(labels.camera_distance, "풀샷");
        assert_eq!(labels.camera_angle, "탑뷰 컷");
        assert_eq!(labels.crop_type, "제품 단독 컷");
        assert_eq!(labels.light_type, "부드러운 조명");
        assert_eq!(labels.tone_level, "다크 톤");
        assert_eq!(labels.background_type, "야외 배경");
    }

    #[test]
    fn serialized_shape_uses_snake_case_tokens() {
        let value = serde_json::to_value(StyleAnalysis::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "camera_distance": "medium",
                "camera_angle": "front",
                "crop_type": "upper_body",
                "light_type": "natural",
                "tone_level": "natural",
                "background_type": "white"
            })
        );
    }
}
