use super::normalize::StyleAnalysis;
use super::vocabulary::LightType;

/// Tone label, then angle label, then a lighting label for studio or
/// dramatic light only. Always two or three entries.
pub fn display_tags(analysis: &StyleAnalysis) -> Vec<String> {
    let mut tags = Vec::with_capacity(3);
    tags.push(analysis.tone_level.display_label().to_string());
    tags.push(analysis.camera_angle.display_label().to_string());

    match analysis.light_type {
        LightType::Studio | LightType::Dramatic => {
            tags.push(analysis.light_type.display_label().to_string());
        }
        LightType::Natural | LightType::Soft => {}
    }

    tags
}
