use crate::style::vocabulary::{
    BackgroundType, CameraAngle, CameraDistance, CropType, LightType, ToneLevel,
};
use crate::style::StyleAnalysis;

fn category_block(field: &str, tokens: &[(&str, &str)]) -> String {
    let choices = tokens
        .iter()
        .map(|(token, _)| format!("\"{token}\""))
        .collect::<Vec<_>>()
        .join(" | ");
    let mut block = format!("- {field}: {choices}\n");
    for (token, meaning) in tokens {
        block.push_str(&format!("  * {token}: {meaning}\n"));
    }
    block
}

fn explained<T: Copy>(
    values: &[T],
    as_str: fn(T) -> &'static str,
    meaning: fn(T) -> &'static str,
) -> Vec<(&'static str, &'static str)> {
    values
        .iter()
        .map(|&value| (as_str(value), meaning(value)))
        .collect()
}

fn distance_meaning(value: CameraDistance) -> &'static str {
    match value {
        CameraDistance::Close => "close-up focused on product detail",
        CameraDistance::Medium => "medium shot, upper body or the whole product",
        CameraDistance::Far => "long shot, full body or a wide composition",
    }
}

fn angle_meaning(value: CameraAngle) -> &'static str {
    match value {
        CameraAngle::Front => "straight-on front view",
        CameraAngle::Side => "side profile",
        CameraAngle::Diagonal => "three-quarter diagonal view",
        CameraAngle::Top => "top-down view from above",
    }
}

fn crop_meaning(value: CropType) -> &'static str {
    match value {
        CropType::FullBody => "full-body framing",
        CropType::UpperBody => "upper-body framing",
        CropType::ProductOnly => "the product alone, no model",
    }
}

fn light_meaning(value: LightType) -> &'static str {
    match value {
        LightType::Natural => "natural daylight",
        LightType::Studio => "controlled studio lighting",
        LightType::Soft => "soft, diffused light",
        LightType::Dramatic => "high-contrast dramatic light",
    }
}

fn tone_meaning(value: ToneLevel) -> &'static str {
    match value {
        ToneLevel::Bright => "bright, high-key tone",
        ToneLevel::Natural => "neutral, natural tone",
        ToneLevel::Warm => "warm colour tone",
        ToneLevel::Cool => "cool colour tone",
        ToneLevel::Dark => "dark, low-key tone",
    }
}

fn background_meaning(value: BackgroundType) -> &'static str {
    match value {
        BackgroundType::White => "plain white background",
        BackgroundType::Gray => "plain gray background",
        BackgroundType::Lifestyle => "interior or everyday lifestyle setting",
        BackgroundType::Outdoor => "outdoor location",
        BackgroundType::Studio => "studio backdrop or set",
    }
}

/// Instruction sent alongside the image. Built from the vocabulary so the
/// allowed tokens can never drift from what normalization accepts.
pub fn build_analysis_prompt() -> String {
    let mut prompt = String::from(
        "Analyze this fashion photography image and extract style parameters.\n\
         Return ONLY valid JSON without any markdown formatting or explanation.\n\n\
         Focus on the photography style ONLY. Do NOT analyze faces, people, identity, or personal information.\n\n\
         Extract these parameters:\n",
    );

    prompt.push_str(&category_block(
        CameraDistance::FIELD,
        &explained(CameraDistance::ALL, CameraDistance::as_str, distance_meaning),
    ));
    prompt.push_str(&category_block(
        CameraAngle::FIELD,
        &explained(CameraAngle::ALL, CameraAngle::as_str, angle_meaning),
    ));
    prompt.push_str(&category_block(
        CropType::FIELD,
        &explained(CropType::ALL, CropType::as_str, crop_meaning),
    ));
    prompt.push_str(&category_block(
        LightType::FIELD,
        &explained(LightType::ALL, LightType::as_str, light_meaning),
    ));
    prompt.push_str(&category_block(
        ToneLevel::FIELD,
        &explained(ToneLevel::ALL, ToneLevel::as_str, tone_meaning),
    ));
    prompt.push_str(&category_block(
        BackgroundType::FIELD,
        &explained(BackgroundType::ALL, BackgroundType::as_str, background_meaning),
    ));

    let example = serde_json::to_string_pretty(&StyleAnalysis::default()).unwrap_or_default();
    prompt.push_str("\nReturn format (a single JSON object, nothing else):\n");
    prompt.push_str(&example);
    prompt.push('\n');
    prompt
}
