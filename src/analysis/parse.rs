use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::style::RawAnalysisResult;

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("valid fence regex"));

/// Removes a leading ``` / ```json fence line and a trailing ``` when the
/// text opens with a fence. The closing fence is optional.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let body = OPENING_FENCE
        .find(trimmed)
        .map(|opening| &trimmed[opening.end()..])
        .unwrap_or(trimmed);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parses model text into raw fields. `None` means the text held no JSON object.
pub fn parse_analysis_text(text: &str) -> Option<RawAnalysisResult> {
    let body = strip_code_fence(text);
    let value: Value = serde_json::from_str(body).ok()?;
    RawAnalysisResult::from_json(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let text = "```json\n{\"camera_angle\": \"side\"}\n```";
        assert_eq!(strip_code_fence(text), "{\"camera_angle\": \"side\"}");
    }

    #[test]
    fn strips_bare_fence_and_whitespace() {
        let text = "  ```\n{\"tone_level\": \"warm\"}```  \n";
        assert_eq!(strip_code_fence(text), "{\"tone_level\": \"warm\"}");
    }

    #[test]
    fn leaves_plain_json_alone() {
        assert_eq!(strip_code_fence(" {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn parses_fenced_object() {
        let text = "```json\n{\n  \"camera_distance\": \"far\",\n  \"light_type\": \"dramatic\"\n}\n```";
        let raw = parse_analysis_text(text).unwrap();
        assert_eq!(raw.camera_distance.as_deref(), Some("far"));
        assert_eq!(raw.light_type.as_deref(), Some("dramatic"));
        assert_eq!(raw.background_type, None);
    }

    #[test]
    fn unclosed_fence_still_parses() {
        let text = "```json\n{\"camera_angle\": \"side\", \"tone_level\": \"cool\"}\n";
        assert_eq!(
            strip_code_fence(text),
            "{\"camera_angle\": \"side\", \"tone_level\": \"cool\"}"
        );
        let raw = parse_analysis_text(text).unwrap();
        assert_eq!(raw.camera_angle.as_deref(), Some("side"));
        assert_eq!(raw.tone_level.as_deref(), Some("cool"));
    }

    #[test]
    fn single_line_fence_is_stripped() {
        assert_eq!(
            strip_code_fence("```{\"crop_type\": \"full_body\"}```"),
            "{\"crop_type\": \"full_body\"}"
        );
    }

    #[test]
    fn prose_and_arrays_are_failures() {
        assert!(parse_analysis_text("Sure! Here is the analysis you asked for.").is_none());
        assert!(parse_analysis_text("[\"front\"]").is_none());
        assert!(parse_analysis_text("").is_none());
    }
}
