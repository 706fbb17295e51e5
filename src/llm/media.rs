use anyhow::{anyhow, Result};
use reqwest::header::CONTENT_TYPE;
use tracing::warn;

use crate::utils::http::get_http_client;

const MEDIA_DOWNLOAD_ERROR_BODY_LIMIT: usize = 800;
const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    if data.len() > 12 {
        let ftyp = &data[4..12];
        if ftyp.starts_with(b"ftyp") {
            let brand = &ftyp[4..8];
            if brand == b"heic" || brand == b"heif" || brand == b"hevc" {
                return Some("image/heic".to_string());
            }
        }
    }

    infer::get(data).map(|kind| kind.mime_type().to_string())
}

pub fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

pub fn normalize_image_mime_type(mime_type: &str) -> String {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg".to_string(),
        _ => essence,
    }
}

pub fn resolve_image_mime_type(declared: Option<&str>, bytes: &[u8]) -> String {
    if let Some(declared) = declared {
        let normalized = normalize_image_mime_type(declared);
        if normalized.starts_with("image/") {
            return normalized;
        }
    }

    detect_mime_type(bytes)
        .map(|detected| normalize_image_mime_type(&detected))
        .filter(|detected| detected.starts_with("image/"))
        .unwrap_or_else(|| FALLBACK_IMAGE_MIME.to_string())
}

#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

pub async fn fetch_image(url: &str) -> Result<FetchedImage> {
    let response = get_http_client().get(url).send().await.map_err(|err| {
        anyhow!(
            "Failed to fetch image {url}: {err} (timeout={}, connect={})",
            err.is_timeout(),
            err.is_connect()
        )
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(
            "Image download failed for {url} with status {}: {}",
            status,
            truncate_for_log(&body, MEDIA_DOWNLOAD_ERROR_BODY_LIMIT)
        );
        return Err(anyhow!("Image download failed with status {status}"));
    }

    let declared = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = response
        .bytes()
        .await
        .map_err(|err| anyhow!("Failed to read image bytes {url}: {err}"))?
        .to_vec();
    if bytes.is_empty() {
        return Err(anyhow!("Image at {url} is empty"));
    }

    let mime_type = resolve_image_mime_type(declared.as_deref(), &bytes);
    Ok(FetchedImage { bytes, mime_type })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52,
    ];

    #[test]
    fn declared_image_type_wins() {
        assert_eq!(
            resolve_image_mime_type(Some("image/webp"), PNG_HEADER),
            "image/webp"
        );
        assert_eq!(
            resolve_image_mime_type(Some("image/JPG; charset=binary"), PNG_HEADER),
            "image/jpeg"
        );
    }

    #[test]
    fn non_image_header_falls_back_to_sniffing() {
        assert_eq!(
            resolve_image_mime_type(Some("application/octet-stream"), PNG_HEADER),
            "image/png"
        );
        assert_eq!(resolve_image_mime_type(None, PNG_HEADER), "image/png");
    }

    #[test]
    fn unknown_bytes_default_to_jpeg() {
        assert_eq!(resolve_image_mime_type(None, b"not an image"), "image/jpeg");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_for_log("톤톤톤", 2), "톤톤... (truncated)");
        assert_eq!(truncate_for_log("short", 10), "short");
    }
}
