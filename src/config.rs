use std::env;
use std::time::Duration;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub log_level: String,
    pub log_dir: String,
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_base_url: String,
    pub gemini_analysis_model: String,
    pub gemini_temperature: f32,
    pub gemini_max_output_tokens: i32,
    pub gemini_safety_settings: String,
    pub http_timeout_seconds: u64,
    pub analysis_timeout_seconds: u64,
    pub session_cookie_name: String,
}

pub static CONFIG: Lazy<Config> =
    Lazy::new(|| Config::load().expect("Failed to load configuration"));

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_f32(name: &str, default: f32) -> f32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .unwrap_or(default)
}

fn env_i32(name: &str, default: i32) -> i32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<i32>().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn normalize_database_url(value: String) -> String {
    if value.starts_with("sqlite+aiosqlite://") {
        return value.replacen("sqlite+aiosqlite://", "sqlite://", 1);
    }
    value
}

fn normalize_gemini_safety_settings(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "permissive".to_string();
    }

    let lowered = trimmed.to_lowercase();
    match lowered.as_str() {
        "permissive" | "off" | "none" => "permissive".to_string(),
        "standard" => "standard".to_string(),
        _ => {
            warn!(
                "Unknown GEMINI_SAFETY_SETTINGS value '{}'; defaulting to permissive.",
                value
            );
            "permissive".to_string()
        }
    }
}

fn resolve_gemini_api_key() -> String {
    ["GEMINI_API_KEY", "GOOGLE_GENERATIVE_AI_API_KEY"]
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

impl Config {
    pub fn load() -> Result<Self> {
        let config = Config {
            bind_address: env_string("BIND_ADDRESS", "0.0.0.0:3000"),
            log_level: env_string("LOG_LEVEL", "info"),
            log_dir: env_string("LOG_DIR", "logs"),
            database_url: normalize_database_url(env_string(
                "DATABASE_URL",
                "sqlite://sellerhood.db",
            )),
            gemini_api_key: resolve_gemini_api_key(),
            gemini_base_url: env_string(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            )
            .trim_end_matches('/')
            .to_string(),
            gemini_analysis_model: env_string("GEMINI_ANALYSIS_MODEL", "gemini-2.0-flash-exp"),
            gemini_temperature: env_f32("GEMINI_TEMPERATURE", 0.2),
            gemini_max_output_tokens: env_i32("GEMINI_MAX_OUTPUT_TOKENS", 1024),
            gemini_safety_settings: normalize_gemini_safety_settings(env_string(
                "GEMINI_SAFETY_SETTINGS",
                "permissive",
            )),
            http_timeout_seconds: env_u64("HTTP_TIMEOUT_SECONDS", 30).max(1),
            analysis_timeout_seconds: env_u64("ANALYSIS_TIMEOUT_SECONDS", 90),
            session_cookie_name: env_string("SESSION_COOKIE_NAME", "session_token"),
        };

        if config.session_cookie_name.trim().is_empty() {
            return Err(anyhow!("SESSION_COOKIE_NAME must not be empty"));
        }

        if config.gemini_api_key.is_empty() {
            warn!("GEMINI_API_KEY is not set; every reference analysis will use default style values.");
        }

        Ok(config)
    }

    pub fn analysis_timeout(&self) -> Option<Duration> {
        if self.analysis_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.analysis_timeout_seconds))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_sqlite_prefix_is_rewritten() {
        assert_eq!(
            normalize_database_url("sqlite+aiosqlite:///data/app.db".to_string()),
            "sqlite:///data/app.db"
        );
        assert_eq!(
            normalize_database_url("sqlite://sellerhood.db".to_string()),
            "sqlite://sellerhood.db"
        );
    }

    #[test]
    fn safety_profile_aliases() {
        assert_eq!(normalize_gemini_safety_settings("OFF".to_string()), "permissive");
        assert_eq!(normalize_gemini_safety_settings(" standard ".to_string()), "standard");
        assert_eq!(normalize_gemini_safety_settings(String::new()), "permissive");
        assert_eq!(normalize_gemini_safety_settings("strict".to_string()), "permissive");
    }
}
