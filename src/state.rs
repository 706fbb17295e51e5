use std::sync::Arc;
use std::time::Duration;

use crate::analysis::StyleAnalyzer;
use crate::config::Config;
use crate::db::database::Database;
use crate::llm::{GeminiSettings, GeminiStyleAnalyzer};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub analyzer: Arc<dyn StyleAnalyzer>,
    pub analysis_timeout: Option<Duration>,
    pub session_cookie_name: Arc<str>,
}

impl AppState {
    pub fn new(
        db: Database,
        analyzer: Arc<dyn StyleAnalyzer>,
        analysis_timeout: Option<Duration>,
        session_cookie_name: &str,
    ) -> Self {
        AppState {
            db,
            analyzer,
            analysis_timeout,
            session_cookie_name: Arc::from(session_cookie_name),
        }
    }

    pub fn from_config(db: Database, config: &Config) -> Self {
        let analyzer = GeminiStyleAnalyzer::new(GeminiSettings::from_config(config));
        AppState::new(
            db,
            Arc::new(analyzer),
            config.analysis_timeout(),
            &config.session_cookie_name,
        )
    }
}
