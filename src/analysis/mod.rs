//! Reference-style analysis: the model-facing contract (prompt and response
//! parsing) and the [`StyleAnalyzer`] seam the request handlers call through.

pub mod parse;
pub mod prompt;

use async_trait::async_trait;

use crate::style::RawAnalysisResult;

/// What a successful model call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnalysis {
    pub fields: RawAnalysisResult,
    /// Model text exactly as returned, kept for audit.
    pub raw_output: String,
}

#[async_trait]
pub trait StyleAnalyzer: Send + Sync {
    /// Analyzes the image at `image_url` with a single model request.
    ///
    /// Fetch failures, model errors and unparseable output all collapse into
    /// `None`; callers fall back to the default style table.
    async fn analyze(&self, image_url: &str) -> Option<RawAnalysis>;
}
