pub mod normalize;
pub mod tags;
pub mod vocabulary;

pub use normalize::{normalize, RawAnalysisResult, StyleAnalysis, StyleLabels};
pub use tags::display_tags;
