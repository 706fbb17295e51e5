pub mod analyze_reference;
pub mod error;
pub mod session;
pub mod style_features;
