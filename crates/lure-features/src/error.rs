//! Error types for feature extraction

use thiserror::Error;

/// Result type for feature extraction operations
pub type Result<T> = std::result::Result<T, FeatureError>;

/// Errors that can occur while building a feature extractor
#[derive(Error, Debug)]
pub enum FeatureError {
    /// A user-supplied pattern row failed to compile
    #[error("Invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Input too large
    #[error("Content too large: {size} bytes exceeds max {max} bytes")]
    ContentTooLarge { size: usize, max: usize },
}
