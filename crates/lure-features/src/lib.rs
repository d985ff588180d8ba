//! # Lure Features
//!
//! Deterministic HTML and URL feature extraction for phishing and malware
//! classifiers.
//!
//! Two independent, side-effect-free extractors each parse their input once
//! and emit a flat, ordered mapping of feature name to value:
//!
//! - **HTML**: structural counts, text statistics and script-content
//!   analysis over a parsed document tree
//! - **URL**: string and regex inspection of the URL and its syntactic
//!   components
//!
//! The crate never fetches pages or trains models; a caller supplies the
//! raw strings and forwards the emitted [`FeatureMap`] to its classifier.
//!
//! ## Quick Start
//!
//! ```rust
//! use lure_features::{FeatureExtractor, HtmlFeatureExtractor, UrlFeatureExtractor};
//!
//! let page = HtmlFeatureExtractor::new("<html><body><p>Verify your account.</p></body></html>");
//! let url = UrlFeatureExtractor::new("http://login.example-bank.com/verify");
//!
//! let page_features = page.features();
//! let url_features = url.features();
//!
//! assert!(page_features.contains_key("page_entropy"));
//! assert_eq!(url_features.len(), 19);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────────┐     ┌───────────────┐
//! │  Raw input   │ ──► │  Parsed context    │ ──► │  FeatureMap   │
//! │ (HTML / URL) │     │ (one parse, frozen)│     │ (name → value)│
//! └──────────────┘     └────────────────────┘     └───────────────┘
//! ```
//!
//! Every feature accessor is a pure function of the frozen context, so
//! repeated extraction over the same input is bit-identical and independent
//! inputs can be processed in parallel without coordination.

pub mod config;
pub mod entropy;
pub mod error;
pub mod html;
pub mod patterns;
pub mod types;
pub mod url;

pub use config::ExtractorConfig;
pub use entropy::shannon_entropy;
pub use error::{FeatureError, Result};
pub use html::{HtmlContext, HtmlFeatureExtractor};
pub use types::{FeatureMap, FeatureValue};
pub use url::{UrlContext, UrlFeatureExtractor};

/// Common trait for both feature extractors
pub trait FeatureExtractor {
    /// Emit the fixed, ordered feature schema for this input.
    ///
    /// A fresh map is produced on every call; the keys, their order and
    /// their value types are stable per extractor.
    fn features(&self) -> FeatureMap;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::ExtractorConfig;
    pub use crate::error::{FeatureError, Result};
    pub use crate::html::HtmlFeatureExtractor;
    pub use crate::types::{FeatureMap, FeatureValue};
    pub use crate::url::UrlFeatureExtractor;
    pub use crate::FeatureExtractor;
}
