//! Extractor configuration

use serde::{Deserialize, Serialize};

/// Configuration shared by the HTML and URL extractors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum input length to accept, in bytes
    pub max_length: usize,

    /// Extra substrings unioned into the suspicious-function table
    pub custom_suspicious_functions: Vec<String>,

    /// Extra regex rows appended to the DOM-mutation table
    pub custom_dom_mutation_patterns: Vec<String>,

    /// Extra URL keywords, each emitted as an independent `has_<kw>_keyword`
    /// boolean after the built-in schema
    pub custom_url_keywords: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_length: 5_000_000,
            custom_suspicious_functions: Vec::new(),
            custom_dom_mutation_patterns: Vec::new(),
            custom_url_keywords: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    /// Create a new config with a custom input size cap
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Add a substring to the suspicious-function table
    pub fn with_suspicious_function(mut self, substring: impl Into<String>) -> Self {
        self.custom_suspicious_functions.push(substring.into());
        self
    }

    /// Add a regex row to the DOM-mutation table
    pub fn with_dom_mutation_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.custom_dom_mutation_patterns.push(pattern.into());
        self
    }

    /// Add a URL keyword boolean
    pub fn with_url_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.custom_url_keywords.push(keyword.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_custom_rows() {
        let config = ExtractorConfig::default();
        assert!(config.custom_suspicious_functions.is_empty());
        assert!(config.custom_dom_mutation_patterns.is_empty());
        assert!(config.custom_url_keywords.is_empty());
    }

    #[test]
    fn test_builder_chain() {
        let config = ExtractorConfig::default()
            .with_max_length(1024)
            .with_suspicious_function("atob")
            .with_url_keyword("paypal");

        assert_eq!(config.max_length, 1024);
        assert_eq!(config.custom_suspicious_functions, vec!["atob"]);
        assert_eq!(config.custom_url_keywords, vec!["paypal"]);
    }
}
