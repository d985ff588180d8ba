//! Feature map types shared by both extractors

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping from feature name to value.
///
/// Each extractor emits a fixed schema of keys in a fixed order; downstream
/// classifiers depend on both the names and the order staying stable.
pub type FeatureMap = IndexMap<String, FeatureValue>;

/// A single extracted feature value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    /// Integer count
    Int(u64),
    /// Float, rounded to 3 decimal places at the point of computation
    Float(f64),
    /// Boolean signal
    Bool(bool),
}

impl FeatureValue {
    /// Get the value as an integer count if it is one
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            FeatureValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a float, widening integer counts
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Bool(_) => None,
        }
    }

    /// Get the value as a boolean if it is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FeatureValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<usize> for FeatureValue {
    fn from(value: usize) -> Self {
        FeatureValue::Int(value as u64)
    }
}

impl From<u64> for FeatureValue {
    fn from(value: u64) -> Self {
        FeatureValue::Int(value)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Float(value)
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Bool(value)
    }
}

impl std::fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureValue::Int(v) => write!(f, "{v}"),
            FeatureValue::Float(v) => write!(f, "{v:.3}"),
            FeatureValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_serialize_flat() {
        let mut map = FeatureMap::new();
        map.insert("count".into(), 3usize.into());
        map.insert("score".into(), 1.5f64.into());
        map.insert("flag".into(), true.into());

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"count":3,"score":1.5,"flag":true}"#);
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let mut map = FeatureMap::new();
        map.insert("z".into(), 1usize.into());
        map.insert("a".into(), 2usize.into());

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(FeatureValue::Int(7).as_u64(), Some(7));
        assert_eq!(FeatureValue::Int(7).as_f64(), Some(7.0));
        assert_eq!(FeatureValue::Float(0.5).as_f64(), Some(0.5));
        assert_eq!(FeatureValue::Bool(true).as_bool(), Some(true));
        assert_eq!(FeatureValue::Bool(true).as_u64(), None);
    }

    #[test]
    fn test_display_rounds_floats() {
        assert_eq!(FeatureValue::Float(1.5).to_string(), "1.500");
        assert_eq!(FeatureValue::Int(9).to_string(), "9");
    }
}
