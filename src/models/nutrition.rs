//! Resolved nutrition data
//!
//! Energy density plus serving heuristics for one food, tagged with where
//! the energy value came from.

use serde::{Deserialize, Serialize};

/// Provenance of a nutrition record's energy value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutritionSource {
    /// External nutrition database
    Authoritative,
    /// Built-in table or generic default
    Fallback,
}

impl NutritionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            NutritionSource::Authoritative => "authoritative",
            NutritionSource::Fallback => "fallback",
        }
    }
}

/// Nutrition values for one food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionRecord {
    pub name: String,
    /// kcal per 100 g
    #[serde(rename = "per100g")]
    pub per100g: f64,
    pub serving_grams: f64,
    pub serving_label: String,
    pub source: NutritionSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_json_shape() {
        let record = NutritionRecord {
            name: "apple".to_string(),
            per100g: 52.0,
            serving_grams: 182.0,
            serving_label: "1 medium".to_string(),
            source: NutritionSource::Fallback,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["per100g"], 52.0);
        assert_eq!(value["servingGrams"], 182.0);
        assert_eq!(value["servingLabel"], "1 medium");
        assert_eq!(value["source"], "fallback");
    }
}
