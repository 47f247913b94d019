//! Estimation results
//!
//! Portion and calorie estimates, the per-item result, and the aggregated
//! analysis result returned to callers.

use serde::{Deserialize, Serialize};

use super::nutrition::NutritionSource;
use crate::estimation::rounding::{round, Range};

/// How a portion weight was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortionMethod {
    ReferenceObject,
    DefaultServing,
    UserEdit,
}

impl PortionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortionMethod::ReferenceObject => "reference_object",
            PortionMethod::DefaultServing => "default_serving",
            PortionMethod::UserEdit => "user_edit",
        }
    }
}

/// Estimated weight of one food item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortionEstimate {
    pub grams: f64,
    pub method: PortionMethod,
    pub range_grams: Range,
}

impl PortionEstimate {
    pub fn rounded(&self, digits: u32) -> Self {
        Self {
            grams: round(self.grams, digits),
            method: self.method,
            range_grams: self.range_grams.rounded(digits),
        }
    }
}

/// Estimated energy of one food item
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalorieEstimate {
    pub value: f64,
    pub range: Range,
    #[serde(rename = "per100g")]
    pub per100g: f64,
    pub source: NutritionSource,
}

impl CalorieEstimate {
    /// Rounds value and range; `per100g` is carried through untouched
    pub fn rounded(&self, digits: u32) -> Self {
        Self {
            value: round(self.value, digits),
            range: self.range.rounded(digits),
            per100g: self.per100g,
            source: self.source,
        }
    }
}

/// One food item as presented to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultItem {
    pub name: String,
    pub confidence: f64,
    pub portion: PortionEstimate,
    pub calories: CalorieEstimate,
    pub serving_grams: f64,
    pub serving_label: String,
}

impl ResultItem {
    /// Positive weight, non-negative energy density, a positive serving, and
    /// every range bracketing its value
    pub fn is_well_formed(&self) -> bool {
        self.portion.grams.is_finite()
            && self.portion.grams > 0.0
            && self.portion.range_grams.brackets(self.portion.grams)
            && self.calories.value.is_finite()
            && self.calories.range.brackets(self.calories.value)
            && self.calories.per100g.is_finite()
            && self.calories.per100g >= 0.0
            && self.serving_grams.is_finite()
            && self.serving_grams > 0.0
    }
}

/// Summed calories across all items
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TotalCalories {
    pub value: f64,
    pub range: Range,
}

/// Result of analyzing one meal
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub items: Vec<ResultItem>,
    pub total_calories: TotalCalories,
}

impl AnalysisResult {
    /// Zero items, zero total
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Structural invariants: finite numbers and `0 <= low <= value <= high` everywhere
    pub fn is_well_formed(&self) -> bool {
        self.items.iter().all(ResultItem::is_well_formed)
            && self.total_calories.value.is_finite()
            && self.total_calories.range.brackets(self.total_calories.value)
    }
}
