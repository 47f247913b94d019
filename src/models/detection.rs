//! Food detections
//!
//! One food found in a photo, plus the analyze request that carries a batch
//! of them. Caller input is validated here before any estimation runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::{BoundingBox, ReferenceContext};

/// Accepted bounds for a detector-supplied portion multiplier
pub const MIN_PORTION_FACTOR: f64 = 0.3;
pub const MAX_PORTION_FACTOR: f64 = 3.0;

/// Malformed caller input
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("food #{index}: name cannot be empty")]
    EmptyName { index: usize },

    #[error("item name cannot be empty")]
    BlankItemName,

    #[error("item #{index}: portion or calorie values are out of bounds")]
    MalformedItem { index: usize },

    #[error("food #{index}: confidence {value} is outside [0, 1]")]
    Confidence { index: usize, value: f64 },

    #[error("food #{index}: portionFactor {value} is outside [0.3, 3]")]
    PortionFactor { index: usize, value: f64 },

    #[error("food #{index}: bounding box must have finite coordinates and non-negative size")]
    FoodBox { index: usize },

    #[error("reference bounding box must have finite coordinates and non-negative size")]
    ReferenceBox,

    #[error("query cannot be empty")]
    EmptyQuery,

    #[error("grams must be a finite, positive number")]
    Grams,

    #[error("unknown unit: {0}")]
    Unit(String),

    #[error("image must be a base64 payload or data URL of at least 10 characters")]
    Image,

    #[error("provide either an image or a list of foods")]
    NoInput,

    #[error("unknown reference object '{0}', expected none, credit_card or fork")]
    ReferenceObject(String),

    #[error("reference geometry and portionFactor are mutually exclusive")]
    MixedHints,
}

/// One food found in a photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDetection {
    pub name: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "portion_factor")]
    pub portion_factor: Option<f64>,
}

impl FoodDetection {
    pub fn new(name: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            confidence,
            bbox: None,
            portion_factor: None,
        }
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_portion_factor(mut self, factor: f64) -> Self {
        self.portion_factor = Some(factor);
        self
    }

    /// Structural validation; `index` is the position in the request for error messages
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName { index });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ValidationError::Confidence {
                index,
                value: self.confidence,
            });
        }
        if let Some(factor) = self.portion_factor {
            if !(MIN_PORTION_FACTOR..=MAX_PORTION_FACTOR).contains(&factor) {
                return Err(ValidationError::PortionFactor { index, value: factor });
            }
        }
        if let Some(bbox) = &self.bbox {
            if !bbox.is_well_formed() {
                return Err(ValidationError::FoodBox { index });
            }
        }
        Ok(())
    }
}

/// Input to the analysis aggregator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub foods: Vec<FoodDetection>,
    #[serde(default, alias = "reference_context")]
    pub reference_context: ReferenceContext,
}

impl AnalyzeRequest {
    pub fn new(foods: Vec<FoodDetection>, reference_context: ReferenceContext) -> Self {
        Self {
            foods,
            reference_context,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, food) in self.foods.iter().enumerate() {
            food.validate(index)?;
        }
        if let Some(detection) = &self.reference_context.detection {
            if !detection.bbox.is_well_formed() {
                return Err(ValidationError::ReferenceBox);
            }
        }
        Ok(())
    }
}
