//! Portion estimation
//!
//! Estimates the weight of one food item. The input carries at most one kind
//! of photo evidence ([`PortionHint`]): reference-object geometry or a
//! detector-supplied scalar factor. Without usable evidence the food's
//! default serving is used.

use serde::{Deserialize, Serialize};

use super::rounding::Range;
use crate::models::{
    BoundingBox, FoodDetection, NutritionRecord, PortionEstimate, PortionMethod, ReferenceContext,
    ReferenceObject,
};
use crate::nutrition::find_fallback_food;

/// Food area (cm²) that one default serving is assumed to cover on a plate
pub const BASELINE_SERVING_AREA_CM2: f64 = 80.0;

/// Minimum weight produced by reference-object scaling
pub const REFERENCE_MIN_GRAMS: f64 = 15.0;
/// Minimum weight for default-serving, factor-scaled and edited portions
pub const MIN_PORTION_GRAMS: f64 = 10.0;

pub const REFERENCE_VARIANCE: f64 = 0.20;
pub const DEFAULT_SERVING_VARIANCE: f64 = 0.35;
pub const USER_EDIT_VARIANCE: f64 = 0.15;

/// Which kind of photo evidence the estimator honors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortionStrategy {
    /// Scale by the area of a calibration object
    #[default]
    ReferenceObject,
    /// Multiply the default serving by the detector's portion factor
    PortionFactor,
}

impl PortionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortionStrategy::ReferenceObject => "reference_object",
            PortionStrategy::PortionFactor => "portion_factor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "reference_object" | "reference" => Some(PortionStrategy::ReferenceObject),
            "portion_factor" | "factor" => Some(PortionStrategy::PortionFactor),
            _ => None,
        }
    }

    /// Build the hint for one detection, keeping only the evidence this
    /// strategy honors
    pub fn hint_for(&self, detection: &FoodDetection, reference: &ReferenceContext) -> PortionHint {
        match self {
            PortionStrategy::ReferenceObject => PortionHint::Reference {
                object: reference.object,
                food_box: detection.bbox,
                reference_box: reference.reference_box(),
            },
            PortionStrategy::PortionFactor => detection
                .portion_factor
                .map(PortionHint::Factor)
                .unwrap_or(PortionHint::None),
        }
    }
}

/// Photo evidence for one portion estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortionHint {
    None,
    Reference {
        object: ReferenceObject,
        food_box: Option<BoundingBox>,
        reference_box: Option<BoundingBox>,
    },
    Factor(f64),
}

/// Estimate a portion for a food name, using the fallback table's serving
pub fn estimate_portion(food_name: &str, hint: &PortionHint) -> PortionEstimate {
    estimate_portion_for(&find_fallback_food(food_name), hint)
}

/// Estimate a portion against an already resolved nutrition record
pub fn estimate_portion_for(nutrition: &NutritionRecord, hint: &PortionHint) -> PortionEstimate {
    match *hint {
        PortionHint::Reference {
            object,
            food_box,
            reference_box,
        } => reference_scaled(nutrition.serving_grams, object, food_box, reference_box)
            .unwrap_or_else(|| default_serving(nutrition.serving_grams)),
        PortionHint::Factor(factor) => {
            apply_portion_factor(&default_serving(nutrition.serving_grams), factor)
        }
        PortionHint::None => default_serving(nutrition.serving_grams),
    }
}

/// Area scaling against a calibration object. `None` when any precondition
/// fails, so the caller falls through to the default serving.
fn reference_scaled(
    serving_grams: f64,
    object: ReferenceObject,
    food_box: Option<BoundingBox>,
    reference_box: Option<BoundingBox>,
) -> Option<PortionEstimate> {
    let reference_area_cm2 = object.area_cm2()?;
    let food_box = food_box.filter(BoundingBox::has_area)?;
    let reference_box = reference_box.filter(BoundingBox::has_area)?;

    let cm2_per_pixel = reference_area_cm2 / reference_box.area();
    let food_area_cm2 = food_box.area() * cm2_per_pixel;
    let grams = ((serving_grams / BASELINE_SERVING_AREA_CM2) * food_area_cm2).max(REFERENCE_MIN_GRAMS);

    if !grams.is_finite() {
        tracing::debug!("Reference scaling produced a non-finite weight, using default serving");
        return None;
    }

    Some(PortionEstimate {
        grams,
        method: PortionMethod::ReferenceObject,
        range_grams: Range::around(grams, REFERENCE_VARIANCE),
    })
}

/// The food's canonical serving weight
pub fn default_serving(serving_grams: f64) -> PortionEstimate {
    let grams = serving_grams.max(MIN_PORTION_GRAMS);
    PortionEstimate {
        grams,
        method: PortionMethod::DefaultServing,
        range_grams: Range::around(grams, DEFAULT_SERVING_VARIANCE),
    }
}

/// Scale a default-serving estimate by a detector factor. Grams and both
/// bounds are multiplied, then held at the 10 g floor with the range kept
/// around the floored value. Non-finite or non-positive factors are ignored.
pub fn apply_portion_factor(estimate: &PortionEstimate, factor: f64) -> PortionEstimate {
    if !factor.is_finite() || factor <= 0.0 {
        return *estimate;
    }
    let grams = (estimate.grams * factor).max(MIN_PORTION_GRAMS);
    let scaled = estimate.range_grams.scale(factor);
    PortionEstimate {
        grams,
        method: estimate.method,
        range_grams: Range::new(scaled.low.min(grams), scaled.high.max(grams)),
    }
}

/// A weight entered directly by a person
pub fn user_edit_portion(grams: f64) -> PortionEstimate {
    let grams = grams.max(MIN_PORTION_GRAMS);
    PortionEstimate {
        grams,
        method: PortionMethod::UserEdit,
        range_grams: Range::around(grams, USER_EDIT_VARIANCE),
    }
}
