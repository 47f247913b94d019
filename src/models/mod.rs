//! Data models
//!
//! Request-scoped value types: detections in, estimates out.

mod detection;
mod estimate;
mod geometry;
mod nutrition;

pub use detection::{
    AnalyzeRequest, FoodDetection, ValidationError, MAX_PORTION_FACTOR, MIN_PORTION_FACTOR,
};
pub use estimate::{
    AnalysisResult, CalorieEstimate, PortionEstimate, PortionMethod, ResultItem, TotalCalories,
};
pub use geometry::{
    BoundingBox, ReferenceContext, ReferenceDetection, ReferenceObject, CREDIT_CARD_AREA_CM2,
    FORK_AREA_CM2,
};
pub use nutrition::{NutritionRecord, NutritionSource};
