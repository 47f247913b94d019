//! Item tools
//!
//! Single-item portion estimates and manual corrections to an analyzed meal.
//! Edits operate on the caller's item list and return it with a recomputed
//! total.

use serde::Serialize;

use crate::estimation::{self, estimate_portion_for, PortionHint};
use crate::models::{
    AnalysisResult, BoundingBox, FoodDetection, PortionEstimate, ReferenceObject, ResultItem,
    ValidationError,
};
use crate::nutrition::{display_portion, NutritionResolver, PortionUnit};

/// Geometry or factor evidence for a single-item estimate
#[derive(Debug, Clone, Default)]
pub struct PortionQuery {
    pub name: String,
    pub reference_object: Option<String>,
    pub food_bbox: Option<BoundingBox>,
    pub reference_bbox: Option<BoundingBox>,
    pub portion_factor: Option<f64>,
}

/// Response for estimate_portion
#[derive(Debug, Serialize)]
pub struct PortionResponse {
    pub name: String,
    pub portion: PortionEstimate,
    pub serving_grams: f64,
    pub serving_label: String,
    pub display: String,
}

/// An item list after an edit
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedMeal {
    #[serde(flatten)]
    pub result: AnalysisResult,
    /// Portion of each item in the requested display unit
    pub display: Vec<String>,
}

impl EditedMeal {
    fn new(items: Vec<ResultItem>, unit: PortionUnit) -> Self {
        let display = items
            .iter()
            .map(|item| display_portion(item.portion.grams, item.serving_grams, unit))
            .collect();
        let total_calories = estimation::recompute_total(&items);
        Self {
            result: AnalysisResult {
                items,
                total_calories,
            },
            display,
        }
    }
}

/// Reject a caller-supplied list before any item is touched
fn check_items(items: &[ResultItem]) -> Result<(), String> {
    match items.iter().position(|item| !item.is_well_formed()) {
        Some(index) => Err(ValidationError::MalformedItem { index }.to_string()),
        None => Ok(()),
    }
}

fn item_at(items: &[ResultItem], index: usize) -> Result<&ResultItem, String> {
    items
        .get(index)
        .ok_or_else(|| format!("item index {} is out of range (list has {} items)", index, items.len()))
}

/// Portion estimate for one named food; reference geometry and a portion
/// factor are mutually exclusive
pub async fn estimate_portion(resolver: &NutritionResolver, query: PortionQuery) -> Result<PortionResponse, String> {
    let mut detection = FoodDetection::new(query.name.trim(), 1.0);
    detection.bbox = query.food_bbox;
    detection.portion_factor = query.portion_factor;
    detection.validate(0).map_err(|e| e.to_string())?;

    let object = match query.reference_object.as_deref() {
        Some(raw) => ReferenceObject::parse(raw)
            .ok_or_else(|| ValidationError::ReferenceObject(raw.to_string()).to_string())?,
        None => ReferenceObject::None,
    };
    if let Some(bbox) = &query.reference_bbox {
        if !bbox.is_well_formed() {
            return Err(ValidationError::ReferenceBox.to_string());
        }
    }

    let has_geometry = object != ReferenceObject::None || query.reference_bbox.is_some();
    let hint = match (detection.portion_factor, has_geometry) {
        (Some(_), true) => return Err(ValidationError::MixedHints.to_string()),
        (Some(factor), false) => PortionHint::Factor(factor),
        (None, true) => PortionHint::Reference {
            object,
            food_box: detection.bbox,
            reference_box: query.reference_bbox,
        },
        (None, false) => PortionHint::None,
    };

    let nutrition = resolver.resolve(&detection.name).await;
    let portion = estimate_portion_for(&nutrition, &hint).rounded(estimation::rounding::DEFAULT_PRECISION);
    Ok(PortionResponse {
        display: display_portion(portion.grams, nutrition.serving_grams, PortionUnit::Grams),
        name: detection.name,
        portion,
        serving_grams: nutrition.serving_grams,
        serving_label: nutrition.serving_label,
    })
}

/// Rename and/or reweigh one item of a list
pub async fn edit_item(
    resolver: &NutritionResolver,
    mut items: Vec<ResultItem>,
    index: usize,
    name: Option<&str>,
    quantity: f64,
    unit: &str,
) -> Result<EditedMeal, String> {
    check_items(&items)?;
    let edited = estimation::edit_item(resolver, item_at(&items, index)?, name, quantity, unit)
        .await
        .map_err(|e| e.to_string())?;
    items[index] = edited;
    Ok(EditedMeal::new(items, PortionUnit::Grams))
}

/// Step one item's portion up or down in the given display unit
pub fn adjust_portion(
    mut items: Vec<ResultItem>,
    index: usize,
    steps: i32,
    unit: PortionUnit,
) -> Result<EditedMeal, String> {
    check_items(&items)?;
    let adjusted = estimation::adjust_portion(item_at(&items, index)?, steps, unit);
    items[index] = adjusted;
    Ok(EditedMeal::new(items, unit))
}

/// Append a hand-entered item
pub async fn add_manual_item(
    resolver: &NutritionResolver,
    mut items: Vec<ResultItem>,
    name: &str,
    quantity: f64,
    unit: &str,
) -> Result<EditedMeal, String> {
    check_items(&items)?;
    let item = estimation::manual_item(resolver, name, quantity, unit)
        .await
        .map_err(|e| e.to_string())?;
    items.push(item);
    Ok(EditedMeal::new(items, PortionUnit::Grams))
}
