//! Manual corrections
//!
//! Items changed by a person carry the `user_edit` method and a tighter
//! weight range. Calories are always re-estimated with the calorie estimator.

use super::calories::estimate_calories;
use super::portion::user_edit_portion;
use super::rounding::DEFAULT_PRECISION;
use crate::models::{NutritionRecord, ResultItem, ValidationError};
use crate::nutrition::{quantity_to_grams, step_grams, NutritionResolver, PortionUnit};

/// Confidence given to items entered by hand
pub const MANUAL_CONFIDENCE: f64 = 0.4;

/// Convert a quantity in any accepted unit to grams
pub fn parse_quantity(quantity: f64, unit: &str, serving_grams: f64) -> Result<f64, ValidationError> {
    let grams = quantity_to_grams(quantity, unit, serving_grams)
        .ok_or_else(|| ValidationError::Unit(unit.to_string()))?;
    if !grams.is_finite() || grams <= 0.0 {
        return Err(ValidationError::Grams);
    }
    Ok(grams)
}

fn edited_item(name: &str, confidence: f64, grams: f64, nutrition: &NutritionRecord) -> ResultItem {
    let portion = user_edit_portion(grams);
    let calories = estimate_calories(portion.grams, nutrition);
    ResultItem {
        name: name.to_string(),
        confidence,
        portion: portion.rounded(DEFAULT_PRECISION),
        calories: calories.rounded(DEFAULT_PRECISION),
        serving_grams: nutrition.serving_grams,
        serving_label: nutrition.serving_label.clone(),
    }
}

/// The nutrition an item was presented with
fn nutrition_of(item: &ResultItem) -> NutritionRecord {
    NutritionRecord {
        name: item.name.clone(),
        per100g: item.calories.per100g,
        serving_grams: item.serving_grams,
        serving_label: item.serving_label.clone(),
        source: item.calories.source,
    }
}

/// Rename and/or reweigh an item. A new name re-resolves nutrition; the
/// quantity is interpreted against the resolved serving weight.
pub async fn edit_item(
    resolver: &NutritionResolver,
    item: &ResultItem,
    name: Option<&str>,
    quantity: f64,
    unit: &str,
) -> Result<ResultItem, ValidationError> {
    let name = match name.map(str::trim) {
        Some(n) if n.is_empty() => return Err(ValidationError::BlankItemName),
        Some(n) => n,
        None => item.name.as_str(),
    };

    let nutrition = if name == item.name {
        nutrition_of(item)
    } else {
        resolver.resolve(name).await
    };
    let grams = parse_quantity(quantity, unit, nutrition.serving_grams)?;

    Ok(edited_item(name, item.confidence, grams, &nutrition))
}

/// Move an item's portion by whole steps of the display unit
pub fn adjust_portion(item: &ResultItem, steps: i32, unit: PortionUnit) -> ResultItem {
    let delta = f64::from(steps) * step_grams(unit, item.serving_grams);
    let grams = item.portion.grams + delta;
    edited_item(&item.name, item.confidence, grams, &nutrition_of(item))
}

/// Create an item from a typed-in name and quantity
pub async fn manual_item(
    resolver: &NutritionResolver,
    name: &str,
    quantity: f64,
    unit: &str,
) -> Result<ResultItem, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::BlankItemName);
    }
    let nutrition = resolver.resolve(name).await;
    let grams = parse_quantity(quantity, unit, nutrition.serving_grams)?;
    Ok(edited_item(name, MANUAL_CONFIDENCE, grams, &nutrition))
}
