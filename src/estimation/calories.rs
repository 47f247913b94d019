//! Calorie estimation

use super::rounding::Range;
use crate::models::{CalorieEstimate, NutritionRecord};

/// Relative uncertainty applied to every calorie estimate
pub const CALORIE_VARIANCE: f64 = 0.25;

/// Energy for `grams` of a food, unrounded
pub fn estimate_calories(grams: f64, nutrition: &NutritionRecord) -> CalorieEstimate {
    let value = (grams * nutrition.per100g / 100.0).max(0.0);
    CalorieEstimate {
        value,
        range: Range::around(value, CALORIE_VARIANCE),
        per100g: nutrition.per100g,
        source: nutrition.source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NutritionSource;
    use crate::nutrition::find_fallback_food;

    #[test]
    fn test_apple_default_serving() {
        let apple = find_fallback_food("apple");
        let estimate = estimate_calories(182.0, &apple);
        assert!((estimate.value - 94.64).abs() < 1e-9);
        assert_eq!(estimate.per100g, 52.0);
        assert_eq!(estimate.source, NutritionSource::Fallback);

        let presented = estimate.rounded(0);
        assert_eq!(presented.value, 95.0);
        assert_eq!(presented.range, Range::new(71.0, 118.0));
    }

    #[test]
    fn test_unknown_food_uses_default_density() {
        let record = find_fallback_food("quinoa bowl");
        let estimate = estimate_calories(150.0, &record);
        assert_eq!(estimate.value, 300.0);
        assert_eq!(estimate.range, Range::new(225.0, 375.0));
    }

    #[test]
    fn test_authoritative_source_is_carried() {
        let mut record = find_fallback_food("pizza");
        record.per100g = 276.0;
        record.source = NutritionSource::Authoritative;
        let estimate = estimate_calories(100.0, &record);
        assert!((estimate.value - 276.0).abs() < 1e-9);
        assert_eq!(estimate.source, NutritionSource::Authoritative);
    }
}
