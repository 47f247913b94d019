//! Built-in fallback nutrition table
//!
//! Used when no authoritative source is configured or it cannot answer.
//! Matching is by substring: the first entry whose name appears inside the
//! normalized query wins, so table order matters.

use crate::models::{NutritionRecord, NutritionSource};

/// One row of the fallback table
#[derive(Debug, Clone, Copy)]
pub struct FallbackFood {
    pub name: &'static str,
    /// kcal per 100 g
    pub per100g: f64,
    pub serving_grams: f64,
    pub serving_label: &'static str,
}

impl FallbackFood {
    const fn new(
        name: &'static str,
        per100g: f64,
        serving_grams: f64,
        serving_label: &'static str,
    ) -> Self {
        Self {
            name,
            per100g,
            serving_grams,
            serving_label,
        }
    }

    pub fn to_record(&self) -> NutritionRecord {
        NutritionRecord {
            name: self.name.to_string(),
            per100g: self.per100g,
            serving_grams: self.serving_grams,
            serving_label: self.serving_label.to_string(),
            source: NutritionSource::Fallback,
        }
    }
}

pub const FALLBACK_FOODS: &[FallbackFood] = &[
    FallbackFood::new("apple", 52.0, 182.0, "1 medium"),
    FallbackFood::new("banana", 89.0, 118.0, "1 medium"),
    FallbackFood::new("orange", 47.0, 140.0, "1 medium"),
    FallbackFood::new("salad", 35.0, 150.0, "1 bowl"),
    FallbackFood::new("pizza", 266.0, 107.0, "1 slice"),
    FallbackFood::new("burger", 295.0, 200.0, "1 burger"),
    FallbackFood::new("fries", 312.0, 117.0, "1 medium"),
    FallbackFood::new("rice", 130.0, 158.0, "1 cup"),
    FallbackFood::new("pasta", 157.0, 140.0, "1 cup"),
    FallbackFood::new("chicken breast", 165.0, 120.0, "1 piece"),
    FallbackFood::new("steak", 271.0, 170.0, "1 piece"),
    FallbackFood::new("egg", 155.0, 50.0, "1 large"),
    FallbackFood::new("sushi", 143.0, 45.0, "1 piece"),
    FallbackFood::new("avocado", 160.0, 150.0, "1 medium"),
    FallbackFood::new("bread", 265.0, 38.0, "1 slice"),
    FallbackFood::new("yogurt", 59.0, 150.0, "1 cup"),
    FallbackFood::new("soup", 55.0, 240.0, "1 bowl"),
    FallbackFood::new("taco", 226.0, 120.0, "1 taco"),
];

/// Generic record for foods the table does not know
pub const DEFAULT_FOOD_NAME: &str = "mixed food";
pub const DEFAULT_PER_100G: f64 = 200.0;
pub const DEFAULT_SERVING_GRAMS: f64 = 150.0;
pub const DEFAULT_SERVING_LABEL: &str = "1 serving";

/// Maximum number of table matches returned by [`fallback_matches`]
pub const MAX_FALLBACK_MATCHES: usize = 5;

pub fn normalize_food_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Generic default record carrying the caller's (trimmed) name
pub fn default_record(name: &str) -> NutritionRecord {
    let trimmed = name.trim();
    NutritionRecord {
        name: if trimmed.is_empty() {
            DEFAULT_FOOD_NAME.to_string()
        } else {
            trimmed.to_string()
        },
        per100g: DEFAULT_PER_100G,
        serving_grams: DEFAULT_SERVING_GRAMS,
        serving_label: DEFAULT_SERVING_LABEL.to_string(),
        source: NutritionSource::Fallback,
    }
}

/// First table entry whose name occurs in the normalized query
pub fn match_fallback_food(name: &str) -> Option<&'static FallbackFood> {
    let normalized = normalize_food_name(name);
    FALLBACK_FOODS
        .iter()
        .find(|food| normalized.contains(food.name))
}

/// Table lookup that never fails: matched entry or the default record
pub fn find_fallback_food(name: &str) -> NutritionRecord {
    match match_fallback_food(name) {
        Some(food) => food.to_record(),
        None => default_record(name),
    }
}

/// Table entries whose name contains the query (search direction is reversed
/// relative to [`find_fallback_food`]: here the query is the fragment)
pub fn fallback_matches(query: &str) -> Vec<NutritionRecord> {
    let normalized = normalize_food_name(query);
    FALLBACK_FOODS
        .iter()
        .filter(|food| food.name.contains(normalized.as_str()))
        .take(MAX_FALLBACK_MATCHES)
        .map(FallbackFood::to_record)
        .collect()
}
