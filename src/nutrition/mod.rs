//! Nutrition resolution module
//!
//! Authoritative lookup, fallback table, resolver and portion units.

pub mod fallback;
pub mod lookup;
pub mod resolver;
pub mod units;
pub mod usda;

pub use fallback::{fallback_matches, find_fallback_food, normalize_food_name, FALLBACK_FOODS};
pub use lookup::{ExternalNutrition, LookupError, NutritionLookup};
pub use resolver::{NutritionResolver, DEFAULT_LOOKUP_TIMEOUT, MAX_SEARCH_RESULTS};
pub use units::{display_portion, quantity_to_grams, step_grams, PortionUnit};
pub use usda::UsdaClient;
