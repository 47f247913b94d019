//! Estimation core
//!
//! Portion inference, calorie computation, aggregation and manual
//! corrections. Everything here is stateless and request-scoped.

pub mod aggregate;
pub mod calories;
pub mod edit;
pub mod portion;
pub mod rounding;

pub use aggregate::{aggregate, recompute_total, ItemEstimate, MealAnalyzer};
pub use calories::{estimate_calories, CALORIE_VARIANCE};
pub use edit::{adjust_portion, edit_item, manual_item, parse_quantity, MANUAL_CONFIDENCE};
pub use portion::{
    estimate_portion, estimate_portion_for, PortionHint, PortionStrategy, MIN_PORTION_GRAMS,
};
pub use rounding::{build_range, round, Range};
