//! Calorie Camera Tools module
//!
//! Tool implementations behind the MCP server and the CLI. Caller mistakes
//! come back as `Err(String)`; collaborator failures never do.

pub mod analyze;
pub mod items;
pub mod search;
pub mod status;

use thiserror::Error;

use crate::nutrition::LookupError;
use crate::vision::VisionError;

pub use analyze::{analyze_meal, AnalyzeMealInput, MealPipeline};

/// Failure to construct collaborator clients at startup
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("nutrition client: {0}")]
    Lookup(#[from] LookupError),

    #[error("vision client: {0}")]
    Vision(#[from] VisionError),
}
