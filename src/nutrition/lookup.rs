//! Authoritative nutrition lookup seam
//!
//! The resolver talks to external nutrition databases only through this
//! trait. Implementations report transport problems as [`LookupError`];
//! the resolver decides what to do with them.

use async_trait::async_trait;
use thiserror::Error;

/// External lookup failure
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("lookup returned status {0}")]
    Status(u16),

    #[error("lookup timed out after {0} ms")]
    Timeout(u128),
}

/// What an external source knows about a food
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalNutrition {
    /// Display name from the external source
    pub description: Option<String>,
    /// kcal per 100 g, when the source reported an energy value
    pub per100g: Option<f64>,
}

impl ExternalNutrition {
    /// Energy value if it is present, finite and non-zero
    pub fn usable_energy(&self) -> Option<f64> {
        self.per100g.filter(|v| v.is_finite() && *v > 0.0)
    }
}

/// Free-text food lookup against an authoritative database
#[async_trait]
pub trait NutritionLookup: Send + Sync {
    /// `Ok(None)` means the source had no match for `query`
    async fn lookup(&self, query: &str) -> Result<Option<ExternalNutrition>, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_energy() {
        let mut found = ExternalNutrition {
            description: Some("Apples, raw".to_string()),
            per100g: Some(52.0),
        };
        assert_eq!(found.usable_energy(), Some(52.0));

        found.per100g = Some(0.0);
        assert_eq!(found.usable_energy(), None);

        found.per100g = None;
        assert_eq!(found.usable_energy(), None);
    }
}
