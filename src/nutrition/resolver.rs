//! Nutrition resolver
//!
//! Turns a food name into a [`NutritionRecord`]. The authoritative lookup is
//! tried first (bounded by a timeout); anything short of a usable energy
//! value degrades to the fallback table. Resolution never fails.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::fallback::{fallback_matches, find_fallback_food};
use super::lookup::{ExternalNutrition, LookupError, NutritionLookup};
use crate::models::{NutritionRecord, NutritionSource, ValidationError};

/// Default bound on a single external lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_millis(4000);

/// Maximum number of candidates returned by [`NutritionResolver::search`]
pub const MAX_SEARCH_RESULTS: usize = 5;

#[derive(Clone)]
pub struct NutritionResolver {
    lookup: Option<Arc<dyn NutritionLookup>>,
    timeout: Duration,
}

impl std::fmt::Debug for NutritionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NutritionResolver")
            .field("authoritative", &self.lookup.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl NutritionResolver {
    pub fn new(lookup: Option<Arc<dyn NutritionLookup>>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    /// Resolver backed only by the fallback table
    pub fn offline() -> Self {
        Self::new(None, DEFAULT_LOOKUP_TIMEOUT)
    }

    pub fn has_authoritative_source(&self) -> bool {
        self.lookup.is_some()
    }

    /// Resolve a food name, preferring the authoritative source
    pub async fn resolve(&self, name: &str) -> NutritionRecord {
        let fallback = find_fallback_food(name);

        let Some(external) = self.authoritative(name).await else {
            return fallback;
        };
        let Some(per100g) = external.usable_energy() else {
            tracing::debug!("No usable energy value for '{}', using fallback table", name);
            return fallback;
        };

        let display_name = external
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| fallback.name.clone());

        NutritionRecord {
            name: display_name,
            per100g,
            serving_grams: fallback.serving_grams,
            serving_label: fallback.serving_label,
            source: NutritionSource::Authoritative,
        }
    }

    /// Query the external source, absorbing every failure
    async fn authoritative(&self, name: &str) -> Option<ExternalNutrition> {
        let lookup = self.lookup.as_ref()?;

        let outcome = match tokio::time::timeout(self.timeout, lookup.lookup(name)).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout(self.timeout.as_millis())),
        };

        match outcome {
            Ok(Some(found)) => Some(found),
            Ok(None) => {
                tracing::debug!("Authoritative lookup found nothing for '{}'", name);
                None
            }
            Err(e) => {
                tracing::warn!("Authoritative lookup failed for '{}': {}", name, e);
                None
            }
        }
    }

    /// Up to five candidates: the resolved record first, then fallback-table
    /// matches, deduplicated by name
    pub async fn search(&self, query: &str) -> Result<Vec<NutritionRecord>, ValidationError> {
        if query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        let resolved = self.resolve(query).await;
        let mut seen = HashSet::new();
        let results = std::iter::once(resolved)
            .chain(fallback_matches(query))
            .filter(|record| seen.insert(record.name.clone()))
            .take(MAX_SEARCH_RESULTS)
            .collect();
        Ok(results)
    }
}

impl Default for NutritionResolver {
    fn default() -> Self {
        Self::offline()
    }
}
