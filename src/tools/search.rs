//! Nutrition search tool

use serde::Serialize;

use crate::models::NutritionRecord;
use crate::nutrition::NutritionResolver;

/// Name resolved when a search fails for reasons other than the query
const FAILURE_QUERY: &str = "food";

/// Response for search_nutrition
#[derive(Debug, Serialize)]
pub struct SearchNutritionResponse {
    pub results: Vec<NutritionRecord>,
    pub total: usize,
}

impl SearchNutritionResponse {
    fn new(results: Vec<NutritionRecord>) -> Self {
        Self {
            total: results.len(),
            results,
        }
    }
}

/// Up to five candidates for a free-text query. An empty query is an error;
/// any internal fault yields the generic default record.
pub async fn search_nutrition(resolver: &NutritionResolver, query: &str) -> Result<SearchNutritionResponse, String> {
    if query.trim().is_empty() {
        return Err("query cannot be empty".to_string());
    }

    let task_resolver = resolver.clone();
    let task_query = query.to_string();
    let handle = tokio::spawn(async move { task_resolver.search(&task_query).await });

    match handle.await {
        Ok(Ok(results)) => Ok(SearchNutritionResponse::new(results)),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => {
            tracing::error!("Nutrition search for '{}' failed: {}", query, e);
            let fallback = NutritionResolver::offline().resolve(FAILURE_QUERY).await;
            Ok(SearchNutritionResponse::new(vec![fallback]))
        }
    }
}
