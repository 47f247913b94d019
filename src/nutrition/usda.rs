//! USDA FoodData Central client
//!
//! Searches FoodData Central for a free-text name and extracts the energy
//! value (kcal per 100 g) of the top hit.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::lookup::{ExternalNutrition, LookupError, NutritionLookup};

pub const USDA_SEARCH_ENDPOINT: &str = "https://api.nal.usda.gov/fdc/v1/foods/search";

/// FoodData Central nutrient number for energy (kcal)
const ENERGY_NUTRIENT_NUMBER: &str = "208";

#[derive(Debug, Clone)]
pub struct UsdaClient {
    api_key: String,
    endpoint: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    description: Option<String>,
    #[serde(default)]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodNutrient {
    nutrient_name: Option<String>,
    nutrient_number: Option<String>,
    unit_name: Option<String>,
    value: Option<f64>,
}

impl FoodNutrient {
    fn is_energy(&self) -> bool {
        let by_number = self.nutrient_number.as_deref() == Some(ENERGY_NUTRIENT_NUMBER);
        let by_name = self
            .nutrient_name
            .as_deref()
            .map(|n| n.to_lowercase().contains("energy"))
            .unwrap_or(false);
        let in_kilojoules = self
            .unit_name
            .as_deref()
            .map(|u| u.eq_ignore_ascii_case("kj"))
            .unwrap_or(false);
        (by_number || by_name) && !in_kilojoules
    }
}

impl UsdaClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            endpoint: USDA_SEARCH_ENDPOINT.to_string(),
            client,
        })
    }

    /// Point the client at a different search endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Extract the top hit from a FoodData Central search body
fn top_hit(response: SearchResponse) -> Option<ExternalNutrition> {
    let first = response.foods.into_iter().next()?;
    let per100g = first
        .food_nutrients
        .iter()
        .find(|n| n.is_energy())
        .and_then(|n| n.value);
    Some(ExternalNutrition {
        description: first.description,
        per100g,
    })
}

#[async_trait]
impl NutritionLookup for UsdaClient {
    async fn lookup(&self, query: &str) -> Result<Option<ExternalNutrition>, LookupError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("query", query),
                ("pageSize", "1"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(top_hit(body))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::NutritionSource;
    use crate::nutrition::NutritionResolver;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(json: &str) -> Option<ExternalNutrition> {
        top_hit(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_energy_by_nutrient_number() {
        let hit = parse(
            r#"{"foods":[{"description":"Apples, raw, with skin","foodNutrients":[
                {"nutrientName":"Protein","nutrientNumber":"203","unitName":"G","value":0.26},
                {"nutrientName":"Energy","nutrientNumber":"208","unitName":"KCAL","value":52.0}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(hit.description.as_deref(), Some("Apples, raw, with skin"));
        assert_eq!(hit.per100g, Some(52.0));
    }

    #[test]
    fn test_energy_by_name_skips_kilojoules() {
        let hit = parse(
            r#"{"foods":[{"description":"Bananas, raw","foodNutrients":[
                {"nutrientName":"Energy","nutrientNumber":"268","unitName":"kJ","value":371.0},
                {"nutrientName":"Energy (Atwater General Factors)","nutrientNumber":"957","unitName":"KCAL","value":89.0}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(hit.per100g, Some(89.0));
    }

    #[test]
    fn test_missing_energy() {
        let hit = parse(
            r#"{"foods":[{"description":"Water","foodNutrients":[
                {"nutrientName":"Sodium","nutrientNumber":"307","unitName":"MG","value":4.0}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(hit.per100g, None);
        assert_eq!(hit.usable_energy(), None);
    }

    #[test]
    fn test_no_foods() {
        assert_eq!(parse(r#"{"foods":[]}"#), None);
        assert_eq!(parse(r#"{"totalHits":0}"#), None);
    }

    async fn mock_client(server: &MockServer, response: ResponseTemplate) -> UsdaClient {
        Mock::given(method("GET"))
            .and(path("/fdc/v1/foods/search"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("query", "apple"))
            .and(query_param("pageSize", "1"))
            .respond_with(response)
            .mount(server)
            .await;
        UsdaClient::new("test-key".to_string(), Duration::from_secs(1))
            .unwrap()
            .with_endpoint(format!("{}/fdc/v1/foods/search", server.uri()))
    }

    fn resolver(client: UsdaClient) -> NutritionResolver {
        let lookup: Arc<dyn NutritionLookup> = Arc::new(client);
        NutritionResolver::new(Some(lookup), Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_lookup_kcal_hit() {
        let server = MockServer::start().await;
        let body = json!({"foods": [{"description": "Apples, fuji, with skin, raw", "foodNutrients": [
            {"nutrientName": "Energy", "nutrientNumber": "208", "unitName": "KCAL", "value": 63.0}
        ]}]});
        let client = mock_client(&server, ResponseTemplate::new(200).set_body_json(body)).await;

        let hit = client.lookup("apple").await.unwrap().unwrap();
        assert_eq!(hit.per100g, Some(63.0));

        let record = resolver(client).resolve("apple").await;
        assert_eq!(record.source, NutritionSource::Authoritative);
        assert_eq!(record.name, "Apples, fuji, with skin, raw");
        assert_eq!(record.per100g, 63.0);
        assert_eq!(record.serving_grams, 182.0);
    }

    #[tokio::test]
    async fn test_lookup_error_status_falls_back() {
        let server = MockServer::start().await;
        let client = mock_client(&server, ResponseTemplate::new(503)).await;

        let err = client.lookup("apple").await.unwrap_err();
        assert!(matches!(err, LookupError::Status(503)));

        let record = resolver(client).resolve("apple").await;
        assert_eq!(record.source, NutritionSource::Fallback);
        assert_eq!(record.per100g, 52.0);
    }

    #[tokio::test]
    async fn test_lookup_without_energy_falls_back() {
        let server = MockServer::start().await;
        let body = json!({"foods": [{"description": "Apple juice", "foodNutrients": [
            {"nutrientName": "Sugars, total", "nutrientNumber": "269", "unitName": "G", "value": 9.6}
        ]}]});
        let client = mock_client(&server, ResponseTemplate::new(200).set_body_json(body)).await;

        let hit = client.lookup("apple").await.unwrap().unwrap();
        assert_eq!(hit.per100g, None);

        let record = resolver(client).resolve("apple").await;
        assert_eq!(record.source, NutritionSource::Fallback);
        assert_eq!(record.per100g, 52.0);
    }

    #[tokio::test]
    async fn test_lookup_undecodable_body() {
        let server = MockServer::start().await;
        let client = mock_client(&server, ResponseTemplate::new(200).set_body_string("<html>maintenance</html>")).await;

        let err = client.lookup("apple").await.unwrap_err();
        assert!(matches!(err, LookupError::Http(_)));
        assert_eq!(resolver(client).resolve("apple").await.source, NutritionSource::Fallback);
    }
}
