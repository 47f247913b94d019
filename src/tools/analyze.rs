//! Meal analysis tool
//!
//! The analyze boundary: caller input errors are returned, everything else
//! (vision failures, lookup failures, internal faults) degrades to a
//! well-formed, possibly empty, result.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::SetupError;
use crate::config::{Config, DEFAULT_VISION_TIMEOUT};
use crate::estimation::{MealAnalyzer, PortionStrategy};
use crate::models::{
    AnalysisResult, AnalyzeRequest, FoodDetection, ReferenceContext, ReferenceDetection,
    ReferenceObject, ValidationError,
};
use crate::nutrition::{NutritionLookup, NutritionResolver, UsdaClient};
use crate::vision::{image_data_url, OpenAiVisionClient, VisionClient, VisionError, VisionResponse};

/// Input to `analyze_meal`: a photo, pre-detected foods, or both
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeMealInput {
    #[serde(default, alias = "image_base64")]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub foods: Option<Vec<FoodDetection>>,
    #[serde(default, alias = "reference_object")]
    pub reference_object: Option<String>,
    #[serde(default)]
    pub reference: Option<ReferenceDetection>,
}

/// Vision plus aggregation, shared by the MCP server and the CLI
#[derive(Clone)]
pub struct MealPipeline {
    analyzer: MealAnalyzer,
    vision: Option<Arc<dyn VisionClient>>,
    vision_timeout: Duration,
}

impl std::fmt::Debug for MealPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealPipeline")
            .field("analyzer", &self.analyzer)
            .field("vision", &self.vision.is_some())
            .field("vision_timeout", &self.vision_timeout)
            .finish()
    }
}

impl MealPipeline {
    pub fn new(
        analyzer: MealAnalyzer,
        vision: Option<Arc<dyn VisionClient>>,
        vision_timeout: Duration,
    ) -> Self {
        Self {
            analyzer,
            vision,
            vision_timeout,
        }
    }

    /// Fallback-table only, no vision
    pub fn offline(strategy: PortionStrategy) -> Self {
        Self::new(
            MealAnalyzer::new(NutritionResolver::offline(), strategy),
            None,
            DEFAULT_VISION_TIMEOUT,
        )
    }

    /// Wire collaborators for whichever API keys are configured
    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let lookup: Option<Arc<dyn NutritionLookup>> = match &config.usda_api_key {
            Some(key) => Some(Arc::new(UsdaClient::new(key.clone(), config.lookup_timeout)?)),
            None => None,
        };
        let vision: Option<Arc<dyn VisionClient>> = match &config.openai_api_key {
            Some(key) => Some(Arc::new(
                OpenAiVisionClient::new(key.clone(), config.vision_model.clone(), config.vision_timeout)?
                    .with_strategy(config.portion_strategy),
            )),
            None => None,
        };

        let resolver = NutritionResolver::new(lookup, config.lookup_timeout);
        Ok(Self::new(
            MealAnalyzer::new(resolver, config.portion_strategy),
            vision,
            config.vision_timeout,
        ))
    }

    pub fn analyzer(&self) -> &MealAnalyzer {
        &self.analyzer
    }

    pub fn resolver(&self) -> &NutritionResolver {
        self.analyzer.resolver()
    }

    pub fn has_vision(&self) -> bool {
        self.vision.is_some()
    }

    /// Run vision, absorbing every failure into an empty detection list
    pub async fn detect(&self, image_url: &str) -> VisionResponse {
        let Some(vision) = &self.vision else {
            tracing::debug!("No vision client configured, returning no detections");
            return VisionResponse::default();
        };

        let outcome = match tokio::time::timeout(self.vision_timeout, vision.detect(image_url)).await {
            Ok(result) => result,
            Err(_) => Err(VisionError::Timeout(self.vision_timeout.as_millis())),
        };

        match outcome {
            Ok(detections) => detections,
            Err(e) => {
                tracing::warn!("Vision analysis failed: {}", e);
                VisionResponse::default()
            }
        }
    }

    /// Build the analyze request from tool input. Only caller mistakes fail.
    pub async fn build_request(&self, input: AnalyzeMealInput) -> Result<AnalyzeRequest, ValidationError> {
        let object = match input.reference_object.as_deref() {
            Some(raw) => ReferenceObject::parse(raw)
                .ok_or_else(|| ValidationError::ReferenceObject(raw.to_string()))?,
            None => ReferenceObject::None,
        };

        let request = match (input.foods, input.image_base64) {
            (Some(foods), image) => {
                if image.is_some() {
                    tracing::debug!("Both foods and an image were given, using the supplied foods");
                }
                AnalyzeRequest::new(foods, ReferenceContext::new(object, input.reference))
            }
            (None, Some(image)) => {
                let image_url = image_data_url(&image)?;
                let detections = self.detect(&image_url).await;
                let reference = input.reference.or(detections.reference);
                AnalyzeRequest::new(detections.foods, ReferenceContext::new(object, reference))
            }
            (None, None) => return Err(ValidationError::NoInput),
        };

        request.validate()?;
        Ok(request)
    }

    /// Analyze a validated request on its own task. A panic or a result that
    /// breaks the range invariants becomes the empty result.
    pub async fn run(&self, request: AnalyzeRequest) -> AnalysisResult {
        let analyzer = self.analyzer.clone();
        let handle = tokio::spawn(async move { analyzer.analyze(&request).await });

        match handle.await {
            Ok(Ok(result)) if result.is_well_formed() => result,
            Ok(Ok(_)) => {
                tracing::error!("Analysis produced a malformed result, returning empty result");
                AnalysisResult::empty()
            }
            Ok(Err(e)) => {
                tracing::error!("Analysis rejected a validated request: {}", e);
                AnalysisResult::empty()
            }
            Err(e) => {
                tracing::error!("Analysis task failed: {}", e);
                AnalysisResult::empty()
            }
        }
    }
}

/// Analyze a meal from a photo or from pre-detected foods
pub async fn analyze_meal(pipeline: &MealPipeline, input: AnalyzeMealInput) -> Result<AnalysisResult, String> {
    let request = pipeline.build_request(input).await.map_err(|e| e.to_string())?;
    let food_count = request.foods.len();
    let result = pipeline.run(request).await;
    tracing::info!(
        "Analyzed {} food(s): {} kcal",
        food_count,
        result.total_calories.value
    );
    Ok(result)
}
