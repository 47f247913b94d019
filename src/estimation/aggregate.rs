//! Meal analysis
//!
//! Per detection: resolve nutrition, estimate the portion, estimate calories.
//! Detections are evaluated concurrently and presented in input order. The
//! total is computed from unrounded item values and rounded once.

use futures::future::join_all;

use super::calories::estimate_calories;
use super::portion::{estimate_portion_for, PortionStrategy};
use super::rounding::{round, Range, DEFAULT_PRECISION};
use crate::models::{
    AnalysisResult, AnalyzeRequest, CalorieEstimate, FoodDetection, NutritionRecord,
    PortionEstimate, ReferenceContext, ResultItem, TotalCalories, ValidationError,
};
use crate::nutrition::NutritionResolver;

/// Unrounded estimate for one detection
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEstimate {
    pub name: String,
    pub confidence: f64,
    pub nutrition: NutritionRecord,
    pub portion: PortionEstimate,
    pub calories: CalorieEstimate,
}

impl ItemEstimate {
    /// Presentation form, rounded at the given precision
    pub fn present(&self, digits: u32) -> ResultItem {
        ResultItem {
            name: self.name.clone(),
            confidence: self.confidence,
            portion: self.portion.rounded(digits),
            calories: self.calories.rounded(digits),
            serving_grams: self.nutrition.serving_grams,
            serving_label: self.nutrition.serving_label.clone(),
        }
    }
}

/// Stateless analyzer; cheap to clone into spawned tasks
#[derive(Debug, Clone, Default)]
pub struct MealAnalyzer {
    resolver: NutritionResolver,
    strategy: PortionStrategy,
}

impl MealAnalyzer {
    pub fn new(resolver: NutritionResolver, strategy: PortionStrategy) -> Self {
        Self { resolver, strategy }
    }

    pub fn resolver(&self) -> &NutritionResolver {
        &self.resolver
    }

    pub fn strategy(&self) -> PortionStrategy {
        self.strategy
    }

    /// Validate the request, then estimate every detection
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, ValidationError> {
        request.validate()?;
        let estimates = self
            .estimate_items(&request.foods, &request.reference_context)
            .await;
        Ok(aggregate(&estimates))
    }

    /// Estimate each detection independently; output order matches input order
    pub async fn estimate_items(
        &self,
        foods: &[FoodDetection],
        reference: &ReferenceContext,
    ) -> Vec<ItemEstimate> {
        join_all(foods.iter().map(|food| self.estimate_item(food, reference))).await
    }

    pub async fn estimate_item(
        &self,
        detection: &FoodDetection,
        reference: &ReferenceContext,
    ) -> ItemEstimate {
        let nutrition = self.resolver.resolve(&detection.name).await;
        let hint = self.strategy.hint_for(detection, reference);
        let portion = estimate_portion_for(&nutrition, &hint);
        let calories = estimate_calories(portion.grams, &nutrition);

        tracing::debug!(
            "Estimated '{}': {:.1} g via {}, {:.1} kcal ({})",
            detection.name,
            portion.grams,
            portion.method.as_str(),
            calories.value,
            nutrition.source.as_str()
        );

        ItemEstimate {
            name: detection.name.clone(),
            confidence: detection.confidence,
            nutrition,
            portion,
            calories,
        }
    }
}

/// Present items and sum their unrounded calories bound-wise
pub fn aggregate(estimates: &[ItemEstimate]) -> AnalysisResult {
    let value: f64 = estimates.iter().map(|e| e.calories.value).sum();
    let range: Range = estimates.iter().map(|e| e.calories.range).sum();

    AnalysisResult {
        items: estimates.iter().map(|e| e.present(DEFAULT_PRECISION)).collect(),
        total_calories: TotalCalories {
            value: round(value, DEFAULT_PRECISION),
            range: range.rounded(DEFAULT_PRECISION),
        },
    }
}

/// Total over already presented items, for lists edited after analysis
pub fn recompute_total(items: &[ResultItem]) -> TotalCalories {
    let value: f64 = items.iter().map(|i| i.calories.value).sum();
    let range: Range = items.iter().map(|i| i.calories.range).sum();
    TotalCalories {
        value: round(value, DEFAULT_PRECISION),
        range: range.rounded(DEFAULT_PRECISION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BoundingBox, NutritionSource, PortionMethod, ReferenceDetection, ReferenceObject,
    };

    fn request(names: &[&str]) -> AnalyzeRequest {
        AnalyzeRequest::new(
            names.iter().map(|n| FoodDetection::new(*n, 0.9)).collect(),
            ReferenceContext::default(),
        )
    }

    #[tokio::test]
    async fn test_apple_scenario() {
        let result = MealAnalyzer::default()
            .analyze(&request(&["apple"]))
            .await
            .unwrap();
        let apple = &result.items[0];
        assert_eq!(apple.name, "apple");
        assert_eq!(apple.portion.method, PortionMethod::DefaultServing);
        assert_eq!(apple.portion.grams, 182.0);
        assert_eq!(apple.calories.value, 95.0);
        assert_eq!(apple.calories.range, Range::new(71.0, 118.0));
        assert_eq!(apple.calories.per100g, 52.0);
        assert_eq!(apple.serving_label, "1 medium");
        assert_eq!(result.total_calories.value, 95.0);
        assert!(result.is_well_formed());
    }

    #[tokio::test]
    async fn test_pizza_with_credit_card() {
        let card = BoundingBox::new(400.0, 0.0, 100.0, 60.0);
        let request = AnalyzeRequest::new(
            vec![FoodDetection::new("pizza", 0.8).with_bbox(BoundingBox::new(0.0, 0.0, 200.0, 200.0))],
            ReferenceContext::new(
                ReferenceObject::CreditCard,
                Some(ReferenceDetection {
                    kind: ReferenceObject::CreditCard,
                    bbox: card,
                }),
            ),
        );
        let result = MealAnalyzer::default().analyze(&request).await.unwrap();
        let pizza = &result.items[0];
        assert_eq!(pizza.portion.method, PortionMethod::ReferenceObject);
        assert_eq!(pizza.portion.grams, 412.0);
        assert_eq!(pizza.portion.range_grams, Range::new(330.0, 494.0));
    }

    #[tokio::test]
    async fn test_unknown_food() {
        let result = MealAnalyzer::default()
            .analyze(&request(&["quinoa bowl"]))
            .await
            .unwrap();
        let item = &result.items[0];
        assert_eq!(item.calories.value, 300.0);
        assert_eq!(item.calories.source, NutritionSource::Fallback);
        assert_eq!(item.serving_grams, 150.0);
    }

    #[tokio::test]
    async fn test_total_sums_unrounded_values() {
        // 94.64 + 105.02 + 284.62 = 484.28; the rounded items would sum to 485
        let result = MealAnalyzer::default()
            .analyze(&request(&["apple", "banana", "pizza"]))
            .await
            .unwrap();
        let item_sum: f64 = result.items.iter().map(|i| i.calories.value).sum();
        assert_eq!(item_sum, 485.0);
        assert_eq!(result.total_calories.value, 484.0);
        assert_eq!(result.total_calories.range, Range::new(363.0, 605.0));
    }

    #[tokio::test]
    async fn test_order_follows_input() {
        let names = ["soup", "steak", "apple", "taco", "quinoa bowl"];
        let result = MealAnalyzer::default().analyze(&request(&names)).await.unwrap();
        let out: Vec<&str> = result.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(out, names);
    }

    #[tokio::test]
    async fn test_idempotent_output() {
        let analyzer = MealAnalyzer::default();
        let request = request(&["rice", "chicken breast", "salad"]);
        let first = serde_json::to_string(&analyzer.analyze(&request).await.unwrap()).unwrap();
        let second = serde_json::to_string(&analyzer.analyze(&request).await.unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_request() {
        let result = MealAnalyzer::default().analyze(&request(&[])).await.unwrap();
        assert_eq!(result, AnalysisResult::empty());
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected() {
        let bad = AnalyzeRequest::new(
            vec![FoodDetection::new("apple", 1.5)],
            ReferenceContext::default(),
        );
        let err = MealAnalyzer::default().analyze(&bad).await.unwrap_err();
        assert!(matches!(err, ValidationError::Confidence { index: 0, .. }));
    }

    #[tokio::test]
    async fn test_portion_factor_strategy() {
        let analyzer = MealAnalyzer::new(NutritionResolver::offline(), PortionStrategy::PortionFactor);
        let request = AnalyzeRequest::new(
            vec![FoodDetection::new("apple", 0.9).with_portion_factor(2.0)],
            ReferenceContext::default(),
        );
        let result = analyzer.analyze(&request).await.unwrap();
        assert_eq!(result.items[0].portion.grams, 364.0);
        assert_eq!(result.items[0].portion.method, PortionMethod::DefaultServing);
    }

    #[test]
    fn test_recompute_total() {
        let estimates: Vec<ItemEstimate> = Vec::new();
        assert_eq!(aggregate(&estimates).total_calories, TotalCalories::default());
        assert_eq!(recompute_total(&[]), TotalCalories::default());
    }
}
