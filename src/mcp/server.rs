//! Calorie Camera MCP Server Implementation
//!
//! Implements the MCP server with all Calorie Camera tools.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::models::{BoundingBox, FoodDetection, ReferenceDetection, ReferenceObject, ResultItem};
use crate::nutrition::PortionUnit;
use crate::tools::items::{self, PortionQuery};
use crate::tools::status::StatusTracker;
use crate::tools::{analyze, search, AnalyzeMealInput, MealPipeline};

/// Calorie Camera MCP Service
#[derive(Clone)]
pub struct CalorieService {
    status_tracker: Arc<StatusTracker>,
    pipeline: MealPipeline,
    tool_router: ToolRouter<CalorieService>,
}

impl CalorieService {
    pub fn new(pipeline: MealPipeline, vision_model: Option<String>) -> Self {
        let status_tracker = StatusTracker::new(
            pipeline.resolver().has_authoritative_source(),
            vision_model.filter(|_| pipeline.has_vision()),
            pipeline.analyzer().strategy(),
        );
        Self {
            status_tracker: Arc::new(status_tracker),
            pipeline,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Shared Parameter Structs
// ============================================================================

/// Pixel bounding box
#[derive(Debug, Clone, Copy, Deserialize, schemars::JsonSchema)]
pub struct BoxParam {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<BoxParam> for BoundingBox {
    fn from(b: BoxParam) -> Self {
        BoundingBox::new(b.x, b.y, b.width, b.height)
    }
}

/// One detected food
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct FoodParam {
    /// Food name, e.g. "pizza"
    pub name: String,
    /// Detector confidence between 0 and 1
    pub confidence: f64,
    /// Bounding box of the food in the photo (optional)
    pub bbox: Option<BoxParam>,
    /// Multiplier on the default serving, 0.3 to 3 (optional)
    #[serde(rename = "portionFactor", alias = "portion_factor")]
    pub portion_factor: Option<f64>,
}

impl From<FoodParam> for FoodDetection {
    fn from(p: FoodParam) -> Self {
        FoodDetection {
            name: p.name,
            confidence: p.confidence,
            bbox: p.bbox.map(BoundingBox::from),
            portion_factor: p.portion_factor,
        }
    }
}

/// Reference object found in the photo
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReferenceParam {
    /// Object type: credit_card or fork
    #[serde(rename = "type")]
    pub kind: String,
    /// Bounding box of the object
    pub bbox: BoxParam,
}

fn default_unit() -> String { "g".to_string() }
fn default_step_unit() -> String { "grams".to_string() }

fn invalid(message: String) -> McpError {
    McpError::invalid_params(message, None)
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Decode the caller's item list (as returned by analyze_meal or an edit tool)
fn parse_items(items: Vec<serde_json::Value>) -> Result<Vec<ResultItem>, McpError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value(value).map_err(|e| invalid(format!("item #{}: {}", i, e)))
        })
        .collect()
}

// ============================================================================
// Tool Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeMealParams {
    /// Meal photo as base64 or a data URL (optional if foods are given)
    pub image_base64: Option<String>,
    /// Foods already detected (optional if an image is given)
    pub foods: Option<Vec<FoodParam>>,
    /// Calibration object in the photo: none, credit_card or fork (default none)
    pub reference_object: Option<String>,
    /// Where the calibration object was found (optional)
    pub reference: Option<ReferenceParam>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchNutritionParams {
    /// Free-text food name
    pub query: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EstimatePortionParams {
    /// Food name
    pub name: String,
    /// Calibration object: none, credit_card or fork (optional)
    pub reference_object: Option<String>,
    /// Bounding box of the food (optional)
    pub food_bbox: Option<BoxParam>,
    /// Bounding box of the calibration object (optional)
    pub reference_bbox: Option<BoxParam>,
    /// Multiplier on the default serving, 0.3 to 3 (optional, not with reference geometry)
    pub portion_factor: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EditItemParams {
    /// Current item list from analyze_meal or a previous edit
    pub items: Vec<serde_json::Value>,
    /// Position of the item to edit (0-based)
    pub index: usize,
    /// New name (optional; nutrition is looked up again)
    pub name: Option<String>,
    /// New quantity
    pub quantity: f64,
    /// Unit: g, kg, oz, lb or serving (default g)
    #[serde(default = "default_unit")]
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AdjustPortionParams {
    /// Current item list from analyze_meal or a previous edit
    pub items: Vec<serde_json::Value>,
    /// Position of the item to adjust (0-based)
    pub index: usize,
    /// Number of steps, negative to decrease
    pub steps: i32,
    /// Step unit: grams (10 g per step) or serving (quarter serving per step)
    #[serde(default = "default_step_unit")]
    pub unit: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddManualItemParams {
    /// Current item list (default empty)
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    /// Food name
    pub name: String,
    /// Quantity eaten
    pub quantity: f64,
    /// Unit: g, kg, oz, lb or serving (default g)
    #[serde(default = "default_unit")]
    pub unit: String,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl CalorieService {
    // --- Status ---

    #[tool(description = "Get the current status of the Calorie Camera service including build info, configured data sources, and process information")]
    async fn calorie_status(&self) -> Result<CallToolResult, McpError> {
        to_json(&self.status_tracker.get_status())
    }

    #[tool(description = "Get instructions for estimating meal calories. Call this before the first analysis or when unsure how to use the tools.")]
    fn estimation_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::ESTIMATION_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(ESTIMATION_INSTRUCTIONS)]))
    }

    // --- Estimation ---

    #[tool(description = "Estimate the calories of a meal from a photo (base64) or from a list of detected foods. Returns per-item portions and calories with ranges, and a total.")]
    async fn analyze_meal(&self, Parameters(p): Parameters<AnalyzeMealParams>) -> Result<CallToolResult, McpError> {
        let reference = match p.reference {
            Some(r) => {
                let kind = ReferenceObject::parse(&r.kind)
                    .ok_or_else(|| invalid(format!("unknown reference type '{}'", r.kind)))?;
                Some(ReferenceDetection { kind, bbox: r.bbox.into() })
            }
            None => None,
        };
        let input = AnalyzeMealInput {
            image_base64: p.image_base64,
            foods: p.foods.map(|foods| foods.into_iter().map(FoodDetection::from).collect()),
            reference_object: p.reference_object,
            reference,
        };
        let result = analyze::analyze_meal(&self.pipeline, input).await.map_err(invalid)?;
        to_json(&result)
    }

    #[tool(description = "Search nutrition data for a food name. Returns up to 5 candidates with kcal per 100g and serving size.")]
    async fn search_nutrition(&self, Parameters(p): Parameters<SearchNutritionParams>) -> Result<CallToolResult, McpError> {
        let result = search::search_nutrition(self.pipeline.resolver(), &p.query).await.map_err(invalid)?;
        to_json(&result)
    }

    #[tool(description = "Estimate the portion weight of a single food from optional reference-object geometry or a portion factor")]
    async fn estimate_portion(&self, Parameters(p): Parameters<EstimatePortionParams>) -> Result<CallToolResult, McpError> {
        let query = PortionQuery {
            name: p.name,
            reference_object: p.reference_object,
            food_bbox: p.food_bbox.map(BoundingBox::from),
            reference_bbox: p.reference_bbox.map(BoundingBox::from),
            portion_factor: p.portion_factor,
        };
        let result = items::estimate_portion(self.pipeline.resolver(), query).await.map_err(invalid)?;
        to_json(&result)
    }

    // --- Corrections ---

    #[tool(description = "Correct one item of an analyzed meal: rename it and/or set its quantity. Returns the updated item list and total.")]
    async fn edit_item(&self, Parameters(p): Parameters<EditItemParams>) -> Result<CallToolResult, McpError> {
        let list = parse_items(p.items)?;
        let result = items::edit_item(self.pipeline.resolver(), list, p.index, p.name.as_deref(), p.quantity, &p.unit)
            .await
            .map_err(invalid)?;
        to_json(&result)
    }

    #[tool(description = "Step one item's portion up or down by 10 g or a quarter serving per step. Returns the updated item list and total.")]
    fn adjust_portion(&self, Parameters(p): Parameters<AdjustPortionParams>) -> Result<CallToolResult, McpError> {
        let unit = PortionUnit::parse(&p.unit)
            .ok_or_else(|| invalid(format!("unknown step unit '{}', expected grams or serving", p.unit)))?;
        let list = parse_items(p.items)?;
        let result = items::adjust_portion(list, p.index, p.steps, unit).map_err(invalid)?;
        to_json(&result)
    }

    #[tool(description = "Add a food by name and quantity, e.g. when the photo missed it. Returns the updated item list and total.")]
    async fn add_manual_item(&self, Parameters(p): Parameters<AddManualItemParams>) -> Result<CallToolResult, McpError> {
        let list = parse_items(p.items)?;
        let result = items::add_manual_item(self.pipeline.resolver(), list, &p.name, p.quantity, &p.unit)
            .await
            .map_err(invalid)?;
        to_json(&result)
    }
}

#[tool_handler]
impl ServerHandler for CalorieService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "calorie-camera".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Calorie Camera".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Calorie Camera - meal calorie estimation from food photos. \
                 IMPORTANT: Call estimation_instructions first. \
                 Estimate: analyze_meal (photo or detected foods), estimate_portion, search_nutrition. \
                 Correct: edit_item, adjust_portion, add_manual_item. \
                 Status: calorie_status."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimation::PortionStrategy;

    #[test]
    fn test_food_param_conversion() {
        let param: FoodParam = serde_json::from_str(
            r#"{"name":"salad","confidence":0.7,"bbox":{"x":1,"y":2,"width":30,"height":40},"portionFactor":1.2}"#,
        )
        .unwrap();
        let detection = FoodDetection::from(param);
        assert_eq!(detection.name, "salad");
        assert_eq!(detection.bbox, Some(BoundingBox::new(1.0, 2.0, 30.0, 40.0)));
        assert_eq!(detection.portion_factor, Some(1.2));
    }

    #[test]
    fn test_parse_items_reports_position() {
        let err = parse_items(vec![serde_json::json!({"name": "apple"})]).unwrap_err();
        assert!(err.message.contains("item #0"));
        assert!(parse_items(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_server_info() {
        let service = CalorieService::new(MealPipeline::offline(PortionStrategy::default()), Some("gpt-4o-mini".to_string()));
        let info = service.get_info();
        assert_eq!(info.server_info.name, "calorie-camera");
        // no vision client, so no model is reported
        assert_eq!(service.status_tracker.get_status().collaborators.vision_model, None);
    }
}
