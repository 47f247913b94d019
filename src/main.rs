//! Calorie Camera
//!
//! An MCP server for estimating meal calories from food photos.

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use calorie_camera::build_info;
use calorie_camera::config::Config;
use calorie_camera::mcp::CalorieService;
use calorie_camera::tools::MealPipeline;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("calorie_camera=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env()?;
    eprintln!(
        "Nutrition source: {}",
        if config.usda_api_key.is_some() { "USDA FoodData Central + fallback table" } else { "fallback table" }
    );
    eprintln!(
        "Vision: {}",
        if config.openai_api_key.is_some() { config.vision_model.as_str() } else { "disabled" }
    );
    eprintln!("Portion strategy: {}", config.portion_strategy.as_str());

    // Create the Calorie Camera service
    let pipeline = MealPipeline::from_config(&config)?;
    let service = CalorieService::new(pipeline, Some(config.vision_model.clone()));

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
