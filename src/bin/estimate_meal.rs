//! Utility to analyze a meal from a JSON request without the MCP server
//!
//! Usage: estimate_meal [request.json]
//! Reads stdin when no file is given. The request has the same shape as the
//! analyze_meal tool input, e.g. {"foods":[{"name":"apple","confidence":0.9}]}

use std::io::Read;

use tracing_subscriber::EnvFilter;

use calorie_camera::config::Config;
use calorie_camera::tools::{analyze_meal, AnalyzeMealInput, MealPipeline};

fn read_request() -> Result<String, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) if path != "-" => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("calorie_camera=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    let pipeline = MealPipeline::from_config(&config)?;

    let input: AnalyzeMealInput = serde_json::from_str(&read_request()?)?;
    let result = analyze_meal(&pipeline, input).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
