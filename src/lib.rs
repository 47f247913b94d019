//! Calorie Camera Library
//!
//! Calorie estimation for meals: portion inference from photo detections,
//! nutrition resolution with fallback, and calorie ranges.

pub mod build_info;
pub mod config;
pub mod estimation;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod tools;
pub mod vision;
