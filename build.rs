//! Build script for Calorie Camera
//!
//! Increments build number on each recompilation and embeds build metadata.

use std::fs;
use std::path::Path;

fn main() {
    // Only rerun when src/ files change (not on every cargo build)
    println!("cargo:rerun-if-changed=src");

    // Build counter lives next to Cargo.toml
    let build_number_path = Path::new("build_number.txt");

    // Missing or unreadable counter starts over at 0
    let current_build: u64 = if build_number_path.exists() {
        fs::read_to_string(build_number_path)
            .unwrap_or_else(|_| "0".to_string())
            .trim()
            .parse()
            .unwrap_or(0)
    } else {
        0
    };

    let new_build = current_build + 1;

    // Persist the counter for the next build
    fs::write(build_number_path, new_build.to_string())
        .expect("Failed to write build number file");

    // UTC compile time, read back by build_info::BUILD_TIMESTAMP
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    // Embedded with option_env! in src/build_info.rs
    println!("cargo:rustc-env=CALCAM_BUILD_NUMBER={}", new_build);
    println!("cargo:rustc-env=CALCAM_BUILD_TIMESTAMP={}", timestamp);

    // Shown in the cargo build log
    println!("cargo:warning=Calorie Camera build #{} at {}", new_build, timestamp);
}
