//! Calorie Camera Status Tool
//!
//! Provides runtime status information and the usage guide for assistants.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::estimation::PortionStrategy;

/// Usage guide for AI assistants
pub const ESTIMATION_INSTRUCTIONS: &str = r#"
# Calorie Camera Instructions

This guide explains how to estimate the calories of a meal with the Calorie Camera tools.

## Overview

An analysis turns detected foods into:
1. **Portions** - estimated grams per item, with the method used and a weight range
2. **Calories** - energy per item with a ±25% range, plus the kcal/100g used and its source
3. **Total** - the summed calories of the meal with its own range

All numbers are rounded to whole grams / whole calories for display. Totals are computed
from unrounded item values, so the total may differ by one from the sum of displayed items.

---

## Analyzing a Meal

**Tool:** `analyze_meal`

Either send a photo:
```json
{"image_base64": "<base64 or data URL>", "reference_object": "credit_card"}
```

Or send foods you already identified:
```json
{
  "foods": [
    {"name": "pizza", "confidence": 0.8, "bbox": {"x": 0, "y": 0, "width": 200, "height": 200}}
  ],
  "reference_object": "credit_card",
  "reference": {"type": "credit_card", "bbox": {"x": 300, "y": 0, "width": 100, "height": 60}}
}
```

- `confidence` must be between 0 and 1
- `portionFactor` (optional, 0.3 to 3) scales the default serving when the server runs the
  `portion_factor` strategy
- `reference_object` is `none`, `credit_card` or `fork`; the reference box is only used when its
  type matches the selected object

If the photo cannot be analyzed the result is empty (no items, 0 kcal). Ask the user to enter
foods manually with `add_manual_item`.

---

## Portion Methods

| Method | Meaning | Range |
|--------|---------|-------|
| `reference_object` | Scaled by the area of a credit card (46.2 cm²) or fork | ±20% |
| `default_serving` | The food's canonical serving weight | ±35% |
| `user_edit` | Weight given by the user | ±15% |

Missing or zero-area boxes always fall back to `default_serving`.

---

## Looking Up Foods

**Tool:** `search_nutrition`
- Returns up to 5 candidates: the best match first, then table matches
- `source` is `authoritative` (USDA FoodData Central) or `fallback` (built-in table)
- Unknown foods get a generic 200 kcal/100g record with a 150 g serving

**Tool:** `estimate_portion`
- Portion for one food without running a whole analysis
- Give reference geometry OR a `portion_factor`, never both

---

## Correcting Results

All correction tools take the current `items` list and return it with a recomputed total.

- `edit_item` - rename an item (nutrition is looked up again) and/or set its quantity
- `adjust_portion` - move a portion by steps: 10 g per step in `grams`, a quarter serving per
  step in `serving`
- `add_manual_item` - append a food the photo missed (confidence 0.4)

Quantities accept `g`, `kg`, `oz`, `lb` or `serving`/`servings`.

---

## Notes

- Estimates are approximations; present the range alongside the value
- Use `calorie_status` to see which data sources are configured
"#;

/// Which collaborators and strategy the service runs with
#[derive(Debug, Clone, Serialize)]
pub struct CollaboratorStatus {
    pub authoritative_nutrition: bool,
    pub vision_model: Option<String>,
    pub portion_strategy: &'static str,
}

/// Runtime status of the Calorie Camera service
#[derive(Debug, Clone, Serialize)]
pub struct CalorieStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Configured data sources
    pub collaborators: CollaboratorStatus,

    /// Process information
    pub started_at: String,
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    started_at: DateTime<Utc>,
    collaborators: CollaboratorStatus,
}

impl StatusTracker {
    pub fn new(authoritative_nutrition: bool, vision_model: Option<String>, strategy: PortionStrategy) -> Self {
        Self {
            start_time: Instant::now(),
            started_at: Utc::now(),
            collaborators: CollaboratorStatus {
                authoritative_nutrition,
                vision_model,
                portion_strategy: strategy.as_str(),
            },
        }
    }

    /// Get the current status
    pub fn get_status(&self) -> CalorieStatus {
        let build_info = BuildInfo::current();

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        CalorieStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            collaborators: self.collaborators.clone(),
            started_at: self.started_at.to_rfc3339(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_collaborators() {
        let tracker = StatusTracker::new(true, None, PortionStrategy::PortionFactor);
        let status = tracker.get_status();
        assert_eq!(status.process_id, std::process::id());
        assert!(status.collaborators.authoritative_nutrition);
        assert_eq!(status.collaborators.vision_model, None);
        assert_eq!(status.collaborators.portion_strategy, "portion_factor");
        assert!(DateTime::parse_from_rfc3339(&status.started_at).is_ok());
    }

    #[test]
    fn test_instructions_cover_tools() {
        for tool in ["analyze_meal", "search_nutrition", "estimate_portion", "edit_item", "adjust_portion", "add_manual_item"] {
            assert!(ESTIMATION_INSTRUCTIONS.contains(tool), "missing {}", tool);
        }
    }
}
