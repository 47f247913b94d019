//! Portion units and weight conversion
//!
//! Manual corrections may give a quantity in a weight unit or in servings of
//! the food's canonical serving. Everything is converted to grams.

/// Unit a portion is displayed and stepped in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortionUnit {
    #[default]
    Grams,
    Serving,
}

impl PortionUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "g" | "gram" | "grams" => Some(PortionUnit::Grams),
            "serving" | "servings" => Some(PortionUnit::Serving),
            _ => None,
        }
    }
}

// ============================================================================
// Weight Conversion Constants (to grams)
// ============================================================================

/// Grams per kilogram
pub const G_PER_KG: f64 = 1000.0;
/// Grams per ounce
pub const G_PER_OZ: f64 = 28.3495;
/// Grams per pound
pub const G_PER_LB: f64 = 453.592;

/// Step size in gram display
pub const GRAM_STEP: f64 = 10.0;
/// Step size in serving display, as a fraction of one serving
pub const SERVING_STEP_FRACTION: f64 = 0.25;

/// Get the conversion factor to grams for a weight unit
pub fn grams_per_unit(unit: &str) -> Option<f64> {
    let lower = unit.to_lowercase();
    let trimmed = lower.trim();

    match trimmed {
        "g" | "gram" | "grams" => Some(1.0),
        "kg" | "kilogram" | "kilograms" => Some(G_PER_KG),
        "oz" | "ounce" | "ounces" => Some(G_PER_OZ),
        "lb" | "lbs" | "pound" | "pounds" => Some(G_PER_LB),
        _ => None,
    }
}

/// Convert a quantity to grams; servings are relative to `serving_grams`
pub fn quantity_to_grams(quantity: f64, unit: &str, serving_grams: f64) -> Option<f64> {
    if let Some(factor) = grams_per_unit(unit) {
        return Some(quantity * factor);
    }
    match PortionUnit::parse(unit) {
        Some(PortionUnit::Serving) => Some(quantity * serving_grams),
        _ => None,
    }
}

/// Grams moved by one adjustment step in the given display unit
pub fn step_grams(unit: PortionUnit, serving_grams: f64) -> f64 {
    match unit {
        PortionUnit::Grams => GRAM_STEP,
        PortionUnit::Serving => serving_grams * SERVING_STEP_FRACTION,
    }
}

/// Human-readable portion, e.g. "182 g" or "1.5 serving"
pub fn display_portion(grams: f64, serving_grams: f64, unit: PortionUnit) -> String {
    match unit {
        PortionUnit::Serving if serving_grams > 0.0 => {
            format!("{:.1} serving", grams / serving_grams)
        }
        _ => format!("{} g", grams.round()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grams_per_unit() {
        assert_eq!(grams_per_unit("g"), Some(1.0));
        assert_eq!(grams_per_unit("OZ"), Some(G_PER_OZ));
        assert_eq!(grams_per_unit("lb"), Some(G_PER_LB));
        assert_eq!(grams_per_unit("cup"), None);
    }

    #[test]
    fn test_quantity_to_grams() {
        assert_eq!(quantity_to_grams(250.0, "g", 182.0), Some(250.0));
        assert_eq!(quantity_to_grams(0.5, "kg", 182.0), Some(500.0));
        assert_eq!(quantity_to_grams(2.0, "servings", 118.0), Some(236.0));
        assert_eq!(quantity_to_grams(1.0, "cup", 158.0), None);
    }

    #[test]
    fn test_step_grams() {
        assert_eq!(step_grams(PortionUnit::Grams, 182.0), 10.0);
        assert_eq!(step_grams(PortionUnit::Serving, 120.0), 30.0);
    }

    #[test]
    fn test_display_portion() {
        assert_eq!(display_portion(182.0, 182.0, PortionUnit::Grams), "182 g");
        assert_eq!(display_portion(273.0, 182.0, PortionUnit::Serving), "1.5 serving");
        assert_eq!(display_portion(50.0, 0.0, PortionUnit::Serving), "50 g");
    }

    #[test]
    fn test_unit_parse() {
        assert_eq!(PortionUnit::parse("g"), Some(PortionUnit::Grams));
        assert_eq!(PortionUnit::parse("Servings"), Some(PortionUnit::Serving));
        assert_eq!(PortionUnit::parse("cup"), None);
    }
}
