//! Detection geometry
//!
//! Bounding boxes and calibration reference objects as supplied by the
//! vision collaborator. Pixel units, axis-aligned.

use serde::{Deserialize, Serialize};

/// Physical area of an ISO/IEC 7810 ID-1 card (85.60 x 53.98 mm)
pub const CREDIT_CARD_AREA_CM2: f64 = 46.2;
/// Approximate top-down footprint of a dinner fork
pub const FORK_AREA_CM2: f64 = 20.0;

/// Axis-aligned box in image-pixel units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Area in square pixels
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True when the box has a strictly positive, finite pixel area
    pub fn has_area(&self) -> bool {
        let area = self.area();
        self.width > 0.0 && self.height > 0.0 && area.is_finite() && area > 0.0
    }

    /// Structural check: finite coordinates, non-negative extent
    pub fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// Calibration object of known physical size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceObject {
    #[default]
    None,
    CreditCard,
    Fork,
}

impl ReferenceObject {
    /// Known physical area in cm², `None` for [`ReferenceObject::None`]
    pub fn area_cm2(&self) -> Option<f64> {
        match self {
            ReferenceObject::None => None,
            ReferenceObject::CreditCard => Some(CREDIT_CARD_AREA_CM2),
            ReferenceObject::Fork => Some(FORK_AREA_CM2),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceObject::None => "none",
            ReferenceObject::CreditCard => "credit_card",
            ReferenceObject::Fork => "fork",
        }
    }

    /// Parse from string; unrecognized values are rejected
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "none" | "" => Some(ReferenceObject::None),
            "credit_card" | "card" => Some(ReferenceObject::CreditCard),
            "fork" => Some(ReferenceObject::Fork),
            _ => None,
        }
    }
}

/// Where a reference object was found in the photo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDetection {
    #[serde(rename = "type")]
    pub kind: ReferenceObject,
    pub bbox: BoundingBox,
}

/// The reference object the caller selected plus what the detector found
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceContext {
    #[serde(default)]
    pub object: ReferenceObject,
    #[serde(default)]
    pub detection: Option<ReferenceDetection>,
}

impl ReferenceContext {
    pub fn new(object: ReferenceObject, detection: Option<ReferenceDetection>) -> Self {
        Self { object, detection }
    }

    /// Reference box, only when the detected object matches the selected one
    pub fn reference_box(&self) -> Option<BoundingBox> {
        self.detection
            .filter(|d| d.kind == self.object && self.object != ReferenceObject::None)
            .map(|d| d.bbox)
    }
}
