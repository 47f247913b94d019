//! Vision collaborator
//!
//! Turns a meal photo into food detections. Responses are untrusted: they
//! are decoded and validated here, and anything malformed is an error the
//! caller degrades to an empty detection list.

mod openai;

pub use openai::{OpenAiVisionClient, DEFAULT_VISION_MODEL, OPENAI_CHAT_ENDPOINT};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{FoodDetection, ReferenceDetection, ValidationError};

/// Minimum length of an accepted image payload
pub const MIN_IMAGE_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("vision API returned status {0}")]
    Status(u16),

    #[error("vision response had no content")]
    EmptyContent,

    #[error("vision response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("vision response failed validation: {0}")]
    Invalid(#[from] ValidationError),

    #[error("vision request timed out after {0} ms")]
    Timeout(u128),
}

/// Detections for one photo
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct VisionResponse {
    #[serde(default)]
    pub foods: Vec<FoodDetection>,
    #[serde(default)]
    pub reference: Option<ReferenceDetection>,
}

impl VisionResponse {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, food) in self.foods.iter().enumerate() {
            food.validate(index)?;
        }
        if let Some(reference) = &self.reference {
            if !reference.bbox.is_well_formed() {
                return Err(ValidationError::ReferenceBox);
            }
        }
        Ok(())
    }
}

/// Decode and validate the JSON text a vision model returned
pub fn parse_vision_content(content: &str) -> Result<VisionResponse, VisionError> {
    let response: VisionResponse = serde_json::from_str(content)?;
    response.validate()?;
    Ok(response)
}

/// Normalize an image payload to a data URL
pub fn image_data_url(image: &str) -> Result<String, ValidationError> {
    let image = image.trim();
    if image.len() < MIN_IMAGE_LEN {
        return Err(ValidationError::Image);
    }
    if image.starts_with("data:") {
        Ok(image.to_string())
    } else {
        Ok(format!("data:image/jpeg;base64,{}", image))
    }
}

#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Detect foods in a photo given as a data URL
    async fn detect(&self, image_url: &str) -> Result<VisionResponse, VisionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReferenceObject;

    #[test]
    fn test_parse_full_response() {
        let response = parse_vision_content(
            r#"{"foods":[
                {"name":"pizza","confidence":0.82,"bbox":{"x":10,"y":20,"width":200,"height":200}},
                {"name":"salad","confidence":0.6,"portionFactor":1.4}
            ],"reference":{"type":"credit_card","bbox":{"x":300,"y":0,"width":100,"height":60}}}"#,
        )
        .unwrap();
        assert_eq!(response.foods.len(), 2);
        assert_eq!(response.foods[0].name, "pizza");
        assert_eq!(response.foods[1].portion_factor, Some(1.4));
        let reference = response.reference.unwrap();
        assert_eq!(reference.kind, ReferenceObject::CreditCard);
        assert_eq!(reference.bbox.area(), 6000.0);
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let response = parse_vision_content(
            r#"{"foods":[{"name":"apple","confidence":0.9}],"plate":{"visible":true,"diameter_cm":26}}"#,
        )
        .unwrap();
        assert_eq!(response.foods.len(), 1);
        assert_eq!(response.reference, None);
    }

    #[test]
    fn test_parse_rejects_invalid_shapes() {
        assert!(matches!(
            parse_vision_content("not json"),
            Err(VisionError::Decode(_))
        ));
        assert!(matches!(
            parse_vision_content(r#"{"foods":[{"name":"apple","confidence":7}]}"#),
            Err(VisionError::Invalid(ValidationError::Confidence { index: 0, .. }))
        ));
        assert!(matches!(
            parse_vision_content(r#"{"foods":[{"name":"apple","confidence":0.9,"portionFactor":9}]}"#),
            Err(VisionError::Invalid(ValidationError::PortionFactor { .. }))
        ));
        assert!(matches!(
            parse_vision_content(r#"{"foods":[{"confidence":0.9}]}"#),
            Err(VisionError::Decode(_))
        ));
    }

    #[test]
    fn test_image_data_url() {
        assert_eq!(
            image_data_url("iVBORw0KGgoAAAANSUhEUg").unwrap(),
            "data:image/jpeg;base64,iVBORw0KGgoAAAANSUhEUg"
        );
        assert_eq!(
            image_data_url("data:image/png;base64,iVBORw0KGgo").unwrap(),
            "data:image/png;base64,iVBORw0KGgo"
        );
        assert_eq!(image_data_url("abc"), Err(ValidationError::Image));
    }
}
