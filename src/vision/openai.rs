//! OpenAI chat-completions vision client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{parse_vision_content, VisionClient, VisionError, VisionResponse};
use crate::estimation::PortionStrategy;

pub const OPENAI_CHAT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-mini";

const REFERENCE_SYSTEM_PROMPT: &str = "You are a vision assistant for a calorie estimator. \
Return JSON only. List every food you can see with a confidence between 0 and 1 \
and a pixel bounding box. If a credit card or fork is visible, report it as the reference \
with its own bounding box.";

const REFERENCE_USER_PROMPT: &str = "Identify the foods in this photo. Respond with JSON: \
{\"foods\":[{\"name\":string,\"confidence\":number,\"bbox\":{\"x\":number,\"y\":number,\"width\":number,\"height\":number}}],\
\"reference\":{\"type\":\"credit_card\"|\"fork\",\"bbox\":{\"x\":number,\"y\":number,\"width\":number,\"height\":number}}}. \
Omit bbox or reference when unsure.";

const FACTOR_SYSTEM_PROMPT: &str = "You are a vision assistant for a calorie estimator. \
Return JSON only. List every food you can see with a confidence between 0 and 1 \
and a portionFactor between 0.3 and 3 based on plate size (1.0 = typical serving).";

const FACTOR_USER_PROMPT: &str = "Identify the foods in this photo. Respond with JSON: \
{\"foods\":[{\"name\":string,\"confidence\":number,\"portionFactor\":number}]}. \
Omit portionFactor when unsure.";

/// System and user prompts asking only for the evidence `strategy` honors
fn prompts(strategy: PortionStrategy) -> (&'static str, &'static str) {
    match strategy {
        PortionStrategy::ReferenceObject => (REFERENCE_SYSTEM_PROMPT, REFERENCE_USER_PROMPT),
        PortionStrategy::PortionFactor => (FACTOR_SYSTEM_PROMPT, FACTOR_USER_PROMPT),
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiVisionClient {
    api_key: String,
    model: String,
    strategy: PortionStrategy,
    endpoint: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    response_format: ResponseFormat,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<Part<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Part<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl<'a> },
}

#[derive(Debug, Serialize)]
struct ImageUrl<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiVisionClient {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Result<Self, VisionError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            model,
            strategy: PortionStrategy::default(),
            endpoint: OPENAI_CHAT_ENDPOINT.to_string(),
            client,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Request only the portion evidence the estimator will use
    pub fn with_strategy(mut self, strategy: PortionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    fn build_request<'a>(&'a self, image_url: &'a str) -> ChatRequest<'a> {
        let (system_prompt, user_prompt) = prompts(self.strategy);
        ChatRequest {
            model: &self.model,
            response_format: ResponseFormat { kind: "json_object" },
            messages: vec![
                Message {
                    role: "system",
                    content: MessageContent::Text(system_prompt),
                },
                Message {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        Part::Text { text: user_prompt },
                        Part::ImageUrl {
                            image_url: ImageUrl { url: image_url },
                        },
                    ]),
                },
            ],
        }
    }
}

/// Content of the first choice, if any
fn first_content(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    async fn detect(&self, image_url: &str) -> Result<VisionResponse, VisionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(image_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(VisionError::Status(response.status().as_u16()));
        }

        let body: ChatResponse = response.json().await?;
        let content = first_content(body).ok_or(VisionError::EmptyContent)?;
        let detections = parse_vision_content(&content)?;
        tracing::debug!("Vision model returned {} food(s)", detections.foods.len());
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> OpenAiVisionClient {
        OpenAiVisionClient::new(
            "test-key".to_string(),
            DEFAULT_VISION_MODEL.to_string(),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    #[test]
    fn test_request_shape() {
        let client = client();
        let value = serde_json::to_value(client.build_request("data:image/jpeg;base64,AAAA")).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["response_format"]["type"], "json_object");
        assert_eq!(value["messages"][0]["role"], "system");
        assert!(value["messages"][0]["content"].is_string());
        assert_eq!(value["messages"][1]["content"][0]["type"], "text");
        assert_eq!(value["messages"][1]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAA"
        );
    }

    #[test]
    fn test_first_content() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"{\"foods\":[]}"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(body).as_deref(), Some("{\"foods\":[]}"));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(first_content(empty), None);

        let blank: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"  "}}]}"#).unwrap();
        assert_eq!(first_content(blank), None);
    }

    #[test]
    fn test_prompts_follow_strategy() {
        let reference = serde_json::to_string(&client().build_request("data:,x")).unwrap();
        assert!(reference.contains("credit_card"));
        assert!(!reference.contains("portionFactor"));

        let factor_client = client().with_strategy(PortionStrategy::PortionFactor);
        let factor = serde_json::to_string(&factor_client.build_request("data:,x")).unwrap();
        assert!(factor.contains("portionFactor"));
        assert!(!factor.contains("credit_card"));
        assert!(!factor.contains("reference"));
    }

    fn chat_body(content: &str) -> serde_json::Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    async fn mock_client(server: &MockServer, status: u16, body: serde_json::Value) -> OpenAiVisionClient {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
        client().with_endpoint(format!("{}/v1/chat/completions", server.uri()))
    }

    #[tokio::test]
    async fn test_detect_parses_foods() {
        let server = MockServer::start().await;
        let content = r#"{"foods":[{"name":"pizza","confidence":0.8,"bbox":{"x":0,"y":0,"width":200,"height":200}}],
            "reference":{"type":"credit_card","bbox":{"x":0,"y":0,"width":100,"height":60}}}"#;
        let client = mock_client(&server, 200, chat_body(content)).await;

        let detections = client.detect("data:image/jpeg;base64,AAAAAAAA").await.unwrap();
        assert_eq!(detections.foods.len(), 1);
        assert_eq!(detections.foods[0].name, "pizza");
        assert!(detections.reference.is_some());

        let requests = server.received_requests().await.unwrap();
        let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(sent["model"], "gpt-4o-mini");
        assert_eq!(
            sent["messages"][1]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAAAAAAA"
        );
    }

    #[tokio::test]
    async fn test_detect_maps_error_status() {
        let server = MockServer::start().await;
        let client = mock_client(&server, 503, json!({"error": {"message": "overloaded"}})).await;
        let err = client.detect("data:image/jpeg;base64,AAAAAAAA").await.unwrap_err();
        assert!(matches!(err, VisionError::Status(503)));
    }

    #[tokio::test]
    async fn test_detect_without_content() {
        let server = MockServer::start().await;
        let client = mock_client(&server, 200, json!({"choices": []})).await;
        let err = client.detect("data:image/jpeg;base64,AAAAAAAA").await.unwrap_err();
        assert!(matches!(err, VisionError::EmptyContent));
    }

    #[tokio::test]
    async fn test_detect_rejects_non_json_content() {
        let server = MockServer::start().await;
        let client = mock_client(&server, 200, chat_body("I see a pizza")).await;
        let err = client.detect("data:image/jpeg;base64,AAAAAAAA").await.unwrap_err();
        assert!(matches!(err, VisionError::Decode(_)));
    }

    #[tokio::test]
    async fn test_detect_rejects_invalid_detections() {
        let server = MockServer::start().await;
        let client = mock_client(&server, 200, chat_body(r#"{"foods":[{"name":"soup","confidence":7}]}"#)).await;
        let err = client.detect("data:image/jpeg;base64,AAAAAAAA").await.unwrap_err();
        assert!(matches!(err, VisionError::Invalid(_)));
    }
}
