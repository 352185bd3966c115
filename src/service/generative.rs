//! Generative-model pricing backend.
//!
//! Sends a natural-language prompt with the five request fields and the
//! town's fare rubric to a `generateContent` endpoint and asks for a JSON
//! object `{price: number, reasoning: string}` back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::pricing::{PricingModel, QuoteRequest, RawQuote};
use crate::config::PricingConfig;
use crate::error::AppError;

/// Fare rubric the model is asked to follow.
pub const PRICING_RUBRIC: &str = "\
- Urban motorcycle: fixed R$ 10.00.
- Rural motorcycle: R$ 20.00 to R$ 40.00.
- Urban car: R$ 15.00 to R$ 25.00.
- Rural car or out-of-town trip: distance based (estimate R$ 2.50/km).
- Van or freight: R$ 50.00 to R$ 150.00 depending on the load.";

/// Builds the prompt for one request.
#[must_use]
pub fn build_prompt(request: &QuoteRequest, city: &str) -> String {
    format!(
        "You are the fare calculator of the ride app of {city}.\n\
         \n\
         Context:\n\
         Vehicle: {vehicle}\n\
         Service: {service}\n\
         Origin (pickup): {origin}\n\
         Destination (drop-off): {destination}\n\
         Additional details: {details}\n\
         \n\
         Business rules:\n\
         {PRICING_RUBRIC}\n\
         \n\
         Return JSON with:\n\
         - price (number): suggested price in BRL.\n\
         - reasoning (string): short explanation (max 10 words).",
        vehicle = request.vehicle_type,
        service = request.service_type,
        origin = request.origin_or_current(),
        destination = request.destination,
        details = request.details,
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [PartOut<'a>; 1],
}

#[derive(Debug, Serialize)]
struct PartOut<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartIn>,
}

#[derive(Debug, Deserialize)]
struct PartIn {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
    }
}

/// Parses the model's text answer. An empty answer reads as `{}`.
///
/// # Errors
///
/// Returns [`AppError::Pricing`] if the text is not a JSON object.
pub fn parse_answer(text: &str) -> Result<RawQuote, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(RawQuote::default());
    }
    serde_json::from_str(text).map_err(|e| AppError::Pricing(format!("unparsable answer: {e}")))
}

/// HTTP client for a hosted generative model.
#[derive(Debug, Clone)]
pub struct GenerativePricingModel {
    http: reqwest::Client,
    config: PricingConfig,
    city: String,
}

impl GenerativePricingModel {
    /// Creates the client.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Pricing`] if the HTTP client cannot be built.
    pub fn new(config: PricingConfig, city: impl Into<String>) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            config,
            city: city.into(),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl PricingModel for GenerativePricingModel {
    async fn suggest(&self, request: &QuoteRequest) -> Result<RawQuote, AppError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(AppError::Pricing("no pricing api key configured".to_string()));
        };

        let prompt = build_prompt(request, &self.city);
        let body = GenerateRequest {
            contents: [Content {
                parts: [PartOut { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: serde_json::json!({
                    "type": "OBJECT",
                    "properties": {
                        "price": { "type": "NUMBER" },
                        "reasoning": { "type": "STRING" }
                    }
                }),
            },
        };

        let response: GenerateResponse = self
            .http
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_answer(response.first_text().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ServiceType, VehicleType};

    fn request() -> QuoteRequest {
        QuoteRequest {
            vehicle_type: VehicleType::Van,
            service_type: ServiceType::Freight,
            origin: None,
            destination: "Fazenda Boa Vista".to_string(),
            details: "sofa and fridge".to_string(),
        }
    }

    #[test]
    fn prompt_embeds_all_fields_and_rubric() {
        let prompt = build_prompt(&request(), "Santo Antônio do Amparo");
        assert!(prompt.contains("Vehicle: Van"));
        assert!(prompt.contains("Service: Frete/Mudança"));
        assert!(prompt.contains("Origin (pickup): current location"));
        assert!(prompt.contains("Destination (drop-off): Fazenda Boa Vista"));
        assert!(prompt.contains("Additional details: sofa and fridge"));
        assert!(prompt.contains("R$ 2.50/km"));
        assert!(prompt.contains("Santo Antônio do Amparo"));
    }

    #[test]
    fn parses_structured_answer() {
        let Ok(raw) = parse_answer(r#"{"price": 120, "reasoning": "van freight to farm"}"#) else {
            panic!("answer should parse");
        };
        assert_eq!(raw.price, Some(serde_json::json!(120)));
        assert_eq!(raw.reasoning.as_deref(), Some("van freight to farm"));
    }

    #[test]
    fn empty_answer_is_blank_quote() {
        assert_eq!(parse_answer("  ").ok(), Some(RawQuote::default()));
    }

    #[test]
    fn garbage_answer_is_an_error() {
        assert!(parse_answer("sure! it costs 30").is_err());
    }

    #[test]
    fn response_text_is_extracted() {
        let json = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"price\": 42}" }] } }]
        });
        let Ok(resp) = serde_json::from_value::<GenerateResponse>(json) else {
            panic!("response should parse");
        };
        assert_eq!(resp.first_text(), Some("{\"price\": 42}"));
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let Ok(model) = GenerativePricingModel::new(PricingConfig::default(), "Town") else {
            panic!("client should build");
        };
        assert!(model.suggest(&request()).await.is_err());
    }
}
