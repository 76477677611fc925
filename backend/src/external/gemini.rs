//! Gemini text-generation client
//!
//! Used for two things: narrating a computed irrigation amount, and the
//! site assistant that answers free-form questions about the platform.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::ExplanationContext;

use crate::config::ExplainerConfig;
use crate::error::{AppError, AppResult};

/// Substituted whenever no explanation can be generated
pub const EXPLANATION_PLACEHOLDER: &str = "Explanation unavailable at the moment.";

/// Narrates an already computed irrigation amount
#[axum::async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(&self, context: &ExplanationContext) -> AppResult<String>;

    /// Answer a visitor's question about the platform
    async fn answer(&self, question: &str) -> AppResult<String>;
}

/// Used when no API key is configured
#[derive(Debug, Clone, Default)]
pub struct PlaceholderExplainer;

#[axum::async_trait]
impl Explainer for PlaceholderExplainer {
    async fn explain(&self, _context: &ExplanationContext) -> AppResult<String> {
        Ok(EXPLANATION_PLACEHOLDER.to_string())
    }

    async fn answer(&self, _question: &str) -> AppResult<String> {
        Err(AppError::ExplanationService(
            "text generation is not configured".to_string(),
        ))
    }
}

const ASSISTANT_INSTRUCTION: &str = "You are an AI assistant for a water-saving website.
Rules: Answer in simple English. Never give exact water amounts; tell the user to use the 'Calculate' button.
ABOUT THE WEBSITE: This platform helps farmers conserve water in agriculture. It calculates the optimal irrigation amount based on crop type (e.g. corn, wheat), sowing date, last irrigation date and weather data from Open-Meteo (temperature, humidity, rainfall, wind, evaporation).
Website goals: 1. help farmers conserve water resources by avoiding over-irrigation; 2. improve irrigation accuracy using crop type, sowing date, last watering date and reliable weather data; 3. support environmentally sustainable farming practices; 4. increase crop productivity by ensuring plants receive sufficient but not excessive moisture; 5. digitalize agricultural decision-making through modern AI-based tools; 6. provide educational guidance about irrigation principles, crop needs and weather influence; 7. offer accessible analytics without requiring technical expertise.
Limit answers to 3-4 sentences.";

/// Fill the fixed explanation prompt
pub fn explanation_prompt(context: &ExplanationContext) -> String {
    let w = &context.weather;
    format!(
        r#"You are an agricultural decision-support assistant.

The irrigation amount has already been calculated and must NOT be changed.
Your task is to clearly and convincingly explain why this specific amount of
irrigation is recommended under the given conditions.

Write in professional, agronomic English. The explanation should sound factual,
logical, and well-structured, as if written by an irrigation specialist.

Recommended irrigation: {pred:.1} mm

Agronomic thresholds:
- Maize: high temperature >30°C, low rainfall <5 mm/7 days, high ET0 >6 mm/day
- Wheat: high temperature >27°C, low rainfall <7 mm/7 days, high ET0 >5 mm/day

Context:
- Crop type: {crop}
- Days since sowing: {days_since}
- Days since last irrigation: {days_since_last_water}
- Average air temperature: {temp:.1} °C
- Reference evapotranspiration (ET0): {et0:.1} mm/day
- Total precipitation over the last 7 days: {precip:.1} mm
- Average wind speed: {wind:.2} m/s
- Soil moisture level: {soil:.2}
- Recommended irrigation amount: {pred:.1} mm

Guidelines:
- Explain how temperature, rainfall, evapotranspiration, soil moisture,
  crop growth stage, and time since last irrigation affect water demand.
- If a factor is within a normal range, explain why it does not reduce irrigation needs.
- Emphasize potential water stress when rainfall is limited or evapotranspiration is high.
- Do NOT mention machine learning, models, or algorithms.
- Do NOT introduce new data or change the irrigation amount.
- Produce one coherent paragraph of 6–10 sentences.
"#,
        pred = context.predicted_mm,
        crop = context.crop,
        days_since = context.days_since,
        days_since_last_water = context.days_since_last_water,
        temp = w.avg_temp,
        et0 = w.et0,
        precip = w.precip_7d,
        wind = w.wind,
        soil = w.soil_moisture,
    )
}

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }
}

impl GeminiClient {
    /// Create a new GeminiClient from configuration
    pub fn new(config: &ExplainerConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// Generate text for a single prompt
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExplanationService(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExplanationService(format!(
                "API returned {}: {}",
                status, body
            )));
        }

        let data: GenerateResponse = response.json().await.map_err(|e| {
            AppError::ExplanationService(format!("Failed to parse response: {}", e))
        })?;

        data.into_text()
            .ok_or_else(|| AppError::ExplanationService("Response contained no text".to_string()))
    }
}

#[axum::async_trait]
impl Explainer for GeminiClient {
    async fn explain(&self, context: &ExplanationContext) -> AppResult<String> {
        self.generate(&explanation_prompt(context)).await
    }

    async fn answer(&self, question: &str) -> AppResult<String> {
        let prompt = format!("{}\n\nUser: {}", ASSISTANT_INSTRUCTION, question);
        self.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Crop, WeatherAggregates};

    fn context() -> ExplanationContext {
        ExplanationContext {
            crop: Crop::Wheat,
            days_since: 42,
            days_since_last_water: 5,
            weather: WeatherAggregates {
                avg_temp: 21.46,
                et0: 4.04,
                precip_7d: 12.0,
                wind: 2.777,
                soil_moisture: 0.1849,
            },
            predicted_mm: 7.26,
        }
    }

    #[test]
    fn test_prompt_formats_context() {
        let prompt = explanation_prompt(&context());
        assert!(prompt.contains("Recommended irrigation: 7.3 mm"));
        assert!(prompt.contains("- Crop type: wheat"));
        assert!(prompt.contains("- Days since sowing: 42"));
        assert!(prompt.contains("- Days since last irrigation: 5"));
        assert!(prompt.contains("- Average air temperature: 21.5 °C"));
        assert!(prompt.contains("(ET0): 4.0 mm/day"));
        assert!(prompt.contains("last 7 days: 12.0 mm"));
        assert!(prompt.contains("wind speed: 2.78 m/s"));
        assert!(prompt.contains("Soil moisture level: 0.18"));
        assert!(prompt.contains("Do NOT mention machine learning"));
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Water now. "},{"text":"Soil is dry."}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Water now. Soil is dry."));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.into_text().is_none());

        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(blocked.into_text().is_none());
    }

    #[test]
    fn test_placeholder_explainer() {
        let explainer = PlaceholderExplainer;
        let text = tokio_test::block_on(explainer.explain(&context())).unwrap();
        assert_eq!(text, EXPLANATION_PLACEHOLDER);
        assert!(tokio_test::block_on(explainer.answer("hello")).is_err());
    }
}
