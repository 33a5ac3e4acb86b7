//! Blocking client for the Gemini `generateContent` endpoint.
//!
//! Implements both remote collaborators. Every failure comes back as a
//! `GeneratorError`; the provider and advisor wrappers decide the fallback.

use crate::{
    config::GeneratorConfig,
    error::GeneratorError,
    metrics::{MetricKey, Metrics},
    provider::{Advisor, ScenarioGenerator},
    scenario::Scenario,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const SCENARIO_PROMPT: &str = "Generate a new corporate business scenario.";

const CATEGORIES: [&str; 8] = [
    "Finance", "HR", "Product", "Marketing", "Operations", "Leadership", "Crisis", "Event",
];

#[derive(Clone)]
pub struct GeminiClient {
    api_key:  String,
    model:    String,
    base_url: String,
    client:   reqwest::blocking::Client,
}

impl GeminiClient {
    /// Returns `Ok(None)` when no credential is configured.
    pub fn from_config(config: &GeneratorConfig) -> Result<Option<Self>, GeneratorError> {
        let Some(api_key) = config.api_key.clone().filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Some(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            client,
        }))
    }

    pub fn model_id(&self) -> &str {
        &self.model
    }

    fn generate_content(
        &self,
        system: Option<&str>,
        user: &str,
        response_schema: Option<Value>,
    ) -> Result<String, GeneratorError> {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = GenerateRequest {
            system_instruction: system.map(|text| Content::text(None, text)),
            contents: vec![Content::text(Some("user"), user)],
            generation_config: response_schema.map(|schema| GenerationConfig {
                response_mime_type: "application/json".into(),
                response_schema: schema,
            }),
        };

        let response = self
            .client
            .post(&endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        log::debug!("gemini response: status={status} bytes={}", text.len());

        if !status.is_success() {
            return Err(GeneratorError::Status { status: status.as_u16(), body: text });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        let reply: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if reply.trim().is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        Ok(reply)
    }
}

impl ScenarioGenerator for GeminiClient {
    fn name(&self) -> &'static str { "gemini" }

    fn is_available(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn generate(&mut self, _metrics: &Metrics, brief: &str) -> Result<String, GeneratorError> {
        self.generate_content(Some(brief), SCENARIO_PROMPT, Some(scenario_schema()))
    }
}

impl Advisor for GeminiClient {
    fn advise(&mut self, scenario: &Scenario, metrics: &Metrics) -> Result<String, GeneratorError> {
        self.generate_content(None, &advice_prompt(scenario, metrics), None)
    }
}

fn advice_prompt(scenario: &Scenario, metrics: &Metrics) -> String {
    let options: Vec<&str> = scenario.options.iter().map(|o| o.text.as_str()).collect();
    format!(
        "The user is playing a Fortune 500 CEO simulator.\n\
         Scenario: {} - {}\n\
         Options: {}\n\
         \n\
         Company State: Cash ${:.0}M, Morale {}, Risk {}.\n\
         \n\
         Give a 1-sentence strategic hint on what to do. \
         Act like a seasoned, slightly cynical corporate board member.",
        scenario.title,
        scenario.description,
        options.join(", "),
        metrics.cash / 1_000_000.0,
        metrics.morale,
        metrics.risk,
    )
}

/// Response schema mirroring `Scenario`, built from the closed metric set.
fn scenario_schema() -> Value {
    let impact_properties: serde_json::Map<String, Value> = MetricKey::ALL
        .iter()
        .map(|k| (k.name().to_string(), json!({ "type": "NUMBER" })))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "id":          { "type": "STRING" },
            "title":       { "type": "STRING" },
            "description": { "type": "STRING" },
            "category":    { "type": "STRING", "enum": CATEGORIES },
            "options": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id":       { "type": "STRING" },
                        "text":     { "type": "STRING" },
                        "feedback": { "type": "STRING" },
                        "impact":   { "type": "OBJECT", "properties": impact_properties }
                    },
                    "required": ["id", "text", "feedback", "impact"]
                }
            }
        },
        "required": ["id", "title", "description", "category", "options"]
    })
}

// ── Wire types ────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: Some(text.to_string()) }],
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}
