//! Scenario content model and boundary validation.

use crate::{
    error::GeneratorError,
    metrics::Impact,
    types::EntityId,
};
use serde::{Deserialize, Serialize};

/// Seed content must offer a real choice.
pub const MIN_SEED_OPTIONS: usize = 2;
/// Generated content only has to be playable.
pub const MIN_GENERATED_OPTIONS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioCategory {
    Finance,
    #[serde(rename = "HR")]
    Hr,
    Product,
    Marketing,
    Operations,
    Leadership,
    Crisis,
    Event,
}

/// Terminal states an option may jump to directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Ending {
    GameOver,
    /// Shown to the player as "Market Dominance".
    IpoWin,
    AcquisitionWin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOption {
    pub id:             EntityId,
    pub text:           String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description:    Option<String>,
    #[serde(default)]
    pub impact:         Impact,
    pub feedback:       String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_ending: Option<Ending>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id:          EntityId,
    pub title:       String,
    pub description: String,
    pub category:    ScenarioCategory,
    pub options:     Vec<DecisionOption>,
}

impl Scenario {
    pub fn option(&self, option_id: &str) -> Option<&DecisionOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Check the structural rules every scenario must satisfy.
    /// Returns a human-readable reason on failure.
    pub fn validate(&self, min_options: usize) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("scenario id is empty".into());
        }
        if self.options.len() < min_options {
            return Err(format!(
                "expected at least {min_options} options, got {}",
                self.options.len()
            ));
        }
        for (i, option) in self.options.iter().enumerate() {
            if option.id.trim().is_empty() {
                return Err(format!("option {i} has an empty id"));
            }
            if option.text.trim().is_empty() {
                return Err(format!("option '{}' has empty text", option.id));
            }
            if option.feedback.trim().is_empty() {
                return Err(format!("option '{}' has empty feedback", option.id));
            }
        }
        Ok(())
    }

    /// Parse and validate a raw generator payload.
    ///
    /// Unknown impact keys, non-numeric deltas, and unknown categories fail
    /// at parse time; structural rules are checked afterwards.
    pub fn from_generated(payload: &str) -> Result<Self, GeneratorError> {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return Err(GeneratorError::EmptyResponse);
        }
        let scenario: Scenario = serde_json::from_str(trimmed)?;
        scenario
            .validate(MIN_GENERATED_OPTIONS)
            .map_err(GeneratorError::Rejected)?;
        Ok(scenario)
    }
}
