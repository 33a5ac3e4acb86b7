//! Scenario sourcing.
//!
//! SELECTION ORDER (strict priority, first match wins):
//!   1. High risk + coin flip       → first Crisis seed scenario
//!   2. Low cash + coin flip        → designated finance-recovery seed
//!   3. No generator, or local flip → seed at (turn + offset) mod len
//!   4. Otherwise                   → remote generator, seed fallback on failure
//!
//! RULE: `provide()` never fails. Every generator error is logged and
//! mapped to a uniformly random seed scenario.

use crate::{
    catalog::SeedCatalog,
    config::ProviderConfig,
    error::GeneratorError,
    metrics::Metrics,
    rng::RandomSource,
    scenario::{Scenario, ScenarioCategory},
    types::Turn,
};
use serde::{Deserialize, Serialize};

/// Black-box remote scenario source.
pub trait ScenarioGenerator: Send {
    /// Stable name for logging.
    fn name(&self) -> &'static str;

    /// False when no credential is configured.
    fn is_available(&self) -> bool;

    /// Ask for one scenario. Returns the raw JSON payload; parsing and
    /// validation happen on this side of the boundary.
    fn generate(&mut self, metrics: &Metrics, brief: &str) -> Result<String, GeneratorError>;
}

/// Black-box advisory hint source. Never affects game state.
pub trait Advisor: Send {
    fn advise(&mut self, scenario: &Scenario, metrics: &Metrics) -> Result<String, GeneratorError>;
}

/// Where a provided scenario came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioSource {
    CrisisOverride,
    FinanceRecovery,
    Seed,
    Generated,
    /// Generator was asked and failed.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Provided {
    pub scenario: Scenario,
    pub source:   ScenarioSource,
}

pub struct ScenarioProvider {
    catalog:   SeedCatalog,
    config:    ProviderConfig,
    generator: Option<Box<dyn ScenarioGenerator>>,
}

impl ScenarioProvider {
    pub fn new(catalog: SeedCatalog, config: ProviderConfig) -> Self {
        Self { catalog, config, generator: None }
    }

    pub fn with_generator(mut self, generator: Box<dyn ScenarioGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn catalog(&self) -> &SeedCatalog {
        &self.catalog
    }

    pub fn generator_available(&self) -> bool {
        self.generator.as_ref().is_some_and(|g| g.is_available())
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.as_ref().map_or("none", |g| g.name())
    }

    /// Pick the scenario for `turn`. Always resolves.
    pub fn provide(
        &mut self,
        metrics: &Metrics,
        turn: Turn,
        rng: &mut dyn RandomSource,
    ) -> Provided {
        if metrics.risk > self.config.crisis_risk_threshold && rng.chance(self.config.crisis_chance) {
            if let Some(crisis) = self.catalog.first_in_category(ScenarioCategory::Crisis) {
                log::debug!("turn={turn} provider: risk {:.0} forced crisis '{}'", metrics.risk, crisis.id);
                return Provided { scenario: crisis.clone(), source: ScenarioSource::CrisisOverride };
            }
        }

        if metrics.cash < self.config.low_cash_threshold
            && rng.chance(self.config.finance_recovery_chance)
        {
            if let Some(recovery) = self.catalog.by_id(&self.config.finance_recovery_id) {
                log::debug!("turn={turn} provider: low cash forced '{}'", recovery.id);
                return Provided { scenario: recovery.clone(), source: ScenarioSource::FinanceRecovery };
            }
        }

        // Short-circuit keeps the local-path flip off the stream when no
        // generator exists.
        if !self.generator_available() || rng.chance(self.config.local_path_chance) {
            let offset = rng.next_u64_below(self.config.seed_offset_range);
            let scenario = self.catalog.get_wrapping(turn + offset).clone();
            log::debug!("turn={turn} provider: seed '{}' (offset {offset})", scenario.id);
            return Provided { scenario, source: ScenarioSource::Seed };
        }

        match self.generate(metrics) {
            Ok(scenario) => {
                log::info!("turn={turn} provider: {} generated '{}'", self.generator_name(), scenario.title);
                Provided { scenario, source: ScenarioSource::Generated }
            }
            Err(e) => {
                log::warn!(
                    "turn={turn} provider: {} failed, falling back to seed data: {e}",
                    self.generator_name()
                );
                let index = rng.next_u64_below(self.catalog.len() as u64);
                Provided {
                    scenario: self.catalog.get_wrapping(index).clone(),
                    source:   ScenarioSource::Fallback,
                }
            }
        }
    }

    fn generate(&mut self, metrics: &Metrics) -> Result<Scenario, GeneratorError> {
        let generator = self.generator.as_mut().ok_or(GeneratorError::Unavailable)?;
        let brief = scenario_brief(metrics);
        let payload = generator.generate(metrics, &brief)?;
        Scenario::from_generated(&payload)
    }
}

/// The instruction context handed to the generator.
pub fn scenario_brief(metrics: &Metrics) -> String {
    format!(
        "You are a simulation engine for a \"Fortune 500 CEO Simulator\" game.\n\
         Generate a realistic, high-stakes business scenario for a massive manufacturing conglomerate.\n\
         Think about: Supply Chains, Unions, Global Geopolitics, Environmental Regulations, Robotics, and M&A.\n\
         \n\
         Current Metrics:\n\
         - Cash: ${:.0} Million\n\
         - Burn: ${:.0} Million/mo\n\
         - Revenue: ${:.0} Million/mo\n\
         - Morale: {}/100\n\
         - Market Share: {}/100\n\
         - Risk: {}/100\n\
         \n\
         Options must have clear tradeoffs. Impact values should be significant (in the millions of dollars).\n\
         If Risk is high (>70), generate a negative event.",
        metrics.cash / 1_000_000.0,
        metrics.monthly_burn / 1_000_000.0,
        metrics.monthly_revenue / 1_000_000.0,
        metrics.morale,
        metrics.market_share,
        metrics.risk,
    )
}

// ── Advisor ───────────────────────────────────────────────────────

pub const ADVICE_UNAVAILABLE: &str = "The board recommends caution. Large ships turn slowly.";
pub const ADVICE_EMPTY:       &str = "Protect the share price at all costs.";
pub const ADVICE_FAILED:      &str = "The board is silent on this matter.";

/// Wraps an optional advisor so callers always get a sentence back.
#[derive(Default)]
pub struct BoardAdvisor {
    inner: Option<Box<dyn Advisor>>,
}

impl BoardAdvisor {
    pub fn new(inner: Option<Box<dyn Advisor>>) -> Self {
        Self { inner }
    }

    pub fn advise(&mut self, scenario: &Scenario, metrics: &Metrics) -> String {
        let Some(advisor) = self.inner.as_mut() else {
            return ADVICE_UNAVAILABLE.to_string();
        };
        match advisor.advise(scenario, metrics) {
            Ok(text) if text.trim().is_empty() => ADVICE_EMPTY.to_string(),
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                log::warn!("advisor failed: {e}");
                ADVICE_FAILED.to_string()
            }
        }
    }
}
