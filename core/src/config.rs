use crate::{market::INITIAL_PRICE, metrics::Metrics};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

pub const CONFIG_FILE: &str = "game_config.json";

/// Environment variables checked, in order, for the generator credential.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

// ── Scenario provider ─────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Risk above which a crisis scenario may be forced.
    pub crisis_risk_threshold: f64,
    pub crisis_chance: f64,
    /// Cash below which the finance-recovery scenario may be forced.
    pub low_cash_threshold: f64,
    pub finance_recovery_chance: f64,
    /// Id of the seed scenario served to cash-starved companies.
    pub finance_recovery_id: String,
    /// Probability of staying on the seed catalog when a generator exists.
    pub local_path_chance: f64,
    /// Seed index offsets are drawn from [0, seed_offset_range).
    pub seed_offset_range: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            crisis_risk_threshold:   70.0,
            crisis_chance:           0.5,
            low_cash_threshold:      500_000_000.0,
            finance_recovery_chance: 0.5,
            finance_recovery_id:     "s4".into(),
            local_path_chance:       0.6,
            seed_offset_range:       10,
        }
    }
}

// ── Remote generator ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Never written back out; normally filled from the environment.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key:      None,
            model:        "gemini-2.5-flash".into(),
            base_url:     "https://generativelanguage.googleapis.com/v1beta".into(),
            timeout_secs: 20,
        }
    }
}

impl GeneratorConfig {
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Game ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub initial_metrics: Metrics,
    pub initial_stock_price: f64,
    /// Feedback dwell between a decision and the terminal checks.
    pub dwell_ms: u64,
    /// Turns per quarter.
    pub quarter_length: u64,
    /// Quarters the company must survive for the dominance win.
    pub win_quarters: u64,
    pub provider: ProviderConfig,
    pub generator: GeneratorConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_metrics:     Metrics::default(),
            initial_stock_price: INITIAL_PRICE,
            dwell_ms:            2_000,
            quarter_length:      4,
            win_quarters:        12,
            provider:            ProviderConfig::default(),
            generator:           GeneratorConfig::default(),
        }
    }
}

impl GameConfig {
    /// Load from the data/ directory.
    /// A missing config file means defaults; the API key always comes from
    /// the environment when the file does not set one.
    /// In tests, use GameConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = Path::new(data_dir).join(CONFIG_FILE);
        let mut config: GameConfig = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
            serde_json::from_str(&content)?
        } else {
            log::info!("no {} in {data_dir}, using defaults", CONFIG_FILE);
            GameConfig::default()
        };

        if !config.generator.has_credential() {
            config.generator.api_key = API_KEY_VARS
                .iter()
                .find_map(|var| std::env::var(var).ok())
                .filter(|k| !k.trim().is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in tests:
    /// no dwell and no remote generator.
    pub fn default_test() -> Self {
        Self {
            dwell_ms: 0,
            generator: GeneratorConfig { api_key: None, ..GeneratorConfig::default() },
            ..GameConfig::default()
        }
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_millis(self.dwell_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.quarter_length > 0, "quarter_length must be positive");
        anyhow::ensure!(self.win_quarters > 0, "win_quarters must be positive");
        anyhow::ensure!(self.provider.seed_offset_range > 0, "seed_offset_range must be positive");
        anyhow::ensure!(self.initial_stock_price > 0.0, "initial_stock_price must be positive");
        for (name, p) in [
            ("crisis_chance", self.provider.crisis_chance),
            ("finance_recovery_chance", self.provider.finance_recovery_chance),
            ("local_path_chance", self.provider.local_path_chance),
        ] {
            anyhow::ensure!((0.0..=1.0).contains(&p), "{name} must be within [0, 1], got {p}");
        }
        Ok(())
    }
}
