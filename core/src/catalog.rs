//! The seed catalog: bundled scenarios that make the game completable
//! with no remote generator at all.

use crate::{
    error::{GameError, GameResult},
    scenario::{Scenario, ScenarioCategory, MIN_SEED_OPTIONS},
};
use serde::Deserialize;
use std::path::Path;

const BUNDLED_CATALOG: &str = include_str!("../data/scenarios/seed_catalog.json");

/// Relative to the data directory.
pub const CATALOG_OVERRIDE_PATH: &str = "scenarios/seed_catalog.json";

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Clone)]
pub struct SeedCatalog {
    scenarios: Vec<Scenario>,
}

impl SeedCatalog {
    /// Build a catalog, rejecting empty or structurally invalid content.
    pub fn new(scenarios: Vec<Scenario>) -> GameResult<Self> {
        if scenarios.is_empty() {
            return Err(GameError::EmptyCatalog);
        }
        for scenario in &scenarios {
            scenario
                .validate(MIN_SEED_OPTIONS)
                .map_err(|reason| GameError::InvalidScenario { id: scenario.id.clone(), reason })?;
        }
        Ok(Self { scenarios })
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> GameResult<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn from_json(json: &str) -> GameResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.scenarios)
    }

    /// Use `<data_dir>/scenarios/seed_catalog.json` when present,
    /// the bundled catalog otherwise.
    pub fn load(data_dir: &str) -> GameResult<Self> {
        let path = Path::new(data_dir).join(CATALOG_OVERRIDE_PATH);
        if !path.exists() {
            return Self::bundled();
        }
        let content = std::fs::read_to_string(&path)?;
        let catalog = Self::from_json(&content)?;
        log::info!("loaded {} seed scenarios from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Index wraps around the catalog length.
    pub fn get_wrapping(&self, index: u64) -> &Scenario {
        &self.scenarios[(index % self.scenarios.len() as u64) as usize]
    }

    pub fn first_in_category(&self, category: ScenarioCategory) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.category == category)
    }

    pub fn by_id(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }
}
