use crate::dataset::GenerationParams;
use crate::error::Result;
use crate::matchup_calc::DEFAULT_LEVEL;
use crate::move_selector::MoveFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings shared by generation and ranking. Every field has a default,
/// so a config file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    pub level: u32,
    pub move_filter: MoveFilter,
    pub generation: GenerationParams,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        AdvisorConfig {
            level: DEFAULT_LEVEL,
            move_filter: MoveFilter::default(),
            generation: GenerationParams::default(),
        }
    }
}

impl AdvisorConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let config: AdvisorConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
        tracing::debug!(?config, "loaded config from {}", path.display());
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }
}
