//! Read-only data the engine consumes: combat profiles, movesets and the
//! type chart. The traits are the seams to whatever storage backs them;
//! [`JsonDataSource`] implements all three from a directory of JSON files.

use crate::error::{AdvisorError, Result};
use crate::state::{normalize_key, CombatProfile, Move, ProfileId};
use crate::type_chart::{standard_pairs, TypeEffectivenessPair};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const PROFILES_FILE: &str = "profiles.json";
pub const MOVES_FILE: &str = "moves.json";
pub const TYPE_CHART_FILE: &str = "type_chart.json";

pub trait CombatProfileStore: Send + Sync {
    fn get_all_profiles(&self) -> Result<Vec<CombatProfile>>;

    /// Unknown ids are a validation error
    fn get_profile(&self, id: ProfileId) -> Result<CombatProfile>;
}

pub trait MoveCatalogue: Send + Sync {
    fn get_moves_for_profile(&self, id: ProfileId) -> Result<Vec<Move>>;
}

pub trait TypeEffectivenessSource: Send + Sync {
    fn get_all_pairs(&self) -> Result<Vec<TypeEffectivenessPair>>;
}

/// `moves.json`: move definitions plus the move names each profile knows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MoveCatalogueFile {
    pub moves: Vec<Move>,
    pub movesets: HashMap<ProfileId, Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct JsonDataSource {
    profiles: Vec<CombatProfile>,
    movesets: HashMap<ProfileId, Vec<Move>>,
    type_pairs: Vec<TypeEffectivenessPair>,
}

impl JsonDataSource {
    pub fn new(
        mut profiles: Vec<CombatProfile>,
        movesets: HashMap<ProfileId, Vec<Move>>,
        type_pairs: Vec<TypeEffectivenessPair>,
    ) -> Result<Self> {
        profiles.sort_by_key(|p| p.id);
        for window in profiles.windows(2) {
            if window[0].id == window[1].id {
                return Err(AdvisorError::validation(format!(
                    "duplicate profile id {}",
                    window[0].id
                )));
            }
        }
        for profile in &profiles {
            profile.validate()?;
        }
        Ok(JsonDataSource {
            profiles,
            movesets,
            type_pairs,
        })
    }

    /// Loads `profiles.json`, `moves.json` and, when present, `type_chart.json`.
    /// Without a type chart file the standard chart is used.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let profiles: Vec<CombatProfile> =
            serde_json::from_str(&fs::read_to_string(dir.join(PROFILES_FILE))?)?;
        let catalogue: MoveCatalogueFile =
            serde_json::from_str(&fs::read_to_string(dir.join(MOVES_FILE))?)?;

        let chart_path = dir.join(TYPE_CHART_FILE);
        let type_pairs = if chart_path.exists() {
            serde_json::from_str(&fs::read_to_string(&chart_path)?)?
        } else {
            tracing::info!("no {} in {}, using the standard chart", TYPE_CHART_FILE, dir.display());
            standard_pairs()
        };

        let movesets = resolve_movesets(catalogue)?;
        let source = Self::new(profiles, movesets, type_pairs)?;
        tracing::info!(
            profiles = source.profiles.len(),
            type_pairs = source.type_pairs.len(),
            "loaded data from {}",
            dir.display()
        );
        Ok(source)
    }
}

fn resolve_movesets(catalogue: MoveCatalogueFile) -> Result<HashMap<ProfileId, Vec<Move>>> {
    let by_name: HashMap<String, &Move> = catalogue
        .moves
        .iter()
        .map(|m| (normalize_key(&m.name), m))
        .collect();

    let mut movesets = HashMap::with_capacity(catalogue.movesets.len());
    for (profile_id, names) in &catalogue.movesets {
        let mut moves = Vec::with_capacity(names.len());
        for name in names {
            match by_name.get(&normalize_key(name)) {
                Some(m) => moves.push((*m).clone()),
                None => {
                    return Err(AdvisorError::validation(format!(
                        "moveset of profile {} references unknown move {}",
                        profile_id, name
                    )))
                }
            }
        }
        movesets.insert(*profile_id, moves);
    }
    Ok(movesets)
}

impl CombatProfileStore for JsonDataSource {
    fn get_all_profiles(&self) -> Result<Vec<CombatProfile>> {
        Ok(self.profiles.clone())
    }

    fn get_profile(&self, id: ProfileId) -> Result<CombatProfile> {
        self.profiles
            .binary_search_by_key(&id, |p| p.id)
            .map(|idx| self.profiles[idx].clone())
            .map_err(|_| AdvisorError::validation(format!("unknown profile id {}", id)))
    }
}

impl MoveCatalogue for JsonDataSource {
    fn get_moves_for_profile(&self, id: ProfileId) -> Result<Vec<Move>> {
        if self.profiles.binary_search_by_key(&id, |p| p.id).is_err() {
            return Err(AdvisorError::validation(format!("unknown profile id {}", id)));
        }
        Ok(self.movesets.get(&id).cloned().unwrap_or_default())
    }
}

impl TypeEffectivenessSource for JsonDataSource {
    fn get_all_pairs(&self) -> Result<Vec<TypeEffectivenessPair>> {
        Ok(self.type_pairs.clone())
    }
}
