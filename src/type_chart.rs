use crate::error::{AdvisorError, Result};
use crate::state::normalize_key;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One entry of the sparse effectiveness matrix as delivered by a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeEffectivenessPair {
    pub attacking: String,
    pub defending: String,
    pub multiplier: f64,
}

/// Sparse (attacking type, defending type) -> multiplier map.
/// Pairs that are not present are neutral (1.0).
#[derive(Debug, Clone, Default)]
pub struct TypeEffectivenessTable {
    chart: HashMap<(String, String), f64>,
}

impl TypeEffectivenessTable {
    pub fn from_pairs(pairs: &[TypeEffectivenessPair]) -> Result<Self> {
        let mut chart = HashMap::with_capacity(pairs.len());
        for pair in pairs {
            if !(pair.multiplier >= 0.0) {
                return Err(AdvisorError::validation(format!(
                    "multiplier for {} -> {} must be >= 0, found {}",
                    pair.attacking, pair.defending, pair.multiplier
                )));
            }
            chart.insert(
                (normalize_key(&pair.attacking), normalize_key(&pair.defending)),
                pair.multiplier,
            );
        }
        Ok(Self { chart })
    }

    pub fn get(&self, attacking: &str, defending: &str) -> f64 {
        self.chart
            .get(&(normalize_key(attacking), normalize_key(defending)))
            .copied()
            .unwrap_or(1.0)
    }

    /// Product of `get` over each of the defender's types
    pub fn combined<S: AsRef<str>>(&self, attacking: &str, defending: &[S]) -> f64 {
        defending
            .iter()
            .map(|d| self.get(attacking, d.as_ref()))
            .product()
    }

    pub fn len(&self) -> usize {
        self.chart.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chart.is_empty()
    }

    /// The 18-type chart
    pub fn standard() -> Self {
        let mut chart = HashMap::new();
        for pair in standard_pairs() {
            chart.insert((pair.attacking, pair.defending), pair.multiplier);
        }
        Self { chart }
    }
}

/// Non-neutral pairs of the 18-type chart, lower-case English names
pub fn standard_pairs() -> Vec<TypeEffectivenessPair> {
    let mut pairs = Vec::new();
    let mut add = |attacking: &str, double: &[&str], half: &[&str], zero: &[&str]| {
        for (targets, multiplier) in [(double, 2.0), (half, 0.5), (zero, 0.0)].iter() {
            for d in targets.iter() {
                pairs.push(TypeEffectivenessPair {
                    attacking: attacking.to_string(),
                    defending: d.to_string(),
                    multiplier: *multiplier,
                });
            }
        }
    };

    add("normal", &[], &["rock", "steel"], &["ghost"]);
    add("fire", &["grass", "ice", "bug", "steel"], &["fire", "water", "rock", "dragon"], &[]);
    add("water", &["fire", "ground", "rock"], &["water", "grass", "dragon"], &[]);
    add("electric", &["water", "flying"], &["electric", "grass", "dragon"], &["ground"]);
    add("grass", &["water", "ground", "rock"], &["fire", "grass", "poison", "flying", "bug", "dragon", "steel"], &[]);
    add("ice", &["grass", "ground", "flying", "dragon"], &["fire", "water", "ice", "steel"], &[]);
    add("fighting", &["normal", "ice", "rock", "dark", "steel"], &["poison", "flying", "psychic", "bug", "fairy"], &["ghost"]);
    add("poison", &["grass", "fairy"], &["poison", "ground", "rock", "ghost"], &["steel"]);
    add("ground", &["fire", "electric", "poison", "rock", "steel"], &["grass", "bug"], &["flying"]);
    add("flying", &["grass", "fighting", "bug"], &["electric", "rock", "steel"], &[]);
    add("psychic", &["fighting", "poison"], &["psychic", "steel"], &["dark"]);
    add("bug", &["grass", "psychic", "dark"], &["fire", "fighting", "poison", "flying", "ghost", "steel", "fairy"], &[]);
    add("rock", &["fire", "ice", "flying", "bug"], &["fighting", "ground", "steel"], &[]);
    add("ghost", &["psychic", "ghost"], &["dark"], &["normal"]);
    add("dragon", &["dragon"], &["steel"], &["fairy"]);
    add("dark", &["psychic", "ghost"], &["fighting", "dark", "fairy"], &[]);
    add("steel", &["ice", "rock", "fairy"], &["fire", "water", "electric", "steel"], &[]);
    add("fairy", &["fighting", "dragon", "dark"], &["fire", "poison", "steel"], &[]);

    pairs
}
