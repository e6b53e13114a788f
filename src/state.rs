use crate::error::{AdvisorError, Result};
use deunicode::deunicode;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

pub type ProfileId = u32;

/// Canonical form used to compare type and move names.
/// "Électrik", " electrik" and "ELECTRIK" all map to "electrik".
pub fn normalize_key(name: &str) -> String {
    deunicode(name.trim()).to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Classifier label: 1 when side A wins
    pub fn label(self) -> u8 {
        match self {
            Side::A => 1,
            Side::B => 0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
}

impl Stats {
    pub fn total(&self) -> u64 {
        [
            self.hp,
            self.attack,
            self.defense,
            self.sp_attack,
            self.sp_defense,
            self.speed,
        ]
        .iter()
        .map(|v| u64::from(*v))
        .sum()
    }

    fn validate(&self, profile: ProfileId) -> Result<()> {
        let named = [
            ("hp", self.hp),
            ("attack", self.attack),
            ("defense", self.defense),
            ("sp_attack", self.sp_attack),
            ("sp_defense", self.sp_defense),
            ("speed", self.speed),
        ];
        for (name, value) in named.iter() {
            if *value == 0 {
                return Err(AdvisorError::validation(format!(
                    "profile {}: stat {} must be positive",
                    profile, name
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatProfile {
    pub id: ProfileId,
    pub name: String,
    pub stats: Stats,
    pub types: Vec<String>,
}

impl CombatProfile {
    pub fn new(id: ProfileId, name: &str, stats: Stats, types: Vec<String>) -> Result<Self> {
        let profile = CombatProfile {
            id,
            name: name.to_string(),
            stats,
            types,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        if self.types.is_empty() || self.types.len() > 2 {
            return Err(AdvisorError::validation(format!(
                "profile {} must have 1 or 2 types, found {}",
                self.id,
                self.types.len()
            )));
        }
        self.stats.validate(self.id)
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        let key = normalize_key(type_name);
        self.types.iter().any(|t| normalize_key(t) == key)
    }

    pub fn primary_type(&self) -> &str {
        self.types.first().map(String::as_str).unwrap_or("")
    }

    pub fn secondary_type(&self) -> Option<&str> {
        self.types.get(1).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Tag on a move controlling how its base power is transformed.
///
/// Tags come from the move catalogue as strings such as `multi_coups` or
/// `fixe_degat_40`. A missing tag is `Offensif`. A well-formed tag that is not
/// recognized is kept as `Other` and scores like `Offensif`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DamageType {
    Offensif,
    MultiCoups,
    DoubleDegats,
    DeuxTours,
    FixeNiveau,
    FixeDegat(u32),
    /// Full tag, e.g. `prioritaire` or `prioritaire_2`
    Prioritaire(String),
    AttkAdversaire,
    Other(String),
}

/// Payload-free view of `DamageType`, used by the move filter config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageTypeKind {
    Offensif,
    MultiCoups,
    DoubleDegats,
    DeuxTours,
    FixeNiveau,
    FixeDegat,
    Prioritaire,
    AttkAdversaire,
    Other,
}

impl DamageType {
    pub fn kind(&self) -> DamageTypeKind {
        match self {
            DamageType::Offensif => DamageTypeKind::Offensif,
            DamageType::MultiCoups => DamageTypeKind::MultiCoups,
            DamageType::DoubleDegats => DamageTypeKind::DoubleDegats,
            DamageType::DeuxTours => DamageTypeKind::DeuxTours,
            DamageType::FixeNiveau => DamageTypeKind::FixeNiveau,
            DamageType::FixeDegat(_) => DamageTypeKind::FixeDegat,
            DamageType::Prioritaire(_) => DamageTypeKind::Prioritaire,
            DamageType::AttkAdversaire => DamageTypeKind::AttkAdversaire,
            DamageType::Other(_) => DamageTypeKind::Other,
        }
    }

    /// Fixed-damage moves skip the stat-based damage formula
    pub fn is_fixed_damage(&self) -> bool {
        matches!(self, DamageType::FixeNiveau | DamageType::FixeDegat(_))
    }
}

impl Default for DamageType {
    fn default() -> Self {
        DamageType::Offensif
    }
}

impl FromStr for DamageType {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = normalize_key(s);
        let well_formed = !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !well_formed {
            return Err(AdvisorError::validation(format!(
                "malformed damage type: {:?}",
                s
            )));
        }

        let damage_type = match tag.as_str() {
            "offensif" => DamageType::Offensif,
            "multi_coups" => DamageType::MultiCoups,
            "double_degats" => DamageType::DoubleDegats,
            "deux_tours" => DamageType::DeuxTours,
            "fixe_niveau" => DamageType::FixeNiveau,
            "attk_adversaire" => DamageType::AttkAdversaire,
            t if t.starts_with("fixe_degat_") => {
                let amount = t["fixe_degat_".len()..].parse::<u32>().map_err(|_| {
                    AdvisorError::validation(format!("malformed fixed damage amount: {:?}", s))
                })?;
                DamageType::FixeDegat(amount)
            }
            t if t.starts_with("prioritaire") => DamageType::Prioritaire(tag.clone()),
            _ => DamageType::Other(tag.clone()),
        };
        Ok(damage_type)
    }
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DamageType::Offensif => write!(f, "offensif"),
            DamageType::MultiCoups => write!(f, "multi_coups"),
            DamageType::DoubleDegats => write!(f, "double_degats"),
            DamageType::DeuxTours => write!(f, "deux_tours"),
            DamageType::FixeNiveau => write!(f, "fixe_niveau"),
            DamageType::FixeDegat(amount) => write!(f, "fixe_degat_{}", amount),
            DamageType::Prioritaire(tag) => write!(f, "{}", tag),
            DamageType::AttkAdversaire => write!(f, "attk_adversaire"),
            DamageType::Other(tag) => write!(f, "{}", tag),
        }
    }
}

impl TryFrom<String> for DamageType {
    type Error = AdvisorError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<DamageType> for String {
    fn from(value: DamageType) -> Self {
        value.to_string()
    }
}

fn default_accuracy() -> Option<u32> {
    Some(100)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
    pub category: MoveCategory,
    #[serde(default)]
    pub power: Option<u32>,
    #[serde(default = "default_accuracy")]
    pub accuracy: Option<u32>,
    #[serde(default)]
    pub priority: i8,
    #[serde(default)]
    pub damage_type: DamageType,
}

impl Move {
    pub fn new(name: &str, move_type: &str, category: MoveCategory, power: Option<u32>) -> Self {
        Move {
            name: name.to_string(),
            move_type: move_type.to_string(),
            category,
            power,
            accuracy: Some(100),
            priority: 0,
            damage_type: DamageType::Offensif,
        }
    }

    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_accuracy(mut self, accuracy: Option<u32>) -> Self {
        self.accuracy = accuracy;
        self
    }

    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    /// Accuracy in percent; a null accuracy never misses
    pub fn effective_accuracy(&self) -> u32 {
        self.accuracy.unwrap_or(100)
    }

    pub fn is_damaging(&self) -> bool {
        self.power.is_some() && self.category != MoveCategory::Status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Stats {
        Stats {
            hp: 80,
            attack: 80,
            defense: 80,
            sp_attack: 80,
            sp_defense: 80,
            speed: 80,
        }
    }

    #[test]
    fn test_total_of_extreme_stats_does_not_wrap() {
        let huge = Stats {
            hp: u32::MAX,
            attack: u32::MAX,
            defense: u32::MAX,
            sp_attack: u32::MAX,
            sp_defense: u32::MAX,
            speed: u32::MAX,
        };
        assert_eq!(huge.total(), 6 * u64::from(u32::MAX));
        assert_eq!(stats().total(), 480);
    }

    #[test]
    fn test_zero_stat_error_names_profile_once() {
        let err = CombatProfile::new(7, "p", Stats { speed: 0, ..stats() }, vec!["eau".into()])
            .unwrap_err();
        match err {
            AdvisorError::Validation(msg) => {
                assert_eq!(msg, "profile 7: stat speed must be positive");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_parse_known_damage_types() {
        assert_eq!("multi_coups".parse::<DamageType>().unwrap(), DamageType::MultiCoups);
        assert_eq!(
            "fixe_degat_40".parse::<DamageType>().unwrap(),
            DamageType::FixeDegat(40)
        );
        assert_eq!(
            "prioritaire_2".parse::<DamageType>().unwrap(),
            DamageType::Prioritaire("prioritaire_2".to_string())
        );
        assert_eq!(
            " Attk_Adversaire ".parse::<DamageType>().unwrap(),
            DamageType::AttkAdversaire
        );
    }

    #[test]
    fn test_unknown_but_well_formed_tag_is_other() {
        assert_eq!(
            "recul".parse::<DamageType>().unwrap(),
            DamageType::Other("recul".to_string())
        );
    }

    #[test]
    fn test_malformed_damage_types_are_rejected() {
        assert!("".parse::<DamageType>().is_err());
        assert!("multi coups".parse::<DamageType>().is_err());
        assert!("fixe_degat_abc".parse::<DamageType>().is_err());
    }

    #[test]
    fn test_move_deserialize_defaults() {
        let m: Move = serde_json::from_str(
            r#"{"name": "Surf", "type": "Eau", "category": "special", "power": 90}"#,
        )
        .unwrap();
        assert_eq!(m.accuracy, Some(100));
        assert_eq!(m.priority, 0);
        assert_eq!(m.damage_type, DamageType::Offensif);
        assert!(m.is_damaging());
    }

    #[test]
    fn test_move_deserialize_rejects_malformed_damage_type() {
        let result: std::result::Result<Move, _> = serde_json::from_str(
            r#"{"name": "X", "type": "Eau", "category": "special", "power": 90, "damage_type": "??"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_type_count_is_validated() {
        assert!(CombatProfile::new(1, "a", stats(), vec![]).is_err());
        assert!(CombatProfile::new(
            1,
            "a",
            stats(),
            vec!["Feu".into(), "Vol".into(), "Roche".into()]
        )
        .is_err());
        assert!(CombatProfile::new(1, "a", stats(), vec!["Feu".into()]).is_ok());
    }

    #[test]
    fn test_profile_rejects_zero_stat() {
        let mut s = stats();
        s.speed = 0;
        assert!(CombatProfile::new(1, "a", s, vec!["Feu".into()]).is_err());
    }

    #[test]
    fn test_has_type_ignores_accents_and_case() {
        let p = CombatProfile::new(1, "a", stats(), vec!["Électrik".into()]).unwrap();
        assert!(p.has_type("electrik"));
        assert!(!p.has_type("eau"));
    }
}
