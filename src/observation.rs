use crate::matchup_calc::MatchupOutcome;
use crate::state::{normalize_key, CombatProfile, Move, Side};
use serde::{Deserialize, Serialize};

/// One side of a matchup, unscaled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideObservation {
    pub hp: f64,
    pub attack: f64,
    pub defense: f64,
    pub sp_attack: f64,
    pub sp_defense: f64,
    pub speed: f64,
    pub total_stats: f64,
    pub type1: String,
    pub type2: Option<String>,
    pub move_power: f64,
    pub move_type: String,
    pub move_priority: f64,
    pub move_stab: f64,
    pub move_type_multiplier: f64,
}

/// Raw features of a matchup before encoding and scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub a: SideObservation,
    pub b: SideObservation,
    pub speed_diff: f64,
    pub hp_diff: f64,
    pub first_mover_flag: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    AHp,
    AAttack,
    ADefense,
    ASpAttack,
    ASpDefense,
    ASpeed,
    BHp,
    BAttack,
    BDefense,
    BSpAttack,
    BSpDefense,
    BSpeed,
    AMovePower,
    AMovePriority,
    AMoveStab,
    AMoveTypeMultiplier,
    BMovePower,
    BMovePriority,
    BMoveStab,
    BMoveTypeMultiplier,
    SpeedDiff,
    HpDiff,
    ATotalStats,
    BTotalStats,
    FirstMoverFlag,
}

impl NumericField {
    /// Columns z-scored by the base scaler, in output order
    pub const SCALED: [NumericField; 24] = [
        NumericField::AHp,
        NumericField::AAttack,
        NumericField::ADefense,
        NumericField::ASpAttack,
        NumericField::ASpDefense,
        NumericField::ASpeed,
        NumericField::BHp,
        NumericField::BAttack,
        NumericField::BDefense,
        NumericField::BSpAttack,
        NumericField::BSpDefense,
        NumericField::BSpeed,
        NumericField::AMovePower,
        NumericField::AMovePriority,
        NumericField::AMoveStab,
        NumericField::AMoveTypeMultiplier,
        NumericField::BMovePower,
        NumericField::BMovePriority,
        NumericField::BMoveStab,
        NumericField::BMoveTypeMultiplier,
        NumericField::SpeedDiff,
        NumericField::HpDiff,
        NumericField::ATotalStats,
        NumericField::BTotalStats,
    ];

    /// Columns passed through as-is
    pub const UNSCALED: [NumericField; 1] = [NumericField::FirstMoverFlag];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::AHp => "a_hp",
            NumericField::AAttack => "a_attack",
            NumericField::ADefense => "a_defense",
            NumericField::ASpAttack => "a_sp_attack",
            NumericField::ASpDefense => "a_sp_defense",
            NumericField::ASpeed => "a_speed",
            NumericField::BHp => "b_hp",
            NumericField::BAttack => "b_attack",
            NumericField::BDefense => "b_defense",
            NumericField::BSpAttack => "b_sp_attack",
            NumericField::BSpDefense => "b_sp_defense",
            NumericField::BSpeed => "b_speed",
            NumericField::AMovePower => "a_move_power",
            NumericField::AMovePriority => "a_move_priority",
            NumericField::AMoveStab => "a_move_stab",
            NumericField::AMoveTypeMultiplier => "a_move_type_multiplier",
            NumericField::BMovePower => "b_move_power",
            NumericField::BMovePriority => "b_move_priority",
            NumericField::BMoveStab => "b_move_stab",
            NumericField::BMoveTypeMultiplier => "b_move_type_multiplier",
            NumericField::SpeedDiff => "speed_diff",
            NumericField::HpDiff => "hp_diff",
            NumericField::ATotalStats => "a_total_stats",
            NumericField::BTotalStats => "b_total_stats",
            NumericField::FirstMoverFlag => "first_mover_flag",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    AType1,
    AType2,
    BType1,
    BType2,
    AMoveType,
    BMoveType,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 6] = [
        CategoricalField::AType1,
        CategoricalField::AType2,
        CategoricalField::BType1,
        CategoricalField::BType2,
        CategoricalField::AMoveType,
        CategoricalField::BMoveType,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::AType1 => "a_type1",
            CategoricalField::AType2 => "a_type2",
            CategoricalField::BType1 => "b_type1",
            CategoricalField::BType2 => "b_type2",
            CategoricalField::AMoveType => "a_move_type",
            CategoricalField::BMoveType => "b_move_type",
        }
    }
}

/// Features computed from raw values, scaled by their own scaler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedField {
    StatRatio,
    TypeAdvantageDiff,
    EffectivePowerA,
    EffectivePowerB,
    EffectivePowerDiff,
    PriorityAdvantage,
}

impl DerivedField {
    pub const ALL: [DerivedField; 6] = [
        DerivedField::StatRatio,
        DerivedField::TypeAdvantageDiff,
        DerivedField::EffectivePowerA,
        DerivedField::EffectivePowerB,
        DerivedField::EffectivePowerDiff,
        DerivedField::PriorityAdvantage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DerivedField::StatRatio => "stat_ratio",
            DerivedField::TypeAdvantageDiff => "type_advantage_diff",
            DerivedField::EffectivePowerA => "effective_power_a",
            DerivedField::EffectivePowerB => "effective_power_b",
            DerivedField::EffectivePowerDiff => "effective_power_diff",
            DerivedField::PriorityAdvantage => "priority_advantage",
        }
    }
}

impl SideObservation {
    fn new(profile: &CombatProfile, move_: &Move, power: f64, stab: f64, type_multiplier: f64) -> Self {
        let stats = &profile.stats;
        SideObservation {
            hp: stats.hp as f64,
            attack: stats.attack as f64,
            defense: stats.defense as f64,
            sp_attack: stats.sp_attack as f64,
            sp_defense: stats.sp_defense as f64,
            speed: stats.speed as f64,
            total_stats: stats.total() as f64,
            type1: normalize_key(profile.primary_type()),
            type2: profile.secondary_type().map(normalize_key),
            move_power: power,
            move_type: normalize_key(&move_.move_type),
            move_priority: move_.priority as f64,
            move_stab: stab,
            move_type_multiplier: type_multiplier,
        }
    }

    fn effective_power(&self) -> f64 {
        self.move_power * self.move_stab * self.move_type_multiplier
    }
}

impl RawObservation {
    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::AHp => self.a.hp,
            NumericField::AAttack => self.a.attack,
            NumericField::ADefense => self.a.defense,
            NumericField::ASpAttack => self.a.sp_attack,
            NumericField::ASpDefense => self.a.sp_defense,
            NumericField::ASpeed => self.a.speed,
            NumericField::BHp => self.b.hp,
            NumericField::BAttack => self.b.attack,
            NumericField::BDefense => self.b.defense,
            NumericField::BSpAttack => self.b.sp_attack,
            NumericField::BSpDefense => self.b.sp_defense,
            NumericField::BSpeed => self.b.speed,
            NumericField::AMovePower => self.a.move_power,
            NumericField::AMovePriority => self.a.move_priority,
            NumericField::AMoveStab => self.a.move_stab,
            NumericField::AMoveTypeMultiplier => self.a.move_type_multiplier,
            NumericField::BMovePower => self.b.move_power,
            NumericField::BMovePriority => self.b.move_priority,
            NumericField::BMoveStab => self.b.move_stab,
            NumericField::BMoveTypeMultiplier => self.b.move_type_multiplier,
            NumericField::SpeedDiff => self.speed_diff,
            NumericField::HpDiff => self.hp_diff,
            NumericField::ATotalStats => self.a.total_stats,
            NumericField::BTotalStats => self.b.total_stats,
            NumericField::FirstMoverFlag => self.first_mover_flag,
        }
    }

    /// `None` when the side has no second type
    pub fn categorical(&self, field: CategoricalField) -> Option<&str> {
        match field {
            CategoricalField::AType1 => Some(self.a.type1.as_str()),
            CategoricalField::AType2 => self.a.type2.as_deref(),
            CategoricalField::BType1 => Some(self.b.type1.as_str()),
            CategoricalField::BType2 => self.b.type2.as_deref(),
            CategoricalField::AMoveType => Some(self.a.move_type.as_str()),
            CategoricalField::BMoveType => Some(self.b.move_type.as_str()),
        }
    }

    /// Always computed from the raw values, never from scaled columns
    pub fn derived(&self, field: DerivedField) -> f64 {
        match field {
            DerivedField::StatRatio => self.a.total_stats / (self.b.total_stats + 1.0),
            DerivedField::TypeAdvantageDiff => {
                self.a.move_type_multiplier - self.b.move_type_multiplier
            }
            DerivedField::EffectivePowerA => self.a.effective_power(),
            DerivedField::EffectivePowerB => self.b.effective_power(),
            DerivedField::EffectivePowerDiff => {
                self.a.effective_power() - self.b.effective_power()
            }
            DerivedField::PriorityAdvantage => self.a.move_priority - self.b.move_priority,
        }
    }
}

/// Extracts the raw features of A using `move_a` against B using `move_b`.
pub fn generate_observation(
    profile_a: &CombatProfile,
    move_a: &Move,
    profile_b: &CombatProfile,
    move_b: &Move,
    outcome: &MatchupOutcome,
) -> RawObservation {
    let eff_a = &outcome.effectiveness_a;
    let eff_b = &outcome.effectiveness_b;
    let a = SideObservation::new(
        profile_a,
        move_a,
        eff_a.effective_power,
        eff_a.stab,
        eff_a.type_multiplier,
    );
    let b = SideObservation::new(
        profile_b,
        move_b,
        eff_b.effective_power,
        eff_b.stab,
        eff_b.type_multiplier,
    );

    RawObservation {
        speed_diff: a.speed - b.speed,
        hp_diff: a.hp - b.hp,
        first_mover_flag: if outcome.first_mover == Side::A { 1.0 } else { 0.0 },
        a,
        b,
    }
}
