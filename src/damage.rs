use crate::error::{AdvisorError, Result};
use crate::state::{CombatProfile, DamageType, Move};
use crate::type_chart::TypeEffectivenessTable;
use serde::{Deserialize, Serialize};

pub const STAB_MULTIPLIER: f64 = 1.5;
pub const PRIORITY_SCORE_WEIGHT: f64 = 50.0;

/// How good a move looks before any battle is simulated
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoveEffectiveness {
    pub effective_power: f64,
    pub stab: f64,
    pub type_multiplier: f64,
    pub priority: i8,
    pub accuracy: u32,
    pub score: f64,
}

/// Base power after the damage-type transform.
///
/// Fixed-damage tags replace the power entirely; the damage formula in
/// `matchup_calc` uses the value as the final damage for those.
pub fn effective_power(base_power: u32, damage_type: &DamageType, level: u32) -> f64 {
    let base = base_power as f64;
    match damage_type {
        DamageType::MultiCoups => base * 3.0,
        DamageType::DoubleDegats => base * 2.0,
        DamageType::DeuxTours => base / 2.0,
        DamageType::FixeNiveau => level as f64,
        DamageType::FixeDegat(amount) => *amount as f64,
        DamageType::Offensif => base,
        DamageType::Prioritaire(_) => base,
        DamageType::AttkAdversaire => base,
        // unknown tags score like offensif
        DamageType::Other(_) => base,
    }
}

pub fn stab(move_: &Move, attacker: &CombatProfile) -> f64 {
    if attacker.has_type(&move_.move_type) {
        STAB_MULTIPLIER
    } else {
        1.0
    }
}

/// Scores `move_` used by `attacker` against `defender`.
///
/// The score is a ranking heuristic, not damage: priority adds a flat bonus so
/// that priority moves win ties between otherwise similar options.
pub fn evaluate_move(
    move_: &Move,
    attacker: &CombatProfile,
    defender: &CombatProfile,
    type_table: &TypeEffectivenessTable,
    level: u32,
) -> Result<MoveEffectiveness> {
    let base_power = match move_.power {
        Some(power) if move_.is_damaging() => power,
        _ => {
            return Err(AdvisorError::validation(format!(
                "move {} cannot be scored: no power or status category",
                move_.name
            )))
        }
    };

    let effective_power = effective_power(base_power, &move_.damage_type, level);
    let stab = stab(move_, attacker);
    let type_multiplier = type_table.combined(&move_.move_type, &defender.types);
    let accuracy = move_.effective_accuracy();

    let score = effective_power * stab * type_multiplier * (accuracy as f64 / 100.0)
        + move_.priority as f64 * PRIORITY_SCORE_WEIGHT;

    Ok(MoveEffectiveness {
        effective_power,
        stab,
        type_multiplier,
        priority: move_.priority,
        accuracy,
        score,
    })
}
