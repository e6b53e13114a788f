use crate::damage::{evaluate_move, MoveEffectiveness};
use crate::error::Result;
use crate::state::{CombatProfile, DamageType, Move, MoveCategory, Side};
use crate::turn_order::who_first;
use crate::type_chart::TypeEffectivenessTable;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LEVEL: u32 = 50;

// Damage floor so a zero-damage move yields a huge but finite turns-to-KO
pub const MIN_DAMAGE: f64 = 0.1;

/// Result of a one-move-each 1v1 between side A and side B
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchupOutcome {
    pub first_mover: Side,
    pub effectiveness_a: MoveEffectiveness,
    pub effectiveness_b: MoveEffectiveness,
    /// Damage per hit dealt by A to B
    pub damage_a: f64,
    /// Damage per hit dealt by B to A
    pub damage_b: f64,
    /// Hits A needs to KO B
    pub turns_to_ko_a: f64,
    /// Hits B needs to KO A
    pub turns_to_ko_b: f64,
    pub winner: Side,
}

/// Per-hit damage of `move_` from `attacker` into `defender`.
///
/// Shared by dataset generation and live ranking so both see the same numbers.
pub fn calculate_damage(
    move_: &Move,
    effectiveness: &MoveEffectiveness,
    attacker: &CombatProfile,
    defender: &CombatProfile,
    level: u32,
) -> f64 {
    if move_.damage_type.is_fixed_damage() {
        // fixed damage ignores stats and STAB, but not immunities
        return if effectiveness.type_multiplier == 0.0 {
            0.0
        } else {
            effectiveness.effective_power
        };
    }

    let (attack_stat, defense_stat) = match move_.category {
        MoveCategory::Special => (attacker.stats.sp_attack, defender.stats.sp_defense),
        _ => (attacker.stats.attack, defender.stats.defense),
    };
    let attack_stat = match move_.damage_type {
        DamageType::AttkAdversaire => defender.stats.attack,
        _ => attack_stat,
    };

    let level_factor = 2.0 * level as f64 / 5.0 + 2.0;
    let base = level_factor * effectiveness.effective_power * (attack_stat as f64 / defense_stat as f64)
        / 50.0
        + 2.0;

    base * effectiveness.stab * effectiveness.type_multiplier
}

/// Hits needed to KO; damage is floored at `MIN_DAMAGE`
pub fn calculate_turns_to_ko(damage: f64, defender_hp: u32) -> f64 {
    defender_hp as f64 / damage.max(MIN_DAMAGE)
}

/// Decides the winner from turn order and both turns-to-KO values.
///
/// The first mover wins when it needs no more hits than its opponent.
pub fn decide_winner(first_mover: Side, turns_to_ko_a: f64, turns_to_ko_b: f64) -> Side {
    let (first_ttk, second_ttk) = match first_mover {
        Side::A => (turns_to_ko_a, turns_to_ko_b),
        Side::B => (turns_to_ko_b, turns_to_ko_a),
    };
    if first_ttk <= second_ttk {
        first_mover
    } else {
        first_mover.opponent()
    }
}

pub fn compute_matchup(
    profile_a: &CombatProfile,
    move_a: &Move,
    profile_b: &CombatProfile,
    move_b: &Move,
    type_table: &TypeEffectivenessTable,
    level: u32,
) -> Result<MatchupOutcome> {
    let effectiveness_a = evaluate_move(move_a, profile_a, profile_b, type_table, level)?;
    let effectiveness_b = evaluate_move(move_b, profile_b, profile_a, type_table, level)?;

    let first_mover = who_first(
        move_a.priority,
        profile_a.stats.speed,
        move_b.priority,
        profile_b.stats.speed,
    );

    let damage_a = calculate_damage(move_a, &effectiveness_a, profile_a, profile_b, level);
    let damage_b = calculate_damage(move_b, &effectiveness_b, profile_b, profile_a, level);

    let turns_to_ko_a = calculate_turns_to_ko(damage_a, profile_b.stats.hp);
    let turns_to_ko_b = calculate_turns_to_ko(damage_b, profile_a.stats.hp);

    Ok(MatchupOutcome {
        first_mover,
        effectiveness_a,
        effectiveness_b,
        damage_a,
        damage_b,
        turns_to_ko_a,
        turns_to_ko_b,
        winner: decide_winner(first_mover, turns_to_ko_a, turns_to_ko_b),
    })
}
