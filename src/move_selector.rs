use crate::damage::{evaluate_move, MoveEffectiveness};
use crate::error::Result;
use crate::state::{normalize_key, CombatProfile, DamageTypeKind, Move, MoveCategory};
use crate::type_chart::TypeEffectivenessTable;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

lazy_static! {
    /// Moves that only work on the user's first turn in battle
    pub static ref DEFAULT_EXCLUDED_MOVES: BTreeSet<String> = [
        "Bluff",
        "Escarmouche",
        "Fake Out",
        "First Impression",
    ]
    .iter()
    .map(|name| normalize_key(name))
    .collect();
}

/// Which catalogue moves may be used as attacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveFilter {
    pub allowed_damage_types: BTreeSet<DamageTypeKind>,
    pub excluded_moves: BTreeSet<String>,
}

impl Default for MoveFilter {
    fn default() -> Self {
        MoveFilter {
            allowed_damage_types: [
                DamageTypeKind::Offensif,
                DamageTypeKind::MultiCoups,
                DamageTypeKind::DoubleDegats,
                DamageTypeKind::DeuxTours,
                DamageTypeKind::FixeNiveau,
                DamageTypeKind::FixeDegat,
                DamageTypeKind::Prioritaire,
                DamageTypeKind::AttkAdversaire,
            ]
            .iter()
            .copied()
            .collect(),
            excluded_moves: DEFAULT_EXCLUDED_MOVES.clone(),
        }
    }
}

impl MoveFilter {
    pub fn allows(&self, move_: &Move) -> bool {
        move_.power.is_some()
            && matches!(move_.category, MoveCategory::Physical | MoveCategory::Special)
            && self
                .allowed_damage_types
                .contains(&move_.damage_type.kind())
            && !self.is_excluded(&move_.name)
    }

    fn is_excluded(&self, name: &str) -> bool {
        let key = normalize_key(name);
        self.excluded_moves.iter().any(|n| normalize_key(n) == key)
    }
}

pub fn get_all_valid_moves(moves: &[Move], filter: &MoveFilter) -> Vec<Move> {
    moves.iter().filter(|m| filter.allows(m)).cloned().collect()
}

#[derive(Debug, Clone, Copy)]
pub struct ScoredMove<'a> {
    pub move_: &'a Move,
    pub effectiveness: MoveEffectiveness,
}

/// Highest scoring candidate against `opponent`.
///
/// Ties keep the first candidate seen. Returns `None` for an empty slice.
pub fn get_best_move<'a>(
    attacker: &CombatProfile,
    candidates: &'a [Move],
    opponent: &CombatProfile,
    type_table: &TypeEffectivenessTable,
    level: u32,
) -> Result<Option<ScoredMove<'a>>> {
    let mut best: Option<ScoredMove<'a>> = None;

    for candidate in candidates {
        let effectiveness = evaluate_move(candidate, attacker, opponent, type_table, level)?;
        tracing::trace!(
            attacker = attacker.id,
            opponent = opponent.id,
            candidate = %candidate.name,
            score = effectiveness.score,
            "scored move"
        );

        let better = match &best {
            Some(current) => effectiveness.score > current.effectiveness.score,
            None => true,
        };
        if better {
            best = Some(ScoredMove {
                move_: candidate,
                effectiveness,
            });
        }
    }

    Ok(best)
}
