use super::{GenerationParams, MatchupSample, Roster, Scenario};
use crate::error::{AdvisorError, Result};
use crate::matchup_calc::compute_matchup;
use crate::move_selector::get_best_move;
use crate::observation::generate_observation;
use crate::state::{CombatProfile, Move};
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Streams per pair, one per strategy of `Scenario::All`
const STREAMS_PER_PAIR: u64 = 4;
pub(crate) const UNION_SHUFFLE_STREAM: u64 = u64::MAX - 1;
pub(crate) const SPLIT_STREAM: u64 = u64::MAX;

pub(crate) fn stream_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

fn strategy_offset(strategy: Scenario) -> u64 {
    match strategy {
        Scenario::BestMove => 0,
        Scenario::RandomMove => 1,
        Scenario::AllCombinations => 2,
        Scenario::All => 3,
    }
}

/// All samples for the ordered pair (a, b) under `params.scenario`.
/// Callers skip self-matchups and pairs without valid moves.
pub fn pair_samples(
    roster: &Roster,
    a: &CombatProfile,
    b: &CombatProfile,
    params: &GenerationParams,
    pair_index: u64,
) -> Result<Vec<MatchupSample>> {
    let mut samples = Vec::new();
    for strategy in params.scenario.strategies() {
        let mut rng = stream_rng(
            params.seed,
            pair_index * STREAMS_PER_PAIR + strategy_offset(*strategy),
        );
        match strategy {
            Scenario::BestMove => samples.extend(best_move_samples(roster, a, b)?),
            Scenario::RandomMove => samples.extend(random_move_samples(
                roster,
                a,
                b,
                params.random_repeats,
                &mut rng,
            )?),
            Scenario::AllCombinations => samples.extend(all_combination_samples(
                roster,
                a,
                b,
                params.max_combinations_per_pair,
                &mut rng,
            )?),
            Scenario::All => {}
        }
    }
    Ok(samples)
}

fn simulate(
    roster: &Roster,
    a: &CombatProfile,
    move_a: &Move,
    b: &CombatProfile,
    move_b: &Move,
) -> Result<MatchupSample> {
    let outcome = compute_matchup(a, move_a, b, move_b, roster.type_table(), roster.level())?;
    Ok(MatchupSample {
        profile_a: a.id,
        profile_b: b.id,
        move_a: move_a.name.clone(),
        move_b: move_b.name.clone(),
        features: generate_observation(a, move_a, b, move_b, &outcome),
        winner: outcome.winner,
    })
}

fn best_move<'a>(roster: &'a Roster, attacker: &CombatProfile, opponent: &CombatProfile) -> Result<&'a Move> {
    get_best_move(
        attacker,
        roster.valid_moves(attacker.id),
        opponent,
        roster.type_table(),
        roster.level(),
    )?
    .map(|scored| scored.move_)
    .ok_or_else(|| AdvisorError::validation(format!("profile {} has no valid moves", attacker.id)))
}

pub fn best_move_samples(
    roster: &Roster,
    a: &CombatProfile,
    b: &CombatProfile,
) -> Result<Vec<MatchupSample>> {
    let move_a = best_move(roster, a, b)?;
    let move_b = best_move(roster, b, a)?;
    Ok(vec![simulate(roster, a, move_a, b, move_b)?])
}

/// A keeps its best move while B picks uniformly among its valid moves
pub fn random_move_samples(
    roster: &Roster,
    a: &CombatProfile,
    b: &CombatProfile,
    repeats: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<MatchupSample>> {
    let move_a = best_move(roster, a, b)?;
    let moves_b = roster.valid_moves(b.id);

    let mut samples = Vec::with_capacity(repeats);
    for _ in 0..repeats {
        let move_b = moves_b
            .choose(rng)
            .ok_or_else(|| AdvisorError::validation(format!("profile {} has no valid moves", b.id)))?;
        samples.push(simulate(roster, a, move_a, b, move_b)?);
    }
    Ok(samples)
}

/// Cross product of both movesets; above `cap` a uniform subset of `cap`
/// combinations is kept, in cross-product order
pub fn all_combination_samples(
    roster: &Roster,
    a: &CombatProfile,
    b: &CombatProfile,
    cap: usize,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<MatchupSample>> {
    let moves_a = roster.valid_moves(a.id);
    let moves_b = roster.valid_moves(b.id);
    let total = moves_a.len() * moves_b.len();

    let chosen: Vec<usize> = if total > cap {
        let mut picked = index::sample(rng, total, cap).into_vec();
        picked.sort_unstable();
        picked
    } else {
        (0..total).collect()
    };

    chosen
        .into_iter()
        .map(|idx| {
            let move_a = &moves_a[idx / moves_b.len()];
            let move_b = &moves_b[idx % moves_b.len()];
            simulate(roster, a, move_a, b, move_b)
        })
        .collect()
}
