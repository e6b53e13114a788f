//! Labeled training data from simulated matchups.
//!
//! Every ordered pair of distinct profiles is played out under a
//! [`Scenario`]; the simulator decides the label. Pairs are independent, so
//! generation fans out over rayon workers that only read the [`Roster`].
//! Each pair draws from its own seeded RNG stream, which keeps the output
//! identical between sequential and parallel runs.

pub mod recorder;
pub mod scenario;
pub mod split;

use crate::error::{AdvisorError, Result};
use crate::feature_builder::FeatureVectorBuilder;
use crate::matchup_calc::DEFAULT_LEVEL;
use crate::move_selector::{get_all_valid_moves, MoveFilter};
use crate::observation::RawObservation;
use crate::sources::{CombatProfileStore, MoveCatalogue, TypeEffectivenessSource};
use crate::state::{CombatProfile, Move, ProfileId, Side};
use crate::type_chart::TypeEffectivenessTable;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One simulated matchup: who fought, with which moves, and who won
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupSample {
    pub profile_a: ProfileId,
    pub profile_b: ProfileId,
    pub move_a: String,
    pub move_b: String,
    pub features: RawObservation,
    pub winner: Side,
}

impl MatchupSample {
    pub fn label(&self) -> u8 {
        self.winner.label()
    }
}

/// Label column for a trainer: plain integers, 1 when side A wins
pub fn label_column(samples: &[MatchupSample]) -> Vec<i64> {
    samples.iter().map(|s| i64::from(s.label())).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Both sides use their best scoring move
    BestMove,
    /// A uses its best move, B a random valid move, repeated
    RandomMove,
    /// Cross product of both movesets, capped per pair
    AllCombinations,
    /// Union of the three strategies above
    All,
}

impl Scenario {
    /// Strategies that make up this scenario, with their RNG stream offset
    pub(crate) fn strategies(self) -> &'static [Scenario] {
        match self {
            Scenario::BestMove => &[Scenario::BestMove],
            Scenario::RandomMove => &[Scenario::RandomMove],
            Scenario::AllCombinations => &[Scenario::AllCombinations],
            Scenario::All => &[
                Scenario::BestMove,
                Scenario::RandomMove,
                Scenario::AllCombinations,
            ],
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::BestMove
    }
}

impl FromStr for Scenario {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "best_move" => Ok(Scenario::BestMove),
            "random_move" => Ok(Scenario::RandomMove),
            "all_combinations" => Ok(Scenario::AllCombinations),
            "all" => Ok(Scenario::All),
            _ => Err(AdvisorError::validation(format!("unknown scenario: {}", s))),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scenario::BestMove => "best_move",
            Scenario::RandomMove => "random_move",
            Scenario::AllCombinations => "all_combinations",
            Scenario::All => "all",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub scenario: Scenario,
    pub random_repeats: usize,
    pub max_combinations_per_pair: usize,
    /// Share of each label that goes to the test set
    pub test_ratio: f64,
    pub seed: u64,
    pub parallel: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            scenario: Scenario::BestMove,
            random_repeats: 5,
            max_combinations_per_pair: 20,
            test_ratio: 0.2,
            seed: 42,
            parallel: true,
        }
    }
}

impl GenerationParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.test_ratio) {
            return Err(AdvisorError::validation(format!(
                "test_ratio must be within [0, 1], found {}",
                self.test_ratio
            )));
        }
        if self.max_combinations_per_pair == 0 {
            return Err(AdvisorError::validation(
                "max_combinations_per_pair must be positive",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub pairs_considered: usize,
    pub self_matchups_skipped: usize,
    /// Pairs where either side had no valid move
    pub pairs_skipped_no_moves: usize,
    pub samples: usize,
    pub train: usize,
    pub test: usize,
    pub cancelled: bool,
}

/// Shared flag checked between pairs; pairs already finished are kept
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Profiles with their filtered movesets and the type chart, read-only
/// for the duration of a generation run
#[derive(Debug, Clone)]
pub struct Roster {
    profiles: Vec<CombatProfile>,
    valid_moves: HashMap<ProfileId, Vec<Move>>,
    type_table: TypeEffectivenessTable,
    level: u32,
}

impl Roster {
    /// `moves` is filtered through `filter`; profiles left without a valid move are kept
    /// and their pairs are skipped at generation time.
    pub fn new(
        profiles: Vec<CombatProfile>,
        moves: HashMap<ProfileId, Vec<Move>>,
        type_table: TypeEffectivenessTable,
        filter: &MoveFilter,
        level: u32,
    ) -> Self {
        let valid_moves: HashMap<ProfileId, Vec<Move>> = profiles
            .iter()
            .map(|p| {
                let valid = moves
                    .get(&p.id)
                    .map(|m| get_all_valid_moves(m, filter))
                    .unwrap_or_default();
                if valid.is_empty() {
                    tracing::warn!(profile = p.id, name = %p.name, "profile has no valid moves");
                }
                (p.id, valid)
            })
            .collect();

        Roster {
            profiles,
            valid_moves,
            type_table,
            level,
        }
    }

    pub fn load(
        profile_store: &dyn CombatProfileStore,
        catalogue: &dyn MoveCatalogue,
        type_source: &dyn TypeEffectivenessSource,
        filter: &MoveFilter,
        level: u32,
    ) -> Result<Self> {
        let profiles = profile_store.get_all_profiles()?;
        let mut moves = HashMap::with_capacity(profiles.len());
        for profile in &profiles {
            moves.insert(profile.id, catalogue.get_moves_for_profile(profile.id)?);
        }
        let type_table = TypeEffectivenessTable::from_pairs(&type_source.get_all_pairs()?)?;
        Ok(Self::new(profiles, moves, type_table, filter, level))
    }

    pub fn profiles(&self) -> &[CombatProfile] {
        &self.profiles
    }

    pub fn valid_moves(&self, id: ProfileId) -> &[Move] {
        self.valid_moves
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn type_table(&self) -> &TypeEffectivenessTable {
        &self.type_table
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for Roster {
    fn default() -> Self {
        Roster {
            profiles: Vec::new(),
            valid_moves: HashMap::new(),
            type_table: TypeEffectivenessTable::default(),
            level: DEFAULT_LEVEL,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneratedDataset {
    pub train: Vec<MatchupSample>,
    pub test: Vec<MatchupSample>,
    pub report: GenerationReport,
}

impl GeneratedDataset {
    /// Feature builder fit on the training split only
    pub fn fit_builder(&self) -> Result<FeatureVectorBuilder> {
        let mut builder = FeatureVectorBuilder::new();
        builder.fit(self.train.iter().map(|s| &s.features))?;
        Ok(builder)
    }
}

enum PairOutcome {
    Samples(Vec<MatchupSample>),
    NoMoves,
    Cancelled,
}

pub fn generate_dataset(
    roster: &Roster,
    params: &GenerationParams,
    cancel: Option<&CancellationToken>,
) -> Result<GeneratedDataset> {
    generate_dataset_observed(roster, params, cancel, &|_: ProfileId, _: ProfileId| {})
}

/// `on_pair_done` runs after every pair that produced samples, before the
/// cancellation flag is checked for the next pair.
pub(crate) fn generate_dataset_observed(
    roster: &Roster,
    params: &GenerationParams,
    cancel: Option<&CancellationToken>,
    on_pair_done: &(dyn Fn(ProfileId, ProfileId) + Sync),
) -> Result<GeneratedDataset> {
    params.validate()?;
    let profiles = roster.profiles();
    let n = profiles.len();

    // pair index is position in the full n x n grid, so it does not depend on skips
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1));
    let mut report = GenerationReport::default();
    for (i, a) in profiles.iter().enumerate() {
        for (j, b) in profiles.iter().enumerate() {
            report.pairs_considered += 1;
            if a.id == b.id {
                report.self_matchups_skipped += 1;
                continue;
            }
            pairs.push(((i * n + j) as u64, a, b));
        }
    }

    let run_pair = |&(pair_index, a, b): &(u64, &CombatProfile, &CombatProfile)| -> Result<PairOutcome> {
        if cancel.map_or(false, |c| c.is_cancelled()) {
            return Ok(PairOutcome::Cancelled);
        }
        if roster.valid_moves(a.id).is_empty() || roster.valid_moves(b.id).is_empty() {
            tracing::debug!(a = a.id, b = b.id, "skipping pair without valid moves");
            return Ok(PairOutcome::NoMoves);
        }
        let samples = scenario::pair_samples(roster, a, b, params, pair_index)?;
        tracing::debug!(a = a.id, b = b.id, samples = samples.len(), "generated pair");
        on_pair_done(a.id, b.id);
        Ok(PairOutcome::Samples(samples))
    };

    let outcomes: Vec<PairOutcome> = if params.parallel {
        pairs.par_iter().map(run_pair).collect::<Result<_>>()?
    } else {
        pairs.iter().map(run_pair).collect::<Result<_>>()?
    };

    let mut samples = Vec::new();
    for outcome in outcomes {
        match outcome {
            PairOutcome::Samples(s) => samples.extend(s),
            PairOutcome::NoMoves => report.pairs_skipped_no_moves += 1,
            PairOutcome::Cancelled => report.cancelled = true,
        }
    }
    if report.pairs_skipped_no_moves > 0 {
        tracing::warn!(
            skipped = report.pairs_skipped_no_moves,
            "pairs skipped because a side had no valid moves"
        );
    }
    if report.cancelled {
        tracing::warn!(kept = samples.len(), "generation cancelled");
    }

    if params.scenario == Scenario::All {
        let mut rng = scenario::stream_rng(params.seed, scenario::UNION_SHUFFLE_STREAM);
        samples.shuffle(&mut rng);
    }

    report.samples = samples.len();
    let (train, test) = split::stratified_split(samples, params.test_ratio, params.seed);
    report.train = train.len();
    report.test = test.len();

    tracing::info!(
        scenario = %params.scenario,
        samples = report.samples,
        train = report.train,
        test = report.test,
        "generated dataset"
    );
    Ok(GeneratedDataset {
        train,
        test,
        report,
    })
}
