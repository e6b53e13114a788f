//! Live move ranking.
//!
//! [`MoveAdvisor`] owns everything a ranking needs: the data sources, the
//! fitted feature pipeline and the classifier. It is built once, checked
//! against the classifier's column contract, and then shared read-only.

use crate::classifier::{verify_contract, ClassifierService};
use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::feature_builder::FeatureVectorBuilder;
use crate::matchup_calc::{compute_matchup, MatchupOutcome};
use crate::move_selector::{get_all_valid_moves, get_best_move, MoveFilter};
use crate::observation::generate_observation;
use crate::sources::{CombatProfileStore, MoveCatalogue, TypeEffectivenessSource};
use crate::state::{normalize_key, CombatProfile, Move, ProfileId, Side};
use crate::type_chart::TypeEffectivenessTable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMove {
    pub move_name: String,
    pub effective_power: f64,
    pub type_multiplier: f64,
    pub stab: f64,
    pub priority: i8,
    pub score: f64,
    /// Classifier probability that the attacker wins, against `opponent_move`
    pub win_probability: f64,
    /// Winner according to the deterministic simulator
    pub predicted_winner: Side,
    /// Opponent move this candidate was judged against
    pub opponent_move: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRanking {
    pub attacker: ProfileId,
    pub defender: ProfileId,
    pub moves: Vec<RankedMove>,
    pub recommended_move: String,
    pub win_probability: f64,
}

pub struct MoveAdvisor {
    profiles: Arc<dyn CombatProfileStore>,
    catalogue: Arc<dyn MoveCatalogue>,
    type_table: TypeEffectivenessTable,
    builder: FeatureVectorBuilder,
    classifier: Arc<dyn ClassifierService>,
    move_filter: MoveFilter,
    level: u32,
}

impl MoveAdvisor {
    /// Fails with a model contract error when the fitted column order
    /// differs from the one the classifier was trained on.
    pub fn new(
        profiles: Arc<dyn CombatProfileStore>,
        catalogue: Arc<dyn MoveCatalogue>,
        type_source: &dyn TypeEffectivenessSource,
        builder: FeatureVectorBuilder,
        classifier: Arc<dyn ClassifierService>,
        config: &AdvisorConfig,
    ) -> Result<Self> {
        if let Err(e) = verify_contract(builder.column_order()?, classifier.metadata()) {
            tracing::warn!("rejecting classifier: {}", e);
            return Err(e);
        }
        let type_table = TypeEffectivenessTable::from_pairs(&type_source.get_all_pairs()?)?;
        tracing::info!(
            model_version = %classifier.metadata().version,
            type_pairs = type_table.len(),
            "move advisor ready"
        );
        Ok(MoveAdvisor {
            profiles,
            catalogue,
            type_table,
            builder,
            classifier,
            move_filter: config.move_filter.clone(),
            level: config.level,
        })
    }

    pub fn classifier(&self) -> &dyn ClassifierService {
        self.classifier.as_ref()
    }

    pub fn builder(&self) -> &FeatureVectorBuilder {
        &self.builder
    }

    /// Ranks `candidate_moves` for `attacker_id` against `defender_id`.
    ///
    /// Without `opponent_moves` the defender answers with its own best valid
    /// move. With several opponent moves each candidate is judged against
    /// the one that gives the attacker the lowest win probability.
    /// Order: win probability, then score, both descending, then input order.
    pub fn rank_moves(
        &self,
        attacker_id: ProfileId,
        defender_id: ProfileId,
        candidate_moves: &[String],
        opponent_moves: Option<&[String]>,
    ) -> Result<MoveRanking> {
        if candidate_moves.is_empty() {
            return Err(AdvisorError::validation("no candidate moves given"));
        }
        let attacker = self.profiles.get_profile(attacker_id)?;
        let defender = self.profiles.get_profile(defender_id)?;

        let attacker_moves = self.catalogue.get_moves_for_profile(attacker_id)?;
        let candidates = damaging_moves(
            &attacker,
            &resolve_moves(&attacker, &attacker_moves, candidate_moves)?,
        );
        if candidates.is_empty() {
            return Err(AdvisorError::validation(format!(
                "none of the candidate moves of {} can deal damage",
                attacker.name
            )));
        }

        let defender_moves = self.catalogue.get_moves_for_profile(defender_id)?;
        let opponents = match opponent_moves {
            Some(names) => damaging_moves(
                &defender,
                &resolve_moves(&defender, &defender_moves, names)?,
            ),
            None => {
                let valid = get_all_valid_moves(&defender_moves, &self.move_filter);
                get_best_move(&defender, &valid, &attacker, &self.type_table, self.level)?
                    .map(|scored| vec![scored.move_.clone()])
                    .unwrap_or_default()
            }
        };
        if opponents.is_empty() {
            return Err(AdvisorError::validation(format!(
                "{} has no damaging move to answer with",
                defender.name
            )));
        }

        verify_contract(self.builder.column_order()?, self.classifier.metadata())?;

        let mut ranked = Vec::with_capacity(candidates.len());
        for candidate in &candidates {
            ranked.push(self.rank_candidate(&attacker, candidate, &defender, &opponents)?);
        }
        // stable sort keeps input order for full ties
        ranked.sort_by(|a, b| {
            b.win_probability
                .total_cmp(&a.win_probability)
                .then_with(|| b.score.total_cmp(&a.score))
        });

        let recommended_move = ranked[0].move_name.clone();
        let win_probability = ranked[0].win_probability;
        tracing::debug!(
            attacker = attacker_id,
            defender = defender_id,
            recommended = %recommended_move,
            win_probability,
            "ranked moves"
        );
        Ok(MoveRanking {
            attacker: attacker_id,
            defender: defender_id,
            moves: ranked,
            recommended_move,
            win_probability,
        })
    }

    fn rank_candidate(
        &self,
        attacker: &CombatProfile,
        candidate: &Move,
        defender: &CombatProfile,
        opponents: &[Move],
    ) -> Result<RankedMove> {
        let mut worst: Option<(f64, MatchupOutcome, &Move)> = None;
        for opponent_move in opponents {
            let outcome = compute_matchup(
                attacker,
                candidate,
                defender,
                opponent_move,
                &self.type_table,
                self.level,
            )?;
            let observation =
                generate_observation(attacker, candidate, defender, opponent_move, &outcome);
            let features = self.builder.transform(&observation)?;
            let probability = self.classifier.predict_proba(&features)?;
            if !(0.0..=1.0).contains(&probability) {
                return Err(AdvisorError::contract(format!(
                    "classifier returned {} for {}, expected a probability",
                    probability, candidate.name
                )));
            }
            tracing::trace!(
                candidate = %candidate.name,
                opponent_move = %opponent_move.name,
                probability,
                "scored candidate"
            );

            let is_worse = match &worst {
                Some((p, _, _)) => probability < *p,
                None => true,
            };
            if is_worse {
                worst = Some((probability, outcome, opponent_move));
            }
        }

        let (win_probability, outcome, opponent_move) = worst
            .ok_or_else(|| AdvisorError::validation("no opponent move to rank against"))?;
        let effectiveness = outcome.effectiveness_a;
        Ok(RankedMove {
            move_name: candidate.name.clone(),
            effective_power: effectiveness.effective_power,
            type_multiplier: effectiveness.type_multiplier,
            stab: effectiveness.stab,
            priority: effectiveness.priority,
            score: effectiveness.score,
            win_probability,
            predicted_winner: outcome.winner,
            opponent_move: opponent_move.name.clone(),
        })
    }
}

/// Looks `names` up in `known`; unknown names are a validation error
fn resolve_moves(profile: &CombatProfile, known: &[Move], names: &[String]) -> Result<Vec<Move>> {
    names
        .iter()
        .map(|name| {
            let key = normalize_key(name);
            known
                .iter()
                .find(|m| normalize_key(&m.name) == key)
                .cloned()
                .ok_or_else(|| {
                    AdvisorError::validation(format!(
                        "{} does not know the move {}",
                        profile.name, name
                    ))
                })
        })
        .collect()
}

fn damaging_moves(profile: &CombatProfile, moves: &[Move]) -> Vec<Move> {
    moves
        .iter()
        .filter(|m| {
            let damaging = m.is_damaging();
            if !damaging {
                tracing::warn!(profile = profile.id, move_name = %m.name, "skipping non-damaging move");
            }
            damaging
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierMetadata;
    use crate::feature_builder::FeatureVector;
    use crate::sources::JsonDataSource;
    use crate::state::{MoveCategory, Stats};
    use crate::type_chart::standard_pairs;
    use std::collections::HashMap;

    /// Probability grows with the attacker's effective power
    struct PowerClassifier {
        metadata: ClassifierMetadata,
    }

    impl ClassifierService for PowerClassifier {
        fn predict_proba(&self, features: &FeatureVector) -> Result<f64> {
            let x = features.get("effective_power_diff").unwrap_or(0.0);
            Ok(1.0 / (1.0 + (-x).exp()))
        }

        fn metadata(&self) -> &ClassifierMetadata {
            &self.metadata
        }
    }

    fn source() -> Arc<JsonDataSource> {
        let stats = |sp_attack, speed| Stats {
            hp: 100,
            attack: 80,
            defense: 80,
            sp_attack,
            sp_defense: 60,
            speed,
        };
        let profiles = vec![
            CombatProfile::new(1, "Aqua", stats(120, 90), vec!["water".into()]).unwrap(),
            CombatProfile::new(2, "Pyro", stats(90, 70), vec!["fire".into()]).unwrap(),
            CombatProfile::new(3, "Leaf", stats(80, 60), vec!["grass".into()]).unwrap(),
        ];
        let movesets: HashMap<ProfileId, Vec<Move>> = vec![
            (
                1,
                vec![
                    Move::new("Surf", "water", MoveCategory::Special, Some(90)),
                    Move::new("Ember", "fire", MoveCategory::Special, Some(40)),
                    Move::new("Growl", "normal", MoveCategory::Status, None),
                ],
            ),
            (
                2,
                vec![
                    Move::new("Flamethrower", "fire", MoveCategory::Special, Some(90)),
                    Move::new("Scratch", "normal", MoveCategory::Physical, Some(40)),
                ],
            ),
            (3, vec![Move::new("Energy Ball", "grass", MoveCategory::Special, Some(90))]),
        ]
        .into_iter()
        .collect();
        Arc::new(JsonDataSource::new(profiles, movesets, standard_pairs()).unwrap())
    }

    fn advisor() -> MoveAdvisor {
        let source = source();
        let roster = crate::dataset::Roster::load(
            &*source,
            &*source,
            &*source,
            &MoveFilter::default(),
            50,
        )
        .unwrap();
        let params = crate::dataset::GenerationParams {
            scenario: crate::dataset::Scenario::AllCombinations,
            test_ratio: 0.0,
            ..Default::default()
        };
        let dataset = crate::dataset::generate_dataset(&roster, &params, None).unwrap();
        let builder = dataset.fit_builder().unwrap();
        let classifier = Arc::new(PowerClassifier {
            metadata: ClassifierMetadata {
                feature_column_order: builder.column_order().unwrap().to_vec(),
                version: "stub".to_string(),
            },
        });
        MoveAdvisor::new(
            source.clone(),
            source.clone(),
            &*source,
            builder,
            classifier,
            &AdvisorConfig::default(),
        )
        .unwrap()
    }

    fn names(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_super_effective_move_ranks_first() {
        let ranking = advisor()
            .rank_moves(1, 2, &names(&["Ember", "Surf"]), None)
            .unwrap();

        assert_eq!(ranking.recommended_move, "Surf");
        assert_eq!(ranking.moves[0].move_name, "Surf");
        assert_eq!(ranking.moves[0].type_multiplier, 2.0);
        assert_eq!(ranking.moves[0].stab, 1.5);
        assert_eq!(ranking.moves[0].score, 270.0);
        assert_eq!(ranking.moves[0].predicted_winner, Side::A);
        assert_eq!(ranking.moves[0].opponent_move, "Flamethrower");
        assert!(ranking.moves[0].win_probability > ranking.moves[1].win_probability);
        assert_eq!(ranking.win_probability, ranking.moves[0].win_probability);
    }

    #[test]
    fn test_worst_opponent_move_is_used() {
        let opponents = names(&["Scratch", "Flamethrower"]);
        let ranking = advisor()
            .rank_moves(1, 2, &names(&["Surf"]), Some(opponents.as_slice()))
            .unwrap();
        // resisted or not, Flamethrower carries more effective power than Scratch
        assert_eq!(ranking.moves[0].opponent_move, "Flamethrower");
    }

    #[test]
    fn test_status_moves_are_skipped() {
        let ranking = advisor()
            .rank_moves(1, 3, &names(&["Growl", "Ember"]), None)
            .unwrap();
        assert_eq!(ranking.moves.len(), 1);
        assert_eq!(ranking.recommended_move, "Ember");
    }

    #[test]
    fn test_validation_errors() {
        let advisor = advisor();
        assert!(matches!(
            advisor.rank_moves(1, 2, &[], None),
            Err(AdvisorError::Validation(_))
        ));
        assert!(matches!(
            advisor.rank_moves(1, 99, &names(&["Surf"]), None),
            Err(AdvisorError::Validation(_))
        ));
        assert!(matches!(
            advisor.rank_moves(1, 2, &names(&["Hydro Pump"]), None),
            Err(AdvisorError::Validation(_))
        ));
        assert!(matches!(
            advisor.rank_moves(1, 2, &names(&["Growl"]), None),
            Err(AdvisorError::Validation(_))
        ));
    }

    #[test]
    fn test_contract_mismatch_rejected_at_construction() {
        let source = source();
        let builder = advisor().builder().clone();

        let mut columns = builder.column_order().unwrap().to_vec();
        columns.swap(0, 1);
        let classifier = Arc::new(PowerClassifier {
            metadata: ClassifierMetadata {
                feature_column_order: columns,
                version: "shuffled".to_string(),
            },
        });
        let result = MoveAdvisor::new(
            source.clone(),
            source.clone(),
            &*source,
            builder,
            classifier,
            &AdvisorConfig::default(),
        );
        assert!(matches!(result, Err(AdvisorError::ModelContract(_))));
    }
}
