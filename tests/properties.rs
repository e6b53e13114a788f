use battle_advisor::damage::{evaluate_move, stab};
use battle_advisor::dataset::{generate_dataset, GenerationParams, Roster, Scenario};
use battle_advisor::feature_builder::FeatureVectorBuilder;
use battle_advisor::matchup_calc::{calculate_turns_to_ko, compute_matchup, DEFAULT_LEVEL};
use battle_advisor::move_selector::MoveFilter;
use battle_advisor::observation::generate_observation;
use battle_advisor::state::{CombatProfile, Move, MoveCategory, ProfileId, Side, Stats};
use battle_advisor::turn_order::who_first;
use battle_advisor::type_chart::{TypeEffectivenessPair, TypeEffectivenessTable};
use proptest::prelude::*;
use std::collections::HashMap;

const TYPES: [&str; 6] = ["eau", "feu", "plante", "electrik", "vol", "normal"];

fn type_name() -> impl Strategy<Value = String> {
    proptest::sample::select(TYPES.to_vec()).prop_map(str::to_string)
}

fn defender_types() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(type_name(), 1..=2)
}

fn stats() -> impl Strategy<Value = Stats> {
    (1u32..255, 1u32..255, 1u32..255, 1u32..255, 1u32..255, 1u32..255).prop_map(
        |(hp, attack, defense, sp_attack, sp_defense, speed)| Stats {
            hp,
            attack,
            defense,
            sp_attack,
            sp_defense,
            speed,
        },
    )
}

fn profile() -> impl Strategy<Value = CombatProfile> {
    (stats(), defender_types()).prop_map(|(stats, types)| CombatProfile {
        id: 1,
        name: "p".to_string(),
        stats,
        types,
    })
}

fn damaging_move() -> impl Strategy<Value = Move> {
    (type_name(), 10u32..150, any::<bool>(), -1i8..=2).prop_map(|(t, power, special, priority)| {
        let category = if special {
            MoveCategory::Special
        } else {
            MoveCategory::Physical
        };
        Move::new("m", &t, category, Some(power)).with_priority(priority)
    })
}

proptest! {
    #[test]
    fn absent_pairs_are_neutral(attacking in type_name(), defending in defender_types()) {
        let table = TypeEffectivenessTable::from_pairs(&[TypeEffectivenessPair {
            attacking: "dragon".to_string(),
            defending: "dragon".to_string(),
            multiplier: 2.0,
        }])
        .unwrap();
        prop_assert_eq!(table.combined(&attacking, &defending), 1.0);
    }

    #[test]
    fn stab_iff_move_type_matches(attacker in profile(), m in damaging_move()) {
        let expected = if attacker.types.contains(&m.move_type) { 1.5 } else { 1.0 };
        prop_assert_eq!(stab(&m, &attacker), expected);
    }

    #[test]
    fn turns_to_ko_monotone(d1 in 0.1f64..500.0, delta in 0.01f64..100.0, hp in 1u32..500, extra_hp in 1u32..100) {
        prop_assert!(calculate_turns_to_ko(d1 + delta, hp) < calculate_turns_to_ko(d1, hp));
        prop_assert!(calculate_turns_to_ko(d1, hp + extra_hp) > calculate_turns_to_ko(d1, hp));
    }

    #[test]
    fn priority_beats_speed(pa in -1i8..=3, pb in -1i8..=3, sa in 1u32..300, sb in 1u32..300) {
        let first = who_first(pa, sa, pb, sb);
        if pa > pb {
            prop_assert_eq!(first, Side::A);
        } else if pb > pa {
            prop_assert_eq!(first, Side::B);
        } else if sb > sa {
            prop_assert_eq!(first, Side::B);
        } else {
            prop_assert_eq!(first, Side::A);
        }
    }

    #[test]
    fn score_matches_formula(attacker in profile(), defender in profile(), m in damaging_move()) {
        let table = TypeEffectivenessTable::standard();
        let eff = evaluate_move(&m, &attacker, &defender, &table, DEFAULT_LEVEL).unwrap();
        let expected = eff.effective_power * eff.stab * eff.type_multiplier + m.priority as f64 * 50.0;
        prop_assert!((eff.score - expected).abs() < 1e-9);
    }

    #[test]
    fn transform_width_is_fixed(
        a in profile(),
        b in profile(),
        move_a in damaging_move(),
        move_b in damaging_move(),
    ) {
        let table = TypeEffectivenessTable::standard();
        let mut builder = FeatureVectorBuilder::new();
        let training = training_observations(&table);
        builder.fit(&training).unwrap();
        let width = builder.column_order().unwrap().len();

        let outcome = compute_matchup(&a, &move_a, &b, &move_b, &table, DEFAULT_LEVEL).unwrap();
        let observation = generate_observation(&a, &move_a, &b, &move_b, &outcome);
        let first = builder.transform(&observation).unwrap();
        let second = builder.transform(&observation).unwrap();

        prop_assert_eq!(first.len(), width);
        prop_assert_eq!(first.columns.as_slice(), builder.column_order().unwrap());
        prop_assert_eq!(first, second);
    }
}

fn training_observations(
    table: &TypeEffectivenessTable,
) -> Vec<battle_advisor::observation::RawObservation> {
    let stats = Stats {
        hp: 80,
        attack: 80,
        defense: 80,
        sp_attack: 80,
        sp_defense: 80,
        speed: 80,
    };
    let water = CombatProfile::new(1, "w", stats, vec!["eau".into()]).unwrap();
    let fire = CombatProfile::new(2, "f", Stats { speed: 90, ..stats }, vec!["feu".into(), "vol".into()]).unwrap();
    let surf = Move::new("Surf", "eau", MoveCategory::Special, Some(90));
    let ember = Move::new("Ember", "feu", MoveCategory::Special, Some(40));

    [(&water, &surf, &fire, &ember), (&fire, &ember, &water, &surf)]
        .iter()
        .map(|(a, ma, b, mb)| {
            let outcome = compute_matchup(a, ma, b, mb, table, DEFAULT_LEVEL).unwrap();
            generate_observation(a, ma, b, mb, &outcome)
        })
        .collect()
}

#[test]
fn who_first_examples() {
    assert_eq!(who_first(2, 50, 1, 999), Side::A);
    assert_eq!(who_first(0, 80, 0, 50), Side::A);
    assert_eq!(who_first(0, 50, 0, 50), Side::A);
}

#[test]
fn reference_matchup_numbers() {
    let attacker = CombatProfile::new(
        1,
        "attacker",
        Stats {
            hp: 100,
            attack: 80,
            defense: 80,
            sp_attack: 120,
            sp_defense: 80,
            speed: 90,
        },
        vec!["Water".into()],
    )
    .unwrap();
    let defender = CombatProfile::new(
        2,
        "defender",
        Stats {
            hp: 100,
            attack: 80,
            defense: 80,
            sp_attack: 80,
            sp_defense: 60,
            speed: 70,
        },
        vec!["Fire".into()],
    )
    .unwrap();
    let table = TypeEffectivenessTable::from_pairs(&[TypeEffectivenessPair {
        attacking: "Water".into(),
        defending: "Fire".into(),
        multiplier: 2.0,
    }])
    .unwrap();
    let surf = Move::new("Surf", "Water", MoveCategory::Special, Some(90));
    let tackle = Move::new("Tackle", "Normal", MoveCategory::Physical, Some(40));

    let outcome = compute_matchup(&attacker, &surf, &defender, &tackle, &table, DEFAULT_LEVEL).unwrap();
    assert_eq!(outcome.effectiveness_a.effective_power, 90.0);
    assert_eq!(outcome.effectiveness_a.stab, 1.5);
    assert_eq!(outcome.effectiveness_a.type_multiplier, 2.0);
    assert_eq!(outcome.effectiveness_a.score, 270.0);
    assert!((outcome.damage_a - 243.6).abs() < 1e-9);
    assert_eq!(outcome.winner, Side::A);
}

#[test]
fn all_combinations_never_pits_a_profile_against_itself() {
    let profiles: Vec<CombatProfile> = (1..=4)
        .map(|id: ProfileId| {
            CombatProfile::new(
                id,
                "p",
                Stats {
                    hp: 50 + id * 20,
                    attack: 70,
                    defense: 70,
                    sp_attack: 70,
                    sp_defense: 70,
                    speed: 60 + id,
                },
                vec![TYPES[id as usize].to_string()],
            )
            .unwrap()
        })
        .collect();
    let moves: HashMap<ProfileId, Vec<Move>> = profiles
        .iter()
        .map(|p| {
            (
                p.id,
                vec![
                    Move::new("a", p.primary_type(), MoveCategory::Special, Some(80)),
                    Move::new("b", "normal", MoveCategory::Physical, Some(60)),
                ],
            )
        })
        .collect();
    let roster = Roster::new(
        profiles,
        moves,
        TypeEffectivenessTable::standard(),
        &MoveFilter::default(),
        DEFAULT_LEVEL,
    );
    let dataset = generate_dataset(
        &roster,
        &GenerationParams {
            scenario: Scenario::AllCombinations,
            ..GenerationParams::default()
        },
        None,
    )
    .unwrap();

    assert_eq!(dataset.report.samples, 12 * 4);
    assert!(dataset
        .train
        .iter()
        .chain(dataset.test.iter())
        .all(|s| s.profile_a != s.profile_b));
}
