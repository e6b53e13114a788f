use super::scenario::{stream_rng, SPLIT_STREAM};
use super::MatchupSample;
use crate::state::Side;
use rand::seq::SliceRandom;

/// Train/test split stratified on the winner label.
///
/// Each label group is shuffled with `seed` and contributes
/// `round(len * test_ratio)` samples to the test set. Both halves are
/// shuffled again so the labels are interleaved.
pub fn stratified_split(
    samples: Vec<MatchupSample>,
    test_ratio: f64,
    seed: u64,
) -> (Vec<MatchupSample>, Vec<MatchupSample>) {
    let mut rng = stream_rng(seed, SPLIT_STREAM);

    let (mut wins_a, mut wins_b): (Vec<_>, Vec<_>) =
        samples.into_iter().partition(|s| s.winner == Side::A);

    let mut train = Vec::with_capacity(wins_a.len() + wins_b.len());
    let mut test = Vec::new();
    for group in [&mut wins_a, &mut wins_b] {
        group.shuffle(&mut rng);
        let n_test = ((group.len() as f64) * test_ratio).round() as usize;
        let n_test = n_test.min(group.len());
        test.extend(group.drain(..n_test));
        train.append(group);
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::{RawObservation, SideObservation};

    fn side() -> SideObservation {
        SideObservation {
            hp: 1.0,
            attack: 1.0,
            defense: 1.0,
            sp_attack: 1.0,
            sp_defense: 1.0,
            speed: 1.0,
            total_stats: 6.0,
            type1: "normal".to_string(),
            type2: None,
            move_power: 1.0,
            move_type: "normal".to_string(),
            move_priority: 0.0,
            move_stab: 1.0,
            move_type_multiplier: 1.0,
        }
    }

    fn samples(wins_a: usize, wins_b: usize) -> Vec<MatchupSample> {
        (0..wins_a + wins_b)
            .map(|i| MatchupSample {
                profile_a: i as u32,
                profile_b: 1000,
                move_a: "x".to_string(),
                move_b: "y".to_string(),
                features: RawObservation {
                    a: side(),
                    b: side(),
                    speed_diff: 0.0,
                    hp_diff: 0.0,
                    first_mover_flag: 1.0,
                },
                winner: if i < wins_a { Side::A } else { Side::B },
            })
            .collect()
    }

    fn count(set: &[MatchupSample], side: Side) -> usize {
        set.iter().filter(|s| s.winner == side).count()
    }

    #[test]
    fn test_each_label_split_by_ratio() {
        let (train, test) = stratified_split(samples(50, 30), 0.2, 42);
        assert_eq!(count(&test, Side::A), 10);
        assert_eq!(count(&test, Side::B), 6);
        assert_eq!(count(&train, Side::A), 40);
        assert_eq!(count(&train, Side::B), 24);
    }

    #[test]
    fn test_split_is_seeded() {
        let first = stratified_split(samples(20, 20), 0.25, 7);
        let second = stratified_split(samples(20, 20), 0.25, 7);
        assert_eq!(first, second);

        let other = stratified_split(samples(20, 20), 0.25, 8);
        assert_ne!(first.0, other.0);
    }

    #[test]
    fn test_edge_ratios() {
        let (train, test) = stratified_split(samples(3, 2), 0.0, 1);
        assert_eq!((train.len(), test.len()), (5, 0));
        let (train, test) = stratified_split(samples(3, 2), 1.0, 1);
        assert_eq!((train.len(), test.len()), (0, 5));
    }

    #[test]
    fn test_no_sample_lost_or_duplicated() {
        let (train, test) = stratified_split(samples(17, 9), 0.3, 3);
        let mut ids: Vec<u32> = train.iter().chain(test.iter()).map(|s| s.profile_a).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..26).collect::<Vec<u32>>());
    }
}
