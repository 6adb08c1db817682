use std::collections::BTreeMap;

use proptest::prelude::*;

use quickplan::algorithm::ranker::rank;
use quickplan::algorithm::scoring::{Score, ScoredCombination};
use quickplan::models::{Combination, Section};

fn scored(idx: usize, combined: f64) -> ScoredCombination {
    let section = Section {
        course_code: "ENG-103".to_string(),
        name: format!("ENG-103-{}", idx),
        ..Default::default()
    };
    ScoredCombination {
        combination: Combination::new(vec![section]),
        score: Score { combined, subscores: BTreeMap::new() },
    }
}

fn idx_of(s: &ScoredCombination) -> usize {
    s.combination.sections[0].name.rsplit('-').next().unwrap().parse().unwrap()
}

#[test]
fn test_rank_orders_ascending_and_keeps_ties() {
    let input = vec![scored(0, 3.5), scored(1, 1.0), scored(2, 3.5), scored(3, -2.0), scored(4, 1.0)];
    let ranking = rank(input);
    let order: Vec<usize> = ranking.entries.iter().map(idx_of).collect();
    assert_eq!(order, vec![3, 1, 4, 0, 2]);
    assert_eq!(idx_of(ranking.best().unwrap()), 3);
}

#[test]
fn test_top_and_bottom() {
    let ranking = rank(vec![scored(0, 5.0), scored(1, 2.0), scored(2, 9.0), scored(3, 1.0)]);
    let top: Vec<usize> = ranking.top(2).iter().map(idx_of).collect();
    assert_eq!(top, vec![3, 1]);
    let bottom: Vec<usize> = ranking.bottom(2).into_iter().map(idx_of).collect();
    assert_eq!(bottom, vec![2, 0]);
    // k mayor que el total
    assert_eq!(ranking.top(10).len(), 4);
    assert_eq!(ranking.bottom(10).len(), 4);
    // no cambia los puntajes
    assert_eq!(ranking.entries[0].score.combined, 1.0);
}

#[test]
fn test_rank_empty() {
    let ranking = rank(Vec::new());
    assert!(ranking.is_empty());
    assert!(ranking.best().is_none());
    assert!(ranking.top(3).is_empty());
}

proptest! {
    #[test]
    fn prop_rank_is_stable_and_non_decreasing(scores in prop::collection::vec(0u8..6, 0..40)) {
        let input: Vec<ScoredCombination> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| scored(i, *s as f64 / 2.0))
            .collect();
        let ranking = rank(input);
        prop_assert_eq!(ranking.len(), scores.len());
        for w in ranking.entries.windows(2) {
            prop_assert!(w[0].score.combined <= w[1].score.combined);
            if w[0].score.combined == w[1].score.combined {
                prop_assert!(idx_of(&w[0]) < idx_of(&w[1]));
            }
        }
    }
}
