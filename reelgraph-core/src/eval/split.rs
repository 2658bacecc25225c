//! Per-user train/test partition of rating histories.

use crate::model::Rating;
use rand::prelude::*;
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How the held-out test set is chosen per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// The most recent ratings (by timestamp) move to test.
    Last,
    /// A uniform fraction of each user's ratings moves to test.
    Random,
}

impl std::fmt::Display for SplitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Last => write!(f, "last"),
            Self::Random => write!(f, "random"),
        }
    }
}

/// Disjoint train/test partition of the input ratings.
#[derive(Debug, Clone, Default)]
pub struct EvaluationSplit {
    /// Ratings visible to graph construction.
    pub train: Vec<Rating>,
    /// Held-out ground truth, never visible to graph construction.
    pub test: Vec<Rating>,
    /// Users with too few ratings to populate both sets; their ratings
    /// all went to train.
    pub users_skipped: usize,
}

/// Partition each user's ratings into train and test.
///
/// Per user, ratings are ordered by timestamp (movie id as tie break
/// for stability). `Last` mode holds out the `holdout` most recent;
/// `Random` mode samples `max(1, ceil(n * test_frac))` uniformly
/// without replacement. Either way at least one rating stays in train;
/// users that cannot populate both sets are skipped (all ratings to
/// train, counted in `users_skipped`).
///
/// Invariant: per user, train and test are disjoint and their union is
/// the user's full history.
#[must_use]
pub fn split_per_user(
    ratings: &[Rating],
    mode: SplitMode,
    holdout: usize,
    test_frac: f64,
    seed: u64,
) -> EvaluationSplit {
    // BTreeMap so user order, and therefore RNG consumption, is
    // deterministic regardless of input order.
    let mut by_user: BTreeMap<u32, Vec<Rating>> = BTreeMap::new();
    for r in ratings {
        by_user.entry(r.user_id).or_default().push(*r);
    }

    let mut rng = XorShiftRng::seed_from_u64(seed);
    let mut split = EvaluationSplit::default();

    for (_, mut history) in by_user {
        history.sort_by_key(|r| (r.timestamp, r.movie_id));
        let n = history.len();

        let held_out = match mode {
            SplitMode::Last => holdout,
            SplitMode::Random => (n as f64 * test_frac).ceil().max(1.0) as usize,
        };

        if n <= held_out.max(1) {
            split.users_skipped += 1;
            split.train.extend(history);
            continue;
        }

        match mode {
            SplitMode::Last => {
                let cut = n - held_out;
                split.test.extend(history.split_off(cut));
                split.train.extend(history);
            }
            SplitMode::Random => {
                let chosen = rand::seq::index::sample(&mut rng, n, held_out);
                let mut in_test = vec![false; n];
                for idx in chosen {
                    in_test[idx] = true;
                }
                for (r, to_test) in history.into_iter().zip(in_test) {
                    if to_test {
                        split.test.push(r);
                    } else {
                        split.train.push(r);
                    }
                }
            }
        }
    }

    split
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(user: u32, movie: u32, ts: i64) -> Rating {
        Rating {
            user_id: user,
            movie_id: movie,
            rating: 4.0,
            timestamp: ts,
        }
    }

    #[test]
    fn test_last_holds_out_most_recent() {
        let ratings = vec![
            rating(1, 10, 100),
            rating(1, 20, 200),
            rating(1, 30, 300),
        ];
        let split = split_per_user(&ratings, SplitMode::Last, 1, 0.2, 42);

        assert_eq!(split.test.len(), 1);
        assert_eq!(split.test[0].movie_id, 30);
        assert_eq!(split.train.len(), 2);
        assert_eq!(split.users_skipped, 0);
    }

    #[test]
    fn test_last_multiple_holdout() {
        let ratings = vec![
            rating(1, 10, 100),
            rating(1, 20, 200),
            rating(1, 30, 300),
            rating(1, 40, 400),
        ];
        let split = split_per_user(&ratings, SplitMode::Last, 2, 0.2, 42);

        let test_movies: Vec<u32> = split.test.iter().map(|r| r.movie_id).collect();
        assert_eq!(test_movies, vec![30, 40]);
        assert_eq!(split.train.len(), 2);
    }

    #[test]
    fn test_insufficient_history_skipped() {
        let ratings = vec![rating(1, 10, 100), rating(2, 20, 100), rating(2, 30, 200)];
        let split = split_per_user(&ratings, SplitMode::Last, 2, 0.2, 42);

        // User 1 has 1 rating, user 2 has 2 but holdout=2 would empty train.
        assert_eq!(split.users_skipped, 2);
        assert_eq!(split.test.len(), 0);
        assert_eq!(split.train.len(), 3);
    }

    #[test]
    fn test_random_fraction() {
        let ratings: Vec<Rating> = (0..10).map(|i| rating(1, i, i64::from(i))).collect();
        let split = split_per_user(&ratings, SplitMode::Random, 1, 0.2, 42);

        // ceil(10 * 0.2) = 2 held out.
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn test_disjoint_and_complete() {
        let ratings: Vec<Rating> = (0..20)
            .map(|i| rating(1 + i % 3, 100 + i, i64::from(i)))
            .collect();
        for mode in [SplitMode::Last, SplitMode::Random] {
            let split = split_per_user(&ratings, mode, 1, 0.3, 7);

            assert_eq!(split.train.len() + split.test.len(), ratings.len());
            for t in &split.test {
                assert!(
                    !split
                        .train
                        .iter()
                        .any(|r| r.user_id == t.user_id && r.movie_id == t.movie_id),
                    "movie {} in both sets for user {}",
                    t.movie_id,
                    t.user_id
                );
            }
        }
    }

    #[test]
    fn test_random_deterministic_per_seed() {
        let ratings: Vec<Rating> = (0..30).map(|i| rating(1 + i % 5, i, i64::from(i))).collect();
        let s1 = split_per_user(&ratings, SplitMode::Random, 1, 0.25, 42);
        let s2 = split_per_user(&ratings, SplitMode::Random, 1, 0.25, 42);
        let ids = |s: &EvaluationSplit| {
            s.test
                .iter()
                .map(|r| (r.user_id, r.movie_id))
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&s1), ids(&s2));
    }
}
