//! Recommendation queries over the interaction graph.
//!
//! Thin orchestration over [`crate::algo::walk`]: seed the walk at a
//! user or movie node, drop excluded movies from the visitation counts,
//! rank by count and truncate to top-K. The graph stays read-only
//! throughout.

use crate::algo::walk::{walk, WalkConfig, WalkResult};
use crate::graph::InteractionGraph;
use crate::model::{Node, Scored};
use std::collections::HashSet;

/// Default restart probability when seeding from a user node.
pub const DEFAULT_RESTART_PROB_USER: f64 = 0.15;

/// Default restart probability when seeding from a movie node.
/// Higher than the user default so similar-movie walks stay closer to
/// the seed movie's neighborhood.
pub const DEFAULT_RESTART_PROB_SIMILAR: f64 = 0.30;

/// Configuration for one recommendation request.
#[derive(Debug, Clone, Copy)]
pub struct RecommendConfig {
    /// Number of recommendations to return.
    pub k: usize,
    /// Number of walk trials.
    pub num_walks: usize,
    /// Maximum steps per trial.
    pub walk_length: usize,
    /// Per-step restart probability.
    pub restart_prob: f64,
    /// Drop movies the seed user already rated. Ignored by
    /// [`similar_movies`], which always excludes the seed movie only.
    pub exclude_rated: bool,
    /// Random seed; `None` for production variability.
    pub seed: Option<u64>,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            k: 10,
            num_walks: 1000,
            walk_length: 10,
            restart_prob: DEFAULT_RESTART_PROB_USER,
            exclude_rated: true,
            seed: None,
        }
    }
}

impl RecommendConfig {
    /// Defaults for similar-movie queries.
    #[must_use]
    pub fn for_similar() -> Self {
        Self {
            restart_prob: DEFAULT_RESTART_PROB_SIMILAR,
            ..Self::default()
        }
    }

    fn walk_config(&self) -> WalkConfig {
        WalkConfig {
            num_walks: self.num_walks,
            walk_length: self.walk_length,
            restart_prob: self.restart_prob,
            seed: self.seed,
        }
    }
}

/// Top-K movie recommendations for a user.
///
/// Walks from the user node and ranks movies by visitation count,
/// descending, with ascending movie id as the tie break so output is
/// deterministic under a fixed seed. With `exclude_rated` set, movies
/// the user already rated in the training data never appear.
///
/// A user absent from the graph (cold start) yields an empty list.
#[must_use]
pub fn recommend_for_user(
    graph: &InteractionGraph,
    user_id: u32,
    config: &RecommendConfig,
) -> Vec<Scored> {
    let result = walk(graph, Node::User(user_id), &config.walk_config());
    let exclude = if config.exclude_rated {
        graph.rated_movies(user_id)
    } else {
        HashSet::new()
    };
    rank(&result, &exclude, config.k, config.num_walks)
}

/// Top-K movies similar to a movie, by walk proximity.
///
/// Same mechanics as [`recommend_for_user`] but seeded at the movie
/// node; the seed movie itself is always excluded.
#[must_use]
pub fn similar_movies(
    graph: &InteractionGraph,
    movie_id: u32,
    config: &RecommendConfig,
) -> Vec<Scored> {
    let result = walk(graph, Node::Movie(movie_id), &config.walk_config());
    let exclude = HashSet::from([movie_id]);
    rank(&result, &exclude, config.k, config.num_walks)
}

/// Order visitation counts into a recommendation list.
fn rank(result: &WalkResult, exclude: &HashSet<u32>, k: usize, num_walks: usize) -> Vec<Scored> {
    let mut ranked: Vec<(u32, u64)> = result
        .iter()
        .filter(|(movie_id, _)| !exclude.contains(movie_id))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(k);
    ranked
        .into_iter()
        .map(|(movie_id, count)| Scored {
            movie_id,
            score: count as f64 / num_walks.max(1) as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WeightConfig;
    use crate::model::{Movie, Rating};

    fn fixture() -> InteractionGraph {
        let ratings = vec![
            Rating { user_id: 1, movie_id: 10, rating: 5.0, timestamp: 0 },
            Rating { user_id: 1, movie_id: 20, rating: 4.0, timestamp: 1 },
            Rating { user_id: 2, movie_id: 10, rating: 4.5, timestamp: 2 },
            Rating { user_id: 2, movie_id: 30, rating: 5.0, timestamp: 3 },
            Rating { user_id: 3, movie_id: 20, rating: 4.0, timestamp: 4 },
            Rating { user_id: 3, movie_id: 30, rating: 4.5, timestamp: 5 },
        ];
        let movies = vec![
            Movie { movie_id: 10, title: "A".into(), genres: vec!["Action".into()] },
            Movie { movie_id: 20, title: "B".into(), genres: vec!["Action".into()] },
            Movie { movie_id: 30, title: "C".into(), genres: vec!["Drama".into()] },
        ];
        InteractionGraph::build(&ratings, &movies, &WeightConfig::default())
    }

    fn seeded(k: usize) -> RecommendConfig {
        RecommendConfig {
            k,
            num_walks: 1000,
            seed: Some(42),
            ..RecommendConfig::default()
        }
    }

    #[test]
    fn test_excludes_rated_movies() {
        let graph = fixture();
        let recs = recommend_for_user(&graph, 1, &seeded(10));
        for rec in &recs {
            assert!(![10, 20].contains(&rec.movie_id), "got rated movie {}", rec.movie_id);
        }
        // Movie 30 is the only unrated candidate.
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].movie_id, 30);
    }

    #[test]
    fn test_include_rated_when_disabled() {
        let graph = fixture();
        let config = RecommendConfig {
            exclude_rated: false,
            ..seeded(10)
        };
        let recs = recommend_for_user(&graph, 1, &config);
        assert!(recs.iter().any(|r| r.movie_id == 10));
    }

    #[test]
    fn test_truncates_to_k() {
        let graph = fixture();
        let config = RecommendConfig {
            exclude_rated: false,
            ..seeded(2)
        };
        let recs = recommend_for_user(&graph, 1, &config);
        assert_eq!(recs.len(), 2);
    }

    #[test]
    fn test_scores_descending() {
        let graph = fixture();
        let config = RecommendConfig {
            exclude_rated: false,
            ..seeded(10)
        };
        let recs = recommend_for_user(&graph, 1, &config);
        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_cold_start_user_is_empty() {
        let graph = fixture();
        let recs = recommend_for_user(&graph, 999, &seeded(10));
        assert!(recs.is_empty());
    }

    #[test]
    fn test_similar_excludes_seed() {
        let graph = fixture();
        let config = RecommendConfig {
            seed: Some(42),
            ..RecommendConfig::for_similar()
        };
        let recs = similar_movies(&graph, 10, &config);
        assert!(!recs.is_empty());
        assert!(recs.iter().all(|r| r.movie_id != 10));
    }

    #[test]
    fn test_deterministic_under_seed() {
        let graph = fixture();
        let r1 = recommend_for_user(&graph, 1, &seeded(10));
        let r2 = recommend_for_user(&graph, 1, &seeded(10));
        assert_eq!(r1, r2);
    }
}
