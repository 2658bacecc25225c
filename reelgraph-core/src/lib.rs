//! `reelgraph-core` models users, movies and genres as a weighted graph
//! and ranks movies for a user by running many random walks with
//! restart from the user's node, counting how often each movie is
//! visited (approximate personalized PageRank).
//!
//! # Example
//!
//! ```rust
//! use reelgraph_core::{
//!     recommend_for_user, InteractionGraph, Movie, Rating, RecommendConfig, WeightConfig,
//! };
//!
//! let ratings = vec![
//!     Rating { user_id: 1, movie_id: 10, rating: 5.0, timestamp: 100 },
//!     Rating { user_id: 2, movie_id: 10, rating: 4.5, timestamp: 200 },
//!     Rating { user_id: 2, movie_id: 20, rating: 5.0, timestamp: 300 },
//! ];
//! let movies = vec![
//!     Movie { movie_id: 10, title: "Heat (1995)".into(), genres: vec!["Action".into()] },
//!     Movie { movie_id: 20, title: "Casino (1995)".into(), genres: vec!["Crime".into()] },
//! ];
//!
//! let graph = InteractionGraph::build(&ratings, &movies, &WeightConfig::default());
//! let config = RecommendConfig { seed: Some(42), ..RecommendConfig::default() };
//!
//! // User 1 never rated movie 20, but user 2 links them.
//! let recs = recommend_for_user(&graph, 1, &config);
//! assert_eq!(recs[0].movie_id, 20);
//! ```
//!
//! The [`eval`] module adds the offline train/test harness: split the
//! history per user, rebuild the graph from train only, score top-K
//! recommendations against the held-out ratings (precision, recall,
//! MAP, NDCG, hit rate, coverage).

pub mod algo;
pub mod error;
pub mod eval;
pub mod formats;
pub mod graph;
pub mod model;
pub mod recommend;

pub use algo::walk::{walk, WalkConfig, WalkResult};
pub use error::{Error, Result};
pub use eval::{evaluate, evaluate_with_progress, EvalConfig, MetricsReport, SplitMode};
pub use graph::{GraphStats, InteractionGraph, WeightConfig};
pub use model::{Movie, Node, Rating, Scored};
pub use recommend::{
    recommend_for_user, similar_movies, RecommendConfig, DEFAULT_RESTART_PROB_SIMILAR,
    DEFAULT_RESTART_PROB_USER,
};
