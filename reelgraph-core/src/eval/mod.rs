//! Offline evaluation harness: SPLIT -> BUILD -> SCORE.
//!
//! Splits the rating history per user, rebuilds the interaction graph
//! from the train portion only, recommends for every user with held-out
//! ratings and aggregates ranking metrics into a [`MetricsReport`].
//!
//! No per-user condition aborts a run: cold-start users contribute
//! zeros, users with empty test sets are counted separately. The only
//! fatal condition is an invalid configuration, rejected before any
//! graph work starts.

pub mod metrics;
pub mod split;

use crate::error::{Error, Result};
use crate::graph::{InteractionGraph, WeightConfig};
use crate::model::{Movie, Rating};
use crate::recommend::{recommend_for_user, RecommendConfig, DEFAULT_RESTART_PROB_USER};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

pub use metrics::{average_precision_at_k, hit_at_k, ndcg_at_k, precision_at_k, recall_at_k};
pub use split::{split_per_user, EvaluationSplit, SplitMode};

/// Configuration for one evaluation run.
#[derive(Debug, Clone, Copy)]
pub struct EvalConfig {
    /// Top-K size for recommendations and metrics.
    pub k: usize,
    /// Walk trials per recommendation.
    pub num_walks: usize,
    /// Maximum steps per trial.
    pub walk_length: usize,
    /// Per-step restart probability.
    pub restart_prob: f64,
    /// Edge weighting, including the minimum rating threshold.
    pub weights: WeightConfig,
    /// Train/test split policy.
    pub split: SplitMode,
    /// Held-out ratings per user in `Last` mode.
    pub holdout: usize,
    /// Held-out fraction per user in `Random` mode.
    pub test_frac: f64,
    /// Seed for the split sampler and the per-user walks.
    pub seed: u64,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            k: 10,
            num_walks: 1000,
            walk_length: 10,
            restart_prob: DEFAULT_RESTART_PROB_USER,
            weights: WeightConfig::default(),
            split: SplitMode::Last,
            holdout: 1,
            test_frac: 0.2,
            seed: 42,
        }
    }
}

impl EvalConfig {
    /// Reject invalid hyperparameters before any computation starts.
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Error {
            Error::InvalidConfig {
                field,
                reason: reason.into(),
            }
        }

        if self.k == 0 {
            return Err(invalid("k", "must be at least 1"));
        }
        if self.num_walks == 0 {
            return Err(invalid("num_walks", "must be at least 1"));
        }
        if self.walk_length == 0 {
            return Err(invalid("walk_length", "must be at least 1"));
        }
        if !(0.0..1.0).contains(&self.restart_prob) {
            return Err(invalid(
                "restart_prob",
                format!("{} is outside [0, 1)", self.restart_prob),
            ));
        }
        match self.split {
            SplitMode::Last if self.holdout == 0 => {
                Err(invalid("holdout", "must be at least 1"))
            }
            SplitMode::Random if self.test_frac <= 0.0 || self.test_frac >= 1.0 => Err(invalid(
                "test_frac",
                format!("{} is outside (0, 1)", self.test_frac),
            )),
            _ => Ok(()),
        }
    }
}

/// Aggregated result of one evaluation run, with the configuration that
/// produced it. Immutable once returned.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    /// Top-K size.
    pub k: usize,
    /// Walk trials per recommendation.
    pub num_walks: usize,
    /// Maximum steps per trial.
    pub walk_length: usize,
    /// Per-step restart probability.
    pub restart_prob: f64,
    /// Minimum rating threshold used for edge creation.
    pub min_user_rating: f64,
    /// Split policy.
    pub split: SplitMode,
    /// Holdout count (`Last` mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holdout: Option<usize>,
    /// Test fraction (`Random` mode only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_frac: Option<f64>,

    /// Users scored (nonempty test set), including those that received
    /// zero recommendations.
    pub users_evaluated: usize,
    /// Users that received at least one recommendation.
    pub users_with_recs: usize,
    /// Users with too few ratings to split.
    pub users_skipped_split: usize,
    /// Users whose test set came out empty after the split.
    pub users_empty_test: usize,

    /// Mean Precision@K.
    pub precision_at_k: f64,
    /// Mean Recall@K.
    pub recall_at_k: f64,
    /// Mean Average Precision@K.
    pub map_at_k: f64,
    /// Mean NDCG@K.
    pub ndcg_at_k: f64,
    /// Fraction of users with at least one hit.
    pub hit_rate_at_k: f64,
    /// Distinct recommended movies over the full catalog.
    pub coverage: f64,
    /// Distinct movies recommended across all users.
    pub unique_movies_recommended: usize,
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  top-k:            {}", self.k)?;
        writeln!(f, "  num walks:        {}", self.num_walks)?;
        writeln!(f, "  walk length:      {}", self.walk_length)?;
        writeln!(f, "  restart prob:     {}", self.restart_prob)?;
        writeln!(f, "  min user rating:  {}", self.min_user_rating)?;
        writeln!(f, "  split mode:       {}", self.split)?;
        if let Some(holdout) = self.holdout {
            writeln!(f, "  holdout:          {holdout}")?;
        }
        if let Some(test_frac) = self.test_frac {
            writeln!(f, "  test fraction:    {test_frac}")?;
        }
        writeln!(f)?;
        writeln!(f, "Counts:")?;
        writeln!(f, "  users evaluated:  {}", self.users_evaluated)?;
        writeln!(f, "  users with recs:  {}", self.users_with_recs)?;
        writeln!(f, "  skipped at split: {}", self.users_skipped_split)?;
        writeln!(f, "  empty test sets:  {}", self.users_empty_test)?;
        writeln!(f)?;
        writeln!(f, "Ranking metrics:")?;
        writeln!(f, "  Precision@{:<3}     {:.4}", self.k, self.precision_at_k)?;
        writeln!(f, "  Recall@{:<3}        {:.4}", self.k, self.recall_at_k)?;
        writeln!(f, "  MAP@{:<3}           {:.4}", self.k, self.map_at_k)?;
        writeln!(f, "  NDCG@{:<3}          {:.4}", self.k, self.ndcg_at_k)?;
        writeln!(f, "  HitRate@{:<3}       {:.4}", self.k, self.hit_rate_at_k)?;
        writeln!(f, "  Coverage          {:.4}", self.coverage)?;
        write!(
            f,
            "  unique movies recommended: {}",
            self.unique_movies_recommended
        )
    }
}

/// Run a full evaluation: split, build the graph from train ratings,
/// score every user with held-out ratings.
///
/// Fails fast on an invalid configuration; every per-user condition
/// degrades gracefully instead.
pub fn evaluate(ratings: &[Rating], movies: &[Movie], config: &EvalConfig) -> Result<MetricsReport> {
    evaluate_with_progress(ratings, movies, config, |_, _| {})
}

/// [`evaluate`] with a progress callback, invoked as
/// `(users_done, users_total)` after each scored user.
pub fn evaluate_with_progress(
    ratings: &[Rating],
    movies: &[Movie],
    config: &EvalConfig,
    mut progress: impl FnMut(usize, usize),
) -> Result<MetricsReport> {
    config.validate()?;

    // SPLIT
    let split = split_per_user(
        ratings,
        config.split,
        config.holdout,
        config.test_frac,
        config.seed,
    );

    // BUILD: train ratings only.
    let graph = InteractionGraph::build(&split.train, movies, &config.weights);

    // SCORE
    let mut relevant_by_user: BTreeMap<u32, HashSet<u32>> = BTreeMap::new();
    for r in &split.test {
        relevant_by_user.entry(r.user_id).or_default().insert(r.movie_id);
    }

    let users_empty_test = relevant_by_user.values().filter(|rel| rel.is_empty()).count();
    relevant_by_user.retain(|_, rel| !rel.is_empty());

    let total = relevant_by_user.len();
    let mut sums = MetricSums::default();
    let mut all_recommended: BTreeSet<u32> = BTreeSet::new();
    let mut users_with_recs = 0;

    for (done, (&user_id, relevant)) in relevant_by_user.iter().enumerate() {
        let rec_config = RecommendConfig {
            k: config.k,
            num_walks: config.num_walks,
            walk_length: config.walk_length,
            restart_prob: config.restart_prob,
            exclude_rated: true,
            // Per-user offset keeps users independent while the whole
            // run stays reproducible.
            seed: Some(config.seed.wrapping_add(u64::from(user_id))),
        };
        let recs = recommend_for_user(&graph, user_id, &rec_config);
        let rec_ids: Vec<u32> = recs.iter().map(|s| s.movie_id).collect();

        if !rec_ids.is_empty() {
            users_with_recs += 1;
            all_recommended.extend(&rec_ids);
        }

        sums.precision += precision_at_k(&rec_ids, relevant, config.k);
        sums.recall += recall_at_k(&rec_ids, relevant, config.k);
        sums.ap += average_precision_at_k(&rec_ids, relevant, config.k);
        sums.ndcg += ndcg_at_k(&rec_ids, relevant, config.k);
        if hit_at_k(&rec_ids, relevant, config.k) {
            sums.hits += 1;
        }

        progress(done + 1, total);
    }

    let users_evaluated = total;
    let mean = |sum: f64| {
        if users_evaluated == 0 {
            0.0
        } else {
            sum / users_evaluated as f64
        }
    };
    let catalog = graph.catalog_size();

    Ok(MetricsReport {
        k: config.k,
        num_walks: config.num_walks,
        walk_length: config.walk_length,
        restart_prob: config.restart_prob,
        min_user_rating: config.weights.min_user_rating,
        split: config.split,
        holdout: matches!(config.split, SplitMode::Last).then_some(config.holdout),
        test_frac: matches!(config.split, SplitMode::Random).then_some(config.test_frac),
        users_evaluated,
        users_with_recs,
        users_skipped_split: split.users_skipped,
        users_empty_test,
        precision_at_k: mean(sums.precision),
        recall_at_k: mean(sums.recall),
        map_at_k: mean(sums.ap),
        ndcg_at_k: mean(sums.ndcg),
        hit_rate_at_k: mean(f64::from(sums.hits)),
        coverage: if catalog == 0 {
            0.0
        } else {
            all_recommended.len() as f64 / catalog as f64
        },
        unique_movies_recommended: all_recommended.len(),
    })
}

#[derive(Default)]
struct MetricSums {
    precision: f64,
    recall: f64,
    ap: f64,
    ndcg: f64,
    hits: u32,
}
