//! reelgraph CLI - graph random-walk movie recommendations from the
//! command line.
//!
//! # Usage
//!
//! ```bash
//! # Graph statistics over a MovieLens directory
//! reelgraph stats --data data/ml-latest-small
//!
//! # Top-10 recommendations for a user
//! reelgraph recommend --data data/ml-latest-small --user 1
//!
//! # Movies similar to a movie
//! reelgraph similar --data data/ml-latest-small --movie 318 -k 5
//!
//! # Offline evaluation with a last-item holdout split
//! reelgraph eval --data data/ml-latest-small --k 10 --num-walks 2000
//!
//! # Machine-readable report
//! reelgraph eval --data data/ml-latest-small --json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::ProgressBar;
use reelgraph_core::formats::csv::{read_movies_file, read_ratings_file, Loaded};
use reelgraph_core::{
    evaluate_with_progress, recommend_for_user, similar_movies, EvalConfig, InteractionGraph,
    Movie, Rating, RecommendConfig, Scored, SplitMode, WeightConfig,
    DEFAULT_RESTART_PROB_SIMILAR, DEFAULT_RESTART_PROB_USER,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "reelgraph")]
#[command(about = "Random-walk movie recommender", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show statistics about the interaction graph
    Stats {
        /// Directory containing ratings.csv and movies.csv
        #[arg(long, default_value = "data/ml-latest-small")]
        data: PathBuf,

        /// Minimum rating for an edge
        #[arg(long, default_value = "3.0")]
        min_rating: f64,
    },

    /// Recommend movies for a user
    Recommend {
        /// Directory containing ratings.csv and movies.csv
        #[arg(long, default_value = "data/ml-latest-small")]
        data: PathBuf,

        /// User id to recommend for
        #[arg(long)]
        user: u32,

        /// Number of recommendations
        #[arg(short, default_value = "10")]
        k: usize,

        /// Number of walk trials
        #[arg(long, default_value = "1000")]
        num_walks: usize,

        /// Maximum steps per trial
        #[arg(long, default_value = "10")]
        walk_length: usize,

        /// Per-step restart probability
        #[arg(long, default_value_t = DEFAULT_RESTART_PROB_USER)]
        restart_prob: f64,

        /// Minimum rating for an edge
        #[arg(long, default_value = "3.0")]
        min_rating: f64,

        /// Also rank movies the user already rated
        #[arg(long)]
        include_rated: bool,

        /// Random seed (omit for a fresh one)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Find movies similar to a movie
    Similar {
        /// Directory containing ratings.csv and movies.csv
        #[arg(long, default_value = "data/ml-latest-small")]
        data: PathBuf,

        /// Seed movie id
        #[arg(long)]
        movie: u32,

        /// Number of results
        #[arg(short, default_value = "10")]
        k: usize,

        /// Number of walk trials
        #[arg(long, default_value = "1000")]
        num_walks: usize,

        /// Maximum steps per trial
        #[arg(long, default_value = "10")]
        walk_length: usize,

        /// Per-step restart probability
        #[arg(long, default_value_t = DEFAULT_RESTART_PROB_SIMILAR)]
        restart_prob: f64,

        /// Minimum rating for an edge
        #[arg(long, default_value = "3.0")]
        min_rating: f64,

        /// Random seed (omit for a fresh one)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Offline evaluation with a train/test split
    Eval {
        /// Directory containing ratings.csv and movies.csv
        #[arg(long, default_value = "data/ml-latest-small")]
        data: PathBuf,

        /// Top-K for recommendations and metrics
        #[arg(long, default_value = "10")]
        k: usize,

        /// Number of walk trials per user
        #[arg(long, default_value = "1000")]
        num_walks: usize,

        /// Maximum steps per trial
        #[arg(long, default_value = "10")]
        walk_length: usize,

        /// Per-step restart probability
        #[arg(long, default_value_t = DEFAULT_RESTART_PROB_USER)]
        restart_prob: f64,

        /// Minimum rating for an edge
        #[arg(long, default_value = "3.0")]
        min_rating: f64,

        /// Train/test split mode
        #[arg(long, default_value = "last")]
        split: SplitArg,

        /// Held-out ratings per user (split=last)
        #[arg(long, default_value = "1")]
        holdout: usize,

        /// Held-out fraction per user (split=random)
        #[arg(long, default_value = "0.2")]
        test_frac: f64,

        /// Seed for the split sampler and walks
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Emit the report as JSON instead of the human rendering
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SplitArg {
    /// Hold out each user's most recent ratings
    Last,
    /// Hold out a random fraction of each user's ratings
    Random,
}

impl From<SplitArg> for SplitMode {
    fn from(arg: SplitArg) -> Self {
        match arg {
            SplitArg::Last => Self::Last,
            SplitArg::Random => Self::Random,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { data, min_rating } => cmd_stats(&data, min_rating),
        Commands::Recommend {
            data,
            user,
            k,
            num_walks,
            walk_length,
            restart_prob,
            min_rating,
            include_rated,
            seed,
        } => {
            let config = RecommendConfig {
                k,
                num_walks,
                walk_length,
                restart_prob,
                exclude_rated: !include_rated,
                seed,
            };
            cmd_recommend(&data, user, min_rating, &config)
        }
        Commands::Similar {
            data,
            movie,
            k,
            num_walks,
            walk_length,
            restart_prob,
            min_rating,
            seed,
        } => {
            let config = RecommendConfig {
                k,
                num_walks,
                walk_length,
                restart_prob,
                seed,
                ..RecommendConfig::for_similar()
            };
            cmd_similar(&data, movie, min_rating, &config)
        }
        Commands::Eval {
            data,
            k,
            num_walks,
            walk_length,
            restart_prob,
            min_rating,
            split,
            holdout,
            test_frac,
            seed,
            json,
        } => {
            let config = EvalConfig {
                k,
                num_walks,
                walk_length,
                restart_prob,
                weights: WeightConfig {
                    min_user_rating: min_rating,
                    ..WeightConfig::default()
                },
                split: split.into(),
                holdout,
                test_frac,
                seed,
            };
            cmd_eval(&data, &config, json)
        }
    }
}

/// Load ratings.csv and movies.csv from a MovieLens directory.
fn load_dataset(data: &Path) -> Result<(Vec<Rating>, Vec<Movie>)> {
    let ratings_path = data.join("ratings.csv");
    let movies_path = data.join("movies.csv");

    let ratings: Loaded<Rating> = read_ratings_file(&ratings_path)
        .with_context(|| format!("failed to read {}", ratings_path.display()))?;
    let movies: Loaded<Movie> = read_movies_file(&movies_path)
        .with_context(|| format!("failed to read {}", movies_path.display()))?;

    println!(
        "Loaded {} ratings ({} skipped), {} movies ({} skipped)",
        ratings.records.len(),
        ratings.skipped,
        movies.records.len(),
        movies.skipped
    );
    Ok((ratings.records, movies.records))
}

fn build_graph(data: &Path, min_rating: f64) -> Result<(InteractionGraph, Vec<Movie>)> {
    let (ratings, movies) = load_dataset(data)?;
    let config = WeightConfig {
        min_user_rating: min_rating,
        ..WeightConfig::default()
    };
    let start = Instant::now();
    let graph = InteractionGraph::build(&ratings, &movies, &config);
    println!("Graph built in {:.2?}", start.elapsed());
    Ok((graph, movies))
}

fn cmd_stats(data: &Path, min_rating: f64) -> Result<()> {
    let (graph, _) = build_graph(data, min_rating)?;
    let stats = graph.stats();

    println!();
    println!("Users:   {}", stats.user_count);
    println!("Movies:  {}", stats.movie_count);
    println!("Genres:  {}", stats.genre_count);
    println!("Edges:   {}", stats.edge_count);
    println!("Catalog: {}", graph.catalog_size());
    Ok(())
}

fn cmd_recommend(data: &Path, user: u32, min_rating: f64, config: &RecommendConfig) -> Result<()> {
    let (graph, movies) = build_graph(data, min_rating)?;

    let start = Instant::now();
    let recs = recommend_for_user(&graph, user, config);
    println!("Walked in {:.2?}", start.elapsed());

    if recs.is_empty() {
        println!("No recommendations for user {user} (no ratings above the threshold?)");
        return Ok(());
    }
    println!();
    println!("Top {} for user {user}:", recs.len());
    print_scored(&recs, &movies);
    Ok(())
}

fn cmd_similar(data: &Path, movie: u32, min_rating: f64, config: &RecommendConfig) -> Result<()> {
    let (graph, movies) = build_graph(data, min_rating)?;

    let title = title_of(movie, &movies).unwrap_or("unknown title");
    let recs = similar_movies(&graph, movie, config);

    if recs.is_empty() {
        println!("No similar movies for {movie} ({title})");
        return Ok(());
    }
    println!();
    println!("Movies similar to {movie} ({title}):");
    print_scored(&recs, &movies);
    Ok(())
}

fn cmd_eval(data: &Path, config: &EvalConfig, json: bool) -> Result<()> {
    let (ratings, movies) = load_dataset(data)?;

    let bar = ProgressBar::new(0);
    let start = Instant::now();
    let report = evaluate_with_progress(&ratings, &movies, config, |done, total| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    })?;
    bar.finish_and_clear();
    println!("Evaluated in {:.2?}", start.elapsed());
    println!();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn print_scored(recs: &[Scored], movies: &[Movie]) {
    let titles: HashMap<u32, &str> = movies
        .iter()
        .map(|m| (m.movie_id, m.title.as_str()))
        .collect();
    for (rank, rec) in recs.iter().enumerate() {
        let title = titles.get(&rec.movie_id).copied().unwrap_or("unknown title");
        println!(
            "{:>3}. {:<50} score {:.3}  (movie {})",
            rank + 1,
            title,
            rec.score,
            rec.movie_id
        );
    }
}

fn title_of(movie_id: u32, movies: &[Movie]) -> Option<&str> {
    movies
        .iter()
        .find(|m| m.movie_id == movie_id)
        .map(|m| m.title.as_str())
}
