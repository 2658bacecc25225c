//! The interaction graph: users, movies and genres as weighted nodes.
//!
//! Built once from rating and movie records, then read-only for the
//! rest of the session. Each node stores its outgoing neighbors with
//! weights normalized to a categorical transition distribution, plus a
//! cumulative-weight array so a walk step is one uniform draw and a
//! binary search instead of a per-step renormalization.
//!
//! # Example
//!
//! ```rust
//! use reelgraph_core::{InteractionGraph, Movie, Node, Rating, WeightConfig};
//!
//! let ratings = vec![Rating { user_id: 1, movie_id: 10, rating: 4.5, timestamp: 0 }];
//! let movies = vec![Movie { movie_id: 10, title: "Heat (1995)".into(), genres: vec!["Action".into()] }];
//!
//! let graph = InteractionGraph::build(&ratings, &movies, &WeightConfig::default());
//! assert!(graph.node_index(Node::User(1)).is_some());
//! assert!(graph.node_index(Node::Movie(10)).is_some());
//! ```

use crate::model::{Movie, Node, Rating};
use rand::Rng;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Edge weighting configuration.
///
/// The rating-to-weight mapping and the movie-genre weighting are
/// tuning choices, kept configurable rather than hard-coded.
#[derive(Debug, Clone, Copy)]
pub struct WeightConfig {
    /// Ratings below this value create no edges at all.
    pub min_user_rating: f64,
    /// Constant weight for each movie-genre pair.
    pub genre_weight: f64,
    /// Divide the genre weight by the movie's genre count, so that
    /// broadly tagged movies do not pull walks toward genres harder
    /// than narrowly tagged ones.
    pub genre_specificity: bool,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            min_user_rating: 3.0,
            genre_weight: 1.0,
            genre_specificity: false,
        }
    }
}

/// Basic statistics about an interaction graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    /// Number of user nodes.
    pub user_count: usize,
    /// Number of movie nodes.
    pub movie_count: usize,
    /// Number of genre nodes.
    pub genre_count: usize,
    /// Number of directed edges.
    pub edge_count: usize,
}

/// Per-node adjacency: neighbors with normalized transition weights.
#[derive(Debug, Clone, Default)]
struct Adjacency {
    neighbors: Vec<usize>,
    /// Normalized weights, summing to 1 whenever `neighbors` is non-empty.
    weights: Vec<f64>,
    /// Prefix sums of `weights` for weighted sampling.
    cumulative: Vec<f64>,
}

/// Weighted graph over user, movie and genre nodes.
///
/// Immutable after [`InteractionGraph::build`]; concurrent reads need
/// no synchronization.
#[derive(Debug, Clone)]
pub struct InteractionGraph {
    nodes: Vec<Node>,
    index: HashMap<Node, usize>,
    adjacency: Vec<Adjacency>,
    /// Interned genre names, indexed by `Node::Genre` id.
    genres: Vec<String>,
    /// Every (user, movie) pair seen in the input ratings, including
    /// those below the rating threshold. Drives exclusion of
    /// already-rated movies during recommendation.
    rated: HashMap<u32, HashSet<u32>>,
    /// Distinct movies in the full catalog (for coverage accounting).
    catalog_size: usize,
}

impl InteractionGraph {
    /// Build the graph from rating and movie records.
    ///
    /// Ratings with `rating >= min_user_rating` become user<->movie
    /// edge pairs weighted by the rating value. Movies appearing in
    /// those ratings also get movie<->genre edge pairs with the
    /// configured constant weight. Both families are symmetric so the
    /// walk can traverse in either direction.
    ///
    /// Node insertion order does not affect the final weights. Genre
    /// ids are assigned by sorted genre name, so they are stable across
    /// input orderings too.
    #[must_use]
    pub fn build(ratings: &[Rating], movies: &[Movie], config: &WeightConfig) -> Self {
        let movie_table: HashMap<u32, &Movie> =
            movies.iter().map(|m| (m.movie_id, m)).collect();

        // Stable genre ids: sorted unique names over the catalog.
        let genre_names: BTreeSet<&str> = movies
            .iter()
            .flat_map(|m| m.genres.iter().map(String::as_str))
            .collect();
        let genres: Vec<String> = genre_names.into_iter().map(String::from).collect();
        let genre_ids: HashMap<String, u32> = genres
            .iter()
            .enumerate()
            .map(|(i, g)| (g.clone(), i as u32))
            .collect();

        let mut graph = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            adjacency: Vec::new(),
            genres,
            rated: HashMap::new(),
            catalog_size: movie_table.len(),
        };

        let mut raw: Vec<Vec<(usize, f64)>> = Vec::new();
        let mut tagged_movies: HashSet<u32> = HashSet::new();

        for r in ratings {
            graph
                .rated
                .entry(r.user_id)
                .or_default()
                .insert(r.movie_id);

            if r.rating < config.min_user_rating {
                continue;
            }

            let u = graph.intern(Node::User(r.user_id), &mut raw);
            let m = graph.intern(Node::Movie(r.movie_id), &mut raw);
            raw[u].push((m, r.rating));
            raw[m].push((u, r.rating));

            // Genre tags once per movie that survived the filter.
            if !tagged_movies.insert(r.movie_id) {
                continue;
            }
            let Some(movie) = movie_table.get(&r.movie_id) else {
                continue;
            };
            let tag_weight = if config.genre_specificity && !movie.genres.is_empty() {
                config.genre_weight / movie.genres.len() as f64
            } else {
                config.genre_weight
            };
            for genre in &movie.genres {
                let Some(&gid) = genre_ids.get(genre.as_str()) else {
                    continue;
                };
                let g = graph.intern(Node::Genre(gid), &mut raw);
                raw[m].push((g, tag_weight));
                raw[g].push((m, tag_weight));
            }
        }

        graph.adjacency = raw.into_iter().map(Adjacency::normalized).collect();
        graph
    }

    fn intern(&mut self, node: Node, raw: &mut Vec<Vec<(usize, f64)>>) -> usize {
        if let Some(&idx) = self.index.get(&node) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(node);
        self.index.insert(node, idx);
        raw.push(Vec::new());
        idx
    }

    /// Index of a node, or `None` if it never received an edge.
    ///
    /// A seed that resolves to `None` is a cold-start condition, not an
    /// error; callers short-circuit to an empty result.
    #[must_use]
    pub fn node_index(&self, node: Node) -> Option<usize> {
        self.index.get(&node).copied()
    }

    /// The node stored at `idx`.
    #[must_use]
    pub fn node(&self, idx: usize) -> Node {
        self.nodes[idx]
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Out-degree of the node at `idx`.
    #[must_use]
    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx].neighbors.len()
    }

    /// Neighbor indices of the node at `idx`.
    #[must_use]
    pub fn neighbors(&self, idx: usize) -> &[usize] {
        &self.adjacency[idx].neighbors
    }

    /// Normalized transition weights of the node at `idx`, aligned with
    /// [`InteractionGraph::neighbors`].
    #[must_use]
    pub fn transition_weights(&self, idx: usize) -> &[f64] {
        &self.adjacency[idx].weights
    }

    /// Sample a neighbor of `idx` from its transition distribution.
    ///
    /// Returns `None` for a dead end (no outgoing edges), which the
    /// walker treats as an implicit restart.
    pub fn sample_neighbor<R: Rng + ?Sized>(&self, idx: usize, rng: &mut R) -> Option<usize> {
        let adj = &self.adjacency[idx];
        if adj.neighbors.is_empty() {
            return None;
        }
        let r: f64 = rng.random();
        let pos = adj.cumulative.partition_point(|&c| c <= r);
        // Floating-point tails can push the last prefix sum below 1.0.
        Some(adj.neighbors[pos.min(adj.neighbors.len() - 1)])
    }

    /// Movies the user rated in the input data, regardless of the
    /// rating threshold. Empty set for unknown users.
    #[must_use]
    pub fn rated_movies(&self, user_id: u32) -> HashSet<u32> {
        self.rated.get(&user_id).cloned().unwrap_or_default()
    }

    /// Display name of an interned genre id.
    #[must_use]
    pub fn genre_name(&self, genre_id: u32) -> Option<&str> {
        self.genres.get(genre_id as usize).map(String::as_str)
    }

    /// Distinct movies in the full input catalog, rated or not.
    #[must_use]
    pub fn catalog_size(&self) -> usize {
        self.catalog_size
    }

    /// Node and edge counts.
    #[must_use]
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            user_count: 0,
            movie_count: 0,
            genre_count: 0,
            edge_count: 0,
        };
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::User(_) => stats.user_count += 1,
                Node::Movie(_) => stats.movie_count += 1,
                Node::Genre(_) => stats.genre_count += 1,
            }
            stats.edge_count += self.degree(idx);
        }
        stats
    }
}

impl Adjacency {
    /// Normalize accumulated raw weights into a categorical
    /// distribution with prefix sums.
    fn normalized(raw: Vec<(usize, f64)>) -> Self {
        let total: f64 = raw.iter().map(|(_, w)| w).sum();
        if raw.is_empty() || total <= 0.0 {
            return Self::default();
        }
        let mut adj = Self {
            neighbors: Vec::with_capacity(raw.len()),
            weights: Vec::with_capacity(raw.len()),
            cumulative: Vec::with_capacity(raw.len()),
        };
        let mut acc = 0.0;
        for (neighbor, weight) in raw {
            let w = weight / total;
            acc += w;
            adj.neighbors.push(neighbor);
            adj.weights.push(w);
            adj.cumulative.push(acc);
        }
        adj
    }
}
