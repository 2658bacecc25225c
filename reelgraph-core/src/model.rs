//! Core value types: node identity and input records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a graph node: kind plus id.
///
/// The walk itself only needs the identity; display metadata (titles,
/// genre names) is resolved by the caller.
///
/// # Example
///
/// ```rust
/// use reelgraph_core::Node;
///
/// let n = Node::Movie(318);
/// assert!(n.is_movie());
/// assert_eq!(n.to_string(), "M318");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Node {
    /// A user, keyed by their dataset user id.
    User(u32),
    /// A movie, keyed by its dataset movie id.
    Movie(u32),
    /// A genre, keyed by an interned genre id.
    Genre(u32),
}

impl Node {
    /// Whether this node is a movie node.
    #[must_use]
    pub const fn is_movie(self) -> bool {
        matches!(self, Self::Movie(_))
    }

    /// The raw id, without the kind tag.
    #[must_use]
    pub const fn id(self) -> u32 {
        match self {
            Self::User(id) | Self::Movie(id) | Self::Genre(id) => id,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "U{id}"),
            Self::Movie(id) => write!(f, "M{id}"),
            Self::Genre(id) => write!(f, "G{id}"),
        }
    }
}

/// One historical rating event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Rating user.
    pub user_id: u32,
    /// Rated movie.
    pub movie_id: u32,
    /// Rating value (MovieLens uses 0.5..=5.0).
    pub rating: f64,
    /// Unix timestamp of the rating event.
    pub timestamp: i64,
}

/// Movie metadata: title plus genre tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Dataset movie id.
    pub movie_id: u32,
    /// Display title.
    pub title: String,
    /// Genre names, already split from the delimited list. Empty for
    /// untagged movies.
    pub genres: Vec<String>,
}

/// One entry of a recommendation list.
///
/// `score` is monotonic in the walk visitation count (count divided by
/// the number of walks), so higher means more reachable from the seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    /// Recommended movie.
    pub movie_id: u32,
    /// Visitation frequency score.
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_display() {
        assert_eq!(Node::User(7).to_string(), "U7");
        assert_eq!(Node::Movie(318).to_string(), "M318");
        assert_eq!(Node::Genre(3).to_string(), "G3");
    }

    #[test]
    fn test_node_kind_checks() {
        assert!(Node::Movie(1).is_movie());
        assert!(!Node::User(1).is_movie());
        assert!(!Node::Genre(1).is_movie());
        assert_eq!(Node::User(42).id(), 42);
    }
}
