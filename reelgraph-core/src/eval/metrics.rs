//! Ranking-quality metrics over a recommendation list and a relevant set.
//!
//! All functions are pure and per-user; the evaluator averages them
//! across users. Binary relevance throughout: an item either is in the
//! user's held-out test set or it is not.

use std::collections::HashSet;

/// Precision@K: fraction of the top-K that is relevant.
#[must_use]
pub fn precision_at_k(recommended: &[u32], relevant: &HashSet<u32>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = hits_at_k(recommended, relevant, k);
    hits as f64 / k as f64
}

/// Recall@K: fraction of the relevant set found in the top-K.
#[must_use]
pub fn recall_at_k(recommended: &[u32], relevant: &HashSet<u32>, k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let hits = hits_at_k(recommended, relevant, k);
    hits as f64 / relevant.len() as f64
}

/// Average Precision@K for one user.
///
/// Mean over hit ranks r of (cumulative hits up to r) / r, normalized
/// by `min(|relevant|, k)` so a perfect ranking scores 1.
#[must_use]
pub fn average_precision_at_k(recommended: &[u32], relevant: &HashSet<u32>, k: usize) -> f64 {
    if relevant.is_empty() || k == 0 {
        return 0.0;
    }
    let mut hits = 0u32;
    let mut score = 0.0;
    for (rank, item) in recommended.iter().take(k).enumerate() {
        if relevant.contains(item) {
            hits += 1;
            score += f64::from(hits) / (rank + 1) as f64;
        }
    }
    score / relevant.len().min(k) as f64
}

/// NDCG@K with binary relevance and 1/log2(r+1) rank discount.
///
/// The ideal DCG places `min(|relevant|, k)` relevant items at the top.
#[must_use]
pub fn ndcg_at_k(recommended: &[u32], relevant: &HashSet<u32>, k: usize) -> f64 {
    let dcg: f64 = recommended
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, item)| relevant.contains(item))
        .map(|(rank, _)| discount(rank + 1))
        .sum();
    let ideal: f64 = (1..=relevant.len().min(k)).map(discount).sum();
    if ideal == 0.0 {
        0.0
    } else {
        dcg / ideal
    }
}

/// Whether the top-K contains at least one relevant item.
#[must_use]
pub fn hit_at_k(recommended: &[u32], relevant: &HashSet<u32>, k: usize) -> bool {
    recommended.iter().take(k).any(|item| relevant.contains(item))
}

fn hits_at_k(recommended: &[u32], relevant: &HashSet<u32>, k: usize) -> usize {
    recommended
        .iter()
        .take(k)
        .filter(|item| relevant.contains(item))
        .count()
}

fn discount(rank: usize) -> f64 {
    1.0 / ((rank + 1) as f64).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relevant(items: &[u32]) -> HashSet<u32> {
        items.iter().copied().collect()
    }

    #[test]
    fn test_precision() {
        let rel = relevant(&[2, 4]);
        assert!((precision_at_k(&[1, 2, 3], &rel, 3) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(precision_at_k(&[1, 3], &rel, 2), 0.0);
        assert_eq!(precision_at_k(&[2, 4], &rel, 2), 1.0);
    }

    #[test]
    fn test_recall() {
        let rel = relevant(&[2, 4]);
        assert!((recall_at_k(&[1, 2, 3], &rel, 3) - 0.5).abs() < 1e-12);
        assert_eq!(recall_at_k(&[2, 4, 6], &rel, 3), 1.0);
        assert_eq!(recall_at_k(&[2], &relevant(&[]), 1), 0.0);
    }

    #[test]
    fn test_average_precision() {
        let rel = relevant(&[2, 4]);
        // Hit at rank 2 only: (1/2) / min(2, 3) = 0.25.
        assert!((average_precision_at_k(&[1, 2, 3], &rel, 3) - 0.25).abs() < 1e-12);
        // Perfect ranking scores 1.
        assert!((average_precision_at_k(&[2, 4], &rel, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ndcg() {
        let rel = relevant(&[2, 4]);
        // Hit at rank 2: dcg = 1/log2(3); ideal = 1/log2(2) + 1/log2(3).
        let dcg = 1.0 / 3f64.log2();
        let ideal = 1.0 + 1.0 / 3f64.log2();
        let expected = dcg / ideal;
        assert!((ndcg_at_k(&[1, 2, 3], &rel, 3) - expected).abs() < 1e-12);
        // Perfect ranking scores 1.
        assert!((ndcg_at_k(&[2, 4, 1], &rel, 3) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ndcg_ideal_capped_at_k() {
        let rel = relevant(&[1, 2, 3, 4, 5]);
        // Only k=2 slots: ideal uses 2 items, so [1, 2] is perfect.
        assert!((ndcg_at_k(&[1, 2], &rel, 2) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hit() {
        let rel = relevant(&[7]);
        assert!(hit_at_k(&[1, 7], &rel, 2));
        assert!(!hit_at_k(&[1, 7], &rel, 1));
        assert!(!hit_at_k(&[], &rel, 5));
    }

    #[test]
    fn test_empty_recommendations_score_zero() {
        let rel = relevant(&[1, 2]);
        assert_eq!(precision_at_k(&[], &rel, 10), 0.0);
        assert_eq!(recall_at_k(&[], &rel, 10), 0.0);
        assert_eq!(average_precision_at_k(&[], &rel, 10), 0.0);
        assert_eq!(ndcg_at_k(&[], &rel, 10), 0.0);
    }
}
