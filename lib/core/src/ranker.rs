//! Cosine ranking of a query against every document vector.
//!
//! Ordering is score descending with ties broken by ascending corpus
//! position, so identical inputs always produce identical output.

use crate::{DocumentMatrix, Error, Result, SparseVector};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredPosition {
    pub position: usize,
    pub score: f32,
}

#[inline]
fn by_score_then_position(a: &ScoredPosition, b: &ScoredPosition) -> Ordering {
    OrderedFloat(b.score)
        .cmp(&OrderedFloat(a.score))
        .then_with(|| a.position.cmp(&b.position))
}

/// Score `query` against every row of `matrix` and return at most `top_n`
/// hits. Rows are unit length, so the dot product is the cosine similarity.
///
/// There is no score floor: zero-similarity rows fill the tail when nothing
/// better exists.
pub fn rank(query: &SparseVector, matrix: &DocumentMatrix, top_n: usize) -> Result<Vec<ScoredPosition>> {
    if top_n == 0 || matrix.is_empty() {
        return Ok(Vec::new());
    }

    let mut scored: Vec<ScoredPosition> = matrix
        .rows()
        .par_iter()
        .enumerate()
        .map(|(position, row)| ScoredPosition {
            position,
            score: query.dot(row),
        })
        .collect();

    if let Some(bad) = scored.iter().find(|s| !s.score.is_finite()) {
        return Err(Error::computation(
            "rank",
            format!("non-finite similarity at position {}", bad.position),
        ));
    }

    if top_n < scored.len() {
        scored.select_nth_unstable_by(top_n - 1, by_score_then_position);
        scored.truncate(top_n);
    }
    scored.sort_unstable_by(by_score_then_position);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<(u32, f32)>>) -> DocumentMatrix {
        DocumentMatrix::new(
            rows.into_iter()
                .map(|r| SparseVector::new(r).normalized())
                .collect(),
        )
    }

    #[test]
    fn test_descending_scores() {
        let m = matrix(vec![
            vec![(0, 1.0)],
            vec![(0, 1.0), (1, 1.0)],
            vec![(1, 1.0)],
        ]);
        let q = SparseVector::new(vec![(0, 1.0)]);
        let ranked = rank(&q, &m, 10).unwrap();

        let positions: Vec<usize> = ranked.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert!((ranked[0].score - 1.0).abs() < 1e-6);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_broken_by_position() {
        let m = matrix(vec![
            vec![(1, 1.0)],
            vec![(0, 1.0)],
            vec![(2, 1.0)],
            vec![(0, 1.0)],
            vec![(3, 1.0)],
        ]);
        let q = SparseVector::new(vec![(0, 1.0)]);
        let ranked = rank(&q, &m, 10).unwrap();
        let positions: Vec<usize> = ranked.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_top_n_bounds() {
        let m = matrix((0..20u32).map(|i| vec![(i % 4, 1.0 + i as f32)]).collect());
        let q = SparseVector::new(vec![(1, 1.0), (2, 0.5)]).normalized();

        assert_eq!(rank(&q, &m, 5).unwrap().len(), 5);
        assert_eq!(rank(&q, &m, 20).unwrap().len(), 20);
        assert_eq!(rank(&q, &m, 100).unwrap().len(), 20);
        assert!(rank(&q, &m, 0).unwrap().is_empty());
    }

    #[test]
    fn test_truncated_prefix_matches_full_ranking() {
        let m = matrix((0..50u32).map(|i| vec![(i % 7, 1.0), (i % 3 + 7, 0.5)]).collect());
        let q = SparseVector::new(vec![(2, 1.0), (8, 1.0)]).normalized();

        let full = rank(&q, &m, 50).unwrap();
        for k in [1, 3, 10, 25] {
            assert_eq!(rank(&q, &m, k).unwrap(), full[..k].to_vec());
        }
    }

    #[test]
    fn test_zero_query_returns_all_in_position_order() {
        let m = matrix(vec![vec![(0, 1.0)], vec![(1, 1.0)]]);
        let ranked = rank(&SparseVector::zero(), &m, 10).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].position, 0);
        assert_eq!(ranked[1].position, 1);
        assert!(ranked.iter().all(|s| s.score == 0.0));
    }

    #[test]
    fn test_empty_matrix() {
        let q = SparseVector::new(vec![(0, 1.0)]);
        assert!(rank(&q, &DocumentMatrix::default(), 10).unwrap().is_empty());
    }

    #[test]
    fn test_non_finite_score_reported() {
        let m = DocumentMatrix::new(vec![SparseVector::new(vec![(0, f32::NAN)])]);
        let q = SparseVector::new(vec![(0, 1.0)]);
        let err = rank(&q, &m, 10).unwrap_err();
        assert!(matches!(err, Error::Computation { stage: "rank", .. }));
    }
}
