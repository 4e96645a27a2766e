//! Linear-scan nearest neighbor, the O(n) reference for the kd-tree searches.

use crate::error::{KdTreeError, Result};
use crate::r#type::{IndexableFloat, Point};

/// Find the point in `points` closest to `query` by checking every point.
///
/// Ties are resolved in favor of the earliest point. Fails with
/// [`KdTreeError::InvalidInput`] if `points` is empty.
///
/// ```
/// use median_kdtree::{nearest_naive, Point};
///
/// let points = [(0., 0.), (10., 0.), (0., 10.), (10., 10.)].map(Point::from);
/// assert_eq!(nearest_naive(&points, (1., 1.)).unwrap(), Point::new(0., 0.));
/// ```
pub fn nearest_naive<N: IndexableFloat>(
    points: &[Point<N>],
    query: impl Into<Point<N>>,
) -> Result<Point<N>> {
    Ok(nearest_naive_with_distance(points, query)?.1)
}

/// Same as [`nearest_naive`], but also returns the squared distance to the found point.
pub fn nearest_naive_with_distance<N: IndexableFloat>(
    points: &[Point<N>],
    query: impl Into<Point<N>>,
) -> Result<(N, Point<N>)> {
    if points.is_empty() {
        return Err(KdTreeError::InvalidInput(
            "Cannot search an empty point set.".to_string(),
        ));
    }
    Ok(scan(points, &query.into()))
}

/// Linear scan over a non-empty slice.
pub(crate) fn scan<N: IndexableFloat>(points: &[Point<N>], query: &Point<N>) -> (N, Point<N>) {
    debug_assert!(!points.is_empty());

    let mut best_dist_sq = N::infinity();
    let mut best = points[0];
    for point in points {
        let dist_sq = point.distance_squared(query);
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            best = *point;
        }
    }
    (best_dist_sq, best)
}
