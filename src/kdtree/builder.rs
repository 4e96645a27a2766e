use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::error::{KdTreeError, Result};
use crate::kdtree::{KdNode, KdTree};
use crate::r#type::{Axis, IndexableFloat, Point};

/// A builder to create a [`KdTree`].
///
/// Points keep the order they were added in. Construction only depends on that order, so two
/// builders fed the same sequence produce identical trees.
#[derive(Debug, Clone, Default)]
pub struct KdTreeBuilder<N: IndexableFloat = f64> {
    points: Vec<Point<N>>,
}

impl<N: IndexableFloat> KdTreeBuilder<N> {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a new builder with room for `num_items` points.
    pub fn with_capacity(num_items: usize) -> Self {
        Self {
            points: Vec::with_capacity(num_items),
        }
    }

    /// Add a point to the index, returning its insertion index.
    pub fn add(&mut self, x: N, y: N) -> usize {
        self.add_point(Point::new(x, y))
    }

    /// Add a point to the index, returning its insertion index.
    pub fn add_point(&mut self, point: Point<N>) -> usize {
        let index = self.points.len();
        self.points.push(point);
        index
    }

    /// Consume this builder, performing the recursive median splits and generating a tree ready
    /// for queries.
    ///
    /// Fails if no points were added or if any point has a non-finite coordinate. Nothing is
    /// built in either case.
    pub fn finish(self) -> Result<KdTree<N>> {
        if self.points.is_empty() {
            return Err(KdTreeError::InvalidInput(
                "Cannot build a kd-tree from an empty point set.".to_string(),
            ));
        }
        if let Some(index) = self.points.iter().position(|p| !p.is_finite()) {
            return Err(KdTreeError::InvalidInput(format!(
                "Point {} has a non-finite coordinate: {:?}.",
                index, self.points[index]
            )));
        }

        // A full binary tree with n leaves has 2n - 1 nodes
        let mut state = BuildState {
            nodes: Vec::with_capacity(2 * self.points.len() - 1),
            depth: 0,
            fallback_splits: 0,
        };
        let root = state.split(self.points.clone(), 0);

        debug!(
            num_items = self.points.len(),
            num_nodes = state.nodes.len(),
            depth = state.depth,
            fallback_splits = state.fallback_splits,
            "Built kd-tree"
        );

        Ok(KdTree {
            nodes: state.nodes,
            root,
            points: self.points,
            depth: state.depth,
        })
    }
}

struct BuildState<N: IndexableFloat> {
    nodes: Vec<KdNode<N>>,
    depth: usize,
    fallback_splits: usize,
}

impl<N: IndexableFloat> BuildState<N> {
    /// Build the subtree holding `points` and return its arena position.
    ///
    /// Children are pushed before their parent, so the root ends up last.
    fn split(&mut self, mut points: Vec<Point<N>>, depth: usize) -> usize {
        self.depth = self.depth.max(depth);

        if points.len() == 1 {
            self.nodes.push(KdNode::Leaf { point: points[0] });
            return self.nodes.len() - 1;
        }

        let axis = Axis::at_depth(depth);
        let threshold = median(&points, axis);
        let (left, right): (Vec<_>, Vec<_>) = points
            .iter()
            .copied()
            .partition(|point| point.coord(axis) < threshold);

        let (threshold, left, right) = if left.is_empty() || right.is_empty() {
            // The median lands on a run of equal coordinates, so one side would receive every
            // point and the recursion would never shrink. Split by position instead, moving the
            // cut to the closest change in coordinate so the split stays strict. If every
            // coordinate is equal the left half holds values equal to the threshold, which still
            // keeps `left <= threshold <= right` and the nearest search bound valid.
            self.fallback_splits += 1;
            points.sort_by(|a, b| cmp_coord(a.coord(axis), b.coord(axis)));
            let mid = points.len() / 2;
            let boundary = (1..points.len())
                .filter(|&i| points[i - 1].coord(axis) < points[i].coord(axis))
                .min_by_key(|&i| i.abs_diff(mid))
                .unwrap_or(mid);
            let right = points.split_off(boundary);
            let threshold = right[0].coord(axis);
            trace!(
                depth,
                left = points.len(),
                right = right.len(),
                ?threshold,
                "Median split left a side empty; splitting by position"
            );
            (threshold, points, right)
        } else {
            (threshold, left, right)
        };

        let left = self.split(left, depth + 1);
        let right = self.split(right, depth + 1);
        self.nodes.push(KdNode::Branch {
            threshold,
            left,
            right,
        });
        self.nodes.len() - 1
    }
}

/// Standard numeric median of the `axis` coordinates: the middle value for an odd count, the
/// mean of the two middle values for an even count.
pub(crate) fn median<N: IndexableFloat>(points: &[Point<N>], axis: Axis) -> N {
    let mut values: Vec<N> = points.iter().map(|p| p.coord(axis)).collect();
    values.sort_by(|a, b| cmp_coord(*a, *b));

    let m = values.len() / 2;
    if values.len() % 2 == 1 {
        values[m]
    } else {
        (values[m - 1] + values[m]) / (N::one() + N::one())
    }
}

// Coordinates are validated as finite before sorting
#[inline]
fn cmp_coord<N: IndexableFloat>(a: N, b: N) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
