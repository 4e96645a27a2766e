use geo_traits::CoordTrait;

use crate::kdtree::traversal::Node;
use crate::kdtree::{KdNode, KdTree};
use crate::r#type::{Axis, IndexableFloat, Point};

/// A trait for searching and accessing data out of a [`KdTree`].
pub trait KdTreeIndex<N: IndexableFloat>: Sized {
    /// The node arena of this tree.
    fn nodes(&self) -> &[KdNode<N>];

    /// Position of the root node in [`KdTreeIndex::nodes`].
    fn root_id(&self) -> usize;

    /// The points this tree was built from, in their original order.
    fn points(&self) -> &[Point<N>];

    /// The number of items in this tree.
    fn num_items(&self) -> usize {
        self.points().len()
    }

    /// Find the point whose cell contains `query`.
    ///
    /// This walks a single root-to-leaf path, comparing the query against each branch
    /// threshold. It is cheap but only approximate: near a cell boundary the returned point may
    /// not be the closest one. Use [`KdTreeIndex::nearest`] for an exact answer.
    fn locate_cell(&self, query: impl Into<Point<N>>) -> Point<N> {
        let query = query.into();
        let nodes = self.nodes();

        let mut id = self.root_id();
        let mut axis = Axis::X;
        loop {
            match nodes[id] {
                KdNode::Leaf { point } => return point,
                KdNode::Branch {
                    threshold,
                    left,
                    right,
                } => {
                    id = if query.coord(axis) < threshold {
                        left
                    } else {
                        right
                    };
                    axis = axis.next();
                }
            }
        }
    }

    /// Find the point whose cell contains `coord`.
    fn locate_cell_coord(&self, coord: &impl CoordTrait<T = N>) -> Point<N> {
        self.locate_cell(Point::from_coord(coord))
    }

    /// Find the point closest to `query` under Euclidean distance.
    ///
    /// Returns the squared distance together with the point. When several points are equally
    /// close, the one found first in the search wins, which makes the result deterministic for a
    /// given tree.
    ///
    /// ```
    /// use median_kdtree::kdtree::{KdTreeBuilder, KdTreeIndex};
    ///
    /// let mut builder = KdTreeBuilder::new();
    /// builder.add(0., 0.);
    /// builder.add(10., 0.);
    /// builder.add(0., 10.);
    /// builder.add(10., 10.);
    /// let tree = builder.finish().unwrap();
    ///
    /// let (dist_sq, point) = tree.nearest((9., 2.));
    /// assert_eq!((point.x(), point.y()), (10., 0.));
    /// assert_eq!(dist_sq, 5.);
    /// ```
    fn nearest(&self, query: impl Into<Point<N>>) -> (N, Point<N>) {
        nearest_in(self.nodes(), self.root_id(), Axis::X, &query.into())
    }

    /// Find the point closest to `coord` under Euclidean distance.
    fn nearest_coord(&self, coord: &impl CoordTrait<T = N>) -> (N, Point<N>) {
        self.nearest(Point::from_coord(coord))
    }

    /// Same as [`KdTreeIndex::nearest`], but returns the Euclidean distance rather than its
    /// square.
    fn nearest_distance(&self, query: impl Into<Point<N>>) -> (N, Point<N>) {
        let (dist_sq, point) = self.nearest(query);
        (dist_sq.sqrt(), point)
    }

    /// Access the root node of the tree for manual traversal. Cell bounds are unbounded.
    fn root(&self) -> Node<'_, N, Self> {
        Node::from_root(self)
    }

    /// Access the root node of the tree for manual traversal, with cell bounds clipped to the
    /// rectangle spanned by `min` and `max`.
    fn root_within(&self, min: Point<N>, max: Point<N>) -> Node<'_, N, Self> {
        Node::from_root_within(self, min, max)
    }
}

impl<N: IndexableFloat> KdTreeIndex<N> for KdTree<N> {
    fn nodes(&self) -> &[KdNode<N>] {
        &self.nodes
    }

    fn root_id(&self) -> usize {
        self.root
    }

    fn points(&self) -> &[Point<N>] {
        &self.points
    }
}

impl<N: IndexableFloat, T: KdTreeIndex<N>> KdTreeIndex<N> for &T {
    fn nodes(&self) -> &[KdNode<N>] {
        (**self).nodes()
    }

    fn root_id(&self) -> usize {
        (**self).root_id()
    }

    fn points(&self) -> &[Point<N>] {
        (**self).points()
    }
}

/// Branch-and-bound nearest search below `id`, where `axis` is the split axis at that depth.
fn nearest_in<N: IndexableFloat>(
    nodes: &[KdNode<N>],
    id: usize,
    axis: Axis,
    query: &Point<N>,
) -> (N, Point<N>) {
    match nodes[id] {
        KdNode::Leaf { point } => (point.distance_squared(query), point),
        KdNode::Branch {
            threshold,
            left,
            right,
        } => {
            let value = query.coord(axis);
            let (near, far) = if value < threshold {
                (left, right)
            } else {
                (right, left)
            };

            let best = nearest_in(nodes, near, axis.next(), query);

            // squared distance from the query to the splitting line
            let gap = value - threshold;
            if best.0 < gap * gap {
                return best;
            }

            let alternative = nearest_in(nodes, far, axis.next(), query);
            if best.0 <= alternative.0 {
                best
            } else {
                alternative
            }
        }
    }
}
