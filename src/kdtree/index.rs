use tinyvec::TinyVec;

use crate::error::Result;
use crate::kdtree::builder::KdTreeBuilder;
use crate::r#type::{IndexableFloat, Point};

/// A single node of a [`KdTree`].
///
/// Nodes live in a flat arena owned by the tree; children are referenced by their position in
/// [`KdTreeIndex::nodes`][crate::kdtree::KdTreeIndex::nodes]. The axis of a branch is not
/// stored: it is implied by the branch's depth, see [`Axis::at_depth`][crate::Axis::at_depth].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KdNode<N: IndexableFloat = f64> {
    /// Exactly one point remains in this subtree.
    Leaf {
        /// The point owned by this leaf.
        point: Point<N>,
    },
    /// Partitions the points of this subtree into two non-empty groups.
    Branch {
        /// Points whose coordinate on the branch axis is `< threshold` are found under `left`,
        /// the others under `right`.
        threshold: N,
        /// Arena position of the left child.
        left: usize,
        /// Arena position of the right child.
        right: usize,
    },
}

impl<N: IndexableFloat> KdNode<N> {
    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, KdNode::Leaf { .. })
    }
}

/// An immutable 2D kd-tree built by recursive median splits.
///
/// Usually this will be created via [`KdTree::build`] or
/// [`KdTreeBuilder`][crate::kdtree::KdTreeBuilder]. Queries are provided by the
/// [`KdTreeIndex`][crate::kdtree::KdTreeIndex] trait.
#[derive(Debug, Clone, PartialEq)]
pub struct KdTree<N: IndexableFloat = f64> {
    pub(crate) nodes: Vec<KdNode<N>>,
    pub(crate) root: usize,
    pub(crate) points: Vec<Point<N>>,
    pub(crate) depth: usize,
}

impl<N: IndexableFloat> KdTree<N> {
    /// Build a tree over `points`.
    ///
    /// Fails with [`KdTreeError::InvalidInput`][crate::KdTreeError::InvalidInput] if `points` is
    /// empty or contains a non-finite coordinate.
    ///
    /// ```
    /// use median_kdtree::kdtree::{KdTree, KdTreeIndex};
    /// use median_kdtree::Point;
    ///
    /// let points = [(0., 0.), (10., 0.), (0., 10.), (10., 10.)].map(Point::from);
    /// let tree = KdTree::build(&points).unwrap();
    ///
    /// let (dist_sq, nearest) = tree.nearest((1., 1.));
    /// assert_eq!(nearest, Point::new(0., 0.));
    /// assert_eq!(dist_sq, 2.);
    /// ```
    pub fn build(points: &[Point<N>]) -> Result<Self> {
        let mut builder = KdTreeBuilder::with_capacity(points.len());
        for point in points {
            builder.add_point(*point);
        }
        builder.finish()
    }

    /// The number of points in this tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a tree cannot be built from an empty point set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The total number of nodes in the arena, leaves and branches.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// The depth of the deepest leaf. A tree holding a single point has depth 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The leaf points from left to right, i.e. an in-order walk of the tree.
    pub fn leaves(&self) -> Vec<Point<N>> {
        let mut result = Vec::with_capacity(self.points.len());

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[usize; 32]> = TinyVec::new();
        stack.push(self.root);

        while let Some(id) = stack.pop() {
            match self.nodes[id] {
                KdNode::Leaf { point } => result.push(point),
                KdNode::Branch { left, right, .. } => {
                    // Note: pushed in backwards order to what gets popped
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        result
    }
}
