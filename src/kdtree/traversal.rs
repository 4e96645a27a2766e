//! Utilities to traverse the KdTree structure.

use geo_traits::RectTrait;
use tinyvec::TinyVec;

use crate::kdtree::{KdNode, KdTree, KdTreeIndex};
use crate::r#type::{Axis, IndexableFloat, Point};

/// A node in the KdTree, together with the cell it covers.
///
/// The cell of the root is the rectangle the traversal was started with; each branch cuts its
/// cell in two along its threshold.
#[derive(Debug, Clone)]
pub struct Node<'a, N: IndexableFloat, T: KdTreeIndex<N>> {
    /// The tree that this node is a reference onto
    tree: &'a T,

    id: usize,
    depth: usize,

    min_x: N,
    min_y: N,
    max_x: N,
    max_y: N,
}

impl<'a, N: IndexableFloat, T: KdTreeIndex<N>> Node<'a, N, T> {
    pub(crate) fn from_root(tree: &'a T) -> Self {
        Self::from_root_within(
            tree,
            Point::new(N::neg_infinity(), N::neg_infinity()),
            Point::new(N::infinity(), N::infinity()),
        )
    }

    pub(crate) fn from_root_within(tree: &'a T, min: Point<N>, max: Point<N>) -> Self {
        Self {
            tree,
            id: tree.root_id(),
            depth: 0,
            min_x: min.x(),
            min_y: min.y(),
            max_x: max.x(),
            max_y: max.y(),
        }
    }

    /// Position of this node in [`KdTreeIndex::nodes`].
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Number of branches between the root and this node.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The axis this node splits on if it is a branch.
    #[inline]
    pub fn axis(&self) -> Axis {
        Axis::at_depth(self.depth)
    }

    /// Returns `true` if this is a leaf node without children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.tree.nodes()[self.id].is_leaf()
    }

    /// Returns `true` if this is an intermediate node with children.
    #[inline]
    pub fn is_parent(&self) -> bool {
        !self.is_leaf()
    }

    /// The point stored in this node, if it is a leaf.
    pub fn point(&self) -> Option<Point<N>> {
        match self.tree.nodes()[self.id] {
            KdNode::Leaf { point } => Some(point),
            KdNode::Branch { .. } => None,
        }
    }

    /// The splitting threshold of this node, if it is a branch.
    pub fn threshold(&self) -> Option<N> {
        match self.tree.nodes()[self.id] {
            KdNode::Leaf { .. } => None,
            KdNode::Branch { threshold, .. } => Some(threshold),
        }
    }

    /// The lower-left and upper-right corners of this node's cell.
    pub fn bounds(&self) -> (Point<N>, Point<N>) {
        (
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.max_y),
        )
    }

    /// The child node holding coordinates below the threshold, or `None` for a leaf.
    pub fn left_child(&self) -> Option<Node<'a, N, T>> {
        let KdNode::Branch {
            threshold, left, ..
        } = self.tree.nodes()[self.id]
        else {
            return None;
        };
        let cut = self.clip(threshold);

        let mut max_x = self.max_x;
        let mut max_y = self.max_y;
        match self.axis() {
            Axis::X => max_x = cut,
            Axis::Y => max_y = cut,
        }

        Some(Self {
            tree: self.tree,
            id: left,
            depth: self.depth + 1,
            min_x: self.min_x,
            min_y: self.min_y,
            max_x,
            max_y,
        })
    }

    /// The child node holding coordinates at or above the threshold, or `None` for a leaf.
    pub fn right_child(&self) -> Option<Node<'a, N, T>> {
        let KdNode::Branch {
            threshold, right, ..
        } = self.tree.nodes()[self.id]
        else {
            return None;
        };
        let cut = self.clip(threshold);

        let mut min_x = self.min_x;
        let mut min_y = self.min_y;
        match self.axis() {
            Axis::X => min_x = cut,
            Axis::Y => min_y = cut,
        }

        Some(Self {
            tree: self.tree,
            id: right,
            depth: self.depth + 1,
            min_x,
            min_y,
            max_x: self.max_x,
            max_y: self.max_y,
        })
    }

    /// The splitting segment of this node clipped to its cell, or `None` for a leaf.
    pub fn split(&self) -> Option<Split<N>> {
        let threshold = self.threshold()?;
        let cut = self.clip(threshold);
        let (start, end) = match self.axis() {
            Axis::X => (Point::new(cut, self.min_y), Point::new(cut, self.max_y)),
            Axis::Y => (Point::new(self.min_x, cut), Point::new(self.max_x, cut)),
        };
        Some(Split {
            axis: self.axis(),
            threshold,
            start,
            end,
        })
    }

    // Keep children inside the traversal rectangle even when it is smaller than the data
    #[inline]
    fn clip(&self, threshold: N) -> N {
        match self.axis() {
            Axis::X => threshold.max(self.min_x).min(self.max_x),
            Axis::Y => threshold.max(self.min_y).min(self.max_y),
        }
    }
}

impl<N: IndexableFloat, T: KdTreeIndex<N>> RectTrait for Node<'_, N, T> {
    type T = N;
    type CoordType<'a>
        = Point<N>
    where
        Self: 'a;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn min(&self) -> Self::CoordType<'_> {
        Point::new(self.min_x, self.min_y)
    }

    fn max(&self) -> Self::CoordType<'_> {
        Point::new(self.max_x, self.max_y)
    }
}

/// The cell of a single leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell<N: IndexableFloat = f64> {
    /// The point owning this cell.
    pub point: Point<N>,
    /// Lower-left corner.
    pub min: Point<N>,
    /// Upper-right corner.
    pub max: Point<N>,
}

impl<N: IndexableFloat> Cell<N> {
    /// Returns `true` if `query` falls in this cell. The lower edges are inclusive and the upper
    /// edges exclusive, matching how a query descends the tree.
    pub fn contains(&self, query: &Point<N>) -> bool {
        query.x() >= self.min.x()
            && query.x() < self.max.x()
            && query.y() >= self.min.y()
            && query.y() < self.max.y()
    }
}

/// The splitting segment of a single branch, i.e. one line of the partition grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split<N: IndexableFloat = f64> {
    /// The axis being split. A split on [`Axis::X`] is a vertical segment.
    pub axis: Axis,
    /// The branch threshold as stored in the tree.
    pub threshold: N,
    /// One end of the segment.
    pub start: Point<N>,
    /// The other end of the segment.
    pub end: Point<N>,
}

impl<N: IndexableFloat> KdTree<N> {
    /// The cell of every leaf inside the rectangle spanned by `min` and `max`, from left to
    /// right.
    ///
    /// The cells tile that rectangle. Cells lying entirely outside it collapse to zero width.
    pub fn cells(&self, min: Point<N>, max: Point<N>) -> Vec<Cell<N>> {
        walk(self.root_within(min, max))
            .into_iter()
            .filter_map(|node| {
                let point = node.point()?;
                let (min, max) = node.bounds();
                Some(Cell { point, min, max })
            })
            .collect()
    }

    /// The splitting segment of every branch inside the rectangle spanned by `min` and `max`, in
    /// pre-order.
    pub fn splits(&self, min: Point<N>, max: Point<N>) -> Vec<Split<N>> {
        walk(self.root_within(min, max))
            .into_iter()
            .filter_map(|node| node.split())
            .collect()
    }
}

/// Depth-first pre-order walk, left subtree before right.
fn walk<N: IndexableFloat, T: KdTreeIndex<N>>(root: Node<'_, N, T>) -> Vec<Node<'_, N, T>> {
    let mut result = Vec::with_capacity(root.tree.nodes().len());

    // Use TinyVec to avoid heap allocations
    let mut stack: TinyVec<[(usize, usize, Point<N>, Point<N>); 32]> = TinyVec::new();
    let (min, max) = root.bounds();
    stack.push((root.id, root.depth, min, max));

    while let Some((id, depth, min, max)) = stack.pop() {
        let node = Node {
            tree: root.tree,
            id,
            depth,
            min_x: min.x(),
            min_y: min.y(),
            max_x: max.x(),
            max_y: max.y(),
        };

        // Note: these are pushed in backwards order to what gets popped
        for child in [node.right_child(), node.left_child()].into_iter().flatten() {
            let (min, max) = child.bounds();
            stack.push((child.id, child.depth, min, max));
        }
        result.push(node);
    }

    result
}
