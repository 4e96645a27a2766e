//! A query façade over a [`KdTree`] that dispatches between search modes.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

#[cfg(feature = "rayon")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::warn;

use crate::error::{KdTreeError, Result};
use crate::kdtree::{KdTree, KdTreeIndex};
use crate::linear::scan;
use crate::r#type::{IndexableFloat, Point};

/// How a query point is matched against the indexed points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueryMode {
    /// The point owning the tree cell the query falls in. Cheap, but not always the closest.
    CellLookup,
    /// The closest point, found with a pruned tree search.
    #[default]
    NearestExact,
    /// The closest point, found by checking every point.
    LinearScan,
}

impl QueryMode {
    /// Switch between the two exact algorithms. [`QueryMode::CellLookup`] is left unchanged.
    pub fn toggle_algorithm(self) -> Self {
        match self {
            QueryMode::NearestExact => QueryMode::LinearScan,
            QueryMode::LinearScan => QueryMode::NearestExact,
            QueryMode::CellLookup => QueryMode::CellLookup,
        }
    }

    /// Returns `true` if this mode always finds the closest point.
    pub fn is_exact(&self) -> bool {
        !matches!(self, QueryMode::CellLookup)
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryMode::CellLookup => "cell",
            QueryMode::NearestExact => "exact",
            QueryMode::LinearScan => "linear",
        };
        f.write_str(name)
    }
}

impl FromStr for QueryMode {
    type Err = KdTreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cell" => Ok(QueryMode::CellLookup),
            "exact" => Ok(QueryMode::NearestExact),
            "linear" => Ok(QueryMode::LinearScan),
            other => Err(KdTreeError::InvalidInput(format!(
                "Unknown query mode {:?}, expected one of \"cell\", \"exact\" or \"linear\".",
                other
            ))),
        }
    }
}

/// Configuration of a [`QueryEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// The mode used by [`QueryEngine::query_default`].
    pub default_mode: QueryMode,
    /// Verify every [`QueryMode::NearestExact`] answer against a linear scan and log a warning
    /// on mismatch.
    pub cross_check: bool,
}

impl QueryOptions {
    /// Set the mode used by [`QueryEngine::query_default`].
    pub fn with_default_mode(mut self, mode: QueryMode) -> Self {
        self.default_mode = mode;
        self
    }

    /// Enable or disable cross-checking exact answers.
    pub fn with_cross_check(mut self, cross_check: bool) -> Self {
        self.cross_check = cross_check;
        self
    }
}

/// Answers nearest point queries over one built tree in any [`QueryMode`].
///
/// The engine can either own its tree or borrow it, since `&KdTree` also implements
/// [`KdTreeIndex`].
///
/// ```
/// use median_kdtree::{Point, QueryEngine, QueryMode};
///
/// let points = [(0., 0.), (4., 5.), (10., 10.)].map(Point::from);
/// let engine = QueryEngine::try_new(&points).unwrap();
///
/// let query = Point::new(3.5, 5.);
/// assert_eq!(engine.query(QueryMode::NearestExact, query), Point::new(4., 5.));
/// assert_eq!(engine.query(QueryMode::LinearScan, query), Point::new(4., 5.));
/// assert_eq!(engine.query(QueryMode::CellLookup, query), Point::new(0., 0.));
/// ```
#[derive(Debug, Clone)]
pub struct QueryEngine<N: IndexableFloat = f64, T: KdTreeIndex<N> = KdTree<N>> {
    tree: T,
    options: QueryOptions,
    phantom: PhantomData<N>,
}

impl<N: IndexableFloat> QueryEngine<N, KdTree<N>> {
    /// Build a tree over `points` and wrap it with default options.
    ///
    /// Fails with [`KdTreeError::InvalidInput`] if `points` is empty or contains a non-finite
    /// coordinate.
    pub fn try_new(points: &[Point<N>]) -> Result<Self> {
        Self::try_new_with_options(points, QueryOptions::default())
    }

    /// Build a tree over `points` and wrap it with the given options.
    pub fn try_new_with_options(points: &[Point<N>], options: QueryOptions) -> Result<Self> {
        Ok(Self::new(KdTree::build(points)?, options))
    }
}

impl<N: IndexableFloat, T: KdTreeIndex<N>> QueryEngine<N, T> {
    /// Wrap an already built tree.
    pub fn new(tree: T, options: QueryOptions) -> Self {
        Self {
            tree,
            options,
            phantom: PhantomData,
        }
    }

    /// The wrapped tree.
    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// The points backing the tree, in their original order.
    pub fn points(&self) -> &[Point<N>] {
        self.tree.points()
    }

    /// The current configuration.
    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Change the mode used by [`QueryEngine::query_default`].
    pub fn set_default_mode(&mut self, mode: QueryMode) {
        self.options.default_mode = mode;
    }

    /// Find the point matching `query` under `mode`.
    pub fn query(&self, mode: QueryMode, query: impl Into<Point<N>>) -> Point<N> {
        match mode {
            QueryMode::CellLookup => self.tree.locate_cell(query),
            _ => self.query_with_distance(mode, query).1,
        }
    }

    /// Find the point matching `query` under `mode`, together with its squared distance to
    /// `query`.
    pub fn query_with_distance(
        &self,
        mode: QueryMode,
        query: impl Into<Point<N>>,
    ) -> (N, Point<N>) {
        let query = query.into();
        match mode {
            QueryMode::CellLookup => {
                let point = self.tree.locate_cell(query);
                (point.distance_squared(&query), point)
            }
            QueryMode::NearestExact => {
                let result = self.tree.nearest(query);
                if self.options.cross_check {
                    let (expected, _) = scan(self.tree.points(), &query);
                    if result.0 != expected {
                        warn!(
                            ?query,
                            found = ?result.1,
                            dist_sq = ?result.0,
                            expected_dist_sq = ?expected,
                            "Tree search disagrees with linear scan"
                        );
                    }
                }
                result
            }
            QueryMode::LinearScan => scan(self.tree.points(), &query),
        }
    }

    /// Find the point matching `query` under the configured default mode.
    pub fn query_default(&self, query: impl Into<Point<N>>) -> Point<N> {
        self.query(self.options.default_mode, query)
    }

    /// Answer a batch of queries under `mode`, in order.
    #[cfg(not(feature = "rayon"))]
    pub fn query_many(&self, mode: QueryMode, queries: &[Point<N>]) -> Vec<Point<N>> {
        queries.iter().map(|query| self.query(mode, *query)).collect()
    }
}

#[cfg(feature = "rayon")]
impl<N: IndexableFloat, T: KdTreeIndex<N> + Sync> QueryEngine<N, T> {
    /// Answer a batch of queries under `mode`, in order. Queries are answered in parallel.
    pub fn query_many(&self, mode: QueryMode, queries: &[Point<N>]) -> Vec<Point<N>> {
        queries
            .par_iter()
            .map(|query| self.query(mode, *query))
            .collect()
    }
}

impl<N: IndexableFloat> From<KdTree<N>> for QueryEngine<N, KdTree<N>> {
    fn from(tree: KdTree<N>) -> Self {
        Self::new(tree, QueryOptions::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn corners() -> Vec<Point> {
        [(0., 0.), (10., 0.), (0., 10.), (10., 10.)]
            .map(Point::from)
            .to_vec()
    }

    #[test]
    fn dispatches_modes() {
        let engine = QueryEngine::try_new(&corners()).unwrap();
        for mode in [
            QueryMode::CellLookup,
            QueryMode::NearestExact,
            QueryMode::LinearScan,
        ] {
            assert_eq!(engine.query(mode, (1., 1.)), Point::new(0., 0.));
            assert_eq!(
                engine.query_with_distance(mode, (1., 1.)),
                (2., Point::new(0., 0.))
            );
        }
    }

    #[test]
    fn rejects_empty() {
        let err = QueryEngine::<f64>::try_new(&[]).unwrap_err();
        assert!(matches!(err, KdTreeError::InvalidInput(_)));
    }

    #[test]
    fn default_mode() {
        let points = [(0., 0.), (4., 5.), (10., 10.)].map(Point::from);
        let options = QueryOptions::default().with_default_mode(QueryMode::CellLookup);
        let mut engine = QueryEngine::try_new_with_options(&points, options).unwrap();

        let query = Point::new(3.5, 5.);
        assert_eq!(engine.query_default(query), Point::new(0., 0.));
        engine.set_default_mode(QueryMode::LinearScan);
        assert_eq!(engine.query_default(query), Point::new(4., 5.));
        assert_eq!(engine.options().default_mode, QueryMode::LinearScan);
    }

    #[test]
    fn borrowed_tree() {
        let tree = KdTree::build(&corners()).unwrap();
        let engine: QueryEngine<f64, &KdTree> =
            QueryEngine::new(&tree, QueryOptions::default().with_cross_check(true));
        assert_eq!(engine.query_default((9., 9.)), Point::new(10., 10.));
        assert_eq!(engine.points(), tree.points());
        assert!(engine.options().cross_check);
    }

    #[test]
    fn batch_queries() {
        let engine = QueryEngine::from(KdTree::build(&corners()).unwrap());
        let queries = [(1., 1.), (9., 1.), (1., 9.), (9., 9.)].map(Point::from);
        assert_eq!(
            engine.query_many(QueryMode::NearestExact, &queries),
            corners()
        );
    }

    #[test]
    fn mode_names() {
        for mode in [
            QueryMode::CellLookup,
            QueryMode::NearestExact,
            QueryMode::LinearScan,
        ] {
            assert_eq!(mode.to_string().parse::<QueryMode>().unwrap(), mode);
        }
        assert_eq!("EXACT".parse::<QueryMode>().unwrap(), QueryMode::NearestExact);
        assert!("fastest".parse::<QueryMode>().is_err());
    }

    #[test]
    fn toggle() {
        assert_eq!(QueryMode::default(), QueryMode::NearestExact);
        assert_eq!(
            QueryMode::NearestExact.toggle_algorithm(),
            QueryMode::LinearScan
        );
        assert_eq!(
            QueryMode::LinearScan.toggle_algorithm(),
            QueryMode::NearestExact
        );
        assert_eq!(
            QueryMode::CellLookup.toggle_algorithm(),
            QueryMode::CellLookup
        );
        assert!(!QueryMode::CellLookup.is_exact());
        assert!(QueryMode::LinearScan.is_exact());
    }
}
