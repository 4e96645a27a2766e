use std::fmt::Debug;

use geo_traits::CoordTrait;
use num_traits::Float;

/// A trait for types that can be used for indexed coordinates.
///
/// Splitting thresholds are medians of coordinate values and may fall halfway between two input
/// values, so only floating point types are supported.
///
/// This trait is sealed and cannot be implemented for external types.
pub trait IndexableFloat:
    private::Sealed + Float + Debug + Default + Send + Sync + 'static
{
}

impl IndexableFloat for f32 {}

impl IndexableFloat for f64 {}

/// The axis a branch of the tree splits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Split on the x coordinate; the splitting line is vertical.
    X,
    /// Split on the y coordinate; the splitting line is horizontal.
    Y,
}

impl Axis {
    /// The axis used by a branch at the given depth. Depth 0 (the root) splits on x, and the axis
    /// alternates at every level after that.
    #[inline]
    pub fn at_depth(depth: usize) -> Self {
        if depth % 2 == 0 {
            Axis::X
        } else {
            Axis::Y
        }
    }

    /// The axis used one level deeper.
    #[inline]
    pub fn next(self) -> Self {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }

    /// 0 for x, 1 for y
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// A two-dimensional point.
///
/// Points are plain values: two points with equal coordinates are interchangeable, and a point
/// set may contain the same value more than once.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point<N: IndexableFloat = f64> {
    x: N,
    y: N,
}

impl<N: IndexableFloat> Point<N> {
    /// Create a new point.
    pub fn new(x: N, y: N) -> Self {
        Self { x, y }
    }

    /// The x coordinate.
    #[inline]
    pub fn x(&self) -> N {
        self.x
    }

    /// The y coordinate.
    #[inline]
    pub fn y(&self) -> N {
        self.y
    }

    /// The coordinate along `axis`.
    #[inline]
    pub fn coord(&self, axis: Axis) -> N {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Returns `true` if neither coordinate is NaN or infinite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared Euclidean distance to `other`.
    #[inline]
    pub fn distance_squared(&self, other: &Self) -> N {
        sq_dist(self.x, self.y, other.x, other.y)
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &Self) -> N {
        self.distance_squared(other).sqrt()
    }

    /// Copy the coordinates out of any [`CoordTrait`] implementation.
    pub fn from_coord(coord: &impl CoordTrait<T = N>) -> Self {
        Self::new(coord.x(), coord.y())
    }
}

impl<N: IndexableFloat> From<(N, N)> for Point<N> {
    fn from((x, y): (N, N)) -> Self {
        Self::new(x, y)
    }
}

impl<N: IndexableFloat> From<[N; 2]> for Point<N> {
    fn from([x, y]: [N; 2]) -> Self {
        Self::new(x, y)
    }
}

impl<N: IndexableFloat> From<Point<N>> for (N, N) {
    fn from(point: Point<N>) -> Self {
        (point.x, point.y)
    }
}

impl<N: IndexableFloat> CoordTrait for Point<N> {
    type T = N;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

#[inline]
pub(crate) fn sq_dist<N: IndexableFloat>(ax: N, ay: N, bx: N, by: N) -> N {
    let dx = ax - bx;
    let dy = ay - by;
    dx * dx + dy * dy
}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
