
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Point;

/// `n` points drawn uniformly from the unit square.
pub(crate) fn random_points(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| Point::new(rng.gen(), rng.gen())).collect()
}

/// `n` points on a coarse grid, so that coordinates repeat heavily.
pub(crate) fn grid_points(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x = rng.gen_range(0..4) as f64 / 4.;
            let y = rng.gen_range(0..4) as f64 / 4.;
            Point::new(x, y)
        })
        .collect()
}
