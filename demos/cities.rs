//! Place random cities in the unit square and answer a few nearest-city queries in every mode.
//!
//! Also prints the partition grid of the tree, scaled to a 1000 x 1000 canvas.

use median_kdtree::kdtree::KdTreeIndex;
use median_kdtree::{Axis, Point, QueryEngine, QueryMode, QueryOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const NUM_CITIES: usize = 50;
const SCALE: f64 = 1000.;

fn main() {
    let mut rng = StdRng::seed_from_u64(2024);
    let cities: Vec<Point> = (0..NUM_CITIES)
        .map(|_| Point::new(rng.gen(), rng.gen()))
        .collect();

    let options = QueryOptions::default().with_cross_check(true);
    let engine = QueryEngine::try_new_with_options(&cities, options).unwrap();
    let tree = engine.tree();
    println!(
        "Built a tree over {} cities: {} nodes, depth {}",
        tree.len(),
        tree.num_nodes(),
        tree.depth()
    );

    println!("\nGrid lines:");
    let splits = tree.splits(Point::new(0., 0.), Point::new(1., 1.));
    for split in splits.iter().take(7) {
        let kind = match split.axis {
            Axis::X => "vertical",
            Axis::Y => "horizontal",
        };
        println!(
            "  {:>10} at {:.3}: ({:.0}, {:.0}) -> ({:.0}, {:.0})",
            kind,
            split.threshold,
            split.start.x() * SCALE,
            split.start.y() * SCALE,
            split.end.x() * SCALE,
            split.end.y() * SCALE,
        );
    }
    println!("  ... {} lines in total", splits.len());

    println!("\nQueries:");
    let mut mode = QueryMode::NearestExact;
    for _ in 0..5 {
        let query = Point::new(rng.gen(), rng.gen());
        let (dist_sq, exact) = engine.query_with_distance(mode, query);
        let cell = engine.query(QueryMode::CellLookup, query);
        println!(
            "  ({:.3}, {:.3}) [{}] -> ({:.3}, {:.3}) at {:.4}; cell -> ({:.3}, {:.3}){}",
            query.x(),
            query.y(),
            mode,
            exact.x(),
            exact.y(),
            dist_sq.sqrt(),
            cell.x(),
            cell.y(),
            if cell == exact { "" } else { " (differs)" }
        );
        mode = mode.toggle_algorithm();
    }

    let (dist, nearest) = tree.nearest_distance((0.5, 0.5));
    println!(
        "\nCity closest to the center: ({:.0}, {:.0}) at {:.1}px",
        nearest.x() * SCALE,
        nearest.y() * SCALE,
        dist * SCALE
    );
}

