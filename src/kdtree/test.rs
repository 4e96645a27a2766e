use crate::kdtree::{KdNode, KdTree, KdTreeBuilder, KdTreeIndex};
use crate::linear::{nearest_naive, nearest_naive_with_distance};
use crate::{Axis, KdTreeError, Point};

fn points() -> Vec<Point> {
    let coords: Vec<[i32; 2]> = vec![
        [54, 1],
        [97, 21],
        [65, 35],
        [33, 54],
        [95, 39],
        [54, 3],
        [53, 54],
        [84, 72],
        [33, 34],
        [43, 15],
        [52, 83],
        [81, 23],
        [1, 61],
        [38, 74],
        [11, 91],
        [24, 56],
        [90, 31],
        [25, 57],
        [46, 61],
        [29, 69],
        [49, 60],
        [4, 98],
        [71, 15],
        [60, 25],
        [38, 84],
        [52, 38],
        [94, 51],
        [13, 25],
        [77, 73],
        [88, 87],
        [6, 27],
        [58, 22],
        [53, 28],
        [27, 91],
        [96, 98],
        [93, 14],
        [22, 93],
        [45, 94],
        [18, 28],
        [35, 15],
        [19, 81],
        [20, 81],
        [67, 53],
        [43, 3],
        [47, 66],
        [48, 34],
        [46, 12],
        [32, 38],
        [43, 12],
        [39, 94],
        [88, 62],
        [66, 14],
        [84, 30],
        [72, 81],
        [41, 92],
        [26, 4],
        [6, 76],
        [47, 21],
        [57, 70],
        [71, 82],
        [50, 68],
        [96, 18],
        [40, 31],
        [78, 53],
        [71, 90],
        [32, 14],
        [55, 6],
        [32, 88],
        [62, 32],
        [21, 67],
        [73, 81],
        [44, 64],
        [29, 50],
        [70, 5],
        [6, 22],
        [68, 3],
        [11, 23],
        [20, 42],
        [21, 73],
        [63, 86],
        [9, 40],
        [99, 2],
        [99, 76],
        [56, 77],
        [83, 6],
        [21, 72],
        [78, 30],
        [75, 53],
        [41, 11],
        [95, 20],
        [30, 38],
        [96, 82],
        [65, 48],
        [33, 18],
        [87, 28],
        [10, 10],
        [40, 34],
        [10, 20],
        [47, 29],
        [46, 78],
    ];

    coords
        .into_iter()
        .map(|[x, y]| Point::new(x.into(), y.into()))
        .collect()
}

fn make_index() -> KdTree {
    let points = points();

    let mut builder = KdTreeBuilder::with_capacity(points.len());
    for point in points {
        builder.add_point(point);
    }
    builder.finish().unwrap()
}

fn queries() -> Vec<Point> {
    let mut result = vec![];
    for i in 0..15 {
        for j in 0..15 {
            result.push(Point::new(i as f64 * 7.3 - 2., j as f64 * 6.9 + 0.5));
        }
    }
    // exactly on the data points
    result.extend(points());
    result.push(Point::new(50., 50.));
    result
}

#[test]
fn creates_an_index() {
    let index = make_index();
    assert_eq!(index.len(), 100);
    assert_eq!(index.num_items(), 100);
    assert_eq!(index.num_nodes(), 199);
    assert_eq!(index.points(), &points()[..]);

    let mut leaves = index.leaves();
    let mut expected = points();
    let by_xy = |a: &Point, b: &Point| a.x().total_cmp(&b.x()).then(a.y().total_cmp(&b.y()));
    leaves.sort_by(by_xy);
    expected.sort_by(by_xy);
    assert_eq!(leaves, expected, "every point ends up in exactly one leaf");
}

#[test]
fn branches_respect_thresholds() {
    fn check(tree: &KdTree, id: usize, depth: usize) -> Vec<Point> {
        match tree.nodes()[id] {
            KdNode::Leaf { point } => vec![point],
            KdNode::Branch {
                threshold,
                left,
                right,
            } => {
                let axis = Axis::at_depth(depth);
                let left = check(tree, left, depth + 1);
                let right = check(tree, right, depth + 1);
                assert!(!left.is_empty() && !right.is_empty());
                assert!(left.iter().all(|p| p.coord(axis) <= threshold));
                assert!(right.iter().all(|p| p.coord(axis) >= threshold));

                // a non-strict split only happens when the whole subtree shares the coordinate
                if left.iter().any(|p| p.coord(axis) == threshold) {
                    assert!(left
                        .iter()
                        .chain(&right)
                        .all(|p| p.coord(axis) == threshold));
                }
                left.into_iter().chain(right).collect()
            }
        }
    }

    let index = make_index();
    assert_eq!(check(&index, index.root_id(), 0).len(), 100);
}

#[test]
fn nearest_matches_linear_scan() {
    let index = make_index();
    let points = points();

    for query in queries() {
        let (dist_sq, found) = index.nearest(query);
        let (expected_dist_sq, _) = nearest_naive_with_distance(&points, query).unwrap();

        assert_eq!(dist_sq, expected_dist_sq, "query {:?}", query);
        assert_eq!(dist_sq, found.distance_squared(&query));
        assert!(points.contains(&found));
        assert!(points
            .iter()
            .all(|p| p.distance_squared(&query) >= dist_sq));
    }
}

#[test]
fn locate_cell_matches_cells() {
    let index = make_index();
    let cells = index.cells(
        Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        Point::new(f64::INFINITY, f64::INFINITY),
    );
    assert_eq!(cells.len(), 100);

    for query in queries() {
        let found = index.locate_cell(query);
        // the fixture has no duplicate points, so each point owns exactly one cell
        let cell = cells.iter().find(|c| c.point == found).unwrap();
        assert!(cell.contains(&query), "query {:?} outside {:?}", query, cell);
        assert_eq!(
            cells.iter().filter(|c| c.contains(&query)).count(),
            1,
            "cells overlap at {:?}",
            query
        );
    }

    for point in points() {
        assert_eq!(index.nearest(point), (0., point));
    }
}

#[test]
fn four_corners() {
    let points = [(0., 0.), (10., 0.), (0., 10.), (10., 10.)].map(Point::from);
    let tree = KdTree::build(&points).unwrap();

    let query = Point::new(1., 1.);
    assert_eq!(tree.nearest(query), (2., Point::new(0., 0.)));
    assert_eq!(nearest_naive(&points, query).unwrap(), Point::new(0., 0.));
    assert_eq!(tree.locate_cell(query), Point::new(0., 0.));
}

#[test]
fn cell_lookup_differs_from_nearest() {
    // root splits x at 4; the query sits just left of it, next to a point on the right
    let points = [(0., 0.), (4., 5.), (10., 10.)].map(Point::from);
    let tree = KdTree::build(&points).unwrap();

    let query = Point::new(3.5, 5.);
    assert_eq!(tree.locate_cell(query), Point::new(0., 0.));
    assert_eq!(tree.nearest(query), (0.25, Point::new(4., 5.)));
    assert_eq!(nearest_naive(&points, query).unwrap(), Point::new(4., 5.));
}

#[test]
fn single_point() {
    let point = Point::new(0.25, 0.75);
    let tree = KdTree::build(&[point]).unwrap();
    assert_eq!(tree.depth(), 0);
    assert_eq!(tree.num_nodes(), 1);

    for query in queries() {
        assert_eq!(tree.locate_cell(query), point);
        assert_eq!(tree.nearest(query).1, point);
        assert_eq!(tree.nearest(query).0, point.distance_squared(&query));
    }
}

#[test]
fn duplicates() {
    let point = Point::new(0.5, 0.5);
    let tree = KdTree::build(&vec![point; 10]).unwrap();

    assert_eq!(tree.nearest(point), (0., point));
    assert_eq!(tree.nearest((0.5, 0.6)).1, point);
    assert_eq!(tree.locate_cell((0., 0.)), point);
    assert_eq!(tree.leaves(), vec![point; 10]);
}

#[test]
fn duplicate_heavy_matches_linear_scan() {
    // long runs of equal coordinates on both axes force positional splits
    let mut points = vec![];
    for i in 0..40 {
        points.push(Point::new((i % 3) as f64, (i % 2) as f64));
    }
    points.push(Point::new(5., 5.));
    let tree = KdTree::build(&points).unwrap();

    for query in queries() {
        let query = Point::new(query.x() / 15., query.y() / 15.);
        let (dist_sq, _) = tree.nearest(query);
        let (expected, _) = nearest_naive_with_distance(&points, query).unwrap();
        assert_eq!(dist_sq, expected, "query {:?}", query);
    }
}

#[test]
fn deterministic_structure() {
    let a = make_index();
    let b = make_index();
    assert_eq!(a, b);
    assert_eq!(a.nodes(), b.nodes());
}

#[test]
fn nearest_tie_prefers_near_side() {
    // the query is equidistant from both points; it falls right of the x = 1 split
    let points = [(0., 0.), (2., 0.)].map(Point::from);
    let tree = KdTree::build(&points).unwrap();
    assert_eq!(tree.nearest((1., 0.)), (1., Point::new(2., 0.)));
    assert_eq!(tree.nearest((1., 5.)).1, Point::new(2., 0.));
    // the linear scan keeps the first point in input order
    assert_eq!(nearest_naive(&points, (1., 0.)).unwrap(), Point::new(0., 0.));
}

#[test]
fn nearest_distance_takes_root() {
    let points = [(0., 0.), (3., 4.)].map(Point::from);
    let tree = KdTree::build(&points).unwrap();
    let (dist, point) = tree.nearest_distance((6., 8.));
    assert_eq!(point, Point::new(3., 4.));
    assert_eq!(dist, 5.);
}

#[test]
fn coord_trait_queries() {
    let index = make_index();
    let query = Point::new(50., 50.);
    assert_eq!(index.nearest_coord(&query), index.nearest(query));
    assert_eq!(index.locate_cell_coord(&query), index.locate_cell(query));
}

#[test]
fn f32_tree() {
    let points: Vec<Point<f32>> = points()
        .into_iter()
        .map(|p| Point::new(p.x() as f32, p.y() as f32))
        .collect();
    let tree = KdTree::build(&points).unwrap();
    let query = Point::new(10.5f32, 10.5);
    let (dist_sq, _) = tree.nearest(query);
    let (expected, _) = nearest_naive_with_distance(&points, query).unwrap();
    assert_eq!(dist_sq, expected);
}

#[test]
fn empty_input() {
    let err = KdTree::<f64>::build(&[]).unwrap_err();
    assert!(matches!(err, KdTreeError::InvalidInput(_)));
}
