//! Integration tests for the FPFH pipeline
//!
//! These tests run the full pipeline (R*-tree, SPFH, FPFH) on synthetic
//! surfaces whose local geometry is known.

use approx::assert_relative_eq;
use regfeat_algorithms::*;
use regfeat_core::{NormalPoint3f, Point3f, PointCloud, SearchParam, SilentSink, Vector3f};

const CYLINDER_SEGMENTS: usize = 16;
const CYLINDER_ROWS: usize = 10;
const CYLINDER_ROW_SPACING: f32 = 0.35;

/// Unit cylinder sampled on a regular (angle, height) grid with radial normals.
///
/// Point `row * CYLINDER_SEGMENTS + segment` sits at height `row`.
fn create_cylinder() -> PointCloud<NormalPoint3f> {
    let mut cloud = PointCloud::with_capacity(CYLINDER_SEGMENTS * CYLINDER_ROWS);
    for row in 0..CYLINDER_ROWS {
        for segment in 0..CYLINDER_SEGMENTS {
            let angle = 2.0 * std::f32::consts::PI * segment as f32 / CYLINDER_SEGMENTS as f32;
            let normal = Vector3f::new(angle.cos(), angle.sin(), 0.0);
            let position = Point3f::new(normal.x, normal.y, row as f32 * CYLINDER_ROW_SPACING);
            cloud.push(NormalPoint3f::new(position, normal));
        }
    }
    cloud
}

/// Flat square patch in the XY plane with +Z normals
fn create_plane(size: usize, spacing: f32) -> PointCloud<NormalPoint3f> {
    (0..size)
        .flat_map(|x| (0..size).map(move |y| (x, y)))
        .map(|(x, y)| {
            NormalPoint3f::new(
                Point3f::new(x as f32 * spacing, y as f32 * spacing, 0.0),
                Vector3f::z(),
            )
        })
        .collect()
}

fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

fn section_sums(column: &[f64]) -> [f64; 3] {
    std::array::from_fn(|s| column[s * HISTOGRAM_BINS..(s + 1) * HISTOGRAM_BINS].iter().sum())
}

#[test]
fn test_feature_shape_matches_cloud() {
    let cloud = create_cylinder();
    let feature = compute_fpfh_feature(&cloud, &SearchParam::default());

    assert_eq!(feature.dimension(), FPFH_DIMENSION);
    assert_eq!(feature.num(), cloud.len());
}

#[test]
fn test_fpfh_sections_are_percentages() {
    let cloud = create_cylinder();
    let feature = compute_fpfh_feature(&cloud, &SearchParam::Radius { radius: 0.6 });

    for i in 0..feature.num() {
        for sum in section_sums(feature.column_slice(i)) {
            assert_relative_eq!(sum, 100.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_cylinder_interior_is_homogeneous_and_rim_diverges() {
    let cloud = create_cylinder();
    let feature = compute_fpfh_feature(&cloud, &SearchParam::Radius { radius: 0.6 });

    let reference = feature.column_slice(4 * CYLINDER_SEGMENTS);

    // Rows two or more away from either rim only see interior neighborhoods
    for row in 2..CYLINDER_ROWS - 2 {
        for segment in 0..CYLINDER_SEGMENTS {
            let column = feature.column_slice(row * CYLINDER_SEGMENTS + segment);
            assert!(
                l1_distance(column, reference) < 1e-3,
                "row {row} segment {segment} differs from interior reference"
            );
        }
    }

    for rim_row in [0, CYLINDER_ROWS - 1] {
        for segment in 0..CYLINDER_SEGMENTS {
            let column = feature.column_slice(rim_row * CYLINDER_SEGMENTS + segment);
            assert!(
                l1_distance(column, reference) > 1.0,
                "rim row {rim_row} segment {segment} matches the interior"
            );
        }
    }
}

#[test]
fn test_planar_patch_is_homogeneous() {
    let size = 10;
    let cloud = create_plane(size, 0.1);
    let feature = compute_fpfh_feature(&cloud, &SearchParam::Radius { radius: 0.15 });

    let reference = feature.column_slice(5 * size + 5);
    for x in 2..size - 2 {
        for y in 2..size - 2 {
            let column = feature.column_slice(x * size + y);
            assert!(l1_distance(column, reference) < 1e-6);
        }
    }
}

#[test]
fn test_column_order_follows_point_order() {
    let cloud = create_cylinder();
    let reversed: PointCloud<NormalPoint3f> = cloud.points.iter().rev().copied().collect();
    let param = SearchParam::Radius { radius: 0.6 };

    let forward = compute_fpfh_feature(&cloud, &param);
    let backward = compute_fpfh_feature(&reversed, &param);

    let n = cloud.len();
    for i in 0..n {
        assert!(l1_distance(forward.column_slice(i), backward.column_slice(n - 1 - i)) < 1e-9);
    }
}

#[test]
fn test_rtree_and_brute_force_agree() {
    let cloud = create_cylinder();
    let positions = cloud.positions();
    let rtree = RTreeIndex::new(&positions).unwrap();
    let brute_force = BruteForceSearch::new(&positions);
    let param = SearchParam::Radius { radius: 0.6 };

    let from_tree = compute_fpfh_feature_with(&cloud, &rtree, &param, &SilentSink);
    let from_brute = compute_fpfh_feature_with(&cloud, &brute_force, &param, &SilentSink);

    for i in 0..cloud.len() {
        // Squared distances are computed in f32 by each index
        assert!(l1_distance(from_tree.column_slice(i), from_brute.column_slice(i)) < 1e-3);
    }
}

#[test]
fn test_point_cloud_without_normals() {
    let cloud: PointCloud<Point3f> = create_cylinder().positions().into_iter().collect();
    let feature = compute_fpfh_feature(&cloud, &SearchParam::default());

    assert_eq!(feature.dimension(), FPFH_DIMENSION);
    assert_eq!(feature.num(), cloud.len());
    assert!(feature.is_zero());
}

#[test]
fn test_select_matching_subset() {
    let cloud = create_cylinder();
    let feature = compute_fpfh_feature(&cloud, &SearchParam::Radius { radius: 0.6 });

    let subset = feature.select_by_index(&[3, 40, 17]).unwrap();
    assert_eq!(subset.num(), 3);
    assert_eq!(subset.column_slice(1), feature.column_slice(40));
}

/// Column with every section concentrated in its middle bin, the descriptor
/// of a point whose valid pairs all have coplanar normals
fn assert_flat_descriptor(column: &[f64]) {
    for (bin, &value) in column.iter().enumerate() {
        let expected = if bin % HISTOGRAM_BINS == HISTOGRAM_BINS / 2 { 100.0 } else { 0.0 };
        assert_relative_eq!(value, expected, epsilon = 1e-9);
    }
}

#[test]
fn test_large_planar_grid() {
    let size = 300;
    let cloud = create_plane(size, 0.01);
    let feature = compute_fpfh_feature(&cloud, &SearchParam::Knn { k: 10 });

    assert_eq!(feature.dimension(), FPFH_DIMENSION);
    assert_eq!(feature.num(), size * size);
    for i in 0..feature.num() {
        assert_flat_descriptor(feature.column_slice(i));
    }
}

#[test]
fn test_many_coincident_points() {
    let duplicates = 400;
    let mut cloud: PointCloud<NormalPoint3f> = (0..duplicates)
        .map(|_| NormalPoint3f::new(Point3f::origin(), Vector3f::z()))
        .collect();
    cloud.push(NormalPoint3f::new(Point3f::new(1.0, 0.0, 0.0), Vector3f::z()));

    let feature = compute_fpfh_feature(&cloud, &SearchParam::Knn { k: 10 });

    assert_eq!(feature.dimension(), FPFH_DIMENSION);
    assert_eq!(feature.num(), duplicates + 1);
    // Every neighbor of a duplicate sits at distance zero
    for i in 0..duplicates {
        assert!(feature.column_slice(i).iter().all(|&v| v == 0.0));
    }
    assert_flat_descriptor(feature.column_slice(duplicates));
}
