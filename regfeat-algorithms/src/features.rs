//! Feature extraction algorithms
//!
//! Fast Point Feature Histograms (FPFH) are built in two stages. Every point
//! first gets a Simplified Point Feature Histogram (SPFH) from the pair
//! features between itself and each of its neighbors. The FPFH of a point is
//! then its own SPFH blended with the SPFHs of its neighbors, weighted by
//! inverse distance.
//!
//! Both descriptors are 33 bins long: three 11-bin histograms over the
//! azimuth `θ`, the projected normal term `φ` and the canonical angle `α`.
//! Each sub-histogram is a percentage distribution summing to 100.

use std::f64::consts::PI;
use std::time::Instant;

use nalgebra::{DMatrix, Point3, Vector3, Vector4};
use rayon::prelude::*;
use regfeat_core::{
    DiagnosticSink, Feature, NearestNeighborSearch, Neighborhood, OrientedPoints, SearchParam,
    TracingSink,
};
use tracing::{debug, warn};

use crate::nearest_neighbor::RTreeIndex;

/// Bins per sub-histogram
pub const HISTOGRAM_BINS: usize = 11;

/// Length of an SPFH / FPFH descriptor
pub const FPFH_DIMENSION: usize = 3 * HISTOGRAM_BINS;

/// Mass of each sub-histogram
const HISTOGRAM_TOTAL: f64 = 100.0;

/// Compute the pair features `(θ, φ, α, d)` between two oriented points.
///
/// The point whose normal is closer to the connecting line becomes the
/// source of the local frame, so swapping the two arguments yields the same
/// result. Returns the zero vector when the points coincide or when the
/// source normal is parallel to the connecting line.
pub fn compute_pair_features(
    p1: &Point3<f64>,
    n1: &Vector3<f64>,
    p2: &Point3<f64>,
    n2: &Vector3<f64>,
) -> Vector4<f64> {
    let mut dp2p1 = p2 - p1;
    let distance = dp2p1.norm();
    if distance == 0.0 {
        return Vector4::zeros();
    }

    let angle1 = n1.dot(&dp2p1) / distance;
    let angle2 = n2.dot(&dp2p1) / distance;

    let (source, target, alpha) = if angle1.abs().acos() > angle2.abs().acos() {
        dp2p1 = -dp2p1;
        (n2, n1, -angle2)
    } else {
        (n1, n2, angle1)
    };

    let v = dp2p1.cross(source);
    let v_norm = v.norm();
    if v_norm == 0.0 {
        return Vector4::zeros();
    }
    let v = v / v_norm;
    let w = source.cross(&v);

    let phi = v.dot(target);
    let theta = w.dot(target).atan2(source.dot(target));

    Vector4::new(theta, phi, alpha, distance)
}

/// Histogram bins `[θ, φ, α]` for a pair feature, each in `0..HISTOGRAM_BINS`.
///
/// Values on or past the upper end of their range land in the last bin.
pub fn feature_bins(features: &Vector4<f64>) -> [usize; 3] {
    let bins = HISTOGRAM_BINS as f64;
    [
        clamp_bin((bins * (features[0] + PI) / (2.0 * PI)).floor()),
        clamp_bin((bins * (features[1] + 1.0) * 0.5).floor()),
        clamp_bin((bins * (features[2] + 1.0) * 0.5).floor()),
    ]
}

fn clamp_bin(raw: f64) -> usize {
    // NaN saturates to 0 in the cast
    raw.clamp(0.0, (HISTOGRAM_BINS - 1) as f64) as usize
}

fn query_neighborhoods<C, S>(cloud: &C, search: &S, param: &SearchParam) -> Vec<Neighborhood>
where
    C: OrientedPoints + ?Sized,
    S: NearestNeighborSearch + ?Sized,
{
    let num_points = cloud.num_points();
    let mut neighborhoods: Vec<Neighborhood> = (0..num_points)
        .into_par_iter()
        .map(|i| search.search(&cloud.position(i), param))
        .collect();

    // An index built over another cloud can hand back foreign indices
    let dropped: usize = neighborhoods
        .par_iter_mut()
        .map(|neighborhood| neighborhood.retain_below(num_points))
        .sum();
    if dropped > 0 {
        warn!(dropped, num_points, "ignored neighbor indices outside the point cloud");
    }

    neighborhoods
}

/// Accumulate the SPFH of point `index` into `histogram`.
fn accumulate_spfh<C>(cloud: &C, index: usize, neighborhood: &Neighborhood, histogram: &mut [f64])
where
    C: OrientedPoints + ?Sized,
{
    let Some(normal) = cloud.normal(index) else {
        return;
    };
    let point = cloud.position(index).cast::<f64>();
    let normal = normal.cast::<f64>();

    let pair_features: Vec<Vector4<f64>> = neighborhood
        .others(index)
        .filter_map(|(k, _)| {
            let neighbor_normal = cloud.normal(k)?.cast::<f64>();
            let neighbor = cloud.position(k).cast::<f64>();
            let features = compute_pair_features(&point, &normal, &neighbor, &neighbor_normal);
            // Both degenerate cases come back as the zero vector
            (features[3] != 0.0).then_some(features)
        })
        .collect();

    if pair_features.is_empty() {
        return;
    }

    let increment = HISTOGRAM_TOTAL / pair_features.len() as f64;
    for features in &pair_features {
        for (section, bin) in feature_bins(features).into_iter().enumerate() {
            histogram[section * HISTOGRAM_BINS + bin] += increment;
        }
    }
}

fn spfh_from_neighborhoods<C>(cloud: &C, neighborhoods: &[Neighborhood]) -> Feature
where
    C: OrientedPoints + ?Sized,
{
    let num_points = neighborhoods.len();
    let mut values = vec![0.0; FPFH_DIMENSION * num_points];

    values
        .par_chunks_mut(FPFH_DIMENSION)
        .zip(neighborhoods.par_iter())
        .enumerate()
        .for_each(|(i, (histogram, neighborhood))| {
            accumulate_spfh(cloud, i, neighborhood, histogram);
        });

    Feature::from_data(DMatrix::from_vec(FPFH_DIMENSION, num_points, values))
}

/// Blend the SPFH of point `index` with its neighbors' into `histogram`.
fn accumulate_fpfh(spfh: &Feature, index: usize, neighborhood: &Neighborhood, histogram: &mut [f64]) {
    histogram.copy_from_slice(spfh.column_slice(index));

    let mut weighted = [0.0; FPFH_DIMENSION];
    let mut num_neighbors = 0usize;
    for (k, distance2) in neighborhood.others(index) {
        let distance = f64::from(distance2).sqrt();
        if distance == 0.0 {
            continue;
        }
        for (acc, value) in weighted.iter_mut().zip(spfh.column_slice(k)) {
            *acc += value / distance;
        }
        num_neighbors += 1;
    }

    if num_neighbors == 0 {
        return;
    }

    let inv_count = 1.0 / num_neighbors as f64;
    for (value, acc) in histogram.iter_mut().zip(weighted) {
        *value += acc * inv_count;
    }

    for section in histogram.chunks_mut(HISTOGRAM_BINS) {
        let sum: f64 = section.iter().sum();
        if sum > 0.0 {
            let scale = HISTOGRAM_TOTAL / sum;
            section.iter_mut().for_each(|value| *value *= scale);
        }
    }
}

fn fpfh_from_spfh(spfh: &Feature, neighborhoods: &[Neighborhood]) -> Feature {
    let num_points = neighborhoods.len();
    let mut values = vec![0.0; FPFH_DIMENSION * num_points];

    values
        .par_chunks_mut(FPFH_DIMENSION)
        .zip(neighborhoods.par_iter())
        .enumerate()
        .for_each(|(i, (histogram, neighborhood))| {
            accumulate_fpfh(spfh, i, neighborhood, histogram);
        });

    Feature::from_data(DMatrix::from_vec(FPFH_DIMENSION, num_points, values))
}

fn missing_normals<C>(cloud: &C, sink: &dyn DiagnosticSink) -> Feature
where
    C: OrientedPoints + ?Sized,
{
    sink.report("FPFH feature computation failed: input point cloud has no normals");
    Feature::zeros(FPFH_DIMENSION, cloud.num_points())
}

/// Compute the Simplified Point Feature Histogram of every point.
///
/// Column `i` of the result is the SPFH of point `i`. Points without a
/// neighbor other than themselves, or whose every pair is degenerate, get an
/// all-zero column. The cloud is expected to carry normals.
pub fn compute_spfh_feature<C, S>(cloud: &C, search: &S, param: &SearchParam) -> Feature
where
    C: OrientedPoints + ?Sized,
    S: NearestNeighborSearch + ?Sized,
{
    let neighborhoods = query_neighborhoods(cloud, search, param);
    spfh_from_neighborhoods(cloud, &neighborhoods)
}

/// Compute FPFH features using a caller supplied index and diagnostic sink.
///
/// `search` must index the positions of `cloud` in the same order. Neighbor
/// indices it returns that fall outside the cloud are ignored. If the cloud
/// has no normals, `sink` is told so and a zero matrix is returned.
#[tracing::instrument(skip_all, fields(points = cloud.num_points()))]
pub fn compute_fpfh_feature_with<C, S>(
    cloud: &C,
    search: &S,
    param: &SearchParam,
    sink: &dyn DiagnosticSink,
) -> Feature
where
    C: OrientedPoints + ?Sized,
    S: NearestNeighborSearch + ?Sized,
{
    if !cloud.has_normals() {
        return missing_normals(cloud, sink);
    }

    let start = Instant::now();
    let neighborhoods = query_neighborhoods(cloud, search, param);
    debug!(elapsed = ?start.elapsed(), "queried neighborhoods");

    let start = Instant::now();
    let spfh = spfh_from_neighborhoods(cloud, &neighborhoods);
    debug!(elapsed = ?start.elapsed(), "computed SPFH");

    let start = Instant::now();
    let fpfh = fpfh_from_spfh(&spfh, &neighborhoods);
    debug!(elapsed = ?start.elapsed(), "computed FPFH");

    fpfh
}

/// Compute Fast Point Feature Histograms for every point of `cloud`.
///
/// Builds a R*-tree over the cloud and returns a `33 x N` feature matrix
/// whose column `i` describes point `i`. Clouds without normals produce an
/// all-zero matrix and a warning through `tracing`.
///
/// # Example
/// ```rust
/// use regfeat_core::{NormalPoint3f, Point3f, PointCloud, SearchParam, Vector3f};
/// use regfeat_algorithms::compute_fpfh_feature;
///
/// let cloud: PointCloud<NormalPoint3f> = (0..5)
///     .flat_map(|x| (0..5).map(move |y| (x, y)))
///     .map(|(x, y)| NormalPoint3f::new(
///         Point3f::new(x as f32 * 0.1, y as f32 * 0.1, 0.0),
///         Vector3f::z(),
///     ))
///     .collect();
///
/// let feature = compute_fpfh_feature(&cloud, &SearchParam::Knn { k: 8 });
/// assert_eq!(feature.dimension(), 33);
/// assert_eq!(feature.num(), 25);
/// ```
pub fn compute_fpfh_feature<C>(cloud: &C, param: &SearchParam) -> Feature
where
    C: OrientedPoints + ?Sized,
{
    let sink = TracingSink;
    if !cloud.has_normals() {
        return missing_normals(cloud, &sink);
    }

    match RTreeIndex::from_cloud(cloud) {
        Ok(rtree) => compute_fpfh_feature_with(cloud, &rtree, param, &sink),
        Err(err) => {
            sink.report(&format!("FPFH feature computation failed: {err}"));
            Feature::zeros(FPFH_DIMENSION, cloud.num_points())
        }
    }
}
