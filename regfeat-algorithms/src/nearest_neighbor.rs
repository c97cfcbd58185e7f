//! Nearest neighbor search implementations

use std::cmp::Ordering;

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use regfeat_core::{Error, NearestNeighborSearch, OrientedPoints, Point3f, Result};

/// A point with its index for spatial data structures
#[derive(Debug, Clone, PartialEq)]
struct IndexedPoint {
    point: Point3f,
    index: usize,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f32; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.point.x, self.point.y, self.point.z])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.point.x - point[0];
        let dy = self.point.y - point[1];
        let dz = self.point.z - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Order by squared distance, then by index among ties
fn sort_by_distance(neighbors: &mut [(usize, f32)]) {
    neighbors.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
}

/// Spatial index for nearest neighbor search
///
/// Backed by an R*-tree, which stays balanced when many points share a
/// coordinate or coincide outright.
pub struct RTreeIndex {
    tree: RTree<IndexedPoint>,
}

impl RTreeIndex {
    pub fn new(points: &[Point3f]) -> Result<Self> {
        if let Some(index) = points.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(Error::InvalidData(format!(
                "point {index} has a non-finite coordinate"
            )));
        }

        let indexed: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(index, &point)| IndexedPoint { point, index })
            .collect();

        Ok(Self {
            tree: RTree::bulk_load(indexed),
        })
    }

    /// Build an index over the positions of an oriented cloud
    pub fn from_cloud<C: OrientedPoints + ?Sized>(cloud: &C) -> Result<Self> {
        let positions: Vec<Point3f> = (0..cloud.num_points())
            .map(|i| cloud.position(i))
            .collect();
        Self::new(&positions)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NearestNeighborSearch for RTreeIndex {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        if k == 0 {
            return Vec::new();
        }

        let query = [query.x, query.y, query.z];
        let mut neighbors: Vec<(usize, f32)> = self
            .tree
            .nearest_neighbor_iter(&query)
            .take(k)
            .map(|item| (item.index, item.distance_2(&query)))
            .collect();
        sort_by_distance(&mut neighbors);
        neighbors
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        if radius <= 0.0 {
            return Vec::new();
        }

        let query = [query.x, query.y, query.z];
        let mut neighbors: Vec<(usize, f32)> = self
            .tree
            .locate_within_distance(query, radius * radius)
            .map(|item| (item.index, item.distance_2(&query)))
            .collect();
        sort_by_distance(&mut neighbors);
        neighbors
    }
}

/// Simple brute force nearest neighbor search for small datasets
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    fn sorted_distances(&self, query: &Point3f) -> Vec<(usize, f32)> {
        let mut distances: Vec<(usize, f32)> = self.points
            .iter()
            .enumerate()
            .map(|(idx, point)| (idx, (point - query).norm_squared()))
            .collect();

        // Stable sort keeps index order among equal distances
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        distances
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut distances = self.sorted_distances(query);
        distances.truncate(k);
        distances
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        if radius <= 0.0 {
            return Vec::new();
        }

        let radius_squared = radius * radius;
        let mut distances = self.sorted_distances(query);
        distances.retain(|&(_, d2)| d2 <= radius_squared);
        distances
    }
}
