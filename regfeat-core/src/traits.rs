//! Core traits for regfeat

use crate::point::*;
use crate::search::{Neighborhood, SearchParam};

/// Read access to an index-addressable set of oriented points.
///
/// Index order is stable: it is the shared key between the cloud, any
/// neighbor index built over it and the columns of a feature matrix.
pub trait OrientedPoints: Sync {
    /// Number of points
    fn num_points(&self) -> usize;

    /// Position of the point at `index`
    fn position(&self, index: usize) -> Point3f;

    /// Unit normal of the point at `index`, if the cloud carries normals
    fn normal(&self, index: usize) -> Option<Vector3f>;

    /// Whether every point has a normal
    fn has_normals(&self) -> bool;
}

/// Trait for nearest neighbor search functionality
///
/// Distances returned by the `find_*` methods are squared Euclidean
/// distances, sorted in ascending order.
pub trait NearestNeighborSearch: Sync {
    /// Find the k nearest neighbors to a query point
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)>;

    /// Find all neighbors within a given radius
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)>;

    /// Find at most `max_nn` neighbors within a given radius
    fn find_hybrid_neighbors(&self, query: &Point3f, radius: f32, max_nn: usize) -> Vec<(usize, f32)> {
        let mut neighbors = self.find_radius_neighbors(query, radius);
        neighbors.truncate(max_nn);
        neighbors
    }

    /// Run the query described by `param`.
    ///
    /// When `query` is a point of the indexed cloud the result includes that
    /// point itself at distance zero.
    fn search(&self, query: &Point3f, param: &SearchParam) -> Neighborhood {
        let neighbors = match *param {
            SearchParam::Knn { k } => self.find_k_nearest(query, k),
            SearchParam::Radius { radius } => self.find_radius_neighbors(query, radius),
            SearchParam::Hybrid { radius, max_nn } => {
                self.find_hybrid_neighbors(query, radius, max_nn)
            }
        };
        Neighborhood::from_pairs(neighbors)
    }
}
