//! Point cloud data structures and functionality

use crate::point::*;
use crate::traits::OrientedPoints;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A generic point cloud container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

/// A point cloud with 3D points
pub type PointCloud3f = PointCloud<Point3f>;

/// A point cloud with normal vectors
pub type NormalPointCloud3f = PointCloud<NormalPoint3f>;

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
        }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.points.iter()
    }
}

impl PointCloud<NormalPoint3f> {
    /// Build an oriented cloud from parallel position and normal slices.
    ///
    /// Both slices must have the same length; the pairing is by index.
    pub fn from_positions_and_normals(
        positions: &[Point3f],
        normals: &[Vector3f],
    ) -> crate::Result<Self> {
        if positions.len() != normals.len() {
            return Err(crate::Error::DimensionMismatch {
                expected: positions.len(),
                actual: normals.len(),
            });
        }

        Ok(positions
            .iter()
            .zip(normals)
            .map(|(position, normal)| NormalPoint3f::new(*position, *normal))
            .collect())
    }

    /// Positions of all points, in index order
    pub fn positions(&self) -> Vec<Point3f> {
        self.points.iter().map(|p| p.position).collect()
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<T> IndexMut<usize> for PointCloud<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.points[index]
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}

impl OrientedPoints for PointCloud<NormalPoint3f> {
    fn num_points(&self) -> usize {
        self.points.len()
    }

    fn position(&self, index: usize) -> Point3f {
        self.points[index].position
    }

    fn normal(&self, index: usize) -> Option<Vector3f> {
        Some(self.points[index].normal)
    }

    fn has_normals(&self) -> bool {
        !self.points.is_empty()
    }
}

impl OrientedPoints for PointCloud<Point3f> {
    fn num_points(&self) -> usize {
        self.points.len()
    }

    fn position(&self, index: usize) -> Point3f {
        self.points[index]
    }

    fn normal(&self, _index: usize) -> Option<Vector3f> {
        None
    }

    fn has_normals(&self) -> bool {
        false
    }
}
