//! Neighbor search parameters and query results

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Neighborhood definition forwarded to a [`NearestNeighborSearch`] index.
///
/// [`NearestNeighborSearch`]: crate::NearestNeighborSearch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SearchParam {
    /// The `k` nearest points, the query point included
    Knn { k: usize },
    /// Every point within `radius`
    Radius { radius: f32 },
    /// At most `max_nn` points within `radius`, nearest first
    Hybrid { radius: f32, max_nn: usize },
}

impl SearchParam {
    /// K nearest neighbors search
    pub fn knn(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(Error::InvalidSearchParam(
                "k must be greater than 0".to_string()
            ));
        }
        Ok(Self::Knn { k })
    }

    /// Fixed radius search
    pub fn radius(radius: f32) -> Result<Self> {
        check_radius(radius)?;
        Ok(Self::Radius { radius })
    }

    /// Radius search capped at `max_nn` results
    pub fn hybrid(radius: f32, max_nn: usize) -> Result<Self> {
        check_radius(radius)?;
        if max_nn == 0 {
            return Err(Error::InvalidSearchParam(
                "max_nn must be greater than 0".to_string()
            ));
        }
        Ok(Self::Hybrid { radius, max_nn })
    }
}

impl Default for SearchParam {
    fn default() -> Self {
        Self::Knn { k: 30 }
    }
}

fn check_radius(radius: f32) -> Result<()> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::InvalidSearchParam(format!(
            "radius must be positive and finite, got {radius}"
        )));
    }
    Ok(())
}

/// Result of a neighbor query.
///
/// `indices[k]` pairs with `distances2[k]`, the squared distance to the
/// query. Entries are ordered nearest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Neighborhood {
    pub indices: Vec<usize>,
    pub distances2: Vec<f32>,
}

impl Neighborhood {
    /// Split `(index, squared_distance)` pairs into the paired sequences
    pub fn from_pairs(pairs: Vec<(usize, f32)>) -> Self {
        let (indices, distances2) = pairs.into_iter().unzip();
        Self { indices, distances2 }
    }

    /// Number of entries, the query point included
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Drop entries whose index is not below `num_points`.
    ///
    /// Returns how many entries were removed.
    pub fn retain_below(&mut self, num_points: usize) -> usize {
        let before = self.len();
        let (indices, distances2) = self
            .indices
            .iter()
            .copied()
            .zip(self.distances2.iter().copied())
            .filter(|&(index, _)| index < num_points)
            .unzip();
        self.indices = indices;
        self.distances2 = distances2;
        before - self.len()
    }

    /// Entries other than `query_index`, as `(index, squared_distance)`
    pub fn others(&self, query_index: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.indices
            .iter()
            .copied()
            .zip(self.distances2.iter().copied())
            .filter(move |&(index, _)| index != query_index)
    }
}
