//! Per-point feature matrix

use crate::{Error, Result};
use nalgebra::{DMatrix, DVectorView};
use serde::{Deserialize, Serialize};

/// Dense per-point descriptors.
///
/// Stored as a `dimension x num` matrix: column `i` holds the descriptor of
/// point `i` of the cloud it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    data: DMatrix<f64>,
}

impl Feature {
    /// All-zero feature matrix
    pub fn zeros(dimension: usize, num: usize) -> Self {
        Self {
            data: DMatrix::zeros(dimension, num),
        }
    }

    /// Wrap an existing `dimension x num` matrix
    pub fn from_data(data: DMatrix<f64>) -> Self {
        Self { data }
    }

    /// Build from descriptors laid out one after another, point by point.
    pub fn from_columns_slice(dimension: usize, num: usize, values: &[f64]) -> Result<Self> {
        if values.len() != dimension * num {
            return Err(Error::DimensionMismatch {
                expected: dimension * num,
                actual: values.len(),
            });
        }
        Ok(Self {
            data: DMatrix::from_column_slice(dimension, num, values),
        })
    }

    /// Length of each descriptor
    pub fn dimension(&self) -> usize {
        self.data.nrows()
    }

    /// Number of descriptors (points)
    pub fn num(&self) -> usize {
        self.data.ncols()
    }

    /// Descriptor of point `index`
    pub fn column(&self, index: usize) -> DVectorView<'_, f64> {
        self.data.column(index)
    }

    /// Descriptor of point `index` as a contiguous slice
    pub fn column_slice(&self, index: usize) -> &[f64] {
        let dimension = self.dimension();
        &self.data.as_slice()[index * dimension..(index + 1) * dimension]
    }

    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn into_data(self) -> DMatrix<f64> {
        self.data
    }

    /// Whether every entry is zero
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&v| v == 0.0)
    }

    /// Sub-feature holding the descriptors of `indices`, in that order.
    pub fn select_by_index(&self, indices: &[usize]) -> Result<Self> {
        let num = self.num();
        if let Some(&index) = indices.iter().find(|&&index| index >= num) {
            return Err(Error::IndexOutOfRange { index, len: num });
        }

        let dimension = self.dimension();
        let mut values = Vec::with_capacity(dimension * indices.len());
        for &index in indices {
            values.extend_from_slice(self.column_slice(index));
        }
        Self::from_columns_slice(dimension, indices.len(), &values)
    }
}
