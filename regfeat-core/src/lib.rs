//! Core data structures and traits for regfeat
//!
//! This crate provides the fundamental types consumed by the feature pipeline:
//! oriented points, point clouds, neighbor search traits and parameters,
//! the feature matrix container and the diagnostic sink.

pub mod point;
pub mod point_cloud;
pub mod traits;
pub mod search;
pub mod feature;
pub mod diagnostics;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use traits::*;
pub use search::*;
pub use feature::*;
pub use diagnostics::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Vector4, DMatrix};
