//! # regfeat Algorithms
//!
//! Neighbor search and point feature algorithms for 3D point clouds.
//!
//! The main entry point is [`compute_fpfh_feature`], which turns an oriented
//! point cloud into a 33 x N matrix of Fast Point Feature Histograms used to
//! match points between clouds during registration.

pub mod nearest_neighbor;
pub mod features;

// Re-export commonly used items
pub use nearest_neighbor::*;
pub use features::*;
