//! # Engine Crate
//!
//! Item-based collaborative filtering core: the sparse movie x user rating
//! matrix and the nearest-neighbor search over its rows.
//!
//! ## Components
//!
//! - **index**: sorted, bidirectional ID <-> dense index mapping
//! - **matrix**: `RatingMatrix` snapshot (CSR, one row per movie)
//! - **similarity**: distance metrics and brute-force k-NN
//! - **error**: `RecommendError` and its `ErrorKind` classification
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{DuplicatePolicy, Metric, RatingMatrix};
//!
//! let matrix = RatingMatrix::build(dataset.ratings(), DuplicatePolicy::default())?;
//! let similar = matrix.find_similar(1, 10, &Metric::Cosine)?;
//! ```

pub mod error;
pub mod index;
pub mod matrix;
pub mod similarity;

// Re-export commonly used types
pub use error::{Entity, ErrorKind, RecommendError, Result};
pub use index::{IdIndex, IndexMapping};
pub use matrix::{DuplicatePolicy, RatingMatrix, SparseRow, Triplets, build_triplets};
pub use similarity::{DistanceMetric, Metric, Neighbor, select_nearest, top_k};
