//! Static competitor dataset for the DentalMarketPulse map.
//!
//! The landing page ships a pre-built JSON file (`{"items": [...]}`) with one
//! record per competitor clinic. This crate owns that schema, the value types
//! the map core works with, and helpers that generate synthetic datasets for
//! tests.
mod dataset;
mod error;
mod model;
pub mod test_data;

pub use dataset::MapDataset;
pub use error::{DataError, Result};
pub use model::{BoundingBox, ClinicPoint, Coordinate};
pub use test_data::{TestDatasetConfig, create_test_dataset};

/// Where the landing page serves the dataset from.
pub const DATASET_PATH_DEFAULT: &str = "assets/berlin_dentists_map.json";

