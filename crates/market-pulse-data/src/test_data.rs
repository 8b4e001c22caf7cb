use std::io::Write;

use tempfile::NamedTempFile;
use tracing::info;

use super::error::Result;
use crate::{BoundingBox, ClinicPoint, Coordinate, MapDataset};

/// Configuration for synthetic dataset generation
#[derive(Debug, Clone)]
pub struct TestDatasetConfig {
    /// Number of clinic points to generate
    pub points: usize,
    /// Region the points are spread over
    pub region: BoundingBox,
    /// Fill address, website and Google Maps fields
    pub with_metadata: bool,
}

impl Default for TestDatasetConfig {
    fn default() -> Self {
        Self {
            points: 100,
            region: BoundingBox::BERLIN,
            with_metadata: true,
        }
    }
}

impl TestDatasetConfig {
    /// Minimal data for unit tests
    pub fn minimal() -> Self {
        Self {
            points: 3,
            region: BoundingBox::BERLIN,
            with_metadata: false,
        }
    }

    /// Sample data for integration tests
    pub fn sample() -> Self {
        Self {
            points: 20,
            region: BoundingBox::BERLIN,
            with_metadata: true,
        }
    }
}

/// Lay `n` points on a deterministic grid inside `region`.
///
/// Names are zero-padded (`Praxis 007`) so they sort the same way they are
/// generated.
pub fn grid_points(n: usize, region: BoundingBox) -> Vec<ClinicPoint> {
    if n == 0 {
        return Vec::new();
    }
    let side = (n as f64).sqrt().ceil() as usize;
    let lat_step = (region.max_lat - region.min_lat) / (side + 1) as f64;
    let lon_step = (region.max_lon - region.min_lon) / (side + 1) as f64;

    (0..n)
        .map(|i| {
            let row = i / side;
            let col = i % side;
            let coordinate = Coordinate {
                lat: region.min_lat + lat_step * (row + 1) as f64,
                lon: region.min_lon + lon_step * (col + 1) as f64,
            };
            ClinicPoint::new(format!("Praxis {i:03}"), coordinate)
        })
        .collect()
}

/// Build an in-memory dataset according to `config`.
pub fn build_test_dataset(config: &TestDatasetConfig) -> MapDataset {
    let mut items = grid_points(config.points, config.region);
    if config.with_metadata {
        for (i, item) in items.iter_mut().enumerate() {
            item.address = Some(format!("Teststraße {}, 10{:03} Berlin", i + 1, i));
            item.website = Some(format!("https://praxis-{i:03}.example"));
            item.gmaps = Some(format!(
                "https://www.google.com/maps/search/?api=1&query={},{}",
                item.lat, item.lon
            ));
        }
    }
    let mut dataset = MapDataset::new(items);
    dataset.source = Some("synthetic test data".to_owned());
    dataset.bbox = Some(config.region);
    dataset
}

/// Create a dataset file in a temporary location.
///
/// The file is removed when the returned handle is dropped.
pub fn create_test_dataset(config: &TestDatasetConfig) -> Result<NamedTempFile> {
    info!("Creating test dataset with config: {:?}", config);
    let dataset = build_test_dataset(config);

    let mut file = NamedTempFile::with_suffix(".json")?;
    serde_json::to_writer(&mut file, &dataset)?;
    file.flush()?;
    Ok(file)
}
