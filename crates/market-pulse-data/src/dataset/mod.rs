use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{BoundingBox, ClinicPoint, DataError, Result};

#[cfg(feature = "fetch")]
pub mod fetch;

/// The static competitor file delivered alongside the landing page.
///
/// Only `items` is required; `source`, `bbox` and `count` are written by the
/// exporter and kept for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapDataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub items: Vec<ClinicPoint>,
}

impl MapDataset {
    pub fn new(items: Vec<ClinicPoint>) -> Self {
        Self {
            source: None,
            bbox: None,
            count: Some(items.len()),
            items,
        }
    }

    /// Parse and validate a dataset from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let dataset: Self = serde_json::from_slice(bytes)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// Load the dataset from a file on disk.
    #[instrument(name = "Load map dataset", skip_all, fields(path = %path.as_ref().display()), level = "info")]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        let dataset = Self::from_slice(&bytes)?;
        info!(items = dataset.len(), "Loaded map dataset");
        Ok(dataset)
    }

    /// Reject items that cannot be placed on a map.
    fn validate(&self) -> Result<()> {
        for (index, item) in self.items.iter().enumerate() {
            if item.name.trim().is_empty() {
                return Err(DataError::InvalidItem {
                    index,
                    name: item.name.clone(),
                    reason: "empty name".to_owned(),
                });
            }
            if !item.coordinate().is_valid() {
                return Err(DataError::InvalidItem {
                    index,
                    name: item.name.clone(),
                    reason: format!("coordinate out of range: {}", item.coordinate()),
                });
            }
        }

        if let Some(count) = self.count
            && count != self.items.len()
        {
            warn!(
                declared = count,
                actual = self.items.len(),
                "Dataset count does not match number of items"
            );
        }

        if let Some(bbox) = self.bbox {
            let outside = self
                .items
                .iter()
                .filter(|item| !bbox.contains(item.coordinate()))
                .count();
            if outside > 0 {
                warn!(outside, "Dataset items fall outside the declared bbox");
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<ClinicPoint> {
        self.items
    }
}

impl From<Vec<ClinicPoint>> for MapDataset {
    fn from(items: Vec<ClinicPoint>) -> Self {
        Self::new(items)
    }
}
