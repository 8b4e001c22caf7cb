//! Value types shared by the dataset and the map core.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{DataError, Result};

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// ```rust
    /// use market_pulse_data::Coordinate;
    ///
    /// let alex = Coordinate::new(52.5219, 13.4132)?;
    /// assert!(Coordinate::new(91.0, 0.0).is_err());
    /// # Ok::<(), market_pulse_data::DataError>(())
    /// ```
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let coordinate = Self { lat, lon };
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(DataError::InvalidCoordinate { lat, lon })
        }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// Axis-aligned lat/lon box used to bound geocoding and the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Approximate Berlin city limits.
    pub const BERLIN: Self = Self {
        min_lat: 52.3383,
        max_lat: 52.6755,
        min_lon: 13.0884,
        max_lon: 13.7612,
    };

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coordinate.lat)
            && (self.min_lon..=self.max_lon).contains(&coordinate.lon)
    }

    /// Geocoder viewbox in `left,top,right,bottom` order.
    pub fn viewbox(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.max_lat, self.max_lon, self.min_lat
        )
    }

    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lon: (self.min_lon + self.max_lon) / 2.0,
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::BERLIN
    }
}

/// One competitor clinic on the map.
///
/// Field names follow the static dataset file, so `gmaps` holds the Google
/// Maps link. Optional fields exported as empty strings load as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicPoint {
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
    pub gmaps: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl ClinicPoint {
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            address: None,
            website: None,
            gmaps: None,
            lat: coordinate.lat,
            lon: coordinate.lon,
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    #[must_use]
    pub fn with_gmaps(mut self, gmaps: impl Into<String>) -> Self {
        self.gmaps = Some(gmaps.into());
        self
    }

    pub const fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

impl fmt::Display for ClinicPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.coordinate())
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty()))
}
