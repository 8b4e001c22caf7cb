//! Resolving free-text addresses to coordinates.
//!
//! Callers only see [`GeocodeOutcome`]: a miss and a failing service both
//! come back as [`GeocodeOutcome::NotFound`], with the reason kept for logs.

use std::fmt;
use std::future::Future;

use market_pulse_data::Coordinate;

mod nominatim;

pub use nominatim::{NominatimGeocoder, NominatimMatch, parse_first_match};

/// Why a query did not produce a coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The service answered but had no usable match.
    NoMatch,
    /// Transport, status or decoding failure.
    ServiceUnavailable(String),
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatch => f.write_str("no match"),
            Self::ServiceUnavailable(reason) => write!(f, "service unavailable: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Found(Coordinate),
    NotFound(NotFoundReason),
}

impl GeocodeOutcome {
    pub const fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Found(coordinate) => Some(*coordinate),
            Self::NotFound(_) => None,
        }
    }

    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl From<Option<Coordinate>> for GeocodeOutcome {
    fn from(value: Option<Coordinate>) -> Self {
        value.map_or(Self::NotFound(NotFoundReason::NoMatch), Self::Found)
    }
}

/// A provider that turns a query into a single best coordinate.
///
/// Implementations issue at most one request per call and never retry.
pub trait Geocoder {
    fn geocode(&self, query: &str) -> impl Future<Output = GeocodeOutcome> + Send;
}
