//! Market Pulse - competitor map core for the DentalMarketPulse landing page
//!
//! The landing page shows every competitor clinic in Berlin on a map and lets
//! a visitor type an address to see the 15 clinics closest to it. This crate
//! holds everything behind that map that is not drawing pixels:
//!
//! - **Distance & selection**: haversine distance and stable nearest-k
//!   selection over the static clinic collection
//! - **Geocoding**: a bounded Nominatim lookup behind the [`Geocoder`] trait
//! - **Render pipeline**: the "all points" / "nearest to" state machine that
//!   drives any [`MapWidget`], ignoring answers to superseded searches
//! - **Lead capture**: form-backend POST with a mail-client fallback
//!
//! # Quick Start
//!
//! ```rust
//! use market_pulse::{
//!     ClinicPoint, Coordinate, GeocodeOutcome, LogMap, PulseConfig, RenderPipeline,
//! };
//!
//! let clinics = vec![
//!     ClinicPoint::new("Praxis am Alex", Coordinate { lat: 52.5219, lon: 13.4132 }),
//!     ClinicPoint::new("Praxis Pankow", Coordinate { lat: 52.5693, lon: 13.4023 }),
//! ];
//! let mut pipeline = RenderPipeline::new(clinics, LogMap::new(), &PulseConfig::default());
//! assert_eq!(pipeline.status(), "Alle Punkte: 2");
//!
//! let ticket = pipeline.begin_search("Alexanderplatz").unwrap();
//! pipeline.complete_search(ticket, GeocodeOutcome::Found(Coordinate { lat: 52.5219, lon: 13.4132 }));
//! assert_eq!(pipeline.status(), "Zeige 2 nächste Praxen zu: Alexanderplatz");
//! ```
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, filter::Directive, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
mod geo;
mod geocode;
mod i18n;
mod lead;
mod map;
mod render;

pub use crate::core::CompetitorMap;

pub use config::{MIN_RADIUS_M, NOMINATIM_URL, PulseConfig, PulseConfigBuilder};
pub use geo::{DEFAULT_K, EARTH_RADIUS_KM, Ranked, distance_km, farthest_km, nearest, nearest_with_distance};
pub use geocode::{GeocodeOutcome, Geocoder, NominatimGeocoder, NominatimMatch, NotFoundReason, parse_first_match};
pub use i18n::{Lang, Strings};
pub use lead::{
    Confirmation, FormspreeTransport, LeadError, LeadForm, LeadOutcome, LeadPayload, LeadSubmitter,
    LeadTransport, MailDraft, prefill_notes,
};
pub use map::{BOUNDS_PAD, LogMap, MapWidget, Overlay, OverlayHandle, escape_html, padded_bounds, popup_html};
pub use market_pulse_data as data;
pub use market_pulse_data::{BoundingBox, ClinicPoint, Coordinate, MapDataset};
pub use render::{MapViewState, RenderPipeline, SearchResolution, SearchTicket, ViewPhase};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the map core.
///
/// `RUST_LOG` takes precedence over `level` when set. Safe to call more than
/// once; only the first call installs the subscriber.
///
/// ```rust
/// use market_pulse::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), market_pulse::error::PulseError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::PulseError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse::<Directive>()?)
            .add_directive("reqwest=warn".parse::<Directive>()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        setup_test_env();
        assert!(init_logging(tracing::Level::DEBUG).is_ok());
    }

    #[test]
    fn test_default_k_matches_config() {
        setup_test_env();
        assert_eq!(PulseConfig::default().nearest_k, DEFAULT_K);
        assert_eq!(DEFAULT_K, 15);
    }
}
