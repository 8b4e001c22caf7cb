//! Show the clinics nearest to an address on a log-only map.
//!
//! Run with a dataset exported by the landing-page build:
//!
//! ```sh
//! PULSE_DATASET=landing/assets/berlin_dentists_map.json \
//!     cargo run --example nearest_competitors -- "Friedrichstraße 123"
//! ```
//!
//! Without `PULSE_DATASET` a synthetic Berlin dataset is used.

use market_pulse::data::test_data::{TestDatasetConfig, build_test_dataset};
use market_pulse::{
    CompetitorMap, LogMap, MapDataset, MapViewState, NominatimGeocoder, PulseConfig,
    SearchResolution, distance_km, error::PulseError, init_logging,
};
use tracing::Level;

#[tokio::main]
async fn main() -> Result<(), PulseError> {
    init_logging(Level::INFO)?;

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Alexanderplatz".to_owned());
    let config = PulseConfig::from_env()?;

    let dataset = if std::env::var_os("PULSE_DATASET").is_some() {
        MapDataset::from_path(&config.dataset_path)?
    } else {
        build_test_dataset(&TestDatasetConfig::default())
    };
    let geocoder = NominatimGeocoder::new(&config)?;
    let mut map = CompetitorMap::from_parts(dataset, LogMap::new(), geocoder, &config);
    println!("{}", map.pipeline().status());

    match map.search(&query).await {
        SearchResolution::Displayed { count, radius_m } => {
            println!("{} ({count} shown, radius {radius_m:.0} m)", map.pipeline().status());
            if let MapViewState::NearestTo { origin, results, .. } = map.pipeline().state() {
                for (i, clinic) in results.iter().enumerate() {
                    println!(
                        "{:>2}. {:<40} {:>6.2} km  {}",
                        i + 1,
                        clinic.name,
                        distance_km(*origin, clinic.coordinate()),
                        clinic.address.as_deref().unwrap_or("")
                    );
                }
            }
        }
        SearchResolution::NotFound(reason) => {
            println!("{} ({reason})", map.pipeline().status());
        }
        SearchResolution::Ignored | SearchResolution::Stale => {}
    }

    map.show_all();
    println!("{}", map.pipeline().status());
    Ok(())
}
