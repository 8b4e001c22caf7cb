//! The competitor map as the landing page uses it.
//!
//! [`CompetitorMap`] loads the static dataset once, wires the geocoder and
//! keeps the render pipeline.
//!
//! ```rust,no_run
//! use market_pulse::{CompetitorMap, LogMap, PulseConfig};
//!
//! # async fn run() -> Result<(), market_pulse::error::PulseError> {
//! let config = PulseConfig::from_env()?;
//! let mut map = CompetitorMap::initialize(&config, LogMap::new())?;
//! map.search("Prenzlauer Berg").await;
//! println!("{}", map.pipeline().status());
//! map.show_all();
//! # Ok(())
//! # }
//! ```

use market_pulse_data::MapDataset;
use tracing::{info, instrument};

use crate::{
    config::PulseConfig,
    error::PulseError,
    geocode::{Geocoder, NominatimGeocoder},
    i18n::Lang,
    map::MapWidget,
    render::{RenderPipeline, SearchResolution},
};

pub struct CompetitorMap<W: MapWidget, G: Geocoder = NominatimGeocoder> {
    pipeline: RenderPipeline<W>,
    geocoder: G,
}

impl<W: MapWidget> CompetitorMap<W, NominatimGeocoder> {
    /// Load the dataset from `config.dataset_path` and use Nominatim.
    #[instrument(name = "Initialize CompetitorMap", skip_all, level = "info")]
    pub fn initialize(config: &PulseConfig, widget: W) -> Result<Self, PulseError> {
        let t_init = std::time::Instant::now();
        let dataset = MapDataset::from_path(&config.dataset_path)?;
        let geocoder = NominatimGeocoder::new(config)?;
        let map = Self::from_parts(dataset, widget, geocoder, config);
        info!(
            elapsed = ?t_init.elapsed(),
            clinics = map.pipeline.points().len(),
            "CompetitorMap ready"
        );
        Ok(map)
    }

    /// Like [`Self::initialize`] but fetches the dataset over HTTP.
    #[cfg(feature = "fetch")]
    #[instrument(name = "Initialize CompetitorMap from URL", skip(config, widget), level = "info")]
    pub async fn initialize_from_url(config: &PulseConfig, widget: W, url: &str) -> Result<Self, PulseError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let dataset = MapDataset::fetch(&client, url).await?;
        let geocoder = NominatimGeocoder::new(config)?;
        Ok(Self::from_parts(dataset, widget, geocoder, config))
    }
}

impl<W: MapWidget, G: Geocoder> CompetitorMap<W, G> {
    pub fn from_parts(dataset: MapDataset, widget: W, geocoder: G, config: &PulseConfig) -> Self {
        Self {
            pipeline: RenderPipeline::from_dataset(dataset, widget, config),
            geocoder,
        }
    }

    /// See [`RenderPipeline::search`]; never stale.
    pub async fn search(&mut self, query: &str) -> SearchResolution {
        self.pipeline.search(&self.geocoder, query).await
    }

    pub fn show_all(&mut self) {
        self.pipeline.show_all();
    }

    pub fn set_language(&mut self, lang: Lang) {
        self.pipeline.set_language(lang);
    }

    pub const fn pipeline(&self) -> &RenderPipeline<W> {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline<W> {
        &mut self.pipeline
    }

    pub const fn geocoder(&self) -> &G {
        &self.geocoder
    }
}
