use std::path::PathBuf;
use std::time::Duration;

use market_pulse_data::{BoundingBox, DATASET_PATH_DEFAULT};
use serde::{Deserialize, Serialize};

use crate::{error::PulseError, geo::DEFAULT_K, i18n::Lang};

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Smallest focus circle drawn around a searched address, in metres.
pub const MIN_RADIUS_M: f64 = 1200.0;

/// Runtime settings for the map and the lead form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Base URL of the Nominatim-compatible geocoding service
    pub geocoder_url: String,
    /// Sent with every geocoding request (Nominatim requires one)
    pub user_agent: String,
    pub request_timeout: Duration,
    /// Geocoding is bounded to this region
    pub region: BoundingBox,
    /// How many competitors to show around a searched address
    pub nearest_k: usize,
    pub min_radius_m: f64,
    pub default_lang: Lang,
    /// Form backend (e.g. Formspree); `None` goes straight to the mail fallback
    pub form_endpoint: Option<String>,
    /// Recipient of the mail-client fallback draft
    pub mailto: Option<String>,
    pub dataset_path: PathBuf,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            geocoder_url: NOMINATIM_URL.to_owned(),
            user_agent: concat!("market-pulse/", env!("CARGO_PKG_VERSION")).to_owned(),
            request_timeout: Duration::from_secs(10),
            region: BoundingBox::BERLIN,
            nearest_k: DEFAULT_K,
            min_radius_m: MIN_RADIUS_M,
            default_lang: Lang::De,
            form_endpoint: None,
            mailto: None,
            dataset_path: PathBuf::from(DATASET_PATH_DEFAULT),
        }
    }
}

impl PulseConfig {
    pub fn builder() -> PulseConfigBuilder {
        PulseConfigBuilder::new()
    }

    /// Defaults overridden by `PULSE_*` environment variables.
    pub fn from_env() -> Result<Self, PulseError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    ///
    /// Recognised keys: `PULSE_GEOCODER_URL`, `PULSE_FORM_ENDPOINT`,
    /// `PULSE_MAILTO`, `PULSE_DATASET`, `PULSE_LANG`, `PULSE_NEAREST_K`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PulseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let mut builder = PulseConfigBuilder::new();
        if let Some(url) = get("PULSE_GEOCODER_URL") {
            builder = builder.geocoder_url(url);
        }
        if let Some(endpoint) = get("PULSE_FORM_ENDPOINT") {
            builder = builder.form_endpoint(endpoint);
        }
        if let Some(to) = get("PULSE_MAILTO") {
            builder = builder.mailto(to);
        }
        if let Some(path) = get("PULSE_DATASET") {
            builder = builder.dataset_path(path);
        }
        if let Some(lang) = get("PULSE_LANG") {
            builder = builder.default_lang(lang.parse()?);
        }
        if let Some(k) = get("PULSE_NEAREST_K") {
            let k = k
                .parse()
                .map_err(|e| PulseError::Config(format!("PULSE_NEAREST_K={k:?}: {e}")))?;
            builder = builder.nearest_k(k);
        }
        builder.build()
    }
}

/// Builder for [`PulseConfig`]; `build` validates the result.
#[derive(Debug, Clone, Default)]
pub struct PulseConfigBuilder {
    config: PulseConfig,
}

impl PulseConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PulseConfig::default(),
        }
    }

    pub fn geocoder_url(mut self, url: impl Into<String>) -> Self {
        self.config.geocoder_url = url.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn region(mut self, region: BoundingBox) -> Self {
        self.config.region = region;
        self
    }

    pub fn nearest_k(mut self, k: usize) -> Self {
        self.config.nearest_k = k;
        self
    }

    pub fn min_radius_m(mut self, meters: f64) -> Self {
        self.config.min_radius_m = meters;
        self
    }

    pub fn default_lang(mut self, lang: Lang) -> Self {
        self.config.default_lang = lang;
        self
    }

    pub fn form_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.form_endpoint = Some(endpoint.into());
        self
    }

    pub fn mailto(mut self, recipient: impl Into<String>) -> Self {
        self.config.mailto = Some(recipient.into());
        self
    }

    pub fn dataset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.dataset_path = path.into();
        self
    }

    pub fn build(self) -> Result<PulseConfig, PulseError> {
        let config = self.config;
        if config.nearest_k == 0 {
            return Err(PulseError::Config("nearest_k must be at least 1".to_owned()));
        }
        if !config.min_radius_m.is_finite() || config.min_radius_m < 0.0 {
            return Err(PulseError::Config(format!(
                "min_radius_m must be a non-negative number, got {}",
                config.min_radius_m
            )));
        }
        if config.geocoder_url.trim().is_empty() {
            return Err(PulseError::Config("geocoder_url is empty".to_owned()));
        }
        if config.form_endpoint.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(PulseError::Config("form_endpoint is empty".to_owned()));
        }
        if config.region.min_lat >= config.region.max_lat
            || config.region.min_lon >= config.region.max_lon
        {
            return Err(PulseError::Config(format!(
                "region is degenerate: {:?}",
                config.region
            )));
        }
        Ok(config)
    }
}
