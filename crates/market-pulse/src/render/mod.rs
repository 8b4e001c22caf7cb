//! Map view state machine.
//!
//! [`RenderPipeline`] owns the clinic collection, the map widget and the
//! active [`MapViewState`]. User actions are the only inputs: "show all"
//! and address searches. Each display action replaces every marker, so the
//! widget always shows exactly the active state's point set.
//!
//! Searches are split into [`RenderPipeline::begin_search`] and
//! [`RenderPipeline::complete_search`] around the geocoder call. Every
//! search and every "show all" takes a new sequence number, and a geocoder
//! answer is applied only if its ticket is still the latest one. A slow
//! answer for an old query therefore can never overwrite a newer view.

use market_pulse_data::{ClinicPoint, Coordinate, MapDataset};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::PulseConfig,
    geo::{farthest_km, nearest},
    geocode::{GeocodeOutcome, Geocoder, NotFoundReason},
    i18n::Lang,
    map::{MapWidget, Overlay, OverlayHandle},
};

/// What the map is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum MapViewState {
    AllPoints,
    NearestTo {
        query: String,
        origin: Coordinate,
        /// Nearest first, at most `k` long
        results: Vec<ClinicPoint>,
    },
}

/// Identifies one initiated search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(u64);

impl SearchTicket {
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

/// Whether a geocode request is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewPhase {
    Idle,
    Searching { ticket: SearchTicket, query: String },
}

/// How a search ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResolution {
    /// Empty query; nothing happened.
    Ignored,
    /// The nearest clinics are on display.
    Displayed { count: usize, radius_m: f64 },
    /// The address could not be resolved; the previous view stays.
    NotFound(NotFoundReason),
    /// A newer search or "show all" started first; the answer was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy)]
struct FocusOverlay {
    marker: OverlayHandle,
    circle: OverlayHandle,
    radius_m: f64,
}

pub struct RenderPipeline<W: MapWidget> {
    points: Vec<ClinicPoint>,
    widget: W,
    state: MapViewState,
    phase: ViewPhase,
    lang: Lang,
    k: usize,
    min_radius_m: f64,
    status: String,
    visible: usize,
    focus: Option<FocusOverlay>,
    sequence: u64,
}

impl<W: MapWidget> RenderPipeline<W> {
    /// Take ownership of the clinic collection and draw all of it.
    pub fn new(points: Vec<ClinicPoint>, widget: W, config: &PulseConfig) -> Self {
        let mut pipeline = Self {
            points,
            widget,
            state: MapViewState::AllPoints,
            phase: ViewPhase::Idle,
            lang: config.default_lang,
            k: config.nearest_k,
            min_radius_m: config.min_radius_m,
            status: String::new(),
            visible: 0,
            focus: None,
            sequence: 0,
        };
        pipeline.show_all();
        pipeline
    }

    pub fn from_dataset(dataset: MapDataset, widget: W, config: &PulseConfig) -> Self {
        Self::new(dataset.into_items(), widget, config)
    }

    /// Clear any focus overlay and display every clinic.
    ///
    /// Always succeeds and supersedes any search still in flight.
    #[instrument(name = "Show all", skip(self), level = "debug")]
    pub fn show_all(&mut self) {
        self.sequence += 1;
        self.phase = ViewPhase::Idle;
        self.clear_focus();
        self.state = MapViewState::AllPoints;

        self.widget.set_markers(&self.points);
        if !self.points.is_empty() {
            self.widget.fit_bounds(&self.points);
        }
        self.visible = self.points.len();
        self.render_status();
        info!(visible = self.visible, "Showing all clinics");
    }

    /// Start a search for `query`; `None` for a blank query.
    ///
    /// The returned ticket must be handed back to [`Self::complete_search`]
    /// together with the geocoder's answer.
    pub fn begin_search(&mut self, query: &str) -> Option<SearchTicket> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.sequence += 1;
        let ticket = SearchTicket(self.sequence);
        self.phase = ViewPhase::Searching {
            ticket,
            query: query.to_owned(),
        };
        self.status = self.lang.strings().searching.to_owned();
        debug!(?ticket, query, "Search started");
        Some(ticket)
    }

    /// Apply the geocoder's answer for `ticket`.
    #[instrument(name = "Complete search", skip(self, outcome), level = "info")]
    pub fn complete_search(&mut self, ticket: SearchTicket, outcome: GeocodeOutcome) -> SearchResolution {
        let query = match &self.phase {
            ViewPhase::Searching { ticket: current, query } if *current == ticket => query.clone(),
            _ => {
                debug!(?ticket, latest = self.sequence, "Dropping stale geocoder answer");
                return SearchResolution::Stale;
            }
        };
        self.phase = ViewPhase::Idle;

        match outcome {
            GeocodeOutcome::NotFound(reason) => {
                if let NotFoundReason::ServiceUnavailable(detail) = &reason {
                    warn!(%query, %detail, "Geocoder unavailable");
                } else {
                    info!(%query, "Address not found");
                }
                self.status = self.lang.strings().status_not_found.to_owned();
                SearchResolution::NotFound(reason)
            }
            GeocodeOutcome::Found(origin) => {
                let radius_m = self.show_nearest(query, origin);
                SearchResolution::Displayed {
                    count: self.visible,
                    radius_m,
                }
            }
        }
    }

    /// Geocode `query` and show the clinics nearest to it.
    ///
    /// Holds `&mut self` across the lookup, so it never returns
    /// [`SearchResolution::Stale`]. Overlapping searches go through
    /// [`Self::begin_search`] and [`Self::complete_search`].
    pub async fn search<G: Geocoder>(&mut self, geocoder: &G, query: &str) -> SearchResolution {
        let Some(ticket) = self.begin_search(query) else {
            return SearchResolution::Ignored;
        };
        let outcome = geocoder.geocode(query.trim()).await;
        self.complete_search(ticket, outcome)
    }

    fn show_nearest(&mut self, query: String, origin: Coordinate) -> f64 {
        let results = nearest(&self.points, origin, self.k);
        let radius_m = self.min_radius_m.max(farthest_km(origin, &results) * 1000.0);

        self.clear_focus();
        let marker = self.widget.add_overlay(Overlay::FocusMarker { center: origin });
        let circle = self.widget.add_overlay(Overlay::RadiusCircle {
            center: origin,
            radius_m,
        });
        self.focus = Some(FocusOverlay {
            marker,
            circle,
            radius_m,
        });

        self.widget.set_markers(&results);
        if !results.is_empty() {
            self.widget.fit_bounds(&results);
        }
        self.visible = results.len();
        info!(%origin, count = results.len(), radius_m, "Showing nearest clinics");

        self.state = MapViewState::NearestTo {
            query,
            origin,
            results,
        };
        self.render_status();
        radius_m
    }

    fn clear_focus(&mut self) {
        if let Some(focus) = self.focus.take() {
            self.widget.remove_overlay(focus.marker);
            self.widget.remove_overlay(focus.circle);
        }
    }

    /// Switch language and re-render the status line of the current view.
    pub fn set_language(&mut self, lang: Lang) {
        self.lang = lang;
        if matches!(self.phase, ViewPhase::Idle) {
            self.render_status();
        }
    }

    fn render_status(&mut self) {
        let strings = self.lang.strings();
        self.status = match &self.state {
            MapViewState::AllPoints => strings.status_all(self.points.len()),
            MapViewState::NearestTo { query, results, .. } => {
                strings.status_nearest(results.len(), query)
            }
        };
    }

    pub const fn state(&self) -> &MapViewState {
        &self.state
    }

    pub const fn phase(&self) -> &ViewPhase {
        &self.phase
    }

    pub const fn is_searching(&self) -> bool {
        matches!(self.phase, ViewPhase::Searching { .. })
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Number of clinic markers currently on the map.
    pub const fn visible_count(&self) -> usize {
        self.visible
    }

    /// Radius of the focus circle, if a search result is on display.
    pub fn focus_radius_m(&self) -> Option<f64> {
        self.focus.map(|f| f.radius_m)
    }

    pub const fn lang(&self) -> Lang {
        self.lang
    }

    pub fn points(&self) -> &[ClinicPoint] {
        &self.points
    }

    pub const fn widget(&self) -> &W {
        &self.widget
    }

    pub fn into_widget(self) -> W {
        self.widget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::LogMap;

    fn points() -> Vec<ClinicPoint> {
        vec![
            ClinicPoint::new("Mitte", Coordinate { lat: 52.52, lon: 13.405 }),
            ClinicPoint::new("Pankow", Coordinate { lat: 52.569, lon: 13.402 }),
            ClinicPoint::new("Neukölln", Coordinate { lat: 52.481, lon: 13.435 }),
        ]
    }

    fn pipeline() -> RenderPipeline<LogMap> {
        RenderPipeline::new(points(), LogMap::new(), &PulseConfig::default())
    }

    #[test]
    fn test_initial_view_shows_everything() {
        let pipeline = pipeline();
        assert_eq!(pipeline.state(), &MapViewState::AllPoints);
        assert_eq!(pipeline.visible_count(), 3);
        assert_eq!(pipeline.status(), "Alle Punkte: 3");
        assert_eq!(pipeline.widget().marker_count(), 3);
        assert!(!pipeline.is_searching());
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let mut pipeline = pipeline();
        assert_eq!(pipeline.begin_search("  \t"), None);
        assert!(!pipeline.is_searching());
        assert_eq!(pipeline.status(), "Alle Punkte: 3");
    }

    #[test]
    fn test_searching_phase_and_status() {
        let mut pipeline = pipeline();
        let ticket = pipeline.begin_search(" Alexanderplatz ").unwrap();
        assert_eq!(
            pipeline.phase(),
            &ViewPhase::Searching {
                ticket,
                query: "Alexanderplatz".to_owned()
            }
        );
        assert_eq!(pipeline.status(), "…");
        // The stable state is untouched while searching
        assert_eq!(pipeline.state(), &MapViewState::AllPoints);
    }

    #[test]
    fn test_found_replaces_overlay() {
        let mut pipeline = pipeline();
        let origin = Coordinate { lat: 52.52, lon: 13.405 };

        let first = pipeline.begin_search("Mitte").unwrap();
        pipeline.complete_search(first, GeocodeOutcome::Found(origin));
        assert_eq!(pipeline.widget().overlay_count(), 2);

        let second = pipeline.begin_search("Mitte").unwrap();
        pipeline.complete_search(second, GeocodeOutcome::Found(origin));
        assert_eq!(pipeline.widget().overlay_count(), 2);

        pipeline.show_all();
        assert_eq!(pipeline.widget().overlay_count(), 0);
    }

    #[test]
    fn test_k_from_config() {
        let config = PulseConfig::builder().nearest_k(2).build().unwrap();
        let mut pipeline = RenderPipeline::new(points(), LogMap::new(), &config);
        let ticket = pipeline.begin_search("Mitte").unwrap();
        let resolution = pipeline.complete_search(
            ticket,
            GeocodeOutcome::Found(Coordinate { lat: 52.52, lon: 13.405 }),
        );
        assert!(matches!(resolution, SearchResolution::Displayed { count: 2, .. }));
        assert_eq!(pipeline.status(), "Zeige 2 nächste Praxen zu: Mitte");
    }

    #[test]
    fn test_language_switch_rerenders_status() {
        let mut pipeline = pipeline();
        pipeline.set_language(Lang::En);
        assert_eq!(pipeline.status(), "All points: 3");

        let ticket = pipeline.begin_search("Mitte").unwrap();
        pipeline.set_language(Lang::De);
        assert_eq!(pipeline.status(), "…");
        pipeline.complete_search(
            ticket,
            GeocodeOutcome::Found(Coordinate { lat: 52.52, lon: 13.405 }),
        );
        assert_eq!(pipeline.status(), "Zeige 3 nächste Praxen zu: Mitte");
    }

    #[test]
    fn test_empty_collection() {
        let mut pipeline = RenderPipeline::new(Vec::new(), LogMap::new(), &PulseConfig::default());
        assert_eq!(pipeline.status(), "Alle Punkte: 0");
        let ticket = pipeline.begin_search("Mitte").unwrap();
        let resolution = pipeline.complete_search(
            ticket,
            GeocodeOutcome::Found(Coordinate { lat: 52.52, lon: 13.405 }),
        );
        assert_eq!(
            resolution,
            SearchResolution::Displayed {
                count: 0,
                radius_m: 1200.0
            }
        );
    }
}
