//! The narrow interface the render pipeline drives a map widget through.
//!
//! Tiles, clustering and popups live in the widget; the pipeline only tells
//! it which markers to show, which overlays to draw and what to frame.

use market_pulse_data::{BoundingBox, ClinicPoint, Coordinate};
use tracing::{debug, info};

mod popup;

pub use popup::{escape_html, popup_html};

/// Padding applied around the framed points, as a fraction of their span.
pub const BOUNDS_PAD: f64 = 0.10;

/// Opaque id of an overlay drawn on the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overlay {
    /// Small marker at the searched address
    FocusMarker { center: Coordinate },
    /// Circle around the searched address covering the selected competitors
    RadiusCircle { center: Coordinate, radius_m: f64 },
}

pub trait MapWidget {
    /// Replace every clinic marker with `points`.
    fn set_markers(&mut self, points: &[ClinicPoint]);
    fn add_overlay(&mut self, overlay: Overlay) -> OverlayHandle;
    fn remove_overlay(&mut self, handle: OverlayHandle);
    /// Frame the viewport on `points`. Never called with an empty slice.
    fn fit_bounds(&mut self, points: &[ClinicPoint]);
}

/// Bounding box of `points` grown by `pad` of its span on every side.
pub fn padded_bounds(points: &[ClinicPoint], pad: f64) -> Option<BoundingBox> {
    let first = points.first()?.coordinate();
    let mut bounds = BoundingBox {
        min_lat: first.lat,
        max_lat: first.lat,
        min_lon: first.lon,
        max_lon: first.lon,
    };
    for point in &points[1..] {
        bounds.min_lat = bounds.min_lat.min(point.lat);
        bounds.max_lat = bounds.max_lat.max(point.lat);
        bounds.min_lon = bounds.min_lon.min(point.lon);
        bounds.max_lon = bounds.max_lon.max(point.lon);
    }
    let lat_pad = (bounds.max_lat - bounds.min_lat) * pad;
    let lon_pad = (bounds.max_lon - bounds.min_lon) * pad;
    Some(BoundingBox {
        min_lat: bounds.min_lat - lat_pad,
        max_lat: bounds.max_lat + lat_pad,
        min_lon: bounds.min_lon - lon_pad,
        max_lon: bounds.max_lon + lon_pad,
    })
}

/// A headless widget that only reports what it was asked to draw.
#[derive(Debug, Default)]
pub struct LogMap {
    next_handle: u64,
    markers: usize,
    overlays: Vec<OverlayHandle>,
}

impl LogMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn marker_count(&self) -> usize {
        self.markers
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }
}

impl MapWidget for LogMap {
    fn set_markers(&mut self, points: &[ClinicPoint]) {
        self.markers = points.len();
        info!(markers = points.len(), "Markers replaced");
        for point in points {
            debug!(%point, "Marker");
        }
    }

    fn add_overlay(&mut self, overlay: Overlay) -> OverlayHandle {
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.overlays.push(handle);
        info!(?handle, ?overlay, "Overlay added");
        handle
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        self.overlays.retain(|h| *h != handle);
        debug!(?handle, "Overlay removed");
    }

    fn fit_bounds(&mut self, points: &[ClinicPoint]) {
        if let Some(bounds) = padded_bounds(points, BOUNDS_PAD) {
            info!(?bounds, "Viewport framed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(lat: f64, lon: f64) -> ClinicPoint {
        ClinicPoint::new("p", Coordinate { lat, lon })
    }

    #[test]
    fn test_padded_bounds() {
        assert!(padded_bounds(&[], BOUNDS_PAD).is_none());

        let bounds = padded_bounds(&[point(52.0, 13.0), point(53.0, 14.0)], 0.25).unwrap();
        assert_eq!(bounds.min_lat, 51.75);
        assert_eq!(bounds.max_lat, 53.25);
        assert_eq!(bounds.min_lon, 12.75);
        assert_eq!(bounds.max_lon, 14.25);
    }

    #[test]
    fn test_single_point_bounds_collapse() {
        let bounds = padded_bounds(&[point(52.5, 13.4)], BOUNDS_PAD).unwrap();
        assert_eq!(bounds.min_lat, bounds.max_lat);
        assert_eq!(bounds.min_lon, bounds.max_lon);
    }

    #[test]
    fn test_log_map_tracks_overlays() {
        let mut map = LogMap::new();
        let center = Coordinate { lat: 52.5, lon: 13.4 };
        let a = map.add_overlay(Overlay::FocusMarker { center });
        let b = map.add_overlay(Overlay::RadiusCircle { center, radius_m: 1200.0 });
        assert_ne!(a, b);
        assert_eq!(map.overlay_count(), 2);
        map.remove_overlay(a);
        assert_eq!(map.overlay_count(), 1);

        map.set_markers(&[point(52.5, 13.4), point(52.6, 13.5)]);
        assert_eq!(map.marker_count(), 2);
    }
}
