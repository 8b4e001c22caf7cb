//! Great-circle distance and nearest-k selection over clinic points.

use std::cmp::Ordering;

use itertools::Itertools;
use market_pulse_data::{ClinicPoint, Coordinate};

/// Mean Earth radius (IUGG) in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Number of competitors shown around a searched address.
pub const DEFAULT_K: usize = 15;

/// Haversine distance between two coordinates in kilometres.
///
/// ```rust
/// use market_pulse::{Coordinate, distance_km};
///
/// let alexanderplatz = Coordinate { lat: 52.5219, lon: 13.4132 };
/// let zoo = Coordinate { lat: 52.5079, lon: 13.3377 };
/// let d = distance_km(alexanderplatz, zoo);
/// assert!((5.0..5.6).contains(&d));
/// assert_eq!(distance_km(zoo, zoo), 0.0);
/// ```
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// A selected point together with its distance from the query origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked<'a> {
    pub point: &'a ClinicPoint,
    pub distance_km: f64,
}

/// The `k` points closest to `origin`, nearest first.
///
/// Ties keep their order from `points`, so the output is fully determined by
/// the input ordering.
pub fn nearest_with_distance(points: &[ClinicPoint], origin: Coordinate, k: usize) -> Vec<Ranked<'_>> {
    points
        .iter()
        .map(|point| Ranked {
            point,
            distance_km: distance_km(origin, point.coordinate()),
        })
        // `sorted_by` is a stable sort
        .sorted_by(|a, b| cmp_distance(a.distance_km, b.distance_km))
        .take(k)
        .collect()
}

/// Owned variant of [`nearest_with_distance`].
pub fn nearest(points: &[ClinicPoint], origin: Coordinate, k: usize) -> Vec<ClinicPoint> {
    nearest_with_distance(points, origin, k)
        .into_iter()
        .map(|ranked| ranked.point.clone())
        .collect()
}

/// Distance to the farthest of `points`, or 0 when there are none.
pub fn farthest_km(origin: Coordinate, points: &[ClinicPoint]) -> f64 {
    points
        .iter()
        .map(|p| distance_km(origin, p.coordinate()))
        .fold(0.0, f64::max)
}

fn cmp_distance(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn point(name: &str, lat: f64, lon: f64) -> ClinicPoint {
        ClinicPoint::new(name, Coordinate { lat, lon })
    }

    /// One degree of latitude along a meridian.
    const KM_PER_DEG_LAT: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

    #[test]
    fn test_distance_along_meridian() {
        let a = Coordinate { lat: 52.0, lon: 13.4 };
        let b = Coordinate { lat: 53.0, lon: 13.4 };
        assert!((distance_km(a, b) - KM_PER_DEG_LAT).abs() < 1e-9);
    }

    #[test]
    fn test_distance_antipodal() {
        let a = Coordinate { lat: 0.0, lon: 0.0 };
        let b = Coordinate { lat: 0.0, lon: 180.0 };
        let half_circumference = EARTH_RADIUS_KM * std::f64::consts::PI;
        assert!((distance_km(a, b) - half_circumference).abs() < 1e-3);
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let origin = Coordinate { lat: 52.5, lon: 13.4 };
        let points = vec![
            point("far", 52.59, 13.4),
            point("near", 52.5045, 13.4),
            point("mid", 52.518, 13.4),
        ];
        let names: Vec<_> = nearest(&points, origin, DEFAULT_K)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["near", "mid", "far"]);
    }

    #[test]
    fn test_nearest_truncates_to_k() {
        let origin = Coordinate { lat: 52.5, lon: 13.4 };
        let points: Vec<_> = (0..20)
            .map(|i| point(&format!("p{i}"), 52.5 + f64::from(i) * 0.001, 13.4))
            .collect();
        let result = nearest(&points, origin, 15);
        assert_eq!(result.len(), 15);
        assert_eq!(result[0].name, "p0");
        assert_eq!(result[14].name, "p14");
    }

    #[test]
    fn test_nearest_ties_keep_input_order() {
        // Offsets are exact in binary so east and west are truly equidistant
        let origin = Coordinate { lat: 52.5, lon: 13.375 };
        let points = vec![
            point("east", 52.5, 13.5),
            point("west", 52.5, 13.25),
            point("centre", 52.5, 13.375),
        ];
        let names: Vec<_> = nearest(&points, origin, 3).into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["centre", "east", "west"]);
    }

    #[test]
    fn test_nearest_edge_cases() {
        let origin = Coordinate { lat: 52.5, lon: 13.4 };
        assert!(nearest(&[], origin, 15).is_empty());
        assert!(nearest(&[point("a", 52.5, 13.4)], origin, 0).is_empty());
    }

    #[test]
    fn test_nearest_does_not_mutate_input() {
        let origin = Coordinate { lat: 52.5, lon: 13.4 };
        let points = vec![point("b", 52.6, 13.4), point("a", 52.5, 13.4)];
        let before = points.clone();
        let _ = nearest(&points, origin, 1);
        assert_eq!(points, before);
    }

    #[test]
    fn test_farthest_km() {
        let origin = Coordinate { lat: 52.5, lon: 13.4 };
        assert_eq!(farthest_km(origin, &[]), 0.0);
        let points = vec![point("a", 52.51, 13.4), point("b", 52.6, 13.4)];
        let expected = distance_km(origin, points[1].coordinate());
        assert_eq!(farthest_km(origin, &points), expected);
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0..=90.0f64, -180.0..=180.0f64).prop_map(|(lat, lon)| Coordinate { lat, lon })
    }

    fn berlin_points() -> impl Strategy<Value = Vec<ClinicPoint>> {
        prop::collection::vec((52.33..52.68f64, 13.08..13.77f64), 0..40).prop_map(|coords| {
            coords
                .into_iter()
                .enumerate()
                .map(|(i, (lat, lon))| point(&format!("p{i}"), lat, lon))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(a in coordinate(), b in coordinate()) {
            prop_assert_eq!(distance_km(a, b), distance_km(b, a));
            prop_assert!(distance_km(a, b) >= 0.0);
        }

        #[test]
        fn prop_distance_to_self_is_zero(a in coordinate()) {
            prop_assert!(distance_km(a, a).abs() < 1e-9);
        }

        #[test]
        fn prop_nearest_is_bounded_sorted_and_deterministic(
            points in berlin_points(),
            origin in (52.33..52.68f64, 13.08..13.77f64),
            k in 1usize..25,
        ) {
            let origin = Coordinate { lat: origin.0, lon: origin.1 };
            let ranked = nearest_with_distance(&points, origin, k);
            prop_assert_eq!(ranked.len(), k.min(points.len()));
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].distance_km <= pair[1].distance_km);
            }
            prop_assert_eq!(nearest(&points, origin, k), nearest(&points, origin, k));
        }
    }
}
