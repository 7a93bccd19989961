use crate::models::{BoundingBox, Coordinates, DistanceWithTime};

/// Earth's radius in miles
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Approximate miles per degree of latitude
const MILES_PER_DEGREE: f64 = 69.0;

/// Calculate the Haversine distance between two points in miles
///
/// Inputs are expected to be validated already; NaN or out-of-range
/// coordinates produce meaningless output.
#[inline]
pub fn calculate_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Estimate driving time in whole minutes for a distance in miles
///
/// Average speeds: up to 5 miles at 25 mph (city), up to 20 miles at
/// 35 mph (suburban), beyond that 50 mph.
pub fn estimate_travel_time(distance_miles: f64) -> u32 {
    let speed_mph = if distance_miles <= 5.0 {
        25.0
    } else if distance_miles <= 20.0 {
        35.0
    } else {
        50.0
    };

    (distance_miles / speed_mph * 60.0).round().max(0.0) as u32
}

/// Distance rounded to two decimals together with a travel time estimate
pub fn calculate_distance_with_time(from: &Coordinates, to: &Coordinates) -> DistanceWithTime {
    with_travel_time(calculate_distance(from, to))
}

/// Reportable form of an exact distance
///
/// Range checks must use the exact value; rounding can pull a point just
/// outside a radius back onto it.
pub fn with_travel_time(distance_miles: f64) -> DistanceWithTime {
    DistanceWithTime {
        distance: round_to_hundredths(distance_miles),
        estimated_travel_time: estimate_travel_time(distance_miles),
    }
}

#[inline]
fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Check that a coordinate pair is finite and within WGS84 ranges
pub fn validate_coordinates(coords: &Coordinates) -> bool {
    coords.latitude.is_finite()
        && coords.longitude.is_finite()
        && (-90.0..=90.0).contains(&coords.latitude)
        && (-180.0..=180.0).contains(&coords.longitude)
}

/// Calculate a bounding box around a center point
///
/// 1° latitude ≈ 69 miles, 1° longitude ≈ 69 miles * cos(latitude).
/// The box always contains the full circular radius. Near the poles the
/// longitude span degenerates, so the box widens to every longitude.
pub fn create_bounding_box(center: &Coordinates, radius_miles: f64) -> BoundingBox {
    let lat_delta = radius_miles / MILES_PER_DEGREE;

    let north = (center.latitude + lat_delta).min(90.0);
    let south = (center.latitude - lat_delta).max(-90.0);

    let cos_lat = center.latitude.to_radians().cos().abs();
    let angular_radius = radius_miles / EARTH_RADIUS_MILES;
    let lon_delta = if cos_lat < 1e-9 || angular_radius.sin() >= cos_lat {
        f64::INFINITY
    } else {
        // The flat approximation undershoots at high latitudes; the spherical
        // extent keeps the box a superset of the circle there.
        let approximate = radius_miles / (MILES_PER_DEGREE * cos_lat);
        let spherical = (angular_radius.sin() / cos_lat).asin().to_degrees();
        approximate.max(spherical)
    };

    // A box touching a pole, or one wider than the globe, covers all longitudes
    let (west, east) = if north >= 90.0 || south <= -90.0 || lon_delta >= 180.0 {
        (-180.0, 180.0)
    } else {
        (center.longitude - lon_delta, center.longitude + lon_delta)
    };

    BoundingBox {
        north,
        south,
        east,
        west,
    }
}

/// Check if a point is within a bounding box
///
/// Spans that cross the antimeridian are extended past ±180, so points are
/// also tested shifted by a full turn.
#[inline]
pub fn is_within_bounding_box(coords: &Coordinates, bbox: &BoundingBox) -> bool {
    if coords.latitude < bbox.south || coords.latitude > bbox.north {
        return false;
    }

    [coords.longitude, coords.longitude - 360.0, coords.longitude + 360.0]
        .iter()
        .any(|lon| *lon >= bbox.west && *lon <= bbox.east)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates { latitude, longitude }
    }

    #[test]
    fn test_distance_new_york_to_los_angeles() {
        let nyc = point(40.7128, -74.0060);
        let la = point(34.0522, -118.2437);

        let distance = calculate_distance(&nyc, &la);
        assert!((distance - 2445.0).abs() < 15.0, "Distance should be ~2445mi, got {}", distance);
    }

    #[test]
    fn test_quarter_great_circle() {
        let distance = calculate_distance(&point(0.0, 0.0), &point(0.0, 90.0));
        let expected = std::f64::consts::FRAC_PI_2 * EARTH_RADIUS_MILES;
        assert!((distance - expected).abs() < 0.01);
        assert!((distance - 6261.0).abs() < 50.0);
    }

    #[test]
    fn test_travel_time_tiers() {
        assert_eq!(estimate_travel_time(3.0), 7);
        assert_eq!(estimate_travel_time(5.0), 12);
        assert_eq!(estimate_travel_time(10.0), 17);
        assert_eq!(estimate_travel_time(20.0), 34);
        assert_eq!(estimate_travel_time(100.0), 120);
        assert_eq!(estimate_travel_time(0.0), 0);
    }

    #[test]
    fn test_distance_with_time_rounds() {
        let result = calculate_distance_with_time(&point(40.7128, -74.0060), &point(40.72, -74.01));
        assert_eq!(result.distance, (result.distance * 100.0).round() / 100.0);
        assert!(result.distance > 0.0 && result.distance < 1.0);
        assert_eq!(result.estimated_travel_time, 1);
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(&point(40.7, -74.0)));
        assert!(validate_coordinates(&point(90.0, 180.0)));
        assert!(!validate_coordinates(&point(91.0, 0.0)));
        assert!(!validate_coordinates(&point(45.0, -200.0)));
        assert!(!validate_coordinates(&point(f64::NAN, 0.0)));
        assert!(!validate_coordinates(&point(0.0, f64::INFINITY)));
    }

    #[test]
    fn test_bounding_box() {
        let center = point(40.7128, -74.0060);
        let bbox = create_bounding_box(&center, 10.0);

        assert!(bbox.south < 40.7128);
        assert!(bbox.north > 40.7128);
        assert!(bbox.west < -74.0060);
        assert!(bbox.east > -74.0060);

        // 20mi / 69mi per degree = ~0.29 degrees
        let lat_span = bbox.north - bbox.south;
        assert!((lat_span - 0.29).abs() < 0.01, "Lat span should be ~0.29 degrees");

        // Longitude degrees are shorter at 40°N, so the span is wider
        assert!(bbox.east - bbox.west > lat_span);
    }

    #[test]
    fn test_bounding_box_at_pole() {
        let bbox = create_bounding_box(&point(90.0, 0.0), 50.0);

        assert!(bbox.east.is_finite() && bbox.west.is_finite());
        assert_eq!(bbox.north, 90.0);
        assert_eq!((bbox.west, bbox.east), (-180.0, 180.0));
        assert!(is_within_bounding_box(&point(89.6, 135.0), &bbox));

        let south_pole = create_bounding_box(&point(-90.0, 10.0), 5.0);
        assert_eq!(south_pole.south, -90.0);
        assert_eq!((south_pole.west, south_pole.east), (-180.0, 180.0));
    }

    #[test]
    fn test_point_within_bbox() {
        let center = point(40.7128, -74.0060);
        let bbox = create_bounding_box(&center, 10.0);

        assert!(is_within_bounding_box(&center, &bbox));
        assert!(is_within_bounding_box(&point(40.71, -74.0), &bbox));
        assert!(!is_within_bounding_box(&point(50.0, -80.0), &bbox));
    }

    #[test]
    fn test_bbox_across_antimeridian() {
        let center = point(0.0, 179.9);
        let bbox = create_bounding_box(&center, 30.0);

        assert!(bbox.east > 180.0);
        assert!(is_within_bounding_box(&point(0.0, -179.9), &bbox));
    }
}
