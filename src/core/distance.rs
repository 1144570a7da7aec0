use crate::models::Center;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle (haversine) distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two [`Center`] points in kilometers
#[inline]
pub fn distance_between(from: Center, to: Center) -> f64 {
    distance_km(from.lat, from.lon, to.lat, to.lon)
}

/// Round to two decimal places, the precision shown to users
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_london_paris() {
        // Distance from London to Paris (approximately 344 km)
        let distance = distance_km(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_distance_same_point_is_zero() {
        assert_eq!(distance_km(41.88, -87.63, 41.88, -87.63), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Center { lat: 41.88, lon: -87.63 };
        let b = Center { lat: 41.885, lon: -87.78 };
        assert!((distance_between(a, b) - distance_between(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(4.0), 4.0);
        assert_eq!(round2(3.333_333), 3.33);
    }
}
