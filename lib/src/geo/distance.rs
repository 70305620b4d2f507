//! Great-circle distance on a spherical Earth.
//!
//! ```text
//! a = sin²(Δφ/2) + cos φ1 · cos φ2 · sin²(Δλ/2)
//! d = 2R · atan2(√a, √(1 − a))
//! ```

use crate::geo::RegionReference;
use crate::preprocessing::error::PreprocessingError;

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between two points given in degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance from a point to the capital of `region`, rounded to 2 decimals.
///
/// # Errors
/// [`PreprocessingError::UnknownRegion`] if `region` is not in `table`.
pub fn distance_km(
    lat: f64,
    lon: f64,
    region: &str,
    table: &RegionReference,
) -> Result<f64, PreprocessingError> {
    let capital = table.capital(region)?;
    let km = haversine_km(lat, lon, capital.latitude, capital.longitude);
    Ok(round2(km))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_own_capital_is_zero() {
        let table = RegionReference::default();
        assert_eq!(distance_km(50.8477, 4.3572, "Bruxelles", &table).unwrap(), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Brussels -> Antwerp is roughly 41 km.
        let d = haversine_km(50.8477, 4.3572, 51.2199, 4.415);
        assert!((d - 41.58).abs() < 0.5, "{}", d);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = haversine_km(51.2085, 3.2251, 49.6116, 6.1319);
        let b = haversine_km(49.6116, 6.1319, 51.2085, 3.2251);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn test_distance_rounded_to_two_decimals() {
        let table = RegionReference::default();
        let d = distance_km(51.0, 4.0, "Antwerpen", &table).unwrap();
        assert_eq!(d, (d * 100.0).round() / 100.0);
    }

    #[test]
    fn test_unknown_region() {
        let table = RegionReference::default();
        assert!(matches!(
            distance_km(50.0, 4.0, "Atlantis", &table),
            Err(PreprocessingError::UnknownRegion(_))
        ));
    }
}
