//! Geographic features: postal-code geocoding and distance to the regional
//! capital.
//!
//! - [`GeoReference`]: postal code -> coordinates, loaded from the headerless
//!   reference CSV plus one static Brussels record.
//! - [`RegionReference`]: region name -> capital coordinates.
//! - [`distance_km`] / [`haversine_km`]: great-circle distance.

pub mod distance;
pub mod reference;
pub mod region;

pub use distance::{distance_km, haversine_km, EARTH_RADIUS_KM};
pub use reference::{brussels_record, latitude_of, longitude_of, GeoReference, PostalCodeRecord};
pub use region::{RegionReference, HAINAUT_LEGACY_CAPITAL};

use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both components are finite and within their ranges.
    pub fn validate(&self) -> Result<(), PreprocessingError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(PreprocessingError::invalid_number(
                "latitude",
                format!("{} is outside [-90, 90]", self.latitude),
            ));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(PreprocessingError::invalid_number(
                "longitude",
                format!("{} is outside [-180, 180]", self.longitude),
            ));
        }
        Ok(())
    }
}
