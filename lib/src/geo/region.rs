//! Region name -> capital coordinates.

use crate::geo::Coordinates;
use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Capitals of the 11 Belgian provinces (Brussels counted as one).
///
/// Hainaut uses Mons (50.4542, 3.9567). The legacy capital table listed
/// (60.3913, 5.3221) for Hainaut, a point in Norway, so `km_to_capital` for
/// Hainaut rows differs from features built with that table. Supply a
/// `regions` table in the configuration to reproduce the old distances.
/// Hainaut coordinates from the legacy capital table, kept for reference.
pub const HAINAUT_LEGACY_CAPITAL: Coordinates = Coordinates {
    latitude: 60.3913,
    longitude: 5.3221,
};

const DEFAULT_CAPITALS: [(&str, f64, f64); 11] = [
    ("West-Vlaanderen", 51.2085, 3.2251),
    ("Oost-Vlaanderen", 51.05, 3.7304),
    ("Antwerpen", 51.2199, 4.415),
    ("Liège", 50.6402, 5.5689),
    ("Vlaams Brabant", 50.8791, 4.7025),
    ("Hainaut", 50.4542, 3.9567),
    ("Brabant Wallon", 50.7154, 4.6177),
    ("Namur", 50.4649, 4.865),
    ("Luxembourg", 49.6116, 6.1319),
    ("Limburg", 50.9305, 5.3324),
    ("Bruxelles", 50.8477, 4.3572),
];

/// Lookup table of regional capitals, overridable from configuration.
///
/// The default table deviates from the legacy one for Hainaut; see
/// [`HAINAUT_LEGACY_CAPITAL`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionReference(BTreeMap<String, Coordinates>);

impl RegionReference {
    pub fn new(capitals: BTreeMap<String, Coordinates>) -> Result<Self, PreprocessingError> {
        for coordinates in capitals.values() {
            coordinates.validate()?;
        }
        Ok(Self(capitals))
    }

    /// # Errors
    /// [`PreprocessingError::UnknownRegion`] if `region` is not in the table.
    pub fn capital(&self, region: &str) -> Result<Coordinates, PreprocessingError> {
        self.0
            .get(region)
            .copied()
            .ok_or_else(|| PreprocessingError::UnknownRegion(region.to_string()))
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for RegionReference {
    fn default() -> Self {
        Self(
            DEFAULT_CAPITALS
                .iter()
                .map(|&(name, lat, lon)| (name.to_string(), Coordinates::new(lat, lon)))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = RegionReference::default();
        assert_eq!(table.len(), 11);
        assert_eq!(table.capital("Bruxelles").unwrap(), Coordinates::new(50.8477, 4.3572));
        assert_eq!(table.capital("Liège").unwrap().longitude, 5.5689);
    }

    #[test]
    fn test_every_default_capital_is_in_belgium() {
        let table = RegionReference::default();
        for region in table.regions() {
            let c = table.capital(region).unwrap();
            assert!((49.4..=51.6).contains(&c.latitude), "{}: {:?}", region, c);
            assert!((2.5..=6.5).contains(&c.longitude), "{}: {:?}", region, c);
        }
    }

    #[test]
    fn test_hainaut_uses_mons_not_legacy_value() {
        let table = RegionReference::default();
        let hainaut = table.capital("Hainaut").unwrap();
        assert_eq!(hainaut, Coordinates::new(50.4542, 3.9567));
        assert_ne!(hainaut, HAINAUT_LEGACY_CAPITAL);

        // The legacy point is still reachable through an override.
        let mut capitals = BTreeMap::new();
        capitals.insert("Hainaut".to_string(), HAINAUT_LEGACY_CAPITAL);
        let legacy = RegionReference::new(capitals).unwrap();
        assert_eq!(legacy.capital("Hainaut").unwrap(), HAINAUT_LEGACY_CAPITAL);
    }

    #[test]
    fn test_unknown_region() {
        let table = RegionReference::default();
        assert!(matches!(
            table.capital("Atlantis"),
            Err(PreprocessingError::UnknownRegion(name)) if name == "Atlantis"
        ));
    }

    #[test]
    fn test_override_from_json() {
        let table: RegionReference =
            serde_json::from_str(r#"{"Utrecht": {"latitude": 52.09, "longitude": 5.12}}"#).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.capital("Bruxelles").is_err());
    }

    #[test]
    fn test_new_rejects_invalid_coordinates() {
        let mut capitals = BTreeMap::new();
        capitals.insert("Nowhere".to_string(), Coordinates::new(120.0, 0.0));
        assert!(RegionReference::new(capitals).is_err());
    }
}
