//! Feature assembly: filtered listing -> [`FeatureVector`].

use crate::dataset::listing::ListingRecord;
use crate::dataset::table::{FeatureTable, FeatureVector};
use crate::geo::{distance_km, GeoReference, RegionReference};
use crate::preprocessing::encoding::CategoricalEncoder;
use crate::preprocessing::error::PreprocessingError;
use tracing::info;

/// Encodes categories, geocodes the postal code and measures the distance to
/// the regional capital.
#[derive(Clone, Debug)]
pub struct FeatureAssembler {
    encoder: CategoricalEncoder,
    geo: GeoReference,
    regions: RegionReference,
}

impl FeatureAssembler {
    pub fn new(encoder: CategoricalEncoder, geo: GeoReference, regions: RegionReference) -> Self {
        Self {
            encoder,
            geo,
            regions,
        }
    }

    pub fn geo(&self) -> &GeoReference {
        &self.geo
    }

    pub fn assemble_one(&self, record: &ListingRecord) -> Result<FeatureVector, PreprocessingError> {
        let subtype_encoded = self.encoder.subtype(&record.subtype_of_property)?;
        let building_condition = self.encoder.building_condition(&record.building_condition)?;
        let equipped_kitchen = self.encoder.kitchen(&record.equipped_kitchen)?;
        let location = self.geo.coordinates(record.zip_code)?;
        let km_to_capital = distance_km(
            location.latitude,
            location.longitude,
            &record.province,
            &self.regions,
        )?;

        Ok(FeatureVector {
            zip_code: record.zip_code,
            type_of_property: record.type_of_property,
            building_condition,
            facade_number: record.facade_number,
            living_area: record.living_area,
            equipped_kitchen,
            terrace: record.terrace,
            garden: record.garden,
            subtype_encoded,
            latitude: location.latitude,
            longitude: location.longitude,
            km_to_capital,
        })
    }

    /// Assemble every record. The first failure aborts with the row index.
    pub fn assemble(&self, records: &[ListingRecord]) -> Result<FeatureTable, PreprocessingError> {
        let rows = records
            .iter()
            .enumerate()
            .map(|(i, r)| self.assemble_one(r).map_err(|e| e.at_row(i)))
            .collect::<Result<Vec<_>, _>>()?;
        let prices = records.iter().map(|r| r.price).collect();

        info!(rows = records.len(), "assembled feature table");
        FeatureTable::new(rows, prices)
    }
}
