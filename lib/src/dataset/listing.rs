//! Strongly typed listing records and the listing CSV schema.
//!
//! The loader checks the header row before reading any data: every column of
//! [`REQUIRED_COLUMNS`] must be present, and any other column must be on the
//! caller's ignore list.

use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Columns a listing CSV must carry, in output order.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "zip_code",
    "commune",
    "province",
    "type_of_property",
    "subtype_of_property",
    "price",
    "building_condition",
    "facade_number",
    "living_area",
    "equipped_kitchen",
    "terrace",
    "garden",
    "plot_surface",
];

/// Columns present in the scraped data that the pipeline discards.
pub const DEFAULT_IGNORED_COLUMNS: [&str; 5] = [
    "bedroom_nr",
    "swimming_pool",
    "furnished",
    "open_fire",
    "sub_property_group_encoded",
];

/// `type_of_property`: 0 for apartment-like, 1 for houses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PropertyType {
    Apartment,
    House,
}

impl PropertyType {
    pub fn code(self) -> u8 {
        match self {
            PropertyType::Apartment => 0,
            PropertyType::House => 1,
        }
    }
}

impl TryFrom<u8> for PropertyType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PropertyType::Apartment),
            1 => Ok(PropertyType::House),
            other => Err(format!("type_of_property must be 0 or 1, got {}", other)),
        }
    }
}

impl From<PropertyType> for u8 {
    fn from(value: PropertyType) -> Self {
        value.code()
    }
}

/// One raw listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub zip_code: u32,
    pub commune: String,
    pub province: String,
    pub type_of_property: PropertyType,
    pub subtype_of_property: String,
    pub price: f64,
    pub building_condition: String,
    pub facade_number: u32,
    pub living_area: f64,
    pub equipped_kitchen: String,
    pub terrace: f64,
    pub garden: f64,
    pub plot_surface: f64,
}

impl ListingRecord {
    /// Check the numeric invariants: positive price and living area,
    /// non-negative plot surface, finite flags.
    pub fn validate(&self) -> Result<(), PreprocessingError> {
        positive("price", self.price)?;
        positive("living_area", self.living_area)?;
        if !self.plot_surface.is_finite() || self.plot_surface < 0.0 {
            return Err(PreprocessingError::invalid_number(
                "plot_surface",
                format!("must be finite and >= 0, got {}", self.plot_surface),
            ));
        }
        for (column, value) in [("terrace", self.terrace), ("garden", self.garden)] {
            if !value.is_finite() {
                return Err(PreprocessingError::invalid_number(
                    column,
                    format!("must be finite, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

fn positive(column: &str, value: f64) -> Result<(), PreprocessingError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PreprocessingError::invalid_number(
            column,
            format!("must be finite and > 0, got {}", value),
        ));
    }
    Ok(())
}

/// Check a header row against [`REQUIRED_COLUMNS`] and the ignore list.
pub fn validate_headers<'h, I, S>(headers: I, ignored: &[S]) -> Result<(), PreprocessingError>
where
    I: IntoIterator<Item = &'h str>,
    S: AsRef<str>,
{
    let headers: Vec<&str> = headers.into_iter().collect();
    if let Some(missing) = REQUIRED_COLUMNS
        .iter()
        .find(|&&c| !headers.iter().any(|&h| h == c))
    {
        return Err(PreprocessingError::MissingColumn(missing.to_string()));
    }
    if let Some(extra) = headers.iter().find(|&&h| {
        !REQUIRED_COLUMNS.iter().any(|&c| c == h) && !ignored.iter().any(|i| i.as_ref() == h)
    }) {
        return Err(PreprocessingError::UnexpectedColumn(extra.to_string()));
    }
    Ok(())
}

/// Read and validate listing records from CSV.
///
/// Errors are attributed to the data row (0-based, header excluded).
pub fn load_listings<R, S>(reader: R, ignored: &[S]) -> Result<Vec<ListingRecord>, PreprocessingError>
where
    R: Read,
    S: AsRef<str>,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    validate_headers(csv_reader.headers()?.iter(), ignored)?;

    let mut records = Vec::new();
    for (row, result) in csv_reader.deserialize::<ListingRecord>().enumerate() {
        let record = result.map_err(|e| PreprocessingError::from(e).at_row(row))?;
        record.validate().map_err(|e| e.at_row(row))?;
        records.push(record);
    }

    info!(rows = records.len(), "loaded listings");
    Ok(records)
}

pub fn load_listings_from_path<P, S>(
    path: P,
    ignored: &[S],
) -> Result<Vec<ListingRecord>, PreprocessingError>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let file = std::fs::File::open(path)?;
    load_listings(std::io::BufReader::new(file), ignored)
}

/// Write records with the [`REQUIRED_COLUMNS`] header.
pub fn write_listings<W: Write>(records: &[ListingRecord], writer: W) -> Result<(), PreprocessingError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "zip_code,commune,province,type_of_property,subtype_of_property,price,\
building_condition,facade_number,living_area,equipped_kitchen,terrace,garden,plot_surface";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = HEADER.to_string();
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.push('\n');
        out
    }

    const NONE: [&str; 0] = [];

    #[test]
    fn test_load_valid_rows() {
        let csv = csv_with(&[
            "1000,Bruxelles,Bruxelles,0,apartment,250000,good,2,85,installed,1,0,0",
            "2000,Antwerpen,Antwerpen,1,villa,650000,to renovate,4,210.5,equipped,1,1,800",
        ]);
        let records = load_listings(csv.as_bytes(), &NONE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].type_of_property, PropertyType::Apartment);
        assert_eq!(records[1].type_of_property, PropertyType::House);
        assert_eq!(records[1].living_area, 210.5);
    }

    #[test]
    fn test_missing_column() {
        let csv = "zip_code,commune\n1000,Bruxelles\n";
        assert!(matches!(
            load_listings(csv.as_bytes(), &NONE),
            Err(PreprocessingError::MissingColumn(c)) if c == "province"
        ));
    }

    #[test]
    fn test_unexpected_column() {
        let csv = format!("{},bedroom_nr\n", HEADER);
        assert!(matches!(
            load_listings(csv.as_bytes(), &NONE),
            Err(PreprocessingError::UnexpectedColumn(c)) if c == "bedroom_nr"
        ));
    }

    #[test]
    fn test_ignored_column_accepted() {
        let csv = format!(
            "{},bedroom_nr\n1000,Bruxelles,Bruxelles,0,flat studio,150000,good,2,35,installed,0,0,0,1\n",
            HEADER
        );
        let records = load_listings(csv.as_bytes(), &DEFAULT_IGNORED_COLUMNS).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_non_numeric_value_names_row() {
        let csv = csv_with(&[
            "1000,Bruxelles,Bruxelles,0,apartment,250000,good,2,85,installed,1,0,0",
            "1000,Bruxelles,Bruxelles,0,apartment,cheap,good,2,85,installed,1,0,0",
        ]);
        let err = load_listings(csv.as_bytes(), &NONE).unwrap_err();
        assert!(matches!(err, PreprocessingError::Row { row: 1, .. }), "{}", err);
    }

    #[test]
    fn test_negative_price_rejected() {
        let csv = csv_with(&["1000,Bruxelles,Bruxelles,0,apartment,-5,good,2,85,installed,1,0,0"]);
        let err = load_listings(csv.as_bytes(), &NONE).unwrap_err();
        assert!(err.to_string().contains("price"), "{}", err);
    }

    #[test]
    fn test_invalid_property_type_rejected() {
        let csv = csv_with(&["1000,Bruxelles,Bruxelles,3,apartment,1,good,2,85,installed,1,0,0"]);
        assert!(load_listings(csv.as_bytes(), &NONE).is_err());
    }

    #[test]
    fn test_write_then_load() {
        let csv = csv_with(&["9000,Gent,Oost-Vlaanderen,1,house,395000,good,3,160,installed,1,1,420"]);
        let records = load_listings(csv.as_bytes(), &NONE).unwrap();

        let mut buffer = Vec::new();
        write_listings(&records, &mut buffer).unwrap();
        let reloaded = load_listings(buffer.as_slice(), &NONE).unwrap();
        assert_eq!(records, reloaded);
    }
}
