//! Postal code -> coordinates lookup.
//!
//! The reference file is a headerless CSV with the columns
//! `zip, commune, longitude, latitude` (note the longitude first). The
//! Brussels entry is always supplied by [`brussels_record`] and inserted
//! before anything read from disk.

use crate::geo::Coordinates;
use crate::preprocessing::error::PreprocessingError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One row of the postal-code reference table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PostalCodeRecord {
    pub zip_code: u32,
    pub commune: String,
    pub coordinates: Coordinates,
}

/// The Brussels (1000) entry.
pub fn brussels_record() -> PostalCodeRecord {
    PostalCodeRecord {
        zip_code: 1000,
        commune: "Bruxelles".to_string(),
        coordinates: Coordinates::new(50.8465573, 4.351697),
    }
}

/// Exactly one coordinate pair per postal code.
#[derive(Clone, Debug, Default)]
pub struct GeoReference {
    entries: HashMap<u32, Coordinates>,
}

impl GeoReference {
    /// Build from records. The first occurrence of a code wins.
    pub fn from_records<I>(records: I) -> Result<Self, PreprocessingError>
    where
        I: IntoIterator<Item = PostalCodeRecord>,
    {
        let mut entries = HashMap::new();
        for record in records {
            record.coordinates.validate()?;
            if entries.contains_key(&record.zip_code) {
                debug!(
                    zip_code = record.zip_code,
                    commune = %record.commune,
                    "duplicate postal code ignored"
                );
                continue;
            }
            entries.insert(record.zip_code, record.coordinates);
        }
        Ok(Self { entries })
    }

    /// Parse the headerless reference CSV. The Brussels record is inserted
    /// first, so a Brussels row in the file is treated as a duplicate.
    ///
    /// A first row whose postal code is not an integer is taken to be a
    /// header and skipped.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, PreprocessingError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = vec![brussels_record()];
        for (row, result) in csv_reader.records().enumerate() {
            let fields = result?;
            let zip = fields.get(0).unwrap_or_default();
            if row == 0 && zip.parse::<u32>().is_err() {
                debug!(header = ?fields, "skipping header row of postal code table");
                continue;
            }
            records.push(parse_record(&fields).map_err(|e| e.at_row(row))?);
        }

        let reference = Self::from_records(records)?;
        info!(postal_codes = reference.len(), "loaded postal code reference");
        Ok(reference)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, PreprocessingError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }

    /// # Errors
    /// [`PreprocessingError::UnknownPostalCode`] if the code is absent.
    pub fn coordinates(&self, zip_code: u32) -> Result<Coordinates, PreprocessingError> {
        self.entries
            .get(&zip_code)
            .copied()
            .ok_or(PreprocessingError::UnknownPostalCode(zip_code))
    }

    pub fn latitude_of(&self, zip_code: u32) -> Result<f64, PreprocessingError> {
        Ok(self.coordinates(zip_code)?.latitude)
    }

    pub fn longitude_of(&self, zip_code: u32) -> Result<f64, PreprocessingError> {
        Ok(self.coordinates(zip_code)?.longitude)
    }

    pub fn contains(&self, zip_code: u32) -> bool {
        self.entries.contains_key(&zip_code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn latitude_of(zip_code: u32, table: &GeoReference) -> Result<f64, PreprocessingError> {
    table.latitude_of(zip_code)
}

pub fn longitude_of(zip_code: u32, table: &GeoReference) -> Result<f64, PreprocessingError> {
    table.longitude_of(zip_code)
}

fn parse_record(fields: &csv::StringRecord) -> Result<PostalCodeRecord, PreprocessingError> {
    if fields.len() < 4 {
        return Err(PreprocessingError::InvalidShape {
            expected: "4 fields (zip, commune, longitude, latitude)".to_string(),
            got: format!("{} fields", fields.len()),
        });
    }
    let zip_code = fields[0]
        .parse::<u32>()
        .map_err(|e| PreprocessingError::invalid_number("zip_code", format!("'{}': {}", &fields[0], e)))?;
    let longitude = parse_degrees("longitude", &fields[2])?;
    let latitude = parse_degrees("latitude", &fields[3])?;

    Ok(PostalCodeRecord {
        zip_code,
        commune: fields[1].to_string(),
        coordinates: Coordinates::new(latitude, longitude),
    })
}

fn parse_degrees(column: &str, raw: &str) -> Result<f64, PreprocessingError> {
    raw.parse::<f64>()
        .map_err(|e| PreprocessingError::invalid_number(column, format!("'{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
1000,Bruxelles,4.351697,50.8465573
1020,Laeken,4.348713,50.883392
2000,Antwerpen,4.4002574,51.2213404
1020,Laeken duplicate,0.0,0.0
";

    #[test]
    fn test_lookup_present_code() {
        let table = GeoReference::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.latitude_of(2000).unwrap(), 51.2213404);
        assert_eq!(table.longitude_of(2000).unwrap(), 4.4002574);
        assert_eq!(latitude_of(1020, &table).unwrap(), 50.883392);
    }

    #[test]
    fn test_lookup_absent_code() {
        let table = GeoReference::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert!(matches!(
            longitude_of(9999, &table),
            Err(PreprocessingError::UnknownPostalCode(9999))
        ));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let table = GeoReference::from_csv_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.longitude_of(1020).unwrap(), 4.348713);
    }

    #[test]
    fn test_brussels_present_without_file_row() {
        let table = GeoReference::from_csv_reader("2000,Antwerpen,4.40,51.22\n".as_bytes()).unwrap();
        assert_eq!(table.coordinates(1000).unwrap(), brussels_record().coordinates);
    }

    #[test]
    fn test_header_row_skipped() {
        let csv = "zip,commune,longitude,latitude\n2000,Antwerpen,4.40,51.22\n";
        let table = GeoReference::from_csv_reader(csv.as_bytes()).unwrap();
        assert!(table.contains(2000));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_bad_coordinate_names_row() {
        let csv = "2000,Antwerpen,4.40,51.22\n3000,Leuven,abc,50.88\n";
        let err = GeoReference::from_csv_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().starts_with("Row 1:"), "{}", err);
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let csv = "2000,Antwerpen,4.40,151.22\n";
        assert!(matches!(
            GeoReference::from_csv_reader(csv.as_bytes()),
            Err(PreprocessingError::InvalidNumericInput { .. })
        ));
    }
}
