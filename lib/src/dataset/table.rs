//! Assembled feature rows: the output of the feature stage and the input of
//! the training stage.

use crate::dataset::listing::PropertyType;
use crate::preprocessing::error::PreprocessingError;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// Number of model input columns.
pub const N_FEATURES: usize = 12;

/// Model input columns, in matrix order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = [
    "zip_code",
    "type_of_property",
    "building_condition",
    "facade_number",
    "living_area",
    "equipped_kitchen",
    "terrace",
    "garden",
    "subtype_encoded",
    "latitude",
    "longitude",
    "km_to_capital",
];

/// One fully encoded observation.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector {
    pub zip_code: u32,
    pub type_of_property: PropertyType,
    pub building_condition: u32,
    pub facade_number: u32,
    pub living_area: f64,
    pub equipped_kitchen: u32,
    pub terrace: f64,
    pub garden: f64,
    pub subtype_encoded: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub km_to_capital: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [f64; N_FEATURES] {
        [
            f64::from(self.zip_code),
            f64::from(self.type_of_property.code()),
            f64::from(self.building_condition),
            f64::from(self.facade_number),
            self.living_area,
            f64::from(self.equipped_kitchen),
            self.terrace,
            self.garden,
            f64::from(self.subtype_encoded),
            self.latitude,
            self.longitude,
            self.km_to_capital,
        ]
    }
}

/// CSV row: the 12 features followed by `price`.
#[derive(Debug, Serialize, Deserialize)]
struct FeatureRow {
    zip_code: u32,
    type_of_property: PropertyType,
    building_condition: u32,
    facade_number: u32,
    living_area: f64,
    equipped_kitchen: u32,
    terrace: f64,
    garden: f64,
    subtype_encoded: u32,
    latitude: f64,
    longitude: f64,
    km_to_capital: f64,
    price: f64,
}

impl FeatureRow {
    fn new(v: &FeatureVector, price: f64) -> Self {
        Self {
            zip_code: v.zip_code,
            type_of_property: v.type_of_property,
            building_condition: v.building_condition,
            facade_number: v.facade_number,
            living_area: v.living_area,
            equipped_kitchen: v.equipped_kitchen,
            terrace: v.terrace,
            garden: v.garden,
            subtype_encoded: v.subtype_encoded,
            latitude: v.latitude,
            longitude: v.longitude,
            km_to_capital: v.km_to_capital,
            price,
        }
    }

    fn into_parts(self) -> (FeatureVector, f64) {
        (
            FeatureVector {
                zip_code: self.zip_code,
                type_of_property: self.type_of_property,
                building_condition: self.building_condition,
                facade_number: self.facade_number,
                living_area: self.living_area,
                equipped_kitchen: self.equipped_kitchen,
                terrace: self.terrace,
                garden: self.garden,
                subtype_encoded: self.subtype_encoded,
                latitude: self.latitude,
                longitude: self.longitude,
                km_to_capital: self.km_to_capital,
            },
            self.price,
        )
    }
}

/// Feature rows with their aligned prices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureVector>,
    prices: Vec<f64>,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureVector>, prices: Vec<f64>) -> Result<Self, PreprocessingError> {
        if rows.len() != prices.len() {
            return Err(PreprocessingError::InvalidShape {
                expected: format!("{} prices", rows.len()),
                got: format!("{} prices", prices.len()),
            });
        }
        Ok(Self { rows, prices })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// `(n_rows, 12)` matrix in [`FEATURE_NAMES`] order.
    pub fn feature_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.rows.len(), N_FEATURES));
        for (mut out, row) in matrix.rows_mut().into_iter().zip(&self.rows) {
            out.assign(&Array1::from(row.to_array().to_vec()));
        }
        matrix
    }

    /// Prices in currency units.
    pub fn targets(&self) -> Array1<f64> {
        Array1::from(self.prices.clone())
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PreprocessingError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for (row, &price) in self.rows.iter().zip(&self.prices) {
            csv_writer.serialize(FeatureRow::new(row, price))?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_csv_path<P: AsRef<Path>>(&self, path: P) -> Result<(), PreprocessingError> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, PreprocessingError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut rows = Vec::new();
        let mut prices = Vec::new();
        for (i, result) in csv_reader.deserialize::<FeatureRow>().enumerate() {
            let (row, price) = result
                .map_err(|e| PreprocessingError::from(e).at_row(i))?
                .into_parts();
            rows.push(row);
            prices.push(price);
        }
        Self::new(rows, prices)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, PreprocessingError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(std::io::BufReader::new(file))
    }
}
