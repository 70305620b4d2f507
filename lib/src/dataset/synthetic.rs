//! Seeded synthetic listings for demos, tests and benchmarks.
//!
//! Every generated record survives the default row filter: subtypes come from
//! the default vocabulary, conditions are known levels, apartments have at
//! most 4 facades and houses a positive plot.

use crate::dataset::listing::{ListingRecord, PropertyType};
use crate::geo::{Coordinates, GeoReference, PostalCodeRecord};
use crate::preprocessing::encoding::{BUILDING_CONDITION_LEVELS, KITCHEN_LEVELS};
use crate::preprocessing::error::PreprocessingError;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use std::io::Write;

/// `(zip, commune, province, latitude, longitude)`.
pub const LOCATIONS: [(u32, &str, &str, f64, f64); 12] = [
    (1000, "Bruxelles", "Bruxelles", 50.8465573, 4.351697),
    (1300, "Wavre", "Brabant Wallon", 50.7171, 4.6014),
    (2000, "Antwerpen", "Antwerpen", 51.2213, 4.4003),
    (3000, "Leuven", "Vlaams Brabant", 50.8798, 4.7005),
    (3500, "Hasselt", "Limburg", 50.9307, 5.3325),
    (4000, "Liège", "Liège", 50.6326, 5.5797),
    (5000, "Namur", "Namur", 50.4669, 4.8675),
    (6000, "Charleroi", "Hainaut", 50.4108, 4.4446),
    (6700, "Arlon", "Luxembourg", 49.6833, 5.8167),
    (7000, "Mons", "Hainaut", 50.4542, 3.9567),
    (8000, "Brugge", "West-Vlaanderen", 51.2093, 3.2247),
    (9000, "Gent", "Oost-Vlaanderen", 51.0543, 3.7174),
];

const APARTMENT_SUBTYPES: [&str; 5] = ["apartment", "flat studio", "duplex", "penthouse", "loft"];
const HOUSE_SUBTYPES: [&str; 5] = ["house", "villa", "town house", "bungalow", "mansion"];

pub const MIN_PRICE: f64 = 100_000.0;
pub const MAX_PRICE: f64 = 900_000.0;

/// `n` listings with prices uniform in [`MIN_PRICE`, `MAX_PRICE`].
pub fn synthetic_listings(n: usize, seed: u64) -> Vec<ListingRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| synthetic_listing(&mut rng)).collect()
}

fn synthetic_listing(rng: &mut StdRng) -> ListingRecord {
    let &(zip_code, commune, province, _, _) = pick(rng, &LOCATIONS);
    let price = rng.gen_range(MIN_PRICE..=MAX_PRICE);
    let is_house = rng.gen_bool(0.5);
    let price_per_m2 = rng.gen_range(2_200.0..3_800.0);

    let (type_of_property, subtype, facade_number, plot_surface) = if is_house {
        (
            PropertyType::House,
            *pick(rng, &HOUSE_SUBTYPES),
            rng.gen_range(2..=4),
            rng.gen_range(120.0..1_500.0_f64).round(),
        )
    } else {
        (
            PropertyType::Apartment,
            *pick(rng, &APARTMENT_SUBTYPES),
            rng.gen_range(1..=4),
            0.0,
        )
    };

    ListingRecord {
        zip_code,
        commune: commune.to_string(),
        province: province.to_string(),
        type_of_property,
        subtype_of_property: subtype.to_string(),
        price: price.round(),
        building_condition: pick(rng, &BUILDING_CONDITION_LEVELS).to_string(),
        facade_number,
        living_area: (price / price_per_m2).round().max(15.0),
        equipped_kitchen: pick(rng, &KITCHEN_LEVELS).to_string(),
        terrace: f64::from(u8::from(rng.gen_bool(0.6))),
        garden: if is_house {
            f64::from(u8::from(rng.gen_bool(0.7)))
        } else {
            0.0
        },
        plot_surface,
    }
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    // Every caller passes a non-empty constant table.
    items.choose(rng).unwrap_or(&items[0])
}

/// Postal-code records for every synthetic location.
pub fn synthetic_postal_records() -> Vec<PostalCodeRecord> {
    LOCATIONS
        .iter()
        .map(|&(zip_code, commune, _, latitude, longitude)| PostalCodeRecord {
            zip_code,
            commune: commune.to_string(),
            coordinates: Coordinates::new(latitude, longitude),
        })
        .collect()
}

pub fn synthetic_geo_reference() -> Result<GeoReference, PreprocessingError> {
    GeoReference::from_records(synthetic_postal_records())
}

/// Write records in the headerless `zip,commune,longitude,latitude` layout.
pub fn write_postal_codes<W: Write>(
    records: &[PostalCodeRecord],
    writer: W,
) -> Result<(), PreprocessingError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    for r in records {
        csv_writer.write_record([
            r.zip_code.to_string(),
            r.commune.clone(),
            r.coordinates.longitude.to_string(),
            r.coordinates.latitude.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prices_in_range() {
        let records = synthetic_listings(200, 3);
        assert_eq!(records.len(), 200);
        assert!(records
            .iter()
            .all(|r| (MIN_PRICE..=MAX_PRICE).contains(&r.price)));
        assert!(records.iter().all(|r| r.validate().is_ok()));
    }

    #[test]
    fn test_reproducible() {
        assert_eq!(synthetic_listings(20, 11), synthetic_listings(20, 11));
        assert_ne!(synthetic_listings(20, 11), synthetic_listings(20, 12));
    }

    #[test]
    fn test_type_matches_plot() {
        for r in synthetic_listings(100, 5) {
            match r.type_of_property {
                PropertyType::House => assert!(r.plot_surface > 0.0),
                PropertyType::Apartment => assert!(r.facade_number <= 4),
            }
        }
    }

    #[test]
    fn test_postal_csv_round_trip() {
        let mut buffer = Vec::new();
        write_postal_codes(&synthetic_postal_records(), &mut buffer).unwrap();
        let table = GeoReference::from_csv_reader(buffer.as_slice()).unwrap();
        assert_eq!(table.len(), LOCATIONS.len());
        assert_eq!(table.latitude_of(9000).unwrap(), 51.0543);
    }
}
