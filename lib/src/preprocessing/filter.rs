//! Row filter: drops listings that cannot be encoded or are implausible.
//!
//! Predicates run in a fixed order and the first one that matches decides the
//! [`DropReason`]:
//!
//! 1. subtype in the exclusion set
//! 2. subtype outside the vocabulary
//! 3. building condition equal to the "unknown" sentinel
//! 4. apartment with more than `max_apartment_facades` facades
//! 5. house with a zero plot surface, per [`ZeroPlotPolicy`]
//!
//! Rows are removed, never imputed.

use crate::dataset::listing::{ListingRecord, PropertyType};
use crate::preprocessing::encoding::SubtypeVocabulary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Handling of houses whose plot surface is 0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroPlotPolicy {
    /// Keep the row silently.
    Keep,
    /// Keep the row and report its index.
    #[default]
    Flag,
    /// Remove the row.
    Drop,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_excluded_subtypes")]
    pub excluded_subtypes: Vec<String>,
    #[serde(default = "default_unknown_condition")]
    pub unknown_condition: String,
    #[serde(default = "default_max_apartment_facades")]
    pub max_apartment_facades: u32,
    #[serde(default)]
    pub zero_plot: ZeroPlotPolicy,
}

fn default_excluded_subtypes() -> Vec<String> {
    vec!["other property".to_string(), "mixed use building".to_string()]
}

fn default_unknown_condition() -> String {
    "no info".to_string()
}

fn default_max_apartment_facades() -> u32 {
    4
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_subtypes: default_excluded_subtypes(),
            unknown_condition: default_unknown_condition(),
            max_apartment_facades: default_max_apartment_facades(),
            zero_plot: ZeroPlotPolicy::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    ExcludedSubtype,
    UnknownSubtype,
    UnknownCondition,
    TooManyFacades,
    ZeroPlotSurface,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DropReason::ExcludedSubtype => "excluded subtype",
            DropReason::UnknownSubtype => "unknown subtype",
            DropReason::UnknownCondition => "unknown building condition",
            DropReason::TooManyFacades => "apartment with too many facades",
            DropReason::ZeroPlotSurface => "house with zero plot surface",
        };
        f.write_str(name)
    }
}

/// What the filter did.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    pub input_rows: usize,
    pub kept_rows: usize,
    pub dropped: BTreeMap<DropReason, usize>,
    /// Input indices of houses kept with a zero plot under [`ZeroPlotPolicy::Flag`].
    pub zero_plot_flagged: Vec<usize>,
}

impl FilterReport {
    pub fn total_dropped(&self) -> usize {
        self.dropped.values().sum()
    }

    pub fn dropped_for(&self, reason: DropReason) -> usize {
        self.dropped.get(&reason).copied().unwrap_or(0)
    }
}

#[derive(Clone, Debug)]
pub struct FilterOutcome {
    pub records: Vec<ListingRecord>,
    pub report: FilterReport,
}

#[derive(Clone, Debug, Default)]
pub struct RowFilter {
    config: FilterConfig,
    vocabulary: SubtypeVocabulary,
}

impl RowFilter {
    pub fn new(config: FilterConfig, vocabulary: SubtypeVocabulary) -> Self {
        Self { config, vocabulary }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// First matching drop reason, or `None` if the row survives.
    pub fn drop_reason(&self, record: &ListingRecord) -> Option<DropReason> {
        let subtype = record.subtype_of_property.as_str();
        if self.config.excluded_subtypes.iter().any(|s| s == subtype) {
            return Some(DropReason::ExcludedSubtype);
        }
        if !self.vocabulary.contains(subtype) {
            return Some(DropReason::UnknownSubtype);
        }
        if record.building_condition == self.config.unknown_condition {
            return Some(DropReason::UnknownCondition);
        }
        if record.type_of_property == PropertyType::Apartment
            && record.facade_number > self.config.max_apartment_facades
        {
            return Some(DropReason::TooManyFacades);
        }
        if is_zero_plot_house(record) && self.config.zero_plot == ZeroPlotPolicy::Drop {
            return Some(DropReason::ZeroPlotSurface);
        }
        None
    }

    pub fn apply(&self, records: Vec<ListingRecord>) -> FilterOutcome {
        let mut report = FilterReport {
            input_rows: records.len(),
            ..FilterReport::default()
        };
        let mut kept = Vec::with_capacity(records.len());

        for (index, record) in records.into_iter().enumerate() {
            if let Some(reason) = self.drop_reason(&record) {
                debug!(row = index, zip_code = record.zip_code, %reason, "dropping listing");
                *report.dropped.entry(reason).or_insert(0) += 1;
                continue;
            }
            if self.config.zero_plot == ZeroPlotPolicy::Flag && is_zero_plot_house(&record) {
                report.zero_plot_flagged.push(index);
            }
            kept.push(record);
        }

        report.kept_rows = kept.len();
        info!(
            input = report.input_rows,
            kept = report.kept_rows,
            dropped = report.total_dropped(),
            zero_plot_flagged = report.zero_plot_flagged.len(),
            "row filter applied"
        );
        FilterOutcome {
            records: kept,
            report,
        }
    }
}

fn is_zero_plot_house(record: &ListingRecord) -> bool {
    record.type_of_property == PropertyType::House && record.plot_surface == 0.0
}
