// ==============================================================================
// models.rs - Pedigree Data Models
// ==============================================================================
// Description: Individual records and the id-keyed record store
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier used for "no parent" in the father/mother columns
pub const UNKNOWN_PARENT: &str = "0";

/// Display value substituted for absent optional fields
pub const NOT_AVAILABLE: &str = "N/A";

/// Sex classification derived from the raw sex code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    /// "1" is male, "2" is female, anything else is unknown
    pub fn from_code(code: &str) -> Self {
        match code {
            "1" => Sex::Male,
            "2" => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

/// One parsed pedigree row (the id is the store key)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualRecord {
    /// Father identifier ("0" when unknown)
    pub father_id: String,

    /// Mother identifier ("0" when unknown)
    pub mother_id: String,

    /// Raw sex code, stored verbatim
    pub sex: String,

    /// USGS band id, "N/A" when the raw value was "0"
    pub usgs_band_id: String,

    /// Hatch year, "N/A" when the raw value was blank
    pub hatch_year: String,

    /// Auxiliary id, "N/A" when the raw value was "0"
    pub aux_id: String,
}

impl IndividualRecord {
    pub fn sex(&self) -> Sex {
        Sex::from_code(&self.sex)
    }
}

/// Id-keyed pedigree table.
///
/// Keeps first-insertion order so that iteration (table output, graph
/// output, band lookups) is reproducible for the same upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: IndexMap<String, IndividualRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns true when an existing id was replaced
    pub fn insert(&mut self, individual_id: String, record: IndividualRecord) -> bool {
        self.records.insert(individual_id, record).is_some()
    }

    pub fn get(&self, individual_id: &str) -> Option<&IndividualRecord> {
        self.records.get(individual_id)
    }

    pub fn get_key_value(&self, individual_id: &str) -> Option<(&str, &IndividualRecord)> {
        self.records
            .get_key_value(individual_id)
            .map(|(id, record)| (id.as_str(), record))
    }

    pub fn contains(&self, individual_id: &str) -> bool {
        self.records.contains_key(individual_id)
    }

    /// True when `individual_id` can be drawn as a parent: not the
    /// unknown sentinel and present in this store
    pub fn is_linkable(&self, individual_id: &str) -> bool {
        individual_id != UNKNOWN_PARENT && self.contains(individual_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndividualRecord)> {
        self.records.iter().map(|(id, record)| (id.as_str(), record))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }
}

impl FromIterator<(String, IndividualRecord)> for RecordStore {
    fn from_iter<I: IntoIterator<Item = (String, IndividualRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
