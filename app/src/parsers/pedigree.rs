// ==============================================================================
// pedigree.rs - Pedigree CSV Parser
// ==============================================================================
// Description: Builds the id-keyed record store from raw pedigree CSV bytes
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: Headerless CSV, 7 comma-separated columns, no quoting
// Example:
//   individual_id,father_id,mother_id,sex,usgs_band_id,hatch_year,aux_id
//   A1,0,0,1,0,,0
//   A2,0,0,2,0,,0
//   A3,A1,A2,1,B123,1999,0
// ==============================================================================

use std::borrow::Cow;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{IndividualRecord, RecordStore, NOT_AVAILABLE};

/// Number of columns in a pedigree row
pub const PEDIGREE_COLUMNS: usize = 7;

/// Counters collected while building a store. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lines_seen: usize,
    pub blank_lines: usize,
    pub duplicate_lines: usize,
    pub malformed_lines: usize,
    pub overwritten_ids: usize,
    pub records: usize,
}

/// Parsed store plus the counters describing how it was built
#[derive(Debug, Clone)]
pub struct ParsedPedigree {
    pub store: RecordStore,
    pub stats: ParseStats,
}

/// Errors reading a pedigree file from disk (parsing itself never fails)
#[derive(Error, Debug)]
pub enum PedigreeParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Parser for 7-column pedigree files
#[derive(Debug, Clone, Default)]
pub struct PedigreeParser;

impl PedigreeParser {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a pedigree file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<ParsedPedigree, PedigreeParseError> {
        let bytes = fs::read(path.as_ref())?;
        info!("Read {} bytes from {:?}", bytes.len(), path.as_ref());
        Ok(self.parse_bytes(&bytes))
    }

    /// Parse raw upload bytes into a record store
    ///
    /// # Rules
    /// - Lines are trimmed; blank lines are skipped
    /// - A line identical to an earlier line is skipped (first wins)
    /// - Lines that do not split into exactly 7 fields are skipped
    /// - A later row for an existing id overwrites the earlier record
    ///
    /// Invalid UTF-8 is replaced rather than rejected, so this never fails.
    pub fn parse_bytes(&self, bytes: &[u8]) -> ParsedPedigree {
        let text = String::from_utf8_lossy(bytes);
        if matches!(text, Cow::Owned(_)) {
            warn!("Pedigree upload is not valid UTF-8; invalid sequences were replaced");
        }
        self.parse_str(&text)
    }

    pub fn parse_str(&self, text: &str) -> ParsedPedigree {
        let mut store = RecordStore::new();
        let mut stats = ParseStats::default();
        let mut seen_lines: HashSet<&str> = HashSet::new();

        for (line_number, raw_line) in text.split('\n').enumerate() {
            stats.lines_seen += 1;
            let line = raw_line.trim();

            if line.is_empty() {
                stats.blank_lines += 1;
                continue;
            }

            if !seen_lines.insert(line) {
                stats.duplicate_lines += 1;
                continue;
            }

            let Some((individual_id, record)) = Self::parse_line(line) else {
                debug!("Skipping malformed line {}: {:?}", line_number + 1, line);
                stats.malformed_lines += 1;
                continue;
            };

            if store.insert(individual_id, record) {
                stats.overwritten_ids += 1;
            }
        }

        stats.records = store.len();
        info!(
            "Parsed {} individuals ({} duplicate lines, {} malformed lines, {} overwritten ids)",
            stats.records, stats.duplicate_lines, stats.malformed_lines, stats.overwritten_ids
        );

        ParsedPedigree { store, stats }
    }

    /// Split one trimmed line into an id and its normalized record
    fn parse_line(line: &str) -> Option<(String, IndividualRecord)> {
        let fields: Vec<&str> = line.split(',').collect();
        let [individual_id, father_id, mother_id, sex, usgs_band_id, hatch_year, aux_id] =
            fields.as_slice()
        else {
            return None;
        };

        let record = IndividualRecord {
            father_id: father_id.to_string(),
            mother_id: mother_id.to_string(),
            sex: sex.to_string(),
            usgs_band_id: zero_as_missing(usgs_band_id),
            hatch_year: if hatch_year.is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                hatch_year.to_string()
            },
            aux_id: zero_as_missing(aux_id),
        };

        Some((individual_id.to_string(), record))
    }
}

fn zero_as_missing(value: &str) -> String {
    if value == "0" {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

/// Parse raw bytes with the default parser
pub fn parse_pedigree(bytes: &[u8]) -> RecordStore {
    PedigreeParser::new().parse_bytes(bytes).store
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
A1,0,0,1,0,,0
A2,0,0,2,0,,0
A3,A1,A2,1,B123,1999,0
";

    #[test]
    fn test_parse_sample() {
        let store = parse_pedigree(SAMPLE.as_bytes());
        assert_eq!(store.len(), 3);

        let a3 = store.get("A3").unwrap();
        assert_eq!(a3.father_id, "A1");
        assert_eq!(a3.mother_id, "A2");
        assert_eq!(a3.usgs_band_id, "B123");
        assert_eq!(a3.hatch_year, "1999");
        assert_eq!(a3.aux_id, "N/A");
    }

    #[test]
    fn test_sentinel_normalization() {
        let store = parse_pedigree(b"X,0,0,1,0,,0\nY,0,0,2,0,0,AUX7\n");

        let x = store.get("X").unwrap();
        assert_eq!(x.usgs_band_id, "N/A");
        assert_eq!(x.hatch_year, "N/A");
        assert_eq!(x.aux_id, "N/A");

        // Hatch year "0" is kept as-is; only blanks are normalized
        let y = store.get("Y").unwrap();
        assert_eq!(y.hatch_year, "0");
        assert_eq!(y.aux_id, "AUX7");
        // Parent ids are never normalized
        assert_eq!(y.father_id, "0");
    }

    #[test]
    fn test_duplicate_lines_are_idempotent() {
        let once = PedigreeParser::new().parse_str("A1,0,0,1,0,,0\n");
        let twice = PedigreeParser::new().parse_str("A1,0,0,1,0,,0\nA1,0,0,1,0,,0\n");

        assert_eq!(once.store, twice.store);
        assert_eq!(twice.store.len(), 1);
        assert_eq!(twice.stats.duplicate_lines, 1);
    }

    #[test]
    fn test_duplicate_detection_uses_trimmed_text() {
        let parsed = PedigreeParser::new().parse_str("  A1,0,0,1,0,,0\r\nA1,0,0,1,0,,0  \n");
        assert_eq!(parsed.stats.duplicate_lines, 1);
        assert_eq!(parsed.store.len(), 1);
    }

    #[test]
    fn test_same_id_different_text_overwrites() {
        let parsed = PedigreeParser::new().parse_str("A1,0,0,1,0,,0\nA1,0,0,2,B9,2001,0\n");

        assert_eq!(parsed.store.len(), 1);
        assert_eq!(parsed.stats.overwritten_ids, 1);
        let a1 = parsed.store.get("A1").unwrap();
        assert_eq!(a1.sex, "2");
        assert_eq!(a1.usgs_band_id, "B9");
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let input = "\
short,0,0
A1,0,0,1,0,,0
too,many,fields,in,this,row,here,extra
,,,,,,
";
        let parsed = PedigreeParser::new().parse_str(input);

        assert!(!parsed.store.contains("short"));
        assert!(!parsed.store.contains("too"));
        assert_eq!(parsed.stats.malformed_lines, 2);
        // Seven empty fields still parse, keyed by the empty id
        let empty = parsed.store.get("").unwrap();
        assert_eq!(empty.hatch_year, "N/A");
        assert_eq!(empty.usgs_band_id, "");
        assert_eq!(parsed.store.len(), 2);
    }

    #[test]
    fn test_header_row_with_seven_fields_is_a_record() {
        let input = "individual_id,father_id,mother_id,sex,usgs_band_id,hatch_year,aux_id\n";
        let store = parse_pedigree(input.as_bytes());
        assert!(store.contains("individual_id"));
    }

    #[test]
    fn test_fields_are_not_validated() {
        let store = parse_pedigree(b"bird #1,?,?,M,band x,nineteen,-\n");
        let bird = store.get("bird #1").unwrap();
        assert_eq!(bird.sex, "M");
        assert_eq!(bird.hatch_year, "nineteen");
    }

    #[test]
    fn test_blank_and_invalid_utf8_input() {
        let parsed = PedigreeParser::new().parse_bytes(b"\n\n   \n");
        assert!(parsed.store.is_empty());
        assert_eq!(parsed.stats.blank_lines, 4);

        let store = parse_pedigree(b"A\xff,0,0,1,0,,0\n");
        assert_eq!(store.len(), 1);
        assert!(store.contains("A\u{fffd}"));
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file.flush().unwrap();

        let parsed = PedigreeParser::new().parse_file(file.path()).unwrap();
        assert_eq!(parsed.store.len(), 3);
        assert_eq!(parsed.stats.records, 3);
    }

    #[test]
    fn test_parse_missing_file() {
        let result = PedigreeParser::new().parse_file("/nonexistent/pedigree.csv");
        assert!(matches!(result, Err(PedigreeParseError::IoError(_))));
    }
}
