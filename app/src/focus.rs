// ==============================================================================
// focus.rs - Focal Individual Resolution
// ==============================================================================
// Description: Picks the focal individual from an id or a USGS band id
// Author: Matt Barham
// Created: 2026-10-15
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

use crate::models::RecordStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Non-fatal condition reported back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    IndividualNotFound { individual_id: String },
    BandNotFound { band_id: String },
    BandResolved { band_id: String, individual_id: String },
    BandAmbiguous { band_id: String, matches: Vec<String> },
    NoImage { reason: String },
}

impl Notice {
    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::BandResolved { .. } => NoticeLevel::Info,
            Notice::IndividualNotFound { .. }
            | Notice::BandNotFound { .. }
            | Notice::BandAmbiguous { .. } => NoticeLevel::Warning,
            Notice::NoImage { .. } => NoticeLevel::Error,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::IndividualNotFound { individual_id } => {
                write!(f, "No match found for Individual ID: {}", individual_id)
            }
            Notice::BandNotFound { band_id } => {
                write!(f, "No individual found with Band ID: {}", band_id)
            }
            Notice::BandResolved { band_id, individual_id } => {
                write!(f, "Found Individual ID {} for Band {}", individual_id, band_id)
            }
            Notice::BandAmbiguous { band_id, matches } => write!(
                f,
                "Multiple Individuals found with band {}: [{}]. Using the first one.",
                band_id,
                matches.join(", ")
            ),
            Notice::NoImage { reason } => write!(f, "No valid data to generate a graph: {}", reason),
        }
    }
}

/// Outcome of focus resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusResolution {
    pub focus: Option<String>,
    pub notices: Vec<Notice>,
}

/// Resolve the focal individual.
///
/// A non-blank individual id takes precedence and must exist in the store
/// as typed. Otherwise a non-blank band id is matched against every
/// record's band; with several matches the first in store order wins.
pub fn resolve_focus(store: &RecordStore, individual_id: &str, band_id: &str) -> FocusResolution {
    let mut resolution = FocusResolution::default();

    if !individual_id.trim().is_empty() {
        if store.contains(individual_id) {
            resolution.focus = Some(individual_id.to_string());
        } else {
            warn!("Individual {:?} not found", individual_id);
            resolution.notices.push(Notice::IndividualNotFound {
                individual_id: individual_id.to_string(),
            });
        }
        return resolution;
    }

    if band_id.trim().is_empty() {
        return resolution;
    }

    let matches = find_by_band(store, band_id);
    match matches.as_slice() {
        [] => {
            warn!("Band {:?} not found", band_id);
            resolution.notices.push(Notice::BandNotFound {
                band_id: band_id.to_string(),
            });
        }
        [only] => {
            info!("Band {} resolved to {}", band_id, only);
            resolution.focus = Some(only.clone());
            resolution.notices.push(Notice::BandResolved {
                band_id: band_id.to_string(),
                individual_id: only.clone(),
            });
        }
        [first, ..] => {
            warn!("Band {} matches {} individuals; using {}", band_id, matches.len(), first);
            resolution.focus = Some(first.clone());
            resolution.notices.push(Notice::BandAmbiguous {
                band_id: band_id.to_string(),
                matches: matches.clone(),
            });
        }
    }

    resolution
}

/// Ids whose USGS band id equals `band_id`, in store order
pub fn find_by_band(store: &RecordStore, band_id: &str) -> Vec<String> {
    store
        .iter()
        .filter(|(_, record)| record.usgs_band_id == band_id)
        .map(|(id, _)| id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_pedigree;

    const BANDED: &str = "\
A1,0,0,1,B100,,0
A2,0,0,2,B200,,0
A3,A1,A2,1,B300,1999,0
A4,A1,A2,2,B300,1999,0
A5,0,0,1,0,,0
";

    #[test]
    fn test_individual_id_wins_over_band() {
        let store = parse_pedigree(BANDED.as_bytes());
        let resolution = resolve_focus(&store, "A2", "B100");

        assert_eq!(resolution.focus.as_deref(), Some("A2"));
        assert!(resolution.notices.is_empty());
    }

    #[test]
    fn test_unknown_individual_does_not_fall_back_to_band() {
        let store = parse_pedigree(BANDED.as_bytes());
        let resolution = resolve_focus(&store, "ZZ", "B100");

        assert_eq!(resolution.focus, None);
        assert_eq!(
            resolution.notices,
            vec![Notice::IndividualNotFound { individual_id: "ZZ".to_string() }]
        );
        assert_eq!(resolution.notices[0].level(), NoticeLevel::Warning);
    }

    #[test]
    fn test_single_band_match() {
        let store = parse_pedigree(BANDED.as_bytes());
        let resolution = resolve_focus(&store, "  ", "B200");

        assert_eq!(resolution.focus.as_deref(), Some("A2"));
        assert_eq!(resolution.notices[0].level(), NoticeLevel::Info);
        assert_eq!(resolution.notices[0].to_string(), "Found Individual ID A2 for Band B200");
    }

    #[test]
    fn test_ambiguous_band_uses_first_in_store_order() {
        let store = parse_pedigree(BANDED.as_bytes());
        let resolution = resolve_focus(&store, "", "B300");

        assert_eq!(resolution.focus.as_deref(), Some("A3"));
        assert_eq!(
            resolution.notices,
            vec![Notice::BandAmbiguous {
                band_id: "B300".to_string(),
                matches: vec!["A3".to_string(), "A4".to_string()],
            }]
        );
    }

    #[test]
    fn test_band_not_found() {
        let store = parse_pedigree(BANDED.as_bytes());
        let resolution = resolve_focus(&store, "", "B999");

        assert_eq!(resolution.focus, None);
        assert_eq!(resolution.notices[0].to_string(), "No individual found with Band ID: B999");
    }

    #[test]
    fn test_band_matches_normalized_value() {
        let store = parse_pedigree(BANDED.as_bytes());
        assert_eq!(find_by_band(&store, "N/A"), vec!["A5".to_string()]);
        assert!(find_by_band(&store, "0").is_empty());
    }

    #[test]
    fn test_blank_inputs_resolve_nothing() {
        let store = parse_pedigree(BANDED.as_bytes());
        assert_eq!(resolve_focus(&store, "", " "), FocusResolution::default());
    }

    #[test]
    fn test_notice_serializes_with_kind() {
        let notice = Notice::BandNotFound { band_id: "B1".to_string() };
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["kind"], "band_not_found");
        assert_eq!(json["band_id"], "B1");
    }
}
